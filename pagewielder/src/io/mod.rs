//! I/O operations for pagewielder.
//!
//! This module handles file I/O:
//! - Loading PDF documents from disk
//! - Writing output documents atomically
//!
//! # Examples
//!
//! ```no_run
//! use pagewielder::io::{PdfReader, PdfWriter};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loaded = PdfReader::new().load(Path::new("input.pdf"))?;
//!
//! let writer = PdfWriter::new();
//! writer.save(&loaded.document, Path::new("output.pdf")).await?;
//! # Ok(())
//! # }
//! ```

pub mod reader;
pub mod writer;

pub use reader::{LoadedPdf, PdfReader};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};
