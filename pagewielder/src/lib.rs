//! pagewielder - Select, reorder, merge, rotate and delete PDF pages.
//!
//! This library turns declarative page operations into a new PDF document.
//! It supports:
//!
//! - Page range expressions with descending ranges and `end`
//! - Merging pages from any number of documents, in any order
//! - Per-operation rotation and deletion
//! - Grouping pages by size
//! - Atomic output writes
//!
//! # Examples
//!
//! ## Compose a document
//!
//! ```no_run
//! use pagewielder::engine::{Engine, OperationSpec};
//! use pagewielder::io::PdfWriter;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let specs = vec![
//!     OperationSpec::parse("report.pdf@1-3")?,
//!     OperationSpec::parse("scans.pdf@end-1@r90")?,
//! ];
//!
//! let mut engine = Engine::new();
//! let execution = engine.run(specs)?;
//!
//! PdfWriter::new()
//!     .save(&execution.document, Path::new("combined.pdf"))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Inspect page sizes
//!
//! ```no_run
//! use pagewielder::dimensions::group_pages_by_dimensions;
//! use pagewielder::engine::DocumentSet;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut documents = DocumentSet::new();
//! let id = documents.register(Path::new("mixed.pdf"));
//! for group in group_pages_by_dimensions(documents.get_mut(id)?)? {
//!     println!("{}: {:?}", group.dimensions, group.pages);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod dimensions;
pub mod engine;
pub mod error;
pub mod io;
pub mod output;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::{Engine, EngineState, OperationSpec, PageSelection, Transform};
pub use error::{PageWielderError, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
