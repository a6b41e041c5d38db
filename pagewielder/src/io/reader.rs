//! PDF loading.
//!
//! Documents are opened read-only and on demand: the engine asks the reader
//! for a document the first time an operation references it.
//!
//! # Examples
//!
//! ```no_run
//! use pagewielder::io::reader::PdfReader;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loaded = PdfReader::new().load(Path::new("input.pdf"))?;
//! println!("{} pages", loaded.page_count);
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::{PageWielderError, Result};

/// A loaded PDF document with metadata.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Time taken to load the document.
    pub load_time: Duration,

    /// File size in bytes.
    pub file_size: u64,
}

impl LoadedPdf {
    /// Wrap an already parsed document.
    pub fn new(document: Document, path: PathBuf, load_time: Duration) -> Self {
        let page_count = document.get_pages().len();
        let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

        Self {
            document,
            path,
            page_count,
            load_time,
            file_size,
        }
    }
}

/// Reads PDF files from disk.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Create a new PDF reader.
    pub fn new() -> Self {
        Self
    }

    /// Load a single PDF document.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist or is a directory
    /// - The file is not a PDF `lopdf` can parse
    pub fn load(&self, path: &Path) -> Result<LoadedPdf> {
        Self::check_path_exists(path)?;

        let start = Instant::now();
        let document = Document::load(path).map_err(|err| {
            PageWielderError::failed_to_load_pdf(path.to_path_buf(), err.to_string())
        })?;
        let loaded = LoadedPdf::new(document, path.to_path_buf(), start.elapsed());

        debug!(
            path = %path.display(),
            pages = loaded.page_count,
            elapsed_ms = loaded.load_time.as_millis() as u64,
            "loaded pdf"
        );

        Ok(loaded)
    }

    /// Check that `path` exists and is a file.
    pub fn check_path_exists<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let exists = path.try_exists()?;
        if !exists {
            return Err(PageWielderError::file_not_found(path.to_path_buf()));
        }

        if path.is_dir() {
            return Err(PageWielderError::not_a_file(path.to_path_buf()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{save_test_pdf, test_document};
    use tempfile::TempDir;

    #[test]
    fn test_load_pdf() {
        let temp_dir = TempDir::new().unwrap();
        let path = save_test_pdf(&temp_dir, "three.pdf", &test_document(3));

        let loaded = PdfReader::new().load(&path).unwrap();
        assert_eq!(loaded.page_count, 3);
        assert_eq!(loaded.path, path);
        assert!(loaded.file_size > 0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = PdfReader::new()
            .load(Path::new("/nonexistent/missing.pdf"))
            .unwrap_err();
        assert!(matches!(err, PageWielderError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_directory() {
        let temp_dir = TempDir::new().unwrap();
        let err = PdfReader::new().load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, PageWielderError::NotAFile { .. }));
    }

    #[test]
    fn test_load_corrupted_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let err = PdfReader::new().load(&path).unwrap_err();
        assert!(matches!(err, PageWielderError::FailedToLoadPdf { .. }));
        assert_eq!(err.exit_code(), 5);
    }
}
