//! PDF writing and saving operations.
//!
//! This module provides safe PDF writing with:
//! - Atomic writes (write to a temp file in the destination directory, then rename)
//! - Compression levels
//! - Overwrite protection
//! - Write statistics
//!
//! # Examples
//!
//! ```no_run
//! use pagewielder::io::writer::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! writer.save(&doc, Path::new("output.pdf")).await?;
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tokio::task;
use tracing::debug;

use crate::config::CompressionLevel;
use crate::error::{PageWielderError, Result};
use crate::utils::format_file_size;

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// How hard to compress the document before writing.
    pub compression: CompressionLevel,

    /// Replace an existing file at the destination.
    pub overwrite: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            compression: CompressionLevel::default(),
            overwrite: true,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,

    /// Compression applied.
    pub compression: CompressionLevel,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer that compresses at `compression`.
    pub fn with_compression(compression: CompressionLevel) -> Self {
        Self {
            options: WriteOptions {
                compression,
                ..Default::default()
            },
        }
    }

    /// Create a writer without atomic writes.
    pub fn non_atomic() -> Self {
        Self {
            options: WriteOptions {
                atomic: false,
                ..Default::default()
            },
        }
    }

    /// Create a writer that refuses to replace an existing file.
    pub fn no_clobber(mut self) -> Self {
        self.options.overwrite = false;
        self
    }

    /// The options this writer uses.
    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Save a PDF document to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Output directory doesn't exist
    /// - The file exists and overwriting is disabled
    /// - Write operation fails
    pub async fn save(&self, doc: &Document, path: &Path) -> Result<()> {
        let _stats = self.save_with_stats(doc, path).await?;
        Ok(())
    }

    /// Save a PDF and return statistics about the operation.
    ///
    /// The document is cloned and serialized on a blocking task.
    ///
    /// ```no_run
    /// # use pagewielder::io::writer::PdfWriter;
    /// # use lopdf::Document;
    /// # use std::path::Path;
    /// # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
    /// let writer = PdfWriter::new();
    /// let stats = writer.save_with_stats(&doc, Path::new("output.pdf")).await?;
    /// println!("Wrote {} in {:?}", stats.format_file_size(), stats.write_time);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn save_with_stats(&self, doc: &Document, path: &Path) -> Result<WriteStatistics> {
        self.save_owned(doc.clone(), path).await
    }

    /// Like [`save_with_stats`](Self::save_with_stats), without the clone.
    pub async fn save_owned(&self, doc: Document, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let options = self.options.clone();

        task::spawn_blocking(move || write_document(doc, path_buf, &options))
            .await
            .map_err(|e| PageWielderError::execution(format!("Write task failed: {e}")))?
    }

    /// Check if a file can be written to the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory is missing or read-only.
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        let parent = parent_dir(path);

        let metadata = tokio::fs::metadata(parent).await.map_err(|_| {
            PageWielderError::invalid_config(format!(
                "Output directory does not exist: {}",
                parent.display()
            ))
        })?;

        if !metadata.is_dir() {
            return Err(PageWielderError::invalid_config(format!(
                "Output directory is not a directory: {}",
                parent.display()
            )));
        }

        if metadata.permissions().readonly() {
            return Err(PageWielderError::invalid_config(format!(
                "Output directory is not writable: {}",
                parent.display()
            )));
        }

        Ok(())
    }

    /// Check if output file exists.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn compress(doc: &mut Document, level: CompressionLevel) {
    match level {
        CompressionLevel::None => {}
        CompressionLevel::Standard => doc.compress(),
        CompressionLevel::Maximum => {
            doc.prune_objects();
            doc.compress();
            doc.renumber_objects();
        }
    }
}

fn write_document(
    mut doc: Document,
    path: PathBuf,
    options: &WriteOptions,
) -> Result<WriteStatistics> {
    let start = Instant::now();

    if !options.overwrite && path.exists() {
        return Err(PageWielderError::output_exists(path));
    }

    compress(&mut doc, options.compression);

    if options.atomic {
        let temp = NamedTempFile::new_in(parent_dir(&path)).map_err(|e| {
            PageWielderError::FailedToCreateOutput {
                path: path.clone(),
                source: e,
            }
        })?;

        {
            let mut writer = std::io::BufWriter::with_capacity(options.buffer_size, temp.as_file());
            doc.save_to(&mut writer)
                .map_err(|e| PageWielderError::FailedToWrite {
                    path: temp.path().to_path_buf(),
                    source: std::io::Error::other(e),
                })?;
            writer.flush().map_err(|e| PageWielderError::FailedToWrite {
                path: temp.path().to_path_buf(),
                source: e,
            })?;
        }

        let persisted = if options.overwrite {
            temp.persist(&path)
        } else {
            temp.persist_noclobber(&path)
        };

        persisted.map_err(|e| {
            if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                PageWielderError::output_exists(path.clone())
            } else {
                PageWielderError::FailedToWrite {
                    path: path.clone(),
                    source: e.error,
                }
            }
        })?;
    } else {
        let file = std::fs::File::create(&path).map_err(|e| {
            PageWielderError::FailedToCreateOutput {
                path: path.clone(),
                source: e,
            }
        })?;

        let mut writer = std::io::BufWriter::with_capacity(options.buffer_size, file);
        doc.save_to(&mut writer)
            .map_err(|e| PageWielderError::FailedToWrite {
                path: path.clone(),
                source: std::io::Error::other(e),
            })?;
        writer.flush().map_err(|e| PageWielderError::FailedToWrite {
            path: path.clone(),
            source: e,
        })?;
    }

    let write_time = start.elapsed();
    let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

    debug!(
        path = %path.display(),
        bytes = file_size,
        compression = ?options.compression,
        atomic = options.atomic,
        "wrote pdf"
    );

    Ok(WriteStatistics {
        write_time,
        file_size,
        output_path: path,
        compression: options.compression,
    })
}
