//! Configuration for a pagewielder run.
//!
//! This module turns CLI arguments (and an optional JSON spec file) into a
//! validated configuration. It handles:
//! - Validation of argument combinations
//! - Output overwrite policy
//! - Compression level
//! - Loading operations from a spec file

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::engine::plan::{OperationSpec, Rotation, Transform};
use crate::engine::range::PageSelection;
use crate::error::{PageWielderError, Result};
use crate::io::{PdfWriter, WriteOptions};

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No compression - preserves exact quality and structure.
    None,
    /// Compress streams.
    #[default]
    Standard,
    /// Compress streams, drop unreachable objects and renumber.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = PageWielderError;

    /// Parse `none`, `standard` or `maximum` (case-insensitive).
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PageWielderError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Complete configuration for one run.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Operations, in output order.
    pub operations: Vec<OperationSpec>,

    /// Output PDF file path. `None` writes to a fresh temporary file.
    pub output: Option<PathBuf>,

    /// Dry run mode - print the plan without creating output.
    pub dry_run: bool,

    /// Print machine-readable JSON instead of text.
    pub json: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Compression level for output.
    pub compression: CompressionLevel,
}

impl Config {
    /// Distinct input paths, in order of first use.
    pub fn inputs(&self) -> Vec<&Path> {
        let mut inputs: Vec<&Path> = Vec::new();
        for spec in &self.operations {
            if !inputs.contains(&spec.input.as_path()) {
                inputs.push(&spec.input);
            }
        }
        inputs
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if:
    /// - No operations are given
    /// - Verbose and quiet modes are both enabled
    /// - The output path is also an input
    pub fn validate(&self) -> Result<()> {
        if self.operations.is_empty() {
            return Err(PageWielderError::invalid_config("No operations specified"));
        }

        if self.verbose && self.quiet {
            return Err(PageWielderError::invalid_config(
                "Cannot use both --verbose and --quiet",
            ));
        }

        if let Some(output) = &self.output {
            let output_key = path_key(output);
            for input in self.inputs() {
                if input == output || path_key(input) == output_key {
                    return Err(PageWielderError::invalid_config(format!(
                        "Output file cannot be the same as an input file: {}",
                        output.display()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Writer configured for this run.
    ///
    /// Quiet runs never prompt, so `Prompt` behaves like `NoClobber` there.
    pub fn writer(&self) -> PdfWriter {
        let overwrite = match self.overwrite_mode {
            OverwriteMode::Force => true,
            OverwriteMode::NoClobber => false,
            OverwriteMode::Prompt => !self.quiet,
        };

        PdfWriter::with_options(WriteOptions {
            compression: self.compression,
            overwrite,
            ..Default::default()
        })
    }
}

fn path_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// A JSON file listing operations.
///
/// ```json
/// {
///   "operations": [
///     { "input": "a.pdf", "pages": "1-3", "rotate": 90 },
///     { "input": "b.pdf", "delete": true, "pages": "2" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecFile {
    /// Operations, in output order.
    pub operations: Vec<SpecFileOperation>,
}

/// One entry of a [`SpecFile`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecFileOperation {
    /// Input document.
    pub input: PathBuf,

    /// Page selection; every page when absent.
    #[serde(default)]
    pub pages: PageSelection,

    /// Clockwise rotation in degrees.
    #[serde(default)]
    pub rotate: Option<i64>,

    /// Delete the selected pages instead of copying them.
    #[serde(default)]
    pub delete: bool,
}

impl SpecFileOperation {
    /// Convert into an [`OperationSpec`].
    pub fn into_spec(self) -> Result<OperationSpec> {
        let transform = match (self.rotate, self.delete) {
            (Some(_), true) => {
                return Err(PageWielderError::invalid_config(format!(
                    "Operation on {} cannot both rotate and delete",
                    self.input.display()
                )));
            }
            (Some(degrees), false) => Transform::Rotate(Rotation::from_degrees(degrees)?),
            (None, true) => Transform::Delete,
            (None, false) => Transform::Identity,
        };

        Ok(OperationSpec {
            input: self.input,
            pages: self.pages,
            transform,
        })
    }
}

impl SpecFile {
    /// Parse spec file contents. `path` is only used in error messages.
    pub fn parse(contents: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(contents).map_err(|err| {
            PageWielderError::parse(path.display().to_string(), err.to_string())
        })
    }

    /// Read and parse a spec file.
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|source| {
            PageWielderError::FailedToReadSpecFile {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::parse(&contents, path)
    }

    /// Convert every entry into an [`OperationSpec`].
    pub fn into_specs(self) -> Result<Vec<OperationSpec>> {
        self.operations
            .into_iter()
            .map(SpecFileOperation::into_spec)
            .collect()
    }
}
