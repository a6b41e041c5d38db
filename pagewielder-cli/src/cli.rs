//! CLI argument parsing for pagewielder.
//!
//! This module defines the command-line interface using `clap`. It is also
//! compiled by the build script to render the man page, so it only depends
//! on `clap`, `std` and the library.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use pagewielder::config::{CompressionLevel, Config, OverwriteMode};
use pagewielder::engine::{OperationSpec, PageSelection, Rotation, Transform};
use pagewielder::error::Result;

/// Select, reorder, merge, rotate and delete PDF pages.
///
/// Operations are written as PATH[@PAGES[@TRANSFORM]]. PAGES is a
/// comma-separated list of page numbers and ranges (`1-3`, `9-6`, `end`,
/// `3-end`, `all`, `2:`). TRANSFORM is `rotate90`, `rotate180`, `rotate270`
/// or `delete`.
#[derive(Parser, Debug)]
#[command(name = "pagewielder")]
#[command(version)]
#[command(about = "Select, reorder, merge, rotate and delete PDF pages", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Verbose output - show statistics and engine progress
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run - print the page plan without writing output
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Print plans and document information as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Force overwrite of existing output file without confirmation
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Never overwrite existing output file
    #[arg(long, global = true, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Compression level for output PDF
    ///
    /// - none: No compression
    /// - standard: Compress streams (default)
    /// - maximum: Compress streams and drop unused objects
    #[arg(short, long, global = true, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a document from operations on one or more inputs
    ///
    /// Examples:
    ///   pagewielder compose a.pdf@1-3 b.pdf@end@r90 -o out.pdf
    ///   pagewielder compose scan.pdf@2,4@delete -o cleaned.pdf
    ///   pagewielder compose 'chapter*.pdf' -o book.pdf
    Compose(ComposeArgs),

    /// Extract a range of pages from one file
    Excerpt(ExcerptArgs),

    /// Remove pages by size
    ///
    /// Groups pages by their dimensions. Without --remove, lists the
    /// groups and asks which to remove.
    Filter(FilterArgs),

    /// Show page count, version and page sizes of a file
    Info(InfoArgs),
}

/// Arguments of `compose`.
#[derive(Args, Debug)]
pub struct ComposeArgs {
    /// Operations, in output order (PATH[@PAGES[@TRANSFORM]])
    #[arg(value_name = "SPEC", required_unless_present = "spec_file")]
    pub specs: Vec<String>,

    /// Read more operations from a JSON file
    #[arg(long, value_name = "FILE")]
    pub spec_file: Option<PathBuf>,

    /// Output PDF file path (a temporary file when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments of `excerpt`.
#[derive(Args, Debug)]
pub struct ExcerptArgs {
    /// Input PDF file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Pages to extract (e.g. 1:5, 3:, :10, 7, 9-6)
    #[arg(value_name = "PAGES")]
    pub pages: String,

    /// Rotate the extracted pages clockwise (90, 180 or 270)
    #[arg(long, value_name = "DEGREES")]
    pub rotate: Option<i64>,

    /// Output PDF file path (a temporary file when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments of `filter`.
#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Input PDF file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Size groups to remove, by index as listed by `info`
    #[arg(long, value_name = "INDEX", value_delimiter = ',')]
    pub remove: Option<Vec<usize>>,

    /// Output PDF file path (a temporary file when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments of `info`.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Input PDF file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

impl GlobalArgs {
    /// Overwrite policy from `--force` / `--no-clobber`.
    pub fn overwrite_mode(&self) -> OverwriteMode {
        if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        }
    }

    /// Build a configuration for `operations`.
    pub fn to_config(&self, operations: Vec<OperationSpec>, output: Option<PathBuf>) -> Result<Config> {
        Ok(Config {
            operations,
            output,
            dry_run: self.dry_run,
            json: self.json,
            verbose: self.verbose,
            quiet: self.quiet,
            overwrite_mode: self.overwrite_mode(),
            compression: CompressionLevel::from_str(&self.compression)?,
        })
    }
}

impl ComposeArgs {
    /// Parse the command-line operations.
    pub fn operations(&self) -> Result<Vec<OperationSpec>> {
        self.specs.iter().map(|s| OperationSpec::parse(s)).collect()
    }
}

impl ExcerptArgs {
    /// The single operation an excerpt performs.
    pub fn operation(&self) -> Result<OperationSpec> {
        let transform = match self.rotate {
            Some(degrees) => Transform::Rotate(Rotation::from_degrees(degrees)?),
            None => Transform::Identity,
        };

        Ok(OperationSpec::new(&self.input)
            .with_pages(PageSelection::parse(&self.pages)?)
            .with_transform(transform))
    }
}
