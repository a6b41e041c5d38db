//! pagewielder - Select, reorder, merge, rotate and delete PDF pages.
//!
//! Command-line front end for the `pagewielder` engine.

mod cli;

use clap::Parser;
use lopdf::Document;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use tokio::task;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::{Cli, Command, FilterArgs, GlobalArgs};
use pagewielder::config::{Config, OverwriteMode, SpecFile};
use pagewielder::dimensions::{
    DimensionGroup, describe, group_pages_by_dimensions, parse_group_selection, removal_spec,
};
use pagewielder::engine::{DocumentSet, Engine, Execution};
use pagewielder::error::{PageWielderError, Result};
use pagewielder::io::{PdfWriter, WriteStatistics};
use pagewielder::output::{
    OutputFormatter, dimension_group_lines, display_dimension_groups, display_plan_summary,
    display_run_summary,
};
use pagewielder::utils::{expand_spec_globs, format_file_size};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.global);
    let formatter = OutputFormatter::new(cli.global.quiet, cli.global.verbose);

    if let Err(err) = run(cli).await {
        formatter.error(&format!("Error: {err}"));
        if let Some(hint) = error_hint(&err)
            && !formatter.is_quiet()
        {
            eprintln!("  {hint}");
        }
        process::exit(err.exit_code());
    }
}

/// Usage reminder for errors in the request itself.
fn error_hint(err: &PageWielderError) -> Option<&'static str> {
    if !err.is_input_error() {
        return None;
    }

    Some(match err {
        PageWielderError::InvalidConfig { .. } => "Run `pagewielder --help` for usage.",
        _ => "Operations are written as PATH[@PAGES[@TRANSFORM]], e.g. a.pdf@1-3,end@rotate90",
    })
}

/// Log to stderr. `RUST_LOG` wins over `--verbose` / `--quiet`.
fn init_tracing(global: &GlobalArgs) {
    let default_level = if global.verbose {
        "pagewielder=info"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Main application logic.
async fn run(cli: Cli) -> Result<()> {
    let global = cli.global;

    match cli.command {
        Command::Compose(args) => {
            let mut operations = args.operations()?;
            if let Some(spec_file) = &args.spec_file {
                let loaded = SpecFile::load(spec_file).await?;
                debug!(path = %spec_file.display(), operations = loaded.operations.len(), "spec file loaded");
                operations.extend(loaded.into_specs()?);
            }
            let operations = expand_spec_globs(operations)?;

            compose(global.to_config(operations, args.output)?).await
        }
        Command::Excerpt(args) => {
            let operation = args.operation()?;
            compose(global.to_config(vec![operation], args.output)?).await
        }
        Command::Filter(args) => filter(&global, args).await,
        Command::Info(args) => show_info(&global, &args.input).await,
    }
}

/// Plan and, unless dry-running, execute and write.
async fn compose(mut config: Config) -> Result<()> {
    config.validate()?;
    let formatter = OutputFormatter::from_config(&config);

    if config.dry_run {
        return dry_run(&config, &formatter).await;
    }

    if let Some(output) = &config.output {
        handle_output_overwrite(output, config.overwrite_mode, &formatter)?;
        config.writer().can_write(output).await?;
    }

    formatter.debug(&format!(
        "Running {} operation(s) on {} file(s)",
        config.operations.len(),
        config.inputs().len()
    ));

    let operations = config.operations.clone();
    let Execution {
        document,
        statistics,
    } = blocking(move || Engine::new().run(operations)).await?;

    let output = match config.output.clone() {
        Some(output) => output,
        None => {
            config.overwrite_mode = OverwriteMode::Force;
            temporary_output()?
        }
    };

    info!(output = %output.display(), pages = statistics.pages_written, "writing output");
    let write_stats =
        write_output(&config.writer(), document, &output, config.output.is_none()).await?;

    if config.json {
        let report = serde_json::json!({
            "output": output.display().to_string(),
            "pages": statistics.pages_written,
            "documents": statistics.documents_used,
            "rotated": statistics.pages_rotated,
            "bytes": write_stats.file_size,
        });
        println!("{}", to_json(&report)?);
    } else if formatter.is_quiet() && config.output.is_none() {
        println!("{}", output.display());
    } else {
        display_run_summary(&formatter, &statistics, &write_stats);
    }

    Ok(())
}

async fn dry_run(config: &Config, formatter: &OutputFormatter) -> Result<()> {
    let operations = config.operations.clone();
    let summary = blocking(move || {
        let mut engine = Engine::new();
        engine.add_specs(operations)?;
        engine.build_plan()?;
        engine
            .plan_summary()
            .ok_or_else(|| PageWielderError::plan("no plan was built"))
    })
    .await?;

    if config.json {
        println!("{}", to_json(&summary)?);
        return Ok(());
    }

    display_plan_summary(formatter, &summary);
    let output = config
        .output
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "a temporary file".to_string());
    formatter.success("Dry run completed successfully");
    formatter.info(&format!("  Output would be: {output}"));
    Ok(())
}

/// Remove every page of the chosen size groups.
async fn filter(global: &GlobalArgs, args: FilterArgs) -> Result<()> {
    let formatter = OutputFormatter::new(global.quiet, global.verbose);

    let input = args.input.clone();
    let groups = blocking(move || {
        let mut documents = DocumentSet::new();
        let id = documents.register(&input);
        group_pages_by_dimensions(documents.get_mut(id)?)
    })
    .await?;

    let selected = match args.remove {
        Some(selected) => selected,
        None if global.quiet || global.json => {
            return Err(PageWielderError::invalid_config(
                "--remove is required with --quiet or --json",
            ));
        }
        None => {
            display_dimension_groups(&formatter, &groups);
            let stdin = io::stdin();
            match prompt_group_selection(&groups, &mut stdin.lock(), &mut io::stdout())? {
                Some(selected) => selected,
                None => {
                    formatter.warning("No page sets selected. No output file created.");
                    return Err(PageWielderError::Cancelled);
                }
            }
        }
    };

    let spec = removal_spec(&args.input, &groups, &selected)?;
    debug!(spec = %spec, "filter operation");
    compose(global.to_config(vec![spec], args.output)?).await
}

/// Ask for group indices until the answer parses. `None` on blank input or EOF.
fn prompt_group_selection<R: BufRead, W: Write>(
    groups: &[DimensionGroup],
    input: &mut R,
    output: &mut W,
) -> Result<Option<Vec<usize>>> {
    loop {
        write!(
            output,
            "Select page sets to remove by index (comma-separated) or press Enter to cancel: "
        )?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        match parse_group_selection(&line, groups.len()) {
            Ok(selection) => return Ok(selection),
            Err(err) => {
                writeln!(output, "Invalid input: {err}")?;
                for line in dimension_group_lines(groups) {
                    writeln!(output, "{line}")?;
                }
            }
        }
    }
}

/// Print version, page count and size groups of one file.
async fn show_info(global: &GlobalArgs, input: &Path) -> Result<()> {
    let formatter = OutputFormatter::new(global.quiet, global.verbose);

    let path = input.to_path_buf();
    let info = blocking(move || {
        let mut documents = DocumentSet::new();
        let id = documents.register(&path);
        describe(documents.get_mut(id)?)
    })
    .await?;

    if global.json {
        println!("{}", to_json(&info)?);
        return Ok(());
    }

    formatter.section(&info.path.display().to_string());
    formatter.info(&format!("  Version: {}", info.version));
    formatter.info(&format!("  Pages: {}", info.page_count));
    formatter.info(&format!("  Size: {}", format_file_size(info.file_size)));
    display_dimension_groups(&formatter, &info.groups);
    Ok(())
}

/// Handle output file overwrite scenarios.
fn handle_output_overwrite(
    output: &Path,
    mode: OverwriteMode,
    formatter: &OutputFormatter,
) -> Result<()> {
    if !output.exists() {
        return Ok(());
    }

    match mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(PageWielderError::output_exists(output.to_path_buf())),
        OverwriteMode::Prompt => {
            // In quiet mode, treat as no-clobber
            if formatter.is_quiet() {
                return Err(PageWielderError::output_exists(output.to_path_buf()));
            }

            formatter.warning(&format!("Output file already exists: {}", output.display()));
            let stdin = io::stdin();
            if confirm_overwrite(&mut stdin.lock(), &mut io::stdout())? {
                Ok(())
            } else {
                Err(PageWielderError::Cancelled)
            }
        }
    }
}

/// Simple yes/no prompt, defaulting to no.
fn confirm_overwrite<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<bool> {
    write!(output, "Overwrite? [y/N]: ")?;
    output.flush()?;

    let mut response = String::new();
    input.read_line(&mut response)?;

    let response = response.trim().to_lowercase();
    Ok(response == "y" || response == "yes")
}

/// A fresh, kept `.pdf` path in the system temp directory.
fn temporary_output() -> Result<PathBuf> {
    let file = tempfile::Builder::new()
        .prefix("pagewielder-")
        .suffix(".pdf")
        .tempfile()?;

    file.into_temp_path()
        .keep()
        .map_err(|err| PageWielderError::FailedToCreateOutput {
            path: err.path.to_path_buf(),
            source: err.error,
        })
}

/// Save `document`. A failed write to a temporary output removes the
/// placeholder file.
async fn write_output(
    writer: &PdfWriter,
    document: Document,
    output: &Path,
    temporary: bool,
) -> Result<WriteStatistics> {
    match writer.save_owned(document, output).await {
        Ok(stats) => Ok(stats),
        Err(err) => {
            if temporary && let Err(remove_err) = tokio::fs::remove_file(output).await {
                debug!(path = %output.display(), error = %remove_err, "temporary output not removed");
            }
            Err(err)
        }
    }
}

/// Run engine work off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(f)
        .await
        .map_err(|e| PageWielderError::execution(format!("Engine task failed: {e}")))?
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| PageWielderError::execution(format!("Failed to encode JSON: {e}")))
}
