//! Output formatting and display for pagewielder.
//!
//! This module handles all user-facing output:
//! - Formatted status messages
//! - Plan listings for dry runs
//! - Page size groups
//! - Run summaries
//!
//! # Examples
//!
//! ```no_run
//! use pagewielder::output::OutputFormatter;
//! use pagewielder::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Building plan");
//! formatter.success("Done");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::dimensions::DimensionGroup;
use crate::engine::{ExecutionStatistics, PlanSummary};
use crate::io::WriteStatistics;

/// One line per output page, e.g. `3. b.pdf page 2 (rotate90)`.
pub fn plan_lines(summary: &PlanSummary) -> Vec<String> {
    summary
        .pages
        .iter()
        .map(|page| {
            let mut line = format!("{} page {}", page.input.display(), page.page);
            if page.transform != "identity" {
                line.push_str(&format!(" ({})", page.transform));
            }
            line
        })
        .collect()
}

/// Print a dry-run plan.
pub fn display_plan_summary(formatter: &OutputFormatter, summary: &PlanSummary) {
    formatter.section(&format!(
        "Plan: {} page(s) from {} document(s)",
        summary.total_pages,
        summary.inputs.len()
    ));

    for input in &summary.inputs {
        let pages = input
            .page_count
            .map(|count| format!("{count} pages"))
            .unwrap_or_else(|| "not opened".to_string());
        formatter.info(&format!(
            "  {} ({pages}, {} used)",
            input.path.display(),
            input.pages_used
        ));
    }

    formatter.section("Output pages:");
    for (i, line) in plan_lines(summary).iter().enumerate() {
        formatter.list_item(i + 1, line);
    }
}

/// `0: 612.00 x 792.00 (3 pages)` style lines, indexed from 0.
pub fn dimension_group_lines(groups: &[DimensionGroup]) -> Vec<String> {
    groups
        .iter()
        .enumerate()
        .map(|(i, group)| {
            format!(
                "{i}: {} ({} page{})",
                group.dimensions,
                group.page_count(),
                if group.page_count() == 1 { "" } else { "s" }
            )
        })
        .collect()
}

/// Print page size groups.
pub fn display_dimension_groups(formatter: &OutputFormatter, groups: &[DimensionGroup]) {
    formatter.info("Available dimensions (width x height) and number of pages:");
    for line in dimension_group_lines(groups) {
        formatter.info(&line);
    }
}

/// Print the result of a run.
pub fn display_run_summary(
    formatter: &OutputFormatter,
    execution: &ExecutionStatistics,
    write: &WriteStatistics,
) {
    formatter.success(&format!(
        "Wrote {} page(s) to {}",
        execution.pages_written,
        write.output_path.display()
    ));
    formatter.detail("Source documents", &execution.documents_used.to_string());
    formatter.detail("Rotated pages", &execution.pages_rotated.to_string());
    formatter.detail("Duplicated pages", &execution.duplicated_pages.to_string());
    formatter.detail("Output size", &write.format_file_size());
    formatter.detail(
        "Time",
        &format!(
            "{:.2}s",
            (execution.elapsed + write.write_time).as_secs_f64()
        ),
    );
}
