//! Utilities for glob expansion and size formatting.

use crate::engine::plan::OperationSpec;
use crate::error::{PageWielderError, Result};
use std::path::PathBuf;

/// Expand a glob pattern into filesystem paths, sorted.
///
/// Pattern examples:
/// - `"**/*.pdf"`
/// - `"./docs/chapter*.pdf"`
///
/// Errors:
/// - `InvalidConfig` for a malformed pattern or one that matches nothing.
pub fn collect_paths_for_pattern<P: AsRef<str>>(pattern: P) -> Result<Vec<PathBuf>> {
    let pattern = pattern.as_ref();

    let paths = glob::glob(pattern).map_err(|err| {
        PageWielderError::invalid_config(format!("Invalid glob pattern '{pattern}': {err}"))
    })?;

    let mut resolved_paths = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| PageWielderError::invalid_config(err.to_string()))?;
        resolved_paths.push(path);
    }
    resolved_paths.sort();

    if resolved_paths.is_empty() {
        return Err(PageWielderError::invalid_config(format!(
            "No files match pattern '{pattern}'"
        )));
    }

    Ok(resolved_paths)
}

/// Whether `s` contains glob metacharacters.
pub fn is_glob_pattern(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

/// Replace every spec whose input is a glob pattern with one spec per match.
pub fn expand_spec_globs(specs: Vec<OperationSpec>) -> Result<Vec<OperationSpec>> {
    let mut expanded = Vec::with_capacity(specs.len());

    for spec in specs {
        let input = spec.input.to_string_lossy().into_owned();
        if !is_glob_pattern(&input) || spec.input.exists() {
            expanded.push(spec);
            continue;
        }

        for path in collect_paths_for_pattern(&input)? {
            expanded.push(OperationSpec {
                input: path,
                ..spec.clone()
            });
        }
    }

    Ok(expanded)
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
