use std::path::{Path, PathBuf};

use crate::error::{ConcatError, Result};

/// Expand glob patterns among `patterns`, keeping everything else as given.
///
/// Matches of a pattern are sorted alphabetically. A pattern that matches
/// nothing is kept literally so the missing file is reported by name later.
pub fn expand_input_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<Path>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns {
        resolved_paths.extend(expand_input_pattern(pattern.as_ref())?);
    }

    Ok(resolved_paths)
}

fn expand_input_pattern(pattern: &Path) -> Result<Vec<PathBuf>> {
    let Some(text) = pattern.to_str().filter(|text| is_glob(text)) else {
        return Ok(vec![pattern.to_path_buf()]);
    };

    let paths = glob::glob(text)
        .map_err(|err| ConcatError::invalid_config(format!("Invalid pattern '{text}': {err}")))?;

    let mut resolved_paths = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| ConcatError::Io(err.into()))?;
        resolved_paths.push(path);
    }

    if resolved_paths.is_empty() {
        tracing::debug!(pattern = text, "pattern matched nothing, keeping it literally");
        return Ok(vec![pattern.to_path_buf()]);
    }

    resolved_paths.sort();
    Ok(resolved_paths)
}

fn is_glob(text: &str) -> bool {
    text.contains(['*', '?', '['])
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
