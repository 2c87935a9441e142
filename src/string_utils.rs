//! Title and file-name helpers
//!
//! Document titles double as file names (`<title>.md`), so they have to be
//! usable on every platform the editor runs on. This module centralizes the
//! title/path conversions used by imports and name commits.

use std::path::Path;

/// File extensions recognized as Markdown (lowercase).
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Check whether a title can be committed as a file name.
///
/// A usable title is non-empty after trimming and contains no path
/// separators or NUL bytes. Anything else would change the target
/// directory of the commit or be unrepresentable on disk.
pub fn is_valid_title(title: &str) -> bool {
    let trimmed = title.trim();
    !trimmed.is_empty() && !trimmed.contains(['/', '\\', '\0'])
}

/// Build the on-disk file name for a committed title.
pub fn markdown_file_name(title: &str) -> String {
    format!("{}.md", title.trim())
}

/// Extract the display title (filename stem) from a path.
///
/// Returns `None` for paths without a usable stem (e.g. `..`).
pub fn file_stem_title(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.to_string())
}

/// Check whether a path points at a Markdown file, by extension.
pub fn is_markdown_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MARKDOWN_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
