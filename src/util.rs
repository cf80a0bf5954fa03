#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern, glob_with};
use uuid::Uuid;

/// Lists the regular files directly inside `dir`, sorted by path.
///
/// Hidden files and subdirectories are skipped.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let root = dir
        .to_str()
        .context("Could not convert directory path to string")?;
    let pattern = format!("{}/*", Pattern::escape(root));
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };

    let mut files: Vec<PathBuf> = glob_with(&pattern, options)
        .context("Could not create glob")?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Writes `contents` to `path` through a sibling temporary file so readers
/// never observe a half-written file. Existing content is replaced.
pub fn write_replacing(path: &Path, contents: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid output path {}", path.display()))?;
    let tmp = path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

    fs::write(&tmp, contents).with_context(|| format!("Could not write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Could not replace {}", path.display()))?;
    Ok(())
}

/// Lowercases `name` and joins its words with dashes, for use in file names.
pub fn slug(name: &str) -> String {
    name.split(|c: char| c.is_whitespace() || c == '/' || c == '\\')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
