#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Unpacking the submissions archive.

use std::{
    collections::BTreeSet,
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use zip::read::ZipArchive;

use crate::util;

/// Extracts the zip archive at `archive` into `dest` and returns the
/// top-level, non-hidden files it contained, sorted by name.
///
/// Files already in `dest` from an earlier run are not returned. Entries whose
/// names would escape `dest` abort the extraction.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(archive)
        .with_context(|| format!("Could not open archive {}", archive.display()))?;
    let mut zip = ZipArchive::new(file)
        .with_context(|| format!("{} is not a readable zip archive", archive.display()))?;
    fs::create_dir_all(dest)
        .with_context(|| format!("Could not create {}", dest.display()))?;

    let mut extracted = BTreeSet::new();
    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .with_context(|| format!("Could not read entry {i} of {}", archive.display()))?;
        let Some(relative) = entry.enclosed_name() else {
            bail!("Archive entry `{}` has an unsafe path", entry.name());
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath)
                .with_context(|| format!("Could not create {}", outpath.display()))?;
            continue;
        }
        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Could not create {}", parent.display()))?;
        }
        let mut outfile = File::create(&outpath)
            .with_context(|| format!("Could not create {}", outpath.display()))?;
        io::copy(&mut entry, &mut outfile)
            .with_context(|| format!("Could not extract {}", outpath.display()))?;
        extracted.insert(outpath);
    }

    let files: Vec<PathBuf> = util::list_files(dest)?
        .into_iter()
        .filter(|path| extracted.contains(path))
        .collect();
    tracing::info!(
        "Extracted {} files from {} into {}",
        files.len(),
        archive.display(),
        dest.display()
    );
    Ok(files)
}
