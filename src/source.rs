//! Worklist enumeration: every source file under a root, in a stable order.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::WorkItem;
use crate::engine::tools::{has_extension, is_excluded, is_os_hidden_file};
use crate::utils::config::PackagePaths;

fn is_pruned(entry: &DirEntry, root: &Path, exclude: &[String]) -> bool {
    let path = entry.path();
    path != root && (is_os_hidden_file(path) || is_excluded(path, exclude))
}

/// Collect files under `root` whose extension is in `extensions`, skipping `exclude`
/// patterns and the package defaults (`.git`, checkout dir, report file).
///
/// Any walk error (unreadable directory, vanished root) fails the whole enumeration: a
/// partial worklist would silently analyze less than asked.
pub fn collect_source_files(
    root: &Path,
    extensions: &[String],
    exclude: &[String],
) -> Result<Vec<PathBuf>> {
    let root = root
        .canonicalize()
        .with_context(|| format!("canonicalize {}", root.display()))?;
    let mut patterns = PackagePaths::get().default_exclude_patterns();
    patterns.extend(exclude.iter().cloned());

    let mut files = Vec::new();
    for entry in WalkDir::new(&root)
        .into_iter()
        .filter_entry(|e| !is_pruned(e, &root, &patterns))
    {
        let entry = entry.with_context(|| format!("enumerate files under {}", root.display()))?;
        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    log::debug!("Found {} source files under {}", files.len(), root.display());
    Ok(files)
}

/// [`collect_source_files`] wrapped as pipeline work items.
pub fn collect_work_items(
    root: &Path,
    extensions: &[String],
    exclude: &[String],
) -> Result<Vec<WorkItem>> {
    Ok(collect_source_files(root, extensions, exclude)?
        .into_iter()
        .map(WorkItem::from)
        .collect())
}
