// SPDX-License-Identifier: MPL-2.0
//! Directory scanner module for finding SVG files.
//!
//! This module walks a directory tree, keeps files with an `.svg` extension,
//! and sorts them newest first so recently edited artwork is at the top.
//!
//! Symlinks are followed. Each directory is visited once, keyed by its
//! canonical path, so links back to an ancestor do not repeat entries.

use crate::error::{Error, Result};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One SVG found by [`SvgCatalog::scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgFile {
    pub path: PathBuf,
    /// File name including extension.
    pub name: String,
    pub modified: SystemTime,
}

impl SvgFile {
    /// Directory of this file relative to `root`, empty for files directly in it.
    pub fn relative_dir(&self, root: &Path) -> PathBuf {
        self.path
            .parent()
            .and_then(|parent| parent.strip_prefix(root).ok())
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }
}

/// SVG files under a root directory, most recently modified first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SvgCatalog {
    root: PathBuf,
    files: Vec<SvgFile>,
}

impl SvgCatalog {
    /// Recursively scans `root` for `.svg` files (extension case-insensitive).
    ///
    /// Returns an error if `root` or any directory below it cannot be read.
    pub fn scan(root: &Path) -> Result<Self> {
        let mut files = Vec::new();
        let mut visited = HashSet::new();
        collect_svg_files(root, &mut visited, &mut files)?;
        sort_newest_first(&mut files);
        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[SvgFile] {
        &self.files
    }

    /// Files whose name contains `query`, ignoring case, with their index in
    /// [`files`](Self::files). Order is preserved.
    pub fn filter<'a>(&'a self, query: &str) -> impl Iterator<Item = (usize, &'a SvgFile)> + 'a {
        let query = query.trim().to_lowercase();
        self.files
            .iter()
            .enumerate()
            .filter(move |(_, file)| query.is_empty() || file.name.to_lowercase().contains(&query))
    }

    pub fn get(&self, index: usize) -> Option<&SvgFile> {
        self.files.get(index)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Checks if a path has an `.svg` extension.
fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

fn collect_svg_files(
    dir: &Path,
    visited: &mut HashSet<PathBuf>,
    files: &mut Vec<SvgFile>,
) -> Result<()> {
    let canonical = fs::canonicalize(dir)
        .map_err(|e| Error::FileSystem(format!("cannot read {}: {e}", dir.display())))?;
    if !visited.insert(canonical) {
        return Ok(());
    }

    let entries = fs::read_dir(dir)
        .map_err(|e| Error::FileSystem(format!("cannot read {}: {e}", dir.display())))?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        // Follows symlinks, like `stat`
        let Ok(meta) = fs::metadata(&path) else {
            continue;
        };

        if meta.is_dir() {
            collect_svg_files(&path, visited, files)?;
        } else if meta.is_file() && is_svg(&path) {
            files.push(SvgFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                path,
            });
        }
    }
    Ok(())
}

/// Newest first; equal timestamps fall back to path order.
fn sort_newest_first(files: &mut [SvgFile]) {
    files.sort_by(|a, b| {
        Reverse(a.modified)
            .cmp(&Reverse(b.modified))
            .then_with(|| a.path.cmp(&b.path))
    });
}
