//! Bulk directory snapshot with partitioned, restartable iteration.
//!
//! [`DirSnapshot::capture`] drives a [`crate::scan::DirScan`] to exhaustion
//! once, classifies every matched entry as directory or plain file, and keeps
//! only the derived name lists. Classification is never refreshed: filesystem
//! mutation after the snapshot is taken is not reflected.

use crate::errors::FsError;
use crate::file_ops;
use crate::scan;
use std::path::{Path, PathBuf};

/// Which partition [`DirSnapshot::next_entry`] iterates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    FilesOnly,
    DirsOnly,
    Both,
}

/// A directory's contents captured at one point in time.
#[derive(Debug)]
pub struct DirSnapshot {
    root: PathBuf,
    entries: Vec<String>,
    files: Vec<String>,
    dirs: Vec<String>,
    view: Option<View>,
    cursor: usize,
}

/// Trim one trailing separator, keeping the root directory intact.
fn trim_trailing_separator(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if s.len() > 1 && s.ends_with('/') {
        PathBuf::from(&s[..s.len() - 1])
    } else {
        path.to_path_buf()
    }
}

impl DirSnapshot {
    /// Capture the contents of `path`, filtered by `mask`.
    ///
    /// `mask` is a glob over entry names (`*`, `?`, `[]`); when `None`, all
    /// entries except dot-files are taken. A trailing separator on `path` is
    /// trimmed (root `/` excepted). Classification follows symlinks: a link
    /// pointing at a directory lands in the directory partition, everything
    /// else in the files partition. Each name also lands in the combined
    /// list.
    pub fn capture(path: &Path, mask: Option<&str>) -> Result<Self, FsError> {
        let root = trim_trailing_separator(path);

        let mut entries = Vec::new();
        let mut files = Vec::new();
        let mut dirs = Vec::new();

        let mut ds = scan::scan(&root, mask)?;
        while let Some(name) = ds.next() {
            if mask.is_none() && name.starts_with('.') {
                continue;
            }
            // Symlink-following classification; the scan's own is_dir() is
            // lstat-based and would put a link-to-directory among the files.
            let full = ds.full_path().unwrap_or_else(|| root.join(&name));
            if file_ops::query_dir(&full).is_none() {
                dirs.push(name.clone());
            } else {
                files.push(name.clone());
            }
            entries.push(name);
        }

        Ok(Self {
            root,
            entries,
            files,
            dirs,
            view: None,
            cursor: 0,
        })
    }

    /// Root path of the snapshot (trailing separator normalized away).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All matched names, in scan order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Names classified as plain files at capture time.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Names classified as directories at capture time.
    pub fn dirs(&self) -> &[String] {
        &self.dirs
    }

    /// Select the partition to iterate and reset the cursor to its start.
    /// Must be called before the first [`next_entry`](Self::next_entry);
    /// calling it again restarts iteration, possibly over another view.
    pub fn select_view(&mut self, view: View) {
        self.view = Some(view);
        self.cursor = 0;
    }

    /// Next name in the selected view, joined to the root path. `None` once
    /// the cursor passes the last element — and always `None` if no view was
    /// ever selected.
    pub fn next_entry(&mut self) -> Option<PathBuf> {
        let list = match self.view? {
            View::FilesOnly => &self.files,
            View::DirsOnly => &self.dirs,
            View::Both => &self.entries,
        };
        let name = list.get(self.cursor)?;
        self.cursor += 1;
        Some(self.root.join(name))
    }
}
