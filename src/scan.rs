//! Single-pass directory scan iterator with lazily cached entry metadata.
//!
//! [`scan`] reads one directory, applies an optional glob filter to the entry
//! names and sorts them byte-wise. The resulting [`DirScan`] yields bare
//! names through `Iterator`; per-entry queries ([`DirScan::full_path`],
//! [`DirScan::is_dir`], size and timestamps) operate on the *current* entry —
//! the one last returned by `next` — and cache their result for that entry
//! only. Repeated queries on the same entry do not re-stat; metadata is not
//! refreshed if the filesystem is mutated mid-scan. Metadata for entries
//! other than the current one is never retained.
//!
//! Stopping early is plain `drop` (RAII); exhausting the iterator needs no
//! cleanup either.

use crate::errors::FsError;
use globset::{Glob, GlobMatcher};
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::warn;

/// Lazily computed value keyed by the entry index it was computed for.
#[derive(Debug, Default)]
enum Cached<T> {
    #[default]
    Uncomputed,
    ComputedFor(usize, T),
}

impl<T> Cached<T> {
    fn get(&self, index: usize) -> Option<&T> {
        match self {
            Cached::ComputedFor(i, v) if *i == index => Some(v),
            _ => None,
        }
    }
}

/// In-progress enumeration of one directory's entries.
/// Created by [`scan`]; see the module docs for the caching contract.
#[derive(Debug)]
pub struct DirScan {
    dir: PathBuf,
    names: Vec<String>,
    /// Index of the current entry; `None` before the first `next`.
    index: Option<usize>,
    cached_path: Cached<PathBuf>,
    cached_stat: Cached<Metadata>,
}

/// Scan `dir` for entries matching `filter`.
///
/// `dir` must name an existing, readable directory without a trailing
/// separator (the root directory excepted). `filter` is a shell-style glob
/// (`*`, `?`, `[]`) matched against entry names; `None` matches everything.
/// The scan happens here, once; an unreadable directory is a recoverable
/// error, as is a malformed pattern.
pub fn scan(dir: &Path, filter: Option<&str>) -> Result<DirScan, FsError> {
    let matcher: Option<GlobMatcher> = match filter {
        Some(pattern) => Some(
            Glob::new(pattern)
                .map_err(|e| FsError::BadPattern {
                    pattern: pattern.to_string(),
                    source: e,
                })?
                .compile_matcher(),
        ),
        None => None,
    };

    let entries = fs::read_dir(dir).map_err(|e| FsError::Os {
        op: "scan",
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FsError::Os {
            op: "scan: read entry",
            path: dir.to_path_buf(),
            source: e,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(m) = &matcher
            && !m.is_match(&name)
        {
            continue;
        }
        names.push(name);
    }
    names.sort_unstable();

    Ok(DirScan {
        dir: dir.to_path_buf(),
        names,
        index: None,
        cached_path: Cached::Uncomputed,
        cached_stat: Cached::Uncomputed,
    })
}

impl Iterator for DirScan {
    type Item = String;

    /// Advance to the next matched entry and return its bare name.
    /// The index only increases; `None` means the scan is exhausted.
    fn next(&mut self) -> Option<String> {
        let next = match self.index {
            None => 0,
            Some(i) => i + 1,
        };
        if next >= self.names.len() {
            // Park the cursor past the end so entry queries go quiet.
            self.index = Some(self.names.len());
            return None;
        }
        self.index = Some(next);
        Some(self.names[next].clone())
    }
}

impl DirScan {
    /// Directory this scan was created for.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of matched entries.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn current_index(&self) -> Option<usize> {
        self.index.filter(|&i| i < self.names.len())
    }

    /// Full path of the current entry, or `None` when the scan is not
    /// positioned on an entry (before the first `next` or after exhaustion).
    pub fn full_path(&mut self) -> Option<PathBuf> {
        let i = self.current_index()?;
        if self.cached_path.get(i).is_none() {
            let joined = if self.dir == Path::new("/") {
                PathBuf::from(format!("/{}", self.names[i]))
            } else {
                self.dir.join(&self.names[i])
            };
            self.cached_path = Cached::ComputedFor(i, joined);
        }
        self.cached_path.get(i).cloned()
    }

    /// Stat the current entry (`lstat` semantics: symlinks are not followed),
    /// reusing the cached result when the same entry is queried twice.
    /// A vanished entry yields a warning and `None`, never an abort.
    fn stat(&mut self) -> Option<&Metadata> {
        let i = self.current_index()?;
        if self.cached_stat.get(i).is_none() {
            let path = self.full_path()?;
            match fs::symlink_metadata(&path) {
                Ok(meta) => self.cached_stat = Cached::ComputedFor(i, meta),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "entry not accessible");
                    return None;
                }
            }
        }
        self.cached_stat.get(i)
    }

    /// True if the current entry is a directory. `false` when the scan is not
    /// positioned on an entry or the entry vanished (after a warning).
    pub fn is_dir(&mut self) -> bool {
        self.stat().map(|m| m.is_dir()).unwrap_or(false)
    }

    /// Size of the current entry in bytes; `0` as the sentinel for a missing
    /// position or a vanished entry.
    pub fn file_size(&mut self) -> u64 {
        self.stat().map(|m| m.len()).unwrap_or(0)
    }

    /// Last-modification time of the current entry; `UNIX_EPOCH` as the
    /// sentinel for a missing position or a vanished entry.
    pub fn modified(&mut self) -> SystemTime {
        self.stat()
            .and_then(|m| m.modified().ok())
            .unwrap_or(SystemTime::UNIX_EPOCH)
    }

    /// Last-access time of the current entry; `UNIX_EPOCH` as the sentinel
    /// for a missing position or a vanished entry.
    pub fn accessed(&mut self) -> SystemTime {
        self.stat()
            .and_then(|m| m.accessed().ok())
            .unwrap_or(SystemTime::UNIX_EPOCH)
    }
}
