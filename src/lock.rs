//! Advisory whole-file locks.
//!
//! Uses `fs2` exclusive flock on an open handle to the named file. The lock
//! is cooperative: it excludes other advisory lockers only, never a process
//! that reads or writes the file without taking the lock. The flock
//! mechanism is known to be unreliable on NFS-mounted media ("No locks
//! available"); keep lock files on local filesystems.
//!
//! Design:
//! - [`lock`] / [`try_lock`] return an RAII [`FileLock`] guard; dropping the
//!   guard releases the lock best-effort, [`FileLock::unlock`] releases it
//!   with an explicit error path.
//! - The "unlock the last one" convenience of the original interface is an
//!   explicit opt-in wrapper, [`LockTracker`], owned by the caller — not
//!   process-global state.
//!
//! Blocking acquisition models cooperative producer/consumer handoff between
//! processes sharing a filesystem. There are no timeouts; callers needing
//! bounded waits must poll with [`try_lock`].

use crate::errors::FsError;
use fs2::FileExt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::trace;

/// RAII guard for an advisory exclusive lock on one file.
/// Dropping the guard releases the lock (closing the handle also releases it).
#[derive(Debug)]
pub struct FileLock {
    file: Option<File>,
    path: PathBuf,
}

impl FileLock {
    /// Path of the locked file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock explicitly. Prefer this over plain `drop` when the
    /// caller must observe a release failure; that failure is fatal-tier.
    pub fn unlock(mut self) -> Result<(), FsError> {
        let file = self.file.take().expect("lock file handle already taken");
        FileExt::unlock(&file).map_err(|e| FsError::UnlockFailed {
            path: self.path.clone(),
            source: e,
        })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // flock releases on close; the explicit unlock is best-effort here.
        if let Some(f) = self.file.take() {
            let _ = FileExt::unlock(&f);
        }
    }
}

fn open_for_lock(path: &Path) -> Result<File, FsError> {
    // The file must already exist and be readable to the caller.
    File::open(path).map_err(|e| FsError::Open {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Acquire an exclusive advisory lock on `path`, blocking until the holder
/// releases it or terminates.
///
/// Open and lock failures are fatal-tier. One process can hold several locks
/// (one per file); concurrent processes must acquire multiple locks in the
/// same order or deadlock will result. Locking the same file twice within
/// one process is not advisable.
pub fn lock(path: &Path) -> Result<FileLock, FsError> {
    let file = open_for_lock(path)?;
    let start = Instant::now();
    file.lock_exclusive().map_err(|e| FsError::LockFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    let waited = start.elapsed();
    if waited.is_zero() {
        trace!(path = %path.display(), "lock acquired immediately");
    } else {
        trace!(path = %path.display(), waited_ms = waited.as_millis() as u64, "lock acquired after wait");
    }
    Ok(FileLock {
        file: Some(file),
        path: path.to_path_buf(),
    })
}

/// Non-blocking variant of [`lock`].
///
/// Returns `Ok(None)` — after closing the handle — if another process holds
/// the lock. An open failure, or a lock failure for any reason other than
/// contention, is fatal-tier.
pub fn try_lock(path: &Path) -> Result<Option<FileLock>, FsError> {
    let file = open_for_lock(path)?;
    match file.try_lock_exclusive() {
        Ok(()) => {
            trace!(path = %path.display(), "try-lock success");
            Ok(Some(FileLock {
                file: Some(file),
                path: path.to_path_buf(),
            }))
        }
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
            trace!(path = %path.display(), "try-lock would block");
            Ok(None)
        }
        Err(e) => Err(FsError::LockFailed {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Caller-owned "last lock" slot.
///
/// Remembers the single most recently acquired lock so the common
/// lock-then-unlock sequence needs no handle bookkeeping:
///
/// ```no_run
/// use std::path::Path;
/// let mut locks = filekit::LockTracker::new();
/// locks.lock(Path::new("spool.dat")).unwrap();
/// locks.unlock_last().unwrap(); // releases spool.dat
/// ```
///
/// WARNING: this is a single slot, deliberately not a stack. The slot owns
/// its guard, so acquiring a second lock through the tracker drops — and
/// thereby releases — the previously tracked lock, and `unlock_last` then
/// refers to the newer one:
///
/// ```text
/// locks.lock(a)?;
/// locks.try_lock(b)?;     // slot now holds b; a was released on overwrite
/// locks.unlock_last()?;   // releases b, NOT a
/// locks.unlock_last()     // Err(NoLastLock)
/// ```
///
/// Sequences that need several locks held at once must use the
/// handle-returning [`lock`] / [`try_lock`] functions directly.
/// Not thread-safe; confine a tracker to one thread or guard it with an
/// external mutex.
#[derive(Debug, Default)]
pub struct LockTracker {
    last: Option<FileLock>,
}

impl LockTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocking acquire; the new lock becomes the tracked "last" lock.
    /// A previously tracked lock is released (its guard is dropped).
    pub fn lock(&mut self, path: &Path) -> Result<&FileLock, FsError> {
        let guard = lock(path)?;
        Ok(self.last.insert(guard))
    }

    /// Non-blocking acquire. On contention the slot is left untouched, so a
    /// later [`unlock_last`](Self::unlock_last) still refers to the previous
    /// successful acquisition.
    pub fn try_lock(&mut self, path: &Path) -> Result<Option<&FileLock>, FsError> {
        match try_lock(path)? {
            Some(guard) => Ok(Some(self.last.insert(guard))),
            None => Ok(None),
        }
    }

    /// Release the most recently acquired lock and clear the slot.
    /// Fatal-tier `NoLastLock` if nothing is tracked.
    pub fn unlock_last(&mut self) -> Result<(), FsError> {
        match self.last.take() {
            Some(guard) => guard.unlock(),
            None => Err(FsError::NoLastLock),
        }
    }

    /// Path of the currently tracked lock, if any.
    pub fn last_path(&self) -> Option<&Path> {
        self.last.as_ref().map(|l| l.path())
    }
}
