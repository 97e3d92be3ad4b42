//! Typed error definitions for filekit.
//! Provides a small set of well-known failure modes for better logs and tests.
//!
//! Errors come in two tiers:
//! - recoverable: the caller plausibly wants to continue (a slurp that hit a
//!   vanished or oversized file, a copy/move/remove that failed, an unknown
//!   user). These carry a short OS-derived or static diagnostic.
//! - fatal: programmer error or an unrecoverable environment failure at the
//!   moment the primitive is needed (opening a file the caller declared
//!   mandatory, a lock primitive failing for a reason other than contention,
//!   releasing a lock that was never tracked). `is_fatal()` is true for
//!   these; call sites that want terminate-on-failure use `fatal::OrDie`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    /// A mandatory open failed (read, write or append). Fatal tier.
    #[error("cannot open '{}': {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    /// A file could not be opened or stat'ed for a whole-file read.
    #[error("file not accessible '{}': {reason}", .path.display())]
    NotAccessible { path: PathBuf, reason: String },

    /// Whole-file read refused: size exceeds the fixed ceiling.
    #[error("file too large '{}': {size} bytes exceeds {limit}", .path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    /// Bytes read differ from the size stat'ed just before reading.
    /// Usually means a concurrent writer was active.
    #[error("size mismatch on '{}': expected {expected} bytes, got {actual} (concurrent writer?)", .path.display())]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    /// The operation is defined for plain files only (e.g. copying a directory).
    #[error("unsupported operation on '{}': {reason}", .path.display())]
    Unsupported { path: PathBuf, reason: &'static str },

    /// Thin wrapper failures (copy, move, remove, mkdir, metadata queries).
    /// Carries the OS diagnostic.
    #[error("{op} '{}': {source}", .path.display())]
    Os {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    /// The lock primitive failed for a reason other than contention. Fatal tier.
    #[error("lock failed on '{}': {source}", .path.display())]
    LockFailed { path: PathBuf, source: io::Error },

    /// Releasing the lock failed. Fatal tier.
    #[error("unlock failed on '{}': {source}", .path.display())]
    UnlockFailed { path: PathBuf, source: io::Error },

    /// `unlock_last` was requested but no lock is currently tracked. Fatal tier.
    #[error("no lock is currently tracked")]
    NoLastLock,

    /// The mailbox backing file could not be created. Fatal tier.
    #[error("cannot create mailbox file '{}': {source}", .path.display())]
    MailboxCreate { path: PathBuf, source: io::Error },

    /// The directory-scan filter is not a valid glob pattern.
    #[error("bad glob pattern '{pattern}': {source}")]
    BadPattern {
        pattern: String,
        source: globset::Error,
    },
}

impl FsError {
    /// True for the process-terminating tier of §fatal conditions.
    /// These never represent a state the caller can sensibly continue from;
    /// pair with [`crate::fatal::OrDie`] to preserve abort-on-failure behavior.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FsError::Open { .. }
                | FsError::LockFailed { .. }
                | FsError::UnlockFailed { .. }
                | FsError::NoLastLock
                | FsError::MailboxCreate { .. }
        )
    }
}
