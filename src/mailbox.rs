//! One-shot inter-process mailbox backed by the filesystem.
//!
//! Transport a string from one process to another via a temporary file: the
//! writer calls [`Mailbox::set`] and passes the returned id to the reader
//! "somehow" (typically a command-line argument); the reader calls
//! [`Mailbox::get_once`], which consumes and deletes the message.
//!
//! Message files live at a fixed, predictable path template parameterized
//! only by the numeric id. Any process that can compute the id can read or
//! clobber the message — this is a trust boundary, not a security mechanism.
//!
//! Known weakness, kept deliberately: the id is `pid * 256 + counter`, so it
//! is unique only within one host, and only as long as process ids are not
//! reused within the same 256-message window. A counter above 255 bleeds
//! into the pid bits. The payload must not contain a NUL byte.

use crate::errors::FsError;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Identifier of a message in flight; `0` is never a valid id.
pub type MessageId = u64;

/// Writer/reader handle for the file mailbox. Owns the per-process message
/// counter — construct one per process (or per test) rather than sharing.
/// Not thread-safe; confine to one thread.
#[derive(Debug)]
pub struct Mailbox {
    spool: PathBuf,
    counter: u64,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox {
    /// Mailbox spooling into the system temporary directory.
    pub fn new() -> Self {
        Self::with_dir(std::env::temp_dir())
    }

    /// Mailbox spooling into an explicit directory (tests point this at a
    /// tempdir). Both sides must use the same directory.
    pub fn with_dir(spool: impl Into<PathBuf>) -> Self {
        Self {
            spool: spool.into(),
            counter: 0,
        }
    }

    /// Backing file path for `id` — the fixed template of the contract.
    pub fn message_path(&self, id: MessageId) -> PathBuf {
        self.spool.join(format!("filekit_ipc_{id}.tmp"))
    }

    /// Write `message` and return the id under which it can be fetched.
    ///
    /// The message is written verbatim; it must not contain a NUL byte.
    /// Failure to create the backing file is fatal-tier.
    pub fn set(&mut self, message: &str) -> Result<MessageId, FsError> {
        self.counter += 1;
        let id = u64::from(std::process::id()) * 256 + self.counter;
        let path = self.message_path(id);

        let mut file = fs::File::create(&path).map_err(|e| FsError::MailboxCreate {
            path: path.clone(),
            source: e,
        })?;
        file.write_all(message.as_bytes())
            .map_err(|e| FsError::MailboxCreate {
                path: path.clone(),
                source: e,
            })?;
        debug!(id, path = %path.display(), bytes = message.len(), "mailbox message set");
        Ok(id)
    }

    /// Fetch and consume the message stored under `id`.
    ///
    /// Returns the empty string if `id` is zero, the backing file does not
    /// exist, or the message was already consumed — a second call with the
    /// same id always returns empty. On success the backing file is deleted;
    /// if the deletion fails, the removal diagnostic is prepended to the
    /// returned message rather than raised as an error.
    pub fn get_once(&self, id: MessageId) -> String {
        if id == 0 {
            return String::new();
        }
        let path = self.message_path(id);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(_) => return String::new(),
        };
        let mut message = String::from_utf8_lossy(&bytes).into_owned();
        if let Err(e) = fs::remove_file(&path) {
            warn!(id, path = %path.display(), error = %e, "mailbox cleanup failed");
            message.insert_str(0, &e.to_string());
        }
        message
    }
}

/// Consume a message from the default (system temp) spool directory.
/// Convenience for readers that never construct a writer-side [`Mailbox`].
pub fn get_once(id: MessageId) -> String {
    Mailbox::new().get_once(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn set_then_get_once_roundtrip() {
        let td = tempdir().unwrap();
        let mut mb = Mailbox::with_dir(td.path());
        let id = mb.set("hello!").unwrap();
        assert_ne!(id, 0);
        assert_eq!(mb.get_once(id), "hello!");
        // Consumed: second fetch is empty, not an error.
        assert_eq!(mb.get_once(id), "");
    }

    #[test]
    fn zero_and_unknown_ids_are_empty() {
        let td = tempdir().unwrap();
        let mb = Mailbox::with_dir(td.path());
        assert_eq!(mb.get_once(0), "");
        assert_eq!(mb.get_once(123_456_789), "");
    }

    #[test]
    fn ids_are_distinct_per_message() {
        let td = tempdir().unwrap();
        let mut mb = Mailbox::with_dir(td.path());
        let a = mb.set("a").unwrap();
        let b = mb.set("b").unwrap();
        assert_ne!(a, b);
        assert_eq!(mb.get_once(b), "b");
        assert_eq!(mb.get_once(a), "a");
    }

    #[test]
    fn empty_message_roundtrips() {
        let td = tempdir().unwrap();
        let mut mb = Mailbox::with_dir(td.path());
        let id = mb.set("").unwrap();
        assert_eq!(mb.get_once(id), "");
        assert!(!mb.message_path(id).exists());
    }

    #[test]
    fn set_into_missing_spool_is_fatal_tier() {
        let td = tempdir().unwrap();
        let mut mb = Mailbox::with_dir(td.path().join("absent"));
        let err = mb.set("x").unwrap_err();
        assert!(matches!(err, FsError::MailboxCreate { .. }));
        assert!(err.is_fatal());
    }
}
