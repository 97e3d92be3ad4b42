//! Core library for `filekit`.
//!
//! A small filesystem-resource layer: pure path-string helpers, file access
//! primitives with a two-tier error policy, advisory whole-file locks, a
//! filtered directory-scan iterator with lazily cached per-entry metadata, a
//! bulk directory snapshot with partitioned iteration views, and a one-shot
//! file-based inter-process mailbox.
//!
//! All operations are synchronous and blocking; the layer spawns no threads.
//! Cross-process coordination is the design target: [`lock`] gives mutual
//! exclusion on a named file, [`mailbox`] hands a string from one process to
//! another through the filesystem namespace. Stateful conveniences
//! ([`LockTracker`], [`Mailbox`]) are caller-owned context objects and are
//! not thread-safe.
//!
//! Errors follow two tiers (see [`errors`]): recoverable failures are
//! explicit `Result`s with an OS-derived diagnostic; conditions the original
//! contract treats as process-fatal are marked by [`FsError::is_fatal`] and
//! can be routed through the interceptable abort path in [`fatal`].

pub mod errors;
pub mod fatal;
pub mod file_ops;
pub mod lock;
pub mod mailbox;
pub mod path_ops;
pub mod scan;
pub mod snapshot;

pub use errors::FsError;
pub use fatal::{OrDie, clear_abort_hook, die, set_abort_hook};
pub use file_ops::{
    READ_WHOLE_LIMIT, ReadHandle, WriteHandle, copy_file, current_user, file_size, files_equal,
    home_directory, last_modified, make_dir, move_file, open_append, open_read, open_write,
    query_dir, query_plain_file, read_link, read_whole, remove,
};
pub use lock::{FileLock, LockTracker, lock, try_lock};
pub use mailbox::{Mailbox, MessageId};
pub use path_ops::{extension, is_absolute, parent_dir, tail};
pub use scan::{DirScan, scan};
pub use snapshot::{DirSnapshot, View};
