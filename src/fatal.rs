//! The abort path for fatal-tier errors.
//!
//! Every operation in this crate returns an explicit `Result`; nothing calls
//! `process::exit` behind the caller's back. Call sites that want the classic
//! terminate-on-failure behavior opt in with [`OrDie::or_die`], which funnels
//! through a single narrow primitive ([`die`]) so tests can intercept it with
//! [`set_abort_hook`] instead of losing the test process.

use crate::errors::FsError;
use std::process;
use std::sync::RwLock;
use tracing::error;

type AbortHook = Box<dyn Fn(&FsError) + Send + Sync>;

static ABORT_HOOK: RwLock<Option<AbortHook>> = RwLock::new(None);

/// Install a process-wide hook invoked by [`die`] before terminating.
/// Intended for tests: a hook that panics (or otherwise unwinds) prevents the
/// process exit. Replaces any previously installed hook.
pub fn set_abort_hook(hook: impl Fn(&FsError) + Send + Sync + 'static) {
    *ABORT_HOOK.write().expect("abort hook lock poisoned") = Some(Box::new(hook));
}

/// Remove the installed hook, restoring plain terminate-on-failure behavior.
pub fn clear_abort_hook() {
    *ABORT_HOOK.write().expect("abort hook lock poisoned") = None;
}

/// Report a fatal error and terminate the process.
///
/// If a hook is installed it runs first; a hook that unwinds (panics) aborts
/// the termination, which is exactly what tests want. If the hook returns
/// normally we still refuse to continue.
pub fn die(err: FsError) -> ! {
    {
        let hook = ABORT_HOOK.read().expect("abort hook lock poisoned");
        if let Some(h) = hook.as_ref() {
            h(&err);
            panic!("fatal error (abort hook returned): {err}");
        }
    }
    error!(error = %err, "fatal");
    eprintln!("filekit: fatal: {err}");
    process::exit(1)
}

/// Extension for `Result<T, FsError>`: unwrap or abort through [`die`].
pub trait OrDie<T> {
    /// Return the success value or terminate the process via the abort path.
    fn or_die(self) -> T;
}

impl<T> OrDie<T> for Result<T, FsError> {
    fn or_die(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => die(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn sample_error() -> FsError {
        FsError::NoLastLock
    }

    #[test]
    #[serial]
    fn hook_intercepts_die() {
        let seen = Arc::new(AtomicBool::new(false));
        let seen2 = seen.clone();
        set_abort_hook(move |e| {
            assert!(e.is_fatal());
            seen2.store(true, Ordering::SeqCst);
            panic!("intercepted");
        });

        let res = std::panic::catch_unwind(|| {
            let r: Result<(), FsError> = Err(sample_error());
            r.or_die();
        });
        clear_abort_hook();

        assert!(res.is_err(), "or_die must not return on Err");
        assert!(seen.load(Ordering::SeqCst), "hook must observe the error");
    }

    #[test]
    #[serial]
    fn or_die_passes_through_ok() {
        set_abort_hook(|_| panic!("must not be called"));
        let r: Result<u32, FsError> = Ok(7);
        assert_eq!(r.or_die(), 7);
        clear_abort_hook();
    }

    #[test]
    #[serial]
    fn open_error_is_fatal_tier() {
        let e = FsError::Open {
            path: PathBuf::from("/no/such/file"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(e.is_fatal());
        let e = FsError::NotAccessible {
            path: PathBuf::from("/no/such/file"),
            reason: "gone".into(),
        };
        assert!(!e.is_fatal());
    }
}
