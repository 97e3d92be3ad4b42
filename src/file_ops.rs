//! File access primitives: open with stdio passthrough, whole-file slurp,
//! byte-wise comparison, copy/move/remove/mkdir, metadata and user lookups.
//!
//! Error policy follows two tiers (see [`crate::errors`]): the open helpers
//! and `files_equal`'s opens are fatal-tier — the caller declared the file
//! mandatory — while everything else returns recoverable errors carrying the
//! OS diagnostic. Callers that need recoverable opens should pre-check
//! accessibility with [`query_plain_file`] / [`query_dir`].

use crate::errors::FsError;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Ceiling for [`read_whole`]: 2 GiB.
pub const READ_WHOLE_LIMIT: u64 = 2 * 1024 * 1024 * 1024;

/// Default mode for [`make_dir`] on Unix.
pub const DEFAULT_DIR_MODE: u32 = 0o775;

const COPY_BUF_SIZE: usize = 1024 * 1024; // 1 MiB buffers
const EQUAL_BUF_SIZE: usize = 64 * 1024;

/// Readable handle from [`open_read`]: a plain file, or stdin for `-`.
#[derive(Debug)]
pub enum ReadHandle {
    Stdin(io::Stdin),
    File(File),
}

impl Read for ReadHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            ReadHandle::Stdin(s) => s.read(buf),
            ReadHandle::File(f) => f.read(buf),
        }
    }
}

/// Writable handle from [`open_write`] / [`open_append`]: a plain file, or
/// stdout for `-`.
pub enum WriteHandle {
    Stdout(io::Stdout),
    File(File),
}

impl Write for WriteHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            WriteHandle::Stdout(s) => s.write(buf),
            WriteHandle::File(f) => f.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            WriteHandle::Stdout(s) => s.flush(),
            WriteHandle::File(f) => f.flush(),
        }
    }
}

/// Open a file for reading; `-` denotes stdin.
/// Failure is fatal-tier: the caller declared this file mandatory.
pub fn open_read(name: &str) -> Result<ReadHandle, FsError> {
    if name == "-" {
        return Ok(ReadHandle::Stdin(io::stdin()));
    }
    File::open(name)
        .map(ReadHandle::File)
        .map_err(|e| FsError::Open {
            path: PathBuf::from(name),
            source: e,
        })
}

/// Open a file for writing (truncating); `-` denotes stdout.
/// Failure is fatal-tier.
pub fn open_write(name: &str) -> Result<WriteHandle, FsError> {
    if name == "-" {
        return Ok(WriteHandle::Stdout(io::stdout()));
    }
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(name)
        .map(WriteHandle::File)
        .map_err(|e| FsError::Open {
            path: PathBuf::from(name),
            source: e,
        })
}

/// Open a file for appending (created if missing); `-` denotes stdout.
/// Failure is fatal-tier.
pub fn open_append(name: &str) -> Result<WriteHandle, FsError> {
    if name == "-" {
        return Ok(WriteHandle::Stdout(io::stdout()));
    }
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(name)
        .map(WriteHandle::File)
        .map_err(|e| FsError::Open {
            path: PathBuf::from(name),
            source: e,
        })
}

/// Read a whole file into memory.
///
/// In text mode one NUL terminator byte is appended to the returned buffer.
/// Recoverable failures: the file cannot be opened or stat'ed
/// (`NotAccessible`), its size exceeds [`READ_WHOLE_LIMIT`] (`TooLarge`), or
/// fewer bytes than the stat'ed size could be read (`SizeMismatch`, which
/// signals a concurrent truncation).
///
/// Bytes appended by a concurrent writer after the stat are not included;
/// this is a snapshot of the size observed immediately before reading.
pub fn read_whole(path: &Path, text_mode: bool) -> Result<Vec<u8>, FsError> {
    let file = File::open(path).map_err(|e| FsError::NotAccessible {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let meta = file.metadata().map_err(|e| FsError::NotAccessible {
        path: path.to_path_buf(),
        reason: format!("stat failed: {e}"),
    })?;
    let size = meta.len();
    if size > READ_WHOLE_LIMIT {
        return Err(FsError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit: READ_WHOLE_LIMIT,
        });
    }

    let mut contents = Vec::with_capacity(size as usize + usize::from(text_mode));
    let read = file
        .take(size)
        .read_to_end(&mut contents)
        .map_err(|e| FsError::NotAccessible {
            path: path.to_path_buf(),
            reason: format!("read failed: {e}"),
        })?;
    if read as u64 != size {
        return Err(FsError::SizeMismatch {
            path: path.to_path_buf(),
            expected: size,
            actual: read as u64,
        });
    }
    if text_mode {
        contents.push(0);
    }
    Ok(contents)
}

/// Byte-wise file comparison: equal iff both streams reach EOF simultaneously
/// with all prior bytes equal. Open failures are fatal-tier.
pub fn files_equal(a: &Path, b: &Path) -> Result<bool, FsError> {
    let open = |p: &Path| {
        File::open(p).map_err(|e| FsError::Open {
            path: p.to_path_buf(),
            source: e,
        })
    };
    let mut ra = BufReader::with_capacity(EQUAL_BUF_SIZE, open(a)?);
    let mut rb = BufReader::with_capacity(EQUAL_BUF_SIZE, open(b)?);

    loop {
        let (na, nb) = {
            let ba = ra.fill_buf().map_err(|e| FsError::Os {
                op: "compare: read",
                path: a.to_path_buf(),
                source: e,
            })?;
            let bb = rb.fill_buf().map_err(|e| FsError::Os {
                op: "compare: read",
                path: b.to_path_buf(),
                source: e,
            })?;
            if ba.is_empty() || bb.is_empty() {
                return Ok(ba.is_empty() && bb.is_empty());
            }
            let n = ba.len().min(bb.len());
            if ba[..n] != bb[..n] {
                return Ok(false);
            }
            (n, n)
        };
        ra.consume(na);
        rb.consume(nb);
    }
}

/// Byte-wise copy of a plain file. Overwrites `dst`; timestamps are not
/// preserved; directories are refused (`Unsupported`). A symlinked source is
/// followed, so the referred file's bytes are copied.
/// Returns the number of bytes written.
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64, FsError> {
    let meta = fs::metadata(src).map_err(|e| FsError::Os {
        op: "copy: stat source",
        path: src.to_path_buf(),
        source: e,
    })?;
    if meta.is_dir() {
        return Err(FsError::Unsupported {
            path: src.to_path_buf(),
            reason: "directories cannot be copied",
        });
    }

    let from = File::open(src).map_err(|e| FsError::Os {
        op: "copy: open source",
        path: src.to_path_buf(),
        source: e,
    })?;
    let to = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(dst)
        .map_err(|e| FsError::Os {
            op: "copy: open destination",
            path: dst.to_path_buf(),
            source: e,
        })?;

    let mut reader = BufReader::with_capacity(COPY_BUF_SIZE, from);
    let mut writer = BufWriter::with_capacity(COPY_BUF_SIZE, to);
    let bytes = io::copy(&mut reader, &mut writer).map_err(|e| FsError::Os {
        op: "copy",
        path: dst.to_path_buf(),
        source: e,
    })?;
    writer.flush().map_err(|e| FsError::Os {
        op: "copy: flush",
        path: dst.to_path_buf(),
        source: e,
    })?;
    debug!(src = %src.display(), dst = %dst.display(), bytes, "copied file");
    Ok(bytes)
}

/// Move a file: copy then remove the source. If the removal fails after a
/// successful copy, the removal error is surfaced and the copy is not rolled
/// back — a duplicate may remain. This is the accepted semantics.
pub fn move_file(src: &Path, dst: &Path) -> Result<(), FsError> {
    copy_file(src, dst)?;
    remove(src)
}

/// Remove a file or an empty directory. Errors carry the OS diagnostic.
pub fn remove(path: &Path) -> Result<(), FsError> {
    let meta = fs::symlink_metadata(path).map_err(|e| FsError::Os {
        op: "remove",
        path: path.to_path_buf(),
        source: e,
    })?;
    let res = if meta.is_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    };
    res.map_err(|e| FsError::Os {
        op: "remove",
        path: path.to_path_buf(),
        source: e,
    })
}

/// Create a directory with mode 0o775 on Unix. Errors carry the OS diagnostic.
pub fn make_dir(path: &Path) -> Result<(), FsError> {
    let res = {
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            fs::DirBuilder::new().mode(DEFAULT_DIR_MODE).create(path)
        }
        #[cfg(not(unix))]
        {
            fs::create_dir(path)
        }
    };
    res.map_err(|e| FsError::Os {
        op: "mkdir",
        path: path.to_path_buf(),
        source: e,
    })
}

/// Size in bytes of the file at `path`. An inaccessible path is an explicit
/// error, never an undefined value.
pub fn file_size(path: &Path) -> Result<u64, FsError> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| FsError::Os {
            op: "stat",
            path: path.to_path_buf(),
            source: e,
        })
}

/// Last-modification time of the file at `path`. An inaccessible path is an
/// explicit error, never an undefined value.
pub fn last_modified(path: &Path) -> Result<SystemTime, FsError> {
    let meta = fs::metadata(path).map_err(|e| FsError::Os {
        op: "stat",
        path: path.to_path_buf(),
        source: e,
    })?;
    meta.modified().map_err(|e| FsError::Os {
        op: "stat: mtime",
        path: path.to_path_buf(),
        source: e,
    })
}

/// Symbolic-link target of `path`, or `None` if `path` is not a symlink or
/// cannot be read.
pub fn read_link(path: &Path) -> Option<PathBuf> {
    fs::read_link(path).ok()
}

/// Check that `path` names a plain file.
/// Returns `None` when it does, else a short diagnostic.
pub fn query_plain_file(path: &Path) -> Option<&'static str> {
    match fs::metadata(path) {
        Err(_) => Some("file not accessible"),
        Ok(m) if m.is_file() => None,
        Ok(_) => Some("is not a plain file"),
    }
}

/// Check that `path` names a directory.
/// Returns `None` when it does, else a short diagnostic.
pub fn query_dir(path: &Path) -> Option<&'static str> {
    match fs::metadata(path) {
        Err(_) => Some("directory not accessible"),
        Ok(m) if m.is_dir() => None,
        Ok(_) => Some("is not a directory"),
    }
}

/// Home directory of the named account, or `None` for an unknown user.
///
/// The current user's home resolves through the platform convention first
/// (`dirs`), other accounts through the password database on Unix.
pub fn home_directory(user: &str) -> Option<PathBuf> {
    if current_user().as_deref() == Some(user)
        && let Some(home) = dirs::home_dir()
    {
        return Some(home);
    }
    lookup_home(user)
}

#[cfg(unix)]
fn lookup_home(user: &str) -> Option<PathBuf> {
    use std::ffi::{CStr, CString};
    use std::os::unix::ffi::OsStrExt;

    let cname = CString::new(user).ok()?;
    let mut buf = vec![0_i8; 4096];
    let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
    let mut result: *mut libc::passwd = std::ptr::null_mut();
    loop {
        let rc = unsafe {
            libc::getpwnam_r(
                cname.as_ptr(),
                &mut pwd,
                buf.as_mut_ptr() as *mut libc::c_char,
                buf.len(),
                &mut result,
            )
        };
        if rc == libc::ERANGE {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if rc != 0 || result.is_null() {
            return None;
        }
        let dir = unsafe { CStr::from_ptr(pwd.pw_dir) };
        return Some(PathBuf::from(std::ffi::OsStr::from_bytes(dir.to_bytes())));
    }
}

#[cfg(not(unix))]
fn lookup_home(_user: &str) -> Option<PathBuf> {
    None
}

/// Name of the effective user of the current process, asked from the
/// operating system. Used for diagnostics and the mailbox identity.
pub fn current_user() -> Option<String> {
    #[cfg(unix)]
    {
        use std::ffi::CStr;

        let mut buf = vec![0_i8; 4096];
        let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::passwd = std::ptr::null_mut();
        loop {
            let rc = unsafe {
                libc::getpwuid_r(
                    libc::geteuid(),
                    &mut pwd,
                    buf.as_mut_ptr() as *mut libc::c_char,
                    buf.len(),
                    &mut result,
                )
            };
            if rc == libc::ERANGE {
                buf.resize(buf.len() * 2, 0);
                continue;
            }
            if rc != 0 || result.is_null() {
                return None;
            }
            let name = unsafe { CStr::from_ptr(pwd.pw_name) };
            return Some(name.to_string_lossy().into_owned());
        }
    }
    #[cfg(not(unix))]
    {
        std::env::var("USERNAME").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn read_whole_text_mode_appends_terminator() {
        let td = tempdir().unwrap();
        let p = td.path().join("t.txt");
        fs::write(&p, b"abc").unwrap();

        let raw = read_whole(&p, false).unwrap();
        assert_eq!(raw, b"abc");

        let text = read_whole(&p, true).unwrap();
        assert_eq!(text, b"abc\0");
    }

    #[test]
    fn read_whole_missing_file_is_recoverable() {
        let td = tempdir().unwrap();
        let err = read_whole(&td.path().join("gone"), false).unwrap_err();
        assert!(matches!(err, FsError::NotAccessible { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn open_read_dash_is_stdin() {
        match open_read("-").unwrap() {
            ReadHandle::Stdin(_) => {}
            ReadHandle::File(_) => panic!("'-' must map to stdin"),
        }
    }

    #[test]
    fn open_write_dash_is_stdout() {
        match open_write("-").unwrap() {
            WriteHandle::Stdout(_) => {}
            WriteHandle::File(_) => panic!("'-' must map to stdout"),
        }
    }

    #[test]
    fn open_read_failure_is_fatal_tier() {
        let err = open_read("/definitely/not/there").unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn query_helpers_distinguish_kinds() {
        let td = tempdir().unwrap();
        let f = td.path().join("f");
        fs::write(&f, b"x").unwrap();

        assert_eq!(query_plain_file(&f), None);
        assert_eq!(query_dir(&f), Some("is not a directory"));
        assert_eq!(query_dir(td.path()), None);
        assert_eq!(query_plain_file(td.path()), Some("is not a plain file"));
        assert_eq!(
            query_plain_file(&td.path().join("nope")),
            Some("file not accessible")
        );
    }

    #[test]
    fn copy_refuses_directories() {
        let td = tempdir().unwrap();
        let sub = td.path().join("sub");
        fs::create_dir(&sub).unwrap();
        let err = copy_file(&sub, &td.path().join("out")).unwrap_err();
        assert!(matches!(err, FsError::Unsupported { .. }));
    }

    #[test]
    fn make_dir_and_remove_roundtrip() {
        let td = tempdir().unwrap();
        let d = td.path().join("newdir");
        make_dir(&d).unwrap();
        assert!(d.is_dir());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&d).unwrap().permissions().mode() & 0o777;
            // umask may clear group/other bits; owner bits must survive
            assert_eq!(mode & 0o700, 0o700);
        }
        remove(&d).unwrap();
        assert!(!d.exists());
    }

    #[test]
    fn size_and_mtime_error_on_missing() {
        let td = tempdir().unwrap();
        let gone = td.path().join("gone");
        assert!(matches!(file_size(&gone), Err(FsError::Os { .. })));
        assert!(matches!(last_modified(&gone), Err(FsError::Os { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn home_directory_of_current_user_resolves() {
        let user = current_user().expect("current user must resolve");
        let home = home_directory(&user).expect("home of current user");
        assert!(home.is_absolute());
        assert_eq!(home_directory("no-such-user-xyzzy"), None);
    }

    #[test]
    fn read_link_none_for_plain_file() {
        let td = tempdir().unwrap();
        let f = td.path().join("plain");
        fs::write(&f, b"x").unwrap();
        assert_eq!(read_link(&f), None);

        #[cfg(unix)]
        {
            let l = td.path().join("link");
            std::os::unix::fs::symlink(&f, &l).unwrap();
            assert_eq!(read_link(&l), Some(f));
        }
    }
}
