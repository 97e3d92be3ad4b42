//! Pure path-string utilities.
//!
//! These operate on the textual path, not the filesystem; they never touch
//! disk and never fail. Separator handling is `/` (Unix), matching the rest
//! of the crate's contracts.

/// Final path component, like the csh `:t` modifier.
/// Input without a separator is returned unchanged.
///
/// `../somepath/file` -> `file`, `file` -> `file`.
pub fn tail(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) => &path[i + 1..],
        None => path,
    }
}

/// Directory part of a path, without a trailing separator.
///
/// Contract table:
/// - `"/"` -> `"/"`
/// - `"abc"` -> `""`
/// - `"/abc"` -> `"/"`
/// - `"/abc/"` -> `"/abc"`
/// - `"/abc/def"` -> `"/abc"`
/// - `"abc/def"` -> `"abc"`
/// - `"./abc"` -> `"."`
/// - `"../abc/def"` -> `"../abc"`
pub fn parent_dir(path: &str) -> String {
    match path.rfind('/') {
        // Rightmost '/' at the start: keep it, that parent is the root.
        Some(0) => "/".to_string(),
        Some(i) => path[..i].to_string(),
        None => String::new(),
    }
}

/// True iff the path starts with the path separator.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}

/// File extension: the substring starting at the last `.` within the
/// basename, dot included (`strrchr` semantics), or `None` if absent.
/// A path whose basename has no dot — or is empty — has no extension.
pub fn extension(path: &str) -> Option<&str> {
    let base = tail(path);
    base.rfind('.').map(|i| &base[i..])
}
