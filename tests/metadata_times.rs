use filetime::FileTime;
use filekit::{last_modified, scan};
use std::fs;
use std::time::{Duration, SystemTime};

mod common;

#[test]
fn last_modified_reflects_pinned_mtime() {
    common::init_logging();
    let td = tempfile::tempdir().unwrap();
    let f = td.path().join("pinned.txt");
    fs::write(&f, b"content").unwrap();

    let pinned = FileTime::from_unix_time(1_000_000_000, 0);
    filetime::set_file_mtime(&f, pinned).unwrap();

    let got = last_modified(&f).unwrap();
    let expect = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
    assert_eq!(got, expect);
}

#[test]
fn scan_timestamps_match_standalone_queries() {
    let td = tempfile::tempdir().unwrap();
    let f = td.path().join("stamped");
    fs::write(&f, b"1234").unwrap();
    filetime::set_file_mtime(&f, FileTime::from_unix_time(1_500_000_000, 0)).unwrap();

    let mut ds = scan(td.path(), None).unwrap();
    assert_eq!(ds.next().as_deref(), Some("stamped"));
    assert_eq!(ds.file_size(), 4);
    assert_eq!(ds.modified(), last_modified(&f).unwrap());
    // Cached: asking again must not change the answer.
    assert_eq!(
        ds.modified(),
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_500_000_000)
    );
    // Accessed time is filesystem-dependent; it must at least be readable.
    let _ = ds.accessed();
}
