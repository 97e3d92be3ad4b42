use filekit::Mailbox;

mod common;

#[test]
fn handoff_between_writer_and_reader() {
    common::init_logging();
    let td = tempfile::tempdir().unwrap();

    // Writer and reader sides, sharing only the spool directory and the id —
    // the in-process stand-in for two cooperating processes.
    let mut writer = Mailbox::with_dir(td.path());
    let id = writer.set("hello!").unwrap();

    let reader = Mailbox::with_dir(td.path());
    assert_eq!(reader.get_once(id), "hello!");
    assert_eq!(reader.get_once(id), "");
}

#[test]
fn long_message_roundtrips_verbatim() {
    let td = tempfile::tempdir().unwrap();
    let mut mb = Mailbox::with_dir(td.path());

    let message: String = "0123456789abcdef".repeat(8192); // 128 KiB
    let id = mb.set(&message).unwrap();
    assert_eq!(mb.get_once(id), message);
}

#[test]
fn backing_file_is_deleted_on_first_get() {
    let td = tempfile::tempdir().unwrap();
    let mut mb = Mailbox::with_dir(td.path());
    let id = mb.set("once").unwrap();
    let path = mb.message_path(id);
    assert!(path.exists());
    mb.get_once(id);
    assert!(!path.exists());
}

#[test]
fn module_level_get_once_reads_default_spool() {
    // Reader side that never constructs a writer mailbox.
    let mut writer = Mailbox::new();
    let id = writer.set("via default spool").unwrap();
    assert_eq!(filekit::mailbox::get_once(id), "via default spool");
    assert_eq!(filekit::mailbox::get_once(id), "");
}

#[cfg(unix)]
#[test]
fn failed_cleanup_prepends_diagnostic() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    // Root bypasses permission checks; the failure cannot be provoked then.
    if unsafe { libc::geteuid() } == 0 {
        return;
    }

    let td = tempfile::tempdir().unwrap();
    let spool = td.path().join("spool");
    fs::create_dir(&spool).unwrap();
    let mut mb = Mailbox::with_dir(&spool);
    let id = mb.set("payload").unwrap();

    fs::set_permissions(&spool, fs::Permissions::from_mode(0o555)).unwrap();
    let got = mb.get_once(id);
    fs::set_permissions(&spool, fs::Permissions::from_mode(0o755)).unwrap();

    // The removal diagnostic is prepended, the payload still delivered.
    assert!(got.ends_with("payload"));
    assert!(got.len() > "payload".len());
}
