use std::fs;

use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial]
fn writes_log_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.txt");

    let guard = vecdraw::logging::init(true, Some(path.clone()));
    assert!(guard.is_some());
    tracing::info!("test");
    drop(guard);

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("test"));
}
