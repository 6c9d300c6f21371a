//! DiskStore Tests
//!
//! Tests verify:
//! - Directory creation on open
//! - Whole-file write/read and overwrite
//! - NotFound vs IO failure distinction
//! - Directory scan filtering

use std::fs;

use objectvault::storage::DiskStore;
use objectvault::VaultError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, DiskStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = DiskStore::open(&temp_dir.path().join("objects")).unwrap();
    (temp_dir, store)
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_creates_nested_directory() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("a").join("b");

    let store = DiskStore::open(&dir).unwrap();

    assert!(dir.is_dir());
    assert_eq!(store.dir(), dir.as_path());
}

#[test]
fn test_open_existing_directory() {
    let temp_dir = TempDir::new().unwrap();
    DiskStore::open(temp_dir.path()).unwrap();
    DiskStore::open(temp_dir.path()).unwrap();
}

#[test]
fn test_open_on_regular_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("file");
    fs::write(&path, b"x").unwrap();

    let result = DiskStore::open(&path);
    assert!(matches!(result, Err(VaultError::Io(_))));
}

#[test]
fn test_new_does_not_touch_disk() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("later");

    let _store = DiskStore::new(&dir);
    assert!(!dir.exists());
}

// =============================================================================
// Read / Write Tests
// =============================================================================

#[test]
fn test_write_then_read() {
    let (_temp, store) = setup_temp_store();

    store.write_file("obj", b"bytes").unwrap();

    assert_eq!(store.read_file("obj").unwrap(), b"bytes");
    assert_eq!(fs::read(store.path_for("obj")).unwrap(), b"bytes");
}

#[test]
fn test_write_overwrites() {
    let (_temp, store) = setup_temp_store();

    store.write_file("obj", b"a much longer first version").unwrap();
    store.write_file("obj", b"v2").unwrap();

    assert_eq!(store.read_file("obj").unwrap(), b"v2");
}

#[test]
fn test_read_missing_is_not_found() {
    let (_temp, store) = setup_temp_store();

    let result = store.read_file("missing");
    assert!(matches!(result, Err(VaultError::NotFound)));
}

#[test]
fn test_invalid_key_is_rejected() {
    let (_temp, store) = setup_temp_store();

    assert!(matches!(store.write_file("../escape", b"x"), Err(VaultError::InvalidKey)));
    assert!(matches!(store.read_file("a/b"), Err(VaultError::InvalidKey)));
}

#[test]
fn test_write_into_replaced_directory_fails() {
    let (temp, store) = setup_temp_store();
    let dir = temp.path().join("objects");
    fs::remove_dir_all(&dir).unwrap();
    fs::write(&dir, b"not a directory").unwrap();

    assert!(matches!(store.write_file("obj", b"x"), Err(VaultError::Io(_))));
    assert!(matches!(store.read_file("obj"), Err(VaultError::Io(_))));
}

// =============================================================================
// Directory Scan Tests
// =============================================================================

#[test]
fn test_list_directory_returns_regular_files() {
    let (_temp, store) = setup_temp_store();
    store.write_file("b", b"2").unwrap();
    store.write_file("a", b"1").unwrap();
    fs::create_dir(store.dir().join("subdir")).unwrap();

    let keys: Vec<_> = store.list_directory().unwrap().into_iter().collect();
    assert_eq!(keys, vec!["a", "b"]);
}

#[cfg(unix)]
#[test]
fn test_list_directory_skips_invalid_names() {
    let (_temp, store) = setup_temp_store();
    store.write_file("good", b"1").unwrap();
    fs::write(store.dir().join("back\\slash"), b"2").unwrap();

    let keys: Vec<_> = store.list_directory().unwrap().into_iter().collect();
    assert_eq!(keys, vec!["good"]);
}

#[test]
fn test_list_empty_directory() {
    let (_temp, store) = setup_temp_store();
    assert!(store.list_directory().unwrap().is_empty());
}
