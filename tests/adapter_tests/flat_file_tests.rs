//! Tests for FlatFileAdapter
//!
//! These tests verify:
//! - Directory creation and file-to-directory migration
//! - One raw file per key
//! - The in-memory type side-table and its loss across restarts

use std::fs;
use std::path::PathBuf;

use emdb::adapter::{Adapter, FlatFileAdapter, TypeFidelity};
use emdb::Value;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (TempDir, PathBuf, FlatFileAdapter) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("flat_db");
    let adapter = FlatFileAdapter::open(&path).unwrap();
    (temp_dir, path, adapter)
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_creates_directory() {
    let (_temp, path, adapter) = setup();

    assert!(path.is_dir());
    assert_eq!(adapter.dir(), path.as_path());
}

#[test]
fn test_open_creates_missing_parents() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("a").join("b").join("db");

    FlatFileAdapter::open(&path).unwrap();

    assert!(path.is_dir());
}

#[test]
fn test_open_replaces_regular_file_with_directory() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("was_a_file");
    fs::write(&path, "test content").unwrap();
    assert!(path.is_file());

    let mut adapter = FlatFileAdapter::open(&path).unwrap();

    assert!(path.is_dir());
    assert_eq!(adapter.size().unwrap(), 0);
    adapter.put("key", Value::from("value")).unwrap();
    assert_eq!(adapter.get("key").unwrap(), Some(Value::from("value")));
}

#[test]
fn test_open_keeps_existing_directory_contents() {
    let (_temp, path, mut adapter) = setup();
    adapter.put("kept", Value::from("v")).unwrap();

    let reopened = FlatFileAdapter::open(&path).unwrap();

    assert_eq!(reopened.keys().unwrap(), vec!["kept"]);
}

// =============================================================================
// Basic Operations
// =============================================================================

#[test]
fn test_put_writes_raw_file_per_key() {
    let (_temp, path, mut adapter) = setup();

    adapter.put("key1", Value::from("value1")).unwrap();
    adapter.put("key2", Value::from(vec![0u8, 255])).unwrap();

    assert_eq!(fs::read(path.join("key1")).unwrap(), b"value1");
    assert_eq!(fs::read(path.join("key2")).unwrap(), vec![0u8, 255]);
}

#[test]
fn test_side_table_preserves_types_within_session() {
    let (_temp, _path, mut adapter) = setup();
    assert_eq!(adapter.type_fidelity(), TypeFidelity::SessionOnly);

    adapter.put("text", Value::from("value1")).unwrap();
    adapter.put("bytes", Value::from(&b"test buffer"[..])).unwrap();
    adapter.put("empty", Value::from("")).unwrap();

    assert_eq!(adapter.get("text").unwrap(), Some(Value::from("value1")));
    assert_eq!(adapter.get("bytes").unwrap(), Some(Value::from(&b"test buffer"[..])));
    assert_eq!(adapter.get("empty").unwrap(), Some(Value::from("")));
}

#[test]
fn test_types_lost_after_restart() {
    let (_temp, path, mut adapter) = setup();
    adapter.put("text", Value::from("value1")).unwrap();

    let reopened = FlatFileAdapter::open(&path).unwrap();

    assert_eq!(reopened.get("text").unwrap(), Some(Value::from(&b"value1"[..])));
}

#[test]
fn test_get_missing_key() {
    let (_temp, _path, adapter) = setup();

    assert_eq!(adapter.get("non-existent").unwrap(), None);
}

#[test]
fn test_get_subdirectory_is_absent() {
    let (_temp, path, adapter) = setup();
    fs::create_dir(path.join("subdir")).unwrap();

    assert_eq!(adapter.get("subdir").unwrap(), None);
}

#[test]
fn test_put_is_durable_without_serialize() {
    let (_temp, path, mut adapter) = setup();

    adapter.put("key", Value::from("value")).unwrap();
    adapter.serialize_store().unwrap();
    adapter.deserialize_store().unwrap();

    assert!(path.join("key").is_file());
    assert_eq!(adapter.get("key").unwrap(), Some(Value::from("value")));
}

// =============================================================================
// Keys and Size
// =============================================================================

#[test]
fn test_keys_ignore_subdirectories() {
    let (_temp, path, mut adapter) = setup();

    adapter.put("key1", Value::from("value1")).unwrap();
    fs::create_dir(path.join("subdir")).unwrap();

    assert_eq!(adapter.keys().unwrap(), vec!["key1"]);
    assert_eq!(adapter.size().unwrap(), 1);
}

#[test]
fn test_keys_include_files_written_externally() {
    let (_temp, path, adapter) = setup();

    fs::write(path.join("external"), "data").unwrap();

    assert_eq!(adapter.keys().unwrap(), vec!["external"]);
    assert_eq!(adapter.get("external").unwrap(), Some(Value::from(&b"data"[..])));
}
