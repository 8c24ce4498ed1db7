//! Tests for CompressedAdapter
//!
//! These tests verify:
//! - Per-value compression with type tags
//! - The compressed document format on disk
//! - Loading every earlier format revision
//! - Corrupt files surface as format errors

use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

use emdb::adapter::{Adapter, CompressedAdapter};
use emdb::{EmError, Value};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (TempDir, PathBuf, CompressedAdapter) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("compressed.db");
    let adapter = CompressedAdapter::new(&path);
    (temp_dir, path, adapter)
}

fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn unzlib(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    ZlibDecoder::new(data).read_to_end(&mut out).unwrap();
    out
}

fn load(path: &PathBuf) -> CompressedAdapter {
    let mut adapter = CompressedAdapter::new(path);
    adapter.deserialize_store().unwrap();
    adapter
}

// =============================================================================
// Basic Operations
// =============================================================================

#[test]
fn test_put_stores_compressed_tagged_record() {
    let (_temp, _path, mut adapter) = setup();
    let large = "x".repeat(1000);

    adapter.put("large", Value::from(large.as_str())).unwrap();
    adapter.put("bin", Value::from(vec![7u8; 100])).unwrap();

    let record = adapter.record("large").unwrap();
    assert!(!record.is_buffer());
    assert!(record.data().len() < large.len());
    assert_eq!(unzlib(record.data()), large.as_bytes());

    assert!(adapter.record("bin").unwrap().is_buffer());
}

#[test]
fn test_same_bytes_different_types() {
    let (_temp, path, mut adapter) = setup();

    adapter.put("as_text", Value::from("payload")).unwrap();
    adapter.put("as_bytes", Value::from(&b"payload"[..])).unwrap();
    adapter.serialize_store().unwrap();

    let reloaded = load(&path);
    assert_eq!(reloaded.get("as_text").unwrap(), Some(Value::from("payload")));
    assert_eq!(reloaded.get("as_bytes").unwrap(), Some(Value::from(&b"payload"[..])));
}

// =============================================================================
// File Format
// =============================================================================

#[test]
fn test_file_is_compressed_json_of_records() {
    let (_temp, path, mut adapter) = setup();

    adapter.put("key1", Value::from("value1")).unwrap();
    adapter.serialize_store().unwrap();

    let json: serde_json::Value = serde_json::from_slice(&unzlib(&fs::read(&path).unwrap())).unwrap();
    let entry = &json["key1"];
    assert_eq!(entry["isBuffer"], serde_json::Value::Bool(false));
    assert!(entry["data"].is_string());
}

#[test]
fn test_empty_store_serializes() {
    let (_temp, path, adapter) = setup();

    adapter.serialize_store().unwrap();

    assert!(path.exists());
    assert_eq!(unzlib(&fs::read(&path).unwrap()), b"{}");
}

#[test]
fn test_round_trip_through_disk() {
    let (_temp, path, mut adapter) = setup();
    let binary: Vec<u8> = (0..=255).collect();

    adapter.put("key1", Value::from("value1")).unwrap();
    adapter.put("key2", Value::from(binary.clone())).unwrap();
    adapter.put("empty", Value::from("")).unwrap();
    adapter.serialize_store().unwrap();

    let reloaded = load(&path);
    assert_eq!(reloaded.size().unwrap(), 3);
    assert_eq!(reloaded.get("key1").unwrap(), Some(Value::from("value1")));
    assert_eq!(reloaded.get("key2").unwrap(), Some(Value::from(binary)));
    assert_eq!(reloaded.get("empty").unwrap(), Some(Value::from("")));
}

// =============================================================================
// Legacy Formats
// =============================================================================

#[test]
fn test_legacy_plain_string_entry() {
    let (_temp, path, _adapter) = setup();
    fs::write(&path, zlib(br#"{"a":"hello"}"#)).unwrap();

    let adapter = load(&path);

    assert_eq!(adapter.get("a").unwrap(), Some(Value::from("hello")));
    assert!(!adapter.record("a").unwrap().is_buffer());
}

#[test]
fn test_legacy_buffer_entry() {
    let (_temp, path, _adapter) = setup();
    let doc = serde_json::json!({
        "bin": {"type": "Buffer", "data": zlib(b"old bytes")},
    });
    fs::write(&path, zlib(doc.to_string().as_bytes())).unwrap();

    let adapter = load(&path);

    assert_eq!(adapter.get("bin").unwrap(), Some(Value::from(&b"old bytes"[..])));
    assert!(adapter.record("bin").unwrap().is_buffer());
}

#[test]
fn test_current_entry_with_buffer_object_payload() {
    let (_temp, path, _adapter) = setup();
    let doc = serde_json::json!({
        "text": {"data": {"type": "Buffer", "data": zlib(b"hi")}, "isBuffer": false},
        "bin": {"data": {"type": "Buffer", "data": zlib(&[0, 1])}, "isBuffer": true},
    });
    fs::write(&path, zlib(doc.to_string().as_bytes())).unwrap();

    let adapter = load(&path);

    assert_eq!(adapter.get("text").unwrap(), Some(Value::from("hi")));
    assert_eq!(adapter.get("bin").unwrap(), Some(Value::from(vec![0u8, 1])));
}

#[test]
fn test_mixed_revisions_in_one_file() {
    let (_temp, path, _adapter) = setup();
    let doc = serde_json::json!({
        "rev0": "plain",
        "rev1": {"type": "Buffer", "data": zlib(b"buffer")},
        "rev2": {"data": {"type": "Buffer", "data": zlib(b"tagged")}, "isBuffer": false},
    });
    fs::write(&path, zlib(doc.to_string().as_bytes())).unwrap();

    let mut adapter = load(&path);
    assert_eq!(adapter.size().unwrap(), 3);

    // Re-serializing writes every entry in the current shape
    adapter.serialize_store().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&unzlib(&fs::read(&path).unwrap())).unwrap();
    for key in ["rev0", "rev1", "rev2"] {
        assert!(json[key]["data"].is_string(), "{key}");
        assert!(json[key]["isBuffer"].is_boolean(), "{key}");
    }

    adapter = load(&path);
    assert_eq!(adapter.get("rev0").unwrap(), Some(Value::from("plain")));
    assert_eq!(adapter.get("rev1").unwrap(), Some(Value::from(&b"buffer"[..])));
    assert_eq!(adapter.get("rev2").unwrap(), Some(Value::from("tagged")));
}

// =============================================================================
// Error Handling
// =============================================================================

#[test]
fn test_uncompressed_file_is_format_error() {
    let (_temp, path, mut adapter) = setup();
    fs::write(&path, br#"{"a":"hello"}"#).unwrap();

    let err = adapter.deserialize_store().unwrap_err();
    assert!(matches!(err, EmError::Format(_)), "{err}");
}

#[test]
fn test_truncated_file_is_format_error() {
    let (_temp, path, mut adapter) = setup();
    adapter.put("key", Value::from("value ".repeat(200))).unwrap();
    adapter.serialize_store().unwrap();

    let full = fs::read(&path).unwrap();
    fs::write(&path, &full[..full.len() / 2]).unwrap();

    let mut reloaded = CompressedAdapter::new(&path);
    let err = reloaded.deserialize_store().unwrap_err();
    assert!(matches!(err, EmError::Format(_)), "{err}");
}

#[test]
fn test_unrecognized_entry_names_key() {
    let (_temp, path, mut adapter) = setup();
    fs::write(&path, zlib(br#"{"good":"v","bad":42}"#)).unwrap();

    let err = adapter.deserialize_store().unwrap_err();
    match err {
        EmError::Format(msg) => assert!(msg.contains("'bad'"), "{msg}"),
        other => panic!("expected format error, got {other}"),
    }
    assert_eq!(adapter.size().unwrap(), 0);
}
