//! Persistence integration tests: reopen, checksums, corruption.

use std::fs;

use serde_json::json;
use tempfile::TempDir;

use object_db_core::{Database, DbConfig, KeyRange, StoreError, TransactionMode};

fn config_for(dir: &TempDir) -> DbConfig {
    DbConfig {
        name: "persistdb".to_string(),
        data_dir: dir.path().to_path_buf(),
        ..Default::default()
    }
}

fn open_with_store(dir: &TempDir) -> Database {
    Database::open(config_for(dir), 1, |upgrade| {
        upgrade.create_object_store("things")
    })
    .unwrap()
}

#[test]
fn committed_data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let mut db = open_with_store(&dir);
    let mut tx = db.transaction("things", TransactionMode::ReadWrite).unwrap();
    let k1 = tx.add(json!({"text": "first"})).unwrap();
    let k2 = tx.add(json!({"text": "second"})).unwrap();
    tx.commit().unwrap();
    drop(db);

    let mut db = open_with_store(&dir);
    let tx = db.transaction("things", TransactionMode::ReadOnly).unwrap();
    assert_eq!(tx.get(k1).unwrap(), Some(json!({"text": "first"})));
    assert_eq!(tx.get(k2).unwrap(), Some(json!({"text": "second"})));
}

#[test]
fn key_generator_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let mut db = open_with_store(&dir);
    let mut tx = db.transaction("things", TransactionMode::ReadWrite).unwrap();
    tx.add(json!(1)).unwrap();
    tx.add(json!(2)).unwrap();
    tx.delete(2).unwrap();
    tx.commit().unwrap();
    drop(db);

    let mut db = open_with_store(&dir);
    let mut tx = db.transaction("things", TransactionMode::ReadWrite).unwrap();
    // Key 2 was handed out before the reopen and is never reused.
    assert_eq!(tx.add(json!(3)).unwrap(), 3);
    tx.commit().unwrap();
}

#[test]
fn uncommitted_writes_are_not_persisted() {
    let dir = TempDir::new().unwrap();
    let mut db = open_with_store(&dir);
    {
        let mut tx = db.transaction("things", TransactionMode::ReadWrite).unwrap();
        tx.add(json!("staged only")).unwrap();
    }
    drop(db);

    let mut db = open_with_store(&dir);
    let tx = db.transaction("things", TransactionMode::ReadOnly).unwrap();
    assert_eq!(tx.count(), 0);
}

#[test]
fn corrupted_data_file_fails_checksum() {
    let dir = TempDir::new().unwrap();
    let mut db = open_with_store(&dir);
    let mut tx = db.transaction("things", TransactionMode::ReadWrite).unwrap();
    tx.add(json!({"text": "victim"})).unwrap();
    tx.commit().unwrap();
    drop(db);

    let data_path = dir.path().join("stores").join("things.json");
    let mut contents = fs::read(&data_path).unwrap();
    let last = contents.len() - 1;
    contents[last] ^= 0xff;
    fs::write(&data_path, &contents).unwrap();

    let err = Database::open(config_for(&dir), 1, |_| Ok(())).unwrap_err();
    assert!(matches!(err, StoreError::DataCorruption(_)));
}

#[test]
fn scan_after_reopen_preserves_key_order() {
    let dir = TempDir::new().unwrap();
    let mut db = open_with_store(&dir);
    let mut tx = db.transaction("things", TransactionMode::ReadWrite).unwrap();
    for i in 0..5 {
        tx.add(json!({ "n": i })).unwrap();
    }
    tx.commit().unwrap();
    drop(db);

    let mut db = open_with_store(&dir);
    let tx = db.transaction("things", TransactionMode::ReadOnly).unwrap();
    let keys: Vec<u64> = tx.scan(KeyRange::All).into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec![1, 2, 3, 4, 5]);
}

#[test]
fn upgrade_creates_missing_store_on_version_bump() {
    let dir = TempDir::new().unwrap();
    let db = open_with_store(&dir);
    drop(db);

    // Version bump: the hook sees the old version and adds a store.
    let db = Database::open(config_for(&dir), 2, |upgrade| {
        assert_eq!(upgrade.old_version(), 1);
        assert!(upgrade.store_names().contains(&"things".to_string()));
        upgrade.create_object_store("extras")
    })
    .unwrap();
    assert_eq!(db.version(), 2);
    assert!(db.contains_store("extras"));
}
