use chrono::{TimeZone, Utc};
use std::sync::Arc;
use worknotes_core::{
    CollectionKind, CollectionStorage, Employee, KeyValueStore, Message, SqliteKeyValueStore,
    StorageCause, StorageError,
};

fn sample_messages() -> Vec<Message> {
    let base = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).single().unwrap();
    vec![
        Message::with_id("m-b", "second written first", base),
        Message::with_id("m-a", "Great idea", base + chrono::Duration::seconds(30)),
    ]
}

#[test]
fn save_then_load_returns_equal_collection() {
    let kv = Arc::new(SqliteKeyValueStore::open_in_memory().unwrap());
    let storage = CollectionStorage::new(kv);

    let messages = sample_messages();
    let mut ana = Employee::new("Ana", Some("m-a".to_string()));
    ana.attach_note("m-b");
    let employees = vec![ana, Employee::new("Bia", None)];

    storage.save(&messages).unwrap();
    storage.save(&employees).unwrap();

    assert_eq!(storage.load::<Message>().unwrap(), messages);
    assert_eq!(storage.load::<Employee>().unwrap(), employees);
}

#[test]
fn missing_collections_load_as_empty() {
    let storage = CollectionStorage::new(Arc::new(SqliteKeyValueStore::open_in_memory().unwrap()));

    assert!(storage.load::<Message>().unwrap().is_empty());
    assert!(storage.load::<Employee>().unwrap().is_empty());
}

#[test]
fn save_replaces_previous_collection() {
    let storage = CollectionStorage::new(Arc::new(SqliteKeyValueStore::open_in_memory().unwrap()));

    storage.save(&sample_messages()).unwrap();
    storage.save::<Message>(&[]).unwrap();

    assert!(storage.load::<Message>().unwrap().is_empty());
}

#[test]
fn collections_survive_reopening_the_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("worknotes.db");
    let messages = sample_messages();

    {
        let storage = CollectionStorage::new(Arc::new(SqliteKeyValueStore::open(&path).unwrap()));
        storage.save(&messages).unwrap();
    }

    let reopened = CollectionStorage::new(Arc::new(SqliteKeyValueStore::open(&path).unwrap()));
    assert_eq!(reopened.load::<Message>().unwrap(), messages);
}

#[test]
fn persisted_layout_uses_external_field_names() {
    let kv = Arc::new(SqliteKeyValueStore::open_in_memory().unwrap());
    let storage = CollectionStorage::new(kv.clone());
    storage.save(&sample_messages()).unwrap();
    storage
        .save(&[Employee::new("Ana", Some("m-a".to_string()))])
        .unwrap();

    let raw_messages = kv.get(CollectionKind::Messages.storage_key()).unwrap().unwrap();
    let messages: serde_json::Value = serde_json::from_slice(&raw_messages).unwrap();
    assert_eq!(messages[1]["id"], "m-a");
    assert_eq!(messages[1]["text"], "Great idea");
    assert!(messages[1]["createdAt"].is_string());

    let raw_employees = kv.get(CollectionKind::Employees.storage_key()).unwrap().unwrap();
    let employees: serde_json::Value = serde_json::from_slice(&raw_employees).unwrap();
    assert_eq!(employees[0]["name"], "Ana");
    assert_eq!(employees[0]["notes"], serde_json::json!(["m-a"]));
}

#[test]
fn legacy_payload_with_js_timestamps_loads() {
    let kv = Arc::new(SqliteKeyValueStore::open_in_memory().unwrap());
    kv.set(
        CollectionKind::Messages.storage_key(),
        br#"[{"id":"1700000000000-a1b2c3","text":"Ship it","createdAt":"2023-11-14T22:13:20.000Z"}]"#,
    )
    .unwrap();
    kv.set(
        CollectionKind::Employees.storage_key(),
        br#"[{"id":"1700000000001-ffee","name":"Ana","notes":["1700000000000-a1b2c3"]}]"#,
    )
    .unwrap();

    let storage = CollectionStorage::new(kv);
    let messages = storage.load::<Message>().unwrap();
    let employees = storage.load::<Employee>().unwrap();

    assert_eq!(messages[0].text, "Ship it");
    assert_eq!(employees[0].notes, vec![messages[0].id.clone()]);
}

#[test]
fn message_with_unparseable_timestamp_is_a_read_error() {
    let kv = Arc::new(SqliteKeyValueStore::open_in_memory().unwrap());
    kv.set(
        CollectionKind::Messages.storage_key(),
        br#"[{"id":"m1","text":"x","createdAt":"yesterday"}]"#,
    )
    .unwrap();

    let err = CollectionStorage::new(kv).load::<Message>().unwrap_err();
    assert!(matches!(
        err,
        StorageError::Read {
            kind: CollectionKind::Messages,
            cause: StorageCause::Decode(_),
        }
    ));
}
