//! Persistent store adapter for whole collections.
//!
//! # Responsibility
//! - Map each collection kind to one fixed key in the key-value backend.
//! - Serialize/deserialize full collections as JSON.
//! - Classify failures as read or write errors for the data store.
//!
//! # Invariants
//! - `save` replaces the stored collection; there is no partial write.
//! - A missing or empty value loads as an empty collection.
//! - Messages and employees are stored independently; no write spans both.

use crate::kv::{KeyValueStore, KvError};
use crate::model::{Employee, Message};
use log::{debug, error};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

pub type StorageResult<T> = Result<T, StorageError>;

/// One of the two top-level record sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Messages,
    Employees,
}

impl CollectionKind {
    /// Storage key the collection lives under.
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Messages => "@worknotes/messages",
            Self::Employees => "@worknotes/employees",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Messages => "messages",
            Self::Employees => "employees",
        }
    }
}

impl Display for CollectionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Record type persisted as one collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: CollectionKind;
}

impl Record for Message {
    const KIND: CollectionKind = CollectionKind::Messages;
}

impl Record for Employee {
    const KIND: CollectionKind = CollectionKind::Employees;
}

/// Underlying reason for a storage failure.
#[derive(Debug)]
pub enum StorageCause {
    Backend(KvError),
    Decode(serde_json::Error),
    Encode(serde_json::Error),
}

impl Display for StorageCause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(err) => write!(f, "{err}"),
            Self::Decode(err) => write!(f, "stored content is malformed: {err}"),
            Self::Encode(err) => write!(f, "collection could not be serialized: {err}"),
        }
    }
}

/// Collection-level storage error.
#[derive(Debug)]
pub enum StorageError {
    /// Hydration failed: backend read error or undecodable content.
    Read {
        kind: CollectionKind,
        cause: StorageCause,
    },
    /// Persisting a collection failed.
    Write {
        kind: CollectionKind,
        cause: StorageCause,
    },
}

impl StorageError {
    pub fn kind(&self) -> CollectionKind {
        match self {
            Self::Read { kind, .. } | Self::Write { kind, .. } => *kind,
        }
    }

    pub fn is_read(&self) -> bool {
        matches!(self, Self::Read { .. })
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { kind, cause } => write!(f, "failed to load {kind}: {cause}"),
            Self::Write { kind, cause } => write!(f, "failed to save {kind}: {cause}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        let cause = match self {
            Self::Read { cause, .. } | Self::Write { cause, .. } => cause,
        };
        match cause {
            StorageCause::Backend(err) => Some(err),
            StorageCause::Decode(err) | StorageCause::Encode(err) => Some(err),
        }
    }
}

/// Whole-collection adapter over a key-value backend.
#[derive(Clone)]
pub struct CollectionStorage {
    kv: Arc<dyn KeyValueStore>,
}

impl CollectionStorage {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Loads the full collection for `T`.
    ///
    /// # Errors
    /// - `StorageError::Read` when the backend fails or the stored bytes do
    ///   not decode into `Vec<T>`.
    pub fn load<T: Record>(&self) -> StorageResult<Vec<T>> {
        let started_at = Instant::now();
        let result = self.load_inner::<T>();
        match &result {
            Ok(items) => debug!(
                "event=collection_load module=storage status=ok kind={} count={} duration_ms={}",
                T::KIND,
                items.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=collection_load module=storage status=error kind={} duration_ms={} error={}",
                T::KIND,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    /// Replaces the stored collection for `T` with `items`.
    ///
    /// # Errors
    /// - `StorageError::Write` when serialization or the backend write fails.
    pub fn save<T: Record>(&self, items: &[T]) -> StorageResult<()> {
        let started_at = Instant::now();
        let result = self.save_inner(items);
        match &result {
            Ok(()) => debug!(
                "event=collection_save module=storage status=ok kind={} count={} duration_ms={}",
                T::KIND,
                items.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=collection_save module=storage status=error kind={} count={} duration_ms={} error={}",
                T::KIND,
                items.len(),
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn load_inner<T: Record>(&self) -> StorageResult<Vec<T>> {
        let read_error = |cause| StorageError::Read {
            kind: T::KIND,
            cause,
        };
        let stored = self
            .kv
            .get(T::KIND.storage_key())
            .map_err(|err| read_error(StorageCause::Backend(err)))?;

        match stored {
            Some(bytes) if !bytes.is_empty() => serde_json::from_slice(&bytes)
                .map_err(|err| read_error(StorageCause::Decode(err))),
            _ => Ok(Vec::new()),
        }
    }

    fn save_inner<T: Record>(&self, items: &[T]) -> StorageResult<()> {
        let write_error = |cause| StorageError::Write {
            kind: T::KIND,
            cause,
        };
        let bytes =
            serde_json::to_vec(items).map_err(|err| write_error(StorageCause::Encode(err)))?;
        self.kv
            .set(T::KIND.storage_key(), &bytes)
            .map_err(|err| write_error(StorageCause::Backend(err)))
    }
}

#[cfg(test)]
mod tests {
    use super::{CollectionKind, CollectionStorage, StorageCause, StorageError};
    use crate::kv::{KeyValueStore, MemoryKeyValueStore};
    use crate::model::{Employee, Message};
    use std::sync::Arc;

    fn memory_storage() -> (Arc<MemoryKeyValueStore>, CollectionStorage) {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let storage = CollectionStorage::new(kv.clone());
        (kv, storage)
    }

    #[test]
    fn keys_are_distinct_per_kind() {
        assert_ne!(
            CollectionKind::Messages.storage_key(),
            CollectionKind::Employees.storage_key()
        );
    }

    #[test]
    fn empty_stored_value_loads_as_empty_collection() {
        let (kv, storage) = memory_storage();
        kv.set(CollectionKind::Messages.storage_key(), b"")
            .expect("seed empty value");
        assert!(storage.load::<Message>().expect("load").is_empty());
    }

    #[test]
    fn malformed_content_is_a_read_error() {
        let (kv, storage) = memory_storage();
        kv.set(CollectionKind::Employees.storage_key(), br#"{"not":"a list"}"#)
            .expect("seed malformed value");

        let err = storage.load::<Employee>().expect_err("decode should fail");
        assert!(err.is_read());
        assert_eq!(err.kind(), CollectionKind::Employees);
        assert!(matches!(
            err,
            StorageError::Read {
                cause: StorageCause::Decode(_),
                ..
            }
        ));
    }

    #[test]
    fn backend_write_failure_is_a_write_error() {
        let (kv, storage) = memory_storage();
        kv.fail_writes(true);

        let err = storage
            .save(&[Message::new("hello")])
            .expect_err("write should fail");
        assert!(!err.is_read());
        assert_eq!(err.kind(), CollectionKind::Messages);
    }

    #[test]
    fn collections_are_stored_independently() {
        let (_kv, storage) = memory_storage();
        storage
            .save(&[Employee::new("Ana", None)])
            .expect("save employees");

        assert!(storage.load::<Message>().expect("load messages").is_empty());
        assert_eq!(storage.load::<Employee>().expect("load employees").len(), 1);
    }
}
