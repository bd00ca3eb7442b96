//! Core data layer for WorkNotes.
//! This crate is the single source of truth for the message/employee
//! collections and their persistence rules.

pub mod config;
pub mod db;
pub mod kv;
pub mod logging;
pub mod model;
pub mod query;
pub mod storage;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use kv::{KeyValueStore, KvError, KvResult, MemoryKeyValueStore, SqliteKeyValueStore};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::{normalize_text, Employee, EmployeeId, Message, MessageId};
pub use storage::{
    CollectionKind, CollectionStorage, Record, StorageCause, StorageError, StorageResult,
};
pub use store::{DataStore, StoreNotice, StoreSnapshot};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
