use crate::storage::{CollectionKind, StorageError};

/// User-facing storage warning emitted by the data store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreNotice {
    /// Hydration failed; in-memory state kept its previous value.
    LoadFailed {
        kind: CollectionKind,
        message: String,
    },
    /// A write failed after the mutation was already applied in memory.
    SaveFailed {
        kind: CollectionKind,
        message: String,
    },
}

impl StoreNotice {
    pub fn kind(&self) -> CollectionKind {
        match self {
            Self::LoadFailed { kind, .. } | Self::SaveFailed { kind, .. } => *kind,
        }
    }

    /// Short text suitable for an alert.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::LoadFailed { .. } => "Could not load saved data.",
            Self::SaveFailed { .. } => {
                "Could not save your changes locally. Check the device storage."
            }
        }
    }
}

impl From<&StorageError> for StoreNotice {
    fn from(err: &StorageError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        if err.is_read() {
            Self::LoadFailed { kind, message }
        } else {
            Self::SaveFailed { kind, message }
        }
    }
}
