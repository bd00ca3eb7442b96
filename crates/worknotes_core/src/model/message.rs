//! Chat message record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::generate_id;

/// Identifier of a [`Message`]; also the value stored in `Employee::notes`.
pub type MessageId = String;

/// Free-form chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    /// Trimmed, non-empty body.
    pub text: String,
    /// Serialized as an ISO-8601 UTC string under `createdAt`.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Creates a message with a fresh id stamped at the current time.
    ///
    /// Callers are expected to pass already-normalized text.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_id(generate_id(), text, Utc::now())
    }

    /// Creates a message with a caller-provided identity and timestamp.
    pub fn with_id(
        id: impl Into<MessageId>,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            created_at,
        }
    }
}
