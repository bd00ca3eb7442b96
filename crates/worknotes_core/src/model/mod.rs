//! Domain model for chat messages and employee annotations.
//!
//! # Responsibility
//! - Define the two canonical record shapes owned by the data store.
//! - Keep input normalization rules in one place.
//!
//! # Invariants
//! - Ids are generated once at creation and never mutated or reused.
//! - `Employee::notes` never holds the same message id twice.
//! - `notes` entries are references only; they may outlive the message.

pub mod employee;
pub mod ids;
pub mod message;

pub use employee::{Employee, EmployeeId};
pub use message::{Message, MessageId};

/// Trims user input and rejects values that are empty afterwards.
///
/// Returns `None` for the validation no-op path shared by every create and
/// rename operation.
pub fn normalize_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
