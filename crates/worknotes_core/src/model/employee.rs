//! Employee record and its note-reference set.
//!
//! # Invariants
//! - `notes` keeps insertion order and never contains duplicates.
//! - Mutators report whether they changed anything so callers can skip
//!   publishing and persisting no-ops.

use serde::{Deserialize, Serialize};

use super::ids::generate_id;
use super::message::MessageId;

/// Identifier of an [`Employee`].
pub type EmployeeId = String;

/// Person that chat messages can be attached to as notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    /// Trimmed, non-empty display name.
    pub name: String,
    /// Ordered message-id references. Not checked against the message set.
    pub notes: Vec<MessageId>,
}

impl Employee {
    /// Creates an employee with a fresh id and an optional first note.
    pub fn new(name: impl Into<String>, initial_note: Option<MessageId>) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            notes: initial_note.into_iter().collect(),
        }
    }

    pub fn has_note(&self, message_id: &str) -> bool {
        self.notes.iter().any(|id| id == message_id)
    }

    /// Appends `message_id` unless it is already referenced.
    pub fn attach_note(&mut self, message_id: &str) -> bool {
        if self.has_note(message_id) {
            return false;
        }
        self.notes.push(message_id.to_string());
        true
    }

    /// Drops `message_id` from the reference set.
    pub fn detach_note(&mut self, message_id: &str) -> bool {
        let before = self.notes.len();
        self.notes.retain(|id| id != message_id);
        self.notes.len() != before
    }

    /// Replaces the name; expects normalized input.
    pub fn rename(&mut self, name: String) -> bool {
        if self.name == name {
            return false;
        }
        self.name = name;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::Employee;

    #[test]
    fn new_employee_without_note_starts_empty() {
        let employee = Employee::new("Ana", None);
        assert!(employee.notes.is_empty());
        assert!(!employee.id.is_empty());
    }

    #[test]
    fn attach_note_skips_duplicates() {
        let mut employee = Employee::new("Ana", Some("m1".to_string()));
        assert!(!employee.attach_note("m1"));
        assert!(employee.attach_note("m2"));
        assert_eq!(employee.notes, vec!["m1".to_string(), "m2".to_string()]);
    }

    #[test]
    fn detach_then_attach_moves_note_to_end() {
        let mut employee = Employee::new("Ana", None);
        employee.attach_note("m1");
        employee.attach_note("m2");

        assert!(employee.detach_note("m1"));
        assert!(!employee.detach_note("m1"));
        assert!(employee.attach_note("m1"));
        assert_eq!(employee.notes, vec!["m2".to_string(), "m1".to_string()]);
    }

    #[test]
    fn rename_reports_unchanged_names() {
        let mut employee = Employee::new("Ana", None);
        assert!(!employee.rename("Ana".to_string()));
        assert!(employee.rename("Ana Souza".to_string()));
        assert_eq!(employee.name, "Ana Souza");
    }
}
