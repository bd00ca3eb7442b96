//! Note reference resolution.

use crate::model::{Employee, Message};
use std::collections::HashMap;

fn index_by_id(messages: &[Message]) -> HashMap<&str, &Message> {
    messages
        .iter()
        .map(|message| (message.id.as_str(), message))
        .collect()
}

/// Resolves `employee.notes` to messages, preserving note order.
///
/// Ids without a matching message are skipped.
pub fn resolve_employee_notes<'a>(
    employee: &Employee,
    messages: &'a [Message],
) -> Vec<&'a Message> {
    let by_id = index_by_id(messages);
    employee
        .notes
        .iter()
        .filter_map(|note_id| by_id.get(note_id.as_str()).copied())
        .collect()
}

/// Lists the note ids of `employee` that do not resolve to a message.
pub fn dangling_note_ids<'e>(employee: &'e Employee, messages: &[Message]) -> Vec<&'e str> {
    let by_id = index_by_id(messages);
    employee
        .notes
        .iter()
        .map(String::as_str)
        .filter(|note_id| !by_id.contains_key(note_id))
        .collect()
}

/// Messages oldest first, as the chat view renders them.
///
/// Ties keep insertion order.
pub fn messages_chronological(messages: &[Message]) -> Vec<&Message> {
    let mut ordered: Vec<&Message> = messages.iter().collect();
    ordered.sort_by_key(|message| message.created_at);
    ordered
}

#[cfg(test)]
mod tests {
    use super::{dangling_note_ids, messages_chronological, resolve_employee_notes};
    use crate::model::{Employee, Message};
    use chrono::{TimeZone, Utc};

    fn message(id: &str, minute: u32) -> Message {
        let created_at = Utc
            .with_ymd_and_hms(2024, 5, 1, 9, minute, 0)
            .single()
            .expect("valid timestamp");
        Message::with_id(id, format!("text {id}"), created_at)
    }

    #[test]
    fn resolve_skips_dangling_ids_and_keeps_note_order() {
        let messages = vec![message("m1", 0), message("m2", 1)];
        let mut employee = Employee::new("Ana", None);
        employee.notes = vec!["m2".to_string(), "gone".to_string(), "m1".to_string()];

        let resolved: Vec<&str> = resolve_employee_notes(&employee, &messages)
            .into_iter()
            .map(|message| message.id.as_str())
            .collect();
        assert_eq!(resolved, vec!["m2", "m1"]);
        assert_eq!(dangling_note_ids(&employee, &messages), vec!["gone"]);
    }

    #[test]
    fn chronological_order_is_oldest_first() {
        let messages = vec![message("late", 30), message("early", 5), message("mid", 10)];
        let ordered: Vec<&str> = messages_chronological(&messages)
            .into_iter()
            .map(|message| message.id.as_str())
            .collect();
        assert_eq!(ordered, vec!["early", "mid", "late"]);
    }
}
