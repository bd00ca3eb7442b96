//! Aggregates for the insights view.

use crate::model::{Employee, Message};
use crate::store::StoreSnapshot;
use std::collections::HashSet;

/// Summary counters over one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Insights {
    pub message_count: usize,
    pub employee_count: usize,
    /// Distinct message ids referenced by at least one employee.
    pub distinct_note_count: usize,
    /// Sum of every employee's `notes` length; shared notes count once per
    /// employee.
    pub note_reference_count: usize,
}

pub fn insights(snapshot: &StoreSnapshot) -> Insights {
    let distinct: HashSet<&str> = snapshot
        .employees
        .iter()
        .flat_map(|employee| employee.notes.iter().map(String::as_str))
        .collect();

    Insights {
        message_count: snapshot.messages.len(),
        employee_count: snapshot.employees.len(),
        distinct_note_count: distinct.len(),
        note_reference_count: snapshot
            .employees
            .iter()
            .map(|employee| employee.notes.len())
            .sum(),
    }
}

/// Newest `limit` messages, newest first.
pub fn recent_messages(messages: &[Message], limit: usize) -> Vec<&Message> {
    let mut ordered: Vec<&Message> = messages.iter().collect();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    ordered.truncate(limit);
    ordered
}

/// Employees with the most notes first; ties keep insertion order.
pub fn top_employees(employees: &[Employee], limit: usize) -> Vec<&Employee> {
    let mut ordered: Vec<&Employee> = employees.iter().collect();
    ordered.sort_by(|a, b| b.notes.len().cmp(&a.notes.len()));
    ordered.truncate(limit);
    ordered
}
