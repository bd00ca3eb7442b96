//! Read-side projections over store snapshots.
//!
//! # Responsibility
//! - Resolve employee note references against the message collection.
//! - Provide the orderings and aggregates list screens render.
//!
//! # Invariants
//! - Projections never mutate collections and never fail.
//! - Note ids that do not resolve to a message are skipped, not reported
//!   as corruption.

pub mod insights;
pub mod notes;

pub use insights::{insights, recent_messages, top_employees, Insights};
pub use notes::{dangling_note_ids, messages_chronological, resolve_employee_notes};
