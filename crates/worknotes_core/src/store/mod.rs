//! Reactive in-memory data store.
//!
//! # Responsibility
//! - Own the canonical message and employee collections.
//! - Apply mutations synchronously and publish snapshots to subscribers.
//! - Queue durable writes per collection and surface storage failures as
//!   notices instead of errors.
//!
//! # Invariants
//! - Each accepted mutation publishes exactly one snapshot before returning.
//! - Writes to one collection key never overlap and land in issuance order.
//! - A failed write never rolls back in-memory state.
//!
//! # Known limitation
//! - The two collections are written by independent queues. A crash between
//!   an employee write and a message write can leave `notes` pointing at a
//!   message that was never stored; readers skip such ids.

mod data_store;
mod notice;
mod writer;

pub use data_store::{DataStore, StoreSnapshot};
pub use notice::StoreNotice;
