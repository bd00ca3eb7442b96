//! Record id generation.
//!
//! Ids are UUIDv7 strings: a 48-bit unix-millisecond prefix followed by
//! random bits, so they order roughly by creation time and stay unique under
//! rapid successive calls without any external authority.

use uuid::Uuid;

/// Generates a fresh record id.
pub fn generate_id() -> String {
    Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::generate_id;
    use std::collections::HashSet;

    #[test]
    fn rapid_generation_never_collides() {
        let ids: HashSet<String> = (0..10_000).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn ids_carry_time_ordering_prefix() {
        let first = generate_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = generate_id();
        assert!(first < second);
    }
}
