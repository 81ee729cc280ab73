// SPDX-License-Identifier: MIT OR Apache-2.0
//! Identifier generation for nodes and connections.
//!
//! Ids only need to be unique within one editing session. The generator is
//! handed to the [`FlowGraph`](crate::FlowGraph) so tests can swap in
//! [`SequentialIds`] and get predictable ids.

use std::fmt;
use uuid::Uuid;

/// Source of fresh identifiers for graph entities
pub trait IdGenerator: fmt::Debug + Send {
    /// Produce an id not previously returned by this generator
    fn next_uuid(&mut self) -> Uuid;
}

/// Random UUID v4 ids (the default)
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_uuid(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Deterministic counter-based ids, shared between nodes and connections
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u128,
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialIds {
    /// Start counting at 1
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Start counting at the given value
    pub fn starting_at(next: u128) -> Self {
        Self { next }
    }
}

impl IdGenerator for SequentialIds {
    fn next_uuid(&mut self) -> Uuid {
        let id = Uuid::from_u128(self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids_are_predictable() {
        let mut ids = SequentialIds::new();
        assert_eq!(ids.next_uuid(), Uuid::from_u128(1));
        assert_eq!(ids.next_uuid(), Uuid::from_u128(2));

        let mut ids = SequentialIds::starting_at(100);
        assert_eq!(ids.next_uuid(), Uuid::from_u128(100));
    }

    #[test]
    fn test_default_never_yields_nil() {
        let mut ids = SequentialIds::default();
        let first = ids.next_uuid();
        assert!(!first.is_nil());
        assert_eq!(first, SequentialIds::new().next_uuid());
    }

    #[test]
    fn test_random_ids_differ() {
        let mut ids = RandomIds;
        assert_ne!(ids.next_uuid(), ids.next_uuid());
    }
}
