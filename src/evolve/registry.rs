//! Population registry: every strategy ever admitted to a run.
//!
//! The microbial tournament keeps only two live genomes, but it must never
//! revisit a strategy it has already scored. The registry records the
//! canonical byte encoding of each admitted genome and enforces a hard cap
//! on how many distinct strategies one run may ever create.

use std::collections::HashSet;

use crate::schema::Genome;

/// Result of attempting to admit a genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The genome is new and was recorded.
    Inserted,
    /// The genome was already admitted earlier in the run.
    AlreadyExists,
    /// The registry is at capacity and cannot admit anything new.
    CapacityExceeded,
}

/// Set of admitted strategies, keyed by canonical encoding.
#[derive(Debug)]
pub struct PopulationRegistry {
    seen: HashSet<Vec<u8>>,
    capacity: usize,
}

impl PopulationRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: HashSet::new(),
            capacity,
        }
    }

    /// Try to admit `genome`. Duplicates are reported, not re-inserted;
    /// a full registry rejects new entries.
    pub fn insert(&mut self, genome: &Genome) -> InsertOutcome {
        let key = genome.encode();
        if self.seen.contains(&key) {
            return InsertOutcome::AlreadyExists;
        }
        if self.seen.len() >= self.capacity {
            return InsertOutcome::CapacityExceeded;
        }
        self.seen.insert(key);
        InsertOutcome::Inserted
    }

    /// Whether `genome` has been admitted before.
    pub fn contains(&self, genome: &Genome) -> bool {
        self.seen.contains(&genome.encode())
    }

    /// Number of distinct strategies admitted so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.seen.len() >= self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Action, Condition, Gene};

    fn genome(action: Action) -> Genome {
        Genome::new(vec![Gene {
            action,
            condition: Condition::Object,
        }])
    }

    #[test]
    fn test_duplicate_insert_reported() {
        let mut registry = PopulationRegistry::new(10);
        let g = genome(Action::MoveLeft);
        assert_eq!(registry.insert(&g), InsertOutcome::Inserted);
        assert_eq!(registry.insert(&g), InsertOutcome::AlreadyExists);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&g));
    }

    #[test]
    fn test_capacity_enforced() {
        let mut registry = PopulationRegistry::new(2);
        assert_eq!(registry.insert(&genome(Action::MoveLeft)), InsertOutcome::Inserted);
        assert_eq!(registry.insert(&genome(Action::MoveRight)), InsertOutcome::Inserted);
        assert!(registry.is_full());
        assert_eq!(
            registry.insert(&genome(Action::SkipLeft)),
            InsertOutcome::CapacityExceeded
        );
        // duplicates are still recognized at capacity
        assert_eq!(
            registry.insert(&genome(Action::MoveRight)),
            InsertOutcome::AlreadyExists
        );
        assert_eq!(registry.len(), 2);
    }
}
