use crate::types::{VertexId, NO_VERTEX};
use ahash::RandomState;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};

const EMPTY: VertexId = NO_VERTEX;

/// Lock-free insert-only set of vertex ids.
///
/// Open addressing with linear probing over `AtomicU32` slots. Capacity is
/// fixed at construction to at least twice the expected number of insert
/// attempts, so probing always finds a free slot.
pub struct ConcurrentIdSet {
    slots: Box<[AtomicU32]>,
    mask: usize,
    hasher: RandomState,
}

impl ConcurrentIdSet {
    pub fn with_capacity(expected: usize) -> Self {
        let capacity = (expected.max(1) * 2).next_power_of_two().max(16);
        let slots = (0..capacity)
            .into_par_iter()
            .map(|_| AtomicU32::new(EMPTY))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            slots,
            mask: capacity - 1,
            hasher: RandomState::with_seeds(
                0x243f_6a88_85a3_08d3,
                0x1319_8a2e_0370_7344,
                0xa409_3822_299f_31d0,
                0x082e_fa98_ec4e_6c89,
            ),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Inserts `key`, returning `true` iff this call added it.
    ///
    /// Concurrent inserts of the same key leave exactly one copy; only one of
    /// them observes `true`.
    pub fn insert(&self, key: VertexId) -> bool {
        debug_assert_ne!(key, EMPTY);
        let mut idx = (self.hasher.hash_one(key) as usize) & self.mask;
        for _ in 0..self.slots.len() {
            let slot = &self.slots[idx];
            let current = slot.load(Ordering::Acquire);
            if current == key {
                return false;
            }
            if current == EMPTY {
                match slot.compare_exchange(EMPTY, key, Ordering::AcqRel, Ordering::Acquire) {
                    Ok(_) => return true,
                    Err(actual) if actual == key => return false,
                    // Another key won the slot; keep probing.
                    Err(_) => {}
                }
            }
            idx = (idx + 1) & self.mask;
        }
        panic!(
            "concurrent id set over capacity ({} slots)",
            self.slots.len()
        );
    }

    pub fn len(&self) -> usize {
        self.slots
            .par_iter()
            .filter(|slot| slot.load(Ordering::Relaxed) != EMPTY)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compacts the distinct keys, in table order.
    pub fn into_entries(self) -> Vec<VertexId> {
        self.slots
            .into_vec()
            .into_par_iter()
            .map(AtomicU32::into_inner)
            .filter(|&key| key != EMPTY)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_deduplicates() {
        let set = ConcurrentIdSet::with_capacity(4);
        assert!(set.insert(7));
        assert!(!set.insert(7));
        assert!(set.insert(3));
        assert_eq!(set.len(), 2);

        let mut entries = set.into_entries();
        entries.sort_unstable();
        assert_eq!(entries, vec![3, 7]);
    }

    #[test]
    fn test_capacity_is_power_of_two() {
        let set = ConcurrentIdSet::with_capacity(100);
        assert_eq!(set.capacity(), 256);
        assert!(set.is_empty());
        assert_eq!(ConcurrentIdSet::with_capacity(0).capacity(), 16);
    }

    #[test]
    fn test_concurrent_inserts_same_keys() {
        let set = ConcurrentIdSet::with_capacity(8000);
        // Every key is inserted by eight different tasks.
        let winners: usize = (0..8000u32)
            .into_par_iter()
            .map(|i| set.insert(i % 1000) as usize)
            .sum();
        assert_eq!(winners, 1000);
        assert_eq!(set.len(), 1000);
    }
}
