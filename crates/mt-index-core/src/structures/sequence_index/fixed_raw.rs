//! Pre-sized index over fixed-length keys.
//!
//! Built once per n-gram order from the entry count announced in the model
//! header, so it never resizes: capacity is fixed at construction and running
//! out of slots is a fatal load error. Keys live back to back in one flat
//! array of `key_len * capacity` tokens; occupancy is a bit set.

use super::util::{home_slot, key_hash};
use crate::log_debug;
use crate::log_error;
use crate::structures::bitset::BitSet;
use crate::types::error::{IndexError, Result};
use crate::types::TokenId;

/// Insert-only open-addressing index for keys of one length.
pub struct FixedCapacityRawIndex {
    name: String,
    key_len: usize,
    keys: Box<[TokenId]>,
    occupied: BitSet,
    mask: usize,
    len: usize,
}

enum Slot {
    Found(usize),
    Vacant(usize),
    Full,
}

impl FixedCapacityRawIndex {
    /// Create an index with `capacity` slots, rounded up to a power of two.
    /// `name` identifies the table in diagnostics.
    pub fn with_capacity(name: impl Into<String>, key_len: usize, capacity: usize) -> Self {
        let capacity = capacity.max(1).next_power_of_two();
        let name = name.into();
        log_debug!("{}: {} slots for keys of length {}", name, capacity, key_len);
        Self {
            name,
            key_len,
            keys: vec![0; key_len * capacity].into_boxed_slice(),
            occupied: BitSet::with_capacity(capacity),
            mask: capacity - 1,
            len: 0,
        }
    }

    /// Create an index sized for `expected` entries: the smallest power of two
    /// holding `expected * multiplier` slots.
    pub fn for_entries(name: impl Into<String>, key_len: usize, expected: usize, multiplier: f32) -> Self {
        let wanted = (expected as f64 * multiplier as f64).ceil() as usize;
        Self::with_capacity(name, key_len, wanted)
    }

    /// Slot count.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Length every key must have.
    #[inline]
    pub fn key_len(&self) -> usize {
        self.key_len
    }

    /// Number of keys inserted.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when nothing has been inserted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Name used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn key_at_slot(&self, slot: usize) -> &[TokenId] {
        &self.keys[slot * self.key_len..(slot + 1) * self.key_len]
    }

    /// Key stored in `slot`, if occupied.
    pub fn key(&self, slot: usize) -> Option<&[TokenId]> {
        if slot < self.capacity() && self.occupied.contains(slot) {
            Some(self.key_at_slot(slot))
        } else {
            None
        }
    }

    fn probe(&self, key: &[TokenId]) -> Slot {
        let mut slot = home_slot(key_hash(key), self.mask);
        for _ in 0..self.capacity() {
            if !self.occupied.contains(slot) {
                return Slot::Vacant(slot);
            }
            if self.key_at_slot(slot) == key {
                return Slot::Found(slot);
            }
            slot = (slot + 1) & self.mask;
        }
        Slot::Full
    }

    /// `Ok(slot)` holding `key`, or `Err(pos)` when absent, where `pos` is the
    /// empty slot the probe stopped at (the capacity itself when the table is
    /// full or `key` has the wrong length).
    pub fn get_index(&self, key: &[TokenId]) -> std::result::Result<usize, usize> {
        if key.len() != self.key_len {
            return Err(self.capacity());
        }
        match self.probe(key) {
            Slot::Found(slot) => Ok(slot),
            Slot::Vacant(slot) => Err(slot),
            Slot::Full => Err(self.capacity()),
        }
    }

    /// Slot of `key`, claiming a free one when it is new. Inserting an existing
    /// key returns its slot.
    pub fn insert_into_index(&mut self, key: &[TokenId]) -> Result<usize> {
        if key.len() != self.key_len {
            return Err(IndexError::KeyLength { expected: self.key_len, actual: key.len() });
        }
        match self.probe(key) {
            Slot::Found(slot) => Ok(slot),
            Slot::Vacant(slot) => {
                self.keys[slot * self.key_len..(slot + 1) * self.key_len].copy_from_slice(key);
                self.occupied.insert(slot);
                self.len += 1;
                Ok(slot)
            }
            Slot::Full => {
                log_error!("{} is full: capacity {}, {} keys", self.name, self.capacity(), self.len);
                Err(IndexError::CapacityExhausted {
                    table: self.name.clone(),
                    capacity: self.capacity(),
                    observed: self.len,
                })
            }
        }
    }

    /// Occupied slots and their keys, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[TokenId])> + '_ {
        self.occupied.iter().map(move |slot| (slot, self.key_at_slot(slot)))
    }
}

impl std::fmt::Debug for FixedCapacityRawIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedCapacityRawIndex")
            .field("name", &self.name)
            .field("key_len", &self.key_len)
            .field("capacity", &self.capacity())
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_from_expected_count() {
        assert_eq!(FixedCapacityRawIndex::for_entries("t", 2, 100, 1.7).capacity(), 256);
        assert_eq!(FixedCapacityRawIndex::for_entries("t", 2, 0, 1.7).capacity(), 1);
        assert_eq!(FixedCapacityRawIndex::with_capacity("t", 1, 5).capacity(), 8);
    }

    #[test]
    fn insert_is_idempotent_and_lookup_distinguishes_absence() {
        let mut idx = FixedCapacityRawIndex::with_capacity("bigrams", 2, 16);
        let slot = idx.insert_into_index(&[3, 4]).unwrap();
        assert_eq!(idx.insert_into_index(&[3, 4]).unwrap(), slot);
        assert_eq!(idx.get_index(&[3, 4]), Ok(slot));
        let missing = idx.get_index(&[4, 3]).unwrap_err();
        assert!(missing < idx.capacity());
        assert!(idx.key(missing).is_none());
        assert_eq!(idx.key(slot), Some(&[3, 4][..]));
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn wrong_key_length() {
        let mut idx = FixedCapacityRawIndex::with_capacity("trigrams", 3, 8);
        assert!(matches!(
            idx.insert_into_index(&[1, 2]),
            Err(IndexError::KeyLength { expected: 3, actual: 2 })
        ));
        assert_eq!(idx.get_index(&[1, 2]), Err(8));
    }

    #[test]
    fn full_table_is_fatal() {
        let mut idx = FixedCapacityRawIndex::with_capacity("unigrams", 1, 8);
        for t in 0..8u32 {
            idx.insert_into_index(&[t]).unwrap();
        }
        for t in 0..8u32 {
            assert!(idx.get_index(&[t]).is_ok());
            assert_eq!(idx.insert_into_index(&[t]).unwrap(), idx.get_index(&[t]).unwrap());
        }
        assert_eq!(idx.get_index(&[99]), Err(8));
        match idx.insert_into_index(&[99]) {
            Err(IndexError::CapacityExhausted { table, capacity, observed }) => {
                assert_eq!(table, "unigrams");
                assert_eq!(capacity, 8);
                assert_eq!(observed, 8);
            }
            other => panic!("expected CapacityExhausted, got {:?}", other),
        }
        assert_eq!(idx.len(), 8);
        assert_eq!(idx.iter().count(), 8);
    }
}
