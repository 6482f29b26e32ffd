use std::borrow::Cow;

use super::table::{IndexStats, OpenTable, Probe};
use super::util::key_hash;
use super::{GrowableIndex, SequenceIndex};
use crate::constants::INITIAL_CAPACITY;
use crate::types::error::Result;
use crate::types::{DenseId, TokenId};

/// Default sequence index: open addressing over boxed token arrays.
///
/// Keys are private copies; a zero-length key is a valid key of its own.
pub struct OpenHashIndex {
    table: OpenTable<Box<[TokenId]>>,
}

impl OpenHashIndex {
    /// Create an empty index with the default initial capacity.
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Create an empty index with room for `capacity` slots (rounded up to a
    /// power of two) before the first doubling check.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { table: OpenTable::with_capacity(capacity) }
    }

    #[inline]
    pub(crate) fn probe(&self, key: &[TokenId], hash: u64) -> Probe {
        self.table.find(hash, |stored| **stored == *key)
    }

    /// Insert `key` given its precomputed hash; copies the key only when new.
    pub(crate) fn insert_hashed(&mut self, key: &[TokenId], hash: u64) -> DenseId {
        match self.probe(key, hash) {
            Probe::Found(pos) => self.table.id_at(pos).unwrap_or_default(),
            Probe::Vacant(pos) => self.table.insert_absent(Some(pos), Box::from(key), hash),
            Probe::Full => self.table.insert_absent(None, Box::from(key), hash),
        }
    }

    pub(crate) fn index_of_hashed(&self, key: &[TokenId], hash: u64) -> Option<DenseId> {
        match self.probe(key, hash) {
            Probe::Found(pos) => self.table.id_at(pos),
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    /// Current slot count.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Keys in dense-id order.
    pub fn iter(&self) -> impl Iterator<Item = (DenseId, &[TokenId])> + '_ {
        self.table.iter().map(|(id, key)| (id, &**key))
    }

    /// Occupancy statistics.
    pub fn stats(&self) -> IndexStats {
        self.table.stats()
    }
}

impl Default for OpenHashIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceIndex for OpenHashIndex {
    fn index_of(&self, key: &[TokenId]) -> Option<DenseId> {
        self.index_of_hashed(key, key_hash(key))
    }

    fn get(&self, id: DenseId) -> Option<Cow<'_, [TokenId]>> {
        self.table.key_of(id).map(|key| Cow::Borrowed(&**key))
    }

    fn len(&self) -> usize {
        self.table.len()
    }
}

impl GrowableIndex for OpenHashIndex {
    fn insert(&mut self, key: &[TokenId]) -> Result<DenseId> {
        Ok(self.insert_hashed(key, key_hash(key)))
    }
}

impl std::fmt::Debug for OpenHashIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenHashIndex").field("stats", &self.stats()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_lookup_and_reverse() {
        let mut idx = OpenHashIndex::new();
        let a = idx.insert(&[1, 2, 3]).unwrap();
        let b = idx.insert(&[3, 2, 1]).unwrap();
        assert_eq!((a, b), (0, 1));
        assert_eq!(idx.insert(&[1, 2, 3]).unwrap(), a);
        assert_eq!(idx.index_of(&[3, 2, 1]), Some(b));
        assert_eq!(idx.index_of(&[1, 2]), None);
        assert_eq!(idx.get(a).as_deref(), Some(&[1, 2, 3][..]));
        assert!(idx.get(2).is_none());
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn empty_key_and_length_are_distinct() {
        let mut idx = OpenHashIndex::new();
        let empty = idx.insert(&[]).unwrap();
        let zero = idx.insert(&[0]).unwrap();
        let zeros = idx.insert(&[0, 0]).unwrap();
        assert_eq!(idx.len(), 3);
        assert_ne!(empty, zero);
        assert_ne!(zero, zeros);
        assert_eq!(idx.index_of(&[]), Some(empty));
        assert_eq!(idx.get(empty).as_deref(), Some(&[][..]));
    }

    #[test]
    fn lookup_only_does_not_insert() {
        let mut idx = OpenHashIndex::new();
        assert_eq!(idx.index_of_mut(&[9], false).unwrap(), None);
        assert!(idx.is_empty());
        assert_eq!(idx.index_of_mut(&[9], true).unwrap(), Some(0));
        assert_eq!(idx.index_of_mut(&[9], false).unwrap(), Some(0));
    }

    #[test]
    fn resize_preserves_ids_and_keys() {
        let mut idx = OpenHashIndex::with_capacity(1024);
        let keys: Vec<[TokenId; 3]> = (0..2000u32).map(|i| [i, i * 7 + 1, i ^ 0x55]).collect();
        let ids: Vec<DenseId> = keys.iter().map(|k| idx.insert(k).unwrap()).collect();
        assert!(idx.capacity() > 1024);
        assert!(idx.stats().growths >= 2);
        for (k, &id) in keys.iter().zip(&ids) {
            assert_eq!(idx.index_of(k), Some(id));
            assert_eq!(idx.get(id).as_deref(), Some(&k[..]));
        }
        assert_eq!(ids, (0..2000).collect::<Vec<_>>());
        assert_eq!(idx.len(), 2000);
    }

    #[test]
    fn iter_follows_dense_id_order() {
        let mut idx = OpenHashIndex::new();
        for k in [[5u32, 1], [2, 2], [9, 0]] {
            idx.insert(&k).unwrap();
        }
        let seen: Vec<(DenseId, Vec<TokenId>)> = idx.iter().map(|(id, k)| (id, k.to_vec())).collect();
        assert_eq!(seen, vec![(0, vec![5, 1]), (1, vec![2, 2]), (2, vec![9, 0])]);
    }

    #[test]
    fn locked_index_answers_lookups() {
        let mut idx = OpenHashIndex::new();
        idx.insert(&[4, 4]).unwrap();
        let locked = idx.lock();
        assert_eq!(locked.index_of(&[4, 4]), Some(0));
        assert_eq!(locked.len(), 1);
        assert_eq!(locked.stats().len, 1);
    }
}
