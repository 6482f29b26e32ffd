//! Byte-packed sequence index.
//!
//! Same probing discipline as [`OpenHashIndex`](super::OpenHashIndex), but keys
//! are stored in the [`bit_packer`](super::bit_packer) encoding. Lookups encode
//! the query once and compare encodings, which is exact because the encoding
//! is canonical; reverse lookups decode.

use std::borrow::Cow;
use std::sync::Arc;

use parking_lot::Mutex;

use super::bit_packer::{compress, decompress};
use super::table::{IndexStats, OpenTable, Probe};
use super::util::bytes_hash;
use super::{GrowableIndex, SequenceIndex};
use crate::constants::INITIAL_CAPACITY;
use crate::log_error;
use crate::types::error::Result;
use crate::types::{DenseId, TokenId};

/// Interning pool for packed keys shared by several packed indices.
///
/// Tables that opt in store the pool's `Arc<[u8]>` instead of a private
/// buffer, so a key present in many tables is resident once.
pub struct KeyPool {
    table: Mutex<OpenTable<Arc<[u8]>>>,
}

impl KeyPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self { table: Mutex::new(OpenTable::with_capacity(INITIAL_CAPACITY)) }
    }

    /// Shared buffer holding `encoded`, added to the pool on first sight.
    pub fn intern(&self, encoded: &[u8]) -> Arc<[u8]> {
        let hash = bytes_hash(encoded);
        let mut table = self.table.lock();
        let vacant = match table.find(hash, |stored| **stored == *encoded) {
            Probe::Found(pos) => {
                if let Some(shared) = table.key_at(pos) {
                    return Arc::clone(shared);
                }
                None
            }
            Probe::Vacant(pos) => Some(pos),
            Probe::Full => None,
        };
        let shared: Arc<[u8]> = Arc::from(encoded);
        table.insert_absent(vacant, Arc::clone(&shared), hash);
        shared
    }

    /// Number of distinct keys in the pool.
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    /// True when the pool holds no key.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for KeyPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Sequence index storing bit-packed keys.
pub struct PackedIndex {
    table: OpenTable<Arc<[u8]>>,
    pool: Option<Arc<KeyPool>>,
}

impl PackedIndex {
    /// Create an empty index with private key storage.
    pub fn new() -> Self {
        Self { table: OpenTable::with_capacity(INITIAL_CAPACITY), pool: None }
    }

    /// Create an empty index whose key buffers come from `pool`.
    pub fn with_pool(pool: Arc<KeyPool>) -> Self {
        Self { table: OpenTable::with_capacity(INITIAL_CAPACITY), pool: Some(pool) }
    }

    /// Decode the key stored under `id`, surfacing corruption as an error.
    pub fn try_get(&self, id: DenseId) -> Result<Option<Vec<TokenId>>> {
        match self.table.key_of(id) {
            Some(encoded) => decompress(encoded).map(Some),
            None => Ok(None),
        }
    }

    /// Packed bytes of the key stored under `id`.
    pub fn encoded(&self, id: DenseId) -> Option<&[u8]> {
        self.table.key_of(id).map(|key| &**key)
    }

    /// Total bytes of packed key storage referenced by this index.
    pub fn key_bytes(&self) -> usize {
        self.table.iter().map(|(_, key)| key.len()).sum()
    }

    /// Keys in dense-id order, decoded.
    pub fn iter(&self) -> impl Iterator<Item = (DenseId, Result<Vec<TokenId>>)> + '_ {
        self.table.iter().map(|(id, key)| (id, decompress(key)))
    }

    /// Occupancy statistics.
    pub fn stats(&self) -> IndexStats {
        self.table.stats()
    }
}

impl Default for PackedIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceIndex for PackedIndex {
    fn index_of(&self, key: &[TokenId]) -> Option<DenseId> {
        // A key that cannot be packed was never inserted.
        let encoded = compress(key).ok()?;
        match self.table.find(bytes_hash(&encoded), |stored| **stored == *encoded) {
            Probe::Found(pos) => self.table.id_at(pos),
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    /// Panics when the stored key fails to decode: the index only holds
    /// encodings it produced, so a decode failure means the store is corrupt.
    /// Use [`PackedIndex::try_get`] to observe that as an error instead.
    fn get(&self, id: DenseId) -> Option<Cow<'_, [TokenId]>> {
        match self.try_get(id) {
            Ok(key) => key.map(Cow::Owned),
            Err(e) => {
                log_error!("packed key {} is corrupt: {}", id, e);
                panic!("packed index: key {} is corrupt: {}", id, e);
            }
        }
    }

    fn len(&self) -> usize {
        self.table.len()
    }
}

impl GrowableIndex for PackedIndex {
    fn insert(&mut self, key: &[TokenId]) -> Result<DenseId> {
        let encoded = compress(key)?;
        let hash = bytes_hash(&encoded);
        let vacant = match self.table.find(hash, |stored| **stored == *encoded) {
            Probe::Found(pos) => return Ok(self.table.id_at(pos).unwrap_or_default()),
            Probe::Vacant(pos) => Some(pos),
            Probe::Full => None,
        };
        let stored = match &self.pool {
            Some(pool) => pool.intern(&encoded),
            None => Arc::from(encoded),
        };
        Ok(self.table.insert_absent(vacant, stored, hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behaves_like_the_open_hash_index() {
        let mut idx = PackedIndex::new();
        let a = idx.insert(&[10, 20, 30]).unwrap();
        let b = idx.insert(&[]).unwrap();
        let c = idx.insert(&[1 << 20]).unwrap();
        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(idx.insert(&[10, 20, 30]).unwrap(), a);
        assert_eq!(idx.index_of(&[10, 20]), None);
        assert_eq!(idx.get(c).as_deref(), Some(&[1 << 20][..]));
        assert_eq!(idx.get(b).as_deref(), Some(&[][..]));
        assert_eq!(idx.len(), 3);
    }

    #[test]
    fn unpackable_token_is_an_insert_error_and_a_lookup_miss() {
        let mut idx = PackedIndex::new();
        assert!(idx.insert(&[u32::MAX]).is_err());
        assert_eq!(idx.index_of(&[u32::MAX]), None);
        assert!(idx.is_empty());
    }

    fn with_corrupt_key() -> (PackedIndex, DenseId) {
        let mut idx = PackedIndex::new();
        idx.insert(&[5]).unwrap();
        // header of 7 groups followed by nothing
        let garbage: Arc<[u8]> = Arc::from(&[0b0000_0111u8][..]);
        let hash = bytes_hash(&garbage);
        let id = idx.table.insert_absent(None, garbage, hash);
        (idx, id)
    }

    #[test]
    fn try_get_reports_a_corrupt_key() {
        let (idx, id) = with_corrupt_key();
        assert!(matches!(
            idx.try_get(id),
            Err(crate::types::error::IndexError::MalformedEncoding { .. })
        ));
        assert_eq!(idx.get(0).as_deref(), Some(&[5][..]));
        assert_eq!(idx.try_get(99).unwrap(), None);
    }

    #[test]
    #[should_panic(expected = "corrupt")]
    fn get_refuses_to_hide_a_corrupt_key() {
        let (idx, id) = with_corrupt_key();
        let _ = idx.get(id);
    }

    #[test]
    fn pool_shares_buffers_between_tables() {
        let pool = Arc::new(KeyPool::new());
        let mut left = PackedIndex::with_pool(Arc::clone(&pool));
        let mut right = PackedIndex::with_pool(Arc::clone(&pool));
        let l = left.insert(&[7, 8, 9]).unwrap();
        right.insert(&[1]).unwrap();
        let r = right.insert(&[7, 8, 9]).unwrap();
        assert_eq!(pool.len(), 2);
        let lp = left.encoded(l).unwrap().as_ptr();
        let rp = right.encoded(r).unwrap().as_ptr();
        assert_eq!(lp, rp);
        assert_eq!(right.get(r).as_deref(), Some(&[7, 8, 9][..]));
    }

    #[test]
    fn packed_keys_are_smaller_than_token_arrays() {
        let mut idx = PackedIndex::new();
        for i in 0..500u32 {
            idx.insert(&[i, i + 1, i + 2, i + 3]).unwrap();
        }
        assert!(idx.key_bytes() < 500 * 4 * std::mem::size_of::<TokenId>());
        for (id, key) in idx.iter() {
            let key = key.unwrap();
            assert_eq!(key[0], id);
        }
    }
}
