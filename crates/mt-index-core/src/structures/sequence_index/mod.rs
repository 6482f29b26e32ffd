//! Sequence indices: token sequences to dense ids and back.
//!
//! Every index is populated by one loader (`&mut self`), then converted with
//! [`GrowableIndex::lock`] into a [`Locked`] value that only exposes lookups and
//! can be shared across decoder threads. Loaders that need several writer
//! threads wrap the index in a [`SyncIndex`] for the load phase.

use std::borrow::Cow;
use std::ops::Deref;

use crate::types::error::Result;
use crate::types::{DenseId, TokenId};

/// Read-side contract shared by every sequence index.
pub trait SequenceIndex {
    /// Dense id of `key`, or `None` when it was never inserted.
    fn index_of(&self, key: &[TokenId]) -> Option<DenseId>;

    /// Key originally inserted under `id`.
    fn get(&self, id: DenseId) -> Option<Cow<'_, [TokenId]>>;

    /// Number of distinct keys inserted.
    fn len(&self) -> usize;

    /// True when nothing has been inserted.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Write-side contract used during loading.
pub trait GrowableIndex: SequenceIndex + Sized {
    /// Dense id of `key`, assigning the next id when it is new.
    fn insert(&mut self, key: &[TokenId]) -> Result<DenseId>;

    /// Lookup that inserts on a miss when `insert` is set.
    fn index_of_mut(&mut self, key: &[TokenId], insert: bool) -> Result<Option<DenseId>> {
        if insert {
            self.insert(key).map(Some)
        } else {
            Ok(self.index_of(key))
        }
    }

    /// End the load phase. The returned value no longer accepts inserts.
    fn lock(self) -> Locked<Self> {
        Locked { inner: self }
    }
}

/// A loaded index that only answers lookups.
///
/// Holds no lock of its own: every method takes `&self` and nothing can
/// mutate the index behind it, so it is `Sync` whenever `I` is.
#[derive(Debug)]
pub struct Locked<I> {
    inner: I,
}

impl<I> Deref for Locked<I> {
    type Target = I;

    #[inline]
    fn deref(&self) -> &I {
        &self.inner
    }
}

impl<I: SequenceIndex> SequenceIndex for Locked<I> {
    #[inline]
    fn index_of(&self, key: &[TokenId]) -> Option<DenseId> {
        self.inner.index_of(key)
    }

    #[inline]
    fn get(&self, id: DenseId) -> Option<Cow<'_, [TokenId]>> {
        self.inner.get(id)
    }

    #[inline]
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Bit-level pack/unpack of token sequences
pub mod bit_packer;
/// Pre-sized fixed-key-length index for n-gram tables
pub mod fixed_raw;
/// Bounded breadth-first matching of gapped patterns over the trie
pub mod gap_match;
/// Default open-addressing index over token arrays
pub mod open_hash;
/// Byte-packed variant and its shared key pool
pub mod packed;
/// Index over caller-buffer prefixes
pub mod prefix;
/// Multi-writer wrapper for the load phase
pub mod sync;
/// Shared open-addressing slot table
pub(crate) mod table;
/// Transition-map trie
pub mod trie;
/// Hashing helpers
pub mod util;

pub use fixed_raw::FixedCapacityRawIndex;
pub use gap_match::{GapConfig, GapMatch, GapMatcher};
pub use open_hash::OpenHashIndex;
pub use packed::{KeyPool, PackedIndex};
pub use prefix::PrefixIndex;
pub use sync::SyncIndex;
pub use table::IndexStats;
pub use trie::TrieIndex;
