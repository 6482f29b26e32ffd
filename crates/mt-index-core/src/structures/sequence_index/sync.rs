//! Multi-writer access to an index during the load phase.
//!
//! Lookups take the shared lock; a miss that must insert upgrades to the
//! exclusive lock and repeats the lookup there, so two writers racing on the
//! same key both observe the id the first one assigned.

use parking_lot::RwLock;

use super::{GrowableIndex, Locked, SequenceIndex};
use crate::types::error::Result;
use crate::types::{DenseId, TokenId};

/// An index behind a reader-writer lock.
#[derive(Debug, Default)]
pub struct SyncIndex<I> {
    inner: RwLock<I>,
}

impl<I: GrowableIndex> SyncIndex<I> {
    /// Wrap an index.
    pub fn new(index: I) -> Self {
        Self { inner: RwLock::new(index) }
    }

    /// Dense id of `key`, inserting it on a miss when `insert` is set.
    pub fn index_of(&self, key: &[TokenId], insert: bool) -> Result<Option<DenseId>> {
        if let Some(id) = self.inner.read().index_of(key) {
            return Ok(Some(id));
        }
        if !insert {
            return Ok(None);
        }
        self.inner.write().insert(key).map(Some)
    }

    /// Copy of the key stored under `id`.
    pub fn get(&self, id: DenseId) -> Option<Vec<TokenId>> {
        self.inner.read().get(id).map(|key| key.into_owned())
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// True when nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unwrap the index.
    pub fn into_inner(self) -> I {
        self.inner.into_inner()
    }

    /// End the load phase and drop the lock.
    pub fn lock(self) -> Locked<I> {
        self.into_inner().lock()
    }
}
