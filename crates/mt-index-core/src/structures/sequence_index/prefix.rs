use std::borrow::Cow;

use super::open_hash::OpenHashIndex;
use super::util::key_hash;
use super::{GrowableIndex, SequenceIndex};
use crate::types::error::Result;
use crate::types::{DenseId, TokenId};

/// Sequence index addressed by "the first `len` tokens of `buf`".
///
/// Hashing and comparison read straight from the caller's buffer; a private
/// copy is made only when a new prefix is inserted. Useful when one buffer is
/// probed for many candidate lengths, such as phrase-boundary scanning.
#[derive(Default)]
pub struct PrefixIndex {
    inner: OpenHashIndex,
}

impl PrefixIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self { inner: OpenHashIndex::new() }
    }

    #[inline]
    fn prefix(buf: &[TokenId], len: usize) -> Option<&[TokenId]> {
        buf.get(..len)
    }

    /// Dense id of `buf[..len]`; `None` when absent or `len > buf.len()`.
    pub fn index_of_prefix(&self, buf: &[TokenId], len: usize) -> Option<DenseId> {
        let key = Self::prefix(buf, len)?;
        self.inner.index_of_hashed(key, key_hash(key))
    }

    /// Dense id of `buf[..len]`, inserting it when new. `None` only when
    /// `len > buf.len()`.
    pub fn insert_prefix(&mut self, buf: &[TokenId], len: usize) -> Option<DenseId> {
        let key = Self::prefix(buf, len)?;
        Some(self.inner.insert_hashed(key, key_hash(key)))
    }

    /// Ids of every stored prefix of `buf`, shortest first, as `(len, id)`.
    pub fn prefixes_of<'a>(&'a self, buf: &'a [TokenId]) -> impl Iterator<Item = (usize, DenseId)> + 'a {
        (0..=buf.len()).filter_map(move |len| self.index_of_prefix(buf, len).map(|id| (len, id)))
    }

    /// Longest stored prefix of `buf`, as `(len, id)`.
    pub fn longest_prefix(&self, buf: &[TokenId]) -> Option<(usize, DenseId)> {
        (0..=buf.len())
            .rev()
            .find_map(|len| self.index_of_prefix(buf, len).map(|id| (len, id)))
    }

    /// Keys in dense-id order.
    pub fn iter(&self) -> impl Iterator<Item = (DenseId, &[TokenId])> + '_ {
        self.inner.iter()
    }
}

impl SequenceIndex for PrefixIndex {
    fn index_of(&self, key: &[TokenId]) -> Option<DenseId> {
        self.index_of_prefix(key, key.len())
    }

    fn get(&self, id: DenseId) -> Option<Cow<'_, [TokenId]>> {
        self.inner.get(id)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl GrowableIndex for PrefixIndex {
    fn insert(&mut self, key: &[TokenId]) -> Result<DenseId> {
        Ok(self.inner.insert_hashed(key, key_hash(key)))
    }
}
