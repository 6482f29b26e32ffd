//! Type definitions shared across the crate
//!
//! Ids are plain integers: sequences of them are the keys every index stores,
//! so wrapping each element would only add conversions on the hot path.

/// Error taxonomy for indices and loaders
pub mod error;

/// Interned token identifier (a word in the vocabulary).
pub type TokenId = u32;

/// Contiguous id assigned to a key on first insertion.
pub type DenseId = u32;

/// State of the trie automaton; the root is state 0.
pub type StateId = u32;
