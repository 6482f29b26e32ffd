//! # MT Index Core
//!
//! Storage and indexing substrate for a phrase-based statistical machine
//! translation decoder: growable sequence indices mapping token sequences to
//! dense ids, a byte-packed and a trie-structured variant, the fixed-capacity
//! n-gram tables and the ARPA back-off scoring built on top of them.

#![warn(missing_docs)]

/// Logging macros shared by every module
pub mod core;

/// Shared constants
pub mod constants;

/// Id aliases and the error taxonomy
pub mod types;

/// Sequence indices and their building blocks
pub mod structures;

/// Token interning
pub mod vocab;

/// N-gram back-off language model
pub mod lm;

/// Phrase tables built on the sequence indices
pub mod tm;

pub use types::{DenseId, StateId, TokenId};
pub use types::error::{IndexError, Result};
pub use structures::sequence_index::{
    FixedCapacityRawIndex, GapConfig, GapMatch, GapMatcher, GrowableIndex, KeyPool, Locked,
    OpenHashIndex, PackedIndex, PrefixIndex, SequenceIndex, SyncIndex, TrieIndex,
};
pub use lm::{BackoffLanguageModel, BackoffModelBuilder};
pub use tm::{GappedPhraseTable, PhraseTable};
pub use vocab::Vocabulary;
