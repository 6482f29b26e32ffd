//! N-gram back-off language model.
//!
//! Each order keeps its n-grams in a [`FixedCapacityRawIndex`] sized from the
//! count announced in the model header, with probabilities (and, below the
//! top order, back-off weights) in arrays indexed by slot.
//!
//! [`FixedCapacityRawIndex`]: crate::structures::sequence_index::FixedCapacityRawIndex

/// Back-off scoring over per-order tables
pub mod backoff;
/// ARPA text format reader
pub mod arpa;

pub use arpa::{load_arpa, read_arpa};
pub use backoff::{BackoffLanguageModel, BackoffModelBuilder};
