//! Core reusable data structures

/// Compact bit set
pub mod bitset;
/// Sequence index family
pub mod sequence_index;

// Export the main types
pub use bitset::BitSet;
pub use sequence_index::{OpenHashIndex, PackedIndex, PrefixIndex, TrieIndex, FixedCapacityRawIndex};
