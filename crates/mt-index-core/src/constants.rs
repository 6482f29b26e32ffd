//! Global constants used throughout the index crate
//!
//! Sizing and growth parameters shared by the index family and its loaders,
//! kept in one place so every table applies the same policy.

/// Initial slot count of every growable open-addressing index.
pub const INITIAL_CAPACITY: usize = 1 << 10;

/// Maximum ratio of occupied slots to capacity before a growable index doubles.
pub const MAX_LOAD: f64 = 0.60;

/// Over-allocation factor applied to an n-gram count when sizing a
/// fixed-capacity table.
pub const LOAD_MULTIPLIER: f32 = 1.7;

/// Highest n-gram order a language model may carry.
pub const MAX_ORDER: usize = 10;

/// Width in bits of the per-element size header in a packed key.
pub const PACK_HEADER_BITS: u32 = 3;

/// Width in bits of one payload group in a packed key.
pub const PACK_GROUP_BITS: u32 = 4;

/// Largest token a packed key can hold: seven nibbles, minus the +1 offset.
pub const MAX_PACKED_TOKEN: u32 = (1 << 28) - 2;

/// Sentence start marker.
pub const START_TOKEN: &str = "<s>";

/// Sentence end marker.
pub const END_TOKEN: &str = "</s>";

/// Unknown word marker.
pub const UNK_TOKEN: &str = "<unk>";

/// Placeholder symbol standing for a gap in a discontinuous phrase.
pub const GAP_TOKEN: &str = "X";

/// Default minimum gap width, in tokens.
pub const DEFAULT_MIN_GAP: usize = 1;

/// Default maximum gap width, in tokens.
pub const DEFAULT_MAX_GAP: usize = 4;

/// Default maximum source span of a gapped match, in tokens.
pub const DEFAULT_MAX_SPAN: usize = 12;
