use ahash::RandomState;

use crate::types::{StateId, TokenId};

/// Seeded hasher state. Fixed seeds keep probe sequences identical across runs.
#[inline]
pub fn fixed_state() -> RandomState {
    RandomState::with_seeds(
        0x243F_6A88_85A3_08D3,
        0x1319_8A2E_0370_7344,
        0xA409_3822_299F_31D0,
        0x082E_FA98_EC4E_6C89,
    )
}

/// Order-sensitive hash of a token sequence; the length takes part in it.
#[inline]
pub fn structural_hash(key: &[TokenId]) -> u64 {
    fixed_state().hash_one(key)
}

/// Order-sensitive hash of a packed key.
#[inline]
pub fn structural_hash_bytes(key: &[u8]) -> u64 {
    fixed_state().hash_one(key)
}

/// Supplemental mix applied on top of a structural hash before masking.
#[inline]
pub fn mix(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E3779B97F4A7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// 32-bit supplemental mix (murmur3 finaliser). A bijection on `u32`, so two
/// distinct inputs never mix to the same output.
#[inline]
pub fn mix32(x: u32) -> u32 {
    let mut h = x;
    h ^= h >> 16;
    h = h.wrapping_mul(0x85EB_CA6B);
    h ^= h >> 13;
    h = h.wrapping_mul(0xC2B2_AE35);
    h ^ (h >> 16)
}

/// Full hash of a token key: structural hash followed by the supplemental mix.
#[inline]
pub fn key_hash(key: &[TokenId]) -> u64 {
    mix(structural_hash(key))
}

/// Full hash of a packed key.
#[inline]
pub fn bytes_hash(key: &[u8]) -> u64 {
    mix(structural_hash_bytes(key))
}

/// Encode a trie edge: mixed symbol in the high 32 bits, mixed state in the low 32.
#[inline]
pub fn transition_key(state: StateId, symbol: TokenId) -> u64 {
    ((mix32(symbol) as u64) << 32) | mix32(state) as u64
}

/// Home slot of a hash in a power-of-two table.
#[inline]
pub fn home_slot(hash: u64, mask: usize) -> usize {
    (hash as usize) & mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_hash_is_order_and_length_sensitive() {
        assert_ne!(structural_hash(&[1, 2, 3]), structural_hash(&[3, 2, 1]));
        assert_ne!(structural_hash(&[0]), structural_hash(&[0, 0]));
        assert_eq!(key_hash(&[7, 8]), key_hash(&[7, 8]));
    }

    #[test]
    fn transition_keys_do_not_collide_on_swapped_arguments() {
        assert_ne!(transition_key(1, 2), transition_key(2, 1));
        let mut seen = std::collections::HashSet::new();
        for state in 0..64u32 {
            for symbol in 0..64u32 {
                assert!(seen.insert(transition_key(state, symbol)));
            }
        }
    }
}
