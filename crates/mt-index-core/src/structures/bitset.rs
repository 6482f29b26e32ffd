//! Fixed-width bit set over `u64` words.
//!
//! Used for slot occupancy in the fixed-capacity index, accepting states in
//! the trie, and the coverage set of a gapped match.

/// Growable set of small non-negative integers.
#[derive(Clone, Default)]
pub struct BitSet {
    words: Vec<u64>,
}

impl BitSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// Create a set able to hold `0..bits` without reallocating.
    pub fn with_capacity(bits: usize) -> Self {
        Self { words: vec![0; bits.div_ceil(64)] }
    }

    #[inline]
    fn split(bit: usize) -> (usize, u32) {
        (bit >> 6, (bit & 63) as u32)
    }

    /// Add `bit`; returns true when it was not present before.
    pub fn insert(&mut self, bit: usize) -> bool {
        let (idx, off) = Self::split(bit);
        if idx >= self.words.len() {
            self.words.resize(idx + 1, 0);
        }
        let mask = 1u64 << off;
        let was_set = self.words[idx] & mask != 0;
        self.words[idx] |= mask;
        !was_set
    }

    /// Membership test.
    #[inline]
    pub fn contains(&self, bit: usize) -> bool {
        let (idx, off) = Self::split(bit);
        self.words.get(idx).map_or(false, |w| w & (1u64 << off) != 0)
    }

    /// Number of members.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// True when no bit is set.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Members in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(idx, &word)| {
            let mut rest = word;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let off = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some((idx << 6) | off)
            })
        })
    }
}

impl BitSet {
    /// Words up to the last non-zero one; trailing zero words carry no members.
    fn significant(&self) -> &[u64] {
        let end = self.words.iter().rposition(|&w| w != 0).map_or(0, |i| i + 1);
        &self.words[..end]
    }
}

impl PartialEq for BitSet {
    fn eq(&self, other: &Self) -> bool {
        self.significant() == other.significant()
    }
}

impl Eq for BitSet {}

impl std::hash::Hash for BitSet {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl std::fmt::Debug for BitSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<usize> for BitSet {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        let mut set = BitSet::new();
        for bit in iter {
            set.insert(bit);
        }
        set
    }
}
