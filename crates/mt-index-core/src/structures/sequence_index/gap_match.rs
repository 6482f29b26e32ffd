//! Matching of gapped patterns stored in a [`TrieIndex`].
//!
//! A pattern such as `[w1, X, w3]` (with `X` the gap symbol) matches an input
//! span where `w1` is followed, after a gap of admissible width, by `w3`.
//! Matching is a breadth-first search from every start position. Each
//! partial match carries the input positions its literals covered and the
//! tokens it realised, with the gap symbol standing in for each gap.

use std::collections::VecDeque;

use super::trie::TrieIndex;
use crate::constants::{DEFAULT_MAX_GAP, DEFAULT_MAX_SPAN, DEFAULT_MIN_GAP};
use crate::log_trace;
use crate::structures::bitset::BitSet;
use crate::types::{StateId, TokenId};

/// Gap matching limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapConfig {
    /// Symbol marking a gap in stored patterns
    pub gap: TokenId,
    /// Fewest input tokens a gap may span (at least one)
    pub min_gap: usize,
    /// Most input tokens a gap may span
    pub max_gap: usize,
    /// Largest distance from the match start to any resumed literal
    pub max_span: usize,
}

impl GapConfig {
    /// Defaults for the given gap symbol.
    pub fn new(gap: TokenId) -> Self {
        Self { gap, min_gap: DEFAULT_MIN_GAP, max_gap: DEFAULT_MAX_GAP, max_span: DEFAULT_MAX_SPAN }
    }

    /// Set the admissible gap widths. A minimum of zero is raised to one.
    pub fn with_gap_width(mut self, min_gap: usize, max_gap: usize) -> Self {
        self.min_gap = min_gap.max(1);
        self.max_gap = max_gap;
        self
    }

    /// Set the maximum span.
    pub fn with_max_span(mut self, max_span: usize) -> Self {
        self.max_span = max_span;
        self
    }
}

/// A complete match of a stored pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapMatch {
    /// Input position of the first literal
    pub start: usize,
    /// Accepting trie state reached; the pattern's id
    pub state: StateId,
    /// Input positions consumed by literals
    pub coverage: BitSet,
    /// Tokens consumed, with the gap symbol in place of each gap
    pub realized: Vec<TokenId>,
}

/// In-flight search state.
struct Partial {
    state: StateId,
    pos: usize,
    coverage: BitSet,
    realized: Vec<TokenId>,
}

impl Partial {
    fn extend(&self, state: StateId, covered: usize, tokens: &[TokenId]) -> Self {
        let mut coverage = self.coverage.clone();
        coverage.insert(covered);
        let mut realized = Vec::with_capacity(self.realized.len() + tokens.len());
        realized.extend_from_slice(&self.realized);
        realized.extend_from_slice(tokens);
        Partial { state, pos: covered + 1, coverage, realized }
    }
}

/// Enumerates gapped matches of a trie's patterns over an input.
pub struct GapMatcher<'a> {
    trie: &'a TrieIndex,
    config: GapConfig,
}

impl<'a> GapMatcher<'a> {
    /// Matcher over `trie` with the given limits.
    pub fn new(trie: &'a TrieIndex, config: GapConfig) -> Self {
        Self { trie, config }
    }

    /// Limits in effect.
    pub fn config(&self) -> &GapConfig {
        &self.config
    }

    /// Every match starting at any position of `input`.
    pub fn matches(&self, input: &[TokenId]) -> Vec<GapMatch> {
        (0..input.len()).flat_map(|start| self.matches_from(input, start)).collect()
    }

    /// Every match whose first literal is `input[start]`, in breadth-first order.
    pub fn matches_from(&self, input: &[TokenId], start: usize) -> Vec<GapMatch> {
        let mut found = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(Partial {
            state: TrieIndex::ROOT,
            pos: start,
            coverage: BitSet::new(),
            realized: Vec::new(),
        });

        while let Some(partial) = queue.pop_front() {
            if !partial.realized.is_empty() && self.trie.is_accepting(partial.state) {
                found.push(GapMatch {
                    start,
                    state: partial.state,
                    coverage: partial.coverage.clone(),
                    realized: partial.realized.clone(),
                });
            }

            // literal at pos
            if let Some(&token) = input.get(partial.pos) {
                if let Some(next) = self.trie.get_transition(partial.state, token) {
                    queue.push_back(partial.extend(next, partial.pos, &[token]));
                }
            }

            // gap at pos: needs a literal before it and one after it
            if partial.pos > start && partial.pos + 1 < input.len() {
                self.open_gap(input, start, &partial, &mut queue);
            }
        }
        log_trace!("{} matches from position {}", found.len(), start);
        found
    }

    fn open_gap(&self, input: &[TokenId], start: usize, partial: &Partial, queue: &mut VecDeque<Partial>) {
        let Some(gap_state) = self.trie.get_transition(partial.state, self.config.gap) else {
            return;
        };
        let first = partial.pos + self.config.min_gap;
        let last = (partial.pos + self.config.max_gap)
            .min(start + self.config.max_span)
            .min(input.len() - 1);
        for resume in first..=last {
            let token = input[resume];
            if let Some(next) = self.trie.get_transition(gap_state, token) {
                queue.push_back(partial.extend(next, resume, &[self.config.gap, token]));
            }
        }
    }
}
