//! Trie over token ids stored as one flat transition map.
//!
//! Instead of a child table per node, every edge `(state, symbol)` lives in a
//! single map keyed by [`transition_key`]: the mixed symbol in the high 32
//! bits and the mixed state in the low 32. Storage is proportional to the
//! number of edges; each traversal step pays one extra mix.

use std::borrow::Cow;
use std::collections::HashMap;

use ahash::RandomState;

use super::util::{fixed_state, transition_key};
use super::{GrowableIndex, SequenceIndex};
use crate::structures::bitset::BitSet;
use crate::types::error::Result;
use crate::types::{StateId, TokenId};

/// Parent link of a state: the state it was reached from and the symbol consumed.
#[derive(Clone, Copy)]
struct Parent {
    state: StateId,
    symbol: TokenId,
}

/// Deterministic automaton over token ids; the id of a key is the state
/// reached after consuming it.
pub struct TrieIndex {
    transitions: HashMap<u64, StateId, RandomState>,
    /// Indexed by state id; the root's entry is a self-link and never followed.
    parents: Vec<Parent>,
    accepting: BitSet,
    keys: usize,
}

impl TrieIndex {
    /// The start state.
    pub const ROOT: StateId = 0;

    /// Create a trie holding only the root state.
    pub fn new() -> Self {
        Self {
            transitions: HashMap::with_hasher(fixed_state()),
            parents: vec![Parent { state: Self::ROOT, symbol: 0 }],
            accepting: BitSet::new(),
            keys: 0,
        }
    }

    /// Successor of `state` on `symbol`.
    #[inline]
    pub fn get_transition(&self, state: StateId, symbol: TokenId) -> Option<StateId> {
        self.transitions.get(&transition_key(state, symbol)).copied()
    }

    /// State reached from the root by consuming all of `key`, whether or not
    /// a key ends there.
    pub fn walk(&self, key: &[TokenId]) -> Option<StateId> {
        self.walk_from(Self::ROOT, key)
    }

    /// State reached from `state` by consuming all of `key`.
    pub fn walk_from(&self, state: StateId, key: &[TokenId]) -> Option<StateId> {
        key.iter().try_fold(state, |s, &symbol| self.get_transition(s, symbol))
    }

    /// True when an inserted key ends at `state`.
    #[inline]
    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting.contains(state as usize)
    }

    /// Number of states, root included.
    pub fn state_count(&self) -> usize {
        self.parents.len()
    }

    /// Number of edges.
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Symbols on the path from the root to `state`.
    pub fn path(&self, state: StateId) -> Option<Vec<TokenId>> {
        if state as usize >= self.parents.len() {
            return None;
        }
        let mut symbols = Vec::new();
        let mut current = state;
        while current != Self::ROOT {
            let parent = self.parents[current as usize];
            symbols.push(parent.symbol);
            current = parent.state;
        }
        symbols.reverse();
        Some(symbols)
    }

    /// Inserted keys with their accepting states, in state order.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, Vec<TokenId>)> + '_ {
        self.accepting
            .iter()
            .filter_map(move |bit| self.path(bit as StateId).map(|key| (bit as StateId, key)))
    }

    fn add_state(&mut self, from: StateId, symbol: TokenId) -> StateId {
        let next = self.parents.len() as StateId;
        self.parents.push(Parent { state: from, symbol });
        self.transitions.insert(transition_key(from, symbol), next);
        next
    }
}

impl Default for TrieIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceIndex for TrieIndex {
    /// Final state of `key` when `key` was inserted.
    fn index_of(&self, key: &[TokenId]) -> Option<StateId> {
        self.walk(key).filter(|&state| self.is_accepting(state))
    }

    fn get(&self, id: StateId) -> Option<Cow<'_, [TokenId]>> {
        if !self.is_accepting(id) {
            return None;
        }
        self.path(id).map(Cow::Owned)
    }

    fn len(&self) -> usize {
        self.keys
    }
}

impl GrowableIndex for TrieIndex {
    fn insert(&mut self, key: &[TokenId]) -> Result<StateId> {
        let mut state = Self::ROOT;
        for &symbol in key {
            state = match self.get_transition(state, symbol) {
                Some(next) => next,
                None => self.add_state(state, symbol),
            };
        }
        if self.accepting.insert(state as usize) {
            self.keys += 1;
        }
        Ok(state)
    }
}
