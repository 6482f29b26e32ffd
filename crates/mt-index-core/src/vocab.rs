//! Token interning.
//!
//! Maps surface strings to dense [`TokenId`]s and back. One vocabulary is
//! shared (as `Arc<Vocabulary>`) by every loader of a decoding session so
//! that phrase tables and language models agree on ids.

use std::collections::HashMap;
use std::sync::Arc;

use ahash::RandomState;
use parking_lot::RwLock;

use crate::constants::{END_TOKEN, GAP_TOKEN, START_TOKEN, UNK_TOKEN};
use crate::types::TokenId;

/// Id of the sentence start marker.
pub const START: TokenId = 0;
/// Id of the sentence end marker.
pub const END: TokenId = 1;
/// Id of the unknown word marker.
pub const UNK: TokenId = 2;
/// Id of the gap placeholder.
pub const GAP: TokenId = 3;

#[derive(Default)]
struct Inner {
    ids: HashMap<Arc<str>, TokenId, RandomState>,
    words: Vec<Arc<str>>,
}

/// Thread-safe string to id table.
pub struct Vocabulary {
    inner: RwLock<Inner>,
}

impl Vocabulary {
    /// Vocabulary holding the reserved markers at their fixed ids.
    pub fn new() -> Self {
        let vocab = Self { inner: RwLock::new(Inner::default()) };
        for word in [START_TOKEN, END_TOKEN, UNK_TOKEN, GAP_TOKEN] {
            vocab.intern(word);
        }
        vocab
    }

    /// Id of `word`, assigning the next one on first sight.
    pub fn intern(&self, word: &str) -> TokenId {
        if let Some(&id) = self.inner.read().ids.get(word) {
            return id;
        }
        let mut inner = self.inner.write();
        if let Some(&id) = inner.ids.get(word) {
            return id;
        }
        let id = inner.words.len() as TokenId;
        let shared: Arc<str> = Arc::from(word);
        inner.words.push(Arc::clone(&shared));
        inner.ids.insert(shared, id);
        id
    }

    /// Intern every whitespace-separated word of `text`.
    pub fn intern_all(&self, text: &str) -> Vec<TokenId> {
        text.split_whitespace().map(|word| self.intern(word)).collect()
    }

    /// Id of `word` if it has been seen.
    pub fn id(&self, word: &str) -> Option<TokenId> {
        self.inner.read().ids.get(word).copied()
    }

    /// Id of `word`, or [`UNK`] when it has not been seen.
    pub fn id_or_unk(&self, word: &str) -> TokenId {
        self.id(word).unwrap_or(UNK)
    }

    /// Surface form of `id`.
    pub fn word(&self, id: TokenId) -> Option<Arc<str>> {
        self.inner.read().words.get(id as usize).cloned()
    }

    /// Space-joined surface forms; unknown ids render as `<unk>`.
    pub fn render(&self, ids: &[TokenId]) -> String {
        let inner = self.inner.read();
        ids.iter()
            .map(|&id| inner.words.get(id as usize).map_or(UNK_TOKEN, |w| &**w))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Number of distinct words, reserved markers included.
    pub fn len(&self) -> usize {
        self.inner.read().words.len()
    }

    /// Always false: the reserved markers are present from construction.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Vocabulary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vocabulary").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn reserved_markers_have_fixed_ids() {
        let vocab = Vocabulary::new();
        assert_eq!(vocab.id("<s>"), Some(START));
        assert_eq!(vocab.id("</s>"), Some(END));
        assert_eq!(vocab.id("<unk>"), Some(UNK));
        assert_eq!(vocab.id("X"), Some(GAP));
        assert_eq!(vocab.len(), 4);
    }

    #[test]
    fn intern_and_render() {
        let vocab = Vocabulary::new();
        let ids = vocab.intern_all("the cat  the");
        assert_eq!(ids, vec![4, 5, 4]);
        assert_eq!(vocab.render(&ids), "the cat the");
        assert_eq!(vocab.render(&[999]), "<unk>");
        assert_eq!(vocab.id_or_unk("dog"), UNK);
        assert_eq!(vocab.word(5).as_deref(), Some("cat"));
    }

    #[test]
    fn concurrent_interning_agrees() {
        let vocab = Arc::new(Vocabulary::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let vocab = Arc::clone(&vocab);
                thread::spawn(move || {
                    (0..100).map(|i| vocab.intern(&format!("w{}", i))).collect::<Vec<_>>()
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for other in &results[1..] {
            assert_eq!(other, &results[0]);
        }
        assert_eq!(vocab.len(), 104);
    }
}
