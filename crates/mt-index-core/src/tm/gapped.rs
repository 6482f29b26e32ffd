//! Phrase table with discontinuous source phrases.
//!
//! Source phrases go into a [`TrieIndex`] with every `X` (or `X[..]`) marker
//! mapped to the gap symbol. Queries run the [`GapMatcher`] over the whole
//! input sentence and return each match with its translations.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use super::phrase_table::{read_into, PhraseTable, PhraseTableBuilder};
use super::Translation;
use crate::log_info;
use crate::structures::sequence_index::{GapConfig, GapMatch, GapMatcher, TrieIndex};
use crate::types::error::Result;
use crate::types::TokenId;
use crate::vocab::{Vocabulary, GAP};

/// A matched span of the input and what it translates to.
#[derive(Debug, Clone)]
pub struct GappedTranslations<'a> {
    /// Where and how the source phrase matched
    pub matched: GapMatch,
    /// Translations of the matched source phrase
    pub translations: Vec<Translation<'a>>,
}

/// Read-only gapped phrase table.
#[derive(Debug)]
pub struct GappedPhraseTable {
    table: PhraseTable<TrieIndex>,
    config: GapConfig,
}

impl GappedPhraseTable {
    /// Read a table from `reader`. The gap symbol of `config` is replaced by
    /// the vocabulary's reserved gap id.
    pub fn read<R: BufRead>(reader: R, vocab: &Vocabulary, name: &str, config: GapConfig) -> Result<Self> {
        let mut builder = PhraseTableBuilder::new(name, TrieIndex::new());
        read_into(reader, &mut builder, vocab, true)?;
        Ok(Self { table: builder.build(), config: GapConfig { gap: GAP, ..config } })
    }

    /// Open and read a gapped table.
    pub fn load(path: impl AsRef<Path>, vocab: &Vocabulary, config: GapConfig) -> Result<Self> {
        let path = path.as_ref();
        let started = Instant::now();
        let file = File::open(path)?;
        let table = Self::read(BufReader::new(file), vocab, &path.display().to_string(), config)?;
        log_info!(
            "loaded gapped phrase table {}: {} pairs, {} trie states in {:.3}s",
            path.display(),
            table.table.len(),
            table.table.sources().state_count(),
            started.elapsed().as_secs_f64()
        );
        Ok(table)
    }

    /// Every source phrase matching somewhere in `input`, with its translations.
    pub fn query(&self, input: &[TokenId]) -> Vec<GappedTranslations<'_>> {
        GapMatcher::new(self.table.sources(), self.config)
            .matches(input)
            .into_iter()
            .map(|matched| {
                let translations = self.table.translations_of(matched.state);
                GappedTranslations { matched, translations }
            })
            .filter(|found| !found.translations.is_empty())
            .collect()
    }

    /// Translations of an exact source pattern, gap symbols included.
    pub fn query_pattern(&self, pattern: &[TokenId]) -> Vec<Translation<'_>> {
        self.table.query(pattern)
    }

    /// Gap limits in effect.
    pub fn config(&self) -> &GapConfig {
        &self.config
    }

    /// Underlying table.
    pub fn table(&self) -> &PhraseTable<TrieIndex> {
        &self.table
    }
}
