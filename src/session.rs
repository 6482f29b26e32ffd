//! Loaded resources and the per-line queries the binary answers.

use std::sync::Arc;

use mt_index_core::lm::load_arpa;
use mt_index_core::tm::{load_phrase_table, Translation};
use mt_index_core::vocab::{self, Vocabulary};
use mt_index_core::{
    BackoffLanguageModel, GappedPhraseTable, OpenHashIndex, PackedIndex, PhraseTable, TokenId,
};

use crate::core::{Config, Result};

/// The phrase table variant selected by configuration.
pub enum Phrases {
    /// Contiguous phrases, plain token keys
    Flat(PhraseTable<OpenHashIndex>),
    /// Contiguous phrases, bit-packed keys
    Packed(PhraseTable<PackedIndex>),
    /// Phrases with gaps
    Gapped(GappedPhraseTable),
}

/// Everything loaded for one run.
pub struct Session {
    vocab: Arc<Vocabulary>,
    lm: Option<BackoffLanguageModel>,
    phrases: Option<Phrases>,
}

impl Session {
    /// Load the resources named in `config`.
    pub fn load(config: &Config) -> Result<Self> {
        let vocab = Arc::new(Vocabulary::new());

        let lm = match &config.lm.path {
            Some(path) => Some(load_arpa(path, &vocab, config.lm.load_multiplier)?),
            None => None,
        };

        let table = &config.phrase_table;
        let phrases = match &table.path {
            None => None,
            Some(path) if table.gapped => {
                Some(Phrases::Gapped(GappedPhraseTable::load(path, &vocab, table.gap_config(vocab::GAP))?))
            }
            Some(path) if table.packed_keys => Some(Phrases::Packed(load_phrase_table(path, PackedIndex::new(), &vocab)?)),
            Some(path) => Some(Phrases::Flat(load_phrase_table(path, OpenHashIndex::new(), &vocab)?)),
        };

        Ok(Self { vocab, lm, phrases })
    }

    /// Shared vocabulary.
    pub fn vocab(&self) -> &Arc<Vocabulary> {
        &self.vocab
    }

    fn lookup(&self, line: &str) -> Vec<TokenId> {
        line.split_whitespace().map(|w| self.vocab.id_or_unk(w)).collect()
    }

    /// Natural-log probability of a sentence framed by `<s>` and `</s>`.
    pub fn score(&self, line: &str) -> Option<f64> {
        let lm = self.lm.as_ref()?;
        let mut tokens = vec![vocab::START];
        tokens.extend(self.lookup(line));
        tokens.push(vocab::END);
        Some(lm.score_sequence(&tokens, 1))
    }

    /// Translation options for a line, one formatted option per entry.
    pub fn translate(&self, line: &str) -> Vec<String> {
        let tokens = self.lookup(line);
        match &self.phrases {
            None => Vec::new(),
            Some(Phrases::Flat(table)) => self.format_all("", &table.query(&tokens)),
            Some(Phrases::Packed(table)) => self.format_all("", &table.query(&tokens)),
            Some(Phrases::Gapped(table)) => table
                .query(&tokens)
                .iter()
                .flat_map(|found| {
                    let span = format!(
                        "{}@{} ",
                        self.vocab.render(&found.matched.realized),
                        found.matched.start
                    );
                    self.format_all(&span, &found.translations)
                })
                .collect(),
        }
    }

    fn format_all(&self, prefix: &str, options: &[Translation<'_>]) -> Vec<String> {
        options
            .iter()
            .map(|t| {
                let scores: Vec<String> = t.scores.iter().map(|s| s.to_string()).collect();
                format!("{}{} ||| {}", prefix, self.vocab.render(&t.target), scores.join(" "))
            })
            .collect()
    }

    /// Output block for one input line.
    pub fn process_line(&self, line: &str) -> String {
        let mut out = Vec::new();
        if let Some(score) = self.score(line) {
            out.push(format!("lm {:.4}", score));
        }
        out.extend(self.translate(line));
        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tempfile::NamedTempFile;

    fn write(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    const ARPA: &str = "\\data\\\nngram 1=3\n\n\\1-grams:\n-1.0 <s> -0.5\n-1.0 a\n-1.0 </s>\n\n\\end\\\n";

    #[test]
    fn scores_sentences_with_boundaries() {
        let lm_file = write(ARPA);
        let mut config = Config::default();
        config.lm.path = Some(lm_file.path().to_path_buf());
        let session = Session::load(&config).unwrap();

        let ln10 = std::f64::consts::LN_10;
        let score = session.score("a").unwrap();
        assert!((score - (-2.0 * ln10)).abs() < 1e-4);
        assert_eq!(session.score("zzz"), Some(f64::NEG_INFINITY));
        assert!(session.translate("a").is_empty());
    }

    #[test]
    fn answers_flat_and_gapped_queries() {
        let table = write("ne X pas ||| not ||| 0.5\nmaison ||| house ||| 0.25\n");

        let mut config = Config::default();
        config.phrase_table.path = Some(table.path().to_path_buf());
        let flat = Session::load(&config).unwrap();
        assert_eq!(flat.translate("maison"), vec!["house ||| 0.25"]);
        assert!(flat.score("maison").is_none());

        config.phrase_table.gapped = true;
        let gapped = Session::load(&config).unwrap();
        assert_eq!(gapped.process_line("ne rien pas"), "ne X pas@0 not ||| 0.5");
    }

    #[test]
    fn packed_keys_give_the_same_answers() {
        let table = write("la maison ||| the house ||| 1 2\n");
        let mut config = Config::default();
        config.phrase_table.path = Some(table.path().to_path_buf());
        config.phrase_table.packed_keys = true;
        let session = Session::load(&config).unwrap();
        assert_eq!(session.translate("la maison"), vec!["the house ||| 1 2"]);
    }

    #[test]
    fn missing_files_fail_to_load() {
        let mut config = Config::default();
        config.lm.path = Some("/nonexistent/model.arpa".into());
        assert!(Session::load(&config).is_err());
    }
}
