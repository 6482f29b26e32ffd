//! Phrase tables: the main consumers of the sequence indices.
//!
//! Both variants read the text format
//!
//! ```text
//! source words ||| target words ||| [alignment fields ...] ||| scores
//! ```
//!
//! with at least three `|||`-separated fields, the scores always last.
//! Source phrases map to dense ids through a sequence index; every
//! translation of a phrase is stored under that id together with its scores.

use std::borrow::Cow;

use crate::constants::GAP_TOKEN;
use crate::types::error::{IndexError, Result};
use crate::types::{DenseId, TokenId};
use crate::vocab::{Vocabulary, GAP};

/// Contiguous phrase table over any growable source index
pub mod phrase_table;
/// Phrase table whose source phrases may contain gaps
pub mod gapped;

pub use gapped::{GappedPhraseTable, GappedTranslations};
pub use phrase_table::{load_phrase_table, read_phrase_table, PhraseTable, PhraseTableBuilder};

const FIELD_DELIM: &str = "|||";

/// One stored translation of a source phrase.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) rule: DenseId,
    pub(crate) target: DenseId,
    pub(crate) scores: Box<[f32]>,
}

/// A translation option returned by a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation<'a> {
    /// Id of the (source, target) pair, unique within its table
    pub rule: DenseId,
    /// Target phrase
    pub target: Cow<'a, [TokenId]>,
    /// Feature scores, in file order
    pub scores: &'a [f32],
}

/// A parsed table line.
#[derive(Debug, PartialEq)]
pub(crate) struct ParsedLine {
    pub(crate) source: Vec<TokenId>,
    pub(crate) target: Vec<TokenId>,
    pub(crate) scores: Vec<f32>,
}

/// Intern a phrase; with `gapped` set, `X` and `X[...]` become the gap symbol.
pub(crate) fn intern_phrase(vocab: &Vocabulary, text: &str, gapped: bool) -> Vec<TokenId> {
    text.split_whitespace()
        .map(|word| {
            if gapped && (word == GAP_TOKEN || word.starts_with("X[")) {
                GAP
            } else {
                vocab.intern(word)
            }
        })
        .collect()
}

/// Split and parse one line. Blank lines yield `None`.
pub(crate) fn parse_line(text: &str, line: usize, vocab: &Vocabulary, gapped: bool) -> Result<Option<ParsedLine>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let fields: Vec<&str> = text.split(FIELD_DELIM).map(str::trim).collect();
    if fields.len() < 3 {
        return Err(IndexError::format(line, format!("expected at least 3 fields, found {}", fields.len())));
    }
    let mut scores = Vec::new();
    for literal in fields[fields.len() - 1].split_whitespace() {
        let score = literal
            .parse::<f32>()
            .ok()
            .filter(|s| !s.is_nan())
            .ok_or_else(|| IndexError::InvalidNumericLiteral { line, literal: literal.to_string() })?;
        scores.push(score);
    }
    Ok(Some(ParsedLine {
        source: intern_phrase(vocab, fields[0], gapped),
        target: intern_phrase(vocab, fields[1], gapped),
        scores,
    }))
}
