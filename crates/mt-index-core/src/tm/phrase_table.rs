use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use super::{parse_line, Entry, Translation};
use crate::structures::sequence_index::{GrowableIndex, Locked, OpenHashIndex, SequenceIndex};
use crate::types::error::{IndexError, Result};
use crate::types::{DenseId, TokenId};
use crate::vocab::Vocabulary;
use crate::{log_error, log_info, log_warn};

/// Collects phrase pairs while a table is being read.
pub struct PhraseTableBuilder<S> {
    name: String,
    sources: S,
    targets: OpenHashIndex,
    rules: OpenHashIndex,
    translations: Vec<Vec<Entry>>,
    score_count: Option<usize>,
    longest_source: usize,
    longest_target: usize,
}

impl<S: GrowableIndex> PhraseTableBuilder<S> {
    /// Builder storing source phrases in `sources`.
    pub fn new(name: impl Into<String>, sources: S) -> Self {
        Self {
            name: name.into(),
            sources,
            targets: OpenHashIndex::new(),
            rules: OpenHashIndex::new(),
            translations: Vec::new(),
            score_count: None,
            longest_source: 0,
            longest_target: 0,
        }
    }

    /// Add a phrase pair. Every pair in a table carries the same number of
    /// scores; `line` is only used in diagnostics. A repeated pair keeps its
    /// first scores.
    pub fn add(&mut self, source: &[TokenId], target: &[TokenId], scores: &[f32], line: usize) -> Result<DenseId> {
        match self.score_count {
            None => self.score_count = Some(scores.len()),
            Some(expected) if expected != scores.len() => {
                return Err(IndexError::format(
                    line,
                    format!("expected {} scores per entry, found {}", expected, scores.len()),
                ));
            }
            Some(_) => {}
        }

        let source_id = self.sources.insert(source)?;
        let target_id = self.targets.insert(target)?;
        let before = self.rules.len();
        let rule = self.rules.insert(&[source_id, target_id])?;
        if self.rules.len() == before {
            log_warn!("{}: line {}: duplicate phrase pair, keeping the first", self.name, line);
            return Ok(rule);
        }

        let slot = source_id as usize;
        if self.translations.len() <= slot {
            self.translations.resize_with(slot + 1, Vec::new);
        }
        self.translations[slot].push(Entry { rule, target: target_id, scores: scores.into() });
        self.longest_source = self.longest_source.max(source.len());
        self.longest_target = self.longest_target.max(target.len());
        Ok(rule)
    }

    /// Lock every index and finish the table.
    pub fn build(self) -> PhraseTable<S> {
        PhraseTable {
            name: self.name,
            sources: self.sources.lock(),
            targets: self.targets.lock(),
            rules: self.rules.lock(),
            translations: self.translations,
            score_count: self.score_count.unwrap_or(0),
            longest_source: self.longest_source,
            longest_target: self.longest_target,
        }
    }
}

/// Read-only phrase table keyed by source phrase.
pub struct PhraseTable<S> {
    name: String,
    sources: Locked<S>,
    targets: Locked<OpenHashIndex>,
    rules: Locked<OpenHashIndex>,
    translations: Vec<Vec<Entry>>,
    score_count: usize,
    longest_source: usize,
    longest_target: usize,
}

impl<S: SequenceIndex> PhraseTable<S> {
    /// Name given at load time.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Translations of an exact source phrase, in file order.
    pub fn query(&self, source: &[TokenId]) -> Vec<Translation<'_>> {
        self.sources
            .index_of(source)
            .map(|id| self.translations_of(id))
            .unwrap_or_default()
    }

    /// Translations stored under a source id.
    pub fn translations_of(&self, source_id: DenseId) -> Vec<Translation<'_>> {
        let Some(entries) = self.translations.get(source_id as usize) else {
            return Vec::new();
        };
        entries
            .iter()
            .map(|entry| Translation {
                rule: entry.rule,
                target: self.targets.get(entry.target).unwrap_or(Cow::Borrowed(&[])),
                scores: &entry.scores,
            })
            .collect()
    }

    /// Rule id of a phrase pair.
    pub fn rule_id(&self, source: &[TokenId], target: &[TokenId]) -> Option<DenseId> {
        let source_id = self.sources.index_of(source)?;
        let target_id = self.targets.index_of(target)?;
        self.rules.index_of(&[source_id, target_id])
    }

    /// Source index, for callers that match phrases themselves.
    pub fn sources(&self) -> &S {
        &self.sources
    }

    /// Number of distinct phrase pairs.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when the table holds no pair.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of distinct source phrases.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Scores carried by every entry.
    pub fn score_count(&self) -> usize {
        self.score_count
    }

    /// Length of the longest source phrase.
    pub fn longest_source_phrase(&self) -> usize {
        self.longest_source
    }

    /// Length of the longest target phrase.
    pub fn longest_target_phrase(&self) -> usize {
        self.longest_target
    }
}

impl<S> std::fmt::Debug for PhraseTable<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhraseTable")
            .field("name", &self.name)
            .field("score_count", &self.score_count)
            .field("longest_source", &self.longest_source)
            .finish()
    }
}

/// Read table lines from `reader` into `builder`, returning the number of entries.
pub(crate) fn read_into<R: BufRead, S: GrowableIndex>(
    reader: R,
    builder: &mut PhraseTableBuilder<S>,
    vocab: &Vocabulary,
    gapped: bool,
) -> Result<usize> {
    let mut count = 0;
    for (idx, text) in reader.lines().enumerate() {
        let line = idx + 1;
        let text = text?;
        let Some(parsed) = parse_line(&text, line, vocab, gapped)? else {
            continue;
        };
        builder
            .add(&parsed.source, &parsed.target, &parsed.scores, line)
            .inspect_err(|e| log_error!("{}: line {}: {}", builder.name, line, e))?;
        count += 1;
    }
    Ok(count)
}

/// Read a contiguous phrase table with source phrases stored in `sources`.
pub fn read_phrase_table<R: BufRead, S: GrowableIndex>(
    reader: R,
    sources: S,
    vocab: &Vocabulary,
    name: &str,
) -> Result<PhraseTable<S>> {
    let mut builder = PhraseTableBuilder::new(name, sources);
    read_into(reader, &mut builder, vocab, false)?;
    Ok(builder.build())
}

/// Open and read a contiguous phrase table.
pub fn load_phrase_table<S: GrowableIndex>(path: impl AsRef<Path>, sources: S, vocab: &Vocabulary) -> Result<PhraseTable<S>> {
    let path = path.as_ref();
    let started = Instant::now();
    let file = File::open(path)?;
    let table = read_phrase_table(BufReader::new(file), sources, vocab, &path.display().to_string())?;
    log_info!(
        "loaded phrase table {}: {} pairs, {} source phrases, longest source phrase {} in {:.3}s",
        path.display(),
        table.len(),
        table.source_count(),
        table.longest_source_phrase(),
        started.elapsed().as_secs_f64()
    );
    Ok(table)
}
