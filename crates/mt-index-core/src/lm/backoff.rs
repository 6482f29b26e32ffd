use crate::constants::MAX_ORDER;
use crate::log_debug;
use crate::structures::sequence_index::FixedCapacityRawIndex;
use crate::types::error::{IndexError, Result};
use crate::types::TokenId;
use crate::vocab::{END, START};

/// Probabilities and optional back-off weights of one order, by slot.
struct NgramTable {
    index: FixedCapacityRawIndex,
    probs: Vec<f32>,
    bows: Option<Vec<f32>>,
}

impl NgramTable {
    fn new(order: usize, expected: usize, multiplier: f32, with_bows: bool) -> Self {
        let index = FixedCapacityRawIndex::for_entries(format!("{}-gram table", order), order, expected, multiplier);
        let capacity = index.capacity();
        Self {
            index,
            probs: vec![0.0; capacity],
            bows: with_bows.then(|| vec![f32::NAN; capacity]),
        }
    }

    #[inline]
    fn prob(&self, ngram: &[TokenId]) -> Option<f32> {
        self.index.get_index(ngram).ok().map(|slot| self.probs[slot])
    }

    /// Stored back-off weight; NaN when the entry had none.
    #[inline]
    fn bow(&self, ngram: &[TokenId]) -> Option<f32> {
        let bows = self.bows.as_ref()?;
        self.index.get_index(ngram).ok().map(|slot| bows[slot])
    }
}

/// Accumulates n-gram entries into pre-sized tables.
pub struct BackoffModelBuilder {
    name: String,
    tables: Vec<NgramTable>,
}

impl BackoffModelBuilder {
    /// Builder for a model whose order is `counts.len()`, where `counts[k]`
    /// is the expected number of `(k + 1)`-grams.
    pub fn new(name: impl Into<String>, counts: &[usize], multiplier: f32) -> Result<Self> {
        let order = counts.len();
        if order == 0 || order > MAX_ORDER {
            return Err(IndexError::format(0, format!("model order {} outside 1..={}", order, MAX_ORDER)));
        }
        let tables = counts
            .iter()
            .enumerate()
            .map(|(k, &count)| NgramTable::new(k + 1, count, multiplier, k + 1 < order))
            .collect();
        let name = name.into();
        log_debug!("{}: allocated tables for order {}", name, order);
        Ok(Self { name, tables })
    }

    /// Order of the model being built.
    pub fn order(&self) -> usize {
        self.tables.len()
    }

    /// Record an n-gram with natural-log probability `prob` and back-off weight
    /// `bow`. A missing weight is stored as NaN; weights on the top order are
    /// dropped since nothing backs off through them.
    pub fn add(&mut self, ngram: &[TokenId], prob: f32, bow: Option<f32>) -> Result<()> {
        let Some(table) = ngram.len().checked_sub(1).and_then(|k| self.tables.get_mut(k)) else {
            return Err(IndexError::KeyLength { expected: self.tables.len(), actual: ngram.len() });
        };
        let slot = table.index.insert_into_index(ngram)?;
        table.probs[slot] = prob;
        if let Some(bows) = table.bows.as_mut() {
            bows[slot] = bow.unwrap_or(f32::NAN);
        }
        Ok(())
    }

    /// Finish loading.
    pub fn build(self) -> BackoffLanguageModel {
        BackoffLanguageModel { name: self.name, tables: self.tables }
    }
}

/// Read-only back-off model.
///
/// `p(w3 | w1 w2)` is the stored trigram probability when present, otherwise
/// `bow(w1 w2) + p(w3 | w2)`, down to the unigram, where absence means the
/// word is out of vocabulary.
pub struct BackoffLanguageModel {
    name: String,
    tables: Vec<NgramTable>,
}

impl BackoffLanguageModel {
    /// Name given at load time.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Highest n-gram order.
    pub fn order(&self) -> usize {
        self.tables.len()
    }

    /// Number of stored n-grams of the given order (1-based).
    pub fn ngram_count(&self, order: usize) -> usize {
        order.checked_sub(1).and_then(|k| self.tables.get(k)).map_or(0, |t| t.index.len())
    }

    /// Natural-log probability of the last token of `ngram` given the tokens
    /// before it. Queries longer than the model order use their last
    /// `order()` tokens.
    pub fn score(&self, ngram: &[TokenId]) -> f64 {
        if ngram.is_empty() || is_boundary(ngram) {
            return 0.0;
        }
        let keep = ngram.len().min(self.order());
        self.score_backoff(&ngram[ngram.len() - keep..])
    }

    fn score_backoff(&self, ngram: &[TokenId]) -> f64 {
        let k = ngram.len();
        if let Some(prob) = self.tables[k - 1].prob(ngram) {
            return prob as f64;
        }
        if k == 1 {
            return f64::NEG_INFINITY;
        }
        let bow = self.tables[k - 2]
            .bow(&ngram[..k - 1])
            .filter(|w| !w.is_nan())
            .unwrap_or(0.0);
        bow as f64 + self.score_backoff(&ngram[1..])
    }

    /// Sum of the scores of every position from `from` on, each conditioned
    /// on up to `order() - 1` preceding tokens.
    pub fn score_sequence(&self, tokens: &[TokenId], from: usize) -> f64 {
        (from..tokens.len())
            .map(|pos| {
                let begin = (pos + 1).saturating_sub(self.order());
                self.score(&tokens[begin..=pos])
            })
            .sum()
    }

    /// True when `prefix` has a back-off weight, i.e. extending it can still
    /// reach a stored higher-order n-gram.
    pub fn relevant_prefix(&self, prefix: &[TokenId]) -> bool {
        if prefix.is_empty() || prefix.len() >= self.order() {
            return false;
        }
        self.tables[prefix.len() - 1].bow(prefix).is_some_and(|w| !w.is_nan())
    }
}

impl std::fmt::Debug for BackoffLanguageModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: Vec<usize> = self.tables.iter().map(|t| t.index.len()).collect();
        f.debug_struct("BackoffLanguageModel")
            .field("name", &self.name)
            .field("counts", &counts)
            .finish()
    }
}

/// Sentence markers are never scored: `<s> <s>` and anything ending in
/// `</s> </s>` cost nothing.
fn is_boundary(ngram: &[TokenId]) -> bool {
    match ngram {
        [START, START] => true,
        [.., END, END] => true,
        _ => false,
    }
}
