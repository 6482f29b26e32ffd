// Gapped matching over the trie: gap width bounds, span bounds and what a
// match reports back.

use crate::structures::sequence_index::{GapConfig, GapMatcher, GrowableIndex, TrieIndex};
use crate::types::TokenId;

const GAP: TokenId = 3;
const W1: TokenId = 10;
const W3: TokenId = 30;
const FILL_A: TokenId = 40;
const FILL_B: TokenId = 41;

fn gapped_trie(patterns: &[&[TokenId]]) -> TrieIndex {
    let mut trie = TrieIndex::new();
    for pattern in patterns {
        trie.insert(pattern).unwrap();
    }
    trie
}

#[test]
fn single_filler_is_matched() {
    // Goal: [w1, X, w3] spans [w1, wX, w3] for any single filler
    let trie = gapped_trie(&[&[W1, GAP, W3]]);
    let matcher = GapMatcher::new(&trie, GapConfig::new(GAP).with_gap_width(1, 1));
    for filler in [FILL_A, FILL_B, W1, W3, 0] {
        let found = matcher.matches(&[W1, filler, W3]);
        assert_eq!(found.len(), 1, "filler {}", filler);
        assert_eq!(found[0].start, 0);
        assert_eq!(found[0].realized, vec![W1, GAP, W3]);
        assert_eq!(found[0].coverage.iter().collect::<Vec<_>>(), vec![0, 2]);
    }
}

#[test]
fn adjacent_literals_are_not_a_gap() {
    let trie = gapped_trie(&[&[W1, GAP, W3]]);
    let matcher = GapMatcher::new(&trie, GapConfig::new(GAP));
    assert!(matcher.matches(&[W1, W3]).is_empty());
}

#[test]
fn two_fillers_need_max_gap_of_two() {
    let trie = gapped_trie(&[&[W1, GAP, W3]]);
    let input = [W1, FILL_A, FILL_B, W3];

    let narrow = GapMatcher::new(&trie, GapConfig::new(GAP).with_gap_width(1, 1));
    assert!(narrow.matches(&input).is_empty());

    let wide = GapMatcher::new(&trie, GapConfig::new(GAP).with_gap_width(1, 2));
    let found = wide.matches(&input);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].coverage.iter().collect::<Vec<_>>(), vec![0, 3]);
}

#[test]
fn minimum_gap_width_is_enforced() {
    let trie = gapped_trie(&[&[W1, GAP, W3]]);
    let matcher = GapMatcher::new(&trie, GapConfig::new(GAP).with_gap_width(2, 4));
    assert!(matcher.matches(&[W1, FILL_A, W3]).is_empty());
    assert_eq!(matcher.matches(&[W1, FILL_A, FILL_B, W3]).len(), 1);
}

#[test]
fn span_limit_caps_the_resume_position() {
    let trie = gapped_trie(&[&[W1, GAP, W3]]);
    let input = [W1, FILL_A, FILL_B, FILL_A, W3];
    let short = GapMatcher::new(&trie, GapConfig::new(GAP).with_gap_width(1, 4).with_max_span(3));
    assert!(short.matches(&input).is_empty());
    let long = GapMatcher::new(&trie, GapConfig::new(GAP).with_gap_width(1, 4).with_max_span(4));
    assert_eq!(long.matches(&input).len(), 1);
}

#[test]
fn pattern_cannot_open_with_a_gap() {
    let trie = gapped_trie(&[&[GAP, W3]]);
    let matcher = GapMatcher::new(&trie, GapConfig::new(GAP));
    assert!(matcher.matches(&[FILL_A, W3]).is_empty());
}

#[test]
fn contiguous_and_gapped_patterns_coexist() {
    // Goal: every start position is tried and each accepting state is reported
    let trie = gapped_trie(&[&[W1], &[W1, FILL_A], &[W1, GAP, W3], &[W3]]);
    let matcher = GapMatcher::new(&trie, GapConfig::new(GAP));
    let found = matcher.matches(&[W1, FILL_A, W3]);
    let mut realized: Vec<Vec<TokenId>> = found.iter().map(|m| m.realized.clone()).collect();
    realized.sort();
    assert_eq!(
        realized,
        vec![vec![W1], vec![W1, GAP, W3], vec![W1, FILL_A], vec![W3]]
    );
    for m in &found {
        assert!(trie.is_accepting(m.state));
    }
    let at_two: Vec<_> = found.iter().filter(|m| m.start == 2).collect();
    assert_eq!(at_two.len(), 1);
}

#[test]
fn multiple_gaps_each_resume_on_a_literal() {
    let trie = gapped_trie(&[&[W1, GAP, W3, GAP, W1]]);
    let matcher = GapMatcher::new(&trie, GapConfig::new(GAP));
    let found = matcher.matches(&[W1, FILL_A, W3, FILL_B, FILL_B, W1]);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].realized, vec![W1, GAP, W3, GAP, W1]);
    assert_eq!(found[0].coverage.iter().collect::<Vec<_>>(), vec![0, 2, 5]);
}
