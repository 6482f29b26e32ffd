// Identity, distinctness and size accounting across the growable indices,
// plus the packed-key round trip.

use std::collections::HashMap;

use proptest::collection::vec;
use proptest::prelude::*;

use crate::structures::sequence_index::bit_packer::{compress, decompress};
use crate::structures::sequence_index::{
    GrowableIndex, OpenHashIndex, PackedIndex, SequenceIndex, TrieIndex,
};
use crate::types::{DenseId, TokenId};

fn keys() -> impl Strategy<Value = Vec<Vec<TokenId>>> {
    // small alphabet so duplicates and shared prefixes actually occur
    vec(vec(0u32..6, 0..5), 1..80)
}

/// Insert every key (duplicates included) and check the index against a model.
fn check_against_model<I: GrowableIndex>(mut idx: I, keys: &[Vec<TokenId>]) {
    let mut model: HashMap<Vec<TokenId>, DenseId> = HashMap::new();
    for key in keys {
        let id = idx.insert(key).unwrap();
        let expected = *model.entry(key.clone()).or_insert(id);
        assert_eq!(id, expected, "re-insert of {:?} changed its id", key);
        assert_eq!(idx.get(id).as_deref(), Some(key.as_slice()));
    }
    assert_eq!(idx.len(), model.len());

    let mut seen: HashMap<DenseId, &Vec<TokenId>> = HashMap::new();
    for (key, &id) in &model {
        assert_eq!(idx.index_of(key), Some(id));
        if let Some(other) = seen.insert(id, key) {
            panic!("{:?} and {:?} share id {}", other, key, id);
        }
    }

    let locked = idx.lock();
    for (key, &id) in &model {
        assert_eq!(locked.index_of(key), Some(id));
    }
}

proptest! {
    #[test]
    fn open_hash_behaves_like_a_map(keys in keys()) {
        check_against_model(OpenHashIndex::with_capacity(2), &keys);
    }

    #[test]
    fn packed_behaves_like_a_map(keys in keys()) {
        check_against_model(PackedIndex::new(), &keys);
    }

    #[test]
    fn trie_behaves_like_a_map(keys in keys()) {
        check_against_model(TrieIndex::new(), &keys);
    }

    #[test]
    fn open_hash_ids_are_dense(keys in keys()) {
        let mut idx = OpenHashIndex::new();
        for key in &keys {
            idx.insert(key).unwrap();
        }
        let ids: Vec<DenseId> = idx.iter().map(|(id, _)| id).collect();
        let expected: Vec<DenseId> = (0..idx.len() as DenseId).collect();
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn pack_round_trip(tokens in vec(prop_oneof![0u32..16, 0u32..(1 << 21), 0u32..=crate::constants::MAX_PACKED_TOKEN], 0..40)) {
        let packed = compress(&tokens).unwrap();
        prop_assert_eq!(decompress(&packed).unwrap(), tokens);
    }
}
