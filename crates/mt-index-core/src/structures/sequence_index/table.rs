//! Open-addressing slot table shared by the growable indices.
//!
//! Linear probing with wraparound over a power-of-two slot array. Slots are
//! never vacated, so a probe always ends at either the key or an empty slot
//! while the load factor stays below one. Capacity doubles before an insert
//! would push the load factor past `MAX_LOAD`; entries keep their dense ids
//! across the rehash.

use super::util::home_slot;
use crate::constants::MAX_LOAD;
use crate::log_debug;
use crate::types::DenseId;

/// An occupied slot: private key copy, dense id and cached full hash.
pub(crate) struct Slot<K> {
    pub(crate) key: K,
    pub(crate) id: DenseId,
    pub(crate) hash: u64,
}

/// Outcome of probing for a key.
pub(crate) enum Probe {
    /// Key present at this slot
    Found(usize),
    /// Key absent; this is the first empty slot on its probe path
    Vacant(usize),
    /// Every slot was visited without a match or a vacancy
    Full,
}

/// Occupancy and probing statistics of a growable index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexStats {
    /// Slots allocated
    pub capacity: usize,
    /// Distinct keys stored
    pub len: usize,
    /// `len / capacity`
    pub load_factor: f64,
    /// Longest probe sequence (in slots) needed to place any current key
    pub max_probe: usize,
    /// Number of capacity doublings so far
    pub growths: usize,
}

pub(crate) struct OpenTable<K> {
    slots: Vec<Option<Slot<K>>>,
    /// Dense id -> slot position.
    reverse: Vec<usize>,
    mask: usize,
    max_probe: usize,
    growths: usize,
}

impl<K> OpenTable<K> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(2).next_power_of_two();
        Self {
            slots: Self::empty_slots(capacity),
            reverse: Vec::new(),
            mask: capacity - 1,
            max_probe: 0,
            growths: 0,
        }
    }

    fn empty_slots(capacity: usize) -> Vec<Option<Slot<K>>> {
        (0..capacity).map(|_| None).collect()
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.reverse.len()
    }

    /// Probe for a key with hash `hash`; `eq` is only called on hash matches.
    pub(crate) fn find(&self, hash: u64, mut eq: impl FnMut(&K) -> bool) -> Probe {
        let mut idx = home_slot(hash, self.mask);
        for _ in 0..self.slots.len() {
            match &self.slots[idx] {
                None => return Probe::Vacant(idx),
                Some(slot) if slot.hash == hash && eq(&slot.key) => return Probe::Found(idx),
                Some(_) => {}
            }
            idx = (idx + 1) & self.mask;
        }
        Probe::Full
    }

    /// Dense id of the key stored at `pos`.
    #[inline]
    pub(crate) fn id_at(&self, pos: usize) -> Option<DenseId> {
        self.slots.get(pos)?.as_ref().map(|slot| slot.id)
    }

    /// Key stored at slot `pos`.
    #[inline]
    pub(crate) fn key_at(&self, pos: usize) -> Option<&K> {
        self.slots.get(pos)?.as_ref().map(|slot| &slot.key)
    }

    /// Key stored under dense id `id`.
    pub(crate) fn key_of(&self, id: DenseId) -> Option<&K> {
        let pos = *self.reverse.get(id as usize)?;
        self.slots[pos].as_ref().map(|slot| &slot.key)
    }

    /// Store a key the caller has just probed as absent and return its new id.
    /// `vacant` is the slot that probe ended on.
    pub(crate) fn insert_absent(&mut self, vacant: Option<usize>, key: K, hash: u64) -> DenseId {
        let grew = (self.len() + 1) as f64 / self.capacity() as f64 > MAX_LOAD || vacant.is_none();
        if grew {
            self.grow();
        }
        let pos = match vacant {
            Some(pos) if !grew => pos,
            _ => self.first_vacant(hash),
        };
        let id = self.len() as DenseId;
        self.note_probe(pos, hash);
        self.slots[pos] = Some(Slot { key, id, hash });
        self.reverse.push(pos);
        id
    }

    /// First empty slot on the probe path of `hash`. Only called when the
    /// load factor guarantees one exists.
    fn first_vacant(&self, hash: u64) -> usize {
        let mut idx = home_slot(hash, self.mask);
        while self.slots[idx].is_some() {
            idx = (idx + 1) & self.mask;
        }
        idx
    }

    fn note_probe(&mut self, pos: usize, hash: u64) {
        let distance = pos.wrapping_sub(home_slot(hash, self.mask)) & self.mask;
        self.max_probe = self.max_probe.max(distance + 1);
    }

    fn grow(&mut self) {
        let new_capacity = self.capacity() << 1;
        log_debug!(
            "sequence index growing {} -> {} slots ({} keys)",
            self.capacity(),
            new_capacity,
            self.len()
        );
        let old = std::mem::replace(&mut self.slots, Self::empty_slots(new_capacity));
        self.mask = new_capacity - 1;
        self.max_probe = 0;
        for slot in old.into_iter().flatten() {
            let pos = self.first_vacant(slot.hash);
            self.note_probe(pos, slot.hash);
            self.reverse[slot.id as usize] = pos;
            self.slots[pos] = Some(slot);
        }
        self.growths += 1;
    }

    /// Entries in dense-id order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (DenseId, &K)> + '_ {
        self.reverse
            .iter()
            .filter_map(move |&pos| self.slots[pos].as_ref().map(|slot| (slot.id, &slot.key)))
    }

    pub(crate) fn stats(&self) -> IndexStats {
        IndexStats {
            capacity: self.capacity(),
            len: self.len(),
            load_factor: self.len() as f64 / self.capacity() as f64,
            max_probe: self.max_probe,
            growths: self.growths,
        }
    }
}
