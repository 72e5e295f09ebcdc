//! Secondary index from context tag to the keys carrying it.

use std::collections::{BTreeSet, HashMap};

use super::entry::Context;

/// Maps `"tagKey:tagValue"` slots to the set of entry keys tagged with them.
///
/// Slots are sets, so re-storing a key under the same context never grows a
/// slot. A slot may become empty after deletions; it is kept and still counts
/// towards [`ContextIndex::slot_count`].
#[derive(Debug, Clone, Default)]
pub struct ContextIndex {
    slots: HashMap<String, BTreeSet<String>>,
}

impl ContextIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot name for a single tag.
    pub fn slot_key(tag_key: &str, tag_value: &str) -> String {
        format!("{tag_key}:{tag_value}")
    }

    /// Number of slots ever created (including emptied ones).
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Keys currently held in one slot.
    pub fn slot(&self, tag_key: &str, tag_value: &str) -> Option<&BTreeSet<String>> {
        self.slots.get(&Self::slot_key(tag_key, tag_value))
    }

    /// Add `key` under every tag in `context`.
    pub fn insert(&mut self, key: &str, context: &Context) {
        for (tag_key, tag_value) in context {
            self.slots
                .entry(Self::slot_key(tag_key, tag_value))
                .or_default()
                .insert(key.to_string());
        }
    }

    /// Remove `key` from the slots named by `context`.
    pub fn remove(&mut self, key: &str, context: &Context) {
        for (tag_key, tag_value) in context {
            if let Some(slot) = self.slots.get_mut(&Self::slot_key(tag_key, tag_value)) {
                slot.remove(key);
            }
        }
    }

    /// Remove `key` from every slot, regardless of which context it was stored with.
    pub fn remove_everywhere(&mut self, key: &str) {
        for slot in self.slots.values_mut() {
            slot.remove(key);
        }
    }

    /// Keys present in *all* slots named by `query`, in key order.
    ///
    /// An empty query, or any tag without a slot, yields no keys.
    pub fn intersect(&self, query: &Context) -> BTreeSet<String> {
        let mut slots = Vec::with_capacity(query.len());
        for (tag_key, tag_value) in query {
            match self.slots.get(&Self::slot_key(tag_key, tag_value)) {
                Some(slot) => slots.push(slot),
                None => return BTreeSet::new(),
            }
        }

        // Start from the smallest slot to keep the intersection cheap.
        slots.sort_by_key(|s| s.len());
        let Some((first, rest)) = slots.split_first() else {
            return BTreeSet::new();
        };

        first
            .iter()
            .filter(|key| rest.iter().all(|slot| slot.contains(*key)))
            .cloned()
            .collect()
    }

    /// Drop every slot.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Replace the index with one derived from `(key, context)` pairs.
    pub fn rebuild<'a, I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (&'a String, &'a Context)>,
    {
        self.slots.clear();
        for (key, context) in entries {
            self.insert(key, context);
        }
    }

    /// Whether any slot references `key`.
    pub fn references(&self, key: &str) -> bool {
        self.slots.values().any(|slot| slot.contains(key))
    }
}
