//! The memory bank: a capacity-bounded key-value store with context tags.
//!
//! Values are arbitrary JSON documents. Every entry carries an
//! [`EntryMetadata`] record and is indexed under each of its context tags.
//! When a `store` finds the bank at its compaction trigger, the
//! lowest-scoring entries are evicted before the new entry goes in.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::entry::{Context, EntryMetadata, EntrySnapshot, MatchType, SearchHit};
use super::error::{MemoryError, MemoryResult};
use super::index::ContextIndex;
use super::retention::{eviction_count, eviction_order, round2, CompactionEvent, CompactionHistory};
use super::stats::{most_accessed, MemoryStatistics, MOST_ACCESSED_LIMIT};
use crate::config::MemoryBankConfig;
use crate::metrics::METRICS;
use crate::obs;

/// Category used by callers that have no natural grouping.
pub const DEFAULT_CATEGORY: &str = "default";

/// Namespaced key: `category:key`.
pub fn category_key(category: &str, key: &str) -> String {
    format!("{category}:{key}")
}

/// Byte length of a value's JSON form.
pub(crate) fn value_size(value: &Value) -> usize {
    // `Value` always serializes: its map keys are strings.
    serde_json::to_vec(value).map(|bytes| bytes.len()).unwrap_or(0)
}

/// Bounded, context-indexed memory store.
///
/// Not internally synchronized: mutators take `&mut self`. Share it between
/// tasks through [`SharedMemoryBank`](super::SharedMemoryBank).
#[derive(Debug)]
pub struct MemoryBank {
    pub(super) config: MemoryBankConfig,
    pub(super) memory_store: BTreeMap<String, Value>,
    pub(super) memory_metadata: BTreeMap<String, EntryMetadata>,
    pub(super) context_index: ContextIndex,
    pub(super) compaction_history: CompactionHistory,
    pub(super) clock: Arc<dyn Clock>,
}

impl Default for MemoryBank {
    fn default() -> Self {
        let config = MemoryBankConfig::default();
        Self {
            compaction_history: CompactionHistory::new(config.compaction_history_limit),
            config,
            memory_store: BTreeMap::new(),
            memory_metadata: BTreeMap::new(),
            context_index: ContextIndex::new(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl MemoryBank {
    /// Create a bank reading time from the system clock.
    pub fn new(config: MemoryBankConfig) -> MemoryResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a bank with an explicit time source.
    pub fn with_clock(config: MemoryBankConfig, clock: Arc<dyn Clock>) -> MemoryResult<Self> {
        config.validate()?;
        info!(
            event = "memory.initialized",
            max_memory_size = config.max_memory_size,
            compaction_threshold = config.compaction_threshold,
        );
        Ok(Self {
            compaction_history: CompactionHistory::new(config.compaction_history_limit),
            config,
            memory_store: BTreeMap::new(),
            memory_metadata: BTreeMap::new(),
            context_index: ContextIndex::new(),
            clock,
        })
    }

    pub fn config(&self) -> &MemoryBankConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.memory_store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory_store.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.memory_store.contains_key(key)
    }

    /// Stored values by key.
    pub fn memory_store(&self) -> &BTreeMap<String, Value> {
        &self.memory_store
    }

    /// Metadata records by key.
    pub fn memory_metadata(&self) -> &BTreeMap<String, EntryMetadata> {
        &self.memory_metadata
    }

    pub fn metadata(&self, key: &str) -> Option<&EntryMetadata> {
        self.memory_metadata.get(key)
    }

    pub fn context_index(&self) -> &ContextIndex {
        &self.context_index
    }

    pub fn compaction_history(&self) -> &CompactionHistory {
        &self.compaction_history
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Store `value` under `key`, replacing any existing entry.
    ///
    /// Returns `false` (and logs) if the value cannot be serialized.
    pub fn store<T>(&mut self, key: &str, value: &T, context: Context) -> bool
    where
        T: Serialize + ?Sized,
    {
        match self.try_store(key, value, context) {
            Ok(()) => true,
            Err(e) => {
                warn!(event = "memory.store_failed", key = %key, error = %e);
                false
            }
        }
    }

    /// [`store`](Self::store) reporting the failure reason.
    pub fn try_store<T>(&mut self, key: &str, value: &T, context: Context) -> MemoryResult<()>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value)?;
        self.insert_entry(key.to_string(), None, value, context);
        Ok(())
    }

    /// Store under the namespaced key `category:key`, recording the category.
    pub fn store_in<T>(&mut self, category: &str, key: &str, value: &T, context: Context) -> bool
    where
        T: Serialize + ?Sized,
    {
        let full_key = category_key(category, key);
        match serde_json::to_value(value) {
            Ok(value) => {
                self.insert_entry(full_key, Some(category.to_string()), value, context);
                true
            }
            Err(e) => {
                warn!(event = "memory.store_failed", key = %full_key, error = %e);
                false
            }
        }
    }

    fn insert_entry(
        &mut self,
        key: String,
        category: Option<String>,
        value: Value,
        context: Context,
    ) {
        let trigger = self.config.trigger_size();
        let len = self.memory_store.len();
        if len >= trigger {
            let mut count = eviction_count(len, self.config.compaction_target_reduction);
            // A new key must still fit under the cap, whatever the target yields.
            if !self.memory_store.contains_key(&key) {
                count = count.max((len + 1).saturating_sub(self.config.max_memory_size));
            }
            info!(
                event = "memory.threshold_reached",
                entries = len,
                trigger = trigger,
                to_remove = count,
            );
            self.evict_lowest(count);
        }

        // An overwrite may carry different tags; drop the old slot memberships.
        if let Some(previous) = self.memory_metadata.get(&key) {
            self.context_index.remove(&key, &previous.context);
        }

        let size = value_size(&value);
        self.context_index.insert(&key, &context);
        self.memory_metadata.insert(
            key.clone(),
            EntryMetadata::fresh(self.clock.now(), category, context, size),
        );
        self.memory_store.insert(key.clone(), value);

        METRICS.inc_stored();
        debug!(event = "memory.stored", key = %key, size = size);
    }

    /// Replace (or, with `merge`, shallow-merge into) an existing entry.
    ///
    /// Merging applies only when both old and new values are JSON objects;
    /// new fields overwrite same-named old ones. Never creates an entry, keeps
    /// the access count and the context tags.
    pub fn update<T>(&mut self, key: &str, value: &T, merge: bool) -> bool
    where
        T: Serialize + ?Sized,
    {
        match self.try_update(key, value, merge) {
            Ok(()) => true,
            Err(e) => {
                warn!(event = "memory.update_failed", key = %key, error = %e);
                false
            }
        }
    }

    /// [`update`](Self::update) reporting the failure reason.
    pub fn try_update<T>(&mut self, key: &str, value: &T, merge: bool) -> MemoryResult<()>
    where
        T: Serialize + ?Sized,
    {
        let not_found = || MemoryError::EntryNotFound {
            key: key.to_string(),
        };
        if !self.memory_store.contains_key(key) {
            return Err(not_found());
        }

        let incoming = serde_json::to_value(value)?;
        let now = self.clock.now();
        let (Some(current), Some(meta)) = (
            self.memory_store.get_mut(key),
            self.memory_metadata.get_mut(key),
        ) else {
            return Err(not_found());
        };

        let replacement = match (&mut *current, incoming) {
            (Value::Object(existing), Value::Object(fields)) if merge => {
                existing.extend(fields);
                None
            }
            (_, replacement) => Some(replacement),
        };
        if let Some(replacement) = replacement {
            *current = replacement;
        }

        meta.timestamp = now;
        meta.size = value_size(current);
        debug!(event = "memory.updated", key = %key, merge = merge, size = meta.size);
        Ok(())
    }

    /// Remove an entry and every trace of it. Returns `false` if it was absent.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.memory_store.remove(key).is_none() {
            return false;
        }

        match self.memory_metadata.remove(key) {
            Some(meta) => self.context_index.remove(key, &meta.context),
            None => self.context_index.remove_everywhere(key),
        }

        debug!(event = "memory.deleted", key = %key);
        true
    }

    pub fn delete_in(&mut self, category: &str, key: &str) -> bool {
        self.delete(&category_key(category, key))
    }

    /// Empty the store, metadata and index. Compaction history is kept.
    pub fn clear_all(&mut self) {
        let entries = self.memory_store.len();
        self.memory_store.clear();
        self.memory_metadata.clear();
        self.context_index.clear();
        warn!(event = "memory.cleared", entries = entries);
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Fetch a value, counting the access.
    ///
    /// The returned reference points at the stored value itself, not a copy.
    pub fn retrieve(&mut self, key: &str) -> Option<&Value> {
        let now = self.clock.now();
        let Some(meta) = self.memory_metadata.get_mut(key) else {
            METRICS.inc_retrieval_miss();
            warn!(event = "memory.miss", key = %key);
            return None;
        };

        meta.access_count += 1;
        meta.last_accessed = Some(now);
        METRICS.inc_retrieval_hit();
        debug!(event = "memory.retrieved", key = %key, access_count = meta.access_count);

        self.memory_store.get(key)
    }

    pub fn retrieve_in(&mut self, category: &str, key: &str) -> Option<&Value> {
        self.retrieve(&category_key(category, key))
    }

    /// Read a value without counting an access.
    pub fn peek(&self, key: &str) -> Option<&Value> {
        self.memory_store.get(key)
    }

    fn snapshot(&self, key: &str) -> Option<EntrySnapshot> {
        Some(EntrySnapshot {
            key: key.to_string(),
            value: self.memory_store.get(key)?.clone(),
            metadata: self.memory_metadata.get(key)?.clone(),
        })
    }

    /// Entries carrying *every* tag in `query`, in key order, at most `limit`.
    pub fn retrieve_by_context(&self, query: &Context, limit: usize) -> Vec<EntrySnapshot> {
        let results: Vec<EntrySnapshot> = self
            .context_index
            .intersect(query)
            .iter()
            .filter_map(|key| self.snapshot(key))
            .take(limit)
            .collect();

        debug!(event = "memory.context_query", tags = query.len(), results = results.len());
        results
    }

    /// Entries written within the last `window_hours`, newest first.
    pub fn retrieve_recent(&self, window_hours: u64, limit: usize) -> Vec<EntrySnapshot> {
        let now = self.clock.now();
        let cutoff = i64::try_from(window_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|window| now.checked_sub_signed(window));

        let mut recent: Vec<(&String, &EntryMetadata)> = self
            .memory_metadata
            .iter()
            .filter(|(_, meta)| cutoff.map_or(true, |c| meta.timestamp >= c))
            .collect();
        recent.sort_by(|(_, a), (_, b)| b.timestamp.cmp(&a.timestamp));

        recent
            .into_iter()
            .take(limit)
            .filter_map(|(key, _)| self.snapshot(key))
            .collect()
    }

    /// Entries stored under `category`, optionally filtered by value.
    pub fn list_category<F>(&self, category: &str, predicate: F) -> Vec<EntrySnapshot>
    where
        F: Fn(&Value) -> bool,
    {
        let prefix = format!("{category}:");
        self.memory_store
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter(|(_, value)| predicate(*value))
            .filter_map(|(key, _)| self.snapshot(key))
            .collect()
    }

    /// Case-insensitive substring search over keys, then serialized values.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let needle = query.to_lowercase();
        let mut hits = Vec::new();

        for (key, value) in &self.memory_store {
            if hits.len() >= limit {
                break;
            }

            let match_type = if key.to_lowercase().contains(&needle) {
                MatchType::Key
            } else if value.to_string().to_lowercase().contains(&needle) {
                MatchType::Value
            } else {
                continue;
            };

            if let Some(metadata) = self.memory_metadata.get(key) {
                hits.push(SearchHit {
                    key: key.clone(),
                    value: value.clone(),
                    metadata: metadata.clone(),
                    match_type,
                });
            }
        }

        debug!(event = "memory.search", query = %query, results = hits.len());
        hits
    }

    // ------------------------------------------------------------------
    // Compaction & statistics
    // ------------------------------------------------------------------

    /// Evict the lowest-scoring `ceil(len * target_reduction)` entries.
    ///
    /// Returns `None` without recording anything when the bank is empty.
    pub fn compact(&mut self, target_reduction: f64) -> Option<CompactionEvent> {
        let count = eviction_count(self.memory_store.len(), target_reduction);
        info!(
            event = "memory.compaction_started",
            target_reduction = target_reduction,
            entries = self.memory_store.len(),
            to_remove = count,
        );
        self.evict_lowest(count)
    }

    pub(super) fn evict_lowest(&mut self, count: usize) -> Option<CompactionEvent> {
        let before = self.memory_store.len();
        if before == 0 {
            debug!(event = "memory.compaction_skipped", reason = "empty");
            return None;
        }

        let now = self.clock.now();
        let victims: Vec<String> = eviction_order(&self.memory_metadata, now)
            .into_iter()
            .take(count)
            .map(|(key, _)| key)
            .collect();
        let removed = victims.iter().filter(|key| self.delete(key)).count();

        let event = CompactionEvent::new(now, before, self.memory_store.len(), removed);
        obs::emit_compaction_finished(&event);
        METRICS.record_compaction(removed);
        self.compaction_history.record(event.clone());
        Some(event)
    }

    pub fn get_statistics(&self) -> MemoryStatistics {
        let total_entries = self.memory_store.len();
        MemoryStatistics {
            total_entries,
            total_size_bytes: self.memory_metadata.values().map(|m| m.size).sum(),
            max_capacity: self.config.max_memory_size,
            utilization_percent: round2(
                total_entries as f64 / self.config.max_memory_size as f64 * 100.0,
            ),
            context_indices: self.context_index.slot_count(),
            total_accesses: self.memory_metadata.values().map(|m| m.access_count).sum(),
            compaction_events: self.compaction_history.total_runs(),
            most_accessed_entries: most_accessed(&self.memory_metadata, MOST_ACCESSED_LIMIT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::clock::ManualClock;
    use crate::memory::entry::context;
    use serde_json::json;
    use std::collections::HashMap;

    fn bank(max: usize, threshold: f64) -> (MemoryBank, ManualClock) {
        let clock = ManualClock::starting_now();
        let bank = MemoryBank::with_clock(
            MemoryBankConfig::new(max, threshold),
            Arc::new(clock.clone()),
        )
        .unwrap();
        (bank, clock)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(MemoryBank::new(MemoryBankConfig::new(0, 0.8)).is_err());
        assert!(MemoryBank::new(MemoryBankConfig::new(10, 0.0)).is_err());
    }

    #[test]
    fn test_store_and_retrieve() {
        let (mut b, _) = bank(100, 0.8);
        assert!(b.store("k1", &json!({"aqi": 3}), Context::new()));
        assert_eq!(b.retrieve("k1"), Some(&json!({"aqi": 3})));
        assert_eq!(b.metadata("k1").unwrap().access_count, 1);
        assert!(b.metadata("k1").unwrap().last_accessed.is_some());
    }

    #[test]
    fn test_store_records_size() {
        let (mut b, _) = bank(100, 0.8);
        let value = json!({"city": "Paris"});
        b.store("k", &value, Context::new());
        assert_eq!(b.metadata("k").unwrap().size, value.to_string().len());
    }

    #[test]
    fn test_store_unserializable_value_returns_false() {
        let (mut b, _) = bank(100, 0.8);
        let mut bad: HashMap<(u8, u8), u8> = HashMap::new();
        bad.insert((1, 2), 3);
        assert!(!b.store("bad", &bad, Context::new()));
        assert!(b.try_store("bad", &bad, Context::new()).is_err());
        assert!(b.is_empty());
    }

    #[test]
    fn test_retrieve_missing_has_no_side_effects() {
        let (mut b, _) = bank(100, 0.8);
        assert!(b.retrieve("ghost").is_none());
        assert!(b.is_empty());
        assert_eq!(b.get_statistics().total_accesses, 0);
    }

    #[test]
    fn test_overwrite_resets_access_and_moves_tags() {
        let (mut b, _) = bank(100, 0.8);
        b.store("k", &json!(1), context([("city", "Paris")]));
        b.retrieve("k");
        b.store("k", &json!(2), context([("city", "Lyon")]));

        assert_eq!(b.metadata("k").unwrap().access_count, 0);
        assert!(b.retrieve_by_context(&context([("city", "Paris")]), 10).is_empty());
        assert_eq!(b.retrieve_by_context(&context([("city", "Lyon")]), 10).len(), 1);
    }

    #[test]
    fn test_update_merge_is_shallow() {
        let (mut b, _) = bank(100, 0.8);
        b.store(
            "k",
            &json!({"a": 1, "nested": {"x": 1, "y": 2}}),
            Context::new(),
        );
        assert!(b.update("k", &json!({"b": 2, "nested": {"x": 9}}), true));
        assert_eq!(
            b.peek("k"),
            Some(&json!({"a": 1, "b": 2, "nested": {"x": 9}}))
        );
    }

    #[test]
    fn test_update_type_mismatch_replaces() {
        let (mut b, _) = bank(100, 0.8);
        b.store("k", &json!({"a": 1}), Context::new());
        assert!(b.update("k", &json!([1, 2, 3]), true));
        assert_eq!(b.peek("k"), Some(&json!([1, 2, 3])));
        assert_eq!(b.metadata("k").unwrap().size, "[1,2,3]".len());
    }

    #[test]
    fn test_update_keeps_access_count_and_refreshes_timestamp() {
        let (mut b, clock) = bank(100, 0.8);
        b.store("k", &json!({"a": 1}), context([("t", "x")]));
        b.retrieve("k");
        b.retrieve("k");
        let before = b.metadata("k").unwrap().timestamp;

        clock.advance(Duration::minutes(5));
        assert!(b.update("k", &json!({"a": 2}), false));

        let meta = b.metadata("k").unwrap();
        assert_eq!(meta.access_count, 2);
        assert!(meta.timestamp > before);
        assert_eq!(b.retrieve_by_context(&context([("t", "x")]), 10).len(), 1);
    }

    #[test]
    fn test_update_missing_never_creates() {
        let (mut b, _) = bank(100, 0.8);
        assert!(!b.update("missing", &json!({"x": 1}), false));
        assert!(!b.update("missing", &json!({"x": 1}), true));
        assert!(!b.contains_key("missing"));

        let err = b.try_update("missing", &json!(1), false).unwrap_err();
        assert!(matches!(err, MemoryError::EntryNotFound { key } if key == "missing"));
    }

    #[test]
    fn test_delete_is_idempotent_and_cleans_index() {
        let (mut b, _) = bank(100, 0.8);
        b.store("k", &json!(1), context([("a", "1"), ("b", "2")]));
        assert!(b.delete("k"));
        assert!(!b.delete("k"));
        assert!(!b.context_index().references("k"));
        assert!(b.metadata("k").is_none());
    }

    #[test]
    fn test_store_triggers_compaction_at_threshold() {
        let (mut b, _) = bank(10, 0.5);
        for i in 0..5 {
            b.store(&format!("k{i}"), &json!(i), Context::new());
        }
        assert!(b.compaction_history().is_empty());

        b.store("k5", &json!(5), Context::new());
        assert_eq!(b.compaction_history().len(), 1);
        // ceil(5 * 0.3) = 2 removed, then one inserted.
        assert_eq!(b.len(), 4);
        assert!(b.contains_key("k5"));
    }

    #[test]
    fn test_compact_empty_is_noop() {
        let (mut b, _) = bank(10, 0.5);
        assert!(b.compact(0.3).is_none());
        assert_eq!(b.get_statistics().compaction_events, 0);
    }

    #[test]
    fn test_compact_evicts_lowest_scores() {
        let (mut b, clock) = bank(100, 1.0);
        b.store("old_unread", &json!(1), Context::new());
        b.store("old_read", &json!(2), Context::new());
        for _ in 0..20 {
            b.retrieve("old_read");
        }
        clock.advance(Duration::days(10));
        b.store("new_read", &json!(3), Context::new());
        b.retrieve("new_read");

        let event = b.compact(0.5).unwrap();
        // ceil(3 * 0.5) = 2: old_unread (0.0) then new_read (1.0); old_read scores 20/11.
        assert_eq!(event.entries_removed, 2);
        assert_eq!(event.before_size, 3);
        assert_eq!(event.after_size, 1);
        assert!(b.contains_key("old_read"));
    }

    #[test]
    fn test_retrieve_recent_window_and_order() {
        let (mut b, clock) = bank(100, 1.0);
        b.store("oldest", &json!(1), Context::new());
        clock.advance(Duration::hours(30));
        b.store("middle", &json!(2), Context::new());
        clock.advance(Duration::hours(1));
        b.store("newest", &json!(3), Context::new());

        let recent: Vec<String> = b
            .retrieve_recent(24, 10)
            .into_iter()
            .map(|e| e.key)
            .collect();
        assert_eq!(recent, vec!["newest", "middle"]);

        assert_eq!(b.retrieve_recent(24, 1)[0].key, "newest");
        assert_eq!(b.retrieve_recent(u64::MAX, 10).len(), 3);
    }

    #[test]
    fn test_search_key_and_value_matches() {
        let (mut b, _) = bank(100, 1.0);
        b.store("paris_profile", &json!({"aqi": 2}), Context::new());
        b.store("lyon_profile", &json!({"note": "near PARIS"}), Context::new());
        b.store("berlin", &json!({"note": "elsewhere"}), Context::new());

        let hits = b.search("Paris", 10);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].key, "lyon_profile");
        assert_eq!(hits[0].match_type, MatchType::Value);
        assert_eq!(hits[1].key, "paris_profile");
        assert_eq!(hits[1].match_type, MatchType::Key);

        assert_eq!(b.search("profile", 1).len(), 1);
    }

    #[test]
    fn test_category_namespace() {
        let (mut b, _) = bank(100, 1.0);
        assert!(b.store_in("city_profiles", "Paris", &json!({"aqi": 2}), Context::new()));
        assert!(b.store_in("city_profiles", "Lyon", &json!({"aqi": 4}), Context::new()));
        b.store_in("predictions", "Paris", &json!({"aqi": 3}), Context::new());

        assert!(b.contains_key("city_profiles:Paris"));
        assert_eq!(
            b.metadata("city_profiles:Paris").unwrap().category.as_deref(),
            Some("city_profiles")
        );
        assert_eq!(b.retrieve_in("city_profiles", "Lyon"), Some(&json!({"aqi": 4})));

        let all = b.list_category("city_profiles", |_| true);
        assert_eq!(all.len(), 2);
        let poor = b.list_category("city_profiles", |v| v["aqi"].as_u64() >= Some(4));
        assert_eq!(poor.len(), 1);
        assert_eq!(poor[0].key, "city_profiles:Lyon");

        assert!(b.delete_in("predictions", "Paris"));
        assert!(b.list_category("predictions", |_| true).is_empty());
    }

    #[test]
    fn test_statistics() {
        let (mut b, _) = bank(200, 1.0);
        b.store("a", &json!("x"), context([("t", "1")]));
        b.store("b", &json!("yy"), context([("t", "1"), ("u", "2")]));
        b.retrieve("a");
        b.retrieve("a");
        b.retrieve("b");

        let stats = b.get_statistics();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.total_size_bytes, 3 + 4);
        assert_eq!(stats.max_capacity, 200);
        assert_eq!(stats.utilization_percent, 1.0);
        assert_eq!(stats.context_indices, 2);
        assert_eq!(stats.total_accesses, 3);
        assert_eq!(stats.most_accessed_entries[0].key, "a");
        assert_eq!(stats.most_accessed_entries[0].access_count, 2);
    }

    #[test]
    fn test_clear_all() {
        let (mut b, _) = bank(100, 1.0);
        b.store("a", &json!(1), context([("t", "1")]));
        b.clear_all();
        assert!(b.is_empty());
        assert_eq!(b.get_statistics().context_indices, 0);
    }
}
