//! Occupancy and access statistics for the memory bank.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entry::EntryMetadata;

/// How many entries `most_accessed_entries` reports.
pub const MOST_ACCESSED_LIMIT: usize = 5;

/// Access summary for one frequently read entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessSummary {
    pub key: String,
    pub access_count: u64,
    pub metadata: EntryMetadata,
}

/// Snapshot of bank occupancy, as reported by `get_statistics` and embedded in exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStatistics {
    pub total_entries: usize,
    pub total_size_bytes: usize,
    pub max_capacity: usize,
    pub utilization_percent: f64,
    pub context_indices: usize,
    pub total_accesses: u64,
    pub compaction_events: u64,
    pub most_accessed_entries: Vec<AccessSummary>,
}

/// Entries with at least one access, highest count first (ties by key), capped at `limit`.
pub fn most_accessed(metadata: &BTreeMap<String, EntryMetadata>, limit: usize) -> Vec<AccessSummary> {
    let mut accessed: Vec<(&String, &EntryMetadata)> = metadata
        .iter()
        .filter(|(_, meta)| meta.access_count > 0)
        .collect();
    // BTreeMap iteration is key-ordered and sort_by is stable, so ties stay key-ordered.
    accessed.sort_by(|(_, a), (_, b)| b.access_count.cmp(&a.access_count));

    accessed
        .into_iter()
        .take(limit)
        .map(|(key, meta)| AccessSummary {
            key: key.clone(),
            access_count: meta.access_count,
            metadata: meta.clone(),
        })
        .collect()
}
