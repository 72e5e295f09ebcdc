//! Global atomic counters for memory bank observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. after a workflow or before export).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Atomic counters, updated without locking.
pub struct Metrics {
    entries_stored: AtomicU64,
    retrieval_hits: AtomicU64,
    retrieval_misses: AtomicU64,
    entries_evicted: AtomicU64,
    compactions_run: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            entries_stored: AtomicU64::new(0),
            retrieval_hits: AtomicU64::new(0),
            retrieval_misses: AtomicU64::new(0),
            entries_evicted: AtomicU64::new(0),
            compactions_run: AtomicU64::new(0),
        }
    }

    pub fn inc_stored(&self) {
        self.entries_stored.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "entries_stored", "counter incremented");
    }

    pub fn inc_retrieval_hit(&self) {
        self.retrieval_hits.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "retrieval_hits", "counter incremented");
    }

    pub fn inc_retrieval_miss(&self) {
        self.retrieval_misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "retrieval_misses", "counter incremented");
    }

    /// Record one compaction pass that evicted `evicted` entries.
    pub fn record_compaction(&self, evicted: usize) {
        self.compactions_run.fetch_add(1, Ordering::Relaxed);
        self.entries_evicted
            .fetch_add(evicted as u64, Ordering::Relaxed);
        tracing::trace!(metric = "compactions_run", evicted, "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            entries_stored = self.entries_stored(),
            retrieval_hits = self.retrieval_hits(),
            retrieval_misses = self.retrieval_misses(),
            entries_evicted = self.entries_evicted(),
            compactions_run = self.compactions_run(),
        );
    }

    pub fn entries_stored(&self) -> u64 {
        self.entries_stored.load(Ordering::Relaxed)
    }

    pub fn retrieval_hits(&self) -> u64 {
        self.retrieval_hits.load(Ordering::Relaxed)
    }

    pub fn retrieval_misses(&self) -> u64 {
        self.retrieval_misses.load(Ordering::Relaxed)
    }

    pub fn entries_evicted(&self) -> u64 {
        self.entries_evicted.load(Ordering::Relaxed)
    }

    pub fn compactions_run(&self) -> u64 {
        self.compactions_run.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.entries_stored.store(0, Ordering::Relaxed);
        self.retrieval_hits.store(0, Ordering::Relaxed);
        self.retrieval_misses.store(0, Ordering::Relaxed);
        self.entries_evicted.store(0, Ordering::Relaxed);
        self.compactions_run.store(0, Ordering::Relaxed);
    }
}
