//! Memory subsystem: the bounded, context-indexed memory bank.
//!
//! Provides keyed storage of agent results with context-tag lookup,
//! score-based compaction, statistics, text search and JSON export/import.

pub mod bank;
pub mod clock;
pub mod entry;
pub mod error;
pub mod index;
pub mod persistence;
pub mod retention;
pub mod shared;
pub mod stats;

pub use bank::{category_key, MemoryBank, DEFAULT_CATEGORY};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{context, Context, EntryMetadata, EntrySnapshot, MatchType, SearchHit};
pub use error::{MemoryError, MemoryResult};
pub use index::ContextIndex;
pub use persistence::ExportDocument;
pub use retention::{
    eviction_count, eviction_order, eviction_score, CompactionEvent, CompactionHistory,
    DEFAULT_TARGET_REDUCTION,
};
pub use shared::SharedMemoryBank;
pub use stats::{AccessSummary, MemoryStatistics};
