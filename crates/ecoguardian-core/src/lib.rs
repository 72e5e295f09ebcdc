//! EcoGuardian Core Library
//!
//! Bounded agent memory, user sessions and multi-agent workflow coordination.

pub mod config;
pub mod memory;
pub mod metrics;
pub mod obs;
pub mod session;
pub mod telemetry;
pub mod workflow;

pub use config::MemoryBankConfig;

pub use memory::{
    category_key, context, Clock, CompactionEvent, Context, EntryMetadata, EntrySnapshot,
    ExportDocument, ManualClock, MatchType, MemoryBank, MemoryError, MemoryResult,
    MemoryStatistics, SearchHit, SharedMemoryBank, SystemClock, DEFAULT_CATEGORY,
};

pub use session::{InMemorySessionService, Session, SessionMessage};

pub use workflow::{
    recommend_actions, ActionDeployer, ActionKind, AgentMessage, CityDataCollector, Coordinator,
    InterventionPredictor, PerformanceGrade, PerformanceReport, RecommendedAction,
    WorkflowAnalytics, WorkflowRecord, WorkflowStatus, WorkflowType,
};

pub use metrics::METRICS;
pub use obs::{
    emit_agent_message, emit_compaction_finished, emit_memory_exported, emit_memory_imported,
    emit_persistence_error, emit_workflow_finished, emit_workflow_started,
};
pub use telemetry::init_tracing;

/// Crate version, kept in lockstep across the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
