//! Workflow coordination across data collection, prediction and deployment agents.

pub mod action;
pub mod agents;
pub mod coordinator;

pub use action::{recommend_actions, ActionKind, RecommendedAction, UnknownActionKind};
pub use agents::{ActionDeployer, CityDataCollector, InterventionPredictor};
pub use coordinator::{
    AgentMessage, Coordinator, PerformanceGrade, PerformanceReport, StageRecord,
    WorkflowAnalytics, WorkflowRecord, WorkflowStatus, WorkflowType,
};
