//! Multi-stage urban healing workflows.
//!
//! A [`Coordinator`] runs data collection, prediction and (when a deployer is
//! configured) deployment for one location, exchanging [`AgentMessage`]s
//! between stages. Completed runs are stored in the shared memory bank; every
//! run, failed or not, is kept in the coordinator's history.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, instrument, warn};
use uuid::Uuid;

use super::action::recommend_actions;
use super::agents::{ActionDeployer, CityDataCollector, InterventionPredictor};
use crate::memory::retention::round2;
use crate::memory::{context, Clock, SharedMemoryBank, SystemClock};
use crate::obs;

/// Memory bank key prefix for completed workflow records.
pub const WORKFLOW_KEY_PREFIX: &str = "healing_workflow_";

/// Value of the `type` context tag on stored workflow records.
pub const WORKFLOW_CONTEXT_TYPE: &str = "urban_healing";

/// Success rate (percent) at or above which coordination is graded excellent.
pub const EXCELLENT_SUCCESS_RATE: f64 = 95.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowType {
    Sequential,
    #[default]
    Hybrid,
}

impl WorkflowType {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowType::Sequential => "sequential",
            WorkflowType::Hybrid => "hybrid",
        }
    }

    /// Stage names in execution order: collect, predict, deploy.
    fn stage_names(self) -> [&'static str; 3] {
        match self {
            WorkflowType::Sequential => ["data_collection", "prediction", "deployment"],
            WorkflowType::Hybrid => [
                "phase1_data_collection",
                "phase2_prediction",
                "phase3_deployment",
            ],
        }
    }
}

impl std::fmt::Display for WorkflowType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    InProgress,
    Completed,
    Failed,
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkflowStatus::InProgress => "in_progress",
            WorkflowStatus::Completed => "completed",
            WorkflowStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Agent-to-agent message exchanged between workflow stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub message_id: Uuid,
    pub sender: String,
    pub receiver: String,
    pub message_type: String,
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
}

impl AgentMessage {
    pub fn new(
        sender: &str,
        receiver: &str,
        message_type: &str,
        payload: Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            message_type: message_type.to_string(),
            payload,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    pub name: String,
    pub output: Value,
}

/// Outcome of one [`Coordinator::orchestrate`] call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub session_id: String,
    pub location: String,
    pub workflow_type: WorkflowType,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub stages: Vec<StageRecord>,
    pub a2a_messages: Vec<AgentMessage>,
    pub status: WorkflowStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkflowRecord {
    /// Output of the named stage, if it ran.
    pub fn stage(&self, name: &str) -> Option<&Value> {
        self.stages
            .iter()
            .find(|stage| stage.name == name)
            .map(|stage| &stage.output)
    }

    pub fn duration_secs(&self) -> Option<f64> {
        let end = self.end_time?;
        Some((end - self.start_time).num_milliseconds() as f64 / 1000.0)
    }

    /// Memory bank key this record is stored under once completed.
    pub fn memory_key(&self) -> String {
        format!("{WORKFLOW_KEY_PREFIX}{}", self.session_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceGrade {
    NoWorkflows,
    Good,
    Excellent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub total_workflows_executed: usize,
    pub successful_workflows: usize,
    pub success_rate_percent: f64,
    pub performance_grade: PerformanceGrade,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowAnalytics {
    pub total_workflows: usize,
    /// Run count per workflow type name.
    pub workflow_distribution: BTreeMap<String, usize>,
    /// Mean wall time of finished runs, in seconds.
    pub average_execution_secs: f64,
    pub total_a2a_messages: usize,
}

/// Runs workflows over a fixed set of agents and a shared memory bank.
pub struct Coordinator {
    collector: Arc<dyn CityDataCollector>,
    predictor: Arc<dyn InterventionPredictor>,
    deployer: Option<Arc<dyn ActionDeployer>>,
    memory: SharedMemoryBank,
    clock: Arc<dyn Clock>,
    history: Vec<WorkflowRecord>,
}

impl Coordinator {
    pub fn new(
        collector: Arc<dyn CityDataCollector>,
        predictor: Arc<dyn InterventionPredictor>,
        memory: SharedMemoryBank,
    ) -> Self {
        Self {
            collector,
            predictor,
            deployer: None,
            memory,
            clock: Arc::new(SystemClock),
            history: Vec::new(),
        }
    }

    /// Add a deployment stage. Without one, workflows stop after prediction.
    pub fn with_deployer(mut self, deployer: Arc<dyn ActionDeployer>) -> Self {
        self.deployer = Some(deployer);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn memory(&self) -> &SharedMemoryBank {
        &self.memory
    }

    /// Every run so far, oldest first.
    pub fn history(&self) -> &[WorkflowRecord] {
        &self.history
    }

    /// Run one workflow for `location`.
    ///
    /// Never returns an error: a failing stage yields a record with status
    /// [`WorkflowStatus::Failed`] and the error chain in `error`. Only
    /// completed records are written to the memory bank.
    #[instrument(skip(self))]
    pub async fn orchestrate(
        &mut self,
        location: &str,
        workflow_type: WorkflowType,
    ) -> WorkflowRecord {
        let start_time = self.clock.now();
        let run_tag = Uuid::new_v4().simple().to_string();
        let session_id = format!(
            "coord_{location}_{}_{}",
            start_time.timestamp(),
            &run_tag[..8]
        );
        obs::emit_workflow_started(&session_id, location, workflow_type.as_str());

        let mut record = WorkflowRecord {
            session_id,
            location: location.to_string(),
            workflow_type,
            start_time,
            end_time: None,
            stages: Vec::new(),
            a2a_messages: Vec::new(),
            status: WorkflowStatus::InProgress,
            error: None,
        };

        let outcome = self
            .run_stages(
                location,
                workflow_type,
                &mut record.stages,
                &mut record.a2a_messages,
            )
            .await;
        record.end_time = Some(self.clock.now());

        match outcome {
            Ok(()) => {
                record.status = WorkflowStatus::Completed;
                let stored = self.memory.store(
                    &record.memory_key(),
                    &record,
                    context([("location", location), ("type", WORKFLOW_CONTEXT_TYPE)]),
                );
                if !stored {
                    warn!(event = "workflow.store_failed", session_id = %record.session_id);
                }
            }
            Err(e) => {
                error!(
                    event = "workflow.failed",
                    session_id = %record.session_id,
                    error = %format!("{e:#}"),
                );
                record.status = WorkflowStatus::Failed;
                record.error = Some(format!("{e:#}"));
            }
        }

        obs::emit_workflow_finished(
            &record.session_id,
            &record.status.to_string(),
            record.stages.len(),
            record.a2a_messages.len(),
        );
        self.history.push(record.clone());
        record
    }

    async fn run_stages(
        &self,
        location: &str,
        workflow_type: WorkflowType,
        stages: &mut Vec<StageRecord>,
        messages: &mut Vec<AgentMessage>,
    ) -> anyhow::Result<()> {
        let [collect, predict, deploy] = workflow_type.stage_names();

        let city_data = self
            .collector
            .collect_city_data(location)
            .await
            .with_context(|| format!("{collect} stage failed"))?;
        stages.push(StageRecord {
            name: collect.to_string(),
            output: city_data.clone(),
        });
        self.send(
            messages,
            "data_collector",
            "predictor",
            "data_ready",
            json!({ "city_data": city_data }),
        );

        let predictions = self
            .predictor
            .predict_interventions(&city_data)
            .with_context(|| format!("{predict} stage failed"))?;
        stages.push(StageRecord {
            name: predict.to_string(),
            output: predictions.clone(),
        });
        self.send(
            messages,
            "predictor",
            "deployer",
            "predictions_ready",
            json!({ "predictions": predictions }),
        );

        let Some(deployer) = &self.deployer else {
            return Ok(());
        };
        let actions = recommend_actions(&predictions);
        let deployment = deployer
            .deploy_actions(&actions, location)
            .await
            .with_context(|| format!("{deploy} stage failed"))?;
        stages.push(StageRecord {
            name: deploy.to_string(),
            output: deployment.clone(),
        });
        self.send(
            messages,
            "deployer",
            "coordinator",
            "deployment_complete",
            json!({ "deployment": deployment }),
        );
        Ok(())
    }

    fn send(
        &self,
        queue: &mut Vec<AgentMessage>,
        sender: &str,
        receiver: &str,
        message_type: &str,
        payload: Value,
    ) {
        obs::emit_agent_message(sender, receiver, message_type);
        queue.push(AgentMessage::new(
            sender,
            receiver,
            message_type,
            payload,
            self.clock.now(),
        ));
    }

    pub fn evaluate_performance(&self) -> PerformanceReport {
        let total = self.history.len();
        if total == 0 {
            return PerformanceReport {
                total_workflows_executed: 0,
                successful_workflows: 0,
                success_rate_percent: 0.0,
                performance_grade: PerformanceGrade::NoWorkflows,
            };
        }

        let successful = self
            .history
            .iter()
            .filter(|record| record.status == WorkflowStatus::Completed)
            .count();
        let rate = successful as f64 / total as f64 * 100.0;
        PerformanceReport {
            total_workflows_executed: total,
            successful_workflows: successful,
            success_rate_percent: round2(rate),
            performance_grade: if rate >= EXCELLENT_SUCCESS_RATE {
                PerformanceGrade::Excellent
            } else {
                PerformanceGrade::Good
            },
        }
    }

    pub fn workflow_analytics(&self) -> WorkflowAnalytics {
        let mut workflow_distribution = BTreeMap::new();
        for record in &self.history {
            *workflow_distribution
                .entry(record.workflow_type.to_string())
                .or_insert(0) += 1;
        }

        let durations: Vec<f64> = self
            .history
            .iter()
            .filter_map(WorkflowRecord::duration_secs)
            .collect();
        let average_execution_secs = if durations.is_empty() {
            0.0
        } else {
            round2(durations.iter().sum::<f64>() / durations.len() as f64)
        };

        WorkflowAnalytics {
            total_workflows: self.history.len(),
            workflow_distribution,
            average_execution_secs,
            total_a2a_messages: self
                .history
                .iter()
                .map(|record| record.a2a_messages.len())
                .sum(),
        }
    }
}
