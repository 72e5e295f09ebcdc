//! Workflow coordination over a shared memory bank with stub agents.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use ecoguardian_core::memory::context;
use ecoguardian_core::workflow::coordinator::{WORKFLOW_CONTEXT_TYPE, WORKFLOW_KEY_PREFIX};
use ecoguardian_core::{
    ActionDeployer, ActionKind, CityDataCollector, Coordinator, InterventionPredictor,
    RecommendedAction, SharedMemoryBank, WorkflowStatus, WorkflowType,
};

struct StubCollector;

#[async_trait]
impl CityDataCollector for StubCollector {
    async fn collect_city_data(&self, location: &str) -> anyhow::Result<Value> {
        Ok(json!({ "location": location, "no2": 41.0, "aqi": 4 }))
    }
}

struct RulePredictor;

impl InterventionPredictor for RulePredictor {
    fn predict_interventions(&self, city_data: &Value) -> anyhow::Result<Value> {
        let aqi = city_data["aqi"]
            .as_u64()
            .ok_or_else(|| anyhow::anyhow!("missing aqi"))?;
        let mut interventions = vec![json!({ "name": "Urban tree canopy", "priority_level": "High" })];
        if aqi >= 4 {
            interventions.push(json!({ "name": "Traffic emission zone" }));
            interventions.push(json!({ "name": "Pollution monitoring" }));
        }
        Ok(json!({ "interventions": interventions }))
    }
}

struct LedgerDeployer;

#[async_trait]
impl ActionDeployer for LedgerDeployer {
    async fn deploy_actions(
        &self,
        actions: &[RecommendedAction],
        location: &str,
    ) -> anyhow::Result<Value> {
        let deployed: Vec<Value> = actions
            .iter()
            .map(|action| {
                let detail = match action.kind {
                    ActionKind::TreePlanting => "trees scheduled",
                    ActionKind::EmissionReduction => "zone proposed",
                    ActionKind::GreenInfrastructure => "roofs surveyed",
                    ActionKind::AirQualityImprovement => "sensors placed",
                    ActionKind::CarbonOffset => "offset tracked",
                };
                json!({ "kind": action.kind, "detail": detail })
            })
            .collect();
        Ok(json!({ "location": location, "deployed": deployed }))
    }
}

struct BrokenPredictor;

impl InterventionPredictor for BrokenPredictor {
    fn predict_interventions(&self, _city_data: &Value) -> anyhow::Result<Value> {
        anyhow::bail!("model weights not loaded")
    }
}

#[tokio::test]
async fn test_workflow_deploys_mapped_actions() {
    let bank = SharedMemoryBank::default();
    let mut coord = Coordinator::new(Arc::new(StubCollector), Arc::new(RulePredictor), bank.clone())
        .with_deployer(Arc::new(LedgerDeployer));

    let record = coord.orchestrate("Madrid", WorkflowType::Sequential).await;
    assert_eq!(record.status, WorkflowStatus::Completed);

    let deployment = record.stage("deployment").unwrap();
    let kinds: Vec<&str> = deployment["deployed"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["kind"].as_str().unwrap())
        .collect();
    assert_eq!(
        kinds,
        vec![
            "tree_planting",
            "emission_reduction",
            "air_quality_improvement",
            "carbon_offset"
        ]
    );

    let key = format!("{WORKFLOW_KEY_PREFIX}{}", record.session_id);
    let stored = bank.retrieve(&key).unwrap();
    assert_eq!(stored["location"], json!("Madrid"));
    assert_eq!(stored["workflow_type"], json!("sequential"));
    assert_eq!(stored["a2a_messages"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_failures_and_successes_share_history() {
    let bank = SharedMemoryBank::default();
    let mut broken = Coordinator::new(
        Arc::new(StubCollector),
        Arc::new(BrokenPredictor),
        bank.clone(),
    );
    let failed = broken.orchestrate("Madrid", WorkflowType::Hybrid).await;
    assert_eq!(failed.status, WorkflowStatus::Failed);
    assert!(failed
        .error
        .as_deref()
        .unwrap()
        .contains("phase2_prediction stage failed"));
    assert_eq!(failed.stages.len(), 1);
    assert_eq!(failed.a2a_messages.len(), 1);
    assert!(bank.is_empty());

    let analytics = broken.workflow_analytics();
    assert_eq!(analytics.total_workflows, 1);
    assert_eq!(broken.evaluate_performance().successful_workflows, 0);
}

#[tokio::test]
async fn test_workflows_indexed_by_location() {
    let bank = SharedMemoryBank::default();
    let mut coord = Coordinator::new(Arc::new(StubCollector), Arc::new(RulePredictor), bank.clone());

    for city in ["Paris", "Paris", "Rome"] {
        coord.orchestrate(city, WorkflowType::default()).await;
    }

    let paris = bank.retrieve_by_context(
        &context([("location", "Paris"), ("type", WORKFLOW_CONTEXT_TYPE)]),
        10,
    );
    assert_eq!(paris.len(), 2);
    let healing = bank.retrieve_by_context(&context([("type", WORKFLOW_CONTEXT_TYPE)]), 10);
    assert_eq!(healing.len(), 3);
}
