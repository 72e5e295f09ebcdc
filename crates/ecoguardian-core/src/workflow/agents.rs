//! Capabilities the coordinator composes into a workflow.
//!
//! Each stage is a separate trait so a coordinator can be assembled from
//! whichever implementations are at hand. Outputs are JSON documents; the
//! coordinator records them verbatim and hands them to the next stage.

use async_trait::async_trait;
use serde_json::Value;

use super::action::RecommendedAction;

/// Gathers environmental readings for a location.
#[async_trait]
pub trait CityDataCollector: Send + Sync {
    async fn collect_city_data(&self, location: &str) -> anyhow::Result<Value>;
}

/// Turns collected readings into predicted interventions.
///
/// Output is expected to carry an `interventions` array of objects with a
/// `name` and optional `priority_level`; see
/// [`recommend_actions`](super::action::recommend_actions).
pub trait InterventionPredictor: Send + Sync {
    fn predict_interventions(&self, city_data: &Value) -> anyhow::Result<Value>;
}

/// Carries out recommended actions at a location.
#[async_trait]
pub trait ActionDeployer: Send + Sync {
    async fn deploy_actions(
        &self,
        actions: &[RecommendedAction],
        location: &str,
    ) -> anyhow::Result<Value>;
}
