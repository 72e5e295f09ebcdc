//! Closed vocabulary of deployable eco-actions.
//!
//! Deployers dispatch on [`ActionKind`] with an exhaustive `match`, so adding
//! a kind is a compile error everywhere it is not yet handled.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    TreePlanting,
    EmissionReduction,
    GreenInfrastructure,
    AirQualityImprovement,
    CarbonOffset,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::TreePlanting,
        ActionKind::EmissionReduction,
        ActionKind::GreenInfrastructure,
        ActionKind::AirQualityImprovement,
        ActionKind::CarbonOffset,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::TreePlanting => "tree_planting",
            ActionKind::EmissionReduction => "emission_reduction",
            ActionKind::GreenInfrastructure => "green_infrastructure",
            ActionKind::AirQualityImprovement => "air_quality_improvement",
            ActionKind::CarbonOffset => "carbon_offset",
        }
    }

    /// Map a free-text intervention name (as produced by a predictor) to a kind.
    ///
    /// Checked in order: trees/green space, traffic/emission, infrastructure,
    /// air quality/pollution. Anything else has no deployable kind.
    pub fn from_intervention_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| name.contains(w));

        if has(&["tree", "green space"]) {
            Some(ActionKind::TreePlanting)
        } else if has(&["traffic", "emission"]) {
            Some(ActionKind::EmissionReduction)
        } else if has(&["infrastructure"]) {
            Some(ActionKind::GreenInfrastructure)
        } else if has(&["air quality", "pollution"]) {
            Some(ActionKind::AirQualityImprovement)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action kind: {0}")]
pub struct UnknownActionKind(pub String);

impl FromStr for ActionKind {
    type Err = UnknownActionKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownActionKind(s.to_string()))
    }
}

/// One action a deployer should carry out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub kind: ActionKind,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl RecommendedAction {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            parameters: Map::new(),
        }
    }

    pub fn with_parameter(mut self, key: &str, value: Value) -> Self {
        self.parameters.insert(key.to_string(), value);
        self
    }
}

/// Number of predicted interventions considered for deployment.
pub const MAX_INTERVENTIONS: usize = 5;

/// Turn predictor output into deployable actions.
///
/// Reads `interventions[].name` / `priority_level` from `predictions`, keeps
/// the first [`MAX_INTERVENTIONS`], and always appends carbon monitoring.
pub fn recommend_actions(predictions: &Value) -> Vec<RecommendedAction> {
    let mut actions: Vec<RecommendedAction> = predictions
        .get("interventions")
        .and_then(Value::as_array)
        .map(|interventions| {
            interventions
                .iter()
                .take(MAX_INTERVENTIONS)
                .filter_map(|intervention| {
                    let name = intervention.get("name")?.as_str()?;
                    let kind = ActionKind::from_intervention_name(name)?;
                    let priority = intervention
                        .get("priority_level")
                        .and_then(Value::as_str)
                        .unwrap_or("Medium");
                    Some(
                        RecommendedAction::new(kind)
                            .with_parameter("priority", Value::String(priority.to_string())),
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    actions.push(RecommendedAction::new(ActionKind::CarbonOffset));
    actions
}
