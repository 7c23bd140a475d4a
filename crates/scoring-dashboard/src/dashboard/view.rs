use serde::{Deserialize, Serialize};

use crate::catalog::{ClientId, ColumnKind, FeatureRow};
use crate::gateway::{Decision, PredictionOutcome};
use crate::selection::SelectionOrigin;
use crate::visualization::{CorrelationHeatmap, FeatureChart};

pub const NO_CLIENT_INFO: &str = "Aucune information trouvée pour cet ID client.";
pub const NO_NUMERIC_COLUMNS: &str =
    "Aucune colonne numérique disponible pour calculer la matrice de corrélation.";
pub const NO_FEATURES: &str = "Aucune caractéristique disponible dans le catalogue.";

/// Feature selections coming from the dashboard controls; unset fields fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub feature_x: Option<String>,
    #[serde(default)]
    pub feature_y: Option<String>,
    #[serde(default)]
    pub correlation_feature: Option<String>,
}

/// Everything the front-end needs to draw one dashboard frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub selection: SelectionPanel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<PredictionPanel>,
    pub client_info: ClientInfoPanel,
    pub feature_chart: ChartPanel,
    pub correlation: CorrelationPanel,
    pub controls: ControlsView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionPanel {
    pub client_id: ClientId,
    pub origin: SelectionOrigin,
    pub in_catalog: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictionPanel {
    Scored {
        client_id: ClientId,
        prediction: i64,
        prediction_proba: f64,
        probability_display: String,
        decision: Decision,
        label: &'static str,
        marker: &'static str,
        headline: String,
    },
    Failed {
        message: String,
    },
}

impl PredictionPanel {
    pub fn from_outcome(outcome: &PredictionOutcome) -> Self {
        match outcome {
            Ok(result) => {
                let decision = result.decision();
                PredictionPanel::Scored {
                    client_id: result.client_id,
                    prediction: result.prediction,
                    prediction_proba: result.prediction_proba,
                    probability_display: format!("{:.4}", result.prediction_proba),
                    decision,
                    label: decision.label(),
                    marker: decision.marker(),
                    headline: decision.headline(),
                }
            }
            Err(error) => PredictionPanel::Failed {
                message: error.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClientInfoPanel {
    Found { rows: Vec<FeatureRow> },
    NotFound { message: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChartPanel {
    Chart { chart: FeatureChart },
    Notice { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CorrelationPanel {
    Heatmap { heatmap: CorrelationHeatmap },
    Notice { message: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureOption {
    pub name: String,
    pub kind: ColumnKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlsView {
    pub min_client_id: u64,
    pub features: Vec<FeatureOption>,
    pub correlation_features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_feature: Option<String>,
}
