//! Client for the remote scoring service.

mod http;

use serde::{Deserialize, Serialize};

use crate::catalog::{ClientId, ClientInfo};

pub use http::HttpScoringGateway;

/// Response of `GET /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub client_id: ClientId,
    pub prediction: i64,
    pub prediction_proba: f64,
}

impl PredictionResult {
    pub fn decision(&self) -> Decision {
        Decision::from_prediction(self.prediction)
    }
}

/// Loan decision as displayed to the analyst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Granted,
    Denied,
}

impl Decision {
    /// Only `1` grants the loan; every other value is a refusal.
    pub const fn from_prediction(prediction: i64) -> Self {
        if prediction == 1 {
            Self::Granted
        } else {
            Self::Denied
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Granted => "accordé",
            Self::Denied => "refusé",
        }
    }

    pub const fn marker(self) -> &'static str {
        match self {
            Self::Granted => "😊",
            Self::Denied => "😟",
        }
    }

    pub fn headline(self) -> String {
        format!("Prêt {}: {}", self.label(), self.marker())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Non-200 reply; `message` is the server's `error` field verbatim.
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("scoring service unreachable: {0}")]
    Transport(String),
    #[error("unexpected scoring service response: {0}")]
    Decode(String),
}

/// Outcome of one predict action, kept only long enough to render it.
pub type PredictionOutcome = Result<PredictionResult, GatewayError>;

/// Seam between the dashboard and the remote scoring service.
pub trait ScoringGateway: Send + Sync {
    /// One blocking round trip to `/predict`.
    fn predict(&self, client_id: ClientId) -> PredictionOutcome;

    /// One blocking round trip to `/get_client_info`.
    fn get_client_info(&self, client_id: ClientId) -> Result<ClientInfo, GatewayError>;
}
