use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};
use url::Url;

use super::{GatewayError, PredictionOutcome, ScoringGateway};
use crate::catalog::{ClientId, ClientInfo, FeatureRow, FeatureValue};

const PREDICT_PATH: &str = "predict";
const CLIENT_INFO_PATH: &str = "get_client_info";

/// Blocking `ureq` client. No retries and no timeouts: one call, one round trip.
#[derive(Debug, Clone)]
pub struct HttpScoringGateway {
    base_url: Url,
    agent: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// `Map` keeps insertion order (serde_json `preserve_order`), so rows follow the server.
#[derive(Debug, Deserialize)]
struct ClientInfoBody {
    #[serde(default)]
    client_info: Map<String, Value>,
}

impl HttpScoringGateway {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str, client_id: ClientId) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                GatewayError::Transport(format!("base URL {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .push(path);
        url.query_pairs_mut()
            .clear()
            .append_pair("id", &client_id.to_string());
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, GatewayError> {
        let started = Instant::now();
        let response = match self.agent.get(url.as_str()).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                return Err(server_error(status, response));
            }
            Err(ureq::Error::Transport(err)) => {
                warn!(path = url.path(), error = %err, "scoring service unreachable");
                return Err(GatewayError::Transport(err.to_string()));
            }
        };

        let status = response.status();
        info!(
            path = url.path(),
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scoring service replied"
        );
        if status != 200 {
            return Err(server_error(status, response));
        }

        response
            .into_json::<T>()
            .map_err(|err| GatewayError::Decode(err.to_string()))
    }
}

fn server_error(status: u16, response: ureq::Response) -> GatewayError {
    let message = response
        .into_json::<ErrorBody>()
        .ok()
        .and_then(|body| body.error)
        .unwrap_or_else(|| format!("HTTP {status}"));
    warn!(status, %message, "scoring service rejected request");
    GatewayError::Server { status, message }
}

impl ScoringGateway for HttpScoringGateway {
    fn predict(&self, client_id: ClientId) -> PredictionOutcome {
        let url = self.endpoint(PREDICT_PATH, client_id)?;
        self.get_json(&url)
    }

    fn get_client_info(&self, client_id: ClientId) -> Result<ClientInfo, GatewayError> {
        let url = self.endpoint(CLIENT_INFO_PATH, client_id)?;
        let body: ClientInfoBody = self.get_json(&url)?;
        let rows = body
            .client_info
            .iter()
            .map(|(feature, value)| FeatureRow {
                feature: feature.clone(),
                value: FeatureValue::from_json(value),
            })
            .collect();

        Ok(ClientInfo { client_id, rows })
    }
}
