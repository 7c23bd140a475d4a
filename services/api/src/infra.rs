use crate::cli::SourceArgs;
use chrono::{DateTime, Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use scoring_dashboard::catalog::ClientId;
use scoring_dashboard::config::{AppConfig, GatewayConfig};
use scoring_dashboard::error::AppError;
use scoring_dashboard::selection::{SessionError, SessionId, SessionRecord, SessionStore};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySessionStore {
    records: Arc<Mutex<HashMap<SessionId, SessionRecord>>>,
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, record: SessionRecord) -> Result<SessionRecord, SessionError> {
        let mut guard = self.records.lock().expect("session mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(SessionError::Conflict);
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn save(&self, record: SessionRecord) -> Result<(), SessionError> {
        let mut guard = self.records.lock().expect("session mutex poisoned");
        if guard.contains_key(&record.id) {
            guard.insert(record.id, record);
            Ok(())
        } else {
            Err(SessionError::NotFound)
        }
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<SessionRecord>, SessionError> {
        let guard = self.records.lock().expect("session mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn prune_idle(&self, now: DateTime<Utc>, max_idle: Duration) -> Result<usize, SessionError> {
        let mut guard = self.records.lock().expect("session mutex poisoned");
        let before = guard.len();
        guard.retain(|_, record| !record.is_idle(now, max_idle));
        Ok(before - guard.len())
    }
}

/// Load the environment configuration and apply command-line overrides on top.
pub(crate) fn load_config(sources: SourceArgs) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(path) = sources.catalog {
        config.dashboard.catalog_path = path;
    }
    if let Some(raw) = sources.gateway_url {
        config.gateway.base_url = GatewayConfig::parse_base_url(&raw)?;
    }
    Ok(config)
}

pub(crate) fn parse_client_id(raw: &str) -> Result<ClientId, String> {
    let value = raw
        .trim()
        .parse::<i64>()
        .map_err(|err| format!("'{raw}' is not an integer ({err})"))?;
    u64::try_from(value)
        .ok()
        .and_then(ClientId::new)
        .ok_or_else(|| format!("client identifier must be at least {}", ClientId::MIN))
}
