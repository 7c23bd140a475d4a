use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::catalog::{Catalog, ClientId, ClientInfo};
use crate::dashboard::{dashboard_router, DashboardService};
use crate::gateway::{GatewayError, PredictionOutcome, PredictionResult, ScoringGateway};
use crate::selection::{SessionError, SessionId, SessionRecord, SessionStore};

pub(super) const CATALOG_CSV: &str = "num__SK_ID_CURR,income,credit,contract\n\
100,50000,20000,Cash loans\n\
200,80000,30000,Revolving loans\n";

pub(super) fn catalog() -> Arc<Catalog> {
    Arc::new(
        Catalog::from_reader(Cursor::new(CATALOG_CSV), "num__SK_ID_CURR")
            .expect("catalog parses"),
    )
}

pub(super) fn client(raw: u64) -> ClientId {
    ClientId::new(raw).expect("positive id")
}

pub(super) fn scored(raw: u64, prediction: i64, probability: f64) -> PredictionOutcome {
    Ok(PredictionResult {
        client_id: client(raw),
        prediction,
        prediction_proba: probability,
    })
}

/// Gateway returning a canned outcome and recording every requested identifier.
pub(super) struct StubGateway {
    outcome: PredictionOutcome,
    calls: Mutex<Vec<ClientId>>,
    info_calls: AtomicUsize,
}

impl StubGateway {
    pub(super) fn new(outcome: PredictionOutcome) -> Self {
        Self {
            outcome,
            calls: Mutex::new(Vec::new()),
            info_calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> Vec<ClientId> {
        self.calls.lock().expect("gateway mutex poisoned").clone()
    }

    pub(super) fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }
}

impl ScoringGateway for StubGateway {
    fn predict(&self, client_id: ClientId) -> PredictionOutcome {
        self.calls
            .lock()
            .expect("gateway mutex poisoned")
            .push(client_id);
        self.outcome.clone()
    }

    fn get_client_info(&self, client_id: ClientId) -> Result<ClientInfo, GatewayError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ClientInfo {
            client_id,
            rows: Vec::new(),
        })
    }
}

#[derive(Default, Clone)]
pub(super) struct MemorySessions {
    pub(super) records: Arc<Mutex<HashMap<SessionId, SessionRecord>>>,
}

impl MemorySessions {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("session mutex poisoned").len()
    }
}

impl SessionStore for MemorySessions {
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
        guard.insert(record.id, record);
        Ok(())
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

pub(super) struct UnavailableSessions;

impl SessionStore for UnavailableSessions {
    fn insert(&self, _record: SessionRecord) -> Result<SessionRecord, SessionError> {
        Err(SessionError::Unavailable("store offline".to_string()))
    }

    fn save(&self, _record: SessionRecord) -> Result<(), SessionError> {
        Err(SessionError::Unavailable("store offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<SessionRecord>, SessionError> {
        Err(SessionError::Unavailable("store offline".to_string()))
    }

    fn prune_idle(&self, _now: DateTime<Utc>, _max_idle: Duration) -> Result<usize, SessionError> {
        Err(SessionError::Unavailable("store offline".to_string()))
    }
}

pub(super) fn build_service(
    outcome: PredictionOutcome,
) -> (
    DashboardService<StubGateway, MemorySessions>,
    Arc<StubGateway>,
    Arc<MemorySessions>,
) {
    let gateway = Arc::new(StubGateway::new(outcome));
    let sessions = Arc::new(MemorySessions::default());
    let service = DashboardService::new(
        catalog(),
        gateway.clone(),
        sessions.clone(),
        Duration::minutes(60),
    );
    (service, gateway, sessions)
}

pub(super) fn dashboard_router_with_service(
    service: DashboardService<StubGateway, MemorySessions>,
) -> axum::Router {
    dashboard_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
