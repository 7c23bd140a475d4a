use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::render::render;
use super::view::{DashboardView, ViewQuery};
use crate::catalog::{Catalog, ClientId};
use crate::gateway::ScoringGateway;
use crate::selection::{SelectionError, SessionError, SessionId, SessionRecord, SessionStore};

/// Body of the predict action: optionally enter a new identifier first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub client_id: Option<i64>,
    #[serde(flatten)]
    pub query: ViewQuery,
}

/// Body of the "enter a custom identifier" action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRequest {
    pub client_id: i64,
    #[serde(flatten)]
    pub query: ViewQuery,
}

/// Service composing the catalog, the scoring gateway, and per-session selection.
pub struct DashboardService<G, S> {
    catalog: Arc<Catalog>,
    gateway: Arc<G>,
    sessions: Arc<S>,
    session_idle: Duration,
}

impl<G, S> DashboardService<G, S>
where
    G: ScoringGateway + 'static,
    S: SessionStore + 'static,
{
    pub fn new(
        catalog: Arc<Catalog>,
        gateway: Arc<G>,
        sessions: Arc<S>,
        session_idle: Duration,
    ) -> Self {
        Self {
            catalog,
            gateway,
            sessions,
            session_idle,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Open a fresh session, pruning idle ones first. The selection is drawn on first view.
    pub fn open_session(&self) -> Result<SessionId, DashboardServiceError> {
        let now = Utc::now();
        let pruned = self.sessions.prune_idle(now, self.session_idle)?;
        let record = self.sessions.insert(SessionRecord::open(now))?;
        info!(session = %record.id, pruned, "dashboard session opened");
        Ok(record.id)
    }

    pub fn view(
        &self,
        session: &SessionId,
        query: &ViewQuery,
    ) -> Result<DashboardView, DashboardServiceError> {
        self.view_with_rng(session, query, &mut rand::rng())
    }

    pub fn view_with_rng<R: Rng + ?Sized>(
        &self,
        session: &SessionId,
        query: &ViewQuery,
        rng: &mut R,
    ) -> Result<DashboardView, DashboardServiceError> {
        let selected =
            self.with_session(session, |record| Ok(record.selection.current(&self.catalog, rng)))?;
        Ok(render(&self.catalog, selected, query, None))
    }

    pub fn redraw(
        &self,
        session: &SessionId,
        query: &ViewQuery,
    ) -> Result<DashboardView, DashboardServiceError> {
        self.redraw_with_rng(session, query, &mut rand::rng())
    }

    pub fn redraw_with_rng<R: Rng + ?Sized>(
        &self,
        session: &SessionId,
        query: &ViewQuery,
        rng: &mut R,
    ) -> Result<DashboardView, DashboardServiceError> {
        let selected =
            self.with_session(session, |record| Ok(record.selection.redraw(&self.catalog, rng)))?;
        info!(session = %session, client_id = %selected.client_id, "new client drawn");
        Ok(render(&self.catalog, selected, query, None))
    }

    pub fn submit(
        &self,
        session: &SessionId,
        request: &SelectionRequest,
    ) -> Result<DashboardView, DashboardServiceError> {
        let selected = self.with_session(session, |record| {
            Ok(record.selection.submit(request.client_id)?)
        })?;
        info!(session = %session, client_id = %selected.client_id, "client entered");
        Ok(render(&self.catalog, selected, &request.query, None))
    }

    /// Run the predict action: one blocking gateway round trip, rendered into the view.
    ///
    /// A gateway failure is part of the returned view; the selection is never touched after
    /// the call.
    pub fn predict(
        &self,
        session: &SessionId,
        request: &PredictRequest,
    ) -> Result<DashboardView, DashboardServiceError> {
        self.predict_with_rng(session, request, &mut rand::rng())
    }

    pub fn predict_with_rng<R: Rng + ?Sized>(
        &self,
        session: &SessionId,
        request: &PredictRequest,
        rng: &mut R,
    ) -> Result<DashboardView, DashboardServiceError> {
        let selected = self.with_session(session, |record| match request.client_id {
            Some(raw) => Ok(record.selection.submit(raw)?),
            None => Ok(record.selection.current(&self.catalog, rng)),
        })?;

        let outcome = self.gateway.predict(selected.client_id);
        match &outcome {
            Ok(result) => info!(
                session = %session,
                client_id = %selected.client_id,
                prediction = result.prediction,
                probability = result.prediction_proba,
                "prediction received"
            ),
            Err(error) => warn!(
                session = %session,
                client_id = %selected.client_id,
                %error,
                "prediction unavailable"
            ),
        }

        Ok(render(&self.catalog, selected, &request.query, Some(&outcome)))
    }

    /// Active identifier of a session, without drawing one.
    pub fn peek(&self, session: &SessionId) -> Result<Option<ClientId>, DashboardServiceError> {
        let record = self
            .sessions
            .fetch(session)?
            .ok_or(SessionError::NotFound)?;
        Ok(record.selection.peek())
    }

    fn with_session<T>(
        &self,
        session: &SessionId,
        action: impl FnOnce(&mut SessionRecord) -> Result<T, DashboardServiceError>,
    ) -> Result<T, DashboardServiceError> {
        let mut record = self
            .sessions
            .fetch(session)?
            .ok_or(SessionError::NotFound)?;
        let value = action(&mut record)?;
        record.touch(Utc::now());
        self.sessions.save(record)?;
        Ok(value)
    }
}

/// Error raised by the dashboard service.
#[derive(Debug, thiserror::Error)]
pub enum DashboardServiceError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
}
