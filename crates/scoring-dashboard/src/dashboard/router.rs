use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use tracing::error;

use super::service::{DashboardService, DashboardServiceError, PredictRequest, SelectionRequest};
use super::view::ViewQuery;
use crate::gateway::ScoringGateway;
use crate::selection::{SessionError, SessionId, SessionStore};

/// Router builder exposing the dashboard session endpoints.
pub fn dashboard_router<G, S>(service: Arc<DashboardService<G, S>>) -> Router
where
    G: ScoringGateway + 'static,
    S: SessionStore + 'static,
{
    Router::new()
        .route("/api/v1/sessions", post(open_session_handler::<G, S>))
        .route(
            "/api/v1/sessions/:session_id/view",
            get(view_handler::<G, S>),
        )
        .route(
            "/api/v1/sessions/:session_id/redraw",
            post(redraw_handler::<G, S>),
        )
        .route(
            "/api/v1/sessions/:session_id/selection",
            put(selection_handler::<G, S>),
        )
        .route(
            "/api/v1/sessions/:session_id/predict",
            post(predict_handler::<G, S>),
        )
        .with_state(service)
}

pub(crate) async fn open_session_handler<G, S>(
    State(service): State<Arc<DashboardService<G, S>>>,
) -> Response
where
    G: ScoringGateway + 'static,
    S: SessionStore + 'static,
{
    match service.open_session() {
        Ok(session_id) => (
            StatusCode::CREATED,
            Json(json!({ "session_id": session_id })),
        )
            .into_response(),
        Err(other) => service_error_response(other),
    }
}

pub(crate) async fn view_handler<G, S>(
    State(service): State<Arc<DashboardService<G, S>>>,
    Path(session_id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Response
where
    G: ScoringGateway + 'static,
    S: SessionStore + 'static,
{
    let Some(session) = SessionId::parse(&session_id) else {
        return unknown_session_response(&session_id);
    };
    match service.view(&session, &query) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(other) => service_error_response(other),
    }
}

pub(crate) async fn redraw_handler<G, S>(
    State(service): State<Arc<DashboardService<G, S>>>,
    Path(session_id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Response
where
    G: ScoringGateway + 'static,
    S: SessionStore + 'static,
{
    let Some(session) = SessionId::parse(&session_id) else {
        return unknown_session_response(&session_id);
    };
    match service.redraw(&session, &query) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(other) => service_error_response(other),
    }
}

pub(crate) async fn selection_handler<G, S>(
    State(service): State<Arc<DashboardService<G, S>>>,
    Path(session_id): Path<String>,
    Json(request): Json<SelectionRequest>,
) -> Response
where
    G: ScoringGateway + 'static,
    S: SessionStore + 'static,
{
    let Some(session) = SessionId::parse(&session_id) else {
        return unknown_session_response(&session_id);
    };
    match service.submit(&session, &request) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(other) => service_error_response(other),
    }
}

/// The gateway call blocks, so it runs on the blocking pool while this session waits.
pub(crate) async fn predict_handler<G, S>(
    State(service): State<Arc<DashboardService<G, S>>>,
    Path(session_id): Path<String>,
    Json(request): Json<PredictRequest>,
) -> Response
where
    G: ScoringGateway + 'static,
    S: SessionStore + 'static,
{
    let Some(session) = SessionId::parse(&session_id) else {
        return unknown_session_response(&session_id);
    };
    let result =
        tokio::task::spawn_blocking(move || service.predict(&session, &request)).await;
    match result {
        Ok(Ok(view)) => (StatusCode::OK, Json(view)).into_response(),
        Ok(Err(other)) => service_error_response(other),
        Err(join_error) => {
            error!(error = %join_error, "prediction task failed");
            let payload = json!({
                "error": "prediction task failed",
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

fn unknown_session_response(raw: &str) -> Response {
    let payload = json!({
        "error": format!("session '{raw}' not found"),
    });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}

fn service_error_response(error: DashboardServiceError) -> Response {
    let status = match &error {
        DashboardServiceError::Session(SessionError::NotFound) => StatusCode::NOT_FOUND,
        DashboardServiceError::Selection(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DashboardServiceError::Session(SessionError::Conflict) => StatusCode::CONFLICT,
        DashboardServiceError::Session(SessionError::Unavailable(_)) => {
            error!(%error, "session store unavailable");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}
