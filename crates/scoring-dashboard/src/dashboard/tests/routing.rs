use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::dashboard::router::predict_handler;
use crate::dashboard::PredictRequest;
use crate::gateway::GatewayError;

async fn open_session(router: &axum::Router) -> String {
    let response = router
        .clone()
        .oneshot(
            Request::post("/api/v1/sessions")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    payload
        .get("session_id")
        .and_then(Value::as_str)
        .expect("session id returned")
        .to_string()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request builds")
}

#[tokio::test]
async fn view_route_renders_selected_client() {
    let (service, _, _) = build_service(scored(100, 1, 0.9));
    let router = dashboard_router_with_service(service);
    let session = open_session(&router).await;

    let response = router
        .clone()
        .oneshot(
            Request::get(format!(
                "/api/v1/sessions/{session}/view?feature_x=income&feature_y=credit&correlation_feature=income"
            ))
            .body(Body::empty())
            .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let client_id = payload["selection"]["client_id"]
        .as_u64()
        .expect("client id present");
    assert!(client_id == 100 || client_id == 200);
    assert_eq!(payload["feature_chart"]["status"], json!("chart"));
    assert_eq!(payload["feature_chart"]["chart"]["kind"], json!("scatter"));
    assert_eq!(payload["correlation"]["heatmap"]["emphasized"], json!(0));
    assert!(payload.get("prediction").is_none());
}

#[tokio::test]
async fn selection_route_rejects_zero() {
    let (service, _, _) = build_service(scored(100, 1, 0.9));
    let router = dashboard_router_with_service(service);
    let session = open_session(&router).await;

    let response = router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/sessions/{session}/selection"),
            json!({ "client_id": 0 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("at least 1"));
}

#[tokio::test]
async fn predict_route_returns_view_with_gateway_error_inline() {
    let (service, _, _) = build_service(Err(GatewayError::Server {
        status: 400,
        message: "Invalid client ID".to_string(),
    }));
    let router = dashboard_router_with_service(service);
    let session = open_session(&router).await;

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/sessions/{session}/predict"),
            json!({ "client_id": 100, "feature_x": "contract", "feature_y": "income" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["prediction"]["status"], json!("failed"));
    assert_eq!(payload["prediction"]["message"], json!("Invalid client ID"));
    assert_eq!(
        payload["feature_chart"]["chart"]["kind"],
        json!("distribution")
    );
    assert_eq!(
        payload["feature_chart"]["chart"]["highlight"]["category"],
        json!("Cash loans")
    );
}

#[tokio::test]
async fn predict_handler_reports_granted_prediction() {
    let (service, gateway, _) = build_service(scored(200, 1, 0.66));
    let service = Arc::new(service);
    let session = service.open_session().expect("session opens");

    let response = predict_handler(
        State(service.clone()),
        Path(session.to_string()),
        axum::Json(PredictRequest {
            client_id: Some(200),
            ..PredictRequest::default()
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["prediction"]["status"], json!("scored"));
    assert_eq!(payload["prediction"]["label"], json!("accordé"));
    assert_eq!(payload["prediction"]["probability_display"], json!("0.6600"));
    assert_eq!(gateway.calls(), vec![client(200)]);
}

#[tokio::test]
async fn unknown_or_malformed_sessions_return_not_found() {
    let (service, _, _) = build_service(scored(100, 1, 0.9));
    let router = dashboard_router_with_service(service);

    for session in ["not-a-uuid", "7f1d2a4e-9c3b-4e7a-8d2f-0b5c6a7e8f90"] {
        let response = router
            .clone()
            .oneshot(
                Request::post(format!("/api/v1/sessions/{session}/redraw"))
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
