//! Demo Store Endpoints
//!
//! DB와 무관하게 동작하는 데모 상태 조회/변경 및 리포트 계산.
//! readiness 게이트 밖에 있으므로 DB가 없어도 응답한다.
//!
//! # Routes
//! - `GET  /api/demo/state` - 전체 상태
//! - `POST /api/demo/actions` - `{type, payload}` 액션 적용
//! - `GET  /api/demo/dashboard` - 대시보드 요약
//! - `POST /api/demo/transfers` - 이전 기록 추가
//! - `POST /api/demo/report` - 배당/보너스 리포트
//! - `POST /api/demo/ipf` - IPF 이전 요약

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};

use super::ApiJson;
use crate::error::ApiError;
use crate::services::demo_store::{DashboardSummary, DemoTransfer, TransferDraft};
use crate::services::{
    calculate_ipf_details, calculate_report, DemoAction, DemoState, IpfDetails, IpfInput,
    ReportInput, ReportOutput,
};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/state", get(get_state))
        .route("/actions", post(dispatch_action))
        .route("/dashboard", get(dashboard))
        .route("/transfers", post(log_transfer))
        .route("/report", post(report))
        .route("/ipf", post(ipf_details))
}

/// GET /api/demo/state
pub async fn get_state(State(state): State<AppState>) -> Json<DemoState> {
    let demo = state.demo.lock().await;
    Json(demo.state().clone())
}

/// POST /api/demo/actions
pub async fn dispatch_action(
    State(state): State<AppState>,
    ApiJson(action): ApiJson<DemoAction>,
) -> Result<Json<DemoState>, ApiError> {
    let mut demo = state.demo.lock().await;
    let next = demo.dispatch(action)?.clone();
    Ok(Json(next))
}

/// GET /api/demo/dashboard
pub async fn dashboard(State(state): State<AppState>) -> Json<DashboardSummary> {
    let demo = state.demo.lock().await;
    Json(demo.dashboard(Utc::now()))
}

/// POST /api/demo/transfers
///
/// 대상 사람이 없으면 404
pub async fn log_transfer(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<TransferDraft>,
) -> Result<(StatusCode, Json<DemoTransfer>), ApiError> {
    let mut rng = StdRng::from_entropy();
    let mut demo = state.demo.lock().await;
    let transfer = demo
        .log_transfer(draft, Utc::now(), &mut rng)?
        .ok_or(ApiError::NotFound)?;
    Ok((StatusCode::CREATED, Json(transfer)))
}

/// POST /api/demo/report
pub async fn report(ApiJson(input): ApiJson<ReportInput>) -> Json<ReportOutput> {
    Json(calculate_report(&input))
}

/// POST /api/demo/ipf
pub async fn ipf_details(ApiJson(input): ApiJson<IpfInput>) -> Json<IpfDetails> {
    Json(calculate_ipf_details(&input))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_actions_round_trip_through_state() {
        let app = TestApp::new();

        let (status, state) = app
            .post(
                "/api/demo/actions",
                json!({
                    "type": "UPSERT_PERSON",
                    "payload": {
                        "id": "p_test001",
                        "type": "Shareholder",
                        "name": "Test Person",
                        "email": "t@example.com",
                        "phone": "9800000001",
                        "pan": "ABCDE0001F"
                    }
                }),
            )
            .await;
        assert_eq!(status, 200);
        assert_eq!(state["people"][0]["name"], "Test Person");

        let (_, state) = app.get("/api/demo/state").await;
        assert_eq!(state["people"].as_array().unwrap().len(), 1);

        let (_, state) = app
            .post("/api/demo/actions", json!({ "type": "DELETE_PERSON", "payload": "p_test001" }))
            .await;
        assert_eq!(state["people"], json!([]));
    }

    #[tokio::test]
    async fn test_unknown_action_is_400() {
        let app = TestApp::new();
        let (status, _) = app.post("/api/demo/actions", json!({ "type": "EXPLODE" })).await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn test_log_transfer_requires_known_person() {
        let app = TestApp::new();
        let (status, _) = app
            .post("/api/demo/transfers", json!({ "personId": "p_missing", "company": "INFY" }))
            .await;
        assert_eq!(status, 404);

        app.post(
            "/api/demo/actions",
            json!({
                "type": "UPSERT_PERSON",
                "payload": {
                    "id": "p_known01",
                    "type": "Stockholder",
                    "name": "Known",
                    "email": "k@example.com",
                    "phone": "9800000002",
                    "pan": "ABCDE0002F"
                }
            }),
        )
        .await;

        let (status, transfer) = app
            .post(
                "/api/demo/transfers",
                json!({ "personId": "p_known01", "company": "WIPRO", "movedToIPF": true }),
            )
            .await;
        assert_eq!(status, 201);
        assert_eq!(transfer["personName"], "Known");
        assert_eq!(transfer["personType"], "Stockholder");
        assert!(transfer["dividendsReceived"].is_number());

        let (_, dashboard) = app.get("/api/demo/dashboard").await;
        assert_eq!(dashboard["transfers"], 1);
    }

    #[tokio::test]
    async fn test_report_endpoint() {
        let app = TestApp::new();
        let (status, body) = app
            .post("/api/demo/report", json!({ "symbol": "INFY", "quantity": 100, "buyAmount": 1000 }))
            .await;

        assert_eq!(status, 200);
        assert_eq!(body["expectedDividends"], 250.0);
        assert_eq!(body["bonusAllocation"], 10.0);
        assert_eq!(body["remainingDues"], 750.0);
    }

    #[tokio::test]
    async fn test_demo_routes_ignore_store_readiness() {
        let app = TestApp::new();
        app.store.set_ready(false);
        let (status, _) = app.get("/api/demo/state").await;
        assert_eq!(status, 200);
    }
}
