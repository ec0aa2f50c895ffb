//! Health Check Endpoint
//!
//! # Interview Q&A
//!
//! Q: Health check 엔드포인트는 왜 필요한가?
//! A: 로드밸런서/오케스트레이터가 인스턴스 상태를 판단하는 기준
//!
//! Q: DB가 끊겨 있어도 200을 주는 이유는?
//! A: 프로세스는 살아 있고 데모/리포트 라우트는 동작하기 때문
//!    - `status: "degraded"`로 구분
//!    - 데이터 라우트는 readiness 게이트가 503으로 막는다

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health check 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: DatabaseStatus,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseStatus {
    pub backend: String,
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub message: String,
}

/// GET /health
///
/// 서버 및 저장소 상태 확인
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // 저장소 연결 테스트
    let started = std::time::Instant::now();
    let connected = match state.store.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Health check failed: {:#}", e);
            false
        }
    };

    let database = DatabaseStatus {
        backend: state.store.backend().to_string(),
        connected,
        latency_ms: connected.then(|| started.elapsed().as_millis() as u64),
    };

    Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /api/ping
pub async fn ping(State(state): State<AppState>) -> Json<PingResponse> {
    Json(PingResponse {
        message: state.config.ping_message.clone(),
    })
}
