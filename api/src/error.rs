//! Error Handling Module
//!
//! Provides type-safe error handling with proper HTTP status code mapping.
//! Uses thiserror for domain errors and integrates with tracing for structured logging.
//!
//! Every error body has the same shape: `{ "error": "<message>" }`.
//! Validation failures carry the raw schema message; there is no error-code taxonomy.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::db::StoreError;
use crate::types::ValidationError;

/// API 에러 타입
///
/// # Design Decision
///
/// 각 에러 variant는 적절한 HTTP 상태 코드에 매핑됨
/// - 검증 실패/잘못된 body: 400
/// - 문서 없음: 404 (고정 메시지)
/// - DB 미연결: 503 (모든 데이터 라우트 공통)
///
/// 민감한 내부 정보는 클라이언트에 노출하지 않음
#[derive(Debug, Error)]
pub enum ApiError {
    // ============ 400 Bad Request ============
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    ValidationError(String),

    // ============ 404 Not Found ============
    #[error("Not found")]
    NotFound,

    // ============ 500 Internal Server Error ============
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    InternalError,

    // ============ 503 Service Unavailable ============
    #[error("Database not connected")]
    ServiceUnavailable,
}

/// API 에러 응답 구조
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::DatabaseError(_) | ApiError::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            // 4xx 클라이언트 에러: 원문 메시지 그대로
            ApiError::BadRequest(msg) | ApiError::ValidationError(msg) => msg.clone(),
            ApiError::NotFound | ApiError::ServiceUnavailable => self.to_string(),

            // 5xx 서버 에러: 상세 정보는 로그에만
            ApiError::DatabaseError(_) => {
                tracing::error!("Database error: {:?}", self);
                "Database error occurred".to_string()
            }
            ApiError::InternalError => {
                tracing::error!("Internal error: {:?}", self);
                "An internal error occurred".to_string()
            }
        };

        (self.status(), Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable => ApiError::ServiceUnavailable,
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

/// 잘못된 JSON body → 400 `{error}`
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// anyhow 에러를 ApiError로 변환
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("Anyhow error: {:?}", err);
        ApiError::InternalError
    }
}
