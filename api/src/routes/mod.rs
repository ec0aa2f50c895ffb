//! API Routes Module
//!
//! 모든 HTTP 엔드포인트 정의
//!
//! # Routes
//! - `/health` - 헬스 체크
//! - `/api/ping` - ping
//! - `/api/client-profiles/*` - Client Profile CRUD
//! - `/api/shareholders/*` - Shareholder CRUD (DMAT 확장 조회)
//! - `/api/dmat/*` - DMAT 계좌 CRUD
//! - `/api/transfers/*` - 이전 기록 CRUD
//! - `/api/demo/*` - 데모 상태/리포트 (DB 불필요)
//!
//! 데이터 라우트(`client-profiles`, `shareholders`, `dmat`, `transfers`)는
//! `require_database` 게이트 뒤에 있다.

pub mod client_profiles;
pub mod demo;
pub mod dmat;
pub mod health;
pub mod shareholders;
pub mod transfers;

use axum::{
    extract::{FromRequest, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::db::{Document, DocumentRepository, ListFilter};
use crate::types::{PageRequest, Paginated, ValidationError};
use crate::{error::ApiError, AppState, Config};

/// JSON body extractor: 파싱 실패도 `{error}` 400으로 응답
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// 삭제 응답 `{success: true}`
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// 라우터 생성
///
/// # Route Structure
///
/// ```text
/// GET    /health
/// GET    /api/ping
///
/// GET    /api/client-profiles?page&limit&q
/// GET    /api/client-profiles/:id
/// POST   /api/client-profiles
/// PUT    /api/client-profiles/:id      (전체 문서 교체)
/// DELETE /api/client-profiles/:id
///
/// (shareholders?type, dmat, transfers 동일 구조)
/// ```
pub fn create_router(state: AppState) -> Router {
    let data_routes = Router::new()
        .nest("/client-profiles", client_profiles::router())
        .nest("/shareholders", shareholders::router())
        .nest("/dmat", dmat::router())
        .nest("/transfers", transfers::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_database));

    let cors = cors_layer(&state.config);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/api/ping", get(health::ping))

        // Demo store (DB 불필요)
        .nest("/api/demo", demo::router())

        // DB 기반 리소스
        .nest("/api", data_routes)

        // 미들웨어
        .layer(TraceLayer::new_for_http())
        .layer(cors)

        // 상태 주입
        .with_state(state)
}

/// CORS 설정
///
/// 프로덕션에서는 `ALLOWED_ORIGINS`만 허용, 개발 환경에서는 localhost 허용
fn cors_layer(config: &Config) -> CorsLayer {
    if config.is_production() {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        CorsLayer::new()
            .allow_origin([
                HeaderValue::from_static("http://localhost:5173"), // Vite dev server
                HeaderValue::from_static("http://localhost:8080"),
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:5173"),
            ])
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// DB readiness 게이트: 연결 전이면 503 `{"error":"Database not connected"}`
pub async fn require_database(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.store.ensure_ready().await {
        return Err(ApiError::ServiceUnavailable);
    }
    Ok(next.run(request).await)
}

// ============ Shared CRUD Helpers ============

/// 경로 id 파싱. 형식이 틀리면 존재하지 않는 문서로 취급한다.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}

pub(crate) async fn list_documents<T: Document>(
    repo: &dyn DocumentRepository<T>,
    filter: ListFilter,
    page: PageRequest,
) -> Result<Paginated<T>, ApiError> {
    let (data, total) = repo.list(&filter, page).await?;
    Ok(Paginated {
        data,
        page: page.page,
        limit: page.limit,
        total,
    })
}

pub(crate) async fn fetch_document<T: Document>(
    repo: &dyn DocumentRepository<T>,
    raw_id: &str,
) -> Result<T, ApiError> {
    let id = parse_id(raw_id)?;
    repo.find(id).await?.ok_or(ApiError::NotFound)
}

/// 새 id/타임스탬프로 문서 생성 → 201
pub(crate) async fn create_document<T, F>(
    repo: &dyn DocumentRepository<T>,
    build: F,
) -> Result<(StatusCode, Json<T>), ApiError>
where
    T: Document,
    F: FnOnce(Uuid, DateTime<Utc>, DateTime<Utc>) -> Result<T, ValidationError>,
{
    let now = Utc::now();
    let doc = build(Uuid::new_v4(), now, now)?;
    repo.insert(&doc).await?;
    tracing::info!(collection = T::COLLECTION, id = %doc.id(), "created");
    Ok((StatusCode::CREATED, Json(doc)))
}

/// 전체 문서 교체. `_id`와 `createdAt`은 기존 값 유지.
///
/// 동시 요청은 마지막 쓰기가 이긴다 (병합 없음).
pub(crate) async fn replace_document<T, F>(
    repo: &dyn DocumentRepository<T>,
    raw_id: &str,
    build: F,
) -> Result<T, ApiError>
where
    T: Document,
    F: FnOnce(Uuid, DateTime<Utc>, DateTime<Utc>) -> Result<T, ValidationError>,
{
    let id = parse_id(raw_id)?;
    let existing = repo.find(id).await?.ok_or(ApiError::NotFound)?;
    let doc = build(id, existing.created_at(), Utc::now())?;
    if !repo.replace(&doc).await? {
        // 조회와 교체 사이에 삭제됨
        return Err(ApiError::NotFound);
    }
    tracing::info!(collection = T::COLLECTION, %id, "replaced");
    Ok(doc)
}

pub(crate) async fn delete_document<T: Document>(
    repo: &dyn DocumentRepository<T>,
    raw_id: &str,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = parse_id(raw_id)?;
    if !repo.delete(id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(collection = T::COLLECTION, %id, "deleted");
    Ok(Json(DeleteResponse { success: true }))
}

#[cfg(test)]
pub(crate) mod test_support {
    //! 라우터 테스트 공통 도구

    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::db::MemoryStore;
    use crate::services::{DemoStore, FilePersistence};
    use crate::{AppState, Config};

    pub struct TestApp {
        pub router: axum::Router,
        pub store: Arc<MemoryStore>,
        _dir: tempfile::TempDir,
    }

    impl TestApp {
        pub fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let config = Config::from_lookup(|_| None).unwrap();
            let demo = DemoStore::open(Box::new(FilePersistence::new(dir.path().join("demo.json"))));
            let store = Arc::new(MemoryStore::new());
            let state = AppState::new(store.clone(), demo, config);
            Self {
                router: super::create_router(state),
                store,
                _dir: dir,
            }
        }

        pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            let body = match body {
                Some(json) => {
                    builder = builder.header("content-type", "application/json");
                    Body::from(serde_json::to_vec(&json).unwrap())
                }
                None => Body::empty(),
            };

            let response = self
                .router
                .clone()
                .oneshot(builder.body(body).unwrap())
                .await
                .unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, value)
        }

        pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
            self.request(Method::GET, uri, None).await
        }

        pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            self.request(Method::POST, uri, Some(body)).await
        }

        pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            self.request(Method::PUT, uri, Some(body)).await
        }

        pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
            self.request(Method::DELETE, uri, None).await
        }
    }
}
