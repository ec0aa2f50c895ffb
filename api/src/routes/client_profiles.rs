//! Client Profile Endpoints
//!
//! # Interview Q&A
//!
//! Q: holding 추가/수정/삭제/리뷰 엔드포인트가 없는 이유는?
//! A: 프로필 문서가 holdings 배열을 포함하는 단일 집합체
//!    - 클라이언트가 전체 프로필을 PUT (배열 통째 교체)
//!    - 서버는 정규화 + 검증만 수행
//!    - 동시 PUT은 마지막 쓰기가 이긴다
//!
//! Q: 검색은 어떻게 동작하는가?
//! A: `q`가 name1 / panNumber / 레거시 companyName에 부분 일치 (대소문자 무시)
//!    - 리터럴 매칭 (정규식/LIKE 메타문자 이스케이프)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::{
    create_document, delete_document, fetch_document, list_documents, replace_document, ApiJson,
    DeleteResponse,
};
use crate::db::ListFilter;
use crate::error::ApiError;
use crate::types::{ClientProfile, ClientProfileInput, ListQuery, Paginated};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_profiles).post(create_profile))
        .route("/:id", get(get_profile).put(update_profile).delete(delete_profile))
}

/// GET /api/client-profiles?page&limit&q
pub async fn list_profiles(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<ClientProfile>>, ApiError> {
    let filter = ListFilter::text(query.text());
    let page = list_documents(state.store.client_profiles(), filter, query.page_request()).await?;
    Ok(Json(page))
}

/// GET /api/client-profiles/:id
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClientProfile>, ApiError> {
    let profile = fetch_document(state.store.client_profiles(), &id).await?;
    Ok(Json(profile))
}

/// POST /api/client-profiles
pub async fn create_profile(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ClientProfileInput>,
) -> Result<(StatusCode, Json<ClientProfile>), ApiError> {
    create_document(state.store.client_profiles(), |id, created_at, now| {
        input.into_profile(id, created_at, now)
    })
    .await
}

/// PUT /api/client-profiles/:id
///
/// 전체 문서 교체. body에 없는 holding은 삭제된다.
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ClientProfileInput>,
) -> Result<Json<ClientProfile>, ApiError> {
    let profile = replace_document(state.store.client_profiles(), &id, |id, created_at, now| {
        input.into_profile(id, created_at, now)
    })
    .await?;
    Ok(Json(profile))
}

/// DELETE /api/client-profiles/:id
pub async fn delete_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    delete_document(state.store.client_profiles(), &id).await
}
