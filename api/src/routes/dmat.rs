//! DMAT Account Endpoints
//!
//! `renewalStatus`는 요청 값이 그대로 저장된다 (만료일로 재계산하지 않음).

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
use crate::types::{DmatAccount, DmatAccountInput, ListQuery, Paginated};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_accounts).post(create_account))
        .route("/:id", get(get_account).put(update_account).delete(delete_account))
}

/// GET /api/dmat?page&limit
pub async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<DmatAccount>>, ApiError> {
    let page = list_documents(state.store.dmat_accounts(), ListFilter::All, query.page_request()).await?;
    Ok(Json(page))
}

/// GET /api/dmat/:id
pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DmatAccount>, ApiError> {
    Ok(Json(fetch_document(state.store.dmat_accounts(), &id).await?))
}

/// POST /api/dmat
pub async fn create_account(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<DmatAccountInput>,
) -> Result<(StatusCode, Json<DmatAccount>), ApiError> {
    create_document(state.store.dmat_accounts(), |id, created_at, now| {
        input.into_account(id, created_at, now)
    })
    .await
}

/// PUT /api/dmat/:id
pub async fn update_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<DmatAccountInput>,
) -> Result<Json<DmatAccount>, ApiError> {
    let account = replace_document(state.store.dmat_accounts(), &id, |id, created_at, now| {
        input.into_account(id, created_at, now)
    })
    .await?;
    Ok(Json(account))
}

/// DELETE /api/dmat/:id
pub async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    delete_document(state.store.dmat_accounts(), &id).await
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_crud_cycle() {
        let app = TestApp::new();
        let (status, created) = app
            .post(
                "/api/dmat",
                json!({
                    "accountNumber": "IN30021411",
                    "holderName": "Meera Shah",
                    "expiryDate": "2025-06-30",
                    "renewalStatus": "Expiring"
                }),
            )
            .await;
        assert_eq!(status, 201);
        assert_eq!(created["renewalStatus"], "Expiring");
        let uri = format!("/api/dmat/{}", created["_id"].as_str().unwrap());

        let mut body = created.clone();
        body["holderName"] = json!("Meera R. Shah");
        let (status, updated) = app.put(&uri, body).await;
        assert_eq!(status, 200);
        assert_eq!(updated["holderName"], "Meera R. Shah");
        assert_eq!(updated["expiryDate"], created["expiryDate"]);

        let (_, listed) = app.get("/api/dmat").await;
        assert_eq!(listed["total"], 1);
        assert_eq!(listed["limit"], 20);

        let (status, _) = app.delete(&uri).await;
        assert_eq!(status, 200);
        let (_, listed) = app.get("/api/dmat").await;
        assert_eq!(listed["total"], 0);
    }

    #[tokio::test]
    async fn test_missing_expiry_is_400() {
        let app = TestApp::new();
        let (status, body) = app
            .post("/api/dmat", json!({ "accountNumber": "X", "holderName": "Y" }))
            .await;

        assert_eq!(status, 400);
        assert_eq!(
            body["error"],
            "DmatAccount validation failed: expiryDate: Path `expiryDate` is required."
        );
    }
}
