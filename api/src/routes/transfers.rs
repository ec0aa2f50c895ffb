//! Transfer Endpoints

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
use crate::types::{ListQuery, Paginated, Transfer, TransferInput};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transfers).post(create_transfer))
        .route("/:id", get(get_transfer).put(update_transfer).delete(delete_transfer))
}

/// GET /api/transfers?page&limit
pub async fn list_transfers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<Transfer>>, ApiError> {
    let page = list_documents(state.store.transfers(), ListFilter::All, query.page_request()).await?;
    Ok(Json(page))
}

/// GET /api/transfers/:id
pub async fn get_transfer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Transfer>, ApiError> {
    Ok(Json(fetch_document(state.store.transfers(), &id).await?))
}

/// POST /api/transfers
///
/// `transferDate`가 없으면 현재 시각
pub async fn create_transfer(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<TransferInput>,
) -> Result<(StatusCode, Json<Transfer>), ApiError> {
    create_document(state.store.transfers(), |id, created_at, now| {
        input.into_transfer(id, created_at, now)
    })
    .await
}

/// PUT /api/transfers/:id
pub async fn update_transfer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<TransferInput>,
) -> Result<Json<Transfer>, ApiError> {
    let transfer = replace_document(state.store.transfers(), &id, |id, created_at, now| {
        input.into_transfer(id, created_at, now)
    })
    .await?;
    Ok(Json(transfer))
}

/// DELETE /api/transfers/:id
pub async fn delete_transfer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    delete_document(state.store.transfers(), &id).await
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_create_defaults_status_and_date() {
        let app = TestApp::new();
        let (status, transfer) = app
            .post(
                "/api/transfers",
                json!({ "company": "INFY", "personName": "Asha", "movedToIPF": false }),
            )
            .await;

        assert_eq!(status, 201);
        assert_eq!(transfer["status"], "Initiated");
        assert!(transfer["transferDate"].is_string());
        assert_eq!(transfer["movedToIPF"], false);
    }

    #[tokio::test]
    async fn test_update_status_to_in_process() {
        let app = TestApp::new();
        let (_, transfer) = app.post("/api/transfers", json!({ "company": "TCS" })).await;
        let uri = format!("/api/transfers/{}", transfer["_id"].as_str().unwrap());

        let mut body = transfer.clone();
        body["status"] = json!("In-Process");
        let (status, updated) = app.put(&uri, body).await;

        assert_eq!(status, 200);
        assert_eq!(updated["status"], "In-Process");
        assert_eq!(updated["transferDate"], transfer["transferDate"]);
    }

    #[tokio::test]
    async fn test_missing_company_is_400() {
        let app = TestApp::new();
        let (status, body) = app.post("/api/transfers", json!({})).await;
        assert_eq!(status, 400);
        assert_eq!(
            body["error"],
            "Transfer validation failed: company: Path `company` is required."
        );
    }
}
