//! Shareholder Endpoints
//!
//! 목록/단건 조회 시 `linkedDmatAccount`를 계좌 문서로 확장한다.
//! 참조된 계좌가 삭제된 경우 `null`로 응답한다.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use super::{
    create_document, delete_document, fetch_document, list_documents, replace_document, ApiJson,
    DeleteResponse,
};
use crate::db::{DocumentRepository, ListFilter};
use crate::error::ApiError;
use crate::types::{
    DmatAccount, ListQuery, Paginated, PersonType, Shareholder, ShareholderInput, ShareholderView,
};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_shareholders).post(create_shareholder))
        .route(
            "/:id",
            get(get_shareholder).put(update_shareholder).delete(delete_shareholder),
        )
}

/// 연결된 DMAT 계좌를 한 번의 조회로 가져옴
async fn linked_accounts(
    accounts: &dyn DocumentRepository<DmatAccount>,
    holders: &[Shareholder],
) -> Result<HashMap<Uuid, DmatAccount>, ApiError> {
    let mut ids: Vec<Uuid> = holders.iter().filter_map(|h| h.linked_dmat_account).collect();
    ids.sort_unstable();
    ids.dedup();

    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(accounts.find_many(&ids).await?.into_iter().map(|a| (a.id, a)).collect())
}

/// GET /api/shareholders?page&limit&type
pub async fn list_shareholders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<ShareholderView>>, ApiError> {
    let page = query.page_request();

    let filter = match query.kind.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        None => ListFilter::All,
        Some(raw) => match raw.parse::<PersonType>() {
            Ok(kind) => ListFilter::kind(Some(kind)),
            // 알 수 없는 유형은 어떤 문서와도 일치하지 않음
            Err(_) => {
                return Ok(Json(Paginated {
                    data: Vec::new(),
                    page: page.page,
                    limit: page.limit,
                    total: 0,
                }))
            }
        },
    };

    let listed = list_documents(state.store.shareholders(), filter, page).await?;
    let linked = linked_accounts(state.store.dmat_accounts(), &listed.data).await?;

    Ok(Json(listed.map(|h| {
        let account = h.linked_dmat_account.and_then(|id| linked.get(&id).cloned());
        ShareholderView::expand(h, account)
    })))
}

/// GET /api/shareholders/:id
pub async fn get_shareholder(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ShareholderView>, ApiError> {
    let holder = fetch_document(state.store.shareholders(), &id).await?;
    let account = match holder.linked_dmat_account {
        Some(account_id) => state.store.dmat_accounts().find(account_id).await?,
        None => None,
    };
    Ok(Json(ShareholderView::expand(holder, account)))
}

/// POST /api/shareholders
pub async fn create_shareholder(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ShareholderInput>,
) -> Result<(StatusCode, Json<Shareholder>), ApiError> {
    create_document(state.store.shareholders(), |id, created_at, now| {
        input.into_shareholder(id, created_at, now)
    })
    .await
}

/// PUT /api/shareholders/:id
pub async fn update_shareholder(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ShareholderInput>,
) -> Result<Json<Shareholder>, ApiError> {
    let holder = replace_document(state.store.shareholders(), &id, |id, created_at, now| {
        input.into_shareholder(id, created_at, now)
    })
    .await?;
    Ok(Json(holder))
}

/// DELETE /api/shareholders/:id
pub async fn delete_shareholder(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    delete_document(state.store.shareholders(), &id).await
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::routes::test_support::TestApp;

    async fn create_account(app: &TestApp, number: &str) -> String {
        let (status, account) = app
            .post(
                "/api/dmat",
                json!({
                    "accountNumber": number,
                    "holderName": "Holder",
                    "expiryDate": "2030-01-01"
                }),
            )
            .await;
        assert_eq!(status, 201);
        account["_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_create_normalises_email_and_pan() {
        let app = TestApp::new();
        let (status, holder) = app
            .post(
                "/api/shareholders",
                json!({
                    "name": " Ravi Kumar ",
                    "email": "Ravi@Example.COM",
                    "phone": "9876543210",
                    "pan": "abcde1234f",
                    "type": "Shareholder"
                }),
            )
            .await;

        assert_eq!(status, 201);
        assert_eq!(holder["name"], "Ravi Kumar");
        assert_eq!(holder["email"], "ravi@example.com");
        assert_eq!(holder["pan"], "ABCDE1234F");
        assert_eq!(holder["type"], "Shareholder");
    }

    #[tokio::test]
    async fn test_list_expands_linked_account_and_filters_by_type() {
        let app = TestApp::new();
        let account_id = create_account(&app, "IN30012345").await;

        app.post(
            "/api/shareholders",
            json!({
                "name": "Linked Holder",
                "email": "a@x.com",
                "phone": "1",
                "pan": "AAAAA1111A",
                "type": "Shareholder",
                "linkedDmatAccount": account_id
            }),
        )
        .await;
        app.post(
            "/api/shareholders",
            json!({
                "name": "Some Stockholder",
                "email": "b@x.com",
                "phone": "2",
                "pan": "BBBBB2222B",
                "type": "Stockholder"
            }),
        )
        .await;

        let (status, all) = app.get("/api/shareholders").await;
        assert_eq!(status, 200);
        assert_eq!(all["total"], 2);

        let (_, clients) = app.get("/api/shareholders?type=Shareholder").await;
        assert_eq!(clients["total"], 1);
        let linked = &clients["data"][0]["linkedDmatAccount"];
        assert_eq!(linked["_id"], account_id.as_str());
        assert_eq!(linked["accountNumber"], "IN30012345");

        let (_, unknown) = app.get("/api/shareholders?type=Alien").await;
        assert_eq!(unknown["total"], 0);
    }

    #[tokio::test]
    async fn test_get_returns_null_for_dangling_account() {
        let app = TestApp::new();
        let account_id = create_account(&app, "IN300999").await;
        let (_, holder) = app
            .post(
                "/api/shareholders",
                json!({
                    "name": "Dangling",
                    "email": "d@x.com",
                    "phone": "3",
                    "pan": "CCCCC3333C",
                    "type": "Stockholder",
                    "linkedDmatAccount": account_id
                }),
            )
            .await;
        app.delete(&format!("/api/dmat/{}", account_id)).await;

        let (status, view) = app
            .get(&format!("/api/shareholders/{}", holder["_id"].as_str().unwrap()))
            .await;
        assert_eq!(status, 200);
        assert!(view["linkedDmatAccount"].is_null());
    }

    #[tokio::test]
    async fn test_put_accepts_expanded_account_from_get() {
        let app = TestApp::new();
        let account_id = create_account(&app, "IN300555").await;
        let (_, holder) = app
            .post(
                "/api/shareholders",
                json!({
                    "name": "Round Trip",
                    "email": "r@x.com",
                    "phone": "4",
                    "pan": "DDDDD4444D",
                    "type": "Shareholder",
                    "linkedDmatAccount": account_id
                }),
            )
            .await;
        let uri = format!("/api/shareholders/{}", holder["_id"].as_str().unwrap());

        let (_, mut view) = app.get(&uri).await;
        view["phone"] = json!("5");
        let (status, updated) = app.put(&uri, view).await;

        assert_eq!(status, 200);
        assert_eq!(updated["phone"], "5");
        assert_eq!(updated["linkedDmatAccount"], account_id.as_str());
    }

    #[tokio::test]
    async fn test_missing_type_is_rejected() {
        let app = TestApp::new();
        let (status, body) = app
            .post(
                "/api/shareholders",
                json!({ "name": "N", "email": "e@x.com", "phone": "1", "pan": "P" }),
            )
            .await;

        assert_eq!(status, 400);
        assert!(body["error"].as_str().unwrap().contains("Path `type` is required."));
    }
}
