//! Registry HTTP Client
//!
//! # Overview
//!
//! 레지스트리 API를 호출하는 타입 지정 클라이언트.
//! holding 단위 연산은 서버에 엔드포인트가 없으므로 다음 순서로 수행한다.
//!
//! ```text
//! GET profile ──▶ services::holdings 로컬 변환 ──▶ PUT profile (전체 교체)
//!                        │
//!                        └── 실패 (없는 holding / 마지막 holding / 필수값 누락)
//!                            → 네트워크 쓰기 없이 중단
//! ```
//!
//! 재시도는 하지 않는다. 동시 편집은 마지막 PUT이 이긴다.

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::routes::DeleteResponse;
use crate::services::holdings::{self, HoldingError, ReviewUpdate, DEFAULT_REVIEWER};
use crate::types::{
    ClientProfile, ClientProfileInput, PageRequest, Paginated, PersonType, ShareHoldingInput,
    ShareholderView,
};

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Holding(#[from] HoldingError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: StatusCode, message: String },
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// API 리소스 경로
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    ClientProfiles,
    Shareholders,
    Dmat,
    Transfers,
}

impl Resource {
    pub fn path(&self) -> &'static str {
        match self {
            Resource::ClientProfiles => "/api/client-profiles",
            Resource::Shareholders => "/api/shareholders",
            Resource::Dmat => "/api/dmat",
            Resource::Transfers => "/api/transfers",
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct RegistryClient {
    http: Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    /// 요청 전송 후 2xx면 body 파싱, 아니면 `{error}` 메시지로 `Api` 에러
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.error)
                .unwrap_or(text);
            tracing::debug!(%status, %message, "registry request failed");
            return Err(ClientError::Api { status, message });
        }
        Ok(response.json().await?)
    }

    // ============ Generic Resource Calls ============

    pub async fn list<T: DeserializeOwned>(
        &self,
        resource: Resource,
        page: PageRequest,
        filters: &[(&str, &str)],
    ) -> Result<Paginated<T>> {
        let mut query = vec![
            ("page".to_string(), page.page.to_string()),
            ("limit".to_string(), page.limit.to_string()),
        ];
        query.extend(filters.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        self.send(self.request(Method::GET, resource.path()).query(&query)).await
    }

    pub async fn get<T: DeserializeOwned>(&self, resource: Resource, id: Uuid) -> Result<T> {
        self.send(self.request(Method::GET, &format!("{}/{}", resource.path(), id)))
            .await
    }

    pub async fn create<B: Serialize, T: DeserializeOwned>(
        &self,
        resource: Resource,
        body: &B,
    ) -> Result<T> {
        self.send(self.request(Method::POST, resource.path()).json(body)).await
    }

    pub async fn replace<B: Serialize, T: DeserializeOwned>(
        &self,
        resource: Resource,
        id: Uuid,
        body: &B,
    ) -> Result<T> {
        self.send(
            self.request(Method::PUT, &format!("{}/{}", resource.path(), id))
                .json(body),
        )
        .await
    }

    pub async fn delete(&self, resource: Resource, id: Uuid) -> Result<()> {
        let _: DeleteResponse = self
            .send(self.request(Method::DELETE, &format!("{}/{}", resource.path(), id)))
            .await?;
        Ok(())
    }

    // ============ Client Profiles ============

    pub async fn list_profiles(
        &self,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<Paginated<ClientProfile>> {
        let filters: Vec<(&str, &str)> = search.map(|q| ("q", q)).into_iter().collect();
        self.list(Resource::ClientProfiles, page, &filters).await
    }

    pub async fn get_profile(&self, id: Uuid) -> Result<ClientProfile> {
        self.get(Resource::ClientProfiles, id).await
    }

    pub async fn create_profile(&self, input: &ClientProfileInput) -> Result<ClientProfile> {
        self.create(Resource::ClientProfiles, input).await
    }

    pub async fn replace_profile(&self, id: Uuid, input: &ClientProfileInput) -> Result<ClientProfile> {
        self.replace(Resource::ClientProfiles, id, input).await
    }

    pub async fn list_shareholders(
        &self,
        page: PageRequest,
        kind: Option<PersonType>,
    ) -> Result<Paginated<ShareholderView>> {
        let filters: Vec<(&str, &str)> = kind.map(|k| ("type", k.as_str())).into_iter().collect();
        self.list(Resource::Shareholders, page, &filters).await
    }

    // ============ Holding Operations ============

    /// 프로필을 받아 로컬 변환 후 전체 교체
    async fn modify_profile<F>(&self, profile_id: Uuid, apply: F) -> Result<ClientProfile>
    where
        F: FnOnce(&mut ClientProfile) -> std::result::Result<(), HoldingError>,
    {
        let mut profile = self.get_profile(profile_id).await?;
        apply(&mut profile)?;
        self.replace_profile(profile_id, &ClientProfileInput::from(&profile))
            .await
    }

    pub async fn add_holding(&self, profile_id: Uuid, draft: ShareHoldingInput) -> Result<ClientProfile> {
        self.modify_profile(profile_id, |p| holdings::add_holding(p, draft).map(|_| ()))
            .await
    }

    pub async fn edit_holding(
        &self,
        profile_id: Uuid,
        holding_id: Uuid,
        draft: ShareHoldingInput,
    ) -> Result<ClientProfile> {
        self.modify_profile(profile_id, |p| {
            holdings::edit_holding(p, holding_id, draft).map(|_| ())
        })
        .await
    }

    pub async fn delete_holding(&self, profile_id: Uuid, holding_id: Uuid) -> Result<ClientProfile> {
        self.modify_profile(profile_id, |p| {
            holdings::delete_holding(p, holding_id).map(|_| ())
        })
        .await
    }

    /// `reviewer`가 없으면 "Admin"으로 기록
    pub async fn update_review(
        &self,
        profile_id: Uuid,
        holding_id: Uuid,
        update: ReviewUpdate,
        reviewer: Option<&str>,
    ) -> Result<ClientProfile> {
        let reviewer = reviewer.unwrap_or(DEFAULT_REVIEWER);
        self.modify_profile(profile_id, |p| {
            holdings::update_review(p, holding_id, update, reviewer, Utc::now()).map(|_| ())
        })
        .await
    }
}
