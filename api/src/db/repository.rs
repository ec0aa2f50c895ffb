//! Repository Pattern Implementation
//!
//! # Interview Q&A
//!
//! Q: Repository 패턴이란?
//! A: 데이터 접근 로직을 추상화하는 패턴
//!
//!    장점:
//!    - 라우트 핸들러와 저장소 분리
//!    - 테스트 시 인메모리 구현으로 교체
//!    - DB 교체 시 영향 최소화
//!
//!    ```rust,ignore
//!    // Route 레이어
//!    let profile = state.store.client_profiles().find(id).await?;
//!
//!    // PostgreSQL 구현: db::Database
//!    // 인메모리 구현:   db::MemoryStore
//!    ```
//!
//! Q: 컬렉션마다 trait을 따로 두지 않은 이유는?
//! A: 네 컬렉션 모두 같은 연산(list/find/insert/replace/delete)만 필요
//!    - 문서별 차이(필터, 레거시 정규화)는 `Document` trait이 담당
//!    - 저장소는 제네릭 `DocumentRepository<T>` 하나로 충분

use async_trait::async_trait;
use uuid::Uuid;

use super::models::{Document, ListFilter};
use super::StoreError;
use crate::types::{ClientProfile, DmatAccount, PageRequest, Shareholder, Transfer};

/// 문서 컬렉션 인터페이스
///
/// `replace`는 전체 문서 교체이며 동시성 토큰이 없다 (last-write-wins).
#[async_trait]
pub trait DocumentRepository<T: Document>: Send + Sync {
    /// 최신 생성순 페이지 + 필터 적용 전체 개수
    async fn list(&self, filter: &ListFilter, page: PageRequest) -> Result<(Vec<T>, u64), StoreError>;
    async fn find(&self, id: Uuid) -> Result<Option<T>, StoreError>;
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<T>, StoreError>;
    async fn insert(&self, doc: &T) -> Result<(), StoreError>;
    /// 존재하지 않으면 `false`
    async fn replace(&self, doc: &T) -> Result<bool, StoreError>;
    /// 존재하지 않으면 `false`
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// 전체 저장소 (컬렉션 묶음 + 연결 상태)
#[async_trait]
pub trait Store: Send + Sync {
    fn client_profiles(&self) -> &dyn DocumentRepository<ClientProfile>;
    fn shareholders(&self) -> &dyn DocumentRepository<Shareholder>;
    fn dmat_accounts(&self) -> &dyn DocumentRepository<DmatAccount>;
    fn transfers(&self) -> &dyn DocumentRepository<Transfer>;

    /// 요청 처리 가능 여부. 끊겨 있으면 한 번 재연결을 시도한다.
    async fn ensure_ready(&self) -> bool;

    async fn health_check(&self) -> anyhow::Result<()>;

    /// 로그/헬스 응답용 백엔드 이름
    fn backend(&self) -> &'static str;
}
