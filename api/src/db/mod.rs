//! Database Module
//!
//! # Interview Q&A
//!
//! Q: 문서 DB 대신 PostgreSQL을 쓰는 이유는?
//! A: JSONB 컬럼으로 문서 모델을 그대로 유지
//!
//!    1. 중첩 배열(holdings/review)을 한 행에 저장 → 전체 교체가 단일 UPDATE
//!    2. 표현식 인덱스: `doc->>'panNumber'` 검색 최적화
//!    3. 정렬/페이지네이션은 일반 컬럼(created_at, seq)으로 처리
//!    4. 마이그레이션: sqlx 내장
//!
//! Q: DB 연결이 끊기면?
//! A: readiness 플래그로 관리
//!    - 시작 시 연결 실패 → 서버는 뜨고 데이터 라우트만 503
//!    - 요청마다 플래그 확인, 끊겨 있으면 `SELECT 1`로 재연결 시도
//!    - 쿼리 중 커넥션 에러 → 플래그 내림
//!
//! Q: 커넥션 풀은 어떻게 관리하는가?
//! A: SQLx의 PgPool 사용 (lazy connect)
//!    - max_connections: 10
//!    - acquire_timeout: 3초

mod memory;
mod models;
mod repository;

pub use memory::{MemoryCollection, MemoryStore};
pub use models::*;
pub use repository::{DocumentRepository, Store};

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use thiserror::Error;
use uuid::Uuid;

use crate::types::{ClientProfile, DmatAccount, PageRequest, Shareholder, Transfer};

/// 저장소 에러
#[derive(Debug, Error)]
pub enum StoreError {
    /// 연결이 없거나 끊김 → 503
    #[error("Database not connected")]
    Unavailable,

    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// 저장된 JSON이 문서 스키마와 맞지 않음
    #[error("corrupt document: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// PostgreSQL 저장소
pub struct Database {
    pool: PgPool,
    ready: Arc<AtomicBool>,
    client_profiles: PgCollection<ClientProfile>,
    shareholders: PgCollection<Shareholder>,
    dmat_accounts: PgCollection<DmatAccount>,
    transfers: PgCollection<Transfer>,
}

impl Database {
    /// 데이터베이스 연결
    ///
    /// # Connection Pool Settings
    ///
    /// - max_connections: 10 (트래픽에 따라 조정)
    /// - acquire_timeout: 3초 (커넥션 획득 대기)
    ///
    /// 풀은 lazy하게 생성되므로 DB가 내려가 있어도 실패하지 않는다.
    /// URL 형식 오류만 에러로 반환.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(std::time::Duration::from_secs(3))
            .connect_lazy(database_url)?;

        let ready = Arc::new(AtomicBool::new(false));
        let db = Self {
            client_profiles: PgCollection::new(pool.clone(), ready.clone()),
            shareholders: PgCollection::new(pool.clone(), ready.clone()),
            dmat_accounts: PgCollection::new(pool.clone(), ready.clone()),
            transfers: PgCollection::new(pool.clone(), ready.clone()),
            pool,
            ready,
        };

        if !db.ensure_ready().await {
            tracing::warn!("Database unreachable at startup; data routes will return 503");
        }
        Ok(db)
    }

    /// 마이그레이션 실행
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Store for Database {
    fn client_profiles(&self) -> &dyn DocumentRepository<ClientProfile> {
        &self.client_profiles
    }

    fn shareholders(&self) -> &dyn DocumentRepository<Shareholder> {
        &self.shareholders
    }

    fn dmat_accounts(&self) -> &dyn DocumentRepository<DmatAccount> {
        &self.dmat_accounts
    }

    fn transfers(&self) -> &dyn DocumentRepository<Transfer> {
        &self.transfers
    }

    async fn ensure_ready(&self) -> bool {
        if self.ready.load(Ordering::Acquire) {
            return true;
        }

        let check = async {
            self.health_check().await?;
            self.run_migrations().await
        };
        match check.await {
            Ok(()) => {
                self.ready.store(true, Ordering::Release);
                tracing::info!("🗄️  Database connected");
                true
            }
            Err(e) => {
                tracing::warn!("Database not ready: {:#}", e);
                false
            }
        }
    }

    /// Health check
    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

/// 테이블 하나 = 문서 컬렉션 하나
pub struct PgCollection<T> {
    pool: PgPool,
    ready: Arc<AtomicBool>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> PgCollection<T> {
    fn new(pool: PgPool, ready: Arc<AtomicBool>) -> Self {
        Self { pool, ready, _marker: PhantomData }
    }

    /// 커넥션 계열 에러는 readiness 플래그를 내리고 503으로 변환
    fn classify(&self, err: sqlx::Error) -> StoreError {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                self.ready.store(false, Ordering::Release);
                tracing::warn!(collection = T::COLLECTION, "Database connection lost: {}", err);
                StoreError::Unavailable
            }
            other => {
                tracing::error!(collection = T::COLLECTION, "SQLx error: {:?}", other);
                StoreError::Query(other)
            }
        }
    }

    fn decode(mut doc: Value) -> Result<T, StoreError> {
        T::migrate(&mut doc);
        Ok(serde_json::from_value(doc)?)
    }

    fn where_clause(filter: &ListFilter) -> (String, Option<String>) {
        match T::sql_filter(filter) {
            Some((clause, bind)) => (format!("WHERE {}", clause), Some(bind)),
            None => (String::new(), None),
        }
    }
}

#[async_trait]
impl<T: Document> DocumentRepository<T> for PgCollection<T> {
    async fn list(&self, filter: &ListFilter, page: PageRequest) -> Result<(Vec<T>, u64), StoreError> {
        let (where_sql, bind) = Self::where_clause(filter);

        let docs_sql = format!(
            "SELECT doc FROM {} {} ORDER BY created_at DESC, seq DESC LIMIT {} OFFSET {}",
            T::COLLECTION,
            where_sql,
            page.limit,
            page.offset()
        );
        let count_sql = format!("SELECT COUNT(*) FROM {} {}", T::COLLECTION, where_sql);

        let mut docs_query = sqlx::query_as::<_, (Json<Value>,)>(&docs_sql);
        let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql);
        if let Some(bind) = &bind {
            docs_query = docs_query.bind(bind);
            count_query = count_query.bind(bind);
        }

        let (rows, count) = tokio::try_join!(
            docs_query.fetch_all(&self.pool),
            count_query.fetch_one(&self.pool),
        )
        .map_err(|e| self.classify(e))?;

        let docs = rows
            .into_iter()
            .map(|(Json(doc),)| Self::decode(doc))
            .collect::<Result<Vec<T>, _>>()?;

        tracing::debug!(collection = T::COLLECTION, total = count.0, "list");
        Ok((docs, u64::try_from(count.0).unwrap_or(0)))
    }

    async fn find(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        let sql = format!("SELECT doc FROM {} WHERE id = $1", T::COLLECTION);
        let row = sqlx::query_as::<_, (Json<Value>,)>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| self.classify(e))?;

        row.map(|(Json(doc),)| Self::decode(doc)).transpose()
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<T>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT doc FROM {} WHERE id = ANY($1)", T::COLLECTION);
        let rows = sqlx::query_as::<_, (Json<Value>,)>(&sql)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| self.classify(e))?;

        rows.into_iter().map(|(Json(doc),)| Self::decode(doc)).collect()
    }

    async fn insert(&self, doc: &T) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO {} (id, doc, created_at, updated_at) VALUES ($1, $2, $3, $4)",
            T::COLLECTION
        );
        sqlx::query(&sql)
            .bind(doc.id())
            .bind(Json(doc))
            .bind(doc.created_at())
            .bind(doc.updated_at())
            .execute(&self.pool)
            .await
            .map_err(|e| self.classify(e))?;

        tracing::debug!(collection = T::COLLECTION, id = %doc.id(), "insert");
        Ok(())
    }

    async fn replace(&self, doc: &T) -> Result<bool, StoreError> {
        let sql = format!(
            "UPDATE {} SET doc = $2, updated_at = $3 WHERE id = $1",
            T::COLLECTION
        );
        let result = sqlx::query(&sql)
            .bind(doc.id())
            .bind(Json(doc))
            .bind(doc.updated_at())
            .execute(&self.pool)
            .await
            .map_err(|e| self.classify(e))?;

        tracing::debug!(collection = T::COLLECTION, id = %doc.id(), "replace");
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", T::COLLECTION);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| self.classify(e))?;

        tracing::debug!(collection = T::COLLECTION, %id, "delete");
        Ok(result.rows_affected() > 0)
    }
}
