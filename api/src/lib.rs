//! Share Registry API Library
//!
//! # Overview
//!
//! 주식 명의개서(share registry) 백오피스의 백엔드 API.
//! Client Profile / Shareholder / DMAT / Transfer 문서에 대한 CRUD와
//! holding 리뷰 로직, 데모 상태 저장소를 제공한다.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                         API                              │
//! │                                                          │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌─────────┐    │
//! │  │ Routes  │  │Services │  │   DB    │  │  Types  │    │
//! │  └────┬────┘  └────┬────┘  └────┬────┘  └────┬────┘    │
//! │       │            │            │            │          │
//! │       └────────────┴────────────┴────────────┘          │
//! │                         │                                │
//! └─────────────────────────┼────────────────────────────────┘
//!                           │
//!                           ▼
//!              ┌────────────────────────┐
//!              │ PostgreSQL (JSONB) or  │
//!              │ in-memory store        │
//!              └────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: 환경 설정 관리
//! - `error`: 에러 타입 및 처리
//! - `routes`: HTTP 엔드포인트 핸들러
//! - `services`: holding 변환, 데모 상태, 리포트 계산
//! - `db`: 저장소 (PostgreSQL / 인메모리)
//! - `types`: 문서 타입 정의
//! - `client`: 레지스트리 HTTP 클라이언트
//!
//! ## Usage
//!
//! ```rust,ignore
//! use share_registry_api::{config::Config, db::MemoryStore, AppState, routes};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let state = AppState::new(Arc::new(MemoryStore::new()), demo_store, config);
//!     let app = routes::create_router(state);
//!     // ... 서버 시작
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::sync::Mutex;

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod services;
pub mod types;

// Re-exports for convenience
pub use client::RegistryClient;
pub use config::Config;
pub use db::{Database, MemoryStore, Store};
pub use error::ApiError;
pub use services::DemoStore;

/// 애플리케이션 전역 상태
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub demo: Arc<Mutex<DemoStore>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, demo: DemoStore, config: Config) -> Self {
        Self {
            store,
            demo: Arc::new(Mutex::new(demo)),
            config: Arc::new(config),
        }
    }
}
