//! Share Registry API Server
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Client (Back-office UI)                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum Web Server                         │
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                      Routes Layer                        ││
//! │  │  /health  /api/client-profiles  /api/shareholders       ││
//! │  │  /api/dmat  /api/transfers  /api/demo/*                 ││
//! │  └─────────────────────────────────────────────────────────┘│
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                    Services Layer                        ││
//! │  │  Holdings    DemoStore    Report                        ││
//! │  └─────────────────────────────────────────────────────────┘│
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                    Data Layer                            ││
//! │  │  PostgreSQL (JSONB)    In-memory (DATABASE_URL 미설정)  ││
//! │  └─────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// 라이브러리에서 가져오기
use share_registry_api::{
    routes, services::FilePersistence, AppState, Config, Database, DemoStore, MemoryStore, Store,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    // RUST_LOG=debug,sqlx=warn 형태로 레벨 제어 가능
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "share_registry_api=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting Share Registry API Server");

    // 설정 로드
    let config = Config::from_env()?;
    tracing::info!("📋 Configuration loaded ({:?})", config.environment);

    // 저장소 선택: DB 연결 실패해도 서버는 뜬다 (데이터 라우트만 503)
    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => Arc::new(Database::connect(url).await?),
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };
    tracing::info!("🗄️  Store backend: {}", store.backend());

    // 데모 상태 복원 + 최초 시드
    let mut demo = DemoStore::open(Box::new(FilePersistence::new(&config.demo_state_path)));
    if demo.seed_if_empty(Utc::now())? {
        tracing::info!("🌱 Demo state seeded at {}", config.demo_state_path.display());
    }

    // 앱 상태 구성
    let port = config.port;
    let state = AppState::new(store, demo, config);

    // 라우터 구성
    let app = routes::create_router(state);

    // 서버 시작
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("🌐 Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
