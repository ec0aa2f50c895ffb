//! Services Module
//!
//! 비즈니스 로직을 담당하는 서비스 레이어
//!
//! # Services
//! - `holdings`: holding 추가/편집/삭제/리뷰 (프로필 전체 교체 전 로컬 변환)
//! - `demo_store`: DB와 분리된 데모 상태 저장소
//! - `report`: 배당/보너스 리포트 계산

pub mod demo_store;
pub mod holdings;
pub mod report;

pub use demo_store::{DemoAction, DemoState, DemoStore, FilePersistence, StatePersistence};
pub use holdings::{HoldingError, ReviewUpdate};
pub use report::{calculate_ipf_details, calculate_report, IpfDetails, IpfInput, ReportInput, ReportOutput};
