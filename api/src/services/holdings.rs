//! Holding Mutation Service
//!
//! # Interview Q&A
//!
//! Q: holding 단위 엔드포인트가 없는데 편집/삭제/리뷰는 어떻게 하는가?
//! A: "전체 프로필 조회 → 배열 변환 → 프로필 전체 교체" 흐름
//!
//!    ```text
//!    GET /client-profiles/:id
//!          │
//!          ▼
//!    holdings::edit_holding / delete_holding / update_review   (이 모듈, 순수 함수)
//!          │
//!          ▼
//!    PUT /client-profiles/:id  (전체 문서)
//!    ```
//!
//! Q: 왜 (companyName, ISIN) 쌍이 아닌 id로 찾는가?
//! A: 쌍은 유일하지 않음
//!    - 같은 회사/ISIN을 folio별로 여러 건 보유 가능 → 충돌
//!    - 필터링된 화면 인덱스와 원본 인덱스가 달라짐
//!    - 생성 시점에 부여한 holding id로 원본 배열에서 직접 위치를 찾는다
//!
//! Q: review 상태의 기준은?
//! A: 저장된 `review.status`가 유일한 기준 (없으면 pending)
//!    - 필드 완성도 기반 상태는 `derive_completeness_status`로 분리, 표시용으로만 사용

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::types::{
    ClientProfile, HoldingReview, ReviewStatus, ShareHolding, ShareHoldingInput, ValidationError,
};

/// 리뷰어 미지정 시 기록되는 값
pub const DEFAULT_REVIEWER: &str = "Admin";

/// 로컬 holding 연산 실패 (네트워크 요청 전 중단)
#[derive(Debug, Error, PartialEq)]
pub enum HoldingError {
    #[error("Company name and ISIN number are required")]
    MissingRequiredField,

    #[error("{0}")]
    Invalid(String),

    #[error("Share holding {0} not found")]
    NotFound(Uuid),

    #[error("At least one share holding must remain")]
    LastHolding,
}

/// 리뷰 변경 요청
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewUpdate {
    pub status: ReviewStatus,
    pub notes: Option<String>,
}

fn to_holding(draft: ShareHoldingInput, id: Uuid) -> Result<ShareHolding, HoldingError> {
    let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
    if blank(&draft.company_name) || blank(&draft.isin_number) {
        return Err(HoldingError::MissingRequiredField);
    }

    let mut errors = ValidationError::new("ShareHolding");
    let holding = draft.normalize("shareHolding", &mut errors);
    match holding {
        Some(mut h) if errors.is_empty() => {
            h.id = id;
            Ok(h)
        }
        _ => Err(HoldingError::Invalid(errors.to_string())),
    }
}

fn position(profile: &ClientProfile, id: Uuid) -> Result<usize, HoldingError> {
    profile
        .share_holdings
        .iter()
        .position(|h| h.id == id)
        .ok_or(HoldingError::NotFound(id))
}

/// 새 holding 추가 (새 id 부여, review 기본값 pending)
pub fn add_holding(
    profile: &mut ClientProfile,
    draft: ShareHoldingInput,
) -> Result<&ShareHolding, HoldingError> {
    let mut holding = to_holding(draft, Uuid::new_v4())?;
    holding.review.get_or_insert_with(HoldingReview::default);

    profile.share_holdings.push(holding);
    Ok(&profile.share_holdings[profile.share_holdings.len() - 1])
}

/// holding 교체. id는 유지되며, draft에 review가 없으면 기존 review를 보존한다.
pub fn edit_holding(
    profile: &mut ClientProfile,
    id: Uuid,
    draft: ShareHoldingInput,
) -> Result<&ShareHolding, HoldingError> {
    let idx = position(profile, id)?;
    let mut replacement = to_holding(draft, id)?;
    if replacement.review.is_none() {
        replacement.review = profile.share_holdings[idx].review.take();
    }

    profile.share_holdings[idx] = replacement;
    Ok(&profile.share_holdings[idx])
}

/// holding 삭제. 마지막 한 건은 지울 수 없다.
///
/// 서버는 이 규칙을 강제하지 않는다: PUT으로 빈 배열을 보내면 그대로 저장됨.
pub fn delete_holding(profile: &mut ClientProfile, id: Uuid) -> Result<ShareHolding, HoldingError> {
    let idx = position(profile, id)?;
    if profile.share_holdings.len() <= 1 {
        return Err(HoldingError::LastHolding);
    }
    Ok(profile.share_holdings.remove(idx))
}

/// review 갱신: status/notes/reviewedAt/reviewedBy만 변경
pub fn update_review<'a>(
    profile: &'a mut ClientProfile,
    id: Uuid,
    update: ReviewUpdate,
    reviewer: &str,
    now: DateTime<Utc>,
) -> Result<&'a ShareHolding, HoldingError> {
    let idx = position(profile, id)?;
    let holding = &mut profile.share_holdings[idx];
    holding.review = Some(HoldingReview {
        status: update.status,
        notes: update.notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        reviewed_at: Some(now),
        reviewed_by: Some(reviewer.to_string()),
    });
    Ok(holding)
}

/// 저장된 review 상태 (없으면 pending)
pub fn effective_review_status(holding: &ShareHolding) -> ReviewStatus {
    holding.review.as_ref().map(|r| r.status).unwrap_or_default()
}

/// 필드 완성도 기반 상태 (표시 전용, 저장되지 않음)
///
/// - 필수 필드 + folio + certificate → approved
/// - 필수 필드만 → pending
/// - 그 외 → rejected
pub fn derive_completeness_status(holding: &ShareHolding) -> ReviewStatus {
    let present = |s: &str| !s.trim().is_empty();
    let opt_present = |s: &Option<String>| s.as_deref().is_some_and(present);

    let required = present(&holding.company_name) && present(&holding.isin_number);
    match (
        required,
        opt_present(&holding.folio_number) && opt_present(&holding.certificate_number),
    ) {
        (true, true) => ReviewStatus::Approved,
        (true, false) => ReviewStatus::Pending,
        _ => ReviewStatus::Rejected,
    }
}

/// 저장된 review 상태로 필터링 (`None`이면 전체)
pub fn filter_by_review_status(
    holdings: &[ShareHolding],
    status: Option<ReviewStatus>,
) -> Vec<&ShareHolding> {
    holdings
        .iter()
        .filter(|h| status.map_or(true, |s| effective_review_status(h) == s))
        .collect()
}

/// (회사명, ISIN) 쌍으로 첫 번째 holding 찾기
///
/// id가 없는 구버전 클라이언트 데이터 이관용. 쌍은 유일하지 않으므로 첫 매칭만 반환한다.
pub fn find_by_business_key<'a>(
    holdings: &'a [ShareHolding],
    company_name: &str,
    isin_number: &str,
) -> Option<&'a ShareHolding> {
    let isin = isin_number.trim().to_uppercase();
    holdings
        .iter()
        .find(|h| h.company_name == company_name.trim() && h.isin_number == isin)
}
