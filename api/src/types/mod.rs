//! Common Types Module
//!
//! 레지스트리 문서 타입과 목록 조회 공통 타입 정의
//!
//! - `client_profile`: 주주 프로필 + holdings/review 하위 문서
//! - `shareholder`: Shareholder/Stockholder
//! - `dmat`: DMAT 계좌
//! - `transfer`: 주식 이전 기록

pub mod client_profile;
pub mod date;
pub mod dmat;
pub mod shareholder;
pub mod transfer;
pub mod validation;

pub use client_profile::{
    ClientProfile, ClientProfileInput, HoldingReview, ProfileStatus, ReviewStatus, ShareHolding,
    ShareHoldingInput, ShareholderNameInput,
};
pub use dmat::{DmatAccount, DmatAccountInput, RenewalStatus};
pub use shareholder::{PersonType, Shareholder, ShareholderInput, ShareholderView};
pub use transfer::{Transfer, TransferInput, TransferStatus};
pub use validation::ValidationError;

use serde::{Deserialize, Serialize};

/// 기본 페이지 크기
pub const DEFAULT_PAGE_LIMIT: u32 = 20;
/// 최대 페이지 크기
pub const MAX_PAGE_LIMIT: u32 = 100;

/// 페이지네이션 응답 `{data, page, limit, total}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

impl<T> Paginated<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
        }
    }
}

/// 목록 쿼리 파라미터
///
/// 숫자가 아닌 값은 기본값으로 대체한다 (400을 내지 않음).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    /// 텍스트 검색 (client-profiles 전용)
    pub q: Option<String>,
    /// 유형 필터 (shareholders 전용)
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// 정규화된 페이지 요청
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl ListQuery {
    pub fn page_request(&self) -> PageRequest {
        let parse = |raw: &Option<String>| {
            raw.as_deref()
                .and_then(|s| s.trim().parse::<i64>().ok())
                .filter(|n| *n > 0)
        };
        let page = parse(&self.page).unwrap_or(1);
        let limit = parse(&self.limit).unwrap_or(i64::from(DEFAULT_PAGE_LIMIT));
        PageRequest::new(
            u32::try_from(page).unwrap_or(u32::MAX),
            u32::try_from(limit.min(i64::from(MAX_PAGE_LIMIT))).unwrap_or(MAX_PAGE_LIMIT),
        )
    }

    /// 공백만 있는 검색어는 무시
    pub fn text(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, limit: Option<&str>) -> ListQuery {
        ListQuery {
            page: page.map(String::from),
            limit: limit.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_paginated_map_keeps_counts() {
        let page = Paginated { data: vec![1, 2, 3], page: 2, limit: 3, total: 9 };
        let mapped = page.map(|n| n.to_string());

        assert_eq!(mapped.data, vec!["1", "2", "3"]);
        assert_eq!((mapped.page, mapped.limit, mapped.total), (2, 3, 9));
    }

    #[test]
    fn test_page_defaults() {
        assert_eq!(query(None, None).page_request(), PageRequest { page: 1, limit: 20 });
        assert_eq!(query(Some("abc"), Some("0")).page_request(), PageRequest { page: 1, limit: 20 });
    }

    #[test]
    fn test_limit_capped() {
        let req = query(Some("3"), Some("500")).page_request();
        assert_eq!(req, PageRequest { page: 3, limit: 100 });
        assert_eq!(req.offset(), 200);
    }

    #[test]
    fn test_blank_text_ignored() {
        let q = ListQuery { q: Some("   ".into()), ..Default::default() };
        assert_eq!(q.text(), None);
    }
}
