//! Document Models
//!
//! 저장소가 다루는 문서 타입의 공통 인터페이스.
//! 모든 컬렉션은 `id + JSON 문서 + created_at/updated_at` 형태로 저장된다.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::types::{
    client_profile::migrate_stored_document, ClientProfile, DmatAccount, PersonType, Shareholder,
    Transfer,
};

/// 목록 조회 필터
#[derive(Debug, Clone, PartialEq)]
pub enum ListFilter {
    All,
    /// 대소문자 무시 부분 문자열 검색 (리터럴 매칭)
    Text(String),
    /// 사람 유형 일치
    Kind(PersonType),
}

impl ListFilter {
    pub fn text(q: Option<&str>) -> Self {
        q.map(|q| ListFilter::Text(q.to_string())).unwrap_or(ListFilter::All)
    }

    pub fn kind(kind: Option<PersonType>) -> Self {
        kind.map(ListFilter::Kind).unwrap_or(ListFilter::All)
    }
}

/// 저장 가능한 문서
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// 컬렉션(테이블) 이름
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;

    /// 인메모리 필터 평가. 해당 컬렉션이 지원하지 않는 필터는 무시한다.
    fn matches(&self, _filter: &ListFilter) -> bool {
        true
    }

    /// Postgres WHERE 절과 `$1` 바인딩 값
    fn sql_filter(_filter: &ListFilter) -> Option<(&'static str, String)> {
        None
    }

    /// 읽기 경계에서 적용되는 레거시 문서 정규화
    fn migrate(_doc: &mut serde_json::Value) {}
}

/// LIKE 메타문자 이스케이프 (`\` ESCAPE 사용)
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl Document for ClientProfile {
    const COLLECTION: &'static str = "client_profiles";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn matches(&self, filter: &ListFilter) -> bool {
        match filter {
            ListFilter::Text(q) => self.matches_text(q),
            _ => true,
        }
    }

    fn sql_filter(filter: &ListFilter) -> Option<(&'static str, String)> {
        match filter {
            ListFilter::Text(q) => Some((
                r"(doc->'shareholderName'->>'name1' ILIKE $1 ESCAPE '\'
                   OR doc->>'panNumber' ILIKE $1 ESCAPE '\'
                   OR doc->>'companyName' ILIKE $1 ESCAPE '\')",
                format!("%{}%", escape_like(q)),
            )),
            _ => None,
        }
    }

    fn migrate(doc: &mut serde_json::Value) {
        migrate_stored_document(doc);
    }
}

impl Document for Shareholder {
    const COLLECTION: &'static str = "shareholders";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn matches(&self, filter: &ListFilter) -> bool {
        match filter {
            ListFilter::Kind(kind) => self.kind == *kind,
            _ => true,
        }
    }

    fn sql_filter(filter: &ListFilter) -> Option<(&'static str, String)> {
        match filter {
            ListFilter::Kind(kind) => Some(("doc->>'type' = $1", kind.as_str().to_string())),
            _ => None,
        }
    }
}

impl Document for DmatAccount {
    const COLLECTION: &'static str = "dmat_accounts";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Document for Transfer {
    const COLLECTION: &'static str = "transfers";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("ABCDE"), "ABCDE");
    }

    #[test]
    fn test_client_profile_sql_filter_binds_pattern() {
        let (clause, bind) =
            ClientProfile::sql_filter(&ListFilter::Text("ab%".into())).unwrap();
        assert!(clause.contains("panNumber"));
        assert_eq!(bind, "%ab\\%%");
        assert!(ClientProfile::sql_filter(&ListFilter::All).is_none());
    }

    #[test]
    fn test_shareholder_kind_filter() {
        let (_, bind) = Shareholder::sql_filter(&ListFilter::Kind(PersonType::Stockholder)).unwrap();
        assert_eq!(bind, "Stockholder");
    }
}
