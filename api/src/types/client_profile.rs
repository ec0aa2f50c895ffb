//! Client Profile Document
//!
//! 주주 신원, 은행 정보, 보유 주식(share holdings) 배열을 담는 문서.
//! 각 holding은 선택적으로 review 하위 레코드를 가진다.
//!
//! # Input vs Stored
//!
//! ```text
//! ClientProfileInput (요청 body, 느슨한 타입)
//!        │  normalize: trim, PAN/ISIN/IFSC 대문자화, holding id 부여
//!        │  validate:  name1, panNumber, companyName, isinNumber 필수
//!        ▼
//! ClientProfile (저장 문서, 불변식 보장)
//! ```

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::date;
use super::validation::{clean, clean_upper, ValidationError};

// ============ Stored Document ============

/// 주주 이름 (최대 3개 파트, 첫 번째 필수)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShareholderName {
    pub name1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name3: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    /// IFSC (대문자 저장)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifsc_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub micr_code: Option<String>,
}

/// 증권 distinctive number 범위
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistinctiveRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dividend {
    #[serde(default)]
    pub amount: f64,
    #[serde(default, deserialize_with = "date::deserialize_optional", skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

/// Review 상태
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    NeedsAttention,
}

/// Holding 단위 검토 기록
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingReview {
    #[serde(default)]
    pub status: ReviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "date::deserialize_optional", skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
}

/// 보유 주식 한 건
///
/// `id`는 생성 시점에 부여되며, 편집/삭제/리뷰 시 위치를 찾는 유일한 키다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareHolding {
    pub id: Uuid,
    pub company_name: String,
    pub isin_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folio_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distinctive_number: Option<DistinctiveRange>,
    #[serde(default)]
    pub quantity: u64,
    #[serde(default)]
    pub face_value: f64,
    #[serde(default, deserialize_with = "date::deserialize_optional", skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<HoldingReview>,
}

/// 프로필 상태
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileStatus {
    #[default]
    Active,
    Closed,
    Pending,
    Suspended,
}

/// 저장된 Client Profile 문서
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub shareholder_name: ShareholderName,
    pub pan_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadhaar_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<BankDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demat_account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demat_created_with: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demat_created_with_person: Option<String>,
    #[serde(default)]
    pub share_holdings: Vec<ShareHolding>,
    /// 초기 스키마의 단일 회사명 필드 (검색 전용)
    #[serde(rename = "companyName", default, skip_serializing_if = "Option::is_none")]
    pub legacy_company_name: Option<String>,
    #[serde(default, deserialize_with = "date::deserialize_optional", skip_serializing_if = "Option::is_none")]
    pub current_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: ProfileStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dividend: Option<Dividend>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClientProfile {
    /// 텍스트 검색 매칭 (대소문자 무시, 부분 문자열)
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        let hit = |s: &str| s.to_lowercase().contains(&needle);
        hit(&self.shareholder_name.name1)
            || hit(&self.pan_number)
            || self.legacy_company_name.as_deref().is_some_and(hit)
    }

    pub fn holding(&self, id: Uuid) -> Option<&ShareHolding> {
        self.share_holdings.iter().find(|h| h.id == id)
    }
}

/// 저장된 JSON 문서의 레거시 키 정규화
///
/// 초기 스키마는 holdings 배열을 `companies` 키로 저장했다.
/// 읽기 경계에서 한 번만 `shareHoldings`로 옮기고, id 없는 holding에는 id를 부여한다.
///
/// 부여되는 id는 읽을 때마다 같아야 한다 (변환 결과는 다시 저장되지 않음).
/// 프로필 `_id`를 namespace로, 레거시 ObjectId 또는 배열 위치를 이름으로 하는 UUID v5.
pub fn migrate_stored_document(doc: &mut serde_json::Value) {
    let Some(obj) = doc.as_object_mut() else {
        return;
    };

    if !obj.contains_key("shareHoldings") {
        if let Some(companies) = obj.remove("companies") {
            obj.insert("shareHoldings".to_string(), companies);
        }
    } else {
        obj.remove("companies");
    }

    let namespace = obj
        .get("_id")
        .and_then(legacy_object_id)
        .and_then(|s| Uuid::parse_str(&s).ok())
        .unwrap_or(Uuid::NAMESPACE_OID);

    if let Some(serde_json::Value::Array(holdings)) = obj.get_mut("shareHoldings") {
        for (index, holding) in holdings.iter_mut().enumerate() {
            let Some(holding) = holding.as_object_mut() else {
                continue;
            };
            // 레거시 문서는 `_id` (ObjectId 문자열 또는 `{"$oid": ...}`)를 사용
            let legacy_id = holding.remove("_id").as_ref().and_then(legacy_object_id);
            if !holding.contains_key("id") {
                let id = match legacy_id {
                    Some(raw) => Uuid::parse_str(&raw)
                        .unwrap_or_else(|_| Uuid::new_v5(&namespace, raw.as_bytes())),
                    None => Uuid::new_v5(&namespace, format!("shareHoldings.{}", index).as_bytes()),
                };
                holding.insert("id".to_string(), serde_json::Value::String(id.to_string()));
            }
            // 레거시 키 `distinctive`
            if let Some(d) = holding.remove("distinctive") {
                holding.entry("distinctiveNumber").or_insert(d);
            }
            if !holding.contains_key("isinNumber") {
                holding.insert("isinNumber".to_string(), serde_json::Value::String(String::new()));
            }
        }
    }
}

fn legacy_object_id(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Object(o) => o.get("$oid").and_then(|v| v.as_str()).map(str::to_string),
        _ => None,
    }
}

// ============ Request Input ============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareholderNameInput {
    #[serde(default)]
    pub name1: Option<String>,
    #[serde(default)]
    pub name2: Option<String>,
    #[serde(default)]
    pub name3: Option<String>,
}

/// Holding 입력 (폼/요청 body)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareHoldingInput {
    /// 기존 holding을 다시 보낼 때 유지되는 id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub isin_number: Option<String>,
    #[serde(default)]
    pub folio_number: Option<String>,
    #[serde(default)]
    pub certificate_number: Option<String>,
    #[serde(default)]
    pub distinctive_number: Option<DistinctiveRange>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub face_value: Option<f64>,
    #[serde(default, deserialize_with = "date::deserialize_optional")]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<HoldingReview>,
}

impl From<&ShareHolding> for ShareHoldingInput {
    fn from(h: &ShareHolding) -> Self {
        Self {
            id: Some(h.id),
            company_name: Some(h.company_name.clone()),
            isin_number: Some(h.isin_number.clone()),
            folio_number: h.folio_number.clone(),
            certificate_number: h.certificate_number.clone(),
            distinctive_number: h.distinctive_number.clone(),
            quantity: i64::try_from(h.quantity).ok(),
            face_value: Some(h.face_value),
            purchase_date: h.purchase_date,
            review: h.review.clone(),
        }
    }
}

impl ShareHoldingInput {
    /// 정규화 + 검증 후 저장 형태로 변환
    ///
    /// `prefix`는 위반 경로 접두사 (예: `shareHoldings.0`)
    pub fn normalize(self, prefix: &str, errors: &mut ValidationError) -> Option<ShareHolding> {
        let company_name = clean(self.company_name);
        let isin_number = clean_upper(self.isin_number);

        if company_name.is_none() {
            errors.required(format!("{}.companyName", prefix));
        }
        if isin_number.is_none() {
            errors.required(format!("{}.isinNumber", prefix));
        }

        let quantity = self.quantity.unwrap_or(0);
        if quantity < 0 {
            errors.below_minimum(format!("{}.quantity", prefix), quantity, 0);
        }
        let face_value = self.face_value.unwrap_or(0.0);
        if face_value < 0.0 {
            errors.below_minimum(format!("{}.faceValue", prefix), face_value, 0);
        }

        let distinctive_number = self.distinctive_number.and_then(|d| {
            let range = DistinctiveRange { from: clean(d.from), to: clean(d.to) };
            (range != DistinctiveRange::default()).then_some(range)
        });

        let review = self.review.map(|r| HoldingReview {
            notes: clean(r.notes),
            reviewed_by: clean(r.reviewed_by),
            ..r
        });

        Some(ShareHolding {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            company_name: company_name?,
            isin_number: isin_number?,
            folio_number: clean(self.folio_number),
            certificate_number: clean(self.certificate_number),
            distinctive_number,
            quantity: u64::try_from(quantity).ok()?,
            face_value,
            purchase_date: self.purchase_date,
            review,
        })
    }
}

/// Client Profile 생성/수정 요청 body
///
/// PUT은 전체 문서 교체: 여기 없는 holding은 삭제된다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfileInput {
    #[serde(default)]
    pub shareholder_name: Option<ShareholderNameInput>,
    #[serde(default)]
    pub pan_number: Option<String>,
    #[serde(default)]
    pub aadhaar_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub bank_details: Option<BankDetails>,
    #[serde(default)]
    pub demat_account_number: Option<String>,
    #[serde(default)]
    pub demat_created_with: Option<String>,
    #[serde(default)]
    pub demat_created_with_person: Option<String>,
    #[serde(default)]
    pub share_holdings: Vec<ShareHoldingInput>,
    #[serde(rename = "companyName", default, skip_serializing_if = "Option::is_none")]
    pub legacy_company_name: Option<String>,
    #[serde(default, deserialize_with = "date::deserialize_optional")]
    pub current_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<ProfileStatus>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub dividend: Option<Dividend>,
}

impl From<&ClientProfile> for ClientProfileInput {
    fn from(p: &ClientProfile) -> Self {
        Self {
            shareholder_name: Some(ShareholderNameInput {
                name1: Some(p.shareholder_name.name1.clone()),
                name2: p.shareholder_name.name2.clone(),
                name3: p.shareholder_name.name3.clone(),
            }),
            pan_number: Some(p.pan_number.clone()),
            aadhaar_number: p.aadhaar_number.clone(),
            address: p.address.clone(),
            bank_details: p.bank_details.clone(),
            demat_account_number: p.demat_account_number.clone(),
            demat_created_with: p.demat_created_with.clone(),
            demat_created_with_person: p.demat_created_with_person.clone(),
            share_holdings: p.share_holdings.iter().map(ShareHoldingInput::from).collect(),
            legacy_company_name: p.legacy_company_name.clone(),
            current_date: p.current_date,
            status: Some(p.status),
            remarks: p.remarks.clone(),
            dividend: p.dividend.clone(),
        }
    }
}

impl ClientProfileInput {
    /// 요청 body를 저장 문서로 변환
    ///
    /// # Arguments
    /// - `id`: 문서 id (생성 시 새로 발급, 수정 시 기존 값)
    /// - `created_at`: 생성 시각 (수정 시 기존 값 유지)
    /// - `now`: `updatedAt` 및 `currentDate` 기본값
    pub fn into_profile(
        self,
        id: Uuid,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<ClientProfile, ValidationError> {
        let mut errors = ValidationError::new("ClientProfile");

        let name = self.shareholder_name.unwrap_or_default();
        let name1 = clean(name.name1);
        if name1.is_none() {
            errors.required("shareholderName.name1");
        }

        let pan_number = clean_upper(self.pan_number);
        if pan_number.is_none() {
            errors.required("panNumber");
        }

        // 중복 id는 새로 발급해 holding id 유일성 유지
        let mut seen = HashSet::new();
        let share_holdings: Vec<ShareHolding> = self
            .share_holdings
            .into_iter()
            .enumerate()
            .filter_map(|(i, h)| h.normalize(&format!("shareHoldings.{}", i), &mut errors))
            .map(|mut h| {
                if !seen.insert(h.id) {
                    h.id = Uuid::new_v4();
                    seen.insert(h.id);
                }
                h
            })
            .collect();

        let bank_details = self.bank_details.map(|b| BankDetails {
            bank_number: clean(b.bank_number),
            branch: clean(b.branch),
            bank_name: clean(b.bank_name),
            ifsc_code: clean_upper(b.ifsc_code),
            micr_code: clean(b.micr_code),
        });

        let (Some(name1), Some(pan_number)) = (name1, pan_number) else {
            return Err(errors);
        };

        errors.finish(ClientProfile {
            id,
            shareholder_name: ShareholderName {
                name1,
                name2: clean(name.name2),
                name3: clean(name.name3),
            },
            pan_number,
            aadhaar_number: clean(self.aadhaar_number),
            address: clean(self.address),
            bank_details,
            demat_account_number: clean(self.demat_account_number),
            demat_created_with: clean(self.demat_created_with),
            demat_created_with_person: clean(self.demat_created_with_person),
            share_holdings,
            legacy_company_name: clean(self.legacy_company_name),
            current_date: Some(self.current_date.unwrap_or(created_at)),
            status: self.status.unwrap_or_default(),
            remarks: clean(self.remarks),
            dividend: self.dividend,
            created_at,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: serde_json::Value) -> ClientProfileInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalizes_case_and_assigns_ids() {
        let now = Utc::now();
        let profile = input(json!({
            "shareholderName": { "name1": "  Meera S. " },
            "panNumber": "abcde1234f",
            "bankDetails": { "ifscCode": "hdfc0001234" },
            "shareHoldings": [
                { "companyName": "Infosys", "isinNumber": "ine009a01021", "quantity": 10 }
            ]
        }))
        .into_profile(Uuid::new_v4(), now, now)
        .unwrap();

        assert_eq!(profile.shareholder_name.name1, "Meera S.");
        assert_eq!(profile.pan_number, "ABCDE1234F");
        assert_eq!(profile.bank_details.unwrap().ifsc_code.as_deref(), Some("HDFC0001234"));
        assert_eq!(profile.share_holdings[0].isin_number, "INE009A01021");
        assert_eq!(profile.status, ProfileStatus::Active);
        assert_eq!(profile.current_date, Some(now));
    }

    #[test]
    fn test_missing_required_fields() {
        let now = Utc::now();
        let err = input(json!({ "shareHoldings": [{ "isinNumber": "X" }] }))
            .into_profile(Uuid::new_v4(), now, now)
            .unwrap_err();

        let paths: Vec<_> = err.violations.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["shareholderName.name1", "panNumber", "shareHoldings.0.companyName"]
        );
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let now = Utc::now();
        let err = input(json!({
            "shareholderName": { "name1": "A" },
            "panNumber": "P",
            "shareHoldings": [{ "companyName": "C", "isinNumber": "I", "quantity": -3 }]
        }))
        .into_profile(Uuid::new_v4(), now, now)
        .unwrap_err();

        assert!(err.to_string().contains("Path `quantity` (-3) is less than minimum allowed value (0)."));
    }

    #[test]
    fn test_duplicate_holding_ids_are_reissued() {
        let now = Utc::now();
        let dup = Uuid::new_v4();
        let profile = input(json!({
            "shareholderName": { "name1": "A" },
            "panNumber": "P",
            "shareHoldings": [
                { "id": dup, "companyName": "C", "isinNumber": "I" },
                { "id": dup, "companyName": "C", "isinNumber": "I" }
            ]
        }))
        .into_profile(Uuid::new_v4(), now, now)
        .unwrap();

        assert_eq!(profile.share_holdings[0].id, dup);
        assert_ne!(profile.share_holdings[1].id, dup);
    }

    #[test]
    fn test_migrate_legacy_companies_key() {
        let mut doc = json!({
            "_id": Uuid::new_v4(),
            "shareholderName": { "name1": "Legacy" },
            "panNumber": "LEG1234X",
            "companies": [{ "companyName": "TCS", "isinNumber": "INE467B01029", "distinctive": { "from": "1", "to": "9" } }],
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });
        migrate_stored_document(&mut doc);
        let profile: ClientProfile = serde_json::from_value(doc).unwrap();

        assert_eq!(profile.share_holdings.len(), 1);
        assert_eq!(profile.share_holdings[0].company_name, "TCS");
        assert_eq!(
            profile.share_holdings[0].distinctive_number.as_ref().and_then(|d| d.to.as_deref()),
            Some("9")
        );
    }

    #[test]
    fn test_migrated_holding_ids_are_stable_across_reads() {
        let stored = json!({
            "_id": "6f1c2a4e-2b7d-4d1e-9a51-0c3b7f0e8a11",
            "shareholderName": { "name1": "Legacy" },
            "panNumber": "LEG1234X",
            "companies": [
                { "_id": "65a1f0c2e4b0a1b2c3d4e5f6", "companyName": "TCS", "isinNumber": "INE467B01029" },
                { "_id": { "$oid": "65a1f0c2e4b0a1b2c3d4e5f7" }, "companyName": "TCS", "isinNumber": "INE467B01029" },
                { "companyName": "Infosys", "isinNumber": "INE009A01021" }
            ],
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });

        let read = || {
            let mut doc = stored.clone();
            migrate_stored_document(&mut doc);
            serde_json::from_value::<ClientProfile>(doc).unwrap()
        };
        let ids = |p: &ClientProfile| p.share_holdings.iter().map(|h| h.id).collect::<Vec<_>>();

        let first = read();
        let second = read();
        assert_eq!(ids(&first), ids(&second));

        let unique: HashSet<Uuid> = ids(&first).into_iter().collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_text_match_is_case_insensitive() {
        let now = Utc::now();
        let profile = input(json!({
            "shareholderName": { "name1": "Rahul K." },
            "panNumber": "ABCDE1234F",
            "companyName": "Wipro"
        }))
        .into_profile(Uuid::new_v4(), now, now)
        .unwrap();

        assert!(profile.matches_text("rahul"));
        assert!(profile.matches_text("cde12"));
        assert!(profile.matches_text("WIP"));
        assert!(!profile.matches_text("infy"));
    }
}
