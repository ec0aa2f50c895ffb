//! Shareholder / Stockholder 문서
//!
//! 평면 구조. 선택적으로 DMAT 계좌 id를 참조하며,
//! 조회 시에는 참조된 계좌 문서로 확장(join)되어 반환된다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dmat::DmatAccount;
use super::validation::{clean, clean_upper, ValidationError};

/// 사람 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonType {
    Shareholder,
    Stockholder,
}

impl std::str::FromStr for PersonType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Shareholder" => Ok(PersonType::Shareholder),
            "Stockholder" => Ok(PersonType::Stockholder),
            other => Err(format!("unknown person type: {}", other)),
        }
    }
}

impl PersonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonType::Shareholder => "Shareholder",
            PersonType::Stockholder => "Stockholder",
        }
    }
}

/// 저장 문서
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shareholder {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    /// 소문자 저장
    pub email: String,
    pub phone: String,
    /// 대문자 저장
    pub pan: String,
    #[serde(rename = "type")]
    pub kind: PersonType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_dmat_account: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 조회 응답: `linkedDmatAccount`가 계좌 문서로 확장됨
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareholderView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub pan: String,
    #[serde(rename = "type")]
    pub kind: PersonType,
    /// 참조가 끊긴 경우 `null`
    #[serde(default)]
    pub linked_dmat_account: Option<DmatAccount>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShareholderView {
    pub fn expand(holder: Shareholder, account: Option<DmatAccount>) -> Self {
        Self {
            id: holder.id,
            name: holder.name,
            email: holder.email,
            phone: holder.phone,
            pan: holder.pan,
            kind: holder.kind,
            linked_dmat_account: account,
            created_at: holder.created_at,
            updated_at: holder.updated_at,
        }
    }
}

/// DMAT 참조 입력: id 문자열 또는 확장된 문서 (조회 결과를 그대로 PUT 하는 경우)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DmatLink {
    Id(Uuid),
    Expanded {
        #[serde(rename = "_id")]
        id: Uuid,
    },
}

impl DmatLink {
    pub fn id(&self) -> Uuid {
        match self {
            DmatLink::Id(id) | DmatLink::Expanded { id } => *id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareholderInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub pan: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<PersonType>,
    #[serde(default)]
    pub linked_dmat_account: Option<DmatLink>,
}

impl ShareholderInput {
    pub fn into_shareholder(
        self,
        id: Uuid,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Shareholder, ValidationError> {
        let mut errors = ValidationError::new("Shareholder");
        let name = clean(self.name);
        let email = clean(self.email).map(|e| e.to_lowercase());
        let phone = clean(self.phone);
        let pan = clean_upper(self.pan);

        for (path, missing) in [
            ("name", name.is_none()),
            ("email", email.is_none()),
            ("phone", phone.is_none()),
            ("pan", pan.is_none()),
            ("type", self.kind.is_none()),
        ] {
            if missing {
                errors.required(path);
            }
        }

        let (Some(name), Some(email), Some(phone), Some(pan), Some(kind)) =
            (name, email, phone, pan, self.kind)
        else {
            return Err(errors);
        };

        Ok(Shareholder {
            id,
            name,
            email,
            phone,
            pan,
            kind,
            linked_dmat_account: self.linked_dmat_account.map(|l| l.id()),
            created_at,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalizes_email_and_pan() {
        let now = Utc::now();
        let input: ShareholderInput = serde_json::from_value(json!({
            "name": "Rahul K.",
            "email": " Rahul@Example.com ",
            "phone": "9870012345",
            "pan": "bcdfh001j",
            "type": "Stockholder"
        }))
        .unwrap();

        let holder = input.into_shareholder(Uuid::new_v4(), now, now).unwrap();
        assert_eq!(holder.email, "rahul@example.com");
        assert_eq!(holder.pan, "BCDFH001J");
        assert_eq!(holder.kind, PersonType::Stockholder);
    }

    #[test]
    fn test_accepts_expanded_dmat_link() {
        let account_id = Uuid::new_v4();
        let input: ShareholderInput = serde_json::from_value(json!({
            "linkedDmatAccount": { "_id": account_id, "accountNumber": "DMAT-001" }
        }))
        .unwrap();

        assert_eq!(input.linked_dmat_account.map(|l| l.id()), Some(account_id));
    }

    #[test]
    fn test_type_is_required() {
        let now = Utc::now();
        let err = ShareholderInput {
            name: Some("A".into()),
            email: Some("a@b.c".into()),
            phone: Some("1".into()),
            pan: Some("P".into()),
            ..Default::default()
        }
        .into_shareholder(Uuid::new_v4(), now, now)
        .unwrap_err();

        assert_eq!(err.to_string(), "Shareholder validation failed: type: Path `type` is required.");
    }
}
