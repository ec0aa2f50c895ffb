//! DMAT 계좌 문서

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::date;
use super::validation::{clean, ValidationError};

/// 만기 임박으로 판단하는 기간 (일)
pub const EXPIRING_WINDOW_DAYS: i64 = 10;

/// 갱신 상태
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenewalStatus {
    #[default]
    Active,
    Expiring,
    Expired,
    Pending,
}

impl RenewalStatus {
    /// 만기까지 남은 일수로 상태 계산 (데모 데이터 경로 전용)
    ///
    /// DB 경로는 `renewalStatus`를 명시적으로 저장하며, 이 계산과 동기화하지 않는다.
    pub fn from_days_until_expiry(days: i64) -> Self {
        if days < 0 {
            RenewalStatus::Expired
        } else if days <= EXPIRING_WINDOW_DAYS {
            RenewalStatus::Expiring
        } else {
            RenewalStatus::Active
        }
    }

    pub fn from_expiry(expiry: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self::from_days_until_expiry((expiry - now).num_days())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmatAccount {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub account_number: String,
    pub holder_name: String,
    pub expiry_date: DateTime<Utc>,
    #[serde(default)]
    pub renewal_status: RenewalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmatAccountInput {
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub holder_name: Option<String>,
    #[serde(default, deserialize_with = "date::deserialize_optional")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub renewal_status: Option<RenewalStatus>,
}

impl DmatAccountInput {
    pub fn into_account(
        self,
        id: Uuid,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<DmatAccount, ValidationError> {
        let mut errors = ValidationError::new("DmatAccount");
        let account_number = clean(self.account_number);
        let holder_name = clean(self.holder_name);

        if account_number.is_none() {
            errors.required("accountNumber");
        }
        if holder_name.is_none() {
            errors.required("holderName");
        }
        if self.expiry_date.is_none() {
            errors.required("expiryDate");
        }

        let (Some(account_number), Some(holder_name), Some(expiry_date)) =
            (account_number, holder_name, self.expiry_date)
        else {
            return Err(errors);
        };

        Ok(DmatAccount {
            id,
            account_number,
            holder_name,
            expiry_date,
            renewal_status: self.renewal_status.unwrap_or_default(),
            created_at,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renewal_status_thresholds() {
        assert_eq!(RenewalStatus::from_days_until_expiry(-1), RenewalStatus::Expired);
        assert_eq!(RenewalStatus::from_days_until_expiry(0), RenewalStatus::Expiring);
        assert_eq!(RenewalStatus::from_days_until_expiry(10), RenewalStatus::Expiring);
        assert_eq!(RenewalStatus::from_days_until_expiry(11), RenewalStatus::Active);
    }

    #[test]
    fn test_expiry_date_required() {
        let now = Utc::now();
        let err = DmatAccountInput {
            account_number: Some("DMAT-001".into()),
            holder_name: Some("Akanksha D.".into()),
            ..Default::default()
        }
        .into_account(Uuid::new_v4(), now, now)
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "DmatAccount validation failed: expiryDate: Path `expiryDate` is required."
        );
    }
}
