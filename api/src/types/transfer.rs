//! Share Transfer 문서

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::date;
use super::shareholder::PersonType;
use super::validation::{clean, ValidationError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStatus {
    #[default]
    Initiated,
    #[serde(rename = "In-Process")]
    InProcess,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_type: Option<PersonType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_name: Option<String>,
    pub company: String,
    pub transfer_date: DateTime<Utc>,
    #[serde(default)]
    pub status: TransferStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_credit_date: Option<DateTime<Utc>>,
    #[serde(rename = "movedToIPF", default, skip_serializing_if = "Option::is_none")]
    pub moved_to_ipf: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dividends_received: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_dividends: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_shares: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferInput {
    #[serde(default)]
    pub person_id: Option<String>,
    #[serde(default)]
    pub person_type: Option<PersonType>,
    #[serde(default)]
    pub person_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "date::deserialize_optional")]
    pub transfer_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<TransferStatus>,
    #[serde(default, deserialize_with = "date::deserialize_optional")]
    pub expected_credit_date: Option<DateTime<Utc>>,
    #[serde(rename = "movedToIPF", default)]
    pub moved_to_ipf: Option<bool>,
    #[serde(default)]
    pub dividends_received: Option<f64>,
    #[serde(default)]
    pub pending_dividends: Option<f64>,
    #[serde(default)]
    pub bonus_shares: Option<u64>,
}

impl TransferInput {
    pub fn into_transfer(
        self,
        id: Uuid,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Transfer, ValidationError> {
        let mut errors = ValidationError::new("Transfer");
        let Some(company) = clean(self.company) else {
            errors.required("company");
            return Err(errors);
        };

        Ok(Transfer {
            id,
            person_id: clean(self.person_id),
            person_type: self.person_type,
            person_name: clean(self.person_name),
            company,
            transfer_date: self.transfer_date.unwrap_or(now),
            status: self.status.unwrap_or_default(),
            expected_credit_date: self.expected_credit_date,
            moved_to_ipf: self.moved_to_ipf,
            dividends_received: self.dividends_received,
            pending_dividends: self.pending_dividends,
            bonus_shares: self.bonus_shares,
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
    fn test_in_process_wire_name() {
        let input: TransferInput =
            serde_json::from_value(json!({ "company": "INFY", "status": "In-Process" })).unwrap();
        assert_eq!(input.status, Some(TransferStatus::InProcess));

        let now = Utc::now();
        let transfer = input.into_transfer(Uuid::new_v4(), now, now).unwrap();
        let value = serde_json::to_value(&transfer).unwrap();
        assert_eq!(value["status"], "In-Process");
        assert_eq!(value["transferDate"], json!(now));
    }
}
