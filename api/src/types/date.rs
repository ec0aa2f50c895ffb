//! 날짜 필드 역직렬화
//!
//! 폼에서 들어오는 날짜는 `2024-01-15` (date input) 또는 RFC 3339 문자열이다.
//! 둘 다 UTC 시각으로 받아들이고, 빈 문자열은 값 없음으로 취급한다.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

/// 문자열을 UTC 시각으로 파싱
pub fn parse_flexible(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// `Option<DateTime<Utc>>` 필드용 serde helper
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_flexible(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("Cast to date failed for value \"{}\"", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_only() {
        let ts = parse_flexible("2024-01-15").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-15T00:00:00+00:00");
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let ts = parse_flexible("2024-01-15T10:30:00+05:30").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-15T05:00:00+00:00");
    }

    #[test]
    fn test_parse_blank_and_garbage() {
        assert!(parse_flexible("   ").is_none());
        assert!(parse_flexible("yesterday").is_none());
    }
}
