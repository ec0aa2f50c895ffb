//! 스키마 검증 에러
//!
//! 문서 DB 스키마 검증 메시지 형식을 그대로 따른다:
//! `ClientProfile validation failed: panNumber: Path `panNumber` is required.`

use std::fmt;

/// 하나의 필드 위반
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

/// 모델 단위 검증 실패 (위반 목록)
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub model: &'static str,
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(model: &'static str) -> Self {
        Self { model, violations: Vec::new() }
    }

    /// 필수 필드 누락
    pub fn required(&mut self, path: impl Into<String>) {
        let path = path.into();
        let leaf = path.rsplit('.').next().unwrap_or(&path).to_string();
        self.violations.push(Violation {
            message: format!("Path `{}` is required.", leaf),
            path,
        });
    }

    /// 최소값 위반
    pub fn below_minimum(&mut self, path: impl Into<String>, value: impl fmt::Display, min: i64) {
        let path = path.into();
        let leaf = path.rsplit('.').next().unwrap_or(&path).to_string();
        self.violations.push(Violation {
            message: format!(
                "Path `{}` ({}) is less than minimum allowed value ({}).",
                leaf, value, min
            ),
            path,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// 위반이 없으면 `Ok(value)`
    pub fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation failed: ", self.model)?;
        let parts: Vec<String> = self
            .violations
            .iter()
            .map(|v| format!("{}: {}", v.path, v.message))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl std::error::Error for ValidationError {}

/// 공백 제거 후 비어 있으면 `None`
pub fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 공백 제거 + 대문자 변환
pub fn clean_upper(value: Option<String>) -> Option<String> {
    clean(value).map(|v| v.to_uppercase())
}
