//! Report Calculator
//!
//! 대시보드 리포트와 IPF 이전 요약에 쓰이는 순수 함수.
//!
//! # Formula
//!
//! ```text
//! expectedDividends = round2(quantity * 2.5)
//! bonusAllocation   = floor(quantity * 0.1)
//! remainingDues     = max(0, buyAmount - quantity * 2.5)
//! ```

use serde::{Deserialize, Serialize};

/// 주당 예상 배당
pub const DIVIDEND_PER_SHARE: f64 = 2.5;
/// 보너스 주식 배정 비율
pub const BONUS_RATIO: f64 = 0.1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInput {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub quantity: f64,
    /// 총 매수 금액
    #[serde(default)]
    pub buy_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOutput {
    pub expected_dividends: f64,
    pub bonus_allocation: f64,
    pub remaining_dues: f64,
}

pub fn calculate_report(input: &ReportInput) -> ReportOutput {
    let dividends = input.quantity * DIVIDEND_PER_SHARE;
    ReportOutput {
        expected_dividends: (dividends * 100.0).round() / 100.0,
        bonus_allocation: (input.quantity * BONUS_RATIO).floor(),
        remaining_dues: (input.buy_amount - dividends).max(0.0),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpfInput {
    #[serde(default)]
    pub dividends_history: Vec<f64>,
    /// 예: 0.1 = 10주당 1주
    #[serde(default)]
    pub bonus_ratio: f64,
    #[serde(default)]
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpfDetails {
    pub dividends_received: f64,
    pub pending_dividends: f64,
    pub bonus_shares: f64,
}

/// IPF 이전 건의 배당/보너스 요약
pub fn calculate_ipf_details(input: &IpfInput) -> IpfDetails {
    let received: f64 = input.dividends_history.iter().sum();
    let expected = if input.dividends_history.is_empty() {
        0.0
    } else {
        let n = input.dividends_history.len() as f64;
        n * (received / n)
    };

    IpfDetails {
        dividends_received: received,
        pending_dividends: (expected - received).max(0.0),
        bonus_shares: (input.quantity * input.bonus_ratio).floor(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_values() {
        let out = calculate_report(&ReportInput {
            symbol: "INFY".into(),
            quantity: 37.0,
            buy_amount: 500.0,
        });
        assert_eq!(out.expected_dividends, 92.5);
        assert_eq!(out.bonus_allocation, 3.0);
        assert_eq!(out.remaining_dues, 407.5);
    }

    #[test]
    fn test_report_dues_never_negative() {
        let out = calculate_report(&ReportInput { quantity: 100.0, buy_amount: 10.0, ..Default::default() });
        assert_eq!(out.remaining_dues, 0.0);
        assert_eq!(out.bonus_allocation, 10.0);
    }

    #[test]
    fn test_report_rounds_to_cents() {
        let out = calculate_report(&ReportInput { quantity: 0.333, ..Default::default() });
        assert_eq!(out.expected_dividends, 0.83);
    }

    #[test]
    fn test_ipf_details() {
        let out = calculate_ipf_details(&IpfInput {
            dividends_history: vec![10.0, 20.5],
            bonus_ratio: 0.1,
            quantity: 55.0,
        });
        assert_eq!(out.dividends_received, 30.5);
        assert_eq!(out.pending_dividends, 0.0);
        assert_eq!(out.bonus_shares, 5.0);

        let empty = calculate_ipf_details(&IpfInput::default());
        assert_eq!(empty.dividends_received, 0.0);
        assert_eq!(empty.bonus_shares, 0.0);
    }
}
