// Member score value object
// 0-100 engagement score built from balance, deposit recency, lifetime
// deposits and last login, bucketed into display categories

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const MAX_SCORE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MemberCategory {
    #[serde(rename = "VIP")]
    Vip,
    #[serde(rename = "Aktif")]
    Active,
    #[serde(rename = "Orta")]
    Moderate,
    #[serde(rename = "Pasif")]
    Passive,
    #[serde(rename = "Risk")]
    Risk,
}

impl MemberCategory {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => MemberCategory::Vip,
            60..=79 => MemberCategory::Active,
            40..=59 => MemberCategory::Moderate,
            20..=39 => MemberCategory::Passive,
            _ => MemberCategory::Risk,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MemberCategory::Vip => "VIP",
            MemberCategory::Active => "Aktif",
            MemberCategory::Moderate => "Orta",
            MemberCategory::Passive => "Pasif",
            MemberCategory::Risk => "Risk",
        }
    }
}

/// Inputs for [`MemberScore::compute`]. Day counts use the
/// `UNKNOWN_DAYS` sentinel when the underlying date is missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    pub balance: Decimal,
    pub days_without_deposit: u32,
    pub total_deposits: Decimal,
    pub days_since_login: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberScore(u8);

impl MemberScore {
    pub fn compute(inputs: &ScoreInputs) -> Self {
        let total = balance_points(inputs.balance)
            + deposit_recency_points(inputs.days_without_deposit)
            + lifetime_deposit_points(inputs.total_deposits)
            + login_points(inputs.days_since_login);
        MemberScore(total.min(MAX_SCORE))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn category(&self) -> MemberCategory {
        MemberCategory::from_score(self.0)
    }
}

fn balance_points(balance: Decimal) -> u8 {
    if balance > Decimal::from(1000) {
        25
    } else if balance > Decimal::from(100) {
        15
    } else if balance > Decimal::from(10) {
        5
    } else {
        0
    }
}

fn deposit_recency_points(days: u32) -> u8 {
    match days {
        0..=7 => 35,
        8..=30 => 25,
        31..=90 => 15,
        91..=180 => 5,
        _ => 0,
    }
}

fn lifetime_deposit_points(total: Decimal) -> u8 {
    if total > Decimal::from(10_000) {
        25
    } else if total > Decimal::from(5_000) {
        20
    } else if total > Decimal::from(1_000) {
        15
    } else if total > Decimal::from(100) {
        10
    } else if total > Decimal::ZERO {
        5
    } else {
        0
    }
}

fn login_points(days: u32) -> u8 {
    match days {
        0..=1 => 15,
        2..=7 => 10,
        8..=30 => 5,
        _ => 0,
    }
}
