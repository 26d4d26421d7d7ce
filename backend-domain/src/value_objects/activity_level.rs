// Activity level value object

use serde::{Deserialize, Serialize};

use crate::utils::UNKNOWN_DAYS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityLevel {
    Recent,
    Lapsing,
    AtRisk,
    Dormant,
    Unknown,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Recent => "RECENT",
            ActivityLevel::Lapsing => "LAPSING",
            ActivityLevel::AtRisk => "AT_RISK",
            ActivityLevel::Dormant => "DORMANT",
            ActivityLevel::Unknown => "UNKNOWN",
        }
    }
}

/// Day cutoffs for classifying members by time since their last deposit.
/// These are operator-tuned defaults, not business rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityPolicy {
    pub recent_days: u32,
    pub lapsing_days: u32,
    pub dormant_days: u32,
    pub passive_after_days: u32,
}

impl Default for ActivityPolicy {
    fn default() -> Self {
        Self {
            recent_days: 7,
            lapsing_days: 30,
            dormant_days: 90,
            passive_after_days: 7,
        }
    }
}

impl ActivityPolicy {
    pub fn classify(&self, days_without_deposit: u32) -> ActivityLevel {
        if days_without_deposit >= UNKNOWN_DAYS {
            ActivityLevel::Unknown
        } else if days_without_deposit <= self.recent_days {
            ActivityLevel::Recent
        } else if days_without_deposit <= self.lapsing_days {
            ActivityLevel::Lapsing
        } else if days_without_deposit <= self.dormant_days {
            ActivityLevel::AtRisk
        } else {
            ActivityLevel::Dormant
        }
    }

    /// Unknown deposit history counts as passive.
    pub fn is_passive(&self, days_without_deposit: u32) -> bool {
        days_without_deposit > self.passive_after_days
    }

    pub fn is_ordered(&self) -> bool {
        self.recent_days <= self.lapsing_days && self.lapsing_days <= self.dormant_days
    }
}
