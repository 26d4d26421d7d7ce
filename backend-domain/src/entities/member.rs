// Member entity
// Roster entry tracked independently of daily uploads

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::MemberProfile;
use crate::utils::{days_since, lenient, UNKNOWN_DAYS};
use crate::value_objects::{ActivityLevel, ActivityPolicy, MemberScore, ScoreInputs};

fn default_true() -> bool {
    true
}

fn default_unknown_days() -> u32 {
    UNKNOWN_DAYS
}

fn default_currency() -> String {
    "TRY".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    #[serde(deserialize_with = "lenient::string")]
    pub member_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub username: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub full_name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default = "default_unknown_days")]
    pub days_without_deposit: u32,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub balance: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub total_deposits: Decimal,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub total_withdrawals: Decimal,
    #[serde(default, deserialize_with = "lenient::count")]
    pub deposit_count: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub withdrawal_count: u64,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub registration_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub last_login_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub last_deposit_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub last_casino_bet: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub partner_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub birth_date: Option<String>,
    #[serde(default, alias = "api_data")]
    pub profile_data: Option<serde_json::Value>,
    #[serde(default, alias = "last_api_update")]
    pub last_profile_update: Option<NaiveDateTime>,
}

impl Member {
    pub fn new(
        member_id: impl Into<String>,
        username: impl Into<String>,
        full_name: impl Into<String>,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            member_id: member_id.into(),
            username: username.into(),
            full_name: full_name.into(),
            is_active: true,
            created_at: Some(created_at),
            updated_at: None,
            days_without_deposit: UNKNOWN_DAYS,
            balance: Decimal::ZERO,
            currency: default_currency(),
            total_deposits: Decimal::ZERO,
            total_withdrawals: Decimal::ZERO,
            deposit_count: 0,
            withdrawal_count: 0,
            email: None,
            phone: None,
            status: None,
            registration_date: None,
            last_login_date: None,
            last_deposit_date: None,
            last_casino_bet: None,
            partner_name: None,
            birth_date: None,
            profile_data: None,
            last_profile_update: None,
        }
    }

    pub fn toggle_active(&mut self, now: NaiveDateTime) -> bool {
        self.is_active = !self.is_active;
        self.updated_at = Some(now);
        self.is_active
    }

    /// Merges a backoffice profile into the roster entry. Display names are
    /// only filled in when the roster has none of its own.
    pub fn apply_profile(&mut self, profile: &MemberProfile, today: NaiveDate, now: NaiveDateTime) {
        if self.username.trim().is_empty() && profile.has_username() {
            self.username = profile.username.clone();
        }
        if self.full_name.trim().is_empty() && !profile.full_name.trim().is_empty() {
            self.full_name = profile.full_name.clone();
        }
        self.email = profile.email.clone();
        self.phone = profile.phone.clone();
        self.status = profile.status.clone();
        self.registration_date = profile.registration_date.clone();
        self.last_login_date = profile.last_login_date.clone();
        self.last_deposit_date = profile.last_deposit_date.clone();
        self.last_casino_bet = profile.last_casino_bet.clone();
        self.partner_name = profile.partner_name.clone();
        self.birth_date = profile.birth_date.clone();
        self.balance = profile.balance;
        if let Some(currency) = &profile.currency {
            self.currency = currency.clone();
        }
        if let Some(totals) = &profile.totals {
            self.deposit_count = totals.deposit_count;
            self.total_deposits = totals.total_deposits;
            self.withdrawal_count = totals.withdrawal_count;
            self.total_withdrawals = totals.total_withdrawals;
        }
        self.days_without_deposit = days_since(profile.last_deposit_date.as_deref(), today);
        self.profile_data = Some(profile.raw.clone());
        self.last_profile_update = Some(now);
    }

    pub fn activity(&self, policy: &ActivityPolicy) -> ActivityLevel {
        policy.classify(self.days_without_deposit)
    }

    pub fn score(&self, today: NaiveDate) -> MemberScore {
        MemberScore::compute(&ScoreInputs {
            balance: self.balance,
            days_without_deposit: self.days_without_deposit,
            total_deposits: self.total_deposits,
            days_since_login: days_since(self.last_login_date.as_deref(), today),
        })
    }

    /// Case-insensitive match on id, username or full name.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.member_id.to_lowercase().contains(&needle)
            || self.username.to_lowercase().contains(&needle)
            || self.full_name.to_lowercase().contains(&needle)
    }
}
