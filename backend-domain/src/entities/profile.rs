// Member profile entity
// Normalized answer from the backoffice lookup

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileTotals {
    pub deposit_count: u64,
    pub total_deposits: Decimal,
    pub withdrawal_count: u64,
    pub total_withdrawals: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
    pub registration_date: Option<String>,
    pub last_login_date: Option<String>,
    pub last_deposit_date: Option<String>,
    pub last_casino_bet: Option<String>,
    pub partner_name: Option<String>,
    pub birth_date: Option<String>,
    pub balance: Decimal,
    pub currency: Option<String>,
    pub totals: Option<ProfileTotals>,
    /// Untouched `Data` object as returned by the backoffice.
    pub raw: serde_json::Value,
}

impl MemberProfile {
    pub fn has_username(&self) -> bool {
        !self.username.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no backoffice credential configured")]
    MissingCredential,
    #[error("backoffice rejected the credential")]
    Unauthorized,
    #[error("member not found in backoffice")]
    NotFound,
    #[error("backoffice lookup failed: {0}")]
    Transient(String),
}
