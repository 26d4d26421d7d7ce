// Record entity
// One normalized spreadsheet row for one member under one tag on one day

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::lenient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(deserialize_with = "lenient::string")]
    pub member_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub username: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub customer_name: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub deposit_count: u64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub total_deposits: Decimal,
    #[serde(default, deserialize_with = "lenient::count")]
    pub withdrawal_count: u64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub total_withdrawals: Decimal,
}

impl Record {
    pub fn new(member_id: impl Into<String>) -> Self {
        Self {
            member_id: member_id.into(),
            username: String::new(),
            customer_name: String::new(),
            deposit_count: 0,
            total_deposits: Decimal::ZERO,
            withdrawal_count: 0,
            total_withdrawals: Decimal::ZERO,
        }
    }

    pub fn net(&self) -> Decimal {
        self.total_deposits.saturating_sub(self.total_withdrawals)
    }
}
