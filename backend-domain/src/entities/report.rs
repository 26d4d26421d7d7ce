// Report entities
// Aggregation results over a date range of the daily store

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::{Member, Record};
use crate::value_objects::{ActivityPolicy, MemberCategory, MemberScore};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub deposit_count: u64,
    pub total_deposits: Decimal,
    pub withdrawal_count: u64,
    pub total_withdrawals: Decimal,
    pub net: Decimal,
    pub record_count: usize,
    pub member_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub deposit_count: u64,
    pub total_deposits: Decimal,
    pub withdrawal_count: u64,
    pub total_withdrawals: Decimal,
    pub net: Decimal,
    pub record_count: usize,
    pub member_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub member_id: String,
    pub username: String,
    pub customer_name: String,
    pub deposit_count: u64,
    pub total_deposits: Decimal,
    pub withdrawal_count: u64,
    pub total_withdrawals: Decimal,
    pub net: Decimal,
    pub active_days: usize,
    /// Roster score; absent when the member is not on the roster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<MemberScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<MemberCategory>,
}

/// One uploaded record as it appears in the detail section of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordLine {
    pub date: NaiveDate,
    pub tag: String,
    pub member_id: String,
    pub username: String,
    pub customer_name: String,
    pub total_deposits: Decimal,
    pub total_withdrawals: Decimal,
    pub net: Decimal,
}

impl RecordLine {
    pub fn new(date: NaiveDate, tag: &str, record: &Record) -> Self {
        Self {
            date,
            tag: tag.to_string(),
            member_id: record.member_id.clone(),
            username: record.username.clone(),
            customer_name: record.customer_name.clone(),
            total_deposits: record.total_deposits,
            total_withdrawals: record.total_withdrawals,
            net: record.net(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagSummary {
    pub tag: String,
    pub total_deposits: Decimal,
    pub total_withdrawals: Decimal,
    pub net: Decimal,
    pub record_count: usize,
    pub member_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Inclusive calendar days in the requested range.
    pub day_count: i64,
    /// Days in the range that actually have uploads.
    pub days_with_data: usize,
    pub active_only: bool,
    pub totals: Totals,
    pub daily: Vec<DailySummary>,
    pub members: Vec<MemberSummary>,
    pub tags: Vec<TagSummary>,
    /// Every included record in date, tag, upload order.
    #[serde(default)]
    pub records: Vec<RecordLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassiveMember {
    pub member_id: String,
    pub username: String,
    pub full_name: String,
    pub days_without_deposit: u32,
    pub activity: String,
    pub score: MemberScore,
    pub category: MemberCategory,
}

impl PassiveMember {
    pub fn new(member: &Member, policy: &ActivityPolicy, today: NaiveDate) -> Self {
        let score = member.score(today);
        Self {
            member_id: member.member_id.clone(),
            username: member.username.clone(),
            full_name: member.full_name.clone(),
            days_without_deposit: member.days_without_deposit,
            activity: member.activity(policy).as_str().to_string(),
            score,
            category: score.category(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    pub today: NaiveDate,
    pub month_start: NaiveDate,
    pub month: Totals,
    pub recent_days: Vec<DailySummary>,
    pub total_members: usize,
    pub active_members: usize,
    pub passive_members: Vec<PassiveMember>,
    pub stored_days: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}
