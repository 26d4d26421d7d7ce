// Operation outcomes returned by commands

use chrono::NaiveDate;
use serde::Serialize;

use crate::entities::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Imported,
    NoData,
    NoMatchingData,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    pub status: ImportStatus,
    pub date: NaiveDate,
    pub tag: String,
    pub record_count: usize,
    pub dropped_rows: usize,
    pub replaced_existing: bool,
    pub warnings: Vec<String>,
    pub source_columns: Vec<String>,
    /// Ids present in the upload but not yet on the roster.
    pub new_member_ids: Vec<String>,
    pub members_added: usize,
}

impl ImportOutcome {
    pub fn empty(status: ImportStatus, date: NaiveDate, tag: &str) -> Self {
        Self {
            status,
            date,
            tag: tag.to_string(),
            record_count: 0,
            dropped_rows: 0,
            replaced_existing: false,
            warnings: Vec::new(),
            source_columns: Vec::new(),
            new_member_ids: Vec::new(),
            members_added: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkAddReport {
    pub added: usize,
    pub failed: Vec<String>,
    pub skipped_existing: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshAllReport {
    pub refreshed: usize,
    pub failed: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanupOutcome {
    pub retention_days: u32,
    pub cutoff: Option<NaiveDate>,
    pub removed_dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub files: Vec<String>,
    pub day_count: usize,
    pub member_count: usize,
}

/// A member id from an upload that is not on the roster yet, with the
/// names carried by the upload row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveredMember {
    pub member_id: String,
    pub username: String,
    pub customer_name: String,
}

impl From<&Record> for DiscoveredMember {
    fn from(record: &Record) -> Self {
        Self {
            member_id: record.member_id.clone(),
            username: record.username.clone(),
            customer_name: record.customer_name.clone(),
        }
    }
}
