// Request payloads and query strings accepted by the API

use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct ImportQuery {
    pub date: Option<String>,
    pub tag: String,
    pub tag_filter: Option<String>,
    /// Declared file name or extension, e.g. `report.xlsx` or `csv`.
    pub format: Option<String>,
    #[serde(default)]
    pub add_new_members: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct CleanupQuery {
    pub retention_days: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct MemberListQuery {
    pub search: Option<String>,
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub member_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: String,
}

/// Either an explicit list or a pasted block of ids separated by
/// newlines, commas or semicolons.
#[derive(Debug, Deserialize, Default)]
pub struct BulkAddRequest {
    #[serde(default)]
    pub member_ids: Vec<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenRotationRequest {
    pub token: String,
}
