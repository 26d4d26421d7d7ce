// In-memory port implementations for command and query tests

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use backend_domain::ports::{
    DailyStoreRepository, ProfileLookup, RemoteFileStore, ReportPublisher, RosterRepository,
    SheetDecoder,
};
use backend_domain::{
    retention_cutoff, ActivityReport, DailyStore, LookupError, Member, MemberProfile, Record,
    RuntimeConfig, SheetFormat, SheetTable,
};
use chrono::NaiveDate;
use tokio::sync::{Mutex, RwLock};

use crate::{AppState, Metrics};

#[derive(Default)]
pub struct MemoryDailyRepo {
    pub store: Mutex<DailyStore>,
}

#[async_trait]
impl DailyStoreRepository for MemoryDailyRepo {
    async fn load(&self) -> anyhow::Result<DailyStore> {
        Ok(self.store.lock().await.clone())
    }

    async fn upsert(&self, date: NaiveDate, tag: &str, records: Vec<Record>) -> anyhow::Result<bool> {
        Ok(self.store.lock().await.upsert(date, tag, records).is_some())
    }

    async fn remove(&self, date: NaiveDate, tag: &str) -> anyhow::Result<bool> {
        Ok(self.store.lock().await.remove(&date, tag).is_some())
    }

    async fn clean(&self, retention_days: u32, today: NaiveDate) -> anyhow::Result<Vec<NaiveDate>> {
        let cutoff = retention_cutoff(today, retention_days);
        Ok(self.store.lock().await.retain_since(cutoff))
    }

    async fn replace_all(&self, store: &DailyStore) -> anyhow::Result<()> {
        *self.store.lock().await = store.clone();
        Ok(())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryRosterRepo {
    pub members: Mutex<Vec<Member>>,
    pub fail_saves: bool,
}

#[async_trait]
impl RosterRepository for MemoryRosterRepo {
    async fn load(&self) -> anyhow::Result<Vec<Member>> {
        Ok(self.members.lock().await.clone())
    }

    async fn save(&self, members: &[Member]) -> anyhow::Result<()> {
        if self.fail_saves {
            return Err(anyhow!("disk full"));
        }
        *self.members.lock().await = members.to_vec();
        Ok(())
    }
}

/// Answers from a fixed table; unknown ids are `NotFound`. Every requested
/// id is appended to `calls`, which stays readable after the state is built.
#[derive(Default)]
pub struct FakeLookup {
    pub answers: HashMap<String, Result<MemberProfile, LookupError>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl FakeLookup {
    pub fn with_profile(mut self, member_id: &str, username: &str) -> Self {
        let profile = MemberProfile {
            username: username.to_string(),
            full_name: format!("{} Full", username),
            last_deposit_date: Some(
                (backend_domain::today() - chrono::Duration::days(3))
                    .format("%Y-%m-%d")
                    .to_string(),
            ),
            raw: serde_json::json!({ "Login": username }),
            ..MemberProfile::default()
        };
        self.answers.insert(member_id.to_string(), Ok(profile));
        self
    }

    pub fn with_error(mut self, member_id: &str, error: LookupError) -> Self {
        self.answers.insert(member_id.to_string(), Err(error));
        self
    }
}

#[async_trait]
impl ProfileLookup for FakeLookup {
    async fn fetch_profile(
        &self,
        member_id: &str,
        credential: Option<&str>,
    ) -> Result<MemberProfile, LookupError> {
        self.calls.lock().await.push(member_id.to_string());
        if credential.is_none() {
            return Err(LookupError::MissingCredential);
        }
        self.answers
            .get(member_id)
            .cloned()
            .unwrap_or(Err(LookupError::NotFound))
    }
}

#[derive(Default)]
pub struct MemoryRemote {
    pub files: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl RemoteFileStore for MemoryRemote {
    async fn get(&self, path: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.files.lock().await.get(path).cloned())
    }

    async fn put(&self, path: &str, content: &[u8], _message: &str) -> anyhow::Result<()> {
        self.files
            .lock()
            .await
            .insert(path.to_string(), content.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[derive(Default)]
pub struct TableDecoder {
    pub table: SheetTable,
}

impl SheetDecoder for TableDecoder {
    fn decode(&self, bytes: &[u8], _format: SheetFormat) -> anyhow::Result<SheetTable> {
        if bytes == b"broken" {
            return Err(anyhow!("not a spreadsheet"));
        }
        Ok(self.table.clone())
    }
}

pub struct PlainPublisher;

#[async_trait]
impl ReportPublisher for PlainPublisher {
    fn render_html(&self, report: &ActivityReport) -> String {
        format!("<html>{} - {}</html>", report.start, report.end)
    }

    async fn publish(&self, report: &ActivityReport) -> anyhow::Result<PathBuf> {
        Ok(PathBuf::from(format!("{}_{}.html", report.start, report.end)))
    }
}

pub struct TestStateBuilder {
    pub config: RuntimeConfig,
    pub daily: Arc<MemoryDailyRepo>,
    pub roster: Arc<MemoryRosterRepo>,
    pub lookup: FakeLookup,
    pub remote: Option<Arc<MemoryRemote>>,
    pub table: SheetTable,
    pub members: Vec<Member>,
    pub token: Option<String>,
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self {
            config: RuntimeConfig::default(),
            daily: Arc::new(MemoryDailyRepo::default()),
            roster: Arc::new(MemoryRosterRepo::default()),
            lookup: FakeLookup::default(),
            remote: None,
            table: SheetTable::default(),
            members: Vec::new(),
            token: Some("test-token".to_string()),
        }
    }
}

impl TestStateBuilder {
    pub fn build(self) -> AppState {
        AppState {
            config: self.config,
            daily_repo: self.daily,
            roster_repo: self.roster,
            profile_lookup: Arc::new(self.lookup),
            remote_store: self
                .remote
                .map(|remote| remote as Arc<dyn RemoteFileStore>),
            sheet_decoder: Arc::new(TableDecoder { table: self.table }),
            report_publisher: Arc::new(PlainPublisher),
            roster: Arc::new(RwLock::new(self.members)),
            backoffice_token: Arc::new(RwLock::new(self.token)),
            metrics: Arc::new(Metrics::default()),
        }
    }
}

pub fn day(value: &str) -> NaiveDate {
    backend_domain::parse_date(value).expect("date")
}

pub fn member(id: &str) -> Member {
    Member::new(id, format!("user{}", id), "", backend_domain::now_local())
}
