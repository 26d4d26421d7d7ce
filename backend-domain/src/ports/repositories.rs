use async_trait::async_trait;
use chrono::NaiveDate;

use crate::entities::{DailyStore, Member, Record};

#[async_trait]
pub trait DailyStoreRepository: Send + Sync {
    /// Absent storage is an empty store; unreadable storage is an error.
    async fn load(&self) -> anyhow::Result<DailyStore>;
    /// Replaces the records at `(date, tag)`; returns whether an upload was replaced.
    async fn upsert(&self, date: NaiveDate, tag: &str, records: Vec<Record>) -> anyhow::Result<bool>;
    async fn remove(&self, date: NaiveDate, tag: &str) -> anyhow::Result<bool>;
    /// Drops dates older than `today - retention_days`; returns the removed dates.
    async fn clean(&self, retention_days: u32, today: NaiveDate) -> anyhow::Result<Vec<NaiveDate>>;
    async fn replace_all(&self, store: &DailyStore) -> anyhow::Result<()>;
    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait RosterRepository: Send + Sync {
    async fn load(&self) -> anyhow::Result<Vec<Member>>;
    async fn save(&self, members: &[Member]) -> anyhow::Result<()>;
}
