use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{debug, info};

use backend_domain::{retention_cutoff, DailyStore, DailyStoreRepository, Record};

use crate::utils::{read_json_file, write_json_atomic};

/// The whole store lives in one JSON document; every mutation rewrites it.
pub struct DailyStoreFileRepository {
    path: PathBuf,
    lock: Mutex<()>,
}

impl DailyStoreFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read(&self) -> anyhow::Result<DailyStore> {
        match read_json_file::<DailyStore>(&self.path).await? {
            Some(store) => Ok(store),
            None => {
                info!("daily store {} not found, starting empty", self.path.display());
                Ok(DailyStore::new())
            }
        }
    }

    async fn write(&self, store: &DailyStore) -> anyhow::Result<()> {
        write_json_atomic(&self.path, store).await?;
        debug!("daily store written: {} days", store.day_count());
        Ok(())
    }
}

#[async_trait]
impl DailyStoreRepository for DailyStoreFileRepository {
    async fn load(&self) -> anyhow::Result<DailyStore> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    async fn upsert(&self, date: NaiveDate, tag: &str, records: Vec<Record>) -> anyhow::Result<bool> {
        let _guard = self.lock.lock().await;
        let mut store = self.read().await?;
        let replaced = store.upsert(date, tag, records).is_some();
        self.write(&store).await?;
        Ok(replaced)
    }

    async fn remove(&self, date: NaiveDate, tag: &str) -> anyhow::Result<bool> {
        let _guard = self.lock.lock().await;
        let mut store = self.read().await?;
        if store.remove(&date, tag).is_none() {
            return Ok(false);
        }
        self.write(&store).await?;
        Ok(true)
    }

    async fn clean(&self, retention_days: u32, today: NaiveDate) -> anyhow::Result<Vec<NaiveDate>> {
        let _guard = self.lock.lock().await;
        let mut store = self.read().await?;
        let removed = store.retain_since(retention_cutoff(today, retention_days));
        if !removed.is_empty() {
            self.write(&store).await?;
        }
        Ok(removed)
    }

    async fn replace_all(&self, store: &DailyStore) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        self.write(store).await
    }

    async fn ping(&self) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        self.read().await.map(|_| ())
    }
}
