use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use backend_domain::{Member, RosterRepository};

use crate::utils::{read_json_file, write_json_atomic};

pub struct RosterFileRepository {
    path: PathBuf,
    lock: Mutex<()>,
}

impl RosterFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl RosterRepository for RosterFileRepository {
    async fn load(&self) -> anyhow::Result<Vec<Member>> {
        let _guard = self.lock.lock().await;
        match read_json_file::<Vec<Member>>(&self.path).await? {
            Some(members) => Ok(members),
            None => {
                info!("roster {} not found, starting empty", self.path.display());
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, members: &[Member]) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        write_json_atomic(&self.path, members).await
    }
}
