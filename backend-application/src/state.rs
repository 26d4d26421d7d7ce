use std::sync::Arc;

use backend_domain::ports::{
    DailyStoreRepository, ProfileLookup, RemoteFileStore, ReportPublisher, RosterRepository,
    SheetDecoder,
};
use backend_domain::{Member, RuntimeConfig};
use tokio::sync::RwLock;

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub daily_repo: Arc<dyn DailyStoreRepository>,
    pub roster_repo: Arc<dyn RosterRepository>,
    pub profile_lookup: Arc<dyn ProfileLookup>,
    pub remote_store: Option<Arc<dyn RemoteFileStore>>,
    pub sheet_decoder: Arc<dyn SheetDecoder>,
    pub report_publisher: Arc<dyn ReportPublisher>,
    /// Cached roster; every change is saved through `roster_repo` first.
    pub roster: Arc<RwLock<Vec<Member>>>,
    /// Backoffice credential, only ever held in memory.
    pub backoffice_token: Arc<RwLock<Option<String>>>,
    pub metrics: Arc<Metrics>,
}
