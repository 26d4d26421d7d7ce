use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;
use tracing::{info, warn};

use backend_application::{AppState, Metrics};
use backend_domain::{RemoteFileStore, RosterRepository};
use backend_infrastructure::{
    AppConfig, BackofficeClient, DailyStoreFileRepository, GithubContentsStore, HtmlReportService,
    RosterFileRepository, SpreadsheetReader,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();

        let daily_repo = Arc::new(DailyStoreFileRepository::new(&runtime_config.daily_data_path));
        let roster_repo = Arc::new(RosterFileRepository::new(&runtime_config.members_path));
        let members = roster_repo.load().await?;
        info!("loaded {} roster member(s)", members.len());

        let profile_lookup = Arc::new(BackofficeClient::new(
            &runtime_config.backoffice_api_base,
            runtime_config.lookup_timeout_seconds,
            runtime_config.kpi_enabled,
        )?);
        if config.backoffice_token.is_none() {
            warn!("BTAG_BACKOFFICE_TOKEN is not set, profile lookups stay disabled until a token is provided");
        }

        let remote_store: Option<Arc<dyn RemoteFileStore>> = match config.github_repo_config() {
            Some(github) => {
                let store = GithubContentsStore::new(github, config.remote_timeout_seconds)?;
                info!("remote store enabled: {}", store.describe());
                Some(Arc::new(store))
            }
            None => None,
        };

        let state = AppState {
            report_publisher: Arc::new(HtmlReportService::new(&runtime_config.report_dir)),
            config: runtime_config,
            daily_repo,
            roster_repo,
            profile_lookup,
            remote_store,
            sheet_decoder: Arc::new(SpreadsheetReader::new()),
            roster: Arc::new(RwLock::new(members)),
            backoffice_token: Arc::new(RwLock::new(config.backoffice_token.clone())),
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}
