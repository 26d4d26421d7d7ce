// Runtime configuration
// Secret-free view of the loaded config handed to the application layer

use crate::value_objects::ActivityPolicy;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub daily_data_path: String,
    pub members_path: String,
    pub report_dir: String,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub lookup_timeout_seconds: u64,
    pub backoffice_api_base: String,
    pub kpi_enabled: bool,
    pub retention_days: Option<u32>,
    pub cleanup_hour: u32,
    pub cleanup_minute: u32,
    pub activity: ActivityPolicy,
    pub auto_sync: bool,
    pub remote_daily_path: String,
    pub remote_members_path: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8501".to_string(),
            daily_data_path: "./daily_data.json".to_string(),
            members_path: "./members.json".to_string(),
            report_dir: "./reports".to_string(),
            max_body_bytes: 20 * 1024 * 1024,
            request_timeout_seconds: 60,
            lookup_timeout_seconds: 10,
            backoffice_api_base: "https://backofficewebadmin.betconstruct.com/api/tr".to_string(),
            kpi_enabled: false,
            retention_days: None,
            cleanup_hour: 3,
            cleanup_minute: 0,
            activity: ActivityPolicy::default(),
            auto_sync: false,
            remote_daily_path: "daily_data.json".to_string(),
            remote_members_path: "members.json".to_string(),
        }
    }
}
