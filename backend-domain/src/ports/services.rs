use std::path::PathBuf;

use async_trait::async_trait;

use crate::entities::{ActivityReport, LookupError, MemberProfile, SheetTable};
use crate::value_objects::SheetFormat;

#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn fetch_profile(
        &self,
        member_id: &str,
        credential: Option<&str>,
    ) -> Result<MemberProfile, LookupError>;
}

#[async_trait]
pub trait RemoteFileStore: Send + Sync {
    async fn get(&self, path: &str) -> anyhow::Result<Option<Vec<u8>>>;
    async fn put(&self, path: &str, content: &[u8], message: &str) -> anyhow::Result<()>;
    fn describe(&self) -> String;
}

pub trait SheetDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8], format: SheetFormat) -> anyhow::Result<SheetTable>;
}

#[async_trait]
pub trait ReportPublisher: Send + Sync {
    fn render_html(&self, report: &ActivityReport) -> String;
    async fn publish(&self, report: &ActivityReport) -> anyhow::Result<PathBuf>;
}
