use crate::domain::model::{CardEntry, CheckOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn registry_url(&self) -> &str;
    fn portal_url(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_file(&self) -> &str;
    fn concurrent_requests(&self) -> usize;
    /// Lowercase English month name to match against transaction tables.
    /// None means the current local month.
    fn month(&self) -> Option<&str>;
    fn commodity(&self) -> &str;
    /// Watch list for the per-commodity presence map; empty disables it.
    fn commodities(&self) -> &[String];
    fn timeout_secs(&self) -> u64;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<CardEntry>>;
    async fn transform(&self, entries: Vec<CardEntry>) -> Result<CheckOutcome>;
    async fn load(&self, outcome: CheckOutcome) -> Result<String>;
}
