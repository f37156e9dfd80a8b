use crate::domain::model::{ConnectionRecord, ProcessRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Retrieves a document over the network as text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Live view of the OS process table. Every call re-queries the OS.
pub trait ProcessSource {
    fn list_processes(&self) -> Result<Vec<ProcessRecord>>;
    fn list_connections(&self, process: &ProcessRecord) -> Result<Vec<ConnectionRecord>>;
}

/// Chooses the major version to scan when none is given.
pub trait MajorVersionResolver {
    fn resolve_current_major(&self) -> String;
}
