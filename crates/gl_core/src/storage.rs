use async_trait::async_trait;
use std::path::PathBuf;

use crate::types::{PageRecord, ProcessingResult};
use crate::Result;

#[async_trait]
pub trait PageStorage: Send + Sync {
    /// Store a structured record and its text artifacts under the URL hash.
    async fn store_page(&self, record: &PageRecord) -> Result<()>;

    /// Store raw PDF bytes, returning where they were written.
    async fn store_pdf(&self, url: &str, bytes: &[u8]) -> Result<PathBuf>;

    /// Persist the discovered frontier, in order.
    async fn store_links(&self, links: &[String]) -> Result<()>;

    /// Persist the per-URL outcomes of a run.
    async fn store_results(&self, results: &[ProcessingResult]) -> Result<()>;
}
