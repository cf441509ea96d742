use async_trait::async_trait;
use gl_core::urls::content_hash;
use gl_core::{PageRecord, PageStorage, ProcessingResult, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: Vec<PageRecord>,
    pdfs: Vec<(String, Vec<u8>)>,
    links: Vec<String>,
    results: Vec<ProcessingResult>,
}

impl MemoryStore {
    pub fn store_page(&mut self, record: &PageRecord) {
        if let Some(existing) = self.pages.iter_mut().find(|p| p.source_url == record.source_url) {
            *existing = record.clone();
        } else {
            self.pages.push(record.clone());
        }
    }
}

/// Keeps everything in memory; used by tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn pages(&self) -> Vec<PageRecord> {
        self.store.read().await.pages.clone()
    }

    pub async fn pdf_urls(&self) -> Vec<String> {
        self.store.read().await.pdfs.iter().map(|(u, _)| u.clone()).collect()
    }

    pub async fn links(&self) -> Vec<String> {
        self.store.read().await.links.clone()
    }

    pub async fn results(&self) -> Vec<ProcessingResult> {
        self.store.read().await.results.clone()
    }
}

#[async_trait]
impl PageStorage for MemoryStorage {
    async fn store_page(&self, record: &PageRecord) -> Result<()> {
        let mut store = self.store.write().await;
        store.store_page(record);
        Ok(())
    }

    async fn store_pdf(&self, url: &str, bytes: &[u8]) -> Result<PathBuf> {
        let mut store = self.store.write().await;
        store.pdfs.push((url.to_string(), bytes.to_vec()));
        Ok(PathBuf::from(format!("memory://pdfs/{}.pdf", content_hash(url))))
    }

    async fn store_links(&self, links: &[String]) -> Result<()> {
        self.store.write().await.links = links.to_vec();
        Ok(())
    }

    async fn store_results(&self, results: &[ProcessingResult]) -> Result<()> {
        self.store.write().await.results = results.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_core::HtmlContent;

    #[tokio::test]
    async fn test_memory_storage_replaces_same_url() {
        let storage = MemoryStorage::new();
        let mut record = PageRecord::html(
            "https://x.org/a".to_string(),
            "First".to_string(),
            HtmlContent::default(),
        );
        storage.store_page(&record).await.unwrap();
        record.title = "Second".to_string();
        storage.store_page(&record).await.unwrap();

        let pages = storage.pages().await;
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "Second");
    }
}
