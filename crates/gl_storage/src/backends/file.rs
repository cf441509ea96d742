use async_trait::async_trait;
use gl_core::urls::content_hash;
use gl_core::{Error, PageContent, PageRecord, PageStorage, ProcessingResult, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::layout::DataLayout;

/// Content-addressed artifacts under a [`DataLayout`].
#[derive(Debug, Clone)]
pub struct FileStorage {
    layout: DataLayout,
}

impl FileStorage {
    /// Opens the layout, creating its directories.
    pub async fn new(layout: DataLayout) -> Result<Self> {
        layout.ensure().await?;
        Ok(Self { layout })
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }
}

pub(crate) async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| Error::Storage(format!("Failed to write {}: {}", path.display(), e)))
}

async fn write_text(path: &Path, text: &str) -> Result<()> {
    tokio::fs::write(path, text)
        .await
        .map_err(|e| Error::Storage(format!("Failed to write {}: {}", path.display(), e)))
}

#[async_trait]
impl PageStorage for FileStorage {
    async fn store_page(&self, record: &PageRecord) -> Result<()> {
        let hash = content_hash(&record.source_url);

        write_json(&self.layout.record_file(&hash), record).await?;
        write_text(&self.layout.text_file(&hash), record.full_text()).await?;

        if let PageContent::Html(html) = &record.content {
            write_json(&self.layout.sections_file(&hash), &html.sections).await?;
            if !html.tables.is_empty() {
                write_json(&self.layout.tables_file(&hash), &html.tables).await?;
            }
        }

        debug!("Stored {} as {}", record.source_url, hash);
        Ok(())
    }

    async fn store_pdf(&self, url: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.layout.pdf_file(&content_hash(url));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| Error::Storage(format!("Failed to write {}: {}", path.display(), e)))?;
        Ok(path)
    }

    async fn store_links(&self, links: &[String]) -> Result<()> {
        write_text(&self.layout.links_file(), &links.join("\n")).await
    }

    async fn store_results(&self, results: &[ProcessingResult]) -> Result<()> {
        write_json(&self.layout.results_file(), results).await
    }
}

/// Raw record files of a JSON directory, sorted by name.
pub async fn list_records(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub async fn read_record(path: &Path) -> Result<PageRecord> {
    let data = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_core::{ContentType, HtmlContent, PdfContent, ProcessingStatus, Section, Table};
    use tempfile::TempDir;

    async fn storage() -> (TempDir, FileStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(DataLayout::new(dir.path().join("data")))
            .await
            .unwrap();
        (dir, storage)
    }

    fn html_record(url: &str, with_table: bool) -> PageRecord {
        let content = HtmlContent {
            full_text: "Full text of the guidance.".to_string(),
            sections: vec![Section {
                heading: "Treatment".to_string(),
                level: 2,
                content: vec!["Use tenofovir.".to_string()],
            }],
            tables: if with_table {
                vec![Table::new(1, vec!["Drug".to_string()], vec![vec!["TAF".to_string()]])]
            } else {
                vec![]
            },
            ..Default::default()
        };
        PageRecord::html(url.to_string(), "Guidance".to_string(), content)
    }

    #[tokio::test]
    async fn test_store_html_page_writes_artifacts() {
        let (_dir, storage) = storage().await;
        let url = "https://www.aasld.org/practice-guidelines/hepatitis-b/guidance";
        storage.store_page(&html_record(url, true)).await.unwrap();

        let hash = content_hash(url);
        let layout = storage.layout();
        assert!(layout.record_file(&hash).exists());
        assert!(layout.sections_file(&hash).exists());
        assert!(layout.tables_file(&hash).exists());
        assert_eq!(
            std::fs::read_to_string(layout.text_file(&hash)).unwrap(),
            "Full text of the guidance."
        );

        let back = read_record(&layout.record_file(&hash)).await.unwrap();
        assert_eq!(back.source_url, url);
        assert_eq!(back.content_type, ContentType::Html);
    }

    #[tokio::test]
    async fn test_tables_file_only_when_tables_exist() {
        let (_dir, storage) = storage().await;
        let url = "https://www.aasld.org/x";
        storage.store_page(&html_record(url, false)).await.unwrap();
        assert!(!storage.layout().tables_file(&content_hash(url)).exists());
    }

    #[tokio::test]
    async fn test_pdf_record_has_no_sections_file() {
        let (_dir, storage) = storage().await;
        let url = "https://www.aasld.org/a.pdf";
        let pdf = PdfContent {
            full_text: "Pdf text".to_string(),
            page_count: 1,
            ..Default::default()
        };
        storage
            .store_page(&PageRecord::pdf(url.to_string(), "a".to_string(), pdf))
            .await
            .unwrap();
        let hash = content_hash(url);
        assert!(storage.layout().record_file(&hash).exists());
        assert!(!storage.layout().sections_file(&hash).exists());

        let path = storage.store_pdf(url, b"%PDF-1.4").await.unwrap();
        assert_eq!(path, storage.layout().pdf_file(&hash));
    }

    #[tokio::test]
    async fn test_links_and_results() {
        let (_dir, storage) = storage().await;
        storage
            .store_links(&["https://a.org/1".to_string(), "https://a.org/2".to_string()])
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(storage.layout().links_file()).unwrap(),
            "https://a.org/1\nhttps://a.org/2"
        );

        let results = vec![ProcessingResult::new("https://a.org/1", ProcessingStatus::Failed, ContentType::Html)];
        storage.store_results(&results).await.unwrap();
        let json = std::fs::read_to_string(storage.layout().results_file()).unwrap();
        let back: Vec<ProcessingResult> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, results);
    }

    #[tokio::test]
    async fn test_list_records_sorted_json_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.json"), "{}").unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(dir.path().join("c.txt"), "").unwrap();
        let files = list_records(dir.path()).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }
}
