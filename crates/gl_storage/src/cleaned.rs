use gl_core::{CleanedRecord, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::backends::file::write_json;
use crate::layout::{CLEANED_SUFFIX, SUMMARY_FILE};

/// Output directory of the cleaning stage.
#[derive(Debug, Clone)]
pub struct CleanedStore {
    root: PathBuf,
}

impl CleanedStore {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn record_path(&self, file_id: &str) -> PathBuf {
        self.root.join(format!("{}{}.json", file_id, CLEANED_SUFFIX))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join(SUMMARY_FILE)
    }

    pub async fn write_record(&self, record: &CleanedRecord) -> Result<PathBuf> {
        let path = self.record_path(&record.file_id);
        write_json(&path, record).await?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }

    pub async fn write_summary<T: Serialize>(&self, summary: &T) -> Result<PathBuf> {
        let path = self.summary_path();
        write_json(&path, summary).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gl_core::{CleanedContent, CleanedPdfContent, ContentType};

    #[tokio::test]
    async fn test_write_record_uses_cleaned_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let store = CleanedStore::new(dir.path().join("cleaned")).await.unwrap();
        let record = CleanedRecord {
            file_id: "abc123".to_string(),
            page_url: "https://www.aasld.org/a.pdf".to_string(),
            page_title: "a".to_string(),
            content_type: ContentType::Pdf,
            crawled_at: Utc::now(),
            accessible: true,
            content: CleanedContent::Pdf(CleanedPdfContent::default()),
            cleaned_at: Utc::now(),
        };

        let path = store.write_record(&record).await.unwrap();
        assert!(path.ends_with("abc123_cleaned.json"));
        let back: CleanedRecord =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.file_id, "abc123");

        let summary = store.write_summary(&serde_json::json!({"ok": true})).await.unwrap();
        assert!(summary.ends_with("cleaning_summary.json"));
    }
}
