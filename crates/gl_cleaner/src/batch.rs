use chrono::{DateTime, Utc};
use gl_core::{CleanedRecord, ContentType, Result};
use gl_storage::{list_records, read_record, CleanedStore};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::record::RecordCleaner;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningStats {
    pub total_files: usize,
    pub successful: usize,
    pub failed: usize,
    pub html_files: usize,
    pub pdf_files: usize,
    pub total_recommendations: usize,
    pub total_clinical_values: usize,
    pub total_words: usize,
}

impl CleaningStats {
    fn record(&mut self, cleaned: &CleanedRecord) {
        self.successful += 1;
        match cleaned.content_type {
            ContentType::Html => self.html_files += 1,
            ContentType::Pdf => self.pdf_files += 1,
        }
        self.total_recommendations += cleaned.recommendations().len();
        self.total_clinical_values += cleaned.clinical_values().len();
        self.total_words += cleaned.word_count();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub file_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub url: String,
    pub recommendations_count: usize,
    pub clinical_values_count: usize,
}

impl From<&CleanedRecord> for FileSummary {
    fn from(cleaned: &CleanedRecord) -> Self {
        Self {
            file_id: cleaned.file_id.clone(),
            title: cleaned.page_title.clone(),
            content_type: cleaned.content_type,
            url: cleaned.page_url.clone(),
            recommendations_count: cleaned.recommendations().len(),
            clinical_values_count: cleaned.clinical_values().len(),
        }
    }
}

/// Written next to the cleaned records as `cleaning_summary.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub cleaning_date: DateTime<Utc>,
    pub statistics: CleaningStats,
    pub files: Vec<FileSummary>,
}

/// Cleans every raw record of a directory into a [`CleanedStore`].
#[derive(Debug, Clone, Default)]
pub struct BatchCleaner {
    cleaner: RecordCleaner,
}

impl BatchCleaner {
    pub fn new(cleaner: RecordCleaner) -> Self {
        Self { cleaner }
    }

    /// Files that cannot be read, parsed or written count as failed and are skipped.
    pub async fn clean_dir(&self, input_dir: &Path, store: &CleanedStore) -> Result<CleaningSummary> {
        let files = list_records(input_dir).await?;
        let total = files.len();
        info!("Processing {} JSON files...", total);

        let mut stats = CleaningStats {
            total_files: total,
            ..Default::default()
        };
        let mut summaries = Vec::new();

        for (i, path) in files.iter().enumerate() {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            info!("[{}/{}] {}", i + 1, total, name);

            let record = match read_record(path).await {
                Ok(record) => record,
                Err(e) => {
                    warn!("[{}/{}] ✗ Error cleaning {}: {}", i + 1, total, path.display(), e);
                    stats.failed += 1;
                    continue;
                }
            };

            let file_id = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            let cleaned = self.cleaner.clean_record(&record, file_id, Utc::now());

            if let Err(e) = store.write_record(&cleaned).await {
                warn!("[{}/{}] ✗ Error writing {}: {}", i + 1, total, file_id, e);
                stats.failed += 1;
                continue;
            }

            stats.record(&cleaned);
            summaries.push(FileSummary::from(&cleaned));
        }

        let summary = CleaningSummary {
            cleaning_date: Utc::now(),
            statistics: stats,
            files: summaries,
        };
        store.write_summary(&summary).await?;

        let stats = &summary.statistics;
        info!("Cleaning complete!");
        info!("  Successful: {}/{}", stats.successful, stats.total_files);
        info!("  Failed: {}", stats.failed);
        info!("  Total recommendations extracted: {}", stats.total_recommendations);
        info!("  Total clinical values extracted: {}", stats.total_clinical_values);
        info!("  Output directory: {}", store.root().display());

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_core::{HtmlContent, PageRecord, PdfContent};

    async fn write_raw(dir: &Path, name: &str, record: &PageRecord) {
        let json = serde_json::to_string_pretty(record).unwrap();
        tokio::fs::write(dir.join(name), json).await.unwrap();
    }

    #[tokio::test]
    async fn test_clean_dir() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        let html = PageRecord::html(
            "https://www.aasld.org/practice-guidelines/hcv".to_string(),
            "HCV Guidance".to_string(),
            HtmlContent {
                full_text: "Recommendation 1: Treat everyone with sofosbuvir 400 mg orally daily. Summary".to_string(),
                word_count: 11,
                ..Default::default()
            },
        );
        let pdf = PageRecord::pdf(
            "https://www.aasld.org/files/hbv.pdf".to_string(),
            "hbv".to_string(),
            PdfContent {
                full_text: "Treat if HBV DNA > 2,000 IU/mL.".to_string(),
                page_count: 1,
                word_count: 7,
                ..Default::default()
            },
        );
        write_raw(input.path(), "b_html.json", &html).await;
        write_raw(input.path(), "a_pdf.json", &pdf).await;
        tokio::fs::write(input.path().join("c_broken.json"), "{not json").await.unwrap();
        tokio::fs::write(input.path().join("notes.txt"), "ignored").await.unwrap();

        let store = CleanedStore::new(output.path()).await.unwrap();
        let summary = BatchCleaner::default().clean_dir(input.path(), &store).await.unwrap();

        let stats = &summary.statistics;
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.successful, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.html_files, 1);
        assert_eq!(stats.pdf_files, 1);
        assert_eq!(stats.total_recommendations, 1);
        assert_eq!(stats.total_clinical_values, 2);
        assert_eq!(stats.total_words, 18);

        let ids: Vec<_> = summary.files.iter().map(|f| f.file_id.as_str()).collect();
        assert_eq!(ids, vec!["a_pdf", "b_html"]);
        assert_eq!(summary.files[1].recommendations_count, 1);

        assert!(store.record_path("a_pdf").exists());
        assert!(store.record_path("b_html").exists());
        assert!(!store.record_path("c_broken").exists());

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.summary_path()).unwrap()).unwrap();
        assert_eq!(written["statistics"]["successful"], 2);
        assert_eq!(written["files"][0]["type"], "pdf");
    }

    #[tokio::test]
    async fn test_missing_input_dir_is_error() {
        let output = tempfile::tempdir().unwrap();
        let store = CleanedStore::new(output.path()).await.unwrap();
        let result = BatchCleaner::default()
            .clean_dir(Path::new("/nonexistent/json"), &store)
            .await;
        assert!(result.is_err());
    }
}
