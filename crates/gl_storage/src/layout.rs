use gl_core::Result;
use std::path::{Path, PathBuf};

pub const LINKS_FILE: &str = "second_level_links.txt";
pub const RESULTS_FILE: &str = "processing_results.json";
pub const SUMMARY_FILE: &str = "cleaning_summary.json";
pub const CLEANED_SUFFIX: &str = "_cleaned";

/// Directory layout of a crawl run rooted at `data/`.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metadata_dir(&self) -> PathBuf {
        self.root.join("metadata")
    }

    pub fn json_dir(&self) -> PathBuf {
        self.root.join("json")
    }

    pub fn text_dir(&self) -> PathBuf {
        self.root.join("text_content")
    }

    pub fn pdf_dir(&self) -> PathBuf {
        self.root.join("pdfs")
    }

    pub fn links_file(&self) -> PathBuf {
        self.metadata_dir().join(LINKS_FILE)
    }

    pub fn results_file(&self) -> PathBuf {
        self.metadata_dir().join(RESULTS_FILE)
    }

    pub fn record_file(&self, hash: &str) -> PathBuf {
        self.json_dir().join(format!("{}.json", hash))
    }

    pub fn text_file(&self, hash: &str) -> PathBuf {
        self.text_dir().join(format!("{}.txt", hash))
    }

    pub fn sections_file(&self, hash: &str) -> PathBuf {
        self.text_dir().join(format!("{}_sections.json", hash))
    }

    pub fn tables_file(&self, hash: &str) -> PathBuf {
        self.text_dir().join(format!("{}_tables.json", hash))
    }

    pub fn pdf_file(&self, hash: &str) -> PathBuf {
        self.pdf_dir().join(format!("{}.pdf", hash))
    }

    /// Creates every directory of the layout.
    pub async fn ensure(&self) -> Result<()> {
        for dir in [self.metadata_dir(), self.json_dir(), self.text_dir(), self.pdf_dir()] {
            tokio::fs::create_dir_all(dir).await?;
        }
        Ok(())
    }
}

impl Default for DataLayout {
    fn default() -> Self {
        Self::new("data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let layout = DataLayout::default();
        assert_eq!(layout.links_file(), PathBuf::from("data/metadata/second_level_links.txt"));
        assert_eq!(layout.results_file(), PathBuf::from("data/metadata/processing_results.json"));
        assert_eq!(layout.record_file("abc"), PathBuf::from("data/json/abc.json"));
        assert_eq!(layout.text_file("abc"), PathBuf::from("data/text_content/abc.txt"));
        assert_eq!(layout.sections_file("abc"), PathBuf::from("data/text_content/abc_sections.json"));
        assert_eq!(layout.tables_file("abc"), PathBuf::from("data/text_content/abc_tables.json"));
        assert_eq!(layout.pdf_file("abc"), PathBuf::from("data/pdfs/abc.pdf"));
    }

    #[tokio::test]
    async fn test_ensure_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path().join("data"));
        layout.ensure().await.unwrap();
        assert!(layout.metadata_dir().is_dir());
        assert!(layout.pdf_dir().is_dir());
    }
}
