use gl_core::{
    ContentType, PageRecord, PageStorage, ProcessingResult, ProcessingStatus, Result,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::automation::{AutomationHandle, SessionLauncher};
use crate::challenge::is_challenge;
use crate::config::{FetchConfig, SiteProfile};
use crate::extract::{self, is_pdf_url, pdf};
use crate::frontier::{self, Frontier};
use crate::logging::Logger;
use crate::transport::{FetchOutcome, HttpBackend, TransportClient};

/// HTML pages with less full text than this are recorded as insufficient.
pub const MIN_CONTENT_CHARS: usize = 100;

#[derive(Debug, Clone, Default)]
pub struct CrawlSettings {
    pub fetch: FetchConfig,
    pub profile: SiteProfile,
    /// Send every request through the browser.
    pub force_automation: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub blocked: usize,
    pub insufficient: usize,
    pub pdf_success: usize,
    pub pdf_failed: usize,
}

impl RunStats {
    pub fn record(&mut self, result: &ProcessingResult) {
        let is_pdf = result.content_type == ContentType::Pdf;
        match result.status {
            ProcessingStatus::Success => {
                self.success += 1;
                if is_pdf {
                    self.pdf_success += 1;
                }
            }
            ProcessingStatus::Failed | ProcessingStatus::Error => {
                self.failed += 1;
                if is_pdf {
                    self.pdf_failed += 1;
                }
            }
            ProcessingStatus::Blocked => self.blocked += 1,
            ProcessingStatus::Insufficient => self.insufficient += 1,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.success as f64 / self.total as f64 * 100.0
        }
    }

    pub fn log_summary(&self) {
        info!("{}", "=".repeat(70));
        info!("PROCESSING SUMMARY");
        info!("Total links: {}", self.total);
        info!("✓ Successful: {}", self.success);
        info!("  - HTML: {}", self.success - self.pdf_success);
        info!("  - PDF: {}", self.pdf_success);
        info!("✗ Failed: {}", self.failed);
        info!("  - PDF Failed: {}", self.pdf_failed);
        info!("⊘ Blocked: {}", self.blocked);
        info!("⊘ Insufficient: {}", self.insufficient);
        info!("Success rate: {:.1}%", self.success_rate());
        info!("{}", "=".repeat(70));
    }
}

/// Sequential discover → fetch → extract → persist pipeline.
///
/// The crawler owns the browser handle; [`Crawler::run`] and
/// [`Crawler::process_one`] consume it and always shut the browser down.
pub struct Crawler {
    http: Arc<dyn HttpBackend>,
    automation: AutomationHandle,
    storage: Arc<dyn PageStorage>,
    settings: CrawlSettings,
    logger: Logger,
}

impl Crawler {
    pub fn new(
        http: Arc<dyn HttpBackend>,
        launcher: Arc<dyn SessionLauncher>,
        storage: Arc<dyn PageStorage>,
        settings: CrawlSettings,
    ) -> Self {
        let automation = AutomationHandle::new(launcher, settings.fetch.reset_pause);
        Self {
            http,
            automation,
            storage,
            settings,
            logger: Logger::new(),
        }
    }

    fn client(&mut self) -> TransportClient<'_> {
        TransportClient::new(self.http.clone(), &mut self.automation, self.settings.fetch.clone())
    }

    /// Discovers and processes every guideline link, then releases the browser.
    pub async fn run(mut self) -> Result<(Vec<ProcessingResult>, RunStats)> {
        let outcome = self.crawl().await;
        self.automation.shutdown().await;
        outcome
    }

    /// Processes a single URL, then releases the browser.
    pub async fn process_one(mut self, url: &str) -> Result<ProcessingResult> {
        let outcome = self.process_url(url).await;
        self.automation.shutdown().await;
        outcome
    }

    async fn crawl(&mut self) -> Result<(Vec<ProcessingResult>, RunStats)> {
        info!("== STEP 1: Extracting category links ==");
        let links = self.discover().await?;
        if links.is_empty() {
            warn!("✗ No guideline links found");
        }

        info!("== STEP 2: Processing all guideline links ==");
        let (results, stats) = self.process_all(&links).await?;
        stats.log_summary();
        Ok((results, stats))
    }

    /// Builds and persists the deduplicated guideline link list.
    pub async fn discover(&mut self) -> Result<Vec<String>> {
        let root = self.settings.profile.root_url.clone();
        let force = self.settings.force_automation;

        info!("Fetching main page: {}", root);
        let Some(html) = self.client().fetch(&root, force).await? else {
            warn!("✗ Failed to fetch main page");
            return Ok(Vec::new());
        };

        let categories = frontier::discover_categories(&html, &self.settings.profile)?;
        info!("  ✓ Found {} category pages", categories.len());

        let mut frontier = Frontier::new();
        for (i, page_url) in categories.iter().enumerate() {
            let name = page_url.rsplit('/').next().unwrap_or(page_url);
            let logger = self
                .logger
                .clone()
                .with_new_prefixes(format!("[{}/{}]", i + 1, categories.len()));
            logger.info(name);

            let Some(html) = self.client().fetch(page_url, force).await? else {
                logger.warn("✗ Failed to fetch category page");
                continue;
            };
            match frontier::discover_guideline_links(&html, page_url, &self.settings.profile) {
                Ok(links) if !links.is_empty() => {
                    logger.info(&format!("  ✓ {} link(s)", links.len()));
                    frontier.extend(links);
                }
                Ok(_) => {}
                Err(e) => logger.warn(&format!("✗ Link discovery failed: {}", e)),
            }
        }

        info!("✓ Total unique links: {}", frontier.len());
        self.storage.store_links(frontier.links()).await?;
        Ok(frontier.into_links())
    }

    /// Processes `urls` in order and persists the per-URL results.
    pub async fn process_all(&mut self, urls: &[String]) -> Result<(Vec<ProcessingResult>, RunStats)> {
        let mut stats = RunStats {
            total: urls.len(),
            ..Default::default()
        };
        let mut results = Vec::with_capacity(urls.len());

        for (i, url) in urls.iter().enumerate() {
            self.logger = Logger::new().with_new_prefixes(format!("[{}/{}]", i + 1, urls.len()));
            self.logger.info(url);

            let result = self.process_url(url).await?;
            stats.record(&result);
            results.push(result);
        }

        self.storage.store_results(&results).await?;
        Ok((results, stats))
    }

    /// Fetches, extracts and stores one URL. Per-URL failures become a status;
    /// only a browser that cannot start at all is returned as an error.
    pub async fn process_url(&mut self, url: &str) -> Result<ProcessingResult> {
        if is_pdf_url(url) {
            Ok(self.process_pdf(url).await)
        } else {
            self.process_html(url).await
        }
    }

    async fn process_html(&mut self, url: &str) -> Result<ProcessingResult> {
        let failed = |status| ProcessingResult::new(url, status, ContentType::Html);
        let force = self.settings.force_automation;

        let html = match self.client().fetch_page(url, force).await? {
            FetchOutcome::Markup(html) => html,
            FetchOutcome::Blocked => {
                self.logger.warn("✗ Blocked by challenge page");
                return Ok(failed(ProcessingStatus::Blocked));
            }
            FetchOutcome::Failed => {
                self.logger.warn("✗ Failed to fetch");
                return Ok(failed(ProcessingStatus::Failed));
            }
        };

        if is_challenge(&html) {
            self.logger.warn("✗ Blocked by challenge page");
            return Ok(failed(ProcessingStatus::Blocked));
        }

        let extraction = match tokio::task::spawn_blocking(move || extract::extract_html(&html)).await {
            Ok(extraction) => extraction,
            Err(e) => {
                self.logger.error(&format!("✗ Error: {}", e));
                return Ok(failed(ProcessingStatus::Error));
            }
        };

        if extraction.content.full_text.chars().count() < MIN_CONTENT_CHARS {
            self.logger.warn("✗ Insufficient content");
            return Ok(failed(ProcessingStatus::Insufficient));
        }

        let word_count = extraction.content.word_count;
        let section_count = extraction.content.section_count;
        let title = extraction.title.clone();
        let record = PageRecord::html(url.to_string(), extraction.title, extraction.content);
        if let Err(e) = self.storage.store_page(&record).await {
            self.logger.error(&format!("✗ Error: {}", e));
            return Ok(failed(ProcessingStatus::Error));
        }

        self.logger.info(&format!(
            "✓ HTML Success - {} words, {} sections",
            word_count, section_count
        ));
        Ok(ProcessingResult {
            title: Some(title),
            word_count: Some(word_count),
            sections: Some(section_count),
            ..failed(ProcessingStatus::Success)
        })
    }

    async fn process_pdf(&mut self, url: &str) -> ProcessingResult {
        let failed = |status| ProcessingResult::new(url, status, ContentType::Pdf);
        let logger = self.logger.clone().with_prefix("pdf".to_string());

        if !pdf::is_supported() {
            logger.warn("✗ PDF skipped (PDF support not available)");
            return failed(ProcessingStatus::Failed);
        }

        logger.info("→ Downloading PDF...");
        let Some(bytes) = self.client().download(url).await else {
            logger.warn("✗ PDF processing failed");
            return failed(ProcessingStatus::Failed);
        };

        let pdf_path = match self.storage.store_pdf(url, &bytes).await {
            Ok(path) => {
                logger.debug(&format!("Stored {} bytes at {}", bytes.len(), path.display()));
                path
            }
            Err(e) => {
                logger.error(&format!("✗ Error: {}", e));
                return failed(ProcessingStatus::Error);
            }
        };

        let mut content = match tokio::task::spawn_blocking(move || extract::extract_pdf(&bytes)).await {
            Ok(content) => content,
            Err(e) => {
                logger.error(&format!("✗ Error: {}", e));
                return failed(ProcessingStatus::Error);
            }
        };

        if content.error.is_some() || content.full_text.is_empty() {
            logger.warn("⚠ No text extracted from PDF");
            return failed(ProcessingStatus::Insufficient);
        }

        content.pdf_path = Some(pdf_path.display().to_string());
        let word_count = content.word_count;
        let title = pdf::title_from_url(url);
        let record = PageRecord::pdf(url.to_string(), title.clone(), content);
        if let Err(e) = self.storage.store_page(&record).await {
            logger.error(&format!("✗ Error: {}", e));
            return failed(ProcessingStatus::Error);
        }

        logger.info(&format!("✓ PDF Success - {} words", word_count));
        ProcessingResult {
            title: Some(title),
            word_count: Some(word_count),
            ..failed(ProcessingStatus::Success)
        }
    }
}
