use async_trait::async_trait;
use gl_core::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::automation::AutomationHandle;
use crate::challenge::is_challenge;
use crate::config::FetchConfig;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Plain HTTP GET.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

pub struct ReqwestBackend {
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let accept = HeaderValue::from_str(&config.accept)
            .map_err(|e| Error::Config(format!("Invalid Accept header: {}", e)))?;
        headers.insert(ACCEPT, accept);

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(HttpResponse { status, body })
    }
}

/// Result of a fetch, distinguishing challenge blocks from plain failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Markup(String),
    /// An anti-bot challenge never cleared.
    Blocked,
    Failed,
}

impl FetchOutcome {
    pub fn into_markup(self) -> Option<String> {
        match self {
            FetchOutcome::Markup(html) => Some(html),
            FetchOutcome::Blocked | FetchOutcome::Failed => None,
        }
    }
}

/// What a single browser navigation produced.
enum LoadOutcome {
    Page(String),
    /// Challenge did not clear; another navigation may help.
    Challenged,
    /// Challenge reappeared after the page loaded; give up.
    Blocked,
}

/// Fetch dispatcher choosing between plain HTTP and the browser.
///
/// Every request is preceded by the configured delay, retries included.
/// Page content is never cached.
pub struct TransportClient<'a> {
    http: Arc<dyn HttpBackend>,
    automation: &'a mut AutomationHandle,
    config: FetchConfig,
}

impl<'a> TransportClient<'a> {
    pub fn new(
        http: Arc<dyn HttpBackend>,
        automation: &'a mut AutomationHandle,
        config: FetchConfig,
    ) -> Self {
        Self {
            http,
            automation,
            config,
        }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetches markup for `url`, or `None` when every backend failed.
    ///
    /// The only error returned is a browser that cannot be started the
    /// first time it is needed.
    pub async fn fetch(&mut self, url: &str, force_automation: bool) -> Result<Option<String>> {
        Ok(self.fetch_page(url, force_automation).await?.into_markup())
    }

    /// Like [`TransportClient::fetch`] but reports why nothing came back.
    pub async fn fetch_page(&mut self, url: &str, force_automation: bool) -> Result<FetchOutcome> {
        if force_automation || self.config.requires_automation(url) {
            return self.fetch_with_browser(url).await;
        }

        match self.fetch_with_http(url).await {
            Some(html) if !is_challenge(&html) => return Ok(FetchOutcome::Markup(html)),
            Some(_) => info!("    → Challenge page served, falling back to browser..."),
            None => info!("    → Browser fallback..."),
        }
        self.fetch_with_browser(url).await
    }

    /// Downloads raw bytes over plain HTTP, e.g. a PDF.
    pub async fn download(&mut self, url: &str) -> Option<Vec<u8>> {
        tokio::time::sleep(self.config.http_delay).await;
        match self.http.get(url).await {
            Ok(response) if response.is_success() => {
                info!("    ✓ Downloaded {} bytes", response.body.len());
                Some(response.body)
            }
            Ok(response) => {
                warn!("    ✗ Download failed (status: {})", response.status);
                None
            }
            Err(e) => {
                warn!("    ✗ Download error: {}", e);
                None
            }
        }
    }

    async fn fetch_with_http(&mut self, url: &str) -> Option<String> {
        tokio::time::sleep(self.config.http_delay).await;
        match self.http.get(url).await {
            Ok(response) if response.is_success() && !response.body.is_empty() => {
                Some(String::from_utf8_lossy(&response.body).into_owned())
            }
            Ok(response) => {
                debug!("HTTP {} for {}", response.status, url);
                None
            }
            Err(e) => {
                debug!("HTTP request failed for {}: {}", url, e);
                None
            }
        }
    }

    async fn fetch_with_browser(&mut self, url: &str) -> Result<FetchOutcome> {
        let max_navigations = self.config.max_navigations.max(1);

        for attempt in 1..=max_navigations {
            tokio::time::sleep(self.config.browser_delay).await;

            let first_launch = !self.automation.has_launched();
            if let Err(e) = self.automation.session().await {
                if first_launch {
                    return Err(e);
                }
                warn!("    ✗ Browser unavailable: {}", e);
                return Ok(FetchOutcome::Failed);
            }

            info!("    → Loading with browser...");
            match self.load_once(url).await {
                Ok(LoadOutcome::Page(html)) => return Ok(FetchOutcome::Markup(html)),
                Ok(LoadOutcome::Blocked) => {
                    warn!("    ✗ Challenge persists after load");
                    return Ok(FetchOutcome::Blocked);
                }
                Ok(LoadOutcome::Challenged) if attempt < max_navigations => {
                    info!("    → Retrying ({}/{})...", attempt + 1, max_navigations);
                    tokio::time::sleep(self.config.retry_pause).await;
                }
                Ok(LoadOutcome::Challenged) => {
                    warn!("    ✗ Challenge not resolved after {} navigations", attempt);
                    return Ok(FetchOutcome::Blocked);
                }
                Err(e) => {
                    warn!("    ✗ Browser error: {}", e);
                    self.automation.reset().await;
                    return Ok(FetchOutcome::Failed);
                }
            }
        }

        Ok(FetchOutcome::Failed)
    }

    async fn load_once(&mut self, url: &str) -> Result<LoadOutcome> {
        let settle_time = self.config.settle_time;
        let challenge_wait = self.config.challenge_wait;
        let element_wait = self.config.element_wait;
        let session = self.automation.session().await?;

        session.navigate(url).await?;
        tokio::time::sleep(settle_time).await;

        if is_challenge(&session.page_source().await?) {
            info!("    → Challenge detected, waiting {}s...", challenge_wait.as_secs());
            tokio::time::sleep(challenge_wait).await;
            if is_challenge(&session.page_source().await?) {
                return Ok(LoadOutcome::Challenged);
            }
        }

        if !session.wait_for_element("body", element_wait).await.unwrap_or(false) {
            debug!("body element not found within {}s", element_wait.as_secs());
        }

        let html = session.page_source().await?;
        if is_challenge(&html) {
            return Ok(LoadOutcome::Blocked);
        }
        Ok(LoadOutcome::Page(html))
    }
}
