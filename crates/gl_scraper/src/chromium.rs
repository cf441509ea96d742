use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use gl_core::{Error, Result};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::automation::{BrowserSession, SessionLauncher};
use crate::config::FetchConfig;

const HIDE_WEBDRIVER: &str =
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined})";
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Launches headless Chromium through the DevTools protocol.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    user_agent: String,
    page_load_timeout: Duration,
}

impl ChromiumLauncher {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            page_load_timeout: config.page_load_timeout,
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        BrowserConfig::builder()
            .no_sandbox()
            .window_size(1920, 1080)
            .request_timeout(self.page_load_timeout)
            .args(vec![
                "--disable-dev-shm-usage".to_string(),
                "--disable-blink-features=AutomationControlled".to_string(),
                "--disable-gpu".to_string(),
                "--disable-extensions".to_string(),
                format!("--user-agent={}", self.user_agent),
            ])
            .build()
            .map_err(Error::AutomationSetup)
    }
}

#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        let (browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(|e| Error::AutomationSetup(e.to_string()))?;

        // The handler drives the CDP connection and must be polled for the
        // browser's whole lifetime.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler event error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| Error::AutomationSetup(e.to_string()))?;
        page.evaluate_on_new_document(HIDE_WEBDRIVER)
            .await
            .map_err(|e| Error::AutomationSetup(e.to_string()))?;

        Ok(Box::new(ChromiumSession {
            browser,
            page,
            handler_task,
            page_load_timeout: self.page_load_timeout,
        }))
    }
}

pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    page_load_timeout: Duration,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        match tokio::time::timeout(self.page_load_timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(Error::Browser(e.to_string())),
            Err(_) => Err(Error::Browser(format!("page load timed out: {}", url))),
        }
    }

    async fn page_source(&mut self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| Error::Browser(e.to_string()))
    }

    async fn wait_for_element(&mut self, selector: &str, timeout: Duration) -> Result<bool> {
        let started = Instant::now();
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(true);
            }
            if started.elapsed() >= timeout {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn quit(&mut self) -> Result<()> {
        let closed = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        closed
            .map(|_| ())
            .map_err(|e| Error::Browser(e.to_string()))
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        // Browser's own drop kills the child process; stop polling its socket.
        self.handler_task.abort();
    }
}
