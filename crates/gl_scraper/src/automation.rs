use async_trait::async_trait;
use gl_core::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A live browser session able to render pages.
#[async_trait]
pub trait BrowserSession: Send {
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Current rendered markup of the page.
    async fn page_source(&mut self) -> Result<String>;

    /// Waits until `selector` matches; `Ok(false)` on timeout.
    async fn wait_for_element(&mut self, selector: &str, timeout: Duration) -> Result<bool>;

    async fn quit(&mut self) -> Result<()>;
}

/// Creates browser sessions.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}

/// Owner of the single browser session used by the transport client.
///
/// The session is launched on first use and replaced wholesale by
/// [`AutomationHandle::reset`]. Callers must finish with
/// [`AutomationHandle::shutdown`]; dropping a live handle only kills the
/// backend without a clean quit.
pub struct AutomationHandle {
    launcher: Arc<dyn SessionLauncher>,
    session: Option<Box<dyn BrowserSession>>,
    reset_pause: Duration,
    launches: usize,
}

impl AutomationHandle {
    pub fn new(launcher: Arc<dyn SessionLauncher>, reset_pause: Duration) -> Self {
        Self {
            launcher,
            session: None,
            reset_pause,
            launches: 0,
        }
    }

    /// True once a session has been launched successfully at least once.
    pub fn has_launched(&self) -> bool {
        self.launches > 0
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the live session, launching it if needed.
    pub async fn session(&mut self) -> Result<&mut Box<dyn BrowserSession>> {
        if self.session.is_none() {
            let session = self.launcher.launch().await.map_err(|e| match e {
                Error::AutomationSetup(msg) => Error::AutomationSetup(msg),
                other => Error::AutomationSetup(other.to_string()),
            })?;
            self.launches += 1;
            info!("✓ Browser session initialized");
            self.session = Some(session);
        }
        self.session
            .as_mut()
            .ok_or_else(|| Error::AutomationSetup("browser session unavailable".to_string()))
    }

    /// Destroys the current session, pauses, and launches a fresh one.
    pub async fn reset(&mut self) {
        self.close_session().await;
        tokio::time::sleep(self.reset_pause).await;
        if let Err(e) = self.session().await {
            warn!("Failed to recreate browser session: {}", e);
        }
    }

    /// Quits the session if one is running.
    pub async fn shutdown(&mut self) {
        self.close_session().await;
    }

    async fn close_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.quit().await {
                debug!("Browser quit reported an error: {}", e);
            }
        }
    }
}

impl Drop for AutomationHandle {
    fn drop(&mut self) {
        if self.session.is_some() {
            warn!("Automation handle dropped with a live session; forcing teardown");
        }
    }
}
