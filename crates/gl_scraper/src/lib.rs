pub mod automation;
pub mod challenge;
pub mod chromium;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod frontier;
pub mod logging;
pub mod transport;

pub use automation::{AutomationHandle, BrowserSession, SessionLauncher};
pub use chromium::ChromiumLauncher;
pub use config::{FetchConfig, SiteProfile};
pub use crawler::{CrawlSettings, Crawler, RunStats};
pub use transport::{FetchOutcome, HttpBackend, HttpResponse, ReqwestBackend, TransportClient};

pub mod prelude {
    pub use super::crawler::{CrawlSettings, Crawler};
    pub use super::transport::TransportClient;
    pub use gl_core::{Error, PageRecord, Result};
}
