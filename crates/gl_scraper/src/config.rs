use std::time::Duration;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Timing and routing knobs for the transport client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Sleep before every lightweight HTTP request.
    pub http_delay: Duration,
    /// Sleep before every browser navigation.
    pub browser_delay: Duration,
    /// Pause after navigation before the first challenge check.
    pub settle_time: Duration,
    /// Extra wait when a challenge page is showing.
    pub challenge_wait: Duration,
    /// Pause before re-navigating after a failed challenge resolution.
    pub retry_pause: Duration,
    /// How long to wait for `body` to appear.
    pub element_wait: Duration,
    /// Pause between destroying and recreating a crashed session.
    pub reset_pause: Duration,
    pub page_load_timeout: Duration,
    pub request_timeout: Duration,
    /// Total navigations allowed per browser fetch.
    pub max_navigations: u32,
    /// Hosts that are only ever fetched with the browser.
    pub automation_hosts: Vec<String>,
    pub user_agent: String,
    pub accept: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            http_delay: Duration::from_millis(1500),
            browser_delay: Duration::from_secs(5),
            settle_time: Duration::from_secs(3),
            challenge_wait: Duration::from_secs(15),
            retry_pause: Duration::from_secs(10),
            element_wait: Duration::from_secs(15),
            reset_pause: Duration::from_secs(2),
            page_load_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
            max_navigations: 2,
            automation_hosts: vec!["journals.lww.com".to_string()],
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
        }
    }
}

impl FetchConfig {
    /// Config with every delay set to zero.
    pub fn immediate() -> Self {
        Self {
            http_delay: Duration::ZERO,
            browser_delay: Duration::ZERO,
            settle_time: Duration::ZERO,
            challenge_wait: Duration::ZERO,
            retry_pause: Duration::ZERO,
            element_wait: Duration::ZERO,
            reset_pause: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn requires_automation(&self, url: &str) -> bool {
        let host = match Url::parse(url) {
            Ok(parsed) => parsed.host_str().map(str::to_lowercase),
            Err(_) => None,
        };
        let Some(host) = host else {
            return false;
        };
        self.automation_hosts
            .iter()
            .any(|h| host == *h || host.ends_with(&format!(".{}", h)))
    }
}

/// Where the guideline listing lives and how its links are recognised.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub root_url: String,
    /// Phrase identifying the heading above the category list.
    pub category_marker: String,
    /// Path fragment every category page link contains.
    pub category_path: String,
    pub site_domain: String,
    /// Hosts whose links are always guideline content.
    pub journal_hosts: Vec<String>,
    /// Path segment of the site's file store.
    pub file_store_path: String,
    pub reject_patterns: Vec<String>,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            root_url: "https://www.aasld.org/practice-guidelines".to_string(),
            category_marker: "guidelines and guidance by disease".to_string(),
            category_path: "/practice-guidelines/".to_string(),
            site_domain: "aasld.org".to_string(),
            journal_hosts: vec![
                "journals.lww.com".to_string(),
                "doi.org".to_string(),
                "pubmed".to_string(),
            ],
            file_store_path: "/sites/default/files/".to_string(),
            reject_patterns: [
                "/forums",
                "/home",
                "/about",
                "/contact",
                "/subscribe",
                "facebook.com",
                "twitter.com",
                "linkedin.com",
                "youtube.com",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}
