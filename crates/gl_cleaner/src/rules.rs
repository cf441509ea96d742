//! Versioned boilerplate rule table for the text cleaner.

use gl_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const RULES_VERSION: u32 = 1;

const DEFAULT_BOILERPLATE: &[&str] = &[
    "AASLD PublicationsHepatologyLiver TransplantationHepatology CommunicationsClinical Liver Disease",
    "Visit our other sites",
    "Log inorRegister",
    "Subscribe to journal",
    "Get new issue alerts",
    r"AASLD Member\? Login here",
    "Subscribe to eTOC",
    "Enter your Email address:",
    "Privacy Policy",
    "Journal Logo",
    "ArticlesArticlesAdvanced Search",
    "Toggle navigation",
    "BrowsingHistory",
    "Back to Top",
    "Never Miss an Issue",
    "Get new journal Tables of Contents",
    "Customer Service",
    "Contact us at:",
    "Submit a Service Request",
    "Manage Cookie Preferences",
    "Copyright.*American Association for the Study of Liver Diseases",
    "Content use for text and data mining and artificial intelligence training is not permitted",
    "Your PrivacyTo give you the best possible experience",
    "Accept All Cookies",
    "Privacy Preference Center",
    "Strictly Necessary Cookies",
    "Functional Cookies",
    "Performance Cookies",
    "Advertising Cookies",
    "Flash Player.*required",
    "Get Adobe Flash Player",
    "Email to Colleague",
    "Colleague's E-mail is Invalid",
    "Your message has been successfully sent",
    "Some error has occurred while processing your request",
    "Export toEnd Note",
    "ProciteReference Manager",
    "Save my selection",
    "DownloadPDF",
    "CiteCopy",
    "ShareEmailFacebookXLinkedIn",
    "FavoritesPermissions",
    "Related Articles",
    "Readers Of this Article Also Read",
    "Most Popular",
];

/// One ordered `(pattern, replacement)` step. Patterns match case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoilerplateRule {
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
}

impl BoilerplateRule {
    pub fn strip(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            replacement: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningRules {
    pub version: u32,
    #[serde(default)]
    pub boilerplate: Vec<BoilerplateRule>,
    /// Everything from the first occurrence of any marker to the end is dropped.
    /// Markers are matched case-sensitively.
    #[serde(default)]
    pub truncate_after: Vec<String>,
}

impl Default for CleaningRules {
    fn default() -> Self {
        Self {
            version: RULES_VERSION,
            boilerplate: DEFAULT_BOILERPLATE
                .iter()
                .map(|p| BoilerplateRule::strip(p))
                .collect(),
            truncate_after: vec!["Copyright".to_string()],
        }
    }
}

impl CleaningRules {
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let rules: Self = toml::from_str(toml_str)
            .map_err(|e| Error::Config(format!("Failed to parse cleaning rules: {}", e)))?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize cleaning rules: {}", e)))
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let data = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&data)
    }

    pub fn validate(&self) -> Result<()> {
        if self.version == 0 || self.version > RULES_VERSION {
            return Err(Error::Config(format!(
                "Unsupported cleaning rules version {} (expected 1..={})",
                self.version, RULES_VERSION
            )));
        }
        if self.boilerplate.iter().any(|r| r.pattern.is_empty()) {
            return Err(Error::Config("Boilerplate pattern must not be empty".to_string()));
        }
        if self.truncate_after.iter().any(|m| m.is_empty()) {
            return Err(Error::Config("Truncation marker must not be empty".to_string()));
        }
        Ok(())
    }
}
