use sha2::{Digest, Sha256};
use url::Url;

use crate::{Error, Result};

/// Canonical identity of a page: fragment dropped, trailing slashes dropped.
pub fn canonicalize(url: &str) -> String {
    let without_fragment = url.split('#').next().unwrap_or_default();
    without_fragment.trim_end_matches('/').to_string()
}

/// Hex SHA-256 of the canonical URL, used verbatim as a filename stem.
pub fn content_hash(url: &str) -> String {
    let digest = Sha256::digest(canonicalize(url).as_bytes());
    format!("{:x}", digest)
}

/// Resolves `href` against `base` and canonicalizes the result.
pub fn resolve(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).ok().map(|u| canonicalize(u.as_str()))
}

pub fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))
}

/// Lower-cased, whitespace-collapsed text used for heading matching.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
