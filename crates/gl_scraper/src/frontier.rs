use gl_core::urls::{canonicalize, normalize_text, parse_url, resolve};
use gl_core::Result;
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

use crate::config::SiteProfile;

lazy_static! {
    static ref CATEGORY_HEADINGS: Selector = Selector::parse("h2, h3").unwrap();
    static ref HEADINGS: Selector = Selector::parse("h1, h2, h3, h4, h5, h6").unwrap();
    static ref ANCHORS: Selector = Selector::parse("a[href]").unwrap();
}

/// Level of an `h1`..`h6` tag name, `None` for anything else.
pub fn heading_level(tag: &str) -> Option<u8> {
    let mut chars = tag.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('h') | Some('H'), Some(d @ '1'..='6'), None) => d.to_digit(10).map(|d| d as u8),
        _ => None,
    }
}

/// Heading text that introduces guideline links on a category page.
pub fn match_target_heading(text: &str) -> bool {
    let t = normalize_text(text);
    (t.contains("practice") && t.contains("guid")) || (t.contains("supplement") && t.contains("material"))
}

/// Ordered set of URLs: first insertion wins.
#[derive(Debug, Default, Clone)]
pub struct Frontier {
    seen: HashSet<String>,
    links: Vec<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a URL, returning false if it was already present.
    pub fn insert(&mut self, url: String) -> bool {
        if self.seen.insert(url.clone()) {
            self.links.push(url);
            true
        } else {
            false
        }
    }

    pub fn extend<I: IntoIterator<Item = String>>(&mut self, urls: I) {
        for url in urls {
            self.insert(url);
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn into_links(self) -> Vec<String> {
        self.links
    }
}

/// Finds category pages listed under the marker heading of the root page.
pub fn discover_categories(html: &str, profile: &SiteProfile) -> Result<Vec<String>> {
    let root = parse_url(&profile.root_url)?;
    let root_canonical = canonicalize(&profile.root_url);
    let document = Html::parse_document(html);

    let marker = profile.category_marker.to_lowercase();
    let Some(heading) = document
        .select(&CATEGORY_HEADINGS)
        .find(|h| normalize_text(&h.text().collect::<String>()).contains(&marker))
    else {
        return Ok(Vec::new());
    };

    let mut categories = Frontier::new();
    for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
        if matches!(heading_level(sibling.value().name()), Some(1..=3)) {
            break;
        }
        for anchor in sibling.select(&ANCHORS) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if !href.contains(&profile.category_path) {
                continue;
            }
            if let Some(url) = resolve(&root, href) {
                if url != root_canonical {
                    categories.insert(url);
                }
            }
        }
    }

    Ok(categories.into_links())
}

/// Collects guideline links found under the target headings of a category page.
pub fn discover_guideline_links(html: &str, page_url: &str, profile: &SiteProfile) -> Result<Vec<String>> {
    let base = parse_url(page_url)?;
    let page_canonical = canonicalize(page_url);
    let document = Html::parse_document(html);
    let mut links = Frontier::new();

    for heading in document.select(&HEADINGS) {
        if !match_target_heading(&heading.text().collect::<String>()) {
            continue;
        }
        for href in anchors_under_heading(&document, heading) {
            if href.starts_with('#') {
                continue;
            }
            let Some(url) = resolve(&base, &href) else {
                continue;
            };
            if is_valid_content_link(&url, &page_canonical, profile) {
                links.insert(url);
            }
        }
    }

    Ok(links.into_links())
}

/// Hrefs in document order from just after `heading` up to the next heading
/// of the same or a higher level.
fn anchors_under_heading(document: &Html, heading: ElementRef<'_>) -> Vec<String> {
    let level = heading_level(heading.value().name()).unwrap_or(6);
    let mut hrefs = Vec::new();
    let mut started = false;

    for node in document.tree.root().descendants() {
        if !started {
            started = node.id() == heading.id();
            continue;
        }
        let Some(element) = node.value().as_element() else {
            continue;
        };
        if let Some(next_level) = heading_level(element.name()) {
            if next_level <= level {
                break;
            }
        }
        if element.name() == "a" {
            if let Some(href) = element.attr("href") {
                if !href.is_empty() {
                    hrefs.push(href.to_string());
                }
            }
        }
    }

    hrefs
}

/// Decides whether a resolved link points at guideline content.
pub fn is_valid_content_link(url: &str, base_url: &str, profile: &SiteProfile) -> bool {
    if url.is_empty() || url == base_url {
        return false;
    }

    let lowered = url.to_lowercase();
    if profile.reject_patterns.iter().any(|p| lowered.contains(p.as_str())) {
        return false;
    }

    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let host = parsed.host_str().unwrap_or_default().to_lowercase();

    if profile.journal_hosts.iter().any(|h| host.contains(h.as_str())) {
        return true;
    }

    if parsed.path().to_lowercase().ends_with(".pdf") || url.contains(&profile.file_store_path) {
        return true;
    }

    if host.contains(&profile.site_domain) {
        if let Ok(base) = Url::parse(base_url) {
            let base_path = base.path().trim_end_matches('/');
            let url_path = parsed.path().trim_end_matches('/');
            return url_path.len() > base_path.len()
                && url_path.starts_with(base_path)
                && url_path[base_path.len()..].starts_with('/');
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATEGORY_URL: &str = "https://www.aasld.org/practice-guidelines/hepatitis-b";

    #[test]
    fn test_heading_level() {
        assert_eq!(heading_level("h2"), Some(2));
        assert_eq!(heading_level("h7"), None);
        assert_eq!(heading_level("header"), None);
        assert_eq!(heading_level("p"), None);
    }

    #[test]
    fn test_match_target_heading() {
        assert!(match_target_heading("Practice Guidance"));
        assert!(match_target_heading("AASLD Practice Guidelines"));
        assert!(match_target_heading("Supplementary  Material"));
        assert!(!match_target_heading("Related News"));
    }

    #[test]
    fn test_frontier_preserves_first_seen_order() {
        let mut frontier = Frontier::new();
        frontier.extend(vec!["b".to_string(), "a".to_string(), "b".to_string(), "c".to_string()]);
        assert_eq!(frontier.links(), &["b", "a", "c"]);
    }

    #[test]
    fn test_discover_categories() {
        let html = r#"
            <html><body>
              <h2>Featured</h2>
              <div><a href="/practice-guidelines/featured">Featured</a></div>
              <h2>Guidelines and Guidance by Disease</h2>
              <ul>
                <li><a href="/practice-guidelines/hepatitis-b">Hepatitis B</a></li>
                <li><a href="/practice-guidelines/hepatitis-c/">Hepatitis C</a></li>
                <li><a href="/practice-guidelines/hepatitis-b#top">Hepatitis B again</a></li>
                <li><a href="/about">About</a></li>
              </ul>
              <div><a href="/practice-guidelines/">Root</a></div>
              <h3>Other</h3>
              <div><a href="/practice-guidelines/other">Other</a></div>
            </body></html>
        "#;
        let categories = discover_categories(html, &SiteProfile::default()).unwrap();
        assert_eq!(
            categories,
            vec![
                "https://www.aasld.org/practice-guidelines/hepatitis-b".to_string(),
                "https://www.aasld.org/practice-guidelines/hepatitis-c".to_string(),
            ]
        );
    }

    #[test]
    fn test_discover_categories_without_marker() {
        let html = "<html><body><h2>Nothing here</h2><a href='/practice-guidelines/x'>x</a></body></html>";
        assert!(discover_categories(html, &SiteProfile::default()).unwrap().is_empty());
    }

    #[test]
    fn test_practice_guidance_links_filtered_and_ordered() {
        let html = r#"
            <html><body>
              <h2>Overview</h2>
              <p><a href="https://doi.org/10.1097/overview">Not under target</a></p>
              <h2>Practice Guidance</h2>
              <div>
                <p><a href="https://journals.lww.com/hep/fulltext/2023/guidance">Guidance</a></p>
                <p><a href="https://www.facebook.com/aasld">Share</a></p>
                <p><a href="/sites/default/files/2023-01/hbv-update.pdf">PDF</a></p>
                <p><a href="https://journals.lww.com/hep/fulltext/2023/guidance#sec">Dup</a></p>
              </div>
              <h2>Resources</h2>
              <p><a href="https://doi.org/10.1097/later">Later</a></p>
            </body></html>
        "#;
        let links = discover_guideline_links(html, CATEGORY_URL, &SiteProfile::default()).unwrap();
        assert_eq!(
            links,
            vec![
                "https://journals.lww.com/hep/fulltext/2023/guidance".to_string(),
                "https://www.aasld.org/sites/default/files/2023-01/hbv-update.pdf".to_string(),
            ]
        );
    }

    #[test]
    fn test_subheadings_stay_in_scope() {
        let html = r#"
            <h2>Supplemental Materials</h2>
            <h3>Slides</h3>
            <a href="/practice-guidelines/hepatitis-b/slides">Slides</a>
            <h2>Next</h2>
        "#;
        let links = discover_guideline_links(html, CATEGORY_URL, &SiteProfile::default()).unwrap();
        assert_eq!(links, vec!["https://www.aasld.org/practice-guidelines/hepatitis-b/slides".to_string()]);
    }

    #[test]
    fn test_is_valid_content_link() {
        let profile = SiteProfile::default();
        let valid = |u: &str| is_valid_content_link(u, CATEGORY_URL, &profile);

        assert!(valid("https://doi.org/10.1002/hep.32086"));
        assert!(valid("https://pubmed.ncbi.nlm.nih.gov/123456"));
        assert!(valid("https://cdn.example.org/guidance.pdf"));
        assert!(valid("https://www.aasld.org/practice-guidelines/hepatitis-b/treatment"));
        assert!(!valid(CATEGORY_URL));
        assert!(!valid("https://www.aasld.org/practice-guidelines/hepatitis-bc"));
        assert!(!valid("https://www.aasld.org/practice-guidelines/hepatitis-c"));
        assert!(!valid("https://www.aasld.org/contact"));
        assert!(!valid("https://twitter.com/aasld"));
        assert!(!valid("https://example.com/page"));
    }
}
