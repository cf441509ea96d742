/// Literal markers served by anti-bot interstitials instead of real content.
pub const CHALLENGE_MARKERS: &[&str] = &[
    "Just a moment",
    "Verify you are human",
    "Checking your browser",
];

/// Returns true if the markup looks like a challenge page.
pub fn is_challenge(markup: &str) -> bool {
    CHALLENGE_MARKERS.iter().any(|marker| markup.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_markers() {
        assert!(is_challenge("<title>Just a moment...</title>"));
        assert!(is_challenge("<p>Verify you are human by completing</p>"));
        assert!(is_challenge("Checking your browser before accessing"));
    }

    #[test]
    fn test_regular_page_is_not_challenge() {
        assert!(!is_challenge("<html><body><h1>Hepatitis B Guidance</h1></body></html>"));
        assert!(!is_challenge(""));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        assert!(!is_challenge("just a moment"));
    }
}
