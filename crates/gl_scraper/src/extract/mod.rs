//! Structural extraction of fetched documents.
//!
//! HTML pages become sections, tables, paragraphs and links; PDFs become
//! page text and sentence-grouped paragraphs.

pub mod html;
pub mod pdf;

pub use html::{extract_html, HtmlExtraction};
pub use pdf::extract_pdf;

/// Whether a URL should be handled as a PDF download.
pub fn is_pdf_url(url: &str) -> bool {
    url.split(['?', '#'])
        .next()
        .is_some_and(|path| path.to_lowercase().ends_with(".pdf"))
}
