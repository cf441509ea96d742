use gl_core::{Error, PdfContent, Result};
use tracing::{info, warn};

/// Sentences needed before a paragraph is flushed.
pub const SENTENCES_PER_PARAGRAPH: usize = 3;
/// Sentences this short are dropped from paragraphs.
const MIN_SENTENCE_CHARS: usize = 20;

/// Whether this build can read PDFs.
pub const fn is_supported() -> bool {
    cfg!(feature = "pdf")
}

/// Text of every page that could be read; failing pages are skipped.
#[cfg(feature = "pdf")]
fn page_texts(bytes: &[u8]) -> Result<(usize, Vec<String>)> {
    let document = lopdf::Document::load_mem(bytes).map_err(|e| Error::Pdf(e.to_string()))?;
    if document.is_encrypted() {
        return Err(Error::Pdf("PDF is encrypted".to_string()));
    }

    let pages = document.get_pages();
    let mut texts = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        match document.extract_text(&[*page_number]) {
            Ok(text) if !text.trim().is_empty() => texts.push(text),
            Ok(_) => {}
            Err(e) => warn!("    ⚠ Error on page {}: {}", page_number, e),
        }
    }
    Ok((pages.len(), texts))
}

#[cfg(not(feature = "pdf"))]
fn page_texts(_bytes: &[u8]) -> Result<(usize, Vec<String>)> {
    Err(Error::Pdf("PDF support not compiled in".to_string()))
}

/// Extracts text and paragraphs; never fails, sets `error` instead.
pub fn extract_pdf(bytes: &[u8]) -> PdfContent {
    info!("    → Extracting text from PDF...");
    let (page_count, texts) = match page_texts(bytes) {
        Ok(result) => result,
        Err(e) => {
            warn!("    ✗ PDF extraction error: {}", e);
            return empty_with_error(0, e.to_string());
        }
    };

    let full_text = collapse_whitespace(&texts.join("\n\n"));
    if full_text.is_empty() {
        return empty_with_error(page_count, "No text extracted from PDF".to_string());
    }

    let paragraphs = split_paragraphs(&full_text);
    let char_count = full_text.chars().count();
    info!("    ✓ Extracted {} characters, {} paragraphs", char_count, paragraphs.len());

    PdfContent {
        full_text_length: char_count,
        page_count,
        word_count: full_text.split_whitespace().count(),
        char_count,
        paragraph_count: paragraphs.len(),
        paragraphs,
        full_text,
        pdf_path: None,
        error: None,
    }
}

fn empty_with_error(page_count: usize, error: String) -> PdfContent {
    PdfContent {
        page_count,
        error: Some(error),
        ..Default::default()
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits after `.`, `!` or `?` when whitespace and an uppercase letter follow.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let end = i + c.len_utf8();
        let rest = &text[end..];
        let trimmed = rest.trim_start();
        if trimmed.len() == rest.len() {
            continue;
        }
        if trimmed.chars().next().is_some_and(|n| n.is_ascii_uppercase()) {
            sentences.push(&text[start..end]);
            start = text.len() - trimmed.len();
            while chars.peek().is_some_and(|(j, _)| *j < start) {
                chars.next();
            }
        }
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

/// Groups qualifying sentences three at a time; a shorter tail is kept.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let text = collapse_whitespace(text);
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for sentence in split_sentences(&text) {
        let sentence = sentence.trim();
        if sentence.chars().count() <= MIN_SENTENCE_CHARS {
            continue;
        }
        current.push(sentence);
        if current.len() >= SENTENCES_PER_PARAGRAPH {
            paragraphs.push(current.join(" "));
            current.clear();
        }
    }

    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }
    paragraphs
}

/// Title derived from the last URL segment.
pub fn title_from_url(url: &str) -> String {
    let name = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
    let name = name
        .strip_suffix(".pdf")
        .or_else(|| name.strip_suffix(".PDF"))
        .unwrap_or(name);
    name.replace(['_', '-'], " ")
}
