use chrono::{DateTime, Utc};
use gl_core::{
    CleanedContent, CleanedHtmlContent, CleanedPdfContent, CleanedRecord, CleanedTable,
    HtmlContent, PageContent, PageRecord, PdfContent, Section,
};

use crate::entities::{extract_clinical_values, extract_recommendations};
use crate::text::TextCleaner;

/// Cleaned section items and PDF paragraphs must be longer than this.
pub const MIN_ITEM_CHARS: usize = 10;

/// Sections whose cleaned heading mentions any of these are page chrome.
pub const CHROME_HEADINGS: &[&str] = &["logo", "navigation", "cookie", "privacy"];

/// Turns raw [`PageRecord`]s into [`CleanedRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct RecordCleaner {
    text: TextCleaner,
}

impl RecordCleaner {
    pub fn new(text: TextCleaner) -> Self {
        Self { text }
    }

    pub fn text_cleaner(&self) -> &TextCleaner {
        &self.text
    }

    pub fn clean_text(&self, text: &str) -> String {
        self.text.clean(text)
    }

    /// `file_id` is the stem of the raw record file; `cleaned_at` is stamped as given.
    pub fn clean_record(
        &self,
        record: &PageRecord,
        file_id: &str,
        cleaned_at: DateTime<Utc>,
    ) -> CleanedRecord {
        let content = match &record.content {
            PageContent::Html(html) => CleanedContent::Html(self.clean_html(html)),
            PageContent::Pdf(pdf) => CleanedContent::Pdf(self.clean_pdf(pdf)),
        };

        CleanedRecord {
            file_id: file_id.to_string(),
            page_url: record.source_url.clone(),
            page_title: self.clean_text(&record.title),
            content_type: record.content_type,
            crawled_at: record.fetch_timestamp,
            accessible: record.accessible,
            content,
            cleaned_at,
        }
    }

    fn clean_html(&self, html: &HtmlContent) -> CleanedHtmlContent {
        let full_text = self.clean_text(&html.full_text);

        let sections: Vec<Section> = html
            .sections
            .iter()
            .filter_map(|section| self.clean_section(section))
            .collect();

        let tables: Vec<CleanedTable> = html
            .tables
            .iter()
            .map(|table| CleanedTable {
                caption: self.clean_text(table.caption.as_deref().unwrap_or_default()),
                headers: table.headers.iter().map(|h| self.clean_text(h)).collect(),
                rows: table
                    .rows
                    .iter()
                    .map(|row| row.iter().map(|cell| self.clean_text(cell)).collect())
                    .collect(),
            })
            .collect();

        CleanedHtmlContent {
            recommendations: extract_recommendations(&full_text, &self.text),
            clinical_values: extract_clinical_values(&full_text),
            full_text,
            links: html.links.clone(),
            word_count: html.word_count,
            paragraph_count: html.paragraph_count,
            section_count: sections.len(),
            table_count: tables.len(),
            sections,
            tables,
        }
    }

    fn clean_section(&self, section: &Section) -> Option<Section> {
        let heading = self.clean_text(&section.heading);
        let lowered = heading.to_lowercase();
        if CHROME_HEADINGS.iter().any(|chrome| lowered.contains(chrome)) {
            return None;
        }

        let content: Vec<String> = section
            .content
            .iter()
            .map(|item| self.clean_text(item))
            .filter(|item| item.chars().count() > MIN_ITEM_CHARS)
            .collect();

        if heading.is_empty() && content.is_empty() {
            return None;
        }
        Some(Section {
            heading,
            level: section.level,
            content,
        })
    }

    fn clean_pdf(&self, pdf: &PdfContent) -> CleanedPdfContent {
        let full_text = self.clean_text(&pdf.full_text);
        let paragraphs: Vec<String> = pdf
            .paragraphs
            .iter()
            .map(|p| self.clean_text(p))
            .filter(|p| p.chars().count() > MIN_ITEM_CHARS)
            .collect();

        CleanedPdfContent {
            recommendations: extract_recommendations(&full_text, &self.text),
            clinical_values: extract_clinical_values(&full_text),
            full_text,
            word_count: pdf.word_count,
            paragraph_count: paragraphs.len(),
            page_count: pdf.page_count,
            paragraphs,
        }
    }
}
