use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Html,
    Pdf,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Html => "html",
            ContentType::Pdf => "pdf",
        }
    }
}

/// A document as harvested, one per successful fetch attempt.
///
/// `content_type` always agrees with the `content` variant; build records
/// through [`PageRecord::html`] and [`PageRecord::pdf`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    #[serde(rename = "page_url")]
    pub source_url: String,
    #[serde(rename = "page_title")]
    pub title: String,
    pub content_type: ContentType,
    #[serde(rename = "crawled_at")]
    pub fetch_timestamp: DateTime<Utc>,
    pub accessible: bool,
    pub content: PageContent,
}

impl PageRecord {
    pub fn html(source_url: String, title: String, content: HtmlContent) -> Self {
        Self {
            source_url,
            title,
            content_type: ContentType::Html,
            fetch_timestamp: Utc::now(),
            accessible: true,
            content: PageContent::Html(content),
        }
    }

    pub fn pdf(source_url: String, title: String, content: PdfContent) -> Self {
        Self {
            source_url,
            title,
            content_type: ContentType::Pdf,
            fetch_timestamp: Utc::now(),
            accessible: true,
            content: PageContent::Pdf(content),
        }
    }

    pub fn full_text(&self) -> &str {
        match &self.content {
            PageContent::Html(html) => &html.full_text,
            PageContent::Pdf(pdf) => &pdf.full_text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageContent {
    Html(HtmlContent),
    Pdf(PdfContent),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HtmlContent {
    pub full_text: String,
    #[serde(default)]
    pub full_text_length: usize,
    #[serde(default)]
    pub paragraph_count: usize,
    #[serde(default)]
    pub word_count: usize,
    #[serde(default)]
    pub char_count: usize,
    #[serde(default)]
    pub section_count: usize,
    #[serde(default)]
    pub table_count: usize,
    pub sections: Vec<Section>,
    #[serde(default)]
    pub tables: Vec<Table>,
    /// First links found on the page; `links_count` is the full total.
    #[serde(default)]
    pub links: Vec<LinkRef>,
    #[serde(default)]
    pub links_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub heading: String,
    #[serde(default = "default_level")]
    pub level: u8,
    #[serde(default)]
    pub content: Vec<String>,
}

fn default_level() -> u8 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub table_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
    #[serde(default)]
    pub row_count: usize,
    #[serde(default)]
    pub column_count: usize,
}

impl Table {
    /// Builds a table, dropping rows equal to the header row and deriving counts.
    pub fn new(table_index: usize, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let rows: Vec<Vec<String>> = rows
            .into_iter()
            .filter(|row| !row.is_empty() && *row != headers)
            .collect();
        let column_count = if headers.is_empty() {
            rows.first().map(Vec::len).unwrap_or(0)
        } else {
            headers.len()
        };
        Self {
            table_index,
            caption: None,
            row_count: rows.len(),
            column_count,
            headers,
            rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRef {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfContent {
    pub full_text: String,
    #[serde(default)]
    pub full_text_length: usize,
    pub page_count: usize,
    #[serde(default)]
    pub word_count: usize,
    #[serde(default)]
    pub char_count: usize,
    #[serde(default)]
    pub paragraph_count: usize,
    #[serde(default)]
    pub paragraphs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_path: Option<String>,
    /// Set when no text could be extracted; the record is then insufficient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    Strong,
    Conditional,
    Weak,
}

impl Grade {
    pub fn parse(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "strong" => Some(Grade::Strong),
            "conditional" => Some(Grade::Conditional),
            "weak" => Some(Grade::Weak),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub number: String,
    pub text: String,
    pub grade: Option<Grade>,
    pub certainty: Option<String>,
    pub raw_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = "≥")]
    AtLeast,
    #[serde(rename = "≤")]
    AtMost,
    #[serde(rename = "<")]
    Below,
    #[serde(rename = ">")]
    Above,
}

impl Comparator {
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "≥" | ">=" => Some(Comparator::AtLeast),
            "≤" | "<=" => Some(Comparator::AtMost),
            "<" => Some(Comparator::Below),
            ">" => Some(Comparator::Above),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::AtLeast => "≥",
            Comparator::AtMost => "≤",
            Comparator::Below => "<",
            Comparator::Above => ">",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClinicalValue {
    Dosage {
        value: String,
        number: String,
        unit: String,
    },
    Threshold {
        value: String,
        operator: Comparator,
        number: String,
        unit: String,
    },
}

/// Cleaned, entity-annotated view of a [`PageRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub file_id: String,
    pub page_url: String,
    pub page_title: String,
    pub content_type: ContentType,
    pub crawled_at: DateTime<Utc>,
    pub accessible: bool,
    pub content: CleanedContent,
    pub cleaned_at: DateTime<Utc>,
}

impl CleanedRecord {
    pub fn recommendations(&self) -> &[Recommendation] {
        match &self.content {
            CleanedContent::Html(html) => &html.recommendations,
            CleanedContent::Pdf(pdf) => &pdf.recommendations,
        }
    }

    pub fn clinical_values(&self) -> &[ClinicalValue] {
        match &self.content {
            CleanedContent::Html(html) => &html.clinical_values,
            CleanedContent::Pdf(pdf) => &pdf.clinical_values,
        }
    }

    pub fn word_count(&self) -> usize {
        match &self.content {
            CleanedContent::Html(html) => html.word_count,
            CleanedContent::Pdf(pdf) => pdf.word_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CleanedContent {
    Html(CleanedHtmlContent),
    Pdf(CleanedPdfContent),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanedHtmlContent {
    pub full_text: String,
    pub sections: Vec<Section>,
    pub tables: Vec<CleanedTable>,
    pub links: Vec<LinkRef>,
    pub recommendations: Vec<Recommendation>,
    pub clinical_values: Vec<ClinicalValue>,
    pub word_count: usize,
    pub paragraph_count: usize,
    pub section_count: usize,
    pub table_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedTable {
    pub caption: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanedPdfContent {
    pub full_text: String,
    pub paragraphs: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    pub clinical_values: Vec<ClinicalValue>,
    pub word_count: usize,
    pub paragraph_count: usize,
    pub page_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Success,
    Failed,
    Blocked,
    Insufficient,
    Error,
}

/// One line of `processing_results.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub url: String,
    pub status: ProcessingStatus,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<usize>,
}

impl ProcessingResult {
    pub fn new(url: &str, status: ProcessingStatus, content_type: ContentType) -> Self {
        Self {
            url: url.to_string(),
            status,
            content_type,
            title: None,
            word_count: None,
            sections: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_column_count_from_headers() {
        let headers = vec!["Drug".to_string(), "Dose".to_string()];
        let rows = vec![
            headers.clone(),
            vec!["Tenofovir".to_string(), "300 mg".to_string(), "daily".to_string()],
        ];
        let table = Table::new(1, headers, rows);
        assert_eq!(table.column_count, 2);
        assert_eq!(table.row_count, 1);
        assert!(table.rows.iter().all(|r| *r != table.headers));
    }

    #[test]
    fn test_table_column_count_from_first_row() {
        let rows = vec![vec!["a".to_string(), "b".to_string(), "c".to_string()]];
        let table = Table::new(2, vec![], rows);
        assert_eq!(table.column_count, 3);
    }

    #[test]
    fn test_page_record_roundtrips_content_variant() {
        let pdf = PdfContent {
            full_text: "text".to_string(),
            page_count: 2,
            ..Default::default()
        };
        let record = PageRecord::pdf("https://x.org/a.pdf".into(), "a".into(), pdf);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"page_url\""));
        assert!(json.contains("\"content_type\":\"pdf\""));
        let back: PageRecord = serde_json::from_str(&json).unwrap();
        assert!(matches!(back.content, PageContent::Pdf(_)));
    }

    #[test]
    fn test_clinical_value_serializes_with_type_tag() {
        let value = ClinicalValue::Threshold {
            value: "≥ 1,000 U/L".into(),
            operator: Comparator::AtLeast,
            number: "1,000".into(),
            unit: "U/L".into(),
        };
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["type"], "threshold");
        assert_eq!(json["operator"], "≥");
    }

    #[test]
    fn test_processing_result_omits_missing_fields() {
        let result = ProcessingResult::new("https://x.org", ProcessingStatus::Blocked, ContentType::Html);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "blocked");
        assert_eq!(json["type"], "html");
        assert!(json.get("title").is_none());
    }
}
