use gl_core::{HtmlContent, LinkRef, Section, Table};
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};

use crate::frontier::heading_level;

/// Links kept in the persisted record.
pub const MAX_LINKS: usize = 20;
const NO_TITLE: &str = "No title";

lazy_static! {
    static ref STRIPPED: Selector = Selector::parse("script, style, noscript").unwrap();
    static ref BLOCKS: Selector = Selector::parse("h1, h2, h3, h4, h5, h6, p, div, section").unwrap();
    static ref PARAGRAPHS: Selector = Selector::parse("p, li, div").unwrap();
    static ref TABLES: Selector = Selector::parse("table").unwrap();
    static ref THEAD: Selector = Selector::parse("thead").unwrap();
    static ref TBODY: Selector = Selector::parse("tbody").unwrap();
    static ref ROWS: Selector = Selector::parse("tr").unwrap();
    static ref CELLS: Selector = Selector::parse("th, td").unwrap();
    static ref H1: Selector = Selector::parse("h1").unwrap();
    static ref TITLE: Selector = Selector::parse("title").unwrap();
    static ref ANCHORS: Selector = Selector::parse("a[href]").unwrap();
}

/// Structured view of an HTML page plus its resolved title.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlExtraction {
    pub title: String,
    pub content: HtmlContent,
}

/// Concatenates every text node of `element`, each trimmed, with no separator.
pub fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Parses markup and removes script, style and noscript subtrees.
pub fn parse_clean_document(markup: &str) -> Html {
    let mut document = Html::parse_document(markup);
    let ids: Vec<_> = document.select(&STRIPPED).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
    document
}

pub fn extract_html(markup: &str) -> HtmlExtraction {
    let document = parse_clean_document(markup);

    let sections = extract_sections(&document);
    let paragraphs: Vec<String> = document
        .select(&PARAGRAPHS)
        .map(stripped_text)
        .filter(|text| text.chars().count() > 10)
        .collect();
    let tables = extract_tables(&document);
    let links = extract_links(&document);
    let title = resolve_title(&document);

    let full_text = paragraphs.join("\n\n");
    let char_count = full_text.chars().count();
    let content = HtmlContent {
        full_text_length: char_count,
        paragraph_count: paragraphs.len(),
        word_count: full_text.split_whitespace().count(),
        char_count,
        section_count: sections.len(),
        table_count: tables.len(),
        sections,
        tables,
        links_count: links.len(),
        links: links.into_iter().take(MAX_LINKS).collect(),
        full_text,
    };

    HtmlExtraction { title, content }
}

/// Groups block text under `h1`..`h3` headings; text before the first one is dropped.
pub fn extract_sections(document: &Html) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<Section> = None;

    for element in document.select(&BLOCKS) {
        let text = stripped_text(element);
        if text.chars().count() < 5 {
            continue;
        }

        match heading_level(element.value().name()) {
            Some(level @ 1..=3) => {
                if let Some(section) = current.take() {
                    sections.push(section);
                }
                current = Some(Section {
                    heading: text,
                    level,
                    content: Vec::new(),
                });
            }
            _ => {
                if let Some(section) = current.as_mut() {
                    section.content.push(text);
                }
            }
        }
    }

    if let Some(section) = current {
        sections.push(section);
    }
    sections
}

pub fn extract_tables(document: &Html) -> Vec<Table> {
    let mut tables = Vec::new();

    for (index, table) in document.select(&TABLES).enumerate() {
        let headers = table
            .select(&THEAD)
            .next()
            .and_then(|thead| {
                thead
                    .select(&ROWS)
                    .map(row_cells)
                    .find(|cells| !cells.is_empty())
            })
            .unwrap_or_default();

        let body = table.select(&TBODY).next().unwrap_or(table);
        let rows: Vec<Vec<String>> = body.select(&ROWS).map(row_cells).collect();

        let table = Table::new(index + 1, headers, rows);
        if !table.rows.is_empty() || !table.headers.is_empty() {
            tables.push(table);
        }
    }

    tables
}

fn row_cells(row: ElementRef<'_>) -> Vec<String> {
    row.select(&CELLS).map(stripped_text).collect()
}

pub fn extract_links(document: &Html) -> Vec<LinkRef> {
    document
        .select(&ANCHORS)
        .filter_map(|a| {
            let text = stripped_text(a);
            let href = a.value().attr("href")?;
            if text.is_empty() || href.is_empty() {
                return None;
            }
            Some(LinkRef {
                text,
                url: href.to_string(),
            })
        })
        .collect()
}

/// First `h1`, then `<title>`, then a placeholder.
pub fn resolve_title(document: &Html) -> String {
    if let Some(h1) = document.select(&H1).next() {
        return stripped_text(h1);
    }
    document
        .select(&TITLE)
        .next()
        .map(|t| t.text().collect::<String>())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string())
}
