use gl_core::{Error, Result};
use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

use crate::rules::CleaningRules;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref CASE_BOUNDARY: Regex = Regex::new(r"([a-z])([A-Z])").unwrap();
    static ref SENTENCE_BOUNDARY: Regex = Regex::new(r"([.!?])([A-Z])").unwrap();
    static ref DOT_RUN: Regex = Regex::new(r"\.{3,}").unwrap();
    static ref DASH_RUN: Regex = Regex::new(r"-{3,}").unwrap();
    static ref BUILTIN: TextCleaner = TextCleaner::new(&CleaningRules::default()).unwrap();
}

#[derive(Debug, Clone)]
struct CompiledRule {
    pattern: Regex,
    replacement: String,
}

/// Compiled form of a [`CleaningRules`] table.
#[derive(Debug, Clone)]
pub struct TextCleaner {
    version: u32,
    rules: Vec<CompiledRule>,
    truncate_after: Vec<String>,
}

impl TextCleaner {
    pub fn new(rules: &CleaningRules) -> Result<Self> {
        rules.validate()?;
        let compiled = rules
            .boilerplate
            .iter()
            .map(|rule| {
                RegexBuilder::new(&rule.pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|pattern| CompiledRule {
                        pattern,
                        replacement: rule.replacement.clone(),
                    })
                    .map_err(|e| {
                        Error::Config(format!("Invalid boilerplate pattern {:?}: {}", rule.pattern, e))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            version: rules.version,
            rules: compiled,
            truncate_after: rules.truncate_after.clone(),
        })
    }

    /// Cleaner for the built-in rule table.
    pub fn builtin() -> &'static TextCleaner {
        &BUILTIN
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Repeats the cleaning pass until the text stops changing, so cleaning
    /// an already cleaned string returns it unchanged.
    pub fn clean(&self, text: &str) -> String {
        let mut current = self.clean_once(text);
        loop {
            let next = self.clean_once(&current);
            // Past the first pass only rule matches change the text, and a
            // removal always shortens it.
            if next.len() >= current.len() {
                return next;
            }
            current = next;
        }
    }

    fn clean_once(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let mut text = text.to_string();
        for rule in &self.rules {
            text = rule
                .pattern
                .replace_all(&text, rule.replacement.as_str())
                .into_owned();
        }

        let text = WHITESPACE.replace_all(&text, " ");
        let text = CASE_BOUNDARY.replace_all(&text, "${1} ${2}");
        let text = SENTENCE_BOUNDARY.replace_all(&text, "${1} ${2}");
        let text = DOT_RUN.replace_all(&text, "...");
        let text = DASH_RUN.replace_all(&text, "---");
        self.truncate(&text).trim().to_string()
    }

    fn truncate<'a>(&self, text: &'a str) -> &'a str {
        match self.truncate_after.iter().filter_map(|m| text.find(m.as_str())).min() {
            Some(cut) => &text[..cut],
            None => text,
        }
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

/// Cleans `text` with the built-in rule table.
pub fn clean_text(text: &str) -> String {
    BUILTIN.clean(text)
}
