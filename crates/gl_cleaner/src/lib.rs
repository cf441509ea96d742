//! Cleaning stage: boilerplate removal, clinical entity recognition and
//! cleaned-record output for harvested guideline records.

pub mod batch;
pub mod entities;
pub mod record;
pub mod rules;
pub mod text;

pub use batch::{BatchCleaner, CleaningStats, CleaningSummary, FileSummary};
pub use entities::{extract_clinical_values, extract_recommendations};
pub use record::RecordCleaner;
pub use rules::{BoilerplateRule, CleaningRules};
pub use text::{clean_text, TextCleaner};

pub mod prelude {
    pub use super::batch::BatchCleaner;
    pub use super::record::RecordCleaner;
    pub use super::rules::CleaningRules;
    pub use super::text::TextCleaner;
}
