//! Recommendation and clinical value recognition over cleaned text.

use gl_core::{ClinicalValue, Comparator, Grade, Recommendation};
use lazy_static::lazy_static;
use regex::Regex;

use crate::text::TextCleaner;

lazy_static! {
    static ref RECOMMENDATION_MARKER: Regex =
        Regex::new(r"(?i)Recommendation\s+(\d+)[:\s]+").unwrap();
    static ref BLOCK_END: Regex =
        Regex::new(r"(?i)Recommendation\s+\d+|Case\s+\d+|Summary").unwrap();
    static ref GRADE: Regex =
        Regex::new(r"\((Strong|Conditional|Weak)\s+recommendation[^)]+\)").unwrap();
    static ref CERTAINTY: Regex = Regex::new(
        r"(?i)\([^()]*?\b((?:very low|high|moderate|low)\s+certainty)\b[^()]*\)"
    )
    .unwrap();
    static ref DOSAGE: Regex = Regex::new(
        r"(?i)(\d+(?:\.\d+)?)\s*(mg|mcg|IU/mL|U/L|IU|mL|kg)\s*(?:orally|subcutaneously|daily|weekly|monthly)?"
    )
    .unwrap();
    static ref THRESHOLD: Regex = Regex::new(
        r"(?i)(>=|<=|≥|≤|<|>)\s*(\d+(?:,\d+)?)\s*(IU/mL|U/L|IU|mg/dL|years?|months?|weeks?|days?)"
    )
    .unwrap();
}

/// Splits `text` into numbered recommendation blocks.
///
/// A block runs from its `Recommendation N` marker to the next marker, a
/// `Case N` or `Summary` heading, or the end of the text. Marker numbers are
/// taken as written; out-of-order or repeated numbers are kept.
pub fn extract_recommendations(text: &str, cleaner: &TextCleaner) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    let mut pos = 0;

    while let Some(caps) = RECOMMENDATION_MARKER.captures_at(text, pos) {
        let (Some(marker), Some(number)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let body_start = marker.end();
        let end = BLOCK_END
            .find_at(text, body_start)
            .map_or(text.len(), |m| m.start());
        let body = text[body_start..end].trim();

        let cleaned = cleaner.clean(body);
        if !cleaned.is_empty() {
            recommendations.push(Recommendation {
                number: number.as_str().to_string(),
                text: cleaned,
                grade: grade_of(body),
                certainty: certainty_of(body),
                raw_text: text[marker.start()..end].to_string(),
            });
        }
        pos = end;
    }

    recommendations
}

fn grade_of(block: &str) -> Option<Grade> {
    GRADE
        .captures(block)
        .and_then(|caps| caps.get(1))
        .and_then(|m| Grade::parse(m.as_str()))
}

fn certainty_of(block: &str) -> Option<String> {
    CERTAINTY
        .captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| {
            m.as_str()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase()
        })
}

/// Dosages first, then thresholds, each in text order.
///
/// A span matched by the threshold pass is never also reported as a dosage.
pub fn extract_clinical_values(text: &str) -> Vec<ClinicalValue> {
    let mut thresholds = Vec::new();
    let mut claimed = Vec::new();
    for caps in THRESHOLD.captures_iter(text) {
        let (Some(whole), Some(op), Some(number), Some(unit)) =
            (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };
        let Some(operator) = Comparator::parse(op.as_str()) else {
            continue;
        };
        claimed.push(whole.range());
        thresholds.push(ClinicalValue::Threshold {
            value: whole.as_str().to_string(),
            operator,
            number: number.as_str().to_string(),
            unit: unit.as_str().to_string(),
        });
    }

    let mut values = Vec::new();
    for caps in DOSAGE.captures_iter(text) {
        let (Some(whole), Some(number), Some(unit)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        if continues_number(text, whole.start())
            || claimed
                .iter()
                .any(|span| whole.start() < span.end && span.start < whole.end())
        {
            continue;
        }
        values.push(ClinicalValue::Dosage {
            value: whole.as_str().trim_end().to_string(),
            number: number.as_str().to_string(),
            unit: unit.as_str().to_string(),
        });
    }

    values.extend(thresholds);
    values
}

/// True when the number at `start` is the tail of a larger number.
fn continues_number(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_digit() || c == ',' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recommendations(text: &str) -> Vec<Recommendation> {
        extract_recommendations(text, TextCleaner::builtin())
    }

    #[test]
    fn test_two_graded_recommendations() {
        let recs = recommendations(
            "Recommendation 1: Use drug X (Strong recommendation, moderate certainty). Recommendation 2: ...",
        );
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].number, "1");
        assert_eq!(recs[0].grade, Some(Grade::Strong));
        assert!(recs[0].certainty.as_deref().unwrap().contains("moderate certainty"));
        assert_eq!(
            recs[0].text,
            "Use drug X (Strong recommendation, moderate certainty)."
        );
        assert!(recs[0].raw_text.starts_with("Recommendation 1: Use drug X"));
        assert_eq!(recs[1].number, "2");
        assert_eq!(recs[1].grade, None);
    }

    #[test]
    fn test_block_ends_at_case_or_summary() {
        let recs = recommendations(
            "Recommendation 3: Treat all adults. Case 1 A 45-year-old man. Recommendation 4 Screen family. Summary of evidence",
        );
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].text, "Treat all adults.");
        assert_eq!(recs[1].number, "4");
        assert_eq!(recs[1].text, "Screen family.");
    }

    #[test]
    fn test_empty_blocks_are_dropped() {
        let recs = recommendations("Recommendation 1: Recommendation 2: Use TAF");
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].number, "2");
        assert_eq!(recs[0].text, "Use TAF");
    }

    #[test]
    fn test_numbers_kept_as_written() {
        let recs = recommendations("Recommendation 5: First. Recommendation 2: Second.");
        let numbers: Vec<_> = recs.iter().map(|r| r.number.as_str()).collect();
        assert_eq!(numbers, vec!["5", "2"]);
    }

    #[test]
    fn test_block_text_is_cleaned() {
        let recs = recommendations("RECOMMENDATION 7:  Offer   vaccination\nto contacts Back to Top");
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].text, "Offer vaccination to contacts");
    }

    #[test]
    fn test_certainty_variants() {
        let recs = recommendations(
            "Recommendation 1: Avoid alcohol (Very low certainty). Recommendation 2: Monitor (Conditional recommendation, LOW certainty)",
        );
        assert_eq!(recs[0].certainty.as_deref(), Some("very low certainty"));
        assert_eq!(recs[0].grade, None);
        assert_eq!(recs[1].certainty.as_deref(), Some("low certainty"));
        assert_eq!(recs[1].grade, Some(Grade::Conditional));
    }

    #[test]
    fn test_no_markers() {
        assert!(recommendations("General guidance without numbered items.").is_empty());
    }

    #[test]
    fn test_dosage() {
        let values = extract_clinical_values("administer 400 mg orally");
        assert_eq!(
            values,
            vec![ClinicalValue::Dosage {
                value: "400 mg orally".to_string(),
                number: "400".to_string(),
                unit: "mg".to_string(),
            }]
        );
    }

    #[test]
    fn test_decimal_dosage_without_route() {
        let values = extract_clinical_values("give 0.5 mL and rest");
        assert_eq!(
            values,
            vec![ClinicalValue::Dosage {
                value: "0.5 mL".to_string(),
                number: "0.5".to_string(),
                unit: "mL".to_string(),
            }]
        );
    }

    #[test]
    fn test_threshold_with_thousands_separator() {
        let values = extract_clinical_values("ALT ≥ 1,000 U/L");
        assert_eq!(
            values,
            vec![ClinicalValue::Threshold {
                value: "≥ 1,000 U/L".to_string(),
                operator: Comparator::AtLeast,
                number: "1,000".to_string(),
                unit: "U/L".to_string(),
            }]
        );
    }

    #[test]
    fn test_ascii_operators() {
        let values = extract_clinical_values("adults >= 18 years with HBV DNA >2,000 IU/mL");
        assert_eq!(values.len(), 2);
        match &values[0] {
            ClinicalValue::Threshold { operator, number, unit, .. } => {
                assert_eq!(*operator, Comparator::AtLeast);
                assert_eq!(number, "18");
                assert_eq!(unit, "years");
            }
            other => panic!("unexpected {:?}", other),
        }
        match &values[1] {
            ClinicalValue::Threshold { operator, number, .. } => {
                assert_eq!(*operator, Comparator::Above);
                assert_eq!(number, "2,000");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_sentence_period_does_not_suppress_dosage() {
        let values = extract_clinical_values("Start today. 25 mg daily");
        assert_eq!(values.len(), 1);
        assert!(matches!(&values[0], ClinicalValue::Dosage { value, .. } if value == "25 mg daily"));
    }

    #[test]
    fn test_dosage_after_operator_without_threshold_unit() {
        let values = extract_clinical_values("give ≥ 400 mg orally");
        assert_eq!(
            values,
            vec![ClinicalValue::Dosage {
                value: "400 mg orally".to_string(),
                number: "400".to_string(),
                unit: "mg".to_string(),
            }]
        );

        let values = extract_clinical_values("dose > 300 mg daily");
        assert_eq!(values.len(), 1);
        assert!(matches!(&values[0], ClinicalValue::Dosage { number, .. } if number == "300"));
    }

    #[test]
    fn test_threshold_span_is_not_a_dosage() {
        let values = extract_clinical_values("HBV DNA ≥ 20 IU/mL");
        assert_eq!(values.len(), 1);
        assert!(matches!(&values[0], ClinicalValue::Threshold { number, .. } if number == "20"));
    }

    #[test]
    fn test_dosages_before_thresholds() {
        let values = extract_clinical_values("HBV DNA < 20 IU/mL after 300 mg daily");
        assert!(matches!(values[0], ClinicalValue::Dosage { .. }));
        assert!(matches!(values[1], ClinicalValue::Threshold { .. }));
        assert_eq!(values.len(), 2);
    }
}
