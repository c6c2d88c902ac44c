//! Normalizer: raw extracted sections -> canonical [`ExtractionRecord`].
//!
//! Three entry points, one per ruleset:
//! - [`normalize`]: generic field rules, then the template pass named by the label;
//! - [`normalize_agreement`]: flat {name, date, signature} record;
//! - [`normalize_queries`]: query answers with cleaned keys and empty answers kept.
//!
//! Every entry point scores the finished record.

pub mod agreement;
pub mod rules;

pub use agreement::{agreement_fields, find_customer_name, find_date};
pub use rules::{apply_field_rules, clean_key, split_name, split_prescriber_key, ALIASES};

use crate::models::{DocumentType, ExtractionRecord, FieldMap, Section, Sections};
use crate::pipeline::confidence;
use crate::pipeline::templates::profile_for_label;

fn finish(document_type: DocumentType, label: &str, data: Sections) -> ExtractionRecord {
    let mut record = ExtractionRecord {
        document_type,
        document_label: label.to_string(),
        data,
        confidence: 0.0,
    };
    record.confidence = confidence::score(&record);
    record
}

/// Generic cleanup followed by the label's template pass. Idempotent:
/// feeding `record.data` back in yields the same record.
pub fn normalize(mut sections: Sections, document_type: DocumentType, label: &str) -> ExtractionRecord {
    apply_field_rules(&mut sections);

    if let Some(profile) = profile_for_label(label) {
        tracing::debug!(template = profile.name, "Applying template relocations");
        profile.apply_relocations(&mut sections);
    }

    finish(document_type, label, sections)
}

/// Agreement record from the document text and the signature verdict.
pub fn normalize_agreement(
    text: &str,
    signature_present: bool,
    document_type: DocumentType,
    label: &str,
) -> ExtractionRecord {
    let mut data = Sections::new();
    data.insert(Section::Agreement, agreement_fields(text, signature_present));
    finish(document_type, label, data)
}

/// Query answers keep unanswered (empty) entries so they lower the score.
pub fn normalize_queries(answers: FieldMap, document_type: DocumentType, label: &str) -> ExtractionRecord {
    let fields: FieldMap = answers
        .into_iter()
        .filter_map(|(key, value)| {
            let key = clean_key(&key);
            (!key.is_empty()).then(|| (key, value.trim().to_string()))
        })
        .collect();
    let mut data = Sections::new();
    data.insert(Section::Document, fields);
    finish(document_type, label, data)
}
