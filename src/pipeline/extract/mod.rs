//! Field Extractor: raw (key, value) pairs out of an OCR analysis.
//!
//! Two complementary strategies feed the same sections:
//! - the form path walks KEY/VALUE blocks and routes pairs by key text;
//! - the pattern path runs labelled regexes over the reconstructed text.
//!
//! Overlaps between the two are reconciled by the normalizer.

pub mod forms;
pub mod patterns;
pub mod queries;
pub mod text;

pub use forms::{key_value_pairs, route_key};
pub use patterns::{apply_patient_patterns, extract_prescription, PUMP_PRESCRIPTION};
pub use queries::{queries_for, query_answers, query_label};
pub use text::{block_text, document_label, reconstruct_text, CHECKED_TOKEN, NO_LABEL};

use crate::models::{FieldMap, OcrDocument, Section, Sections};

/// Patient, doctor and prescription sections for a form-based document.
pub fn extract(doc: &OcrDocument, supplementary: Option<&str>) -> Sections {
    let mut patient = FieldMap::new();
    let mut doctor = FieldMap::new();

    for (key, value) in key_value_pairs(doc) {
        match route_key(&key) {
            Some(Section::Patient) => {
                patient.insert(key, value);
            }
            Some(Section::Doctor) => {
                doctor.insert(key, value);
            }
            _ => {}
        }
    }

    let text = reconstruct_text(doc, supplementary);
    apply_patient_patterns(&text, &mut patient);
    let prescription = extract_prescription(&text);

    tracing::debug!(
        patient_fields = patient.len(),
        doctor_fields = doctor.len(),
        prescription_fields = prescription.len(),
        "Extracted raw fields"
    );

    let mut sections = Sections::new();
    sections.insert(Section::Patient, patient);
    sections.insert(Section::Doctor, doctor);
    sections.insert(Section::Prescription, prescription);
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockKind, EntityType, OcrBlock, RelationshipType, SelectionStatus};

    fn form_doc() -> OcrDocument {
        OcrDocument::new(vec![
            OcrBlock::new("l1", BlockKind::Line).with_text("Patient Name: Doe, Jane"),
            OcrBlock::new("l2", BlockKind::Line).with_text("Rx: breast pump"),
            OcrBlock::new("k1", BlockKind::KeyValueSet(EntityType::Key))
                .with_relationship(RelationshipType::Value, &["v1"])
                .with_relationship(RelationshipType::Child, &["w1", "w2", "w3"]),
            OcrBlock::new("w1", BlockKind::Word).with_text("Physician"),
            OcrBlock::new("w2", BlockKind::Word).with_text("Signature"),
            OcrBlock::new("w3", BlockKind::Word).with_text(":"),
            OcrBlock::new("v1", BlockKind::KeyValueSet(EntityType::Value))
                .with_relationship(RelationshipType::Child, &["w4"]),
            OcrBlock::new("w4", BlockKind::Word).with_text("jd~"),
            OcrBlock::new("k2", BlockKind::KeyValueSet(EntityType::Key))
                .with_relationship(RelationshipType::Value, &["v2"])
                .with_relationship(RelationshipType::Child, &["w5"]),
            OcrBlock::new("w5", BlockKind::Word).with_text("ICD-10"),
            OcrBlock::new("v2", BlockKind::KeyValueSet(EntityType::Value))
                .with_relationship(RelationshipType::Child, &["s1"]),
            OcrBlock::new("s1", BlockKind::SelectionElement(SelectionStatus::Selected)),
        ])
    }

    #[test]
    fn both_paths_contribute_to_sections() {
        let sections = extract(&form_doc(), None);

        let patient = &sections[&Section::Patient];
        assert_eq!(patient.get("Patient Name").map(String::as_str), Some("Doe, Jane"));

        let doctor = &sections[&Section::Doctor];
        assert_eq!(
            doctor.get("Physician Signature :").map(String::as_str),
            Some("jd~")
        );
        assert_eq!(doctor.len(), 1, "ICD key must be dropped");

        assert_eq!(
            sections[&Section::Prescription].get("Prescription").map(String::as_str),
            Some(PUMP_PRESCRIPTION)
        );
    }

    #[test]
    fn supplementary_text_feeds_patterns() {
        let doc = OcrDocument::new(vec![]);
        let sections = extract(&doc, Some("DOB: 05/06/1991"));
        assert_eq!(
            sections[&Section::Patient].get("DOB").map(String::as_str),
            Some("05/06/1991")
        );
    }

    #[test]
    fn empty_document_yields_three_empty_sections() {
        let sections = extract(&OcrDocument::default(), None);
        assert_eq!(sections.len(), 3);
        assert!(sections.values().all(|s| s.is_empty()));
    }
}
