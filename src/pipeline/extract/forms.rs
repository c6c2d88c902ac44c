use std::collections::HashMap;

use super::text::block_text;
use crate::models::{BlockKind, EntityType, OcrBlock, OcrDocument, RelationshipType, Section};

/// Keys carrying administrative boilerplate (diagnosis codes), never patient data.
const DROPPED_KEY_TERMS: &[&str] = &["icd", "z39", "lactating"];

const PATIENT_KEY_TERMS: &[&str] = &[
    "mother",
    "infant",
    "patient",
    "name",
    "dob",
    "date of birth",
    "phone",
];

const DOCTOR_KEY_TERMS: &[&str] = &["physician", "doctor", "md", "prescribing"];

/// (key text, value text) for every KEY block, in document order.
///
/// A key's value is the first block named by its VALUE relationship; a key
/// with no resolvable value pairs with the empty string.
pub fn key_value_pairs(doc: &OcrDocument) -> Vec<(String, String)> {
    let index = doc.index();
    let values: HashMap<&str, &OcrBlock> = doc
        .blocks
        .iter()
        .filter(|b| b.kind == BlockKind::KeyValueSet(EntityType::Value))
        .map(|b| (b.id.as_str(), b))
        .collect();

    doc.blocks
        .iter()
        .filter(|b| b.kind == BlockKind::KeyValueSet(EntityType::Key))
        .map(|key| {
            let value = key
                .related_ids(&RelationshipType::Value)
                .next()
                .and_then(|id| values.get(id));
            let key_text = block_text(key, &index);
            let value_text = value
                .map(|v| block_text(v, &index))
                .unwrap_or_default();
            (key_text, value_text)
        })
        .collect()
}

/// Which section a form key belongs to, by case-insensitive substring tests.
/// `None` means the pair is not kept.
pub fn route_key(key: &str) -> Option<Section> {
    let lower = key.to_lowercase();
    if DROPPED_KEY_TERMS.iter().any(|t| lower.contains(t)) {
        return None;
    }
    if PATIENT_KEY_TERMS.iter().any(|t| lower.contains(t)) {
        Some(Section::Patient)
    } else if DOCTOR_KEY_TERMS.iter().any(|t| lower.contains(t)) {
        Some(Section::Doctor)
    } else {
        None
    }
}
