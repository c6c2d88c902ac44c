use std::sync::LazyLock;

use regex::Regex;

use crate::models::FieldMap;
use crate::pipeline::templates::profiles_in_text;

/// Canonical prescription value for any breast-pump order.
pub const PUMP_PRESCRIPTION: &str = "Double Electric Breast Pump";

const PUMP_PHRASES: &[&str] = &[
    "breast pump",
    "double electric",
    "double-electric",
    "electric breast pump",
];

struct FieldPattern {
    regex: Regex,
    field: &'static str,
}

fn field_pattern(regex: &str, field: &'static str) -> FieldPattern {
    FieldPattern {
        regex: Regex::new(regex).expect("valid regex"),
        field,
    }
}

/// Patient-field patterns. Values stop at the end of the line or at the next
/// colon, which on these forms starts the next label.
static PATIENT_PATTERNS: LazyLock<Vec<FieldPattern>> = LazyLock::new(|| {
    vec![
        field_pattern(r"(?i)(?:Mother|Patient)\s*Name[:\s]+([^:\n]+)", "Patient Name"),
        field_pattern(
            r"(?i)(?:Mother|Patient)?\s*Date of Birth[:\s]+([^:\n]+)",
            "Date of Birth",
        ),
        field_pattern(r"(?i)(?:Mother|Patient)?\s*DOB[:\s]+([^:\n]+)", "DOB"),
        field_pattern(
            r"(?i)(?:Mother|Patient)?\s*Phone\s*(?:Number)?[:\s]+([^:\n]+)",
            "Phone Number",
        ),
        field_pattern(r"(?i)(?:Infant|Baby)\s*Name[:\s]+([^:\n]+)", "Infant Name"),
        field_pattern(
            r"(?i)(?:Infant|Baby)\s*Date of Birth[:\s]+([^:\n]+)",
            "Infant Date of Birth",
        ),
        field_pattern(r"(?i)EDD[:\s]+([^:\n]+)", "EDD"),
    ]
});

/// Run every patient pattern over `text`; the first capture of the first
/// match sets the field, overwriting whatever the form path produced.
pub fn apply_patient_patterns(text: &str, patient: &mut FieldMap) {
    for pattern in PATIENT_PATTERNS.iter() {
        let value = pattern
            .regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim());
        if let Some(value) = value {
            patient.insert(pattern.field.to_string(), value.to_string());
        }
    }
}

/// Prescription section: the generic pump order plus any template-specific
/// fields whose marker appears in the text.
pub fn extract_prescription(text: &str) -> FieldMap {
    let mut prescription = FieldMap::new();
    let lower = text.to_lowercase();
    if PUMP_PHRASES.iter().any(|p| lower.contains(p)) {
        prescription.insert("Prescription".into(), PUMP_PRESCRIPTION.into());
    }
    for profile in profiles_in_text(text) {
        tracing::debug!(template = profile.name, "Applying template prescription patterns");
        profile.extract_prescription(text, &mut prescription);
    }
    prescription
}
