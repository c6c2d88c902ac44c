use crate::models::{ExtractionRecord, NOT_PRESENT};

/// Completeness thresholds for flagging records for manual review.
pub mod completeness_thresholds {
    /// Below this: most expected fields are missing
    pub const LOW: f64 = 0.50;

    /// At or above this: record is complete enough to skip review
    pub const HIGH: f64 = 0.85;
}

/// A slot counts as unpopulated when blank or holding the not-found sentinel.
pub fn is_unpopulated(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == NOT_PRESENT
}

/// Share of populated fields across all sections of the record.
/// A record without fields scores 0.
pub fn score_fields<'a>(values: impl IntoIterator<Item = &'a str>) -> f64 {
    let (total, empty) = values
        .into_iter()
        .fold((0usize, 0usize), |(total, empty), value| {
            (total + 1, empty + usize::from(is_unpopulated(value)))
        });
    if total == 0 {
        return 0.0;
    }
    ((total - empty) as f64 / total as f64).clamp(0.0, 1.0)
}

pub fn score(record: &ExtractionRecord) -> f64 {
    score_fields(record.all_fields().map(|(_, value)| value))
}

/// True when the record should be routed to a human reviewer.
pub fn needs_review(record: &ExtractionRecord) -> bool {
    record.confidence < completeness_thresholds::HIGH
}

/// True when most expected fields are missing: a likely misclassification
/// or an unreadable scan.
pub fn needs_attention(record: &ExtractionRecord) -> bool {
    record.confidence < completeness_thresholds::LOW
}
