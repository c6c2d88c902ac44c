use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::enums::{DocumentType, Section};

/// Field label → field value, in the order fields were read from the document.
pub type FieldMap = IndexMap<String, String>;

/// Logical section → its fields.
pub type Sections = IndexMap<Section, FieldMap>;

/// Literal written when a field could not be found on the document.
pub const NOT_PRESENT: &str = "Not present";

/// Final, normalized output for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub document_type: DocumentType,
    /// Human-readable first line of the document's text.
    pub document_label: String,
    pub data: Sections,
    /// Fraction of populated fields, in [0, 1].
    pub confidence: f64,
}

impl ExtractionRecord {
    pub fn section(&self, section: Section) -> Option<&FieldMap> {
        self.data.get(&section)
    }

    pub fn field(&self, section: Section, key: &str) -> Option<&str> {
        self.section(section)
            .and_then(|fields| fields.get(key))
            .map(String::as_str)
    }

    /// All (key, value) pairs across every section.
    pub fn all_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data
            .values()
            .flat_map(|fields| fields.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}
