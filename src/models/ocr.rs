//! Typed model of the OCR collaborator's analysis payload.
//!
//! The payload shape (block kinds, relationship tags, geometry, entity types)
//! is a fixed external contract. It arrives as PascalCase JSON and is converted
//! through a wire struct into the tagged [`BlockKind`] representation, so the
//! rest of the pipeline never string-matches block types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Bounding box in normalized page-fraction units (0.0-1.0).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BoundingBox {
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub left: f32,
    #[serde(default)]
    pub top: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Geometry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

/// Side of a form key-value pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Key,
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStatus {
    Selected,
    NotSelected,
}

/// A question sent to the collaborator's query feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QuerySpec {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl QuerySpec {
    pub fn new(text: &str, alias: &str) -> Self {
        Self {
            text: text.to_string(),
            alias: Some(alias.to_string()),
        }
    }
}

/// Block kinds the pipeline distinguishes. Anything else is kept as `Other`.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Word,
    Line,
    KeyValueSet(EntityType),
    SelectionElement(SelectionStatus),
    Signature,
    Query(QuerySpec),
    QueryResult,
    Other(String),
}

impl BlockKind {
    pub fn wire_name(&self) -> &str {
        match self {
            Self::Word => "WORD",
            Self::Line => "LINE",
            Self::KeyValueSet(_) => "KEY_VALUE_SET",
            Self::SelectionElement(_) => "SELECTION_ELEMENT",
            Self::Signature => "SIGNATURE",
            Self::Query(_) => "QUERY",
            Self::QueryResult => "QUERY_RESULT",
            Self::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationshipType {
    Child,
    Value,
    Answer,
    Other(String),
}

impl RelationshipType {
    fn from_wire(s: &str) -> Self {
        match s {
            "CHILD" => Self::Child,
            "VALUE" => Self::Value,
            "ANSWER" => Self::Answer,
            other => Self::Other(other.to_string()),
        }
    }

    fn wire_name(&self) -> &str {
        match self {
            Self::Child => "CHILD",
            Self::Value => "VALUE",
            Self::Answer => "ANSWER",
            Self::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub kind: RelationshipType,
    pub ids: Vec<String>,
}

/// One OCR-detected primitive. Immutable for the lifetime of an extraction pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireBlock", into = "WireBlock")]
pub struct OcrBlock {
    pub id: String,
    pub kind: BlockKind,
    pub text: Option<String>,
    pub geometry: Option<Geometry>,
    pub relationships: Vec<Relationship>,
}

impl OcrBlock {
    pub fn new(id: &str, kind: BlockKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            text: None,
            geometry: None,
            relationships: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn with_bounding_box(mut self, width: f32, height: f32) -> Self {
        self.geometry = Some(Geometry {
            bounding_box: Some(BoundingBox {
                width,
                height,
                ..Default::default()
            }),
        });
        self
    }

    pub fn with_relationship(mut self, kind: RelationshipType, ids: &[&str]) -> Self {
        self.relationships.push(Relationship {
            kind,
            ids: ids.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    /// Ids of all related blocks with the given relationship tag, in order.
    pub fn related_ids<'a>(
        &'a self,
        kind: &'a RelationshipType,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.relationships
            .iter()
            .filter(move |r| &r.kind == kind)
            .flat_map(|r| r.ids.iter().map(String::as_str))
    }

    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.geometry.as_ref().and_then(|g| g.bounding_box.as_ref())
    }

    /// True when the block has no OCR-able text at all.
    pub fn is_textless(&self) -> bool {
        self.text.as_deref().map_or(true, |t| t.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DocumentMetadata {
    #[serde(default)]
    pub pages: u32,
}

/// Full analysis result for one source document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OcrDocument {
    #[serde(default)]
    pub blocks: Vec<OcrBlock>,
    #[serde(default)]
    pub document_metadata: DocumentMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_status: Option<String>,
}

impl OcrDocument {
    pub fn new(blocks: Vec<OcrBlock>) -> Self {
        Self {
            blocks,
            document_metadata: DocumentMetadata { pages: 1 },
            job_status: Some("SUCCEEDED".into()),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Block lookup table keyed by block id.
    pub fn index(&self) -> HashMap<&str, &OcrBlock> {
        self.blocks.iter().map(|b| (b.id.as_str(), b)).collect()
    }

    /// Texts of all LINE blocks, in document order.
    pub fn line_texts(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .filter(|b| b.kind == BlockKind::Line)
            .filter_map(|b| b.text.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireRelationship {
    #[serde(rename = "Type")]
    kind: String,
    #[serde(default)]
    ids: Vec<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireBlock {
    #[serde(default)]
    id: String,
    block_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    geometry: Option<Geometry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    relationships: Vec<WireRelationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    entity_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selection_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    query: Option<QuerySpec>,
}

impl From<WireBlock> for OcrBlock {
    fn from(wire: WireBlock) -> Self {
        let kind = match wire.block_type.as_str() {
            "WORD" => BlockKind::Word,
            "LINE" => BlockKind::Line,
            // A key-value set is a VALUE unless explicitly tagged KEY.
            "KEY_VALUE_SET" => {
                if wire.entity_types.iter().any(|e| e == "KEY") {
                    BlockKind::KeyValueSet(EntityType::Key)
                } else {
                    BlockKind::KeyValueSet(EntityType::Value)
                }
            }
            "SELECTION_ELEMENT" => match wire.selection_status.as_deref() {
                Some("SELECTED") => BlockKind::SelectionElement(SelectionStatus::Selected),
                _ => BlockKind::SelectionElement(SelectionStatus::NotSelected),
            },
            "SIGNATURE" => BlockKind::Signature,
            "QUERY" => BlockKind::Query(wire.query.unwrap_or(QuerySpec {
                text: wire.text.clone().unwrap_or_default(),
                alias: None,
            })),
            "QUERY_RESULT" => BlockKind::QueryResult,
            other => BlockKind::Other(other.to_string()),
        };

        OcrBlock {
            id: wire.id,
            kind,
            text: wire.text,
            geometry: wire.geometry,
            relationships: wire
                .relationships
                .into_iter()
                .map(|r| Relationship {
                    kind: RelationshipType::from_wire(&r.kind),
                    ids: r.ids,
                })
                .collect(),
        }
    }
}

impl From<OcrBlock> for WireBlock {
    fn from(block: OcrBlock) -> Self {
        let block_type = block.kind.wire_name().to_string();
        let (entity_types, selection_status, query) = match block.kind {
            BlockKind::KeyValueSet(EntityType::Key) => (vec!["KEY".to_string()], None, None),
            BlockKind::KeyValueSet(EntityType::Value) => (vec!["VALUE".to_string()], None, None),
            BlockKind::SelectionElement(SelectionStatus::Selected) => {
                (vec![], Some("SELECTED".to_string()), None)
            }
            BlockKind::SelectionElement(SelectionStatus::NotSelected) => {
                (vec![], Some("NOT_SELECTED".to_string()), None)
            }
            BlockKind::Query(q) => (vec![], None, Some(q)),
            _ => (vec![], None, None),
        };

        WireBlock {
            id: block.id,
            block_type,
            text: block.text,
            geometry: block.geometry,
            relationships: block
                .relationships
                .into_iter()
                .map(|r| WireRelationship {
                    kind: r.kind.wire_name().to_string(),
                    ids: r.ids,
                })
                .collect(),
            entity_types,
            selection_status,
            query,
        }
    }
}
