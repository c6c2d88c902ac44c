use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::DocumentType;

/// Generate a new batch ID (UUID v4).
pub fn new_batch_id() -> String {
    Uuid::new_v4().to_string()
}

// ═══════════════════════════════════════════
// Batch Summary
// ═══════════════════════════════════════════

/// A document that failed mid-pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub identifier: String,
    pub reason: String,
}

/// Result of running a full batch.
///
/// `skipped_documents` covers pre-filter rejections, collaborator failures,
/// sink failures, and types without a ruleset. Unclassified documents are
/// counted separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub batch_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub total_documents: u32,
    pub processed_by_type: BTreeMap<DocumentType, u32>,
    pub skipped_documents: u32,
    pub unclassified_documents: u32,
    pub failures: Vec<DocumentFailure>,
    pub duration_ms: u64,
}

impl BatchSummary {
    pub fn empty() -> Self {
        Self {
            batch_id: new_batch_id(),
            started_at: Utc::now(),
            finished_at: None,
            total_documents: 0,
            processed_by_type: BTreeMap::new(),
            skipped_documents: 0,
            unclassified_documents: 0,
            failures: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn record_processed(&mut self, document_type: DocumentType) {
        *self.processed_by_type.entry(document_type).or_insert(0) += 1;
    }

    pub fn record_failure(&mut self, identifier: &str, reason: String) {
        self.skipped_documents += 1;
        self.failures.push(DocumentFailure {
            identifier: identifier.to_string(),
            reason,
        });
    }

    pub fn processed_documents(&self) -> u32 {
        self.processed_by_type.values().sum()
    }
}

// ═══════════════════════════════════════════
// Batch Status Events
// ═══════════════════════════════════════════

/// Event emitted during batch processing for progress reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BatchStatusEvent {
    Started {
        document_count: u32,
    },
    Progress {
        completed: u32,
        total: u32,
        current_document: String,
    },
    DocumentFailed {
        identifier: String,
        error: String,
    },
    Completed {
        processed: u32,
        skipped: u32,
        duration_ms: u64,
    },
}
