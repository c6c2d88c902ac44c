//! Batch runner: sequential iteration with per-document error isolation.
//!
//! One document is fully classified, extracted, normalized and written before
//! the next starts. Nothing a single document does can abort the batch.

use std::time::Instant;

use chrono::Utc;

use super::traits::RecordSink;
use super::types::{BatchStatusEvent, BatchSummary};
use crate::pipeline::processor::{DocumentProcessor, DocumentRef, ProcessingOutcome};

/// Run a full batch: admit -> process -> sink, then write the summary.
pub fn run_full_batch(
    processor: &DocumentProcessor,
    documents: &[DocumentRef],
    sink: &mut dyn RecordSink,
    progress_fn: Option<&dyn Fn(BatchStatusEvent)>,
) -> BatchSummary {
    let start = Instant::now();
    let mut summary = BatchSummary::empty();
    let total = documents.len() as u32;
    summary.total_documents = total;

    tracing::info!(batch_id = %summary.batch_id, documents = total, "Batch started");
    if let Some(progress) = progress_fn {
        progress(BatchStatusEvent::Started {
            document_count: total,
        });
    }

    for (i, document) in documents.iter().enumerate() {
        let identifier = document.identifier.as_str();

        if let Some(progress) = progress_fn {
            progress(BatchStatusEvent::Progress {
                completed: i as u32,
                total,
                current_document: identifier.to_string(),
            });
        }

        // Step 1: pre-OCR filters
        if let Err(e) = processor.admit(document) {
            tracing::info!(identifier, reason = %e, "Skipping document");
            summary.skipped_documents += 1;
            continue;
        }

        // Step 2: pipeline
        let failure = match processor.process(identifier) {
            Ok(ProcessingOutcome::Extracted(output)) => match sink.write_record(&output) {
                Ok(()) => {
                    summary.record_processed(output.document_type);
                    None
                }
                Err(e) => Some(format!("Failed to write record: {e}")),
            },
            Ok(ProcessingOutcome::Unclassified) => {
                tracing::info!(identifier, "Unclassified document, skipping");
                summary.unclassified_documents += 1;
                None
            }
            Ok(ProcessingOutcome::NoRuleset(_)) => {
                summary.skipped_documents += 1;
                None
            }
            Err(e) => Some(e.to_string()),
        };

        if let Some(error) = failure {
            tracing::warn!(identifier, error = %error, "Document failed, continuing batch");
            if let Some(progress) = progress_fn {
                progress(BatchStatusEvent::DocumentFailed {
                    identifier: identifier.to_string(),
                    error: error.clone(),
                });
            }
            summary.record_failure(identifier, error);
        }
    }

    summary.finished_at = Some(Utc::now());
    summary.duration_ms = start.elapsed().as_millis() as u64;

    if let Err(e) = sink.write_summary(&summary) {
        tracing::warn!(error = %e, "Failed to write batch summary");
    }

    tracing::info!(
        batch_id = %summary.batch_id,
        total = summary.total_documents,
        processed = summary.processed_documents(),
        skipped = summary.skipped_documents,
        unclassified = summary.unclassified_documents,
        duration_ms = summary.duration_ms,
        "Batch complete"
    );

    if let Some(progress) = progress_fn {
        progress(BatchStatusEvent::Completed {
            processed: summary.processed_documents(),
            skipped: summary.skipped_documents,
            duration_ms: summary.duration_ms,
        });
    }

    summary
}
