//! Document Processing Orchestrator.
//!
//! Drives one document through the pipeline:
//! classify -> extract -> normalize -> score.
//!
//! The OCR collaborator is injected as a trait object so the orchestrator
//! stays fully testable with [`MockOcrProvider`](super::ocr::MockOcrProvider).

use serde::{Deserialize, Serialize};

use crate::config::{extension_of, PipelineConfig};
use crate::models::{DocumentType, ExtractionRecord, OcrDocument, Ruleset};
use crate::pipeline::classify::{classify, Classification};
use crate::pipeline::confidence;
use crate::pipeline::extract::{document_label, extract, queries_for, query_answers, reconstruct_text};
use crate::pipeline::normalize::{normalize, normalize_agreement, normalize_queries};
use crate::pipeline::ocr::{OcrError, OcrProvider};
use crate::pipeline::signature::has_signature;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that stop one document. None of them is fatal to a batch.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),

    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error("Document too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A document handed to the pipeline: its identifier and, when the listing
/// provides it, its size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub identifier: String,
    pub size_bytes: Option<u64>,
}

impl DocumentRef {
    pub fn new(identifier: &str, size_bytes: Option<u64>) -> Self {
        Self {
            identifier: identifier.to_string(),
            size_bytes,
        }
    }
}

/// Per-document output, in the shape written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentOutput {
    pub object_key: String,
    pub document_type: DocumentType,
    pub extracted_data: ExtractionRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingOutcome {
    Extracted(DocumentOutput),
    /// Classifier found no type; no best-effort extraction is attempted.
    Unclassified,
    /// Classified, but the type has no extraction ruleset.
    NoRuleset(DocumentType),
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Orchestrates processing of single documents against one OCR collaborator.
pub struct DocumentProcessor {
    provider: Box<dyn OcrProvider>,
    config: PipelineConfig,
}

impl DocumentProcessor {
    pub fn new(provider: Box<dyn OcrProvider>, config: PipelineConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Pre-OCR gate: extension allow-list and size limit.
    pub fn admit(&self, document: &DocumentRef) -> Result<(), ProcessingError> {
        if !self.config.is_supported(&document.identifier) {
            return Err(ProcessingError::UnsupportedExtension(
                extension_of(&document.identifier).unwrap_or_default(),
            ));
        }
        if let Some(size) = document.size_bytes {
            if size > self.config.max_document_bytes {
                return Err(ProcessingError::TooLarge {
                    size,
                    limit: self.config.max_document_bytes,
                });
            }
        }
        Ok(())
    }

    /// Classify only. Filename hints cost nothing; content hints read the
    /// direct text of PDFs and fall back to OCR lines.
    pub fn classify(&self, identifier: &str) -> Result<Classification, ProcessingError> {
        self.classify_caching(identifier, &mut None)
    }

    fn classify_caching(
        &self,
        identifier: &str,
        analysis: &mut Option<OcrDocument>,
    ) -> Result<Classification, ProcessingError> {
        let classification = classify(identifier, self.config.filename_match_score, || {
            self.sample_text(identifier, analysis)
        })?;
        tracing::info!(
            identifier,
            document_type = %classification.document_type,
            score = classification.score,
            "Classified document"
        );
        Ok(classification)
    }

    fn sample_text(
        &self,
        identifier: &str,
        analysis: &mut Option<OcrDocument>,
    ) -> Result<String, ProcessingError> {
        if extension_of(identifier).as_deref() == Some("pdf") {
            if let Some(text) = self.provider.direct_text(identifier)? {
                if !text.trim().is_empty() {
                    return Ok(text);
                }
            }
        }
        let doc = self.provider.analyze(identifier)?;
        let text = reconstruct_text(&doc, None);
        *analysis = Some(doc);
        Ok(text)
    }

    /// Full pipeline for one document.
    pub fn process(&self, identifier: &str) -> Result<ProcessingOutcome, ProcessingError> {
        let mut analysis = None;
        let classification = self.classify_caching(identifier, &mut analysis)?;
        let document_type = classification.document_type;

        if document_type == DocumentType::Unknown {
            return Ok(ProcessingOutcome::Unclassified);
        }
        let Some(ruleset) = document_type.ruleset() else {
            tracing::info!(identifier, %document_type, "No extraction ruleset, skipping");
            return Ok(ProcessingOutcome::NoRuleset(document_type));
        };

        let record = match ruleset {
            Ruleset::Prescription => {
                let doc = self.analysis(identifier, analysis)?;
                let supplementary = self.provider.direct_text(identifier)?;
                let sections = extract(&doc, supplementary.as_deref());
                normalize(sections, document_type, &document_label(&doc))
            }
            Ruleset::Agreement => {
                let doc = self.analysis(identifier, analysis)?;
                let supplementary = self.provider.direct_text(identifier)?;
                let text = reconstruct_text(&doc, supplementary.as_deref());
                normalize_agreement(&text, has_signature(&doc), document_type, &document_label(&doc))
            }
            Ruleset::Queries => {
                let queries = queries_for(document_type.base());
                let doc = self.provider.analyze_with_queries(identifier, &queries)?;
                normalize_queries(query_answers(&doc), document_type, &document_label(&doc))
            }
        };

        tracing::info!(
            identifier,
            %document_type,
            fields = record.all_fields().count(),
            confidence = record.confidence,
            "Extracted document"
        );
        if confidence::needs_attention(&record) {
            tracing::warn!(
                identifier,
                %document_type,
                confidence = record.confidence,
                "Most expected fields are missing"
            );
        }

        Ok(ProcessingOutcome::Extracted(DocumentOutput {
            object_key: identifier.to_string(),
            document_type: document_type.base(),
            extracted_data: record,
        }))
    }

    /// Reuse the classification pass's analysis when it ran one.
    fn analysis(
        &self,
        identifier: &str,
        cached: Option<OcrDocument>,
    ) -> Result<OcrDocument, ProcessingError> {
        match cached {
            Some(doc) => Ok(doc),
            None => Ok(self.provider.analyze(identifier)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockKind, OcrBlock, QuerySpec, RelationshipType, Section};
    use crate::pipeline::ocr::MockOcrProvider;

    fn line(id: &str, text: &str) -> OcrBlock {
        OcrBlock::new(id, BlockKind::Line).with_text(text)
    }

    fn processor(provider: MockOcrProvider) -> DocumentProcessor {
        DocumentProcessor::new(Box::new(provider), PipelineConfig::default())
    }

    #[test]
    fn signed_agreement_end_to_end() {
        let key = "intake/2023/signed_agreement_0042.pdf";
        let doc = OcrDocument::new(vec![
            line("l1", "Rental Agreement"),
            line("l2", "Signed by customer: Maria Lopez"),
            OcrBlock::new("s1", BlockKind::Signature),
        ]);
        let provider = MockOcrProvider::new()
            .with_document(key, doc)
            .with_text(key, "Date: 03/10/2023");

        let outcome = processor(provider).process(key).unwrap();
        let ProcessingOutcome::Extracted(output) = outcome else {
            panic!("expected extraction, got {outcome:?}");
        };
        assert_eq!(output.document_type, DocumentType::SignedAgreement);

        let agreement = output.extracted_data.section(Section::Agreement).unwrap();
        let expected: Vec<(&str, &str)> = vec![
            ("Customer/Patient Name", "Maria Lopez"),
            ("Date", "03/10/2023"),
            ("Signature Present", "Yes"),
        ];
        let actual: Vec<(&str, &str)> = agreement
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(actual, expected);
        assert_eq!(output.extracted_data.document_label, "Rental Agreement");
    }

    #[test]
    fn prescription_by_content_reuses_classification_analysis() {
        let key = "scans/img_0007.png";
        let doc = OcrDocument::new(vec![
            line("l1", "The Breast Pump Depot"),
            line("l2", "Prescription - Mother Name: Ana Ruiz"),
            line("l3", "DOB: 01/02/1990  Physician: Dr. Lee"),
            line("l4", "QTY 1 Double Electric Breast Pump Code E0603"),
        ]);
        let provider = MockOcrProvider::new().with_document(key, doc);

        let outcome = processor(provider).process(key).unwrap();
        let ProcessingOutcome::Extracted(output) = outcome else {
            panic!("expected extraction, got {outcome:?}");
        };
        assert_eq!(output.document_type, DocumentType::Prescription);
        let record = &output.extracted_data;
        assert_eq!(record.field(Section::Patient, "First Name"), Some("Ana"));
        assert_eq!(record.field(Section::Patient, "Last Name"), Some("Ruiz"));
        assert_eq!(record.field(Section::Prescription, "Code"), Some("E0603"));
        assert_eq!(record.document_label, "The Breast Pump Depot");
    }

    #[test]
    fn pdf_direct_text_drives_content_classification() {
        let key = "scans/upload.pdf";
        let provider = MockOcrProvider::new()
            .with_text(key, "lorem ipsum")
            .with_failure(key, "analysis must not run");
        assert_eq!(
            processor(provider).process(key).unwrap(),
            ProcessingOutcome::Unclassified
        );
    }

    #[test]
    fn id_documents_have_no_ruleset() {
        let provider = MockOcrProvider::new();
        assert_eq!(
            processor(provider).process("drivers_id_card.jpg").unwrap(),
            ProcessingOutcome::NoRuleset(DocumentType::IdDocument)
        );
    }

    #[test]
    fn face_sheet_uses_query_answers() {
        let key = "FaceSheet_2023_01.pdf";
        let doc = OcrDocument::new(vec![
            line("l1", "Admission Face Sheet"),
            OcrBlock::new("q1", BlockKind::Query(QuerySpec::new("What is the MRN?", "mrn")))
                .with_relationship(RelationshipType::Answer, &["r1"]),
            OcrBlock::new("r1", BlockKind::QueryResult).with_text("MRN-42"),
            OcrBlock::new("q2", BlockKind::Query(QuerySpec::new("What is the Patient Race?", "patientrace"))),
        ]);
        let provider = MockOcrProvider::new().with_document(key, doc);

        let outcome = processor(provider).process(key).unwrap();
        let ProcessingOutcome::Extracted(output) = outcome else {
            panic!("expected extraction, got {outcome:?}");
        };
        let record = &output.extracted_data;
        assert_eq!(record.field(Section::Document, "MRN"), Some("MRN-42"));
        assert_eq!(record.field(Section::Document, "Patient Race"), Some(""));
        assert!((record.confidence - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn collaborator_failure_is_an_error() {
        let provider = MockOcrProvider::new().with_failure("prescription_9.tiff", "bad tiff");
        let err = processor(provider).process("prescription_9.tiff").unwrap_err();
        assert!(matches!(err, ProcessingError::Ocr(OcrError::UnsupportedFormat(_))));
    }

    #[test]
    fn admission_checks_extension_and_size() {
        let p = processor(MockOcrProvider::new());
        assert!(p.admit(&DocumentRef::new("a.pdf", Some(1024))).is_ok());
        assert!(p.admit(&DocumentRef::new("a.png", None)).is_ok());
        assert!(matches!(
            p.admit(&DocumentRef::new("a.docx", Some(10))),
            Err(ProcessingError::UnsupportedExtension(ext)) if ext == "docx"
        ));
        assert!(matches!(
            p.admit(&DocumentRef::new("a.pdf", Some(11 * 1024 * 1024))),
            Err(ProcessingError::TooLarge { .. })
        ));
    }
}
