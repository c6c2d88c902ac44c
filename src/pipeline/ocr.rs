//! OCR collaborator seam.
//!
//! The pipeline never talks to an object store or an OCR service directly:
//! it asks an [`OcrProvider`] for the analysis of a document identifier and,
//! optionally, for an independently extracted plain-text rendering.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{OcrDocument, QuerySpec};

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed OCR payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No OCR result for document: {0}")]
    NotFound(String),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("OCR job did not succeed (status {0})")]
    JobFailed(String),
}

/// OCR collaborator abstraction (allows mocking for tests).
pub trait OcrProvider {
    /// Full analysis (words, lines, forms, selection elements, signatures).
    fn analyze(&self, identifier: &str) -> Result<OcrDocument, OcrError>;

    /// Analysis that also answers the given questions. Providers that serve
    /// precomputed results may ignore the queries.
    fn analyze_with_queries(
        &self,
        identifier: &str,
        _queries: &[QuerySpec],
    ) -> Result<OcrDocument, OcrError> {
        self.analyze(identifier)
    }

    /// Direct text extraction for paginated formats; `None` when unavailable.
    fn direct_text(&self, identifier: &str) -> Result<Option<String>, OcrError>;
}

/// Reject analyses whose job ended in anything other than success.
pub fn ensure_succeeded(doc: &OcrDocument) -> Result<(), OcrError> {
    match doc.job_status.as_deref() {
        None | Some("SUCCEEDED") | Some("PARTIAL_SUCCESS") => Ok(()),
        Some(other) => Err(OcrError::JobFailed(other.to_string())),
    }
}

/// Serves analyses captured earlier as JSON files.
///
/// `<root>/<identifier>.json` holds the analysis payload and the optional
/// `<root>/<identifier>.txt` holds the direct-text rendering.
pub struct FileOcrProvider {
    root: PathBuf,
}

impl FileOcrProvider {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn sidecar(&self, identifier: &str, suffix: &str) -> PathBuf {
        self.root.join(format!("{identifier}.{suffix}"))
    }
}

impl OcrProvider for FileOcrProvider {
    fn analyze(&self, identifier: &str) -> Result<OcrDocument, OcrError> {
        let path = self.sidecar(identifier, "json");
        if !path.exists() {
            return Err(OcrError::NotFound(identifier.to_string()));
        }
        let raw = std::fs::read_to_string(&path)?;
        let doc = OcrDocument::from_json(&raw)?;
        ensure_succeeded(&doc)?;
        tracing::debug!(
            identifier,
            blocks = doc.blocks.len(),
            pages = doc.document_metadata.pages,
            "Loaded cached OCR analysis"
        );
        Ok(doc)
    }

    fn direct_text(&self, identifier: &str) -> Result<Option<String>, OcrError> {
        let path = self.sidecar(identifier, "txt");
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }
}

/// In-memory provider for unit testing without an OCR service.
#[derive(Default)]
pub struct MockOcrProvider {
    documents: HashMap<String, OcrDocument>,
    texts: HashMap<String, String>,
    failures: HashMap<String, String>,
}

impl MockOcrProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, identifier: &str, doc: OcrDocument) -> Self {
        self.documents.insert(identifier.to_string(), doc);
        self
    }

    pub fn with_text(mut self, identifier: &str, text: &str) -> Self {
        self.texts.insert(identifier.to_string(), text.to_string());
        self
    }

    /// Make `analyze` fail for this identifier with an unsupported-format error.
    pub fn with_failure(mut self, identifier: &str, reason: &str) -> Self {
        self.failures
            .insert(identifier.to_string(), reason.to_string());
        self
    }
}

impl OcrProvider for MockOcrProvider {
    fn analyze(&self, identifier: &str) -> Result<OcrDocument, OcrError> {
        if let Some(reason) = self.failures.get(identifier) {
            return Err(OcrError::UnsupportedFormat(reason.clone()));
        }
        self.documents
            .get(identifier)
            .cloned()
            .ok_or_else(|| OcrError::NotFound(identifier.to_string()))
    }

    fn direct_text(&self, identifier: &str) -> Result<Option<String>, OcrError> {
        Ok(self.texts.get(identifier).cloned())
    }
}
