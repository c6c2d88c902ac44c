use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::error::SinkError;
use super::traits::RecordSink;
use super::types::BatchSummary;
use crate::models::DocumentType;
use crate::pipeline::processor::DocumentOutput;

pub const SUMMARY_FILE: &str = "processing_summary.json";

/// Writes `<type>_extract_<n>.json` per record and the summary file into one
/// directory. `n` counts from 1 per document type.
pub struct JsonDirectorySink {
    dir: PathBuf,
    counters: HashMap<DocumentType, u32>,
}

impl JsonDirectorySink {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            counters: HashMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_json<T: serde::Serialize>(&self, name: &str, value: &T) -> Result<PathBuf, SinkError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

impl RecordSink for JsonDirectorySink {
    fn write_record(&mut self, output: &DocumentOutput) -> Result<(), SinkError> {
        let next = self.counters.get(&output.document_type).copied().unwrap_or(0) + 1;
        let name = format!("{}_extract_{next}.json", output.document_type.slug());
        let path = self.write_json(&name, output)?;
        self.counters.insert(output.document_type, next);
        tracing::debug!(path = %path.display(), "Wrote extraction record");
        Ok(())
    }

    fn write_summary(&mut self, summary: &BatchSummary) -> Result<(), SinkError> {
        let path = self.write_json(SUMMARY_FILE, summary)?;
        tracing::debug!(path = %path.display(), "Wrote batch summary");
        Ok(())
    }
}

/// Keeps everything in memory; for embedding callers and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<DocumentOutput>,
    pub summary: Option<BatchSummary>,
}

impl RecordSink for MemorySink {
    fn write_record(&mut self, output: &DocumentOutput) -> Result<(), SinkError> {
        self.records.push(output.clone());
        Ok(())
    }

    fn write_summary(&mut self, summary: &BatchSummary) -> Result<(), SinkError> {
        self.summary = Some(summary.clone());
        Ok(())
    }
}
