use super::error::SinkError;
use super::types::BatchSummary;
use crate::pipeline::processor::DocumentOutput;

/// Destination for finished records and the batch summary.
pub trait RecordSink {
    fn write_record(&mut self, output: &DocumentOutput) -> Result<(), SinkError>;

    fn write_summary(&mut self, summary: &BatchSummary) -> Result<(), SinkError>;
}
