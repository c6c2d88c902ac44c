pub mod config;
pub mod models;
pub mod pipeline;

use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::config::PipelineConfig;
use crate::pipeline::batch::{run_full_batch, BatchStatusEvent, BatchSummary, JsonDirectorySink};
use crate::pipeline::{DocumentProcessor, DocumentRef, FileOcrProvider};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter. Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}

/// Process a listing against OCR results cached under `ocr_root`, writing
/// records and the summary into `config.output_dir`.
pub fn run_cached_batch(
    ocr_root: &Path,
    documents: &[DocumentRef],
    config: PipelineConfig,
    progress_fn: Option<&dyn Fn(BatchStatusEvent)>,
) -> BatchSummary {
    tracing::info!("{} v{}", config::APP_NAME, config::APP_VERSION);
    let mut sink = JsonDirectorySink::new(&config.output_dir);
    let processor = DocumentProcessor::new(Box::new(FileOcrProvider::new(ocr_root)), config);
    run_full_batch(&processor, documents, &mut sink, progress_fn)
}
