//! Batch processing over a document listing.
//!
//! ```text
//! listing -> admit -> DocumentProcessor -> RecordSink -> summary
//! ```
//!
//! Strictly sequential; the only state shared across documents is the sink's
//! per-type output counter.

pub mod error;
pub mod runner;
pub mod sink;
pub mod traits;
pub mod types;

pub use error::SinkError;
pub use runner::run_full_batch;
pub use sink::{JsonDirectorySink, MemorySink, SUMMARY_FILE};
pub use traits::RecordSink;
pub use types::*;
