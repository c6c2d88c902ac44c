pub mod batch;
pub mod classify;
pub mod confidence;
pub mod extract;
pub mod normalize;
pub mod ocr;
pub mod processor;
pub mod signature;
pub mod templates;

pub use classify::Classification;
pub use ocr::{FileOcrProvider, MockOcrProvider, OcrError, OcrProvider};
pub use processor::{DocumentOutput, DocumentProcessor, DocumentRef, ProcessingError, ProcessingOutcome};
