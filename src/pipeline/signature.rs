use crate::models::{BlockKind, OcrBlock, OcrDocument};

/// Minimum width (page fraction) of a textless line read as a signature stroke.
const SIGNATURE_MIN_WIDTH: f32 = 0.2;
/// Maximum height (page fraction) of a textless line read as a signature stroke.
const SIGNATURE_MAX_HEIGHT: f32 = 0.05;

const SIGNATURE_TERMS: &[&str] = &["signature", "signed", "/s/"];

/// Which heuristic found the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureEvidence {
    SignatureBlock,
    TextlessStroke,
    SignatureText,
}

/// Whether a signature is present. Heuristics run in order and the first hit
/// wins; false positives and negatives are accepted.
pub fn has_signature(doc: &OcrDocument) -> bool {
    signature_evidence(doc).is_some()
}

pub fn signature_evidence(doc: &OcrDocument) -> Option<SignatureEvidence> {
    if doc.blocks.iter().any(|b| b.kind == BlockKind::Signature) {
        return Some(SignatureEvidence::SignatureBlock);
    }
    if doc.blocks.iter().any(is_signature_stroke) {
        return Some(SignatureEvidence::TextlessStroke);
    }

    let all_text = doc
        .blocks
        .iter()
        .filter_map(|b| b.text.as_deref())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if SIGNATURE_TERMS.iter().any(|t| all_text.contains(t)) {
        return Some(SignatureEvidence::SignatureText);
    }
    None
}

fn is_signature_stroke(block: &OcrBlock) -> bool {
    block.kind == BlockKind::Line
        && block.is_textless()
        && block
            .bounding_box()
            .is_some_and(|bb| bb.width > SIGNATURE_MIN_WIDTH && bb.height < SIGNATURE_MAX_HEIGHT)
}
