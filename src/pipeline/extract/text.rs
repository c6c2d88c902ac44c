use std::collections::HashMap;

use crate::models::{BlockKind, OcrBlock, OcrDocument, RelationshipType, SelectionStatus};

/// Label used when a document has no readable text at all.
pub const NO_LABEL: &str = "No Label Found";

/// Token a selected checkbox contributes to its key or value text.
pub const CHECKED_TOKEN: &str = "X";

/// Linear document text: every LINE block, then the direct-text rendering.
///
/// The two sources are complementary: columnar templates OCR poorly into
/// lines but extract cleanly as plain text, and scans are the other way round.
pub fn reconstruct_text(doc: &OcrDocument, supplementary: Option<&str>) -> String {
    let mut text = doc.line_texts().collect::<Vec<_>>().join("\n");
    if let Some(extra) = supplementary.filter(|s| !s.trim().is_empty()) {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(extra);
    }
    text
}

/// Human-readable label: the first non-empty WORD or LINE text.
pub fn document_label(doc: &OcrDocument) -> String {
    doc.blocks
        .iter()
        .filter(|b| matches!(b.kind, BlockKind::Word | BlockKind::Line))
        .filter_map(|b| b.text.as_deref())
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| NO_LABEL.to_string())
}

/// Text of a key or value block, built from its CHILD relationships.
///
/// WORD children contribute their text; a SELECTED selection element
/// contributes `X`; anything else contributes nothing.
pub fn block_text(block: &OcrBlock, index: &HashMap<&str, &OcrBlock>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for child_id in block.related_ids(&RelationshipType::Child) {
        let Some(child) = index.get(child_id) else {
            continue;
        };
        match &child.kind {
            BlockKind::Word => {
                if let Some(text) = child.text.as_deref() {
                    parts.push(text);
                }
            }
            BlockKind::SelectionElement(SelectionStatus::Selected) => parts.push(CHECKED_TOKEN),
            _ => {}
        }
    }
    parts.join(" ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityType, OcrBlock};

    fn word(id: &str, text: &str) -> OcrBlock {
        OcrBlock::new(id, BlockKind::Word).with_text(text)
    }

    #[test]
    fn reconstruct_joins_lines_then_supplement() {
        let doc = OcrDocument::new(vec![
            OcrBlock::new("l1", BlockKind::Line).with_text("First line"),
            word("w1", "First"),
            OcrBlock::new("l2", BlockKind::Line).with_text("Second line"),
        ]);
        assert_eq!(reconstruct_text(&doc, None), "First line\nSecond line");
        assert_eq!(
            reconstruct_text(&doc, Some("Date: 03/10/2023")),
            "First line\nSecond line\nDate: 03/10/2023"
        );
    }

    #[test]
    fn reconstruct_without_lines_is_just_the_supplement() {
        let doc = OcrDocument::default();
        assert_eq!(reconstruct_text(&doc, Some("plain")), "plain");
        assert_eq!(reconstruct_text(&doc, Some("   ")), "");
    }

    #[test]
    fn label_is_first_non_empty_text() {
        let doc = OcrDocument::new(vec![
            OcrBlock::new("p", BlockKind::Other("PAGE".into())),
            OcrBlock::new("l0", BlockKind::Line).with_text("  "),
            OcrBlock::new("l1", BlockKind::Line).with_text(" The Breast Pump Depot "),
        ]);
        assert_eq!(document_label(&doc), "The Breast Pump Depot");
        assert_eq!(document_label(&OcrDocument::default()), NO_LABEL);
    }

    #[test]
    fn block_text_renders_words_and_checked_boxes() {
        let key = OcrBlock::new("k", BlockKind::KeyValueSet(EntityType::Key))
            .with_relationship(RelationshipType::Child, &["w1", "s1", "s2", "w2", "gone"]);
        let doc = OcrDocument::new(vec![
            key,
            word("w1", "Dr."),
            OcrBlock::new("s1", BlockKind::SelectionElement(SelectionStatus::Selected)),
            OcrBlock::new("s2", BlockKind::SelectionElement(SelectionStatus::NotSelected)),
            word("w2", "Lee"),
        ]);
        let index = doc.index();
        assert_eq!(block_text(&doc.blocks[0], &index), "Dr. X Lee");
    }

    #[test]
    fn block_text_without_children_is_empty() {
        let doc = OcrDocument::new(vec![OcrBlock::new(
            "v",
            BlockKind::KeyValueSet(EntityType::Value),
        )]);
        assert_eq!(block_text(&doc.blocks[0], &doc.index()), "");
    }
}
