//! Document assembly: passages into one coordinate space.
//!
//! Passages are placed at their declared offsets so that document-absolute
//! annotation offsets keep pointing at the right characters. Gaps are filled
//! with spaces; overlaps are clamped to the cursor so already-assembled text
//! is never rewritten.

use crate::types::{Passage, PassagePlacement};

/// Character used to fill gaps between passages.
pub const FILLER: char = ' ';

/// Merged text plus where each passage landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub text: String,

    /// Placements in assembly order
    pub placements: Vec<PassagePlacement>,
}

/// Assemble passages into a single text.
///
/// Passages are stably sorted by declared offset. A passage without an
/// offset takes the sort key of the passage before it in input order (0 for
/// the first one) and is then placed at the current cursor.
pub fn assemble_passages(passages: &[Passage]) -> Assembly {
    let order = assembly_order(passages);

    let mut text = String::new();
    let mut placements = Vec::with_capacity(passages.len());
    let mut cursor = 0usize;

    for passage_index in order {
        let passage = &passages[passage_index];
        let declared = passage.declared_offset.unwrap_or(cursor);

        if declared > cursor {
            let gap = declared - cursor;
            text.extend(std::iter::repeat(FILLER).take(gap));
            cursor = declared;
        } else if declared < cursor {
            tracing::warn!(
                passage_index,
                declared,
                cursor,
                "Passage overlaps assembled text; placing it at the cursor"
            );
        }

        let start = cursor;
        text.push_str(&passage.text);
        cursor += passage.text.chars().count();

        placements.push(PassagePlacement {
            passage_index,
            section_hint: passage.section_hint.clone(),
            start,
            end: cursor,
            length: cursor - start,
        });
    }

    tracing::debug!(
        "Assembled {} passages into {} characters",
        placements.len(),
        cursor
    );

    Assembly { text, placements }
}

/// Input indices in assembly order.
fn assembly_order(passages: &[Passage]) -> Vec<usize> {
    let mut previous_key = 0usize;
    let keys: Vec<usize> = passages
        .iter()
        .map(|p| {
            let key = p.declared_offset.unwrap_or(previous_key);
            previous_key = key;
            key
        })
        .collect();

    let mut order: Vec<usize> = (0..passages.len()).collect();
    order.sort_by_key(|&i| keys[i]);
    order
}
