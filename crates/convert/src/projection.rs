//! Projection of absolute annotations onto sentences.

use crate::types::{ProjectedAnnotation, RawSpan, SentenceSpan};

/// Project annotations overlapping `sentence` into sentence-relative offsets.
///
/// An annotation overlaps when it starts before the sentence ends and ends
/// after the sentence starts. Offsets are clamped to `[0, len]`, so an
/// annotation crossing a sentence boundary is cut at the boundary and shows
/// up (clamped) in every sentence it touches.
pub fn project_annotations(sentence: &SentenceSpan, annotations: &[RawSpan]) -> Vec<ProjectedAnnotation> {
    let len = sentence.char_len();

    annotations
        .iter()
        .filter(|a| a.begin < sentence.abs_end && a.end > sentence.abs_start)
        .map(|a| ProjectedAnnotation {
            rel_begin: relative(a.begin, sentence.abs_start, len),
            rel_end: relative(a.end, sentence.abs_start, len),
            label: a.label.clone(),
        })
        .collect()
}

fn relative(offset: usize, abs_start: usize, len: usize) -> usize {
    offset.saturating_sub(abs_start).min(len)
}
