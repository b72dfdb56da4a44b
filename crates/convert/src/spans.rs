//! Overlapping annotation removal.

use crate::types::RawSpan;

/// Remove overlapping spans, keeping the earliest-starting one.
///
/// Spans are stably sorted by `begin` (ties keep input order), then a span is
/// accepted only when it starts at or after the end of the last accepted
/// span. Label and length play no part in the decision.
pub fn normalize_spans(spans: &[RawSpan]) -> Vec<RawSpan> {
    let mut sorted: Vec<&RawSpan> = spans.iter().collect();
    sorted.sort_by_key(|s| s.begin);

    let mut accepted: Vec<RawSpan> = Vec::with_capacity(sorted.len());
    for span in sorted {
        match accepted.last() {
            Some(last) if span.begin < last.end => {
                tracing::debug!(
                    begin = span.begin,
                    end = span.end,
                    label = %span.label,
                    "Dropping span overlapping [{}, {})",
                    last.begin,
                    last.end
                );
            }
            _ => accepted.push(span.clone()),
        }
    }

    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triples(spans: &[RawSpan]) -> Vec<(usize, usize, &str)> {
        spans.iter().map(|s| (s.begin, s.end, s.label.as_str())).collect()
    }

    #[test]
    fn test_later_overlap_is_dropped() {
        let spans = vec![
            RawSpan::new(0, 10, "A"),
            RawSpan::new(5, 15, "B"),
            RawSpan::new(20, 30, "C"),
        ];
        let result = normalize_spans(&spans);
        assert_eq!(triples(&result), vec![(0, 10, "A"), (20, 30, "C")]);
    }

    #[test]
    fn test_unsorted_input() {
        let spans = vec![
            RawSpan::new(20, 25, "C"),
            RawSpan::new(3, 8, "B"),
            RawSpan::new(0, 4, "A"),
        ];
        let result = normalize_spans(&spans);
        assert_eq!(triples(&result), vec![(0, 4, "A"), (20, 25, "C")]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let spans = vec![
            RawSpan::new(4, 6, "short"),
            RawSpan::new(4, 20, "long"),
        ];
        let result = normalize_spans(&spans);
        assert_eq!(triples(&result), vec![(4, 6, "short")]);
    }

    #[test]
    fn test_adjacent_spans_both_kept() {
        let spans = vec![RawSpan::new(0, 5, "A"), RawSpan::new(5, 9, "B")];
        assert_eq!(normalize_spans(&spans).len(), 2);
    }

    #[test]
    fn test_degenerate_spans() {
        let spans = vec![
            RawSpan::new(0, 10, "A"),
            RawSpan::new(4, 4, "inside"),
            RawSpan::new(15, 11, "backwards"),
            RawSpan::new(11, 14, "after"),
            RawSpan::new(16, 18, "tail"),
        ];
        let result = normalize_spans(&spans);

        // The zero-width span inside A is dropped; the backwards span is
        // accepted and blocks nothing after it.
        assert_eq!(
            triples(&result),
            vec![
                (0, 10, "A"),
                (11, 14, "after"),
                (15, 11, "backwards"),
                (16, 18, "tail")
            ]
        );
    }

    #[test]
    fn test_result_never_overlaps() {
        let spans = vec![
            RawSpan::new(7, 12, "a"),
            RawSpan::new(0, 3, "b"),
            RawSpan::new(2, 9, "c"),
            RawSpan::new(12, 13, "d"),
            RawSpan::new(10, 30, "e"),
            RawSpan::new(14, 16, "f"),
        ];
        let result: Vec<RawSpan> = normalize_spans(&spans)
            .into_iter()
            .filter(|s| !s.is_degenerate())
            .collect();

        for i in 0..result.len() {
            for j in (i + 1)..result.len() {
                assert!(result[i].end <= result[j].begin);
            }
        }
    }
}
