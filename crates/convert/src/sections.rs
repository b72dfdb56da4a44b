//! Section boundary tracking.
//!
//! Consecutive passages with the same (normalized) section label are merged
//! into one `SectionRange`. Runs of the same label separated by a different
//! label stay separate ranges.

use bioc_core::SectionFilterConfig;

use crate::types::{PassagePlacement, SectionRange, OTHER, UNLABELED};

/// Normalize a passage's section hint.
///
/// Missing or blank hints become `UNLABELED`. With a filter, hints not on
/// the allow-list become `OTHER`; allowed hints keep their original spelling.
pub fn normalize_label(hint: Option<&str>, filter: Option<&SectionFilterConfig>) -> String {
    let hint = match hint.map(str::trim) {
        Some(h) if !h.is_empty() => h,
        _ => return UNLABELED.to_string(),
    };

    match filter {
        Some(filter) if !filter.allows(hint) => OTHER.to_string(),
        _ => hint.to_string(),
    }
}

/// Merge placements (in assembly order) into section ranges.
pub fn merge_sections(
    placements: &[PassagePlacement],
    filter: Option<&SectionFilterConfig>,
) -> Vec<SectionRange> {
    let mut sections: Vec<SectionRange> = Vec::new();

    for placement in placements {
        let label = normalize_label(placement.section_hint.as_deref(), filter);

        match sections.last_mut() {
            Some(current) if current.label == label => {
                current.end = placement.end;
                current.passage_indices.push(placement.passage_index);
            }
            _ => sections.push(SectionRange {
                label,
                start: placement.start,
                end: placement.end,
                passage_indices: vec![placement.passage_index],
            }),
        }
    }

    tracing::debug!(
        "Merged {} passages into {} sections",
        placements.len(),
        sections.len()
    );

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(index: usize, hint: Option<&str>, start: usize, end: usize) -> PassagePlacement {
        PassagePlacement {
            passage_index: index,
            section_hint: hint.map(str::to_string),
            start,
            end,
            length: end - start,
        }
    }

    #[test]
    fn test_consecutive_passages_merge() {
        let placements = vec![
            placement(0, Some("TITLE"), 0, 10),
            placement(1, Some("ABSTRACT"), 11, 40),
            placement(2, Some("ABSTRACT"), 41, 90),
            placement(3, Some("INTRO"), 91, 120),
        ];
        let sections = merge_sections(&placements, None);

        assert_eq!(sections.len(), 3);
        assert_eq!(sections[1].label, "ABSTRACT");
        assert_eq!((sections[1].start, sections[1].end), (11, 90));
        assert_eq!(sections[1].passage_indices, vec![1, 2]);
    }

    #[test]
    fn test_non_adjacent_runs_stay_separate() {
        let placements = vec![
            placement(0, Some("METHODS"), 0, 10),
            placement(1, Some("RESULTS"), 10, 20),
            placement(2, Some("METHODS"), 20, 30),
        ];
        let sections = merge_sections(&placements, None);

        let labels: Vec<&str> = sections.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["METHODS", "RESULTS", "METHODS"]);
        assert_eq!(sections[2].passage_indices, vec![2]);
    }

    #[test]
    fn test_missing_hint_is_unlabeled() {
        let placements = vec![
            placement(0, None, 0, 5),
            placement(1, Some(""), 5, 9),
            placement(2, Some("TITLE"), 9, 14),
        ];
        let sections = merge_sections(&placements, None);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].label, UNLABELED);
        assert_eq!(sections[0].passage_indices, vec![0, 1]);
    }

    #[test]
    fn test_filter_remaps_to_other_before_merge() {
        let filter = SectionFilterConfig::new(vec!["abstract".to_string()], false);
        let placements = vec![
            placement(0, Some("TITLE"), 0, 5),
            placement(1, Some("INTRO"), 5, 10),
            placement(2, Some("Abstract"), 10, 20),
        ];
        let sections = merge_sections(&placements, Some(&filter));

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].label, OTHER);
        assert_eq!(sections[0].passage_indices, vec![0, 1]);
        assert_eq!(sections[1].label, "Abstract");
    }

    #[test]
    fn test_unlabeled_survives_filter() {
        let filter = SectionFilterConfig::new(vec!["TITLE".to_string()], true);
        assert_eq!(normalize_label(None, Some(&filter)), UNLABELED);
        assert_eq!(normalize_label(Some("title"), Some(&filter)), OTHER);
        assert_eq!(normalize_label(Some("TITLE"), Some(&filter)), "TITLE");
    }

    #[test]
    fn test_ranges_are_ordered_and_disjoint() {
        let placements = vec![
            placement(0, Some("A"), 0, 4),
            placement(1, Some("B"), 6, 9),
            placement(2, Some("B"), 9, 15),
            placement(3, Some("A"), 20, 22),
        ];
        let sections = merge_sections(&placements, None);

        for pair in sections.windows(2) {
            assert!(pair[0].start <= pair[1].start);
            assert!(pair[0].end <= pair[1].start);
        }
    }
}
