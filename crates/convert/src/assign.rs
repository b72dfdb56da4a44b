//! Section assignment and grouping.

use crate::types::{SectionGroup, SectionRange, SectionedSentence, SentenceSpan, UNLABELED};

/// Pick the section label for a sentence.
///
/// Tries the sentence start, then its midpoint, then its last character.
/// The first range in list order containing the probe wins. Sentences that
/// fall entirely outside every range are `UNLABELED`.
pub fn assign_section(sentence: &SentenceSpan, sections: &[SectionRange]) -> String {
    let start = sentence.abs_start;
    let end = sentence.abs_end;

    let mut probes = vec![start, start + end.saturating_sub(start) / 2];
    if end > start {
        probes.push(end - 1);
    }

    probes
        .into_iter()
        .find_map(|offset| sections.iter().find(|s| s.contains(offset)))
        .map(|s| s.label.clone())
        .unwrap_or_else(|| UNLABELED.to_string())
}

/// Group sentences by section label, in order of first appearance.
pub fn group_by_section(sentences: Vec<SectionedSentence>) -> Vec<SectionGroup> {
    let mut groups: Vec<SectionGroup> = Vec::new();

    for sentence in sentences {
        match groups.iter_mut().find(|g| g.label == sentence.section_label) {
            Some(group) => group.sentences.push(sentence),
            None => groups.push(SectionGroup {
                label: sentence.section_label.clone(),
                sentences: vec![sentence],
            }),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(label: &str, start: usize, end: usize) -> SectionRange {
        SectionRange {
            label: label.to_string(),
            start,
            end,
            passage_indices: vec![0],
        }
    }

    fn sentence_at(start: usize, end: usize) -> SentenceSpan {
        SentenceSpan::new("x".repeat(end.saturating_sub(start)), start, end)
    }

    fn sectioned(label: &str, start: usize) -> SectionedSentence {
        SectionedSentence {
            sentence: sentence_at(start, start + 1),
            annotations: Vec::new(),
            section_label: label.to_string(),
            tokens: Vec::new(),
        }
    }

    #[test]
    fn test_start_inside_range() {
        let sections = vec![range("TITLE", 0, 10), range("ABSTRACT", 10, 30)];
        assert_eq!(assign_section(&sentence_at(25, 32), &sections), "ABSTRACT");
        assert_eq!(assign_section(&sentence_at(0, 9), &sections), "TITLE");
    }

    #[test]
    fn test_midpoint_fallback() {
        let sections = vec![range("TITLE", 0, 9), range("ABSTRACT", 10, 30)];
        assert_eq!(assign_section(&sentence_at(9, 11), &sections), "ABSTRACT");
    }

    #[test]
    fn test_last_character_fallback() {
        let sections = vec![range("TITLE", 0, 5), range("BODY", 12, 30)];
        // start 6 and midpoint 9 miss; the last character (12) hits BODY
        assert_eq!(assign_section(&sentence_at(6, 13), &sections), "BODY");
    }

    #[test]
    fn test_unassigned_sentence() {
        let sections = vec![range("TITLE", 0, 5)];
        assert_eq!(assign_section(&sentence_at(40, 50), &sections), UNLABELED);
        assert_eq!(assign_section(&sentence_at(40, 40), &[]), UNLABELED);
    }

    #[test]
    fn test_first_range_wins_on_overlap() {
        let sections = vec![range("A", 0, 20), range("B", 5, 20)];
        assert_eq!(assign_section(&sentence_at(6, 8), &sections), "A");
    }

    #[test]
    fn test_grouping_keeps_first_appearance_order() {
        let groups = group_by_section(vec![
            sectioned("INTRO", 0),
            sectioned("TITLE", 2),
            sectioned("INTRO", 4),
        ]);

        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["INTRO", "TITLE"]);
        assert_eq!(groups[0].sentences.len(), 2);
        assert_eq!(groups[0].sentences[1].sentence.abs_start, 4);
    }
}
