//! End-to-end conversion of single documents.

use super::PeriodSegmenter;
use crate::convert::{render_groups, render_sentences, ConvertOptions, Converter};
use crate::loader::BiocCollection;
use crate::segment::UnicodeSegmenter;
use crate::types::{AssembledDocument, DocumentMetadata, Passage, RawSpan, SourceDocument};
use bioc_core::SectionFilterConfig;

#[cfg(test)]
mod tests {
    use super::*;

    /// Title at 0..20, one filler space, abstract at 21..47.
    fn sample_document() -> SourceDocument {
        let title = Passage::new("BRCA1 causes cancer.", Some(0))
            .with_section("TITLE")
            .with_annotations(vec![
                RawSpan::new(0, 5, "Gene"),
                RawSpan::new(2, 8, "Overlap"),
                RawSpan::new(13, 19, "Disease"),
            ]);
        let body = Passage::new("It is common. Very common.", Some(21)).with_section("ABSTRACT");

        let mut metadata = DocumentMetadata::default();
        metadata
            .infons
            .insert("article-id_pmid".to_string(), "35215501".to_string());
        metadata.infons.insert("year".to_string(), "2022".to_string());

        SourceDocument {
            id: "PMC001".to_string(),
            passages: vec![body, title],
            metadata,
        }
    }

    fn converter(options: ConvertOptions) -> Converter {
        Converter::new(PeriodSegmenter, options)
    }

    #[test]
    fn test_assemble_sections() {
        let doc = converter(ConvertOptions::default()).assemble(&sample_document());

        assert_eq!(doc.text, "BRCA1 causes cancer. It is common. Very common.");
        let ranges: Vec<(&str, usize, usize)> = doc
            .sections
            .iter()
            .map(|s| (s.label.as_str(), s.start, s.end))
            .collect();
        assert_eq!(ranges, vec![("TITLE", 0, 20), ("ABSTRACT", 21, 47)]);
        assert_eq!(doc.annotations.len(), 3);
    }

    #[test]
    fn test_convert_by_sections() {
        let converted = converter(ConvertOptions::default())
            .convert(sample_document())
            .unwrap();

        assert_eq!(converted.doc_id, "35215501");
        assert_eq!(converted.source_id, "PMC001");
        assert_eq!(converted.section_labels(), vec!["TITLE", "ABSTRACT"]);
        assert_eq!(converted.total_sentences(), 3);

        let abstract_sentences = &converted.groups[1].sentences;
        assert_eq!(abstract_sentences[0].sentence.text, "It is common.");
        assert_eq!(
            (abstract_sentences[1].sentence.abs_start, abstract_sentences[1].sentence.abs_end),
            (35, 47)
        );
    }

    #[test]
    fn test_overlapping_annotation_is_dropped() {
        let converted = converter(ConvertOptions::default())
            .convert(sample_document())
            .unwrap();

        let title = &converted.groups[0].sentences[0];
        let labels: Vec<&str> = title.annotations.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["Gene", "Disease"]);
        assert_eq!((title.annotations[1].rel_begin, title.annotations[1].rel_end), (13, 19));
    }

    #[test]
    fn test_single_combined_group() {
        let options = ConvertOptions {
            by_sections: false,
            ..ConvertOptions::default()
        };
        let converted = converter(options).convert(sample_document()).unwrap();

        assert_eq!(converted.section_labels(), vec!["ALL"]);
        assert_eq!(converted.groups[0].sentences.len(), 3);
        // sentences keep their own section label
        assert_eq!(converted.groups[0].sentences[2].section_label, "ABSTRACT");

        let files = render_groups(&converted, false).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "pmc001_combined.json");

        // no section field for combined output
        let json: serde_json::Value = serde_json::from_slice(&files[0].bytes).unwrap();
        let names: Vec<&str> = json["metadata"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["doc_id", "pub_date"]);
    }

    #[test]
    fn test_section_filter_maps_to_other() {
        let options = ConvertOptions {
            section_filter: Some(SectionFilterConfig::new(vec!["title".to_string()], false)),
            ..ConvertOptions::default()
        };
        let converted = converter(options).convert(sample_document()).unwrap();

        assert_eq!(converted.section_labels(), vec!["TITLE", "OTHER"]);
    }

    #[test]
    fn test_rendered_output() {
        let converted = converter(ConvertOptions::default())
            .convert(sample_document())
            .unwrap();
        let files = render_groups(&converted, true).unwrap();

        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["pmc001_title.json", "pmc001_abstract.json"]);

        let json: serde_json::Value = serde_json::from_slice(&files[0].bytes).unwrap();
        assert_eq!(json["id"], "pmc001_title");
        assert_eq!(json["metadata"][0]["tokens"][0], "35215501");
        assert_eq!(json["metadata"][1]["date"], "2022");
        assert_eq!(json["metadata"][2]["tokens"][0], "TITLE");

        let entity = &json["sentences"][0]["fields"][4]["tokens"];
        assert_eq!(entity[0], "B-Gene");
        assert_eq!(entity[1], "O");
        assert_eq!(entity[2], "B-Disease");
        assert_eq!(entity[3], "O");
    }

    #[test]
    fn test_shared_pmid_keeps_distinct_file_names() {
        let converter = converter(ConvertOptions::default());
        let first = converter.convert(sample_document()).unwrap();

        let mut other = sample_document();
        other.id = "PMC002".to_string();
        let second = converter.convert(other).unwrap();

        assert_eq!(first.doc_id, second.doc_id);
        let first_files = render_groups(&first, false).unwrap();
        let second_files = render_groups(&second, false).unwrap();
        assert_eq!(first_files[0].file_name, "pmc001_title.json");
        assert_eq!(second_files[0].file_name, "pmc002_title.json");
    }

    #[test]
    fn test_one_document_per_sentence() {
        let converted = converter(ConvertOptions::default())
            .convert(sample_document())
            .unwrap();
        let files = render_sentences(&converted, false).unwrap();

        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["pmc001_title_1.json", "pmc001_abstract_1.json", "pmc001_abstract_2.json"]
        );

        let json: serde_json::Value = serde_json::from_slice(&files[2].bytes).unwrap();
        assert_eq!(json["id"], "pmc001_abstract_2");
        assert_eq!(json["sentences"].as_array().unwrap().len(), 1);
        assert_eq!(json["sentences"][0]["fields"][0]["tokens"][0], "Very");
        assert_eq!(json["metadata"][2]["tokens"][0], "ABSTRACT");
    }

    #[test]
    fn test_annotation_across_sentences() {
        let text = "Alpha beta. Gamma delta.";
        let doc = AssembledDocument::from_text("doc", text, vec![RawSpan::new(6, 17, "X")]);
        let options = ConvertOptions {
            segment_per_section: false,
            ..ConvertOptions::default()
        };
        let converted = converter(options).convert(doc).unwrap();

        let sentences = &converted.groups[0].sentences;
        assert_eq!(converted.section_labels(), vec!["UNLABELED"]);
        assert_eq!(sentences.len(), 2);
        assert_eq!((sentences[0].annotations[0].rel_begin, sentences[0].annotations[0].rel_end), (6, 11));
        assert_eq!((sentences[1].annotations[0].rel_begin, sentences[1].annotations[0].rel_end), (0, 5));
    }

    #[test]
    fn test_empty_document() {
        let doc = SourceDocument {
            id: "empty".to_string(),
            passages: Vec::new(),
            metadata: DocumentMetadata::default(),
        };
        let converted = converter(ConvertOptions::default()).convert(doc).unwrap();

        assert!(converted.groups.is_empty());
        assert!(render_groups(&converted, false).unwrap().is_empty());
    }

    #[test]
    fn test_unicode_segmenter_from_xml() {
        let xml = r#"<collection><source>test</source><date>20230102</date>
<document><id>D1</id>
<passage><infon key="type">title</infon><offset>0</offset><text>Aspirin reduces fever.</text>
<annotation id="1"><infon key="type">Chemical</infon><location offset="0" length="7"/><text>Aspirin</text></annotation>
</passage>
<passage><infon key="type">abstract</infon><offset>23</offset><text>It was tested. Results were good.</text></passage>
</document></collection>"#;
        let collection = BiocCollection::from_str(xml).unwrap();
        let doc = collection.get("D1").unwrap().clone();

        let converted = Converter::new(UnicodeSegmenter::new(), ConvertOptions::default())
            .convert(doc)
            .unwrap();

        assert_eq!(converted.doc_id, "D1");
        assert_eq!(converted.section_labels(), vec!["title", "abstract"]);
        assert_eq!(converted.groups[1].sentences.len(), 2);

        let first = &converted.groups[0].sentences[0];
        assert_eq!(first.tokens[0].text, "Aspirin");
        assert_eq!(first.annotations[0].label, "Chemical");

        let files = render_groups(&converted, false).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&files[0].bytes).unwrap();
        assert_eq!(json["metadata"][1]["date"], "2023-01-02");
        assert_eq!(json["sentences"][0]["fields"][4]["tokens"][0], "B-Chemical");
    }
}
