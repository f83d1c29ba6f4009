//! Assembly of the payloads submitted to the content server.
//!
//! No network and no global state. Category id, author id and upload date
//! come in through [`AssemblerConfig`].

use std::collections::BTreeMap;

use chrono::Local;
use serde_json::Value;

use crate::alignment::{build_alignment_annotation, build_target_annotation, check_parallel_counts};
use crate::collaborators::{SearchSegmenter, Tokenizer};
use crate::error::{PechaError, Result};
use crate::segmenter::{segment_parallel, segment_tokens, validate_segmentation};
use crate::types::{
    Author, Contribution, Instance, InstanceMetadata, RecitationText, SearchSegmentation,
    SegmentAnnotation, SourceInfo, TextMetadata, TranslationInstance,
};

pub const SEARCH_SEGMENTATION_TYPE: &str = "search_segmentation";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerConfig {
    pub category_id: String,
    pub author_person_id: String,
    pub instance_type: String,
    pub default_source: String,
    pub colophon: String,
    pub incipit_title: BTreeMap<String, String>,
    /// `%Y-%m-%d`
    pub date: String,
}

impl AssemblerConfig {
    pub fn new(category_id: &str, author_person_id: &str) -> Self {
        let incipit_title = BTreeMap::from([
            ("en".to_string(), "Opening words".to_string()),
            ("bo".to_string(), "དབུ་ཚིག".to_string()),
        ]);

        AssemblerConfig {
            category_id: category_id.to_string(),
            author_person_id: author_person_id.to_string(),
            instance_type: "critical".to_string(),
            default_source: "openpecha.org".to_string(),
            colophon: "Sample colophon text".to_string(),
            incipit_title,
            date: today(),
        }
    }

    pub fn with_date(mut self, date: &str) -> Self {
        self.date = date.to_string();
        self
    }

    fn instance_metadata(&self, source: &str) -> InstanceMetadata {
        InstanceMetadata {
            instance_type: self.instance_type.clone(),
            source: source.to_string(),
            colophon: self.colophon.clone(),
            incipit_title: self.incipit_title.clone(),
        }
    }
}

pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

pub fn assemble_instance(
    config: &AssemblerConfig,
    source: &str,
    content: String,
    segmentation: SegmentAnnotation,
) -> Result<Instance> {
    validate_segmentation(&content, &segmentation)?;

    Ok(Instance {
        metadata: config.instance_metadata(source),
        annotation: segmentation,
        content,
    })
}

/// Instance of a standalone text, segmented by the tokenizer. `content` must already be normalized.
pub fn prepare_independent_instance(
    config: &AssemblerConfig,
    tokenizer: &dyn Tokenizer,
    content: &str,
) -> Result<Instance> {
    let tokens = tokenizer.tokenize(content)?;
    let segmentation = segment_tokens(content, &tokens)?;
    assemble_instance(config, &config.default_source, content.to_string(), segmentation)
}

/// Instance of the root language of a recitation text.
pub fn prepare_root_instance(config: &AssemblerConfig, text: &RecitationText, lang: &str) -> Result<Instance> {
    let (content, segmentation) = segment_parallel(text, lang)?;
    let source = source_info(text, lang)?;
    let link = required(&source.link, "source link", lang)?;
    assemble_instance(config, &link, content, segmentation)
}

pub fn prepare_text_metadata(
    config: &AssemblerConfig,
    text: &RecitationText,
    text_type: &str,
    lang: &str,
) -> Result<TextMetadata> {
    let title = text.title.get(lang)
        .ok_or_else(|| PechaError::missing("title", lang))?;
    let source = source_info(text, lang)?;

    Ok(TextMetadata {
        text_type: text_type.to_string(),
        title: BTreeMap::from([(lang.to_string(), title.clone())]),
        language: lang.to_string(),
        contributions: vec![Contribution {
            person_bdrc_id: config.author_person_id.clone(),
            role: "author".to_string(),
        }],
        date: config.date.clone(),
        bdrc: String::new(),
        category_id: config.category_id.clone(),
        copyright: required(&source.copyright, "source copyright", lang)?,
        license: required(&source.license, "source license", lang)?,
    })
}

/// Set the upload date on a caller-supplied text metadata object.
pub fn stamp_text_metadata(mut meta: Value, date: &str) -> Result<Value> {
    match meta.as_object_mut() {
        Some(obj) => {
            obj.insert("date".to_string(), Value::String(date.to_string()));
            Ok(meta)
        }
        None => Err(PechaError::InvalidInput {
            message: "text metadata must be a JSON object".to_string(),
        }),
    }
}

/// Translation of a recitation text into `lang`, aligned row by row with the root segmentation.
pub fn assemble_translation_instance(
    config: &AssemblerConfig,
    source_segments: &SegmentAnnotation,
    lang: &str,
    text: &RecitationText,
) -> Result<TranslationInstance> {
    let title = text.title.get(lang)
        .ok_or_else(|| PechaError::missing("title", lang))?;
    let source = source_info(text, lang)?;
    let link = required(&source.link, "source link", lang)?;
    let copyright = required(&source.copyright, "source copyright", lang)?;
    let license = required(&source.license, "source license", lang)?;

    let (content, segmentation) = segment_parallel(text, lang)?;
    check_parallel_counts(source_segments, &segmentation, lang)?;

    let target_annotation = build_target_annotation(source_segments);
    let alignment_annotation = build_alignment_annotation(&segmentation);

    Ok(TranslationInstance {
        language: lang.to_string(),
        content,
        title: title.clone(),
        source: link,
        author: Author {
            person_bdrc_id: config.author_person_id.clone(),
        },
        segmentation,
        target_annotation,
        alignment_annotation,
        copyright,
        license,
    })
}

pub fn wrap_search_segmentation(segment_ann: SegmentAnnotation) -> SearchSegmentation {
    SearchSegmentation {
        annotation_type: SEARCH_SEGMENTATION_TYPE.to_string(),
        annotation: segment_ann,
    }
}

/// Search segmentation of a standalone text, produced by the search segmenter.
pub fn prepare_search_segmentation(
    segmenter: &dyn SearchSegmenter,
    content: &str,
    lang: &str,
) -> Result<SearchSegmentation> {
    let (segmentation, _derived_text) = segmenter.segment_for_search(content, lang)?;
    Ok(wrap_search_segmentation(segmentation))
}

fn source_info<'a>(text: &'a RecitationText, lang: &str) -> Result<&'a SourceInfo> {
    text.source.get(lang)
        .ok_or_else(|| PechaError::missing("source", lang))
}

fn required(value: &Option<String>, field: &'static str, lang: &str) -> Result<String> {
    value.clone().ok_or_else(|| PechaError::missing(field, lang))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SegmentSpan, Span};

    fn two_row_text() -> RecitationText {
        serde_json::from_value(serde_json::json!({
            "text": [
                {"bo": "ཀ་ཁ།", "en": "Ka kha.", "lzh": "甲乙。"},
                {"bo": "ག་ང་", "en": " Ga nga", "lzh": "丙丁"}
            ],
            "title": {"bo": "གསོལ་འདེབས།", "en": "A Prayer", "lzh": "祈請文"},
            "source": {
                "bo": {"link": "https://example.org/bo", "copyright": "Public domain", "license": "CC0"},
                "en": {"link": "https://example.org/en", "copyright": "Translator", "license": "CC BY"}
            }
        })).unwrap()
    }

    fn config() -> AssemblerConfig {
        AssemblerConfig::new("CAT", "P1").with_date("2024-01-02")
    }

    #[test]
    fn test_translation_instance_two_segments() {
        let text = two_row_text();
        let root = prepare_root_instance(&config(), &text, "bo").unwrap();
        let trans = assemble_translation_instance(&config(), &root.annotation, "en", &text).unwrap();

        let s0 = Span::new(0, 4);
        let s1 = Span::new(4, 8);
        let t0 = Span::new(0, 7);
        let t1 = Span::new(7, 14);

        assert_eq!(root.annotation, vec![SegmentSpan { span: s0 }, SegmentSpan { span: s1 }]);
        assert_eq!(trans.content, "Ka kha. Ga nga");
        assert_eq!(trans.segmentation, vec![SegmentSpan { span: t0 }, SegmentSpan { span: t1 }]);

        let v = serde_json::to_value(&trans).unwrap();
        assert_eq!(v["target_annotation"], serde_json::json!([
            {"span": {"start": 0, "end": 4}, "index": 0},
            {"span": {"start": 4, "end": 8}, "index": 1},
        ]));
        assert_eq!(v["alignment_annotation"], serde_json::json!([
            {"span": {"start": 0, "end": 7}, "index": 0, "alignment_index": [0]},
            {"span": {"start": 7, "end": 14}, "index": 1, "alignment_index": [1]},
        ]));
        assert_eq!(trans.title, "A Prayer");
        assert_eq!(trans.source, "https://example.org/en");
        assert_eq!(trans.copyright, "Translator");
        assert_eq!(trans.license, "CC BY");
        assert_eq!(trans.author.person_bdrc_id, "P1");
    }

    #[test]
    fn test_missing_source_fails_only_that_language() {
        let text = two_row_text();
        let root = prepare_root_instance(&config(), &text, "bo").unwrap();

        let err = assemble_translation_instance(&config(), &root.annotation, "lzh", &text).unwrap_err();
        assert!(matches!(err, PechaError::MissingLanguageField { field: "source", .. }));

        assert!(assemble_translation_instance(&config(), &root.annotation, "en", &text).is_ok());
    }

    #[test]
    fn test_unequal_rows_rejected() {
        let text = two_row_text();
        let short = vec![SegmentSpan::new(0, 4)];
        let err = assemble_translation_instance(&config(), &short, "en", &text).unwrap_err();
        assert!(matches!(err, PechaError::SegmentCountMismatch { source_count: 1, translation_count: 2, .. }));
    }

    #[test]
    fn test_root_instance_metadata() {
        let text = two_row_text();
        let root = prepare_root_instance(&config(), &text, "bo").unwrap();
        assert_eq!(root.content, "ཀ་ཁ།ག་ང་");
        assert_eq!(root.metadata.instance_type, "critical");
        assert_eq!(root.metadata.source, "https://example.org/bo");
        assert_eq!(root.metadata.incipit_title.get("bo").map(String::as_str), Some("དབུ་ཚིག"));
    }

    #[test]
    fn test_text_metadata_uses_config() {
        let text = two_row_text();
        let meta = prepare_text_metadata(&config(), &text, "root", "bo").unwrap();
        assert_eq!(meta.category_id, "CAT");
        assert_eq!(meta.date, "2024-01-02");
        assert_eq!(meta.title.get("bo").map(String::as_str), Some("གསོལ་འདེབས།"));
        assert_eq!(meta.contributions[0].role, "author");
        assert_eq!(meta.license, "CC0");
    }

    #[test]
    fn test_assemble_instance_rechecks_coverage() {
        let bad = vec![SegmentSpan::new(0, 2)];
        assert!(assemble_instance(&config(), "src", "abc".to_string(), bad).is_err());
    }

    #[test]
    fn test_wrap_search_segmentation() {
        let seg = wrap_search_segmentation(vec![SegmentSpan::new(0, 3)]);
        let v = serde_json::to_value(&seg).unwrap();
        assert_eq!(v["type"], "search_segmentation");
        assert_eq!(v["annotation"][0]["span"]["end"], 3);
    }

    #[test]
    fn test_stamp_text_metadata() {
        let meta = serde_json::json!({"title": {"bo": "x"}, "date": "old"});
        let stamped = stamp_text_metadata(meta, "2024-05-06").unwrap();
        assert_eq!(stamped["date"], "2024-05-06");
        assert!(stamp_text_metadata(serde_json::json!([1]), "2024-05-06").is_err());
    }
}
