use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Deserialize};

/// Half-open character range `[start, end)` over one content string.
///
/// Offsets count chars, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Slice `content` by this span's char offsets.
    pub fn slice<'a>(&self, content: &'a str) -> &'a str {
        let byte_at = |char_idx: usize| {
            content
                .char_indices()
                .nth(char_idx)
                .map(|(i, _)| i)
                .unwrap_or(content.len())
        };
        let start = byte_at(self.start);
        let end = byte_at(self.end);
        &content[start..end.max(start)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSpan {
    pub span: Span,
}

impl SegmentSpan {
    pub fn new(start: usize, end: usize) -> Self {
        SegmentSpan { span: Span::new(start, end) }
    }
}

/// Ordered segmentation of one language's content. Position is the segment index.
pub type SegmentAnnotation = Vec<SegmentSpan>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSegment {
    pub span: Span,
    pub index: usize,
}

pub type TargetAnnotation = Vec<TargetSegment>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentSegment {
    pub span: Span,
    pub index: usize,
    /// Positions in the root text's target annotation.
    pub alignment_index: Vec<usize>,
}

pub type AlignmentAnnotation = Vec<AlignmentSegment>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceMetadata {
    #[serde(rename = "type")]
    pub instance_type: String,
    pub source: String,
    pub colophon: String,
    pub incipit_title: BTreeMap<String, String>,
}

/// A canonical text instance as submitted to the content server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub metadata: InstanceMetadata,
    pub annotation: SegmentAnnotation,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub person_bdrc_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationInstance {
    pub language: String,
    pub content: String,
    pub title: String,
    pub source: String,
    pub author: Author,
    pub segmentation: SegmentAnnotation,
    pub target_annotation: TargetAnnotation,
    pub alignment_annotation: AlignmentAnnotation,
    pub copyright: String,
    pub license: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub person_bdrc_id: String,
    pub role: String,
}

/// Payload of the create-text call for recitation texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMetadata {
    #[serde(rename = "type")]
    pub text_type: String,
    pub title: BTreeMap<String, String>,
    pub language: String,
    pub contributions: Vec<Contribution>,
    pub date: String,
    pub bdrc: String,
    pub category_id: String,
    pub copyright: String,
    pub license: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSegmentation {
    #[serde(rename = "type")]
    pub annotation_type: String,
    pub annotation: SegmentAnnotation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub link: Option<String>,
    pub copyright: Option<String>,
    pub license: Option<String>,
}

/// A recited prayer: row-aligned segments, one string per language in each row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecitationText {
    pub text: Vec<BTreeMap<String, String>>,
    #[serde(default)]
    pub title: BTreeMap<String, String>,
    #[serde(default)]
    pub source: BTreeMap<String, SourceInfo>,
}

macro_rules! server_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }
    };
}

server_id!(TextId);
server_id!(InstanceId);
server_id!(AnnotationId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierBundle {
    pub text_id: TextId,
    pub instance_id: InstanceId,
    pub search_seg_ann_id: AnnotationId,
}

/// Identifiers of a recitation text keyed by language, root included.
pub type RecitationBundle = BTreeMap<String, IdentifierBundle>;
