use std::collections::HashSet;

use lazy_static::lazy_static;

use crate::error::Result;
use crate::segmenter::spans_from_tokens;
use crate::types::SegmentAnnotation;

/// Splits normalized text into the units that become segments.
///
/// The tokens must concatenate back to the input exactly.
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>>;
}

/// Produces the segmentation the server indexes for search.
///
/// Returns the segmentation and the text it is a segmentation of.
pub trait SearchSegmenter {
    fn segment_for_search(&self, text: &str, lang: &str) -> Result<(SegmentAnnotation, String)>;
}

lazy_static! {
    static ref UNIT_BREAKS: HashSet<char> = [
        '།', '༎', '༑', '༏', '༐',
        '.', '?', '!', ';',
        '。', '！', '？', '；',
    ].into_iter().collect();
}

fn is_unit_break(c: char) -> bool {
    UNIT_BREAKS.contains(&c)
}

/// Cut after each run of shad or sentence punctuation, keeping the whitespace that follows it.
pub fn split_units(text: &str) -> Vec<String> {
    let mut units = Vec::new();
    let mut current = String::new();
    let mut closing = false;

    for c in text.chars() {
        if closing && !is_unit_break(c) && !c.is_whitespace() {
            units.push(std::mem::take(&mut current));
            closing = false;
        }
        current.push(c);
        if is_unit_break(c) {
            closing = true;
        }
    }

    if !current.is_empty() {
        units.push(current);
    }

    units
}

/// Shad-delimited tokenizer for Tibetan, also usable on Latin and CJK punctuation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShadTokenizer;

impl Tokenizer for ShadTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        Ok(split_units(text))
    }
}

/// Search segmentation with the same unit boundaries as `ShadTokenizer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceSearchSegmenter;

impl SearchSegmenter for SentenceSearchSegmenter {
    fn segment_for_search(&self, text: &str, _lang: &str) -> Result<(SegmentAnnotation, String)> {
        let units = split_units(text);
        Ok((spans_from_tokens(&units), text.to_string()))
    }
}
