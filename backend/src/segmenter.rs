use crate::error::{PechaError, Result};
use crate::types::{RecitationText, SegmentAnnotation, SegmentSpan};

/// Build contiguous spans by walking a char cursor over the tokens.
///
/// Empty tokens produce no span.
pub fn spans_from_tokens<I, S>(tokens: I) -> SegmentAnnotation
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cursor = 0;
    let mut ann = SegmentAnnotation::new();

    for token in tokens {
        let len = token.as_ref().chars().count();
        if len == 0 {
            continue;
        }
        ann.push(SegmentSpan::new(cursor, cursor + len));
        cursor += len;
    }

    ann
}

/// Tokenized mode: segment `content` with the tokens the tokenizer produced for it.
pub fn segment_tokens<S: AsRef<str>>(content: &str, tokens: &[S]) -> Result<SegmentAnnotation> {
    check_tokens_match(content, tokens)?;
    Ok(spans_from_tokens(tokens))
}

fn check_tokens_match<S: AsRef<str>>(content: &str, tokens: &[S]) -> Result<()> {
    let mut expected = content.chars();
    let mut offset = 0;

    for token in tokens {
        for found in token.as_ref().chars() {
            match expected.next() {
                Some(c) if c == found => offset += 1,
                other => {
                    return Err(PechaError::SegmentationMismatch {
                        offset,
                        expected: other.map(String::from).unwrap_or_default(),
                        found: found.to_string(),
                    });
                }
            }
        }
    }

    if let Some(c) = expected.next() {
        return Err(PechaError::SegmentationMismatch {
            offset,
            expected: c.to_string(),
            found: String::new(),
        });
    }

    Ok(())
}

/// Pre-segmented mode: derive one language's content and spans from the rows of a recitation text.
///
/// Every row yields exactly one span, so row alignment across languages is kept.
/// An empty row gives a zero-width span.
pub fn segment_parallel(text: &RecitationText, lang: &str) -> Result<(String, SegmentAnnotation)> {
    let mut content = String::new();
    let mut ann = SegmentAnnotation::with_capacity(text.text.len());
    let mut cursor = 0;

    for row in text.text.iter() {
        let segment = row.get(lang)
            .ok_or_else(|| PechaError::missing("text segment", lang))?;
        let len = segment.chars().count();
        content.push_str(segment);
        ann.push(SegmentSpan::new(cursor, cursor + len));
        cursor += len;
    }

    Ok((content, ann))
}

/// Check that `ann` starts at 0, is contiguous, and ends at the char length of `content`.
pub fn validate_segmentation(content: &str, ann: &SegmentAnnotation) -> Result<()> {
    let content_len = content.chars().count();
    let mut cursor = 0;

    for (idx, seg) in ann.iter().enumerate() {
        if seg.span.start != cursor {
            return Err(PechaError::InvalidSegmentation {
                message: format!("segment {} starts at {}, expected {}", idx, seg.span.start, cursor),
            });
        }
        if seg.span.end < seg.span.start {
            return Err(PechaError::InvalidSegmentation {
                message: format!("segment {} ends before it starts ({}..{})", idx, seg.span.start, seg.span.end),
            });
        }
        cursor = seg.span.end;
    }

    if cursor != content_len {
        return Err(PechaError::InvalidSegmentation {
            message: format!("segments cover {} chars, content has {}", cursor, content_len),
        });
    }

    Ok(())
}
