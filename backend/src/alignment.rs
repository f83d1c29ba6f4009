use crate::error::{PechaError, Result};
use crate::types::{AlignmentAnnotation, AlignmentSegment, SegmentAnnotation, TargetAnnotation, TargetSegment};

/// Index a root text's segmentation so translations can point at it.
pub fn build_target_annotation(source_segments: &SegmentAnnotation) -> TargetAnnotation {
    source_segments
        .iter()
        .enumerate()
        .map(|(index, seg)| TargetSegment { span: seg.span, index })
        .collect()
}

/// Align each translation segment with the root segment at the same position.
///
/// Purely positional. Callers check segment counts with `check_parallel_counts` first.
pub fn build_alignment_annotation(translation_segments: &SegmentAnnotation) -> AlignmentAnnotation {
    translation_segments
        .iter()
        .enumerate()
        .map(|(index, seg)| AlignmentSegment {
            span: seg.span,
            index,
            alignment_index: vec![index],
        })
        .collect()
}

pub fn check_parallel_counts(
    source_segments: &SegmentAnnotation,
    translation_segments: &SegmentAnnotation,
    language: &str,
) -> Result<()> {
    if source_segments.len() != translation_segments.len() {
        return Err(PechaError::SegmentCountMismatch {
            language: language.to_string(),
            source_count: source_segments.len(),
            translation_count: translation_segments.len(),
        });
    }
    Ok(())
}
