use pecha_backend::alignment::{build_alignment_annotation, build_target_annotation};
use pecha_backend::collaborators::split_units;
use pecha_backend::normalize::normalize;
use pecha_backend::segmenter::{segment_tokens, spans_from_tokens, validate_segmentation};

const PIECES: [&str; 9] = ["〔", "〕", "{D", "}", "༄", "\n", "a", "ཀ་", "།"];

/// Every string made of up to `max_len` pieces.
fn piece_strings(max_len: usize) -> Vec<String> {
    let mut all = vec![String::new()];
    let mut frontier = vec![String::new()];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for prefix in &frontier {
            for piece in PIECES {
                next.push(format!("{}{}", prefix, piece));
            }
        }
        all.extend(next.iter().cloned());
        frontier = next;
    }
    all
}

#[test]
fn test_normalize_is_idempotent() {
    for s in piece_strings(4) {
        let once = normalize(&s);
        assert_eq!(normalize(&once), once, "input: {:?}", s);
    }
}

#[test]
fn test_normalize_never_adds_chars() {
    for s in piece_strings(3) {
        assert!(normalize(&s).chars().count() <= s.chars().count(), "input: {:?}", s);
    }
}

#[test]
fn test_spans_slice_back_to_tokens() {
    for s in piece_strings(3) {
        let tokens = split_units(&s);
        let ann = segment_tokens(&s, &tokens).unwrap();

        validate_segmentation(&s, &ann).unwrap();
        let sliced: Vec<&str> = ann.iter().map(|seg| seg.span.slice(&s)).collect();
        assert_eq!(sliced, tokens, "input: {:?}", s);
    }
}

#[test]
fn test_spans_are_contiguous() {
    let token_sets: Vec<Vec<&str>> = vec![
        vec!["a", "bc", "d"],
        vec!["ཨོཾ་", "མ་ཎི་", "པདྨེ་", "ཧཱུྃ།"],
        vec!["諸佛", "正法", "，"],
        vec!["x"],
    ];
    for tokens in token_sets {
        let ann = spans_from_tokens(&tokens);
        assert_eq!(ann.len(), tokens.len());
        assert_eq!(ann[0].span.start, 0);
        for pair in ann.windows(2) {
            assert_eq!(pair[0].span.end, pair[1].span.start);
        }
        assert_eq!(ann.last().unwrap().span.end, tokens.concat().chars().count());
    }
}

#[test]
fn test_tokenized_scenario() {
    let ann = segment_tokens("abcd", &["a", "bc", "d"]).unwrap();
    let spans: Vec<(usize, usize)> = ann.iter().map(|s| (s.span.start, s.span.end)).collect();
    assert_eq!(spans, vec![(0, 1), (1, 3), (3, 4)]);
}

#[test]
fn test_target_and_alignment_indexes() {
    for s in piece_strings(3) {
        let ann = spans_from_tokens(split_units(&s));
        let target = build_target_annotation(&ann);
        let alignment = build_alignment_annotation(&ann);

        assert_eq!(target.len(), ann.len());
        assert_eq!(alignment.len(), ann.len());
        for i in 0..ann.len() {
            assert_eq!(target[i].span, ann[i].span);
            assert_eq!(target[i].index, i);
            assert_eq!(alignment[i].alignment_index, vec![i]);
        }
    }
}
