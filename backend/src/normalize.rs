use lazy_static::lazy_static;
use regex::Regex;

/// Closing glyph found at the end of many source files.
pub const TERMINATOR_GLYPH: char = '༄';

lazy_static! {
    // Editorial notes, e.g. 〔see variant〕. Greedy within a line: from the
    // first opening bracket to the last closing one.
    static ref RE_BRACKET_NOTE: Regex = Regex::new(r"〔.+〕").unwrap();
    // Inline directives, e.g. {D1234}
    static ref RE_DIRECTIVE: Regex = Regex::new(r"(?s)\{D.*?\}").unwrap();
}

/// One application of the cleanup rules, in order.
///
/// Only ever deletes characters.
pub fn normalize_pass(raw: &str) -> String {
    let mut text = RE_BRACKET_NOTE.replace_all(raw, "").into_owned();
    text = RE_DIRECTIVE.replace_all(&text, "").into_owned();

    if text.ends_with(TERMINATOR_GLYPH) {
        text.pop();
    }

    text.retain(|c| c != '\n' && c != '\r');
    text
}

/// Strip markup from raw canonical text.
///
/// A single pass can expose new markup, e.g. `{{D1}D2}` or a terminator
/// hidden behind a trailing newline, so passes repeat until the text is stable.
pub fn normalize(raw: &str) -> String {
    let mut text = normalize_pass(raw);
    loop {
        let next = normalize_pass(&text);
        if next == text {
            return text;
        }
        text = next;
    }
}
