//! Strategy 3 - deep per-entry repair
//!
//! When the document as a whole will not parse, salvage what it contains:
//! first a cheap global brace balance and one more full parse, then the
//! `entries` array is located textually, split into candidate fragments,
//! and each fragment is repaired and parsed on its own. Fragments that
//! still fail get offset-directed patching: the parser's reported error
//! position is used to try three single-character edits, each validated by
//! a fresh parse. Fragments that never parse are dropped, not raised.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

use super::repair;
use super::{DecodeContext, Recovered};

static ENTRIES_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""entries"\s*:\s*\["#).expect("valid pattern"));
static FRAGMENT_BOUNDARY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\}\s*,\s*\{").expect("valid pattern"));

pub(crate) fn attempt(raw: &str, _ctx: &DecodeContext) -> Option<Recovered> {
    // A single missing closer somewhere is common enough to warrant one
    // whole-document retry before fragment surgery.
    let balanced = repair::balance_braces(raw);
    if let Some(span) = super::outer_object_span(&balanced)
        && let Some(rec) = super::parse_document(&repair::clean(span))
        && !rec.entries.is_empty()
    {
        debug!(entries = rec.entries.len(), "deep: global balance recovered document");
        return Some(rec);
    }

    let body = entries_array_body(raw)?;
    let fragments = split_fragments(&body);
    debug!(fragments = fragments.len(), "deep: split entries array");

    let mut entries = Vec::new();
    for fragment in &fragments {
        match repair_fragment(fragment) {
            Some(value) => {
                if let Some(entry) = super::entry_from_value(&value)
                    && entry.is_valid()
                {
                    entries.push(entry.normalized());
                } else {
                    debug!(fragment_len = fragment.len(), "deep: fragment parsed but entry invalid");
                }
            }
            None => debug!(fragment_len = fragment.len(), "deep: fragment unrecoverable, dropping"),
        }
    }

    if entries.is_empty() {
        None
    } else {
        Some(Recovered { name: None, entries })
    }
}

/// Locate the textual body of the `entries` array: everything between the
/// opening `[` and its closing `]` (or the end of the text when truncated).
fn entries_array_body(raw: &str) -> Option<String> {
    let start = ENTRIES_MARKER_RE.find(raw)?.end();
    let rest = &raw[start..];

    let mut bracket_depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' => bracket_depth += 1,
            ']' => {
                if bracket_depth == 0 {
                    return Some(rest[..i].to_string());
                }
                bracket_depth -= 1;
            }
            _ => {}
        }
    }
    // Truncated reply: the array never closes, take everything
    Some(rest.to_string())
}

/// Split an array body into standalone object fragments on `},{` style
/// boundaries, re-wrapping each piece in braces.
fn split_fragments(body: &str) -> Vec<String> {
    FRAGMENT_BOUNDARY_RE
        .split(body)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(|piece| {
            let mut fragment = String::with_capacity(piece.len() + 2);
            if !piece.starts_with('{') {
                fragment.push('{');
            }
            fragment.push_str(piece);
            if !piece.ends_with('}') {
                fragment.push('}');
            }
            fragment
        })
        .collect()
}

/// Clean a fragment and parse it, falling back to offset-directed patching
/// when the strict parse still fails.
pub(crate) fn repair_fragment(fragment: &str) -> Option<Value> {
    let cleaned = repair::clean(fragment);
    match serde_json::from_str(&cleaned) {
        Ok(value) => Some(value),
        Err(err) => offset_patched_parse(&cleaned, &err),
    }
}

/// Try the three candidate single-character edits at the parser's reported
/// error position, in priority order, each validated by a fresh parse. The
/// reported position is a hint, not a promise: it is clamped to the text
/// and to char boundaries before use.
fn offset_patched_parse(text: &str, err: &serde_json::Error) -> Option<Value> {
    let offset = error_offset(text, err)?;

    let candidates = [
        ("insert-brace", insert_at(text, offset, '}')),
        ("insert-comma", insert_at(text, offset, ',')),
        ("delete-char", delete_at(text, offset)),
    ];
    for (edit, candidate) in candidates {
        if let Ok(value) = serde_json::from_str::<Value>(&candidate) {
            debug!(edit, offset, "deep: offset patch recovered fragment");
            return Some(value);
        }
    }
    None
}

/// Convert the parser's 1-based line/column into a byte offset
pub(crate) fn error_offset(text: &str, err: &serde_json::Error) -> Option<usize> {
    let (line, column) = (err.line(), err.column());
    if line == 0 {
        return None;
    }

    let mut offset = 0usize;
    for (idx, l) in text.split('\n').enumerate() {
        if idx + 1 == line {
            let col = column.saturating_sub(1).min(l.len());
            return Some((offset + col).min(text.len()));
        }
        offset += l.len() + 1;
    }
    None
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    index = index.min(text.len());
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn insert_at(text: &str, offset: usize, c: char) -> String {
    let at = floor_char_boundary(text, offset);
    let mut out = String::with_capacity(text.len() + 1);
    out.push_str(&text[..at]);
    out.push(c);
    out.push_str(&text[at..]);
    out
}

fn delete_at(text: &str, offset: usize) -> String {
    let at = floor_char_boundary(text, offset);
    match text[at..].chars().next() {
        Some(c) => {
            let mut out = String::with_capacity(text.len());
            out.push_str(&text[..at]);
            out.push_str(&text[at + c.len_utf8()..]);
            out
        }
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::DecodeContext;

    fn ctx() -> DecodeContext {
        DecodeContext::new("Acme", "2025-01-01")
    }

    #[test]
    fn test_entry_missing_closing_brace_before_bracket() {
        // The entry object never closes; the array bracket arrives first
        let raw = r#"{"name":"X","entries":[{"title":"T","platform":"Instagram","postDate":"2025-01-01"]}"#;
        let rec = attempt(raw, &ctx()).expect("recovered");
        assert_eq!(rec.entries.len(), 1);
        assert_eq!(rec.entries[0].title, "T");
    }

    #[test]
    fn test_missing_comma_between_fields_patched() {
        let raw = r#"{"entries":[{"title":"T" "platform":"Instagram","postDate":"2025-01-01"}]}"#;
        let rec = attempt(raw, &ctx()).expect("recovered");
        assert_eq!(rec.entries.len(), 1);
    }

    #[test]
    fn test_stray_character_deleted() {
        let raw = r#"{"entries":[{"title":"T",; "platform":"Instagram","postDate":"2025-01-01"}]}"#;
        let rec = attempt(raw, &ctx()).expect("recovered");
        assert_eq!(rec.entries.len(), 1);
    }

    #[test]
    fn test_broken_entries_dropped_good_ones_kept() {
        let raw = concat!(
            r#"{"entries":[{"title":"A","platform":"Instagram","postDate":"2025-01-01"},"#,
            r#"{"title": ####},"#,
            r#"{"title":"B","platform":"Facebook","postDate":"2025-01-02"}]}"#
        );
        let rec = attempt(raw, &ctx()).expect("recovered");
        let titles: Vec<_> = rec.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn test_truncated_array_recovers_complete_entries() {
        let raw = r#"{"name":"X","entries":[{"title":"A","platform":"Instagram","postDate":"2025-01-01"},{"title":"B","pla"#;
        let rec = attempt(raw, &ctx()).expect("recovered");
        assert_eq!(rec.entries.len(), 1);
        assert_eq!(rec.entries[0].title, "A");
    }

    #[test]
    fn test_no_entries_array_fails_through() {
        assert!(attempt("just prose, nothing structured", &ctx()).is_none());
    }

    #[test]
    fn test_error_offset_round_trip() {
        let text = "{\"a\": 1,\n\"b\" 2}";
        let err = serde_json::from_str::<Value>(text).expect_err("must fail");
        let offset = error_offset(text, &err).expect("offset");
        assert!(offset <= text.len());
        // The reported position is on the second line
        assert!(offset > text.find('\n').expect("newline"));
    }

    #[test]
    fn test_insert_and_delete_respect_char_boundaries() {
        let text = "a\u{e9}b"; // 'é' is two bytes
        assert_eq!(insert_at(text, 2, 'x'), "axéb".to_string());
        assert_eq!(delete_at(text, 2), "ab".to_string());
        assert_eq!(delete_at(text, 99), text.to_string());
    }
}
