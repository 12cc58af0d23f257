//! Strategy 4 - regex entry extraction
//!
//! Ignore document structure entirely and scan the original raw text for
//! brace-delimited spans that look like individual entries (contain the
//! three mandatory keys, in any order). Each match is repaired and parsed
//! on its own, so locally well-formed entries survive even when the
//! surrounding arrays and wrapper object are beyond saving.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::{deep, DecodeContext, Recovered};

// Flat (non-nested) brace spans; key containment is checked per match
// because the regex engine has no lookahead.
static FLAT_OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[^{}]*\}").expect("valid pattern"));

pub(crate) fn attempt(raw: &str, _ctx: &DecodeContext) -> Option<Recovered> {
    let mut entries = Vec::new();

    for m in FLAT_OBJECT_RE.find_iter(raw) {
        let span = m.as_str();
        let lower = span.to_lowercase();
        if !(lower.contains("title") && lower.contains("platform") && lower.contains("postdate")) {
            continue;
        }

        match deep::repair_fragment(span) {
            Some(value) => {
                if let Some(entry) = super::entry_from_value(&value)
                    && entry.is_valid()
                {
                    entries.push(entry.normalized());
                } else {
                    debug!(span_len = span.len(), "extract: span parsed but entry invalid");
                }
            }
            None => debug!(span_len = span.len(), "extract: span unrecoverable"),
        }
    }

    if entries.is_empty() {
        None
    } else {
        debug!(entries = entries.len(), "extract: recovered entries from raw text");
        Some(Recovered { name: None, entries })
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
    fn test_entries_amid_unsalvageable_wrapper() {
        // Array brackets and wrapper braces are hopeless, entry objects are fine
        let raw = concat!(
            "name: X ]]]] entries ",
            r#"{"title":"A","platform":"Instagram","postDate":"2025-01-01"}"#,
            " ... interleaved prose ... ",
            r#"{"title":"B","platform":"Facebook","postDate":"2025-01-02"}"#,
            " }}}}"
        );
        let rec = attempt(raw, &ctx()).expect("recovered");
        let titles: Vec<_> = rec.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn test_key_order_irrelevant() {
        let raw = r#"{"postDate":"2025-01-03","title":"C","platform":"TikTok"}"#;
        let rec = attempt(raw, &ctx()).expect("recovered");
        assert_eq!(rec.entries[0].title, "C");
    }

    #[test]
    fn test_damaged_match_repaired_independently() {
        let raw = r#"xx {"title":'D',"platform":"YouTube","postDate":"2025-01-04",} yy"#;
        let rec = attempt(raw, &ctx()).expect("recovered");
        assert_eq!(rec.entries[0].platform, "YouTube");
    }

    #[test]
    fn test_spans_without_mandatory_keys_skipped() {
        let raw = r#"{"title":"no date or platform"} {"foo": 1}"#;
        assert!(attempt(raw, &ctx()).is_none());
    }
}
