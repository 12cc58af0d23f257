//! Strategy 2 - cleanup decode
//!
//! Same outermost span as the direct strategy, but run through the full
//! structural repair pipeline (plus whitespace collapsing) before parsing.

use tracing::debug;

use super::repair;
use super::{DecodeContext, Recovered};

pub(crate) fn attempt(raw: &str, _ctx: &DecodeContext) -> Option<Recovered> {
    let span = super::outer_object_span(raw)?;

    let cleaned = repair::collapse_whitespace(&repair::clean(span));
    debug!(span_len = span.len(), cleaned_len = cleaned.len(), "cleanup: repaired span");

    super::parse_document(&cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::DecodeContext;

    fn ctx() -> DecodeContext {
        DecodeContext::new("Acme", "2025-01-01")
    }

    #[test]
    fn test_single_quotes_and_trailing_comma() {
        let raw = r#"{"name":'X',"entries":[{"title":"T","platform":"Facebook","postDate":"2025-01-02",}]}"#;
        let rec = attempt(raw, &ctx()).expect("parse");
        assert_eq!(rec.name.as_deref(), Some("X"));
        assert_eq!(rec.entries.len(), 1);
        assert_eq!(rec.entries[0].platform, "Facebook");
    }

    #[test]
    fn test_bare_keys_and_values() {
        let raw = "{name: \"Plan\", entries: [{title: \"T\", platform: Instagram, postDate: \"2025-03-01\"}]}";
        let rec = attempt(raw, &ctx()).expect("parse");
        assert_eq!(rec.entries[0].platform, "Instagram");
    }

    #[test]
    fn test_unclosed_array_balanced() {
        let raw = r#"{"name":"X","entries":[{"title":"T","platform":"TikTok","postDate":"2025-01-05"}"#;
        let rec = attempt(raw, &ctx()).expect("parse");
        assert_eq!(rec.entries.len(), 1);
        assert_eq!(rec.entries[0].platform, "TikTok");
    }

    #[test]
    fn test_hopeless_text_fails_through() {
        assert!(attempt("no braces at all", &ctx()).is_none());
        assert!(attempt("{} ::: garbage {", &ctx()).map(|r| r.entries.len()).unwrap_or(0) == 0);
    }
}
