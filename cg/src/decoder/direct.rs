//! Strategy 1 - direct decode
//!
//! Take the outermost `{...}` span, apply the known-regression fixups, and
//! attempt a strict parse. Cheap, and catches the common case where the
//! model answered with clean JSON wrapped in prose or a markdown fence.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::{DecodeContext, Recovered};

/// Recurring corruption patterns observed in real model replies. The list
/// is ordered and append-only: each regression gets a named row here and a
/// test pinning it down.
static FIXUPS: LazyLock<Vec<(&'static str, Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        // `""Instagram""` / `""title"": ...` - a token wrapped in doubled quotes
        (
            "doubled-quotes",
            Regex::new(r#""{2}([A-Za-z][^"\n]*)"{2}"#).expect("valid pattern"),
            "\"$1\"",
        ),
        // `"postTime": "14": "30"` - a time value split into two quoted halves
        (
            "split-time",
            Regex::new(r#""postTime"\s*:\s*"(\d{1,2})"\s*:\s*"(\d{2})""#).expect("valid pattern"),
            "\"postTime\": \"$1:$2\"",
        ),
        // Keys padded with stray whitespace: `"postDate " : ...`
        (
            "padded-key",
            Regex::new(
                r#""\s*(title|description|content|copyIn|copyOut|designInstructions|platform|postDate|postTime|hashtags)\s+"(\s*:)"#,
            )
            .expect("valid pattern"),
            "\"$1\"$2",
        ),
        // Garbled or translated labels in key position, mapped to the
        // canonical field names the parser expects.
        (
            "alias-title",
            Regex::new(r#"(?i)"t[ií]tulo"(\s*:)"#).expect("valid pattern"),
            "\"title\"$1",
        ),
        (
            "alias-description",
            Regex::new(r#"(?i)"descripci[oó]n"(\s*:)"#).expect("valid pattern"),
            "\"description\"$1",
        ),
        (
            "alias-content",
            Regex::new(r#"(?i)"contenido"(\s*:)"#).expect("valid pattern"),
            "\"content\"$1",
        ),
        (
            "alias-platform",
            Regex::new(r#"(?i)"plataforma"(\s*:)"#).expect("valid pattern"),
            "\"platform\"$1",
        ),
        (
            "alias-post-date",
            Regex::new(r#"(?i)"(?:fecha(?: de publicaci[oó]n)?|post date)"(\s*:)"#).expect("valid pattern"),
            "\"postDate\"$1",
        ),
        (
            "alias-post-time",
            Regex::new(r#"(?i)"(?:hora(?: de publicaci[oó]n)?|post time)"(\s*:)"#).expect("valid pattern"),
            "\"postTime\"$1",
        ),
        (
            "alias-design",
            Regex::new(r#"(?i)"(?:instrucciones(?: de dise[ñn]o)?|design ?instructions)"(\s*:)"#)
                .expect("valid pattern"),
            "\"designInstructions\"$1",
        ),
        (
            "alias-copy-in",
            Regex::new(r#"(?i)"copy ?in"(\s*:)"#).expect("valid pattern"),
            "\"copyIn\"$1",
        ),
        (
            "alias-copy-out",
            Regex::new(r#"(?i)"copy ?out"(\s*:)"#).expect("valid pattern"),
            "\"copyOut\"$1",
        ),
    ]
});

pub(crate) fn attempt(raw: &str, _ctx: &DecodeContext) -> Option<Recovered> {
    let span = super::outer_object_span(raw)?;

    let mut text = span.to_string();
    for (name, re, replacement) in FIXUPS.iter() {
        let fixed = re.replace_all(&text, *replacement);
        if fixed != text {
            debug!(fixup = name, "direct: applied fixup");
            text = fixed.into_owned();
        }
    }

    super::parse_document(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::DecodeContext;

    fn ctx() -> DecodeContext {
        DecodeContext::new("Acme", "2025-01-01")
    }

    #[test]
    fn test_clean_document_parses() {
        let raw = r#"{"name":"X","entries":[{"title":"T","platform":"Instagram","postDate":"2025-01-01"}]}"#;
        let rec = attempt(raw, &ctx()).expect("parse");
        assert_eq!(rec.name.as_deref(), Some("X"));
        assert_eq!(rec.entries.len(), 1);
        assert_eq!(rec.entries[0].platform, "Instagram");
    }

    #[test]
    fn test_json_inside_prose_and_fence() {
        let raw = "Claro, aquí está tu calendario:\n```json\n{\"name\":\"X\",\"entries\":[{\"title\":\"T\",\"platform\":\"Facebook\",\"postDate\":\"2025-01-02\"}]}\n```\n";
        let rec = attempt(raw, &ctx()).expect("parse");
        assert_eq!(rec.entries.len(), 1);
    }

    #[test]
    fn test_split_time_fixup() {
        let raw = r#"{"entries":[{"title":"T","platform":"Instagram","postDate":"2025-01-01","postTime": "14": "30"}]}"#;
        let rec = attempt(raw, &ctx()).expect("parse");
        assert_eq!(rec.entries[0].post_time, "14:30");
    }

    #[test]
    fn test_alias_key_fixup() {
        let raw = r#"{"entries":[{"Título":"T","Plataforma":"Instagram","Fecha":"2025-01-01"}]}"#;
        let rec = attempt(raw, &ctx()).expect("parse");
        assert_eq!(rec.entries[0].title, "T");
        assert_eq!(rec.entries[0].post_date, "2025-01-01");
    }

    #[test]
    fn test_doubled_quote_fixup() {
        let raw = r#"{"entries":[{""title"":"T","platform":""Instagram"","postDate":"2025-01-01"}]}"#;
        let rec = attempt(raw, &ctx()).expect("parse");
        assert_eq!(rec.entries[0].platform, "Instagram");
    }

    #[test]
    fn test_no_braces_fails_through() {
        assert!(attempt("no structured data here", &ctx()).is_none());
    }

    #[test]
    fn test_invalid_entries_filtered() {
        let raw = r#"{"entries":[{"title":"ok","platform":"Instagram","postDate":"2025-01-01"},{"title":"","platform":"Facebook","postDate":"2025-01-02"}]}"#;
        let rec = attempt(raw, &ctx()).expect("parse");
        assert_eq!(rec.entries.len(), 1);
        assert_eq!(rec.entries[0].title, "ok");
    }
}
