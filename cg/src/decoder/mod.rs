//! Resilient response decoder
//!
//! Converts the raw text reply of the LLM service into a validated
//! [`Schedule`], whatever shape the reply arrived in. Six recovery
//! strategies run in strict priority order - each more permissive than the
//! last - and the first one that yields at least one entry satisfying the
//! mandatory-field invariant wins. The final strategy synthesizes a
//! placeholder entry, so decoding is a total function: it never errors and
//! never returns an empty calendar.
//!
//! Strategy order:
//! 1. [`direct`] - outermost `{...}` span, known-regression fixups, strict parse
//! 2. [`cleanup`] - full structural repair pipeline, then parse
//! 3. [`deep`] - per-entry fragment repair with offset-directed patching
//! 4. [`extract`] - regex mining of entry-shaped spans from the raw text
//! 5. [`lines`] - line-by-line heuristic state machine
//! 6. [`fallback`] - synthetic placeholder entry (cannot fail)

mod cleanup;
mod deep;
mod direct;
mod extract;
mod fallback;
mod lines;
pub mod repair;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::schedule::{is_valid_date, Schedule, ScheduleEntry};

/// Values needed for default-filling during a decode. Deliberately tiny:
/// the decoder has no network, storage, or UI dependency.
#[derive(Debug, Clone)]
pub struct DecodeContext {
    /// Project the calendar belongs to
    pub project_name: String,

    /// First day of the requested period, `YYYY-MM-DD`
    pub period_start: String,
}

impl DecodeContext {
    pub fn new(project_name: impl Into<String>, period_start: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            period_start: period_start.into(),
        }
    }

    /// The period start when it is well-shaped, today otherwise
    pub(crate) fn start_date(&self) -> String {
        if is_valid_date(&self.period_start) {
            self.period_start.trim().to_string()
        } else {
            chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
        }
    }

    pub(crate) fn default_schedule_name(&self) -> String {
        format!("Cronograma para {}", self.project_name)
    }
}

/// What a single strategy managed to pull out of the reply
#[derive(Debug, Default)]
pub(crate) struct Recovered {
    pub name: Option<String>,
    pub entries: Vec<ScheduleEntry>,
}

/// One stage of the recovery cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    Direct,
    Cleanup,
    Deep,
    Extract,
    Lines,
    Fallback,
}

impl StrategyKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Cleanup => "cleanup",
            Self::Deep => "deep",
            Self::Extract => "extract",
            Self::Lines => "lines",
            Self::Fallback => "fallback",
        }
    }
}

/// Outcome of one strategy attempt, in cascade order
#[derive(Debug, Clone, Serialize)]
pub struct StrategyAttempt {
    /// Which strategy ran
    pub strategy: StrategyKind,
    /// Valid entries it produced (0 means it fell through)
    pub entries: usize,
}

/// Diagnostics for a completed decode. Failures inside the cascade are
/// never raised; this is how callers observe what happened instead.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeReport {
    /// Every strategy that ran, in order
    pub attempts: Vec<StrategyAttempt>,
    /// The strategy whose output was returned
    pub winner: StrategyKind,
    /// True when the result is the synthetic placeholder
    pub degraded: bool,
}

type StrategyFn = fn(&str, &DecodeContext) -> Option<Recovered>;

/// The cascade, in priority order. Adding, removing, or reordering a
/// strategy is a one-line change here.
const CASCADE: &[(StrategyKind, StrategyFn)] = &[
    (StrategyKind::Direct, direct::attempt),
    (StrategyKind::Cleanup, cleanup::attempt),
    (StrategyKind::Deep, deep::attempt),
    (StrategyKind::Extract, extract::attempt),
    (StrategyKind::Lines, lines::attempt),
];

/// Decode a raw model reply into a non-empty, validated [`Schedule`].
///
/// Total over arbitrary input: empty strings, prose, truncated JSON and
/// binary garbage all produce a usable calendar.
pub fn decode_schedule(raw: &str, ctx: &DecodeContext) -> Schedule {
    decode_schedule_with_report(raw, ctx).0
}

/// Like [`decode_schedule`], also returning the per-strategy diagnostics
pub fn decode_schedule_with_report(raw: &str, ctx: &DecodeContext) -> (Schedule, DecodeReport) {
    let mut attempts = Vec::new();

    for (kind, strategy) in CASCADE {
        let recovered = strategy(raw, ctx);
        // The mandatory-field filter is enforced here for every strategy,
        // whatever the strategy itself already checked.
        let (name, entries) = match recovered {
            Some(rec) => {
                let entries: Vec<ScheduleEntry> = rec
                    .entries
                    .into_iter()
                    .filter(ScheduleEntry::is_valid)
                    .map(ScheduleEntry::normalized)
                    .collect();
                (rec.name, entries)
            }
            None => (None, Vec::new()),
        };

        attempts.push(StrategyAttempt {
            strategy: *kind,
            entries: entries.len(),
        });

        if entries.is_empty() {
            debug!(strategy = kind.name(), "decode: strategy yielded no valid entries");
            continue;
        }

        info!(
            strategy = kind.name(),
            entries = entries.len(),
            "decode: recovered schedule"
        );
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| ctx.default_schedule_name());
        let report = DecodeReport {
            attempts,
            winner: *kind,
            degraded: false,
        };
        return (Schedule { name, entries }, report);
    }

    warn!("decode: all strategies exhausted, degrading to fallback entry");
    let schedule = fallback::synthesize(ctx);
    attempts.push(StrategyAttempt {
        strategy: StrategyKind::Fallback,
        entries: schedule.entries.len(),
    });
    let report = DecodeReport {
        attempts,
        winner: StrategyKind::Fallback,
        degraded: true,
    };
    (schedule, report)
}

/// First `{` through last `}`; the span strategies 1 and 2 operate on
pub(crate) fn outer_object_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Strict parse of a whole calendar document: an object with an optional
/// `name` and an `entries` array. Entries are converted leniently and
/// filtered to the valid ones; a missing array or failed parse is `None`.
pub(crate) fn parse_document(text: &str) -> Option<Recovered> {
    let value: Value = serde_json::from_str(text).ok()?;
    let obj = value.as_object()?;

    let name = obj.get("name").and_then(Value::as_str).map(str::to_string);
    let list = obj.get("entries")?.as_array()?;

    let entries = list
        .iter()
        .filter_map(entry_from_value)
        .filter(ScheduleEntry::is_valid)
        .map(ScheduleEntry::normalized)
        .collect();

    Some(Recovered { name, entries })
}

/// Lenient conversion of a parsed JSON object into an entry: fields are
/// read as strings, scalars are stringified, anything else becomes "".
pub(crate) fn entry_from_value(value: &Value) -> Option<ScheduleEntry> {
    let obj = value.as_object()?;
    let text = |key: &str| -> String {
        match obj.get(key) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    };

    Some(ScheduleEntry {
        title: text("title"),
        description: text("description"),
        content: text("content"),
        copy_in: text("copyIn"),
        copy_out: text("copyOut"),
        design_instructions: text("designInstructions"),
        platform: text("platform"),
        post_date: text("postDate"),
        post_time: text("postTime"),
        hashtags: text("hashtags"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> DecodeContext {
        DecodeContext::new("Acme", "2025-01-01")
    }

    #[test]
    fn test_clean_json_short_circuits_cascade() {
        let raw = r#"{"name":"X","entries":[{"title":"T","platform":"Instagram","postDate":"2025-01-01","postTime":"09:00"}]}"#;
        let (schedule, report) = decode_schedule_with_report(raw, &ctx());

        assert_eq!(report.winner, StrategyKind::Direct);
        assert_eq!(report.attempts.len(), 1, "later strategies must not run");
        assert!(!report.degraded);
        assert_eq!(schedule.name, "X");
        assert_eq!(schedule.entries[0].post_time, "09:00");
        // Optionals defaulted to empty strings
        assert_eq!(schedule.entries[0].description, "");
        assert_eq!(schedule.entries[0].copy_in, "");
    }

    #[test]
    fn test_empty_input_degrades_to_fallback() {
        let (schedule, report) = decode_schedule_with_report("", &ctx());

        assert_eq!(report.winner, StrategyKind::Fallback);
        assert!(report.degraded);
        assert_eq!(report.attempts.len(), 6);
        assert_eq!(schedule.entries.len(), 1);
        assert!(schedule.entries[0].is_valid());
        assert_eq!(schedule.entries[0].post_date, "2025-01-01");
    }

    #[test]
    fn test_name_defaulted_when_absent() {
        let raw = r#"{"entries":[{"title":"T","platform":"Instagram","postDate":"2025-01-01"}]}"#;
        let schedule = decode_schedule(raw, &ctx());
        assert_eq!(schedule.name, "Cronograma para Acme");
    }

    #[test]
    fn test_invalid_entries_never_surface() {
        let raw = r#"{"entries":[
            {"title":"ok","platform":"Instagram","postDate":"2025-01-01"},
            {"title":"","platform":"Instagram","postDate":"2025-01-01"},
            {"title":"no date","platform":"Instagram","postDate":""},
            {"title":"bad date","platform":"Instagram","postDate":"mañana"}
        ]}"#;
        let schedule = decode_schedule(raw, &ctx());
        assert_eq!(schedule.entries.len(), 1);
        assert_eq!(schedule.entries[0].title, "ok");
    }

    #[test]
    fn test_outer_object_span() {
        assert_eq!(outer_object_span("x {\"a\":1} y"), Some("{\"a\":1}"));
        assert_eq!(outer_object_span("no braces"), None);
        assert_eq!(outer_object_span("} reversed {"), None);
    }

    #[test]
    fn test_entry_from_value_stringifies_scalars() {
        let value = serde_json::json!({
            "title": "T",
            "platform": "Instagram",
            "postDate": "2025-01-01",
            "hashtags": 42,
            "description": null,
            "content": {"nested": "object"}
        });
        let entry = entry_from_value(&value).expect("entry");
        assert_eq!(entry.hashtags, "42");
        assert_eq!(entry.description, "");
        assert_eq!(entry.content, "");
    }

    #[test]
    fn test_context_start_date_falls_back_to_today() {
        let ctx = DecodeContext::new("Acme", "not a date");
        assert!(is_valid_date(&ctx.start_date()));
    }
}
