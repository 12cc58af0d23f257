//! Strategy 5 - line heuristic extraction
//!
//! Last resort before the synthetic fallback: no structure survived, so
//! mine the text line by line. A state machine keeps one draft entry at a
//! time; platform names and dates open records, labeled lines fill fields,
//! short plain lines become titles. The label set is Spanish-first (the
//! language the product prompts in) with the free English aliases; replies
//! in other languages degrade to title/platform/date capture.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::{DecodeContext, Recovered};
use crate::schedule::{platform_in, ScheduleEntry};

static DATE_IN_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").expect("valid pattern"));
static TIME_IN_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)\b").expect("valid pattern"));

/// Characters that separate a field label from its value
const SEPARATORS: &[char] = &[':', '-', '–', '—', '>', '=', '|', '•'];

/// Longest line still considered a title candidate
const MAX_TITLE_LEN: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Description,
    Content,
    CopyIn,
    CopyOut,
    DesignInstructions,
    Hashtags,
}

/// Label substrings recognized in lowercased lines, checked in order.
/// Substring match keeps this tolerant of prefixes and emoji bullets.
const LABELS: &[(&str, Field)] = &[
    ("descripción", Field::Description),
    ("descripcion", Field::Description),
    ("description", Field::Description),
    ("contenido", Field::Content),
    ("content", Field::Content),
    ("copy in", Field::CopyIn),
    ("copyin", Field::CopyIn),
    ("copy out", Field::CopyOut),
    ("copyout", Field::CopyOut),
    ("instrucciones", Field::DesignInstructions),
    ("diseño", Field::DesignInstructions),
    ("diseno", Field::DesignInstructions),
    ("design", Field::DesignInstructions),
    ("hashtag", Field::Hashtags),
    ("título", Field::Title),
    ("titulo", Field::Title),
    ("title", Field::Title),
];

/// Draft entry being accumulated while scanning lines
#[derive(Debug, Default)]
struct Draft {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    copy_in: Option<String>,
    copy_out: Option<String>,
    design_instructions: Option<String>,
    platform: Option<String>,
    post_date: Option<String>,
    post_time: Option<String>,
    hashtags: Option<String>,
}

impl Draft {
    fn meets_mandatory_bar(&self) -> bool {
        self.title.is_some() && self.platform.is_some() && self.post_date.is_some()
    }

    fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
            Field::Content => &mut self.content,
            Field::CopyIn => &mut self.copy_in,
            Field::CopyOut => &mut self.copy_out,
            Field::DesignInstructions => &mut self.design_instructions,
            Field::Hashtags => &mut self.hashtags,
        };
        *slot = Some(value);
    }

    fn into_entry(self) -> ScheduleEntry {
        ScheduleEntry {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            copy_in: self.copy_in.unwrap_or_default(),
            copy_out: self.copy_out.unwrap_or_default(),
            design_instructions: self.design_instructions.unwrap_or_default(),
            platform: self.platform.unwrap_or_default(),
            post_date: self.post_date.unwrap_or_default(),
            post_time: self.post_time.unwrap_or_default(),
            hashtags: self.hashtags.unwrap_or_default(),
        }
    }
}

pub(crate) fn attempt(raw: &str, ctx: &DecodeContext) -> Option<Recovered> {
    let mut entries: Vec<ScheduleEntry> = Vec::new();
    let mut draft = Draft::default();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let platform = platform_in(line);
        let date = DATE_IN_LINE_RE.captures(line).map(|caps| caps[1].to_string());

        if platform.is_some() || date.is_some() {
            // Record boundary: a complete draft is flushed, an incomplete
            // one keeps accumulating (its title may be the line above).
            if draft.meets_mandatory_bar() {
                entries.push(std::mem::take(&mut draft).into_entry());
            }
            if let Some(p) = platform {
                draft.platform = Some(p.to_string());
            }
            if let Some(d) = date.clone() {
                draft.post_date = Some(d);
            }
            if let Some(t) = time_in(line) {
                draft.post_time = Some(t);
            }
            // The line itself can serve as title, but only when it says
            // more than the platform/date tokens it was recognized by
            if draft.title.is_none()
                && has_residual_text(line, platform, date.as_deref())
                && let Some(title) = title_candidate(line)
            {
                draft.title = Some(title);
            }
            continue;
        }

        if let Some(t) = time_in(line) {
            draft.post_time = Some(t);
            continue;
        }

        if let Some((field, value)) = label_match(line) {
            draft.set(field, value);
            continue;
        }

        if let Some(title) = title_candidate(line) {
            if draft.meets_mandatory_bar() {
                // A complete record followed by a fresh short line: the
                // line is the next record's title
                entries.push(std::mem::take(&mut draft).into_entry());
                draft.title = Some(title);
            } else if draft.title.is_none() {
                draft.title = Some(title);
            }
        }
    }

    // Final flush: a record still missing its date gets the period start
    if draft.post_date.is_none() && draft.title.is_some() && draft.platform.is_some() {
        draft.post_date = Some(ctx.start_date());
    }
    if draft.meets_mandatory_bar() {
        entries.push(draft.into_entry());
    }

    if entries.is_empty() {
        None
    } else {
        debug!(entries = entries.len(), "lines: extracted entries from text");
        Some(Recovered { name: None, entries })
    }
}

/// `HH:MM` anywhere in the line, zero-padded
fn time_in(line: &str) -> Option<String> {
    TIME_IN_LINE_RE
        .captures(line)
        .map(|caps| format!("{:0>2}:{}", &caps[1], &caps[2]))
}

/// Match a known field label and return the text after the first separator
fn label_match(line: &str) -> Option<(Field, String)> {
    let lower = line.to_lowercase();
    let (_, field) = LABELS.iter().find(|(label, _)| lower.contains(label))?;

    let sep = line.find(SEPARATORS)?;
    let value = line[sep..]
        .trim_start_matches(SEPARATORS)
        .trim()
        .trim_matches(|c| c == '"' || c == ',')
        .trim()
        .to_string();
    if value.is_empty() {
        None
    } else {
        Some((*field, value))
    }
}

/// Does the line carry words beyond the platform/date tokens that made it
/// a record boundary? A line that is just "Facebook" names no post.
fn has_residual_text(line: &str, platform: Option<&str>, date: Option<&str>) -> bool {
    let mut residual = line.to_lowercase();
    if let Some(p) = platform {
        residual = residual.replace(&p.to_lowercase(), " ");
    }
    if let Some(d) = date {
        residual = residual.replace(d, " ");
    }
    let residual = TIME_IN_LINE_RE.replace_all(&residual, " ");
    residual.chars().filter(|c| c.is_alphanumeric()).count() >= 3
}

/// A short plain line usable as a title: starts with a word character,
/// is not JSON-ish, and does not end in a separator (label or greeting).
fn title_candidate(line: &str) -> Option<String> {
    if line.len() > MAX_TITLE_LEN || line.starts_with('{') || line.starts_with('"') {
        return None;
    }
    let first = line.chars().next()?;
    if !first.is_alphanumeric() {
        return None;
    }
    if line.ends_with(SEPARATORS) {
        return None;
    }
    Some(line.to_string())
}
