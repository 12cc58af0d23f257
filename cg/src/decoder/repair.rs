//! Structural repair utilities
//!
//! Pure, total `&str -> String` transforms that fix the structural damage
//! models routinely inflict on JSON: single quotes, bare keys, trailing
//! commas, broken escapes, unbalanced braces. Each rule is independently
//! testable and idempotent for sane inputs; [`clean`] composes them in a
//! fixed order.

use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

static BARE_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:").expect("valid pattern"));
static SINGLE_QUOTED_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'([^'\n]*)'(\s*:)").expect("valid pattern"));
static SINGLE_QUOTED_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(:\s*)'([^'\n]*)'").expect("valid pattern"));
static BARE_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(:\s*)(\p{L}[\p{L}\p{N} ]*?)\s*([,}\]])").expect("valid pattern"));
static TRAILING_COMMA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",(\s*[}\]])").expect("valid pattern"));
static ESCAPED_QUOTE_KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"([{,]\s*)\\""#).expect("valid pattern"));
static ESCAPED_QUOTE_COLON_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"\\"(\s*:)"#).expect("valid pattern"));

/// The cleanup pipeline, in application order. Order matters: keys must be
/// quoted before bare values, escapes must be sane before balancing walks
/// string literals.
pub const RULES: &[(&str, fn(&str) -> String)] = &[
    ("strip-control", strip_control_chars),
    ("smart-quotes", normalize_smart_quotes),
    ("quote-keys", quote_bare_keys),
    ("unify-quotes", unify_quotes),
    ("quote-bare-values", quote_bare_values),
    ("normalize-escapes", normalize_escapes),
    ("trailing-commas", remove_trailing_commas),
    ("balance", balance_braces),
];

/// Apply the full repair pipeline
pub fn clean(input: &str) -> String {
    RULES.iter().fold(input.to_string(), |acc, (name, rule)| {
        let out = rule(&acc);
        if out != acc {
            trace!(rule = name, "clean: rule rewrote text");
        }
        out
    })
}

/// Apply `f` only to the spans outside double-quoted string literals.
/// Content already inside a (well-delimited) string is never rewritten.
fn map_outside_strings(input: &str, f: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(input.len());
    let mut seg_start = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in input.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
                out.push_str(&input[seg_start..i + 1]);
                seg_start = i + 1;
            }
        } else if c == '"' {
            out.push_str(&f(&input[seg_start..i]));
            seg_start = i;
            in_string = true;
        }
    }
    if in_string {
        // Unterminated literal: leave the tail for the balancer
        out.push_str(&input[seg_start..]);
    } else {
        out.push_str(&f(&input[seg_start..]));
    }
    out
}

/// Remove non-printable characters, keeping whitespace the later rules
/// and the line scanner still need.
pub fn strip_control_chars(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}

/// Map typographic quotes to their ASCII equivalents
pub fn normalize_smart_quotes(input: &str) -> String {
    map_outside_strings(input, |seg| {
        seg.chars()
            .map(|c| match c {
                '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{00AB}' | '\u{00BB}' => '"',
                '\u{2018}' | '\u{2019}' | '\u{201A}' => '\'',
                other => other,
            })
            .collect()
    })
}

/// Wrap bare identifiers in key position in double quotes:
/// `{title: "x"}` becomes `{"title": "x"}`
pub fn quote_bare_keys(input: &str) -> String {
    map_outside_strings(input, |seg| BARE_KEY_RE.replace_all(seg, "$1\"$2\":").into_owned())
}

/// Convert single-quoted keys and values to double-quoted ones, escaping
/// any embedded double quotes.
pub fn unify_quotes(input: &str) -> String {
    map_outside_strings(input, |seg| {
        let keys = SINGLE_QUOTED_KEY_RE.replace_all(seg, |caps: &regex::Captures| {
            format!("\"{}\"{}", caps[1].replace('"', "\\\""), &caps[2])
        });
        SINGLE_QUOTED_VALUE_RE
            .replace_all(&keys, |caps: &regex::Captures| {
                format!("{}\"{}\"", &caps[1], caps[2].replace('"', "\\\""))
            })
            .into_owned()
    })
}

/// Quote unquoted word values: `"platform": Instagram,` becomes
/// `"platform": "Instagram",`. Keywords and numbers are left alone.
pub fn quote_bare_values(input: &str) -> String {
    map_outside_strings(input, |seg| {
        BARE_VALUE_RE
            .replace_all(seg, |caps: &regex::Captures| {
                let word = caps[2].trim();
                if matches!(word, "true" | "false" | "null") {
                    format!("{}{}{}", &caps[1], word, &caps[3])
                } else {
                    format!("{}\"{}\"{}", &caps[1], word, &caps[3])
                }
            })
            .into_owned()
    })
}

/// Escape-sequence fixups: a document whose quotes are all escaped is
/// unescaped wholesale, backslashes that do not start a valid escape are
/// doubled, and stray `\"` in key position is unescaped.
pub fn normalize_escapes(input: &str) -> String {
    // A reply pasted through one quoting layer too many arrives with every
    // quote escaped; detect the absence of working quotes and undo it.
    let bare_quotes = count_bare_quotes(input);
    let text = if bare_quotes < 2 && input.contains("\\\"") {
        input.replace("\\\"", "\"")
    } else {
        input.to_string()
    };

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' | 'u') => {
                out.push('\\');
                out.push(chars.next().unwrap_or_default());
            }
            _ => {
                out.push('\\');
                out.push('\\');
            }
        }
    }

    let keyed = ESCAPED_QUOTE_KEY_RE.replace_all(&out, "$1\"");
    ESCAPED_QUOTE_COLON_RE.replace_all(&keyed, "\"$1").into_owned()
}

fn count_bare_quotes(input: &str) -> usize {
    let mut count = 0;
    let mut prev_backslash = false;
    for c in input.chars() {
        if c == '"' && !prev_backslash {
            count += 1;
        }
        prev_backslash = c == '\\' && !prev_backslash;
    }
    count
}

/// Delete commas sitting directly before a closing brace or bracket
pub fn remove_trailing_commas(input: &str) -> String {
    map_outside_strings(input, |seg| TRAILING_COMMA_RE.replace_all(seg, "$1").into_owned())
}

/// Balance braces and brackets outside string literals: unterminated
/// strings are closed, missing closers are appended at the end (innermost
/// first), unmatched closers get their opener prepended at the start.
pub fn balance_braces(input: &str) -> String {
    let mut stack: Vec<char> = Vec::new();
    let mut unmatched_closers: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in input.chars() {
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
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.last() == Some(&c) {
                    stack.pop();
                } else if let Some(pos) = stack.iter().rposition(|x| *x == c) {
                    // Mismatched nesting: consume the nearest same-type opener
                    stack.remove(pos);
                } else {
                    unmatched_closers.push(c);
                }
            }
            _ => {}
        }
    }

    if stack.is_empty() && unmatched_closers.is_empty() && !in_string {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len() + stack.len() + unmatched_closers.len() + 2);
    for &c in unmatched_closers.iter().rev() {
        out.push(if c == '}' { '{' } else { '[' });
    }
    out.push_str(input);
    if in_string {
        if escaped {
            out.push('\\');
        }
        out.push('"');
    }
    for &c in stack.iter().rev() {
        out.push(c);
    }
    out
}

/// Collapse whitespace runs outside strings to a single space and escape
/// raw newlines inside strings (raw control characters are invalid in
/// JSON string literals).
pub fn collapse_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut pending_space = false;

    for c in input.chars() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(c);
                continue;
            }
            match c {
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\t' => out.push_str("\\t"),
                '\r' => {}
                other => out.push(other),
            }
            continue;
        }
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        if c == '"' {
            in_string = true;
        }
        out.push(c);
    }
    out
}
