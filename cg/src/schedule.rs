//! Schedule domain types
//!
//! A `Schedule` is a named content calendar: a list of scheduled social-media
//! post entries. Entries arrive from an unreliable upstream (an LLM reply),
//! so the types here carry the validation rules the decoder filters against.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

/// Platforms the calendar knows how to schedule for
pub const KNOWN_PLATFORMS: [&str; 8] = [
    "Instagram",
    "Facebook",
    "Twitter",
    "LinkedIn",
    "TikTok",
    "YouTube",
    "Pinterest",
    "WhatsApp",
];

/// Posting time applied when the model omits one
pub const DEFAULT_POST_TIME: &str = "12:00";

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid pattern"));
static TIME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([01]?\d|2[0-3]):([0-5]\d)$").expect("valid pattern"));

/// One scheduled social-media post
///
/// Wire names are camelCase (the shape the model is prompted to emit).
/// Every field is a string; absent fields deserialize to "".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleEntry {
    /// Post title (mandatory, non-empty)
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Post body content
    pub content: String,

    /// Short on-design text
    pub copy_in: String,

    /// Long accompanying text
    pub copy_out: String,

    /// Instructions for the design team
    pub design_instructions: String,

    /// Target platform (mandatory, non-empty)
    pub platform: String,

    /// Publication date, `YYYY-MM-DD` (mandatory)
    pub post_date: String,

    /// Publication time, `HH:MM` (defaults to 12:00)
    pub post_time: String,

    /// Hashtag list as free text
    pub hashtags: String,
}

impl ScheduleEntry {
    /// Mandatory-field invariant: `title`, `platform` and a well-shaped
    /// `postDate` must all be present. Entries failing this never reach
    /// the caller, whatever recovery path produced them.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.platform.trim().is_empty() && is_valid_date(&self.post_date)
    }

    /// Fill defaults: a missing or malformed `postTime` becomes 12:00, a
    /// well-shaped one is zero-padded to `HH:MM`.
    pub fn normalized(mut self) -> Self {
        self.post_time = match TIME_RE.captures(self.post_time.trim()) {
            Some(caps) => format!("{:0>2}:{}", &caps[1], &caps[2]),
            None => {
                if !self.post_time.trim().is_empty() {
                    debug!(post_time = %self.post_time, "normalized: unparseable postTime, using default");
                }
                DEFAULT_POST_TIME.to_string()
            }
        };
        self
    }
}

/// A named content calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Calendar display name
    pub name: String,

    /// Scheduled entries; never empty after a decode
    #[serde(default)]
    pub entries: Vec<ScheduleEntry>,
}

/// Check the `YYYY-MM-DD` shape (syntactic, not calendar validity)
pub fn is_valid_date(s: &str) -> bool {
    DATE_RE.is_match(s.trim())
}

/// Check the `HH:MM` shape (one- or two-digit hour accepted)
pub fn is_valid_time(s: &str) -> bool {
    TIME_RE.is_match(s.trim())
}

/// Find a known platform name mentioned anywhere in a text line,
/// returning its canonical capitalization.
pub fn platform_in(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    KNOWN_PLATFORMS.iter().find(|p| lower.contains(&p.to_lowercase())).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, platform: &str, date: &str) -> ScheduleEntry {
        ScheduleEntry {
            title: title.to_string(),
            platform: platform.to_string(),
            post_date: date.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_mandatory_fields() {
        assert!(entry("T", "Instagram", "2025-01-01").is_valid());
        assert!(!entry("", "Instagram", "2025-01-01").is_valid());
        assert!(!entry("T", "", "2025-01-01").is_valid());
        assert!(!entry("T", "Instagram", "").is_valid());
        assert!(!entry("T", "Instagram", "01/01/2025").is_valid());
        assert!(!entry("   ", "Instagram", "2025-01-01").is_valid());
    }

    #[test]
    fn test_normalized_defaults_post_time() {
        let e = entry("T", "Instagram", "2025-01-01").normalized();
        assert_eq!(e.post_time, "12:00");
    }

    #[test]
    fn test_normalized_zero_pads_post_time() {
        let mut e = entry("T", "Instagram", "2025-01-01");
        e.post_time = "9:30".to_string();
        assert_eq!(e.normalized().post_time, "09:30");
    }

    #[test]
    fn test_normalized_rejects_garbage_time() {
        let mut e = entry("T", "Instagram", "2025-01-01");
        e.post_time = "25:99".to_string();
        assert_eq!(e.normalized().post_time, "12:00");
    }

    #[test]
    fn test_camel_case_wire_names() {
        let json = r#"{
            "title": "Launch",
            "platform": "Facebook",
            "postDate": "2025-02-01",
            "postTime": "09:00",
            "copyIn": "short",
            "copyOut": "long",
            "designInstructions": "use the logo"
        }"#;

        let e: ScheduleEntry = serde_json::from_str(json).expect("deserialize");
        assert_eq!(e.post_date, "2025-02-01");
        assert_eq!(e.copy_in, "short");
        assert_eq!(e.design_instructions, "use the logo");
        // Absent optionals default to empty
        assert_eq!(e.description, "");
        assert_eq!(e.hashtags, "");

        let back = serde_json::to_value(&e).expect("serialize");
        assert!(back.get("postDate").is_some());
        assert!(back.get("copyIn").is_some());
    }

    #[test]
    fn test_date_and_time_shapes() {
        assert!(is_valid_date("2025-12-31"));
        assert!(!is_valid_date("2025-1-1"));
        assert!(!is_valid_date("tomorrow"));
        assert!(is_valid_time("09:00"));
        assert!(is_valid_time("9:00"));
        assert!(is_valid_time("23:59"));
        assert!(!is_valid_time("24:00"));
        assert!(!is_valid_time("12:60"));
    }

    #[test]
    fn test_platform_in() {
        assert_eq!(platform_in("Publicar en instagram el lunes"), Some("Instagram"));
        assert_eq!(platform_in("LINKEDIN post"), Some("LinkedIn"));
        assert_eq!(platform_in("no social network here"), None);
    }
}
