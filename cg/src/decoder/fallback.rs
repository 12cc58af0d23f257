//! Strategy 6 - guaranteed fallback
//!
//! When nothing could be mined from the reply, the caller still gets a
//! calendar: exactly one generic entry on the period start date. This is
//! what makes the decode pipeline total.

use tracing::warn;

use super::DecodeContext;
use crate::schedule::{Schedule, ScheduleEntry, DEFAULT_POST_TIME};

/// Platform used when the reply named none
const DEFAULT_PLATFORM: &str = "Instagram";

pub(crate) fn synthesize(ctx: &DecodeContext) -> Schedule {
    warn!(project = %ctx.project_name, "fallback: synthesizing placeholder entry");

    let entry = ScheduleEntry {
        title: "Publicación sugerida".to_string(),
        description: "Entrada generada automáticamente; la respuesta del asistente no contenía un calendario legible."
            .to_string(),
        content: "Revisa y completa esta publicación manualmente.".to_string(),
        platform: DEFAULT_PLATFORM.to_string(),
        post_date: ctx.start_date(),
        post_time: DEFAULT_POST_TIME.to_string(),
        ..Default::default()
    };

    Schedule {
        name: ctx.default_schedule_name(),
        entries: vec![entry],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_yields_one_valid_entry() {
        let ctx = DecodeContext::new("Acme", "2025-03-01");
        let schedule = synthesize(&ctx);
        assert_eq!(schedule.entries.len(), 1);
        assert!(schedule.entries[0].is_valid());
        assert_eq!(schedule.entries[0].post_date, "2025-03-01");
        assert_eq!(schedule.entries[0].post_time, "12:00");
        assert_eq!(schedule.name, "Cronograma para Acme");
    }

    #[test]
    fn test_unusable_period_start_still_valid() {
        let ctx = DecodeContext::new("Acme", "soon");
        let schedule = synthesize(&ctx);
        assert!(schedule.entries[0].is_valid());
    }
}
