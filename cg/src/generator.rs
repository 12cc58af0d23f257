//! Calendar generation service
//!
//! Ties the boundary pieces together: render the prompt, make one
//! completion call (the client retries transients internally), and decode
//! whatever came back. Transport errors propagate to the caller unchanged;
//! decoding cannot fail.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::decoder::{decode_schedule_with_report, DecodeContext, DecodeReport};
use crate::llm::{CompletionRequest, LlmClient, LlmError, Message};
use crate::prompts::{render_calendar_prompt, PromptContext, SYSTEM_PROMPT};
use crate::schedule::Schedule;

/// Response token budget for a calendar request
const MAX_TOKENS: u32 = 8192;

/// One calendar generation request
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Project the calendar is for
    pub project_name: String,

    /// First day of the period, `YYYY-MM-DD`
    pub period_start: String,

    /// Last day of the period, `YYYY-MM-DD`
    pub period_end: String,

    /// Platforms to schedule for
    pub platforms: Vec<String>,

    /// Posts per week to ask for
    pub posts_per_week: u32,
}

/// Generate a content calendar for the request.
///
/// Returns the decoded schedule plus the decode diagnostics. The only
/// error path is the transport one - a reply, however broken, always
/// becomes a schedule.
pub async fn generate_schedule(
    llm: &Arc<dyn LlmClient>,
    request: &GenerateRequest,
) -> Result<(Schedule, DecodeReport), LlmError> {
    let request_id = Uuid::new_v4();
    info!(%request_id, project = %request.project_name, "generate: starting calendar generation");

    let prompt_ctx = PromptContext {
        project_name: request.project_name.clone(),
        period_start: request.period_start.clone(),
        period_end: request.period_end.clone(),
        platforms: request.platforms.clone(),
        posts_per_week: request.posts_per_week,
    };
    let prompt = render_calendar_prompt(&prompt_ctx).map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

    let completion = llm
        .complete(CompletionRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            messages: vec![Message::user(prompt)],
            max_tokens: MAX_TOKENS,
        })
        .await?;

    let raw = completion.content.unwrap_or_default();
    debug!(%request_id, reply_len = raw.len(), stop_reason = ?completion.stop_reason, "generate: reply received");

    let decode_ctx = DecodeContext::new(&request.project_name, &request.period_start);
    let (schedule, report) = decode_schedule_with_report(&raw, &decode_ctx);

    if report.degraded {
        warn!(%request_id, "generate: decode degraded to fallback entry");
    } else {
        info!(
            %request_id,
            strategy = report.winner.name(),
            entries = schedule.entries.len(),
            "generate: calendar decoded"
        );
    }

    Ok((schedule, report))
}
