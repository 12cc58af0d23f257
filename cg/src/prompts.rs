//! Prompt construction for calendar generation
//!
//! One embedded Handlebars template; rendering is strict so a typo in a
//! placeholder fails loudly instead of producing a half-empty prompt.

use eyre::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

/// System prompt establishing the assistant's task and output shape
pub const SYSTEM_PROMPT: &str = "\
Eres un asistente de marketing que produce calendarios de contenido para redes sociales. \
Responde SOLO con un objeto JSON, sin texto adicional, con esta forma exacta: \
{\"name\": string, \"entries\": [{\"title\": string, \"description\": string, \
\"content\": string, \"copyIn\": string, \"copyOut\": string, \
\"designInstructions\": string, \"platform\": string, \"postDate\": \"YYYY-MM-DD\", \
\"postTime\": \"HH:MM\", \"hashtags\": string}]}. \
Los campos title, platform y postDate son obligatorios en cada entrada.";

/// User prompt template for a calendar generation request
const CALENDAR_TEMPLATE: &str = "\
Genera un calendario de contenido para el proyecto \"{{project_name}}\".

Periodo: del {{period_start}} al {{period_end}}.
Publicaciones por semana: {{posts_per_week}}.
Plataformas: {{#each platforms}}{{this}}{{#unless @last}}, {{/unless}}{{/each}}.

Cada entrada debe tener title, platform y postDate dentro del periodo. \
Reparte las publicaciones de forma uniforme y varia los formatos.";

/// Values interpolated into the calendar template
#[derive(Debug, Clone, Serialize)]
pub struct PromptContext {
    pub project_name: String,
    pub period_start: String,
    pub period_end: String,
    pub platforms: Vec<String>,
    pub posts_per_week: u32,
}

/// Render the calendar-generation user prompt
pub fn render_calendar_prompt(ctx: &PromptContext) -> Result<String> {
    debug!(project = %ctx.project_name, "render_calendar_prompt: called");

    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);

    handlebars
        .render_template(CALENDAR_TEMPLATE, ctx)
        .context("Failed to render calendar prompt template")
}
