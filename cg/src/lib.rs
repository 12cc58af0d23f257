//! Calgen - content calendar generation with a resilient response decoder
//!
//! The marketing-ops product around this crate is plain CRUD; the hard
//! part lives here. An LLM is asked for a content calendar and answers in
//! whatever shape it feels like: clean JSON on a good day, single-quoted,
//! truncated, brace-starved or prose on a bad one. A human is waiting for
//! that calendar, so decoding never fails - a cascade of six recovery
//! strategies guarantees a non-empty, validated [`schedule::Schedule`].
//!
//! # Modules
//!
//! - [`decoder`] - the six-strategy recovery cascade and repair utilities
//! - [`schedule`] - calendar domain types and the mandatory-field invariant
//! - [`llm`] - client trait, categorized errors, OpenAI-compatible impl
//! - [`generator`] - prompt -> completion -> decode, end to end
//! - [`prompts`] - Handlebars prompt construction
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod decoder;
pub mod generator;
pub mod llm;
pub mod prompts;
pub mod schedule;

// Re-export commonly used types
pub use config::{Config, GenerationConfig, LlmConfig};
pub use decoder::{
    decode_schedule, decode_schedule_with_report, DecodeContext, DecodeReport, StrategyAttempt, StrategyKind,
};
pub use generator::{generate_schedule, GenerateRequest};
pub use llm::{
    create_client, CompletionRequest, CompletionResponse, ErrorCategory, LlmClient, LlmError, Message, OpenAIClient,
    Role, StopReason, TokenUsage,
};
pub use schedule::{Schedule, ScheduleEntry, DEFAULT_POST_TIME, KNOWN_PLATFORMS};
