//! Request/response types for LLM completions

use serde::{Deserialize, Serialize};

/// Message author role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One conversation message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A single completion request. Stateless: every calendar generation is an
/// independent conversation.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System prompt establishing the assistant's task
    pub system_prompt: String,

    /// Conversation messages (usually a single user message)
    pub messages: Vec<Message>,

    /// Response token budget
    pub max_tokens: u32,
}

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopReason {
    #[default]
    EndTurn,
    /// Budget exhausted: the reply text is likely truncated mid-structure
    MaxTokens,
}

/// Token accounting reported by the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// A completed (non-streaming) response
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Text content; `None` when the model produced nothing
    pub content: Option<String>,

    pub stop_reason: StopReason,

    pub usage: TokenUsage,
}
