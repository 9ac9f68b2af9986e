//! Common types for LLM interactions

use crate::conversation::ModelMessage;
use futures::Stream;
use std::pin::Pin;

use super::LlmError;

/// LLM request
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub system: String,
    pub messages: Vec<ModelMessage>,
    pub tools: Vec<ToolDefinition>,
}

/// Tool definition
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Incremental event from a streamed completion
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Next fragment of the text answer
    TextDelta(String),
    /// Fragment of a tool call. `id` and `name` arrive on the first fragment
    /// for an index; `arguments` is split across fragments.
    ToolCallDelta {
        index: usize,
        id: Option<String>,
        name: Option<String>,
        arguments: Option<String>,
    },
    /// The model stopped generating
    Finished { reason: String },
    Usage(Usage),
}

/// Boxed stream of completion events
pub type LlmStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send>>;

/// A tool call assembled from stream fragments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    /// Raw JSON arguments as produced by the model
    pub arguments: String,
}

/// Fully assembled reply
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub text: String,
    pub tool_calls: Vec<ToolCallRequest>,
    pub finish_reason: Option<String>,
    pub usage: Usage,
}

/// Usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
