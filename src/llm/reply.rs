//! Assembles streamed completion events into a reply

use super::types::{ModelReply, StreamEvent, ToolCallRequest, Usage};
use std::collections::BTreeMap;

/// Something the caller can show while the reply is still streaming
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyProgress {
    /// Accumulated text so far
    Text(String),
    /// The model committed to calling a tool; reported for the first call only
    ToolSelected { name: String },
}

#[derive(Debug, Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

#[derive(Debug, Default)]
pub struct ReplyAccumulator {
    text: String,
    tool_calls: BTreeMap<usize, PartialToolCall>,
    finish_reason: Option<String>,
    usage: Usage,
}

impl ReplyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event in, reporting progress worth showing
    pub fn push(&mut self, event: StreamEvent) -> Option<ReplyProgress> {
        match event {
            StreamEvent::TextDelta(delta) => {
                if delta.is_empty() {
                    return None;
                }
                self.text.push_str(&delta);
                Some(ReplyProgress::Text(self.text.clone()))
            }
            StreamEvent::ToolCallDelta {
                index,
                id,
                name,
                arguments,
            } => {
                // Only the first named call will be resolved, so only it is announced
                let another_named = self
                    .tool_calls
                    .iter()
                    .any(|(i, call)| *i != index && !call.name.is_empty());
                let call = self.tool_calls.entry(index).or_default();
                if let Some(id) = id {
                    call.id = id;
                }
                if let Some(arguments) = arguments {
                    call.arguments.push_str(&arguments);
                }
                match name {
                    Some(name) if call.name.is_empty() && !name.is_empty() => {
                        call.name = name;
                        (!another_named).then(|| ReplyProgress::ToolSelected {
                            name: call.name.clone(),
                        })
                    }
                    _ => None,
                }
            }
            StreamEvent::Finished { reason } => {
                self.finish_reason = Some(reason);
                None
            }
            StreamEvent::Usage(usage) => {
                self.usage = usage;
                None
            }
        }
    }

    pub fn finish(self) -> ModelReply {
        let tool_calls = self
            .tool_calls
            .into_values()
            .filter(|call| !call.name.is_empty())
            .map(|call| ToolCallRequest {
                id: call.id,
                name: call.name,
                arguments: call.arguments,
            })
            .collect();

        ModelReply {
            text: self.text,
            tool_calls,
            finish_reason: self.finish_reason,
            usage: self.usage,
        }
    }
}
