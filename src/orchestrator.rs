//! Turn orchestration
//!
//! One user turn: record the utterance, stream a reply from the model, resolve
//! a tool if the model picked one, then finalize both histories. Provisional
//! displays are pushed to a channel while the turn runs; the final display
//! item is the return value.

use crate::conversation::{Display, DisplayItem, ModelMessage, Session, StateError};
use crate::llm::{LlmError, LlmRequest, LlmService, ModelReply, ReplyAccumulator, ReplyProgress};
use crate::tools::{ToolKind, ToolResolver};
use futures::StreamExt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a weather assistant";

/// Progress of a running turn
#[derive(Debug, Clone, PartialEq)]
pub enum TurnUpdate {
    /// The user's message, as recorded in the display history
    User(DisplayItem),
    /// A display that will be superseded by the final one
    Provisional(Display),
}

/// Both display items produced by a completed turn
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub user: DisplayItem,
    pub response: DisplayItem,
}

#[derive(Debug, Error)]
pub enum TurnError {
    #[error("language model request failed: {0}")]
    Llm(#[from] LlmError),
    #[error(transparent)]
    State(#[from] StateError),
}

pub struct TurnOrchestrator {
    llm: Arc<dyn LlmService>,
    tools: ToolResolver,
    system_prompt: String,
}

impl TurnOrchestrator {
    pub fn new(llm: Arc<dyn LlmService>, tools: ToolResolver) -> Self {
        Self {
            llm,
            tools,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Run one turn against `session`.
    ///
    /// Tool failures are recorded in history and shown as `tool_error`
    /// displays; only model and state failures surface as `TurnError`. A
    /// closed `updates` receiver does not stop the turn.
    pub async fn submit_user_message(
        &self,
        session: &mut Session,
        text: &str,
        updates: &mpsc::UnboundedSender<TurnUpdate>,
    ) -> Result<TurnOutcome, TurnError> {
        let user = session.record_user_message(text)?;
        let _ = updates.send(TurnUpdate::User(user.clone()));

        tracing::info!(
            session_id = %session.id,
            history_len = session.ai.get().len(),
            "Starting turn"
        );

        let request = LlmRequest {
            system: self.system_prompt.clone(),
            messages: session.ai.get().to_vec(),
            tools: ToolKind::definitions(),
        };

        let reply = self.stream_reply(&request, updates).await?;
        let (message, display) = self.resolve_reply(reply).await;

        let response = session.finalize_response(message, display)?;
        tracing::info!(
            session_id = %session.id,
            display_id = response.id,
            "Turn finalized"
        );

        Ok(TurnOutcome { user, response })
    }

    async fn stream_reply(
        &self,
        request: &LlmRequest,
        updates: &mpsc::UnboundedSender<TurnUpdate>,
    ) -> Result<ModelReply, LlmError> {
        let mut stream = self.llm.stream(request).await?;
        let mut acc = ReplyAccumulator::new();

        while let Some(event) = stream.next().await {
            let provisional = match acc.push(event?) {
                Some(ReplyProgress::Text(text)) => Display::AssistantText { text },
                Some(ReplyProgress::ToolSelected { name }) => Display::Spinner { tool: name },
                None => continue,
            };
            let _ = updates.send(TurnUpdate::Provisional(provisional));
        }

        let reply = acc.finish();
        tracing::debug!(
            finish_reason = reply.finish_reason.as_deref().unwrap_or("none"),
            input_tokens = reply.usage.input_tokens,
            output_tokens = reply.usage.output_tokens,
            tool_calls = reply.tool_calls.len(),
            "Reply assembled"
        );
        Ok(reply)
    }

    /// Turn the assembled reply into the history entry and display to finalize
    async fn resolve_reply(&self, reply: ModelReply) -> (ModelMessage, Display) {
        let mut calls = reply.tool_calls.into_iter();

        let Some(call) = calls.next() else {
            if reply.text.is_empty() {
                tracing::warn!("Model returned neither text nor a tool call");
            }
            let display = Display::AssistantText {
                text: reply.text.clone(),
            };
            return (ModelMessage::assistant(reply.text), display);
        };

        for ignored in calls {
            tracing::warn!(tool = %ignored.name, "Ignoring additional tool call in the same turn");
        }

        tracing::info!(tool = %call.name, call_id = %call.id, arguments = %call.arguments, "Resolving tool call");
        let outcome = self.tools.resolve_raw(&call.name, &call.arguments).await;
        (outcome.history_message(), outcome.display())
    }
}
