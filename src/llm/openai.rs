//! `OpenAI` Chat Completions provider, streaming mode

use super::types::{LlmRequest, LlmStream, StreamEvent, Usage};
use super::{LlmConfig, LlmError, LlmService};
use crate::conversation::{ModelMessage, Role};
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::{future, stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DONE_SENTINEL: &str = "[DONE]";

/// OpenAI-compatible streaming service
pub struct OpenAIService {
    client: Client,
    api_key: Option<String>,
    model: String,
    url: String,
}

impl OpenAIService {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
        })
    }

    fn translate_request(&self, request: &LlmRequest) -> OpenAIRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if !request.system.is_empty() {
            messages.push(OpenAIMessage {
                role: Role::System.as_str().to_string(),
                content: request.system.clone(),
                name: None,
            });
        }

        messages.extend(request.messages.iter().map(Self::translate_message));

        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(
                request
                    .tools
                    .iter()
                    .map(|t| OpenAITool {
                        r#type: "function".to_string(),
                        function: OpenAIFunction {
                            name: t.name.clone(),
                            description: t.description.clone(),
                            parameters: t.input_schema.clone(),
                        },
                    })
                    .collect(),
            )
        };

        OpenAIRequest {
            model: self.model.clone(),
            messages,
            tools,
            stream: true,
            stream_options: StreamOptions {
                include_usage: true,
            },
        }
    }

    fn translate_message(msg: &ModelMessage) -> OpenAIMessage {
        OpenAIMessage {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
            name: msg.name.clone(),
        }
    }
}

#[async_trait]
impl LlmService for OpenAIService {
    async fn stream(&self, request: &LlmRequest) -> Result<LlmStream, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::auth("OPENAI_API_KEY is not set"))?;
        let openai_request = self.translate_request(request);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;
            let message = serde_json::from_str::<OpenAIErrorResponse>(&body)
                .map_or(body, |resp| resp.error.message);
            return Err(LlmError::from_status(status.as_u16(), &message));
        }

        let events = response
            .bytes_stream()
            .eventsource()
            .take_while(|event| {
                future::ready(!matches!(event, Ok(event) if event.data == DONE_SENTINEL))
            })
            .flat_map(|event| {
                let items = match event {
                    Ok(event) => parse_chunk(&event.data),
                    Err(e) => vec![Err(LlmError::network(format!("SSE stream error: {e}")))],
                };
                stream::iter(items)
            });

        Ok(Box::pin(events))
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// Parse one `data:` payload into stream events
pub(crate) fn parse_chunk(data: &str) -> Vec<Result<StreamEvent, LlmError>> {
    let chunk: OpenAIChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            return vec![Err(LlmError::unknown(format!(
                "Failed to parse stream chunk: {e} - data: {data}"
            )))]
        }
    };

    if let Some(error) = chunk.error {
        return vec![Err(LlmError::server_error(format!(
            "Stream error: {}",
            error.message
        )))];
    }

    let mut events = Vec::new();

    if let Some(choice) = chunk.choices.into_iter().next() {
        if let Some(text) = choice.delta.content {
            if !text.is_empty() {
                events.push(Ok(StreamEvent::TextDelta(text)));
            }
        }

        for tc in choice.delta.tool_calls.unwrap_or_default() {
            let (name, arguments) = tc
                .function
                .map_or((None, None), |f| (f.name, f.arguments));
            events.push(Ok(StreamEvent::ToolCallDelta {
                index: tc.index,
                id: tc.id,
                name,
                arguments,
            }));
        }

        if let Some(reason) = choice.finish_reason {
            events.push(Ok(StreamEvent::Finished { reason }));
        }
    }

    if let Some(usage) = chunk.usage {
        events.push(Ok(StreamEvent::Usage(Usage {
            input_tokens: u64::from(usage.prompt_tokens),
            output_tokens: u64::from(usage.completion_tokens),
        })));
    }

    events
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
    stream: bool,
    stream_options: StreamOptions,
}

#[derive(Debug, Serialize)]
struct StreamOptions {
    include_usage: bool,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct OpenAITool {
    r#type: String,
    function: OpenAIFunction,
}

#[derive(Debug, Serialize)]
struct OpenAIFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct OpenAIChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    usage: Option<ChunkUsage>,
    #[serde(default)]
    error: Option<OpenAIError>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
    tool_calls: Option<Vec<ChunkToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ChunkToolCall {
    #[serde(default)]
    index: usize,
    id: Option<String>,
    function: Option<ChunkFunction>,
}

#[derive(Debug, Deserialize)]
struct ChunkFunction {
    name: Option<String>,
    arguments: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)]
struct ChunkUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}
