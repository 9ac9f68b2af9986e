//! Mock implementations for testing
//!
//! These mocks enable orchestrator and API tests without real I/O.

use crate::llm::{LlmError, LlmRequest, LlmService, LlmStream, StreamEvent, Usage};
use crate::tools::weather::WeatherError;
use crate::tools::{WeatherInfo, WeatherSource};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

// ============================================================================
// Scripted LLM
// ============================================================================

type Script = Result<Vec<Result<StreamEvent, LlmError>>, LlmError>;

/// Mock LLM that replays queued event scripts, one per request
pub struct ScriptedLlm {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a raw event script
    pub fn queue_events(&self, events: Vec<Result<StreamEvent, LlmError>>) {
        self.scripts.lock().unwrap().push_back(Ok(events));
    }

    /// Queue a text reply streamed in the given fragments
    pub fn queue_text(&self, fragments: &[&str]) {
        let mut events: Vec<_> = fragments
            .iter()
            .map(|f| Ok(StreamEvent::TextDelta((*f).to_string())))
            .collect();
        events.push(Ok(StreamEvent::Finished {
            reason: "stop".to_string(),
        }));
        events.push(Ok(StreamEvent::Usage(Usage {
            input_tokens: 10,
            output_tokens: 5,
        })));
        self.queue_events(events);
    }

    /// Queue a single tool call whose arguments arrive in two fragments
    pub fn queue_tool_call(&self, name: &str, arguments: &str) {
        let split = arguments.len() / 2;
        let (head, tail) = arguments.split_at(split);
        self.queue_events(vec![
            Ok(StreamEvent::ToolCallDelta {
                index: 0,
                id: Some("call_0".to_string()),
                name: Some(name.to_string()),
                arguments: Some(String::new()),
            }),
            Ok(StreamEvent::ToolCallDelta {
                index: 0,
                id: None,
                name: None,
                arguments: Some(head.to_string()),
            }),
            Ok(StreamEvent::ToolCallDelta {
                index: 0,
                id: None,
                name: None,
                arguments: Some(tail.to_string()),
            }),
            Ok(StreamEvent::Finished {
                reason: "tool_calls".to_string(),
            }),
        ]);
    }

    /// Queue a failure to open the stream
    pub fn queue_error(&self, error: LlmError) {
        self.scripts.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for ScriptedLlm {
    async fn stream(&self, request: &LlmRequest) -> Result<LlmStream, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))?;
        Ok(Box::pin(futures::stream::iter(script)))
    }

    fn model_id(&self) -> &str {
        "scripted-model"
    }
}

// ============================================================================
// Static weather source
// ============================================================================

/// Weather source with a fixed answer
pub struct StaticWeather {
    answer: Result<(f64, String), String>,
    pub lookups: Mutex<Vec<String>>,
}

impl StaticWeather {
    /// Reports the given Celsius temperature and conditions for any city
    pub fn new(temperature: f64, conditions: &str) -> Self {
        Self {
            answer: Ok((temperature, conditions.to_string())),
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn sunny() -> Self {
        Self::new(21.5, "Clear")
    }

    /// Fails every lookup with the given reason
    pub fn failing(reason: &str) -> Self {
        Self {
            answer: Err(reason.to_string()),
            lookups: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl WeatherSource for StaticWeather {
    async fn current(&self, city: &str) -> Result<WeatherInfo, WeatherError> {
        self.lookups.lock().unwrap().push(city.to_string());
        match &self.answer {
            Ok((temperature, conditions)) => Ok(WeatherInfo {
                city: city.to_string(),
                temperature: *temperature,
                conditions: conditions.clone(),
            }),
            Err(reason) => Err(WeatherError::Status {
                status: 503,
                body: reason.clone(),
            }),
        }
    }
}
