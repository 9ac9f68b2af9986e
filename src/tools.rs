//! Tools the model may call instead of answering in text
//!
//! The set is closed: every tool is a variant of `ToolKind`, parsed into a
//! typed `ToolCall` and resolved into a typed `ToolPayload`.

pub mod flight;
pub mod weather;

pub use flight::{lookup_flight, FlightInfo, FlightInfoInput};
pub use weather::{
    RapidApiWeather, WeatherConfig, WeatherInfo, WeatherInfoInput, WeatherSource,
};

use crate::conversation::{Display, ModelMessage};
use crate::llm::ToolDefinition;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

/// Declared tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    FlightInfo,
    WeatherInfo,
}

impl ToolKind {
    pub const ALL: [ToolKind; 2] = [ToolKind::FlightInfo, ToolKind::WeatherInfo];

    /// Name used both in the tool schema and in recorded history
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::FlightInfo => flight::NAME,
            ToolKind::WeatherInfo => weather::NAME,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn definition(self) -> ToolDefinition {
        let (description, input_schema) = match self {
            ToolKind::FlightInfo => (flight::description(), flight::input_schema()),
            ToolKind::WeatherInfo => (weather::description(), weather::input_schema()),
        };
        ToolDefinition {
            name: self.name().to_string(),
            description,
            input_schema,
        }
    }

    /// Definitions for every declared tool, in declaration order
    pub fn definitions() -> Vec<ToolDefinition> {
        Self::ALL.into_iter().map(Self::definition).collect()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: &'static str, reason: String },
}

/// A validated tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    FlightInfo(FlightInfoInput),
    WeatherInfo(WeatherInfoInput),
}

impl ToolCall {
    /// Validate a model-issued call against the declared schemas.
    ///
    /// `arguments` is the raw JSON string the model produced.
    pub fn parse(name: &str, arguments: &str) -> Result<Self, ToolError> {
        let kind =
            ToolKind::from_name(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let invalid = |e: serde_json::Error| ToolError::InvalidArguments {
            tool: kind.name(),
            reason: e.to_string(),
        };

        match kind {
            ToolKind::FlightInfo => serde_json::from_str(arguments)
                .map(ToolCall::FlightInfo)
                .map_err(invalid),
            ToolKind::WeatherInfo => serde_json::from_str(arguments)
                .map(ToolCall::WeatherInfo)
                .map_err(invalid),
        }
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            ToolCall::FlightInfo(_) => ToolKind::FlightInfo,
            ToolCall::WeatherInfo(_) => ToolKind::WeatherInfo,
        }
    }
}

/// Successful tool result
#[derive(Debug, Clone, PartialEq)]
pub enum ToolPayload {
    Flight(FlightInfo),
    Weather(WeatherInfo),
}

/// Outcome of resolving one tool call, successful or not
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    /// Tool name as the model called it
    pub tool: String,
    pub result: Result<ToolPayload, String>,
}

impl ToolOutcome {
    pub fn failed(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            result: Err(reason.into()),
        }
    }

    /// JSON recorded as the function message content.
    ///
    /// Failures become `{"error": reason}` so the model sees why.
    pub fn history_content(&self) -> String {
        let value = match &self.result {
            Ok(ToolPayload::Flight(info)) => serde_json::to_value(info),
            Ok(ToolPayload::Weather(info)) => serde_json::to_value(info),
            Err(reason) => Ok(json!({ "error": reason })),
        };
        value.unwrap_or(Value::Null).to_string()
    }

    pub fn history_message(&self) -> ModelMessage {
        ModelMessage::function(self.tool.clone(), self.history_content())
    }

    pub fn display(&self) -> Display {
        match &self.result {
            Ok(ToolPayload::Flight(info)) => Display::FlightCard(info.clone()),
            Ok(ToolPayload::Weather(info)) => Display::WeatherCard(info.clone()),
            Err(reason) => Display::ToolError {
                tool: self.tool.clone(),
                message: reason.clone(),
            },
        }
    }
}

/// Resolves validated tool calls against their data sources
#[derive(Clone)]
pub struct ToolResolver {
    weather: Arc<dyn WeatherSource>,
}

impl ToolResolver {
    pub fn new(weather: Arc<dyn WeatherSource>) -> Self {
        Self { weather }
    }

    /// Resolve a call. Data source failures are logged and reported in the
    /// outcome, never returned as errors.
    pub async fn resolve(&self, call: &ToolCall) -> ToolOutcome {
        let tool = call.kind().name();
        let result = match call {
            ToolCall::FlightInfo(input) => Ok(ToolPayload::Flight(lookup_flight(
                &input.flight_number,
            ))),
            ToolCall::WeatherInfo(input) => match self.weather.current(&input.city).await {
                Ok(info) => Ok(ToolPayload::Weather(info)),
                Err(e) => {
                    tracing::error!(tool, city = %input.city, error = %e, "Weather lookup failed");
                    Err(e.to_string())
                }
            },
        };

        ToolOutcome {
            tool: tool.to_string(),
            result,
        }
    }

    /// Parse and resolve a raw model tool call
    pub async fn resolve_raw(&self, name: &str, arguments: &str) -> ToolOutcome {
        match ToolCall::parse(name, arguments) {
            Ok(call) => self.resolve(&call).await,
            Err(e) => {
                tracing::warn!(tool = %name, arguments = %arguments, error = %e, "Rejected tool call");
                ToolOutcome::failed(name, e.to_string())
            }
        }
    }
}
