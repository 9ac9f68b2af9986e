//! Model-facing messages and user-facing display units

use crate::tools::{FlightInfo, WeatherInfo};
use serde::{Deserialize, Serialize};

/// Role of a model-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Function,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Function => "function",
        }
    }
}

/// Entry in the history replayed to the language model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ModelMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            name: None,
            id: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            name: None,
            id: None,
        }
    }

    /// Result of a tool call, recorded under the tool's name
    pub fn function(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Function,
            content: content.into(),
            name: Some(name.into()),
            id: None,
        }
    }
}

/// A renderable unit shown to the user.
///
/// The browser decides how each kind looks; the server only guarantees the
/// shape of the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Display {
    UserText {
        text: String,
    },
    AssistantText {
        text: String,
    },
    /// Placeholder while a tool resolves
    Spinner {
        tool: String,
    },
    FlightCard(FlightInfo),
    WeatherCard(WeatherInfo),
    ToolError {
        tool: String,
        message: String,
    },
}

/// Entry in the display history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayItem {
    /// Unix time in milliseconds, strictly increasing within a session
    pub id: i64,
    pub display: Display,
}
