//! API request and response types

use crate::conversation::{DisplayItem, ModelMessage};
use serde::{Deserialize, Serialize};

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Response for session creation
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionCreatedResponse {
    pub session_id: String,
}

/// Response with both histories of a session
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub messages: Vec<DisplayItem>,
    pub history: Vec<ModelMessage>,
}

/// Response for a completed turn
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub user: DisplayItem,
    pub response: DisplayItem,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
