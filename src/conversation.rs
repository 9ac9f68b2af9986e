//! Per-session conversation state
//!
//! A session owns the model-facing history and the display history. Sessions
//! live in memory for the lifetime of the process.

mod message;
mod state;

#[cfg(test)]
mod proptests;

pub use message::{Display, DisplayItem, ModelMessage, Role};
pub use state::{AiState, StateError, UiState};

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, OwnedMutexGuard, RwLock};

/// One browser session's conversation
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub ai: AiState,
    pub ui: UiState,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ai: AiState::new(),
            ui: UiState::new(),
        }
    }

    /// Record a user utterance in both histories.
    ///
    /// The model-facing entry is appended with `update`, so it stays part of
    /// the open turn until the response is finalized.
    pub fn record_user_message(&mut self, text: &str) -> Result<DisplayItem, StateError> {
        let messages = self.ai.with_appended(ModelMessage::user(text));
        self.ai.update(messages)?;
        Ok(self.ui.push(Display::UserText {
            text: text.to_string(),
        }))
    }

    /// Finalize the turn with the resolved response
    pub fn finalize_response(
        &mut self,
        message: ModelMessage,
        display: Display,
    ) -> Result<DisplayItem, StateError> {
        let messages = self.ai.with_appended(message);
        self.ai.done(messages)?;
        Ok(self.ui.push(display))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            messages: self.ui.items().to_vec(),
            history: self.ai.get().to_vec(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(String),
    #[error("a turn is already in progress for session {0}")]
    Busy(String),
}

/// Read-only copy of a session's histories
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub id: String,
    pub messages: Vec<DisplayItem>,
    pub history: Vec<ModelMessage>,
}

/// Exclusive access to a session for one turn.
///
/// Dropping the guard publishes the session's histories to readers.
pub struct TurnGuard {
    session: OwnedMutexGuard<Session>,
    published: Arc<watch::Sender<SessionSnapshot>>,
}

impl Deref for TurnGuard {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.session
    }
}

impl DerefMut for TurnGuard {
    fn deref_mut(&mut self) -> &mut Session {
        &mut self.session
    }
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        self.published.send_replace(self.session.snapshot());
    }
}

#[derive(Clone)]
struct SessionEntry {
    session: Arc<Mutex<Session>>,
    published: Arc<watch::Sender<SessionSnapshot>>,
}

/// In-memory registry of sessions.
///
/// Each session sits behind its own async mutex; holding the guard is what
/// makes a turn exclusive. Readers never take that mutex and see the state
/// as of the last finished turn.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session and return its id
    pub async fn create(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let session = Session::new(id.clone());
        let (published, _) = watch::channel(session.snapshot());
        let entry = SessionEntry {
            session: Arc::new(Mutex::new(session)),
            published: Arc::new(published),
        };
        self.sessions.write().await.insert(id.clone(), entry);
        tracing::info!(session_id = %id, "Session created");
        id
    }

    async fn entry(&self, id: &str) -> Result<SessionEntry, SessionError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    /// Histories as of the last finished turn; never waits on a running one
    pub async fn snapshot(&self, id: &str) -> Result<SessionSnapshot, SessionError> {
        let entry = self.entry(id).await?;
        let snapshot = entry.published.borrow().clone();
        Ok(snapshot)
    }

    /// Claim a session for a new turn, failing if one is already running
    pub async fn begin_turn(&self, id: &str) -> Result<TurnGuard, SessionError> {
        let entry = self.entry(id).await?;
        let session = entry
            .session
            .try_lock_owned()
            .map_err(|_| SessionError::Busy(id.to_string()))?;
        Ok(TurnGuard {
            session,
            published: entry.published,
        })
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
