//! HTTP API: chat page, session lifecycle, and turn submission

mod assets;
mod handlers;
mod sse;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::conversation::SessionStore;
use crate::orchestrator::TurnOrchestrator;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub orchestrator: Arc<TurnOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: TurnOrchestrator) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new()),
            orchestrator: Arc::new(orchestrator),
        }
    }
}
