//! Append-only conversation histories
//!
//! `AiState` holds what the model sees, `UiState` what the user sees. Both only
//! ever grow; entries of `AiState` become immutable once a turn is finalized.

use super::message::{Display, DisplayItem, ModelMessage};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("history update would rewrite existing entries (current {current}, proposed {proposed})")]
    HistoryRewritten { current: usize, proposed: usize },
}

/// Model-facing history
#[derive(Debug, Clone, Default)]
pub struct AiState {
    messages: Vec<ModelMessage>,
    /// Number of leading entries that may no longer change
    finalized: usize,
}

impl AiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> &[ModelMessage] {
        &self.messages
    }

    #[cfg(test)]
    pub fn finalized_len(&self) -> usize {
        self.finalized
    }

    /// Replace the history with a new snapshot.
    ///
    /// The snapshot must start with every current entry unchanged, so the
    /// history only ever grows.
    pub fn update(&mut self, messages: Vec<ModelMessage>) -> Result<(), StateError> {
        self.check_prefix(&messages)?;
        self.messages = messages;
        Ok(())
    }

    /// Replace the history and finalize every entry in it
    pub fn done(&mut self, messages: Vec<ModelMessage>) -> Result<(), StateError> {
        self.update(messages)?;
        self.finalized = self.messages.len();
        Ok(())
    }

    /// Snapshot of the current history with one more entry
    pub fn with_appended(&self, message: ModelMessage) -> Vec<ModelMessage> {
        let mut messages = self.messages.clone();
        messages.push(message);
        messages
    }

    fn check_prefix(&self, proposed: &[ModelMessage]) -> Result<(), StateError> {
        if proposed.starts_with(&self.messages) {
            Ok(())
        } else {
            Err(StateError::HistoryRewritten {
                current: self.messages.len(),
                proposed: proposed.len(),
            })
        }
    }
}

/// Display history
#[derive(Debug, Clone, Default)]
pub struct UiState {
    items: Vec<DisplayItem>,
    last_id: i64,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[DisplayItem] {
        &self.items
    }

    /// Append a display unit stamped with the current time
    pub fn push(&mut self, display: Display) -> DisplayItem {
        self.push_at(chrono::Utc::now().timestamp_millis(), display)
    }

    /// Append with an explicit timestamp, bumped past the previous id when the
    /// clock has not advanced
    pub fn push_at(&mut self, now_millis: i64, display: Display) -> DisplayItem {
        let id = now_millis.max(self.last_id + 1);
        self.last_id = id;
        let item = DisplayItem { id, display };
        self.items.push(item.clone());
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Display {
        Display::UserText {
            text: s.to_string(),
        }
    }

    #[test]
    fn test_update_appends_open_entries() {
        let mut state = AiState::new();
        state.update(vec![ModelMessage::user("a")]).unwrap();
        state
            .update(vec![ModelMessage::user("a"), ModelMessage::user("b")])
            .unwrap();
        assert_eq!(state.get().len(), 2);
        assert_eq!(state.finalized_len(), 0);
    }

    #[test]
    fn test_open_entries_cannot_be_dropped() {
        let mut state = AiState::new();
        let finalized = vec![ModelMessage::user("a"), ModelMessage::assistant("b")];
        state.done(finalized.clone()).unwrap();
        state
            .update(state.with_appended(ModelMessage::user("c")))
            .unwrap();

        let err = state.update(finalized).unwrap_err();
        assert_eq!(
            err,
            StateError::HistoryRewritten {
                current: 3,
                proposed: 2
            }
        );
        assert_eq!(state.get().len(), 3);
    }

    #[test]
    fn test_open_entries_cannot_be_edited() {
        let mut state = AiState::new();
        state.update(vec![ModelMessage::user("a")]).unwrap();
        assert!(state.update(vec![ModelMessage::user("edited")]).is_err());
        assert_eq!(state.get(), &[ModelMessage::user("a")]);
    }

    #[test]
    fn test_done_finalizes_everything() {
        let mut state = AiState::new();
        state
            .done(vec![ModelMessage::user("hi"), ModelMessage::assistant("hello")])
            .unwrap();
        assert_eq!(state.finalized_len(), 2);
    }

    #[test]
    fn test_finalized_entries_cannot_change() {
        let mut state = AiState::new();
        state.done(vec![ModelMessage::user("hi")]).unwrap();

        let err = state.update(vec![ModelMessage::user("edited")]).unwrap_err();
        assert_eq!(
            err,
            StateError::HistoryRewritten {
                current: 1,
                proposed: 1
            }
        );
        assert_eq!(state.get(), &[ModelMessage::user("hi")]);
    }

    #[test]
    fn test_finalized_entries_cannot_be_dropped() {
        let mut state = AiState::new();
        state.done(vec![ModelMessage::user("hi")]).unwrap();
        assert!(state.update(Vec::new()).is_err());
        assert_eq!(state.get().len(), 1);
    }

    #[test]
    fn test_with_appended_leaves_state_untouched() {
        let mut state = AiState::new();
        state.done(vec![ModelMessage::user("hi")]).unwrap();
        let next = state.with_appended(ModelMessage::assistant("yo"));
        assert_eq!(next.len(), 2);
        assert_eq!(state.get().len(), 1);
    }

    #[test]
    fn test_display_ids_strictly_increase() {
        let mut ui = UiState::new();
        let a = ui.push_at(1_000, text("a"));
        let b = ui.push_at(1_000, text("b"));
        let c = ui.push_at(900, text("c"));
        let d = ui.push_at(5_000, text("d"));
        assert_eq!(
            [a.id, b.id, c.id, d.id],
            [1_000, 1_001, 1_002, 5_000]
        );
        assert_eq!(ui.items().len(), 4);
    }
}
