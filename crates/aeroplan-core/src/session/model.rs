//! Caller-owned session context.

use super::memory::ConversationMemory;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Shared handle passed into every orchestrator call of one conversation.
pub type SharedSession = Arc<ConversationSession>;

/// State of a single conversation.
///
/// The caller creates one session per conversation and passes it to each
/// turn. Memory is read once when a turn starts and appended once when it
/// completes; concurrent turns on the same session are not coordinated.
#[derive(Debug)]
pub struct ConversationSession {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// When the session was opened
    pub created_at: DateTime<Utc>,
    memory: Mutex<ConversationMemory>,
}

impl ConversationSession {
    /// Opens a session whose memory keeps the last `window` turns.
    pub fn new(window: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            memory: Mutex::new(ConversationMemory::new(window)),
        }
    }

    /// Opens a session and wraps it for sharing across turns.
    pub fn shared(window: usize) -> SharedSession {
        Arc::new(Self::new(window))
    }

    /// Snapshot of the history text used as prompt context.
    pub async fn history_text(&self) -> String {
        self.memory.lock().await.history_text()
    }

    /// Appends a completed turn.
    pub async fn record_turn(&self, input: impl Into<String>, output: impl Into<String>) {
        self.memory.lock().await.record(input, output);
    }

    /// Copy of the current memory window.
    pub async fn memory_snapshot(&self) -> ConversationMemory {
        self.memory.lock().await.clone()
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new(super::memory::DEFAULT_MEMORY_WINDOW)
    }
}
