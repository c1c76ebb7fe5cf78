//! Bounded conversation memory.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of turns kept when no explicit window is configured.
pub const DEFAULT_MEMORY_WINDOW: usize = 10;

/// One completed question/answer exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// The user's question.
    pub input: String,
    /// The full answer text, including any appended notices.
    pub output: String,
}

/// Ordered window over the most recent turns of a conversation.
///
/// Eviction is enforced on every [`record`](Self::record): once the window is
/// full, the oldest turn is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMemory {
    window: usize,
    turns: VecDeque<Turn>,
}

impl ConversationMemory {
    /// Creates an empty memory keeping at most `window` turns.
    ///
    /// A window of zero is raised to one so the last turn is always available.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            turns: VecDeque::with_capacity(window),
        }
    }

    /// Appends a completed turn, evicting the oldest when the window is full.
    pub fn record(&mut self, input: impl Into<String>, output: impl Into<String>) {
        if self.turns.len() == self.window {
            self.turns.pop_front();
        }
        self.turns.push_back(Turn {
            input: input.into(),
            output: output.into(),
        });
    }

    /// Renders the window as prompt context, oldest turn first.
    ///
    /// ```
    /// use aeroplan_core::session::ConversationMemory;
    ///
    /// let mut memory = ConversationMemory::new(2);
    /// memory.record("Which operations need a crane?", "JigIn, Drilling");
    /// assert_eq!(
    ///     memory.history_text(),
    ///     "Human: Which operations need a crane?\nAI: JigIn, Drilling"
    /// );
    /// ```
    pub fn history_text(&self) -> String {
        self.turns
            .iter()
            .map(|turn| format!("Human: {}\nAI: {}", turn.input, turn.output))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Turns currently held, oldest first.
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_WINDOW)
    }
}
