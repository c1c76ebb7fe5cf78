//! Conversation session module.
//!
//! # Module Structure
//!
//! - `memory`: Bounded window of conversation turns (`ConversationMemory`, `Turn`)
//! - `model`: Caller-owned session context (`ConversationSession`)

mod memory;
mod model;

// Re-export public API
pub use memory::{ConversationMemory, DEFAULT_MEMORY_WINDOW, Turn};
pub use model::{ConversationSession, SharedSession};
