//! Domain core of Aeroplan: intents, conversation memory, graph record
//! formatting, plan table extraction and the service traits the other
//! crates implement.

pub mod config;
pub mod error;
pub mod graph;
pub mod intent;
pub mod llm;
pub mod plan;
pub mod session;
pub mod visualization;

// Re-export common types
pub use error::{AeroError, Result};
pub use intent::{Intent, UnrecognizedIntentPolicy};
