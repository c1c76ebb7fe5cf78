//! Error types for the Aeroplan workspace.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for every Aeroplan crate.
///
/// Variants follow the failure taxonomy of a QA turn: service faults
/// (`Classification`, `Retrieval`, `Generation`) abort the turn, while
/// `Persistence` is reported as a warning and the turn still completes.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum AeroError {
    /// The router produced something other than a known intent
    #[error("Unrecognized query classification: '{raw}'")]
    Classification { raw: String },

    /// Graph query translation or execution failed
    #[error("Graph retrieval error: {0}")]
    Retrieval(String),

    /// LLM completion or token streaming failed
    #[error("Generation error: {0}")]
    Generation(String),

    /// Writing an artifact (plan, visualization) failed
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", "CSV"
        message: String,
    },

    /// Prompt or page template rendering error
    #[error("Template error: {0}")]
    Template(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AeroError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Classification error from the raw router output
    pub fn classification(raw: impl Into<String>) -> Self {
        Self::Classification { raw: raw.into() }
    }

    /// Creates a Retrieval error
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval(message.into())
    }

    /// Creates a Generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Creates a Persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a classification fault
    pub fn is_classification(&self) -> bool {
        matches!(self, Self::Classification { .. })
    }

    /// Check if this is a retrieval fault
    pub fn is_retrieval(&self) -> bool {
        matches!(self, Self::Retrieval(_))
    }

    /// Check if this is a generation fault
    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation(_))
    }

    /// Check if this is a persistence fault
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for AeroError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for AeroError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for AeroError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for AeroError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<minijinja::Error> for AeroError {
    fn from(err: minijinja::Error) -> Self {
        Self::Template(err.to_string())
    }
}

/// A type alias for `Result<T, AeroError>`.
pub type Result<T> = std::result::Result<T, AeroError>;
