//! Error types for the Gemma assistant.

use thiserror::Error;

/// A shared error type for every layer of the assistant.
///
/// Storage and model failures are both represented here, but they are handled
/// very differently: storage errors are logged and swallowed by the store
/// wrappers, while `ModelUnavailable` is surfaced to the user with a
/// remediation hint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssistantError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON", "TOML", ...
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted schema could not be migrated
    #[error("Migration error: {0}")]
    Migration(String),

    /// The inference endpoint could not produce a reply.
    ///
    /// Every transport-level failure (connection refused, timeout, non-2xx
    /// status, malformed body) collapses into this single variant.
    #[error("{0}")]
    ModelUnavailable(String),

    /// User input rejected before any state mutation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AssistantError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

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

    /// Creates a Migration error
    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration(message.into())
    }

    /// Creates a ModelUnavailable error
    pub fn model_unavailable(message: impl Into<String>) -> Self {
        Self::ModelUnavailable(message.into())
    }

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is an IO error
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if the model service failed to answer
    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, Self::ModelUnavailable(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for AssistantError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for AssistantError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for AssistantError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for AssistantError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, AssistantError>`.
pub type Result<T> = std::result::Result<T, AssistantError>;
