//! Error types for Agent Relay.

/// Top-level error type for the relay.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Mailbox error: {0}")]
    Mailbox(#[from] MailboxError),

    #[error("QA error: {0}")]
    Qa(#[from] QaError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Mailbox errors. Only one condition exists: the mailbox was shut down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MailboxError {
    #[error("Mailbox is closed")]
    Closed,
}

/// QA table and question cycle errors.
#[derive(Debug, thiserror::Error)]
pub enum QaError {
    #[error("QA source must be a JSON object of question -> answer")]
    NotAnObject,

    #[error("Answer for question {question:?} is not a string")]
    InvalidAnswer { question: String },

    #[error("Question cycle needs at least one question")]
    EmptyCycle,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outbound/forward sink errors.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Sink {name} disconnected")]
    Disconnected { name: String },
}

/// Result type alias for the relay.
pub type Result<T> = std::result::Result<T, Error>;
