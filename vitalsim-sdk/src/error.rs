//! Error types for sinks and producers.

use thiserror::Error;

/// Errors a sink can report for a single `put_record` call.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Local I/O failed (file, stdout, socket write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The receiving side has gone away.
    #[error("Sink closed")]
    Closed,

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The sink refused the record.
    #[error("Record rejected: {0}")]
    Rejected(String),

    /// Timeout waiting for the sink to acknowledge.
    #[error("Request timed out")]
    Timeout,
}

/// Errors that end a producer run.
#[derive(Debug, Error)]
pub enum ProducerError {
    /// A reading could not be serialized.
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The sink failed and the error hook did not ask for another attempt.
    #[error("Sink failed after {attempts} attempt(s): {source}")]
    Sink {
        attempts: u32,
        #[source]
        source: SinkError,
    },

    /// The record could not be echoed to stdout.
    #[error("Failed to echo record: {0}")]
    Echo(#[source] std::io::Error),

    /// Invalid producer or generator configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The background task panicked or was cancelled.
    #[error("Producer task failed: {0}")]
    Task(String),
}

impl ProducerError {
    /// Whether this error came from the sink.
    pub fn is_sink(&self) -> bool {
        matches!(self, ProducerError::Sink { .. })
    }
}
