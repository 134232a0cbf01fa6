//! Error types for adapters.

use thiserror::Error;

/// Errors that can occur while setting up an adapter.
///
/// Failures of individual records are reported as
/// [`SinkError`](vitalsim_sdk::SinkError) instead.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Invalid adapter configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
