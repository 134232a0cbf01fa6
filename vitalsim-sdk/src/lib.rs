//! # vitalsim-sdk
//!
//! Generators and a producer loop for streaming synthetic vital-sign readings
//! to an ingestion sink.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vitalsim_sdk::{BloodPressureGenerator, Output, Producer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let producer = Producer::builder(BloodPressureGenerator::new())
//!         .output(Output::file("readings.ndjson"))
//!         .stream_name("inputStream")
//!         .partition_key("partitionkey")
//!         .limit(1_000)
//!         .build();
//!
//!     // Start the loop in the background
//!     let handle = producer.start();
//!
//!     // ... later, stop it and collect the summary
//!     handle.stop();
//!     let summary = handle.wait().await.expect("producer failed");
//!     println!("sent {} records", summary.sent);
//! }
//! ```
//!
//! ## Features
//!
//! - **Category-consistent generation**: values are always drawn from the range of
//!   the category selected for the record
//! - **Pluggable sinks**: stdout, file, TCP, channel, or any [`Sink`] implementation
//! - **Fail fast**: a sink failure ends the run unless an error hook asks for a retry
//! - **Clean shutdown**: the loop runs as a task that stops on request

mod error;
mod generator;
mod output;
mod producer;
mod sink;
mod stats;

pub use error::{ProducerError, SinkError};
pub use generator::{
    BloodPressureGenerator, BloodPressureThresholds, Generator, HeartRateGenerator,
    HeartRateThresholds,
};
pub use output::{FileOutput, Output, TcpOutput};
pub use producer::{
    ErrorAction, ErrorHook, Producer, ProducerBuilder, ProducerHandle, RunSummary, StopReason,
    DEFAULT_PARTITION_KEY, DEFAULT_STREAM_NAME,
};
pub use sink::{PutAck, Record, Sink};
pub use stats::{ProducerStats, StatsSnapshot};

// Re-export types for convenience
pub use vitalsim_types::{
    BloodPressureLevel, BloodPressureReading, HeartRateReading, RateType, Reading, ReadingKind,
};
