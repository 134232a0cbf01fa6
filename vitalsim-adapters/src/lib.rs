//! # vitalsim-adapters
//!
//! Sinks that deliver vitalsim records to managed streaming services.
//!
//! ## Supported Services
//!
//! - **AWS Kinesis Data Streams** (`kinesis` feature) - one `PutRecord` call per record,
//!   credentials and region resolved through the standard AWS configuration chain
//!
//! ## Quick Start (Kinesis)
//!
//! ```rust,no_run
//! # #[cfg(feature = "kinesis")]
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use vitalsim_adapters::kinesis::KinesisSink;
//! use vitalsim_sdk::{BloodPressureGenerator, Output, Producer};
//!
//! let sink = KinesisSink::builder().region("us-east-1").build().await?;
//!
//! let producer = Producer::builder(BloodPressureGenerator::new())
//!     .output(Output::custom(sink))
//!     .build();
//!
//! let summary = producer.start().wait().await?;
//! println!("sent {} records", summary.sent);
//! # Ok(())
//! # }
//! ```

pub mod error;

#[cfg(feature = "kinesis")]
pub mod kinesis;

pub use error::AdapterError;
