//! # vitalsim
//!
//! Command-line producers that stream synthetic vital-sign readings to an
//! ingestion sink.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         vitalsim (bin)                       │
//! │  ┌─────────┐    ┌──────────┐    ┌──────────────────────────┐ │
//! │  │   cli   │───▶│ settings │───▶│          runner          │ │
//! │  │ (clap)  │    │ (config) │    │ Producer<G> ─▶ Output    │ │
//! │  └─────────┘    └──────────┘    └────────────┬─────────────┘ │
//! └──────────────────────────────────────────────┼───────────────┘
//!                                                ▼
//!                  stdout | file | tcp | kinesis (feature)
//! ```
//!
//! - **[`cli`]**: argument parsing and per-flag overrides
//! - **[`settings`]**: layered configuration (file, `VITALSIM_*` environment, flags)
//! - **[`runner`]**: builds the sink and the producer, and drives it until it
//!   finishes or a shutdown is requested
//!
//! ## Usage
//!
//! ```bash
//! # Print blood pressure records to stdout
//! vitalsim blood-pressure
//!
//! # 1000 heart rate records into a file
//! vitalsim heart-rate --output file --path readings.ndjson --limit 1000
//!
//! # Kinesis (build with --features kinesis)
//! vitalsim blood-pressure --output kinesis --stream-name inputStream
//! ```
//!
//! ## As a library
//!
//! ```
//! use vitalsim::{runner, ProducerKind, Settings};
//!
//! # tokio_test::block_on(async {
//! let mut settings = Settings::default();
//! settings.limit = Some(5);
//! settings.echo = false;
//! settings.output = vitalsim::OutputKind::File;
//! let dir = tempfile::tempdir().unwrap();
//! settings.path = Some(dir.path().join("out.ndjson"));
//!
//! let summary = runner::run(ProducerKind::HeartRate, &settings, std::future::pending())
//!     .await
//!     .unwrap();
//! assert_eq!(summary.sent, 5);
//! # });
//! ```

pub mod cli;
pub mod runner;
pub mod settings;

pub use cli::{Cli, Overrides};
pub use settings::{OutputKind, ProducerKind, Settings};
