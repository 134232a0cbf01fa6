//! Layered producer settings.
//!
//! Sources, lowest precedence first: built-in defaults, an optional config
//! file, `VITALSIM_*` environment variables, then command-line flags
//! (applied by [`Overrides::apply`](crate::Overrides::apply)).
//!
//! # Configuration
//!
//! ```toml
//! stream_name = "inputStream"
//! partition_key = "partitionkey"
//! output = "kinesis"
//! region = "us-east-1"
//! interval_ms = 100
//!
//! [blood_pressure]
//! low = 0.005
//! high = 0.995
//!
//! [heart_rate]
//! high = 0.01
//! ```
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `VITALSIM_BLOOD_PRESSURE__LOW=0.01`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use vitalsim_sdk::{
    BloodPressureThresholds, HeartRateThresholds, DEFAULT_PARTITION_KEY, DEFAULT_STREAM_NAME,
};

/// Environment variable prefix for settings.
pub const ENV_PREFIX: &str = "VITALSIM";

/// Which producer to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProducerKind {
    /// Systolic/diastolic readings with a NORMAL/HIGH/LOW level
    BloodPressure,
    /// Heart rate readings with a NORMAL/HIGH rate type
    HeartRate,
}

impl fmt::Display for ProducerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProducerKind::BloodPressure => f.write_str("blood-pressure"),
            ProducerKind::HeartRate => f.write_str("heart-rate"),
        }
    }
}

/// Where records are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// JSON lines on stdout
    #[default]
    Stdout,
    /// JSON lines appended to `path`
    File,
    /// JSON lines over TCP to `addr`
    Tcp,
    /// AWS Kinesis Data Streams (requires the `kinesis` feature)
    Kinesis,
}

/// Resolved producer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub stream_name: String,
    pub partition_key: String,
    pub output: OutputKind,
    /// File for [`OutputKind::File`].
    pub path: Option<PathBuf>,
    /// `host:port` for [`OutputKind::Tcp`].
    pub addr: Option<String>,
    pub seed: Option<u64>,
    /// Pause between records in milliseconds.
    pub interval_ms: Option<u64>,
    /// Stop after this many records.
    pub limit: Option<u64>,
    /// Print each record before sending it.
    pub echo: bool,
    /// AWS region override for Kinesis.
    pub region: Option<String>,
    /// Endpoint override for Kinesis (e.g. LocalStack).
    pub endpoint_url: Option<String>,
    /// Timeout for a single Kinesis call, in milliseconds.
    pub timeout_ms: Option<u64>,
    pub blood_pressure: BloodPressureThresholds,
    pub heart_rate: HeartRateThresholds,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            stream_name: DEFAULT_STREAM_NAME.to_string(),
            partition_key: DEFAULT_PARTITION_KEY.to_string(),
            output: OutputKind::default(),
            path: None,
            addr: None,
            seed: None,
            interval_ms: None,
            limit: None,
            echo: true,
            region: None,
            endpoint_url: None,
            timeout_ms: None,
            blood_pressure: BloodPressureThresholds::default(),
            heart_rate: HeartRateThresholds::default(),
        }
    }
}

impl Settings {
    /// Load settings from an optional file plus the environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Check the settings are usable for `kind`.
    pub fn validate(&self, kind: ProducerKind) -> Result<()> {
        if self.stream_name.is_empty() {
            bail!("stream name must not be empty");
        }
        if self.partition_key.is_empty() {
            bail!("partition key must not be empty");
        }

        match self.output {
            OutputKind::File if self.path.is_none() => bail!("file output requires a path"),
            OutputKind::Tcp if self.addr.is_none() => bail!("tcp output requires an address"),
            OutputKind::Kinesis if !cfg!(feature = "kinesis") => {
                bail!("kinesis output requires building with the `kinesis` feature")
            }
            _ => {}
        }

        match kind {
            ProducerKind::BloodPressure => self.blood_pressure.validate()?,
            ProducerKind::HeartRate => self.heart_rate.validate()?,
        }
        Ok(())
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval_ms.map(Duration::from_millis)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_original_producers() {
        let settings = Settings::default();
        assert_eq!(settings.stream_name, "inputStream");
        assert_eq!(settings.partition_key, "partitionkey");
        assert_eq!(settings.output, OutputKind::Stdout);
        assert!(settings.echo);
        assert_eq!(settings.blood_pressure.low, 0.005);
        assert_eq!(settings.blood_pressure.high, 0.995);
        assert_eq!(settings.heart_rate.high, 0.01);
        assert!(settings.interval().is_none());
    }

    #[test]
    fn loads_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
stream_name = "vitals"
partition_key = "ward-3"
output = "file"
path = "/tmp/vitals.ndjson"
interval_ms = 250
limit = 10

[blood_pressure]
low = 0.1
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.stream_name, "vitals");
        assert_eq!(settings.partition_key, "ward-3");
        assert_eq!(settings.output, OutputKind::File);
        assert_eq!(settings.path, Some(PathBuf::from("/tmp/vitals.ndjson")));
        assert_eq!(settings.interval(), Some(Duration::from_millis(250)));
        assert_eq!(settings.limit, Some(10));
        assert_eq!(settings.blood_pressure.low, 0.1);
        // Unset nested keys keep their defaults
        assert_eq!(settings.blood_pressure.high, 0.995);
        assert_eq!(settings.heart_rate.high, 0.01);
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = Settings::load(Some(Path::new("/nonexistent/vitalsim.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn file_output_requires_path() {
        let settings = Settings {
            output: OutputKind::File,
            ..Settings::default()
        };
        assert!(settings.validate(ProducerKind::HeartRate).is_err());
    }

    #[test]
    fn tcp_output_requires_addr() {
        let settings = Settings {
            output: OutputKind::Tcp,
            ..Settings::default()
        };
        assert!(settings.validate(ProducerKind::BloodPressure).is_err());
    }

    #[test]
    fn thresholds_are_validated_per_producer() {
        let settings = Settings {
            blood_pressure: BloodPressureThresholds { low: 0.8, high: 0.2 },
            ..Settings::default()
        };
        assert!(settings.validate(ProducerKind::BloodPressure).is_err());
        // Heart rate ignores blood pressure thresholds
        assert!(settings.validate(ProducerKind::HeartRate).is_ok());
    }

    #[test]
    fn empty_partition_key_is_rejected() {
        let settings = Settings {
            partition_key: String::new(),
            ..Settings::default()
        };
        assert!(settings.validate(ProducerKind::HeartRate).is_err());
    }

    #[cfg(not(feature = "kinesis"))]
    #[test]
    fn kinesis_requires_feature() {
        let settings = Settings {
            output: OutputKind::Kinesis,
            ..Settings::default()
        };
        let err = settings.validate(ProducerKind::HeartRate).unwrap_err();
        assert!(err.to_string().contains("kinesis"));
    }
}
