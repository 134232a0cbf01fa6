//! Command-line interface.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser};

use crate::settings::{OutputKind, ProducerKind, Settings};

#[derive(Parser, Debug)]
#[command(name = "vitalsim")]
#[command(about = "Stream synthetic blood pressure or heart rate readings to a sink")]
#[command(version)]
pub struct Cli {
    /// Config file (TOML, YAML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Producer to run
    #[arg(value_enum)]
    pub producer: ProducerKind,

    #[command(flatten)]
    pub overrides: Overrides,
}

/// Flags that override file and environment settings.
#[derive(Args, Debug, Default, Clone, PartialEq)]
pub struct Overrides {
    /// Where to send records
    #[arg(short, long, value_enum)]
    pub output: Option<OutputKind>,

    /// Output file (with --output file)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Endpoint host:port (with --output tcp)
    #[arg(long)]
    pub addr: Option<String>,

    /// Stream name passed with every record
    #[arg(long)]
    pub stream_name: Option<String>,

    /// Partition key passed with every record
    #[arg(long)]
    pub partition_key: Option<String>,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Pause between records in milliseconds
    #[arg(short, long)]
    pub interval_ms: Option<u64>,

    /// Stop after this many records
    #[arg(short = 'n', long)]
    pub limit: Option<u64>,

    /// Don't print records before sending them
    #[arg(long)]
    pub no_echo: bool,

    /// AWS region (with --output kinesis)
    #[arg(long)]
    pub region: Option<String>,

    /// Kinesis endpoint override, e.g. http://localhost:4566
    #[arg(long)]
    pub endpoint_url: Option<String>,

    /// Per-call sink timeout in milliseconds (with --output kinesis)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Draws below this are LOW (blood-pressure only)
    #[arg(long)]
    pub low_threshold: Option<f64>,

    /// Draws above this are HIGH for blood-pressure, below it for heart-rate
    #[arg(long)]
    pub high_threshold: Option<f64>,
}

impl Overrides {
    /// Apply the flags that were given on top of `settings`.
    pub fn apply(&self, settings: &mut Settings, kind: ProducerKind) -> Result<()> {
        if let Some(output) = self.output {
            settings.output = output;
        }
        if let Some(path) = &self.path {
            settings.path = Some(path.clone());
        }
        if let Some(addr) = &self.addr {
            settings.addr = Some(addr.clone());
        }
        if let Some(name) = &self.stream_name {
            settings.stream_name = name.clone();
        }
        if let Some(key) = &self.partition_key {
            settings.partition_key = key.clone();
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
        if self.interval_ms.is_some() {
            settings.interval_ms = self.interval_ms;
        }
        if self.limit.is_some() {
            settings.limit = self.limit;
        }
        if self.no_echo {
            settings.echo = false;
        }
        if let Some(region) = &self.region {
            settings.region = Some(region.clone());
        }
        if let Some(url) = &self.endpoint_url {
            settings.endpoint_url = Some(url.clone());
        }
        if self.timeout_ms.is_some() {
            settings.timeout_ms = self.timeout_ms;
        }

        match kind {
            ProducerKind::BloodPressure => {
                if let Some(low) = self.low_threshold {
                    settings.blood_pressure.low = low;
                }
                if let Some(high) = self.high_threshold {
                    settings.blood_pressure.high = high;
                }
            }
            ProducerKind::HeartRate => {
                if self.low_threshold.is_some() {
                    bail!("--low-threshold only applies to blood-pressure");
                }
                if let Some(high) = self.high_threshold {
                    settings.heart_rate.high = high;
                }
            }
        }
        Ok(())
    }
}

impl Cli {
    /// Resolve the final settings: file, then environment, then flags.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;
        self.overrides.apply(&mut settings, self.producer)?;
        settings.validate(self.producer)?;
        Ok(settings)
    }
}
