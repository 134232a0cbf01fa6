//! Wiring from resolved settings to a running producer.

use std::future::Future;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{info, warn};
use vitalsim_sdk::{
    BloodPressureGenerator, Generator, HeartRateGenerator, Output, Producer, RunSummary,
};

use crate::settings::{OutputKind, ProducerKind, Settings};

/// Build the sink selected by `settings.output`.
pub async fn build_output(settings: &Settings) -> Result<Output> {
    let output = match settings.output {
        OutputKind::Stdout => Output::stdout(),
        OutputKind::File => {
            let path = settings
                .path
                .clone()
                .context("file output requires a path")?;
            Output::file(path)
        }
        OutputKind::Tcp => {
            let addr = settings
                .addr
                .clone()
                .context("tcp output requires an address")?;
            Output::tcp(addr)
        }
        OutputKind::Kinesis => kinesis_output(settings).await?,
    };
    Ok(output)
}

#[cfg(feature = "kinesis")]
async fn kinesis_output(settings: &Settings) -> Result<Output> {
    use vitalsim_adapters::kinesis::KinesisSink;

    let mut builder = KinesisSink::builder();
    if let Some(region) = &settings.region {
        builder = builder.region(region.clone());
    }
    if let Some(url) = &settings.endpoint_url {
        builder = builder.endpoint_url(url.clone());
    }
    if let Some(timeout) = settings.timeout() {
        builder = builder.timeout(timeout);
    }

    let sink = builder
        .build()
        .await
        .context("Failed to create Kinesis client")?;
    Ok(Output::custom(sink))
}

#[cfg(not(feature = "kinesis"))]
async fn kinesis_output(_settings: &Settings) -> Result<Output> {
    anyhow::bail!("kinesis output is not available; rebuild with `--features kinesis`")
}

/// Run the selected producer until it hits its limit, fails, or `shutdown`
/// resolves.
///
/// On shutdown the record in flight is finished before returning.
pub async fn run<F>(kind: ProducerKind, settings: &Settings, shutdown: F) -> Result<RunSummary>
where
    F: Future<Output = ()>,
{
    settings.validate(kind)?;
    let output = build_output(settings).await?;

    match kind {
        ProducerKind::BloodPressure => {
            let generator = BloodPressureGenerator::with_thresholds(settings.blood_pressure)?;
            drive(generator, output, settings, shutdown).await
        }
        ProducerKind::HeartRate => {
            let generator = HeartRateGenerator::with_thresholds(settings.heart_rate)?;
            drive(generator, output, settings, shutdown).await
        }
    }
}

async fn drive<G, F>(
    generator: G,
    output: Output,
    settings: &Settings,
    shutdown: F,
) -> Result<RunSummary>
where
    G: Generator,
    F: Future<Output = ()>,
{
    // Stdout already carries every record
    let echo = settings.echo && settings.output != OutputKind::Stdout;

    let mut builder = Producer::builder(generator)
        .output(output)
        .stream_name(settings.stream_name.clone())
        .partition_key(settings.partition_key.clone())
        .echo(echo);
    if let Some(seed) = settings.seed {
        builder = builder.seed(seed);
    }
    if let Some(interval) = settings.interval() {
        builder = builder.interval(interval);
    }
    if let Some(limit) = settings.limit {
        builder = builder.limit(limit);
    }
    let producer = builder.build();

    let (stop_tx, stop_rx) = watch::channel(false);
    let run = producer.run(stop_rx);
    tokio::pin!(run);
    tokio::pin!(shutdown);

    let result = tokio::select! {
        result = &mut run => result,
        _ = &mut shutdown => {
            info!("Shutdown requested, finishing current record");
            let _ = stop_tx.send(true);
            run.await
        }
    };

    let summary = result.context("Producer failed")?;
    let stats = producer.stats().snapshot();
    if stats.failures > 0 {
        warn!(failures = stats.failures, "Sink reported failures during the run");
    }
    Ok(summary)
}
