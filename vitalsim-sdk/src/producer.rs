//! The producer loop: generate, serialize, send, repeat.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use vitalsim_types::Reading;

use crate::generator::Generator;
use crate::output::{write_line, Output};
use crate::sink::{PutAck, Sink};
use crate::stats::ProducerStats;
use crate::{ProducerError, SinkError};

/// Stream name used when none is configured.
pub const DEFAULT_STREAM_NAME: &str = "inputStream";

/// Partition key used when none is configured.
///
/// Every record shares it, so all records land on a single shard.
pub const DEFAULT_PARTITION_KEY: &str = "partitionkey";

/// Decides what happens after a failed sink call.
///
/// Called with the error and the 1-based attempt number that failed.
pub type ErrorHook = Arc<dyn Fn(&SinkError, u32) -> ErrorAction + Send + Sync>;

/// What to do after a failed sink call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    /// End the run with [`ProducerError::Sink`].
    Fail,
    /// Wait, then send the same record again.
    Retry(Duration),
}

/// Why a run ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    /// A stop was requested or the handle was dropped.
    Stopped,
    /// The configured record limit was reached.
    LimitReached,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub sent: u64,
    pub by_category: BTreeMap<String, u64>,
    pub reason: StopReason,
}

/// Generates readings and hands each one to a sink.
///
/// Each iteration draws one record, serializes it to JSON, optionally
/// prints it, and awaits the sink before moving on. A sink failure ends
/// the run unless an [`ErrorHook`] asks for a retry.
///
/// # Example
///
/// ```rust
/// use vitalsim_sdk::{HeartRateGenerator, Output, Producer, StopReason};
///
/// # tokio_test::block_on(async {
/// let (output, mut rx) = Output::channel(8);
/// let producer = Producer::builder(HeartRateGenerator::new())
///     .output(output)
///     .limit(3)
///     .echo(false)
///     .build();
///
/// let handle = producer.start();
/// let mut received = 0;
/// while rx.recv().await.is_some() {
///     received += 1;
/// }
///
/// let summary = handle.wait().await.unwrap();
/// assert_eq!(summary.reason, StopReason::LimitReached);
/// assert_eq!(received, 3);
/// # });
/// ```
pub struct Producer<G: Generator> {
    generator: G,
    output: Output,
    stream_name: String,
    partition_key: String,
    seed: Option<u64>,
    interval: Option<Duration>,
    limit: Option<u64>,
    echo: bool,
    on_sink_error: Option<ErrorHook>,
    stats: Arc<ProducerStats>,
}

impl<G: Generator> Producer<G> {
    /// Create a builder for configuring the producer.
    pub fn builder(generator: G) -> ProducerBuilder<G> {
        ProducerBuilder::new(generator)
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    /// Live counters for this producer.
    pub fn stats(&self) -> Arc<ProducerStats> {
        self.stats.clone()
    }

    /// The random source for a run: seeded if a seed was configured.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Generate one record and deliver it to the sink.
    pub async fn send_one<R: Rng + Send>(&self, rng: &mut R) -> Result<G::Record, ProducerError> {
        let record = self.generator.generate(rng);
        let json = serde_json::to_string(&record)?;

        if self.echo {
            write_line(&mut tokio::io::stdout(), json.as_bytes())
                .await
                .map_err(ProducerError::Echo)?;
        }

        let ack = self.deliver(json.as_bytes()).await?;

        let reading: Reading = record.into();
        self.stats.record_sent(reading.category(), json.len());
        debug!(
            kind = %self.generator.kind(),
            category = reading.category(),
            shard_id = ?ack.shard_id,
            sequence_number = ?ack.sequence_number,
            "Record sent"
        );

        Ok(record)
    }

    async fn deliver(&self, data: &[u8]) -> Result<PutAck, ProducerError> {
        let mut attempt = 1;
        loop {
            match self
                .output
                .put_record(&self.stream_name, data, &self.partition_key)
                .await
            {
                Ok(ack) => return Ok(ack),
                Err(err) => {
                    self.stats.record_failure();

                    let action = self
                        .on_sink_error
                        .as_ref()
                        .map_or(ErrorAction::Fail, |hook| hook(&err, attempt));

                    match action {
                        ErrorAction::Retry(delay) => {
                            warn!(attempt, ?delay, error = %err, "Sink call failed, retrying");
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                        }
                        ErrorAction::Fail => {
                            error!(attempt, error = %err, "Sink call failed");
                            return Err(ProducerError::Sink {
                                attempts: attempt,
                                source: err,
                            });
                        }
                    }
                }
            }
        }
    }

    /// Run the loop until `stop` carries `true` (or its sender is dropped),
    /// the record limit is reached, or the sink fails.
    ///
    /// The stop signal is checked between records and while pausing; a
    /// record already handed to the sink is always seen through.
    pub async fn run(&self, mut stop: watch::Receiver<bool>) -> Result<RunSummary, ProducerError> {
        let mut rng = self.rng();
        let mut sent = 0u64;
        let mut by_category: BTreeMap<String, u64> = BTreeMap::new();

        info!(
            kind = %self.generator.kind(),
            sink = self.output.description(),
            stream_name = %self.stream_name,
            partition_key = %self.partition_key,
            "Producer started"
        );

        let reason = loop {
            if stop_requested(&stop) {
                break StopReason::Stopped;
            }
            if self.limit.is_some_and(|limit| sent >= limit) {
                break StopReason::LimitReached;
            }

            let record = self.send_one(&mut rng).await?;
            sent += 1;
            let reading: Reading = record.into();
            *by_category.entry(reading.category().to_string()).or_insert(0) += 1;

            if self.limit.is_some_and(|limit| sent >= limit) {
                break StopReason::LimitReached;
            }

            match self.interval {
                Some(interval) => {
                    tokio::select! {
                        _ = tokio::time::sleep(interval) => {}
                        _ = stop.changed() => {}
                    }
                }
                None => tokio::task::yield_now().await,
            }
        };

        info!(sent, ?reason, "Producer stopped");

        Ok(RunSummary {
            sent,
            by_category,
            reason,
        })
    }

    /// Spawn the loop as a tokio task.
    ///
    /// Returns a handle that can be used to stop the producer and collect
    /// the result.
    pub fn start(self) -> ProducerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let stats = self.stats.clone();

        let task = tokio::spawn(async move { self.run(stop_rx).await });

        ProducerHandle {
            stop_tx,
            task,
            stats,
        }
    }
}

fn stop_requested(stop: &watch::Receiver<bool>) -> bool {
    // A dropped sender counts as a stop request
    *stop.borrow() || stop.has_changed().is_err()
}

impl<G: Generator> std::fmt::Debug for Producer<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Producer")
            .field("generator", &self.generator)
            .field("output", &self.output)
            .field("stream_name", &self.stream_name)
            .field("partition_key", &self.partition_key)
            .field("seed", &self.seed)
            .field("interval", &self.interval)
            .field("limit", &self.limit)
            .field("echo", &self.echo)
            .field("on_sink_error", &self.on_sink_error.is_some())
            .finish()
    }
}

/// Builder for configuring a [`Producer`].
pub struct ProducerBuilder<G: Generator> {
    generator: G,
    output: Option<Output>,
    stream_name: Option<String>,
    partition_key: Option<String>,
    seed: Option<u64>,
    interval: Option<Duration>,
    limit: Option<u64>,
    echo: bool,
    on_sink_error: Option<ErrorHook>,
}

impl<G: Generator> ProducerBuilder<G> {
    /// Create a new builder.
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            output: None,
            stream_name: None,
            partition_key: None,
            seed: None,
            interval: None,
            limit: None,
            echo: true,
            on_sink_error: None,
        }
    }

    /// Set the sink. Defaults to [`Output::Stdout`].
    pub fn output(mut self, output: Output) -> Self {
        self.output = Some(output);
        self
    }

    /// Set the stream name (default: `inputStream`).
    pub fn stream_name(mut self, name: impl Into<String>) -> Self {
        self.stream_name = Some(name.into());
        self
    }

    /// Set the partition key (default: `partitionkey`).
    pub fn partition_key(mut self, key: impl Into<String>) -> Self {
        self.partition_key = Some(key.into());
        self
    }

    /// Seed the random source for reproducible runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Pause between records. By default records are sent back to back.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Stop after this many records.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Print each record to stdout before sending it (default: on).
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Install a hook deciding whether to retry a failed sink call.
    ///
    /// Without a hook every failure is fatal.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use vitalsim_sdk::{ErrorAction, HeartRateGenerator, Producer};
    ///
    /// let producer = Producer::builder(HeartRateGenerator::new())
    ///     .on_sink_error(|_err, attempt| {
    ///         if attempt < 3 {
    ///             ErrorAction::Retry(Duration::from_millis(100 * attempt as u64))
    ///         } else {
    ///             ErrorAction::Fail
    ///         }
    ///     })
    ///     .build();
    /// ```
    pub fn on_sink_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SinkError, u32) -> ErrorAction + Send + Sync + 'static,
    {
        self.on_sink_error = Some(Arc::new(hook));
        self
    }

    /// Build the producer.
    pub fn build(self) -> Producer<G> {
        Producer {
            generator: self.generator,
            output: self.output.unwrap_or(Output::Stdout),
            stream_name: self
                .stream_name
                .unwrap_or_else(|| DEFAULT_STREAM_NAME.to_string()),
            partition_key: self
                .partition_key
                .unwrap_or_else(|| DEFAULT_PARTITION_KEY.to_string()),
            seed: self.seed,
            interval: self.interval,
            limit: self.limit,
            echo: self.echo,
            on_sink_error: self.on_sink_error,
            stats: Arc::new(ProducerStats::default()),
        }
    }
}

/// Handle for controlling a running producer.
///
/// Drop this handle to stop the producer, or call `stop()` explicitly.
pub struct ProducerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<Result<RunSummary, ProducerError>>,
    stats: Arc<ProducerStats>,
}

impl ProducerHandle {
    /// Ask the producer to stop after the record in flight.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Live counters for the running producer.
    pub fn stats(&self) -> Arc<ProducerStats> {
        self.stats.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the run to end and return its result.
    ///
    /// This does not request a stop; pair it with [`stop`](Self::stop) or a limit.
    pub async fn wait(self) -> Result<RunSummary, ProducerError> {
        // Hold the sender until the task ends; dropping it would stop the loop
        let ProducerHandle {
            stop_tx: _stop_tx,
            task,
            ..
        } = self;

        task.await
            .map_err(|e| ProducerError::Task(e.to_string()))?
    }

    /// Stop the producer and wait for it to finish.
    pub async fn shutdown(self) -> Result<RunSummary, ProducerError> {
        self.stop();
        self.wait().await
    }
}

impl std::fmt::Debug for ProducerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProducerHandle")
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BloodPressureGenerator, HeartRateGenerator, Record};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use vitalsim_types::{BloodPressureReading, HeartRateReading};

    /// Fails the first `failures` calls, then accepts everything.
    #[derive(Debug)]
    struct FlakySink {
        failures: AtomicU32,
        calls: AtomicU32,
    }

    impl FlakySink {
        fn new(failures: u32) -> Arc<Self> {
            Arc::new(Self {
                failures: AtomicU32::new(failures),
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl Sink for FlakySink {
        async fn put_record(
            &self,
            _stream_name: &str,
            _data: &[u8],
            _partition_key: &str,
        ) -> Result<PutAck, SinkError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(SinkError::Rejected("ProvisionedThroughputExceeded".to_string()));
            }
            Ok(PutAck {
                shard_id: Some("shardId-000000000000".to_string()),
                sequence_number: Some(call.to_string()),
            })
        }

        fn description(&self) -> &str {
            "flaky"
        }
    }

    async fn drain(rx: &mut tokio::sync::mpsc::Receiver<Record>) -> Vec<Record> {
        let mut records = Vec::new();
        while let Some(record) = rx.recv().await {
            records.push(record);
        }
        records
    }

    #[test]
    fn builder_defaults() {
        let producer = Producer::builder(HeartRateGenerator::new()).build();
        assert_eq!(producer.stream_name(), "inputStream");
        assert_eq!(producer.partition_key(), "partitionkey");
        assert!(matches!(producer.output, Output::Stdout));
        assert!(producer.echo);
        assert!(producer.limit.is_none());
        assert!(producer.interval.is_none());
        assert!(producer.on_sink_error.is_none());
    }

    #[test]
    fn builder_stores_options() {
        let producer = Producer::builder(BloodPressureGenerator::new())
            .stream_name("vitals")
            .partition_key("patient-7")
            .seed(99)
            .interval(Duration::from_millis(250))
            .limit(10)
            .echo(false)
            .build();

        assert_eq!(producer.stream_name(), "vitals");
        assert_eq!(producer.partition_key(), "patient-7");
        assert_eq!(producer.seed, Some(99));
        assert_eq!(producer.interval, Some(Duration::from_millis(250)));
        assert_eq!(producer.limit, Some(10));
        assert!(!producer.echo);
    }

    #[tokio::test]
    async fn send_one_uses_stream_and_partition_key() {
        let (output, mut rx) = Output::channel(1);
        let producer = Producer::builder(BloodPressureGenerator::new())
            .output(output)
            .echo(false)
            .build();

        let mut rng = StdRng::seed_from_u64(1);
        let reading = producer.send_one(&mut rng).await.unwrap();

        let record = rx.recv().await.unwrap();
        assert_eq!(record.stream_name, DEFAULT_STREAM_NAME);
        assert_eq!(record.partition_key, DEFAULT_PARTITION_KEY);
        assert_eq!(record.parse::<BloodPressureReading>().unwrap(), reading);
    }

    #[tokio::test]
    async fn limit_sends_exactly_n_records() {
        let (output, mut rx) = Output::channel(16);
        let producer = Producer::builder(HeartRateGenerator::new())
            .output(output)
            .stream_name("heart")
            .partition_key("pk-1")
            .limit(25)
            .echo(false)
            .build();

        let handle = producer.start();
        let records = drain(&mut rx).await;
        let summary = handle.wait().await.unwrap();

        assert_eq!(summary.reason, StopReason::LimitReached);
        assert_eq!(summary.sent, 25);
        assert_eq!(records.len(), 25);
        assert_eq!(summary.by_category.values().sum::<u64>(), 25);

        for record in &records {
            assert_eq!(record.stream_name, "heart");
            assert_eq!(record.partition_key, "pk-1");
            let reading: HeartRateReading = record.parse().unwrap();
            assert!(reading.is_consistent());
        }
    }

    #[tokio::test]
    async fn zero_limit_sends_nothing() {
        let (output, mut rx) = Output::channel(1);
        let producer = Producer::builder(HeartRateGenerator::new())
            .output(output)
            .limit(0)
            .echo(false)
            .build();

        let summary = producer.start().wait().await.unwrap();
        assert_eq!(summary.sent, 0);
        assert!(drain(&mut rx).await.is_empty());
    }

    #[tokio::test]
    async fn stop_halts_the_loop() {
        let (output, mut rx) = Output::channel(4);
        let producer = Producer::builder(BloodPressureGenerator::new())
            .output(output)
            .echo(false)
            .build();

        let handle = producer.start();
        for _ in 0..5 {
            rx.recv().await.unwrap();
        }
        handle.stop();

        // Keep draining so a send blocked on a full channel can complete
        let rest = drain(&mut rx).await;
        let summary = handle.wait().await.unwrap();

        assert_eq!(summary.reason, StopReason::Stopped);
        assert_eq!(summary.sent, 5 + rest.len() as u64);
    }

    #[tokio::test]
    async fn dropping_handle_stops_the_loop() {
        let (output, mut rx) = Output::channel(4);
        let producer = Producer::builder(HeartRateGenerator::new())
            .output(output)
            .interval(Duration::from_millis(5))
            .echo(false)
            .build();

        let handle = producer.start();
        rx.recv().await.unwrap();
        drop(handle);

        // The channel closes once the producer (and its sender) is gone
        tokio::time::timeout(Duration::from_secs(5), drain(&mut rx))
            .await
            .expect("producer did not stop after handle was dropped");
    }

    #[tokio::test(start_paused = true)]
    async fn stop_interrupts_interval_pause() {
        let (output, mut rx) = Output::channel(4);
        let producer = Producer::builder(HeartRateGenerator::new())
            .output(output)
            .interval(Duration::from_secs(3600))
            .echo(false)
            .build();

        let handle = producer.start();
        rx.recv().await.unwrap();
        handle.stop();

        let summary = handle.wait().await.unwrap();
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.reason, StopReason::Stopped);
    }

    #[tokio::test]
    async fn sink_failure_is_fatal_by_default() {
        let sink = FlakySink::new(u32::MAX);
        let producer = Producer::builder(BloodPressureGenerator::new())
            .output(Output::Custom(sink.clone() as Arc<dyn Sink>))
            .echo(false)
            .build();

        let err = producer.start().wait().await.unwrap_err();
        match err {
            ProducerError::Sink { attempts, source } => {
                assert_eq!(attempts, 1);
                assert!(matches!(source, SinkError::Rejected(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn closed_channel_ends_the_run() {
        let (output, rx) = Output::channel(1);
        drop(rx);
        let producer = Producer::builder(HeartRateGenerator::new())
            .output(output)
            .echo(false)
            .build();

        let err = producer.start().wait().await.unwrap_err();
        assert!(matches!(
            err,
            ProducerError::Sink {
                source: SinkError::Closed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn retry_hook_is_honoured() {
        let sink = FlakySink::new(2);
        let producer = Producer::builder(HeartRateGenerator::new())
            .output(Output::Custom(sink.clone() as Arc<dyn Sink>))
            .on_sink_error(|_, attempt| {
                if attempt < 5 {
                    ErrorAction::Retry(Duration::from_millis(1))
                } else {
                    ErrorAction::Fail
                }
            })
            .limit(3)
            .echo(false)
            .build();

        let stats = producer.stats();
        let summary = producer.start().wait().await.unwrap();

        assert_eq!(summary.sent, 3);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 5);
        assert_eq!(stats.failures(), 2);
        assert_eq!(stats.sent(), 3);
    }

    #[tokio::test]
    async fn retry_hook_can_give_up() {
        let sink = FlakySink::new(u32::MAX);
        let producer = Producer::builder(HeartRateGenerator::new())
            .output(Output::Custom(sink.clone() as Arc<dyn Sink>))
            .on_sink_error(|_, attempt| {
                if attempt < 3 {
                    ErrorAction::Retry(Duration::from_millis(1))
                } else {
                    ErrorAction::Fail
                }
            })
            .echo(false)
            .build();

        let err = producer.start().wait().await.unwrap_err();
        assert!(matches!(err, ProducerError::Sink { attempts: 3, .. }));
        assert_eq!(sink.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn seeded_runs_are_reproducible() {
        async fn run_seeded(seed: u64) -> Vec<Record> {
            let (output, mut rx) = Output::channel(64);
            let producer = Producer::builder(BloodPressureGenerator::new())
                .output(output)
                .seed(seed)
                .limit(50)
                .echo(false)
                .build();
            let handle = producer.start();
            let records = drain(&mut rx).await;
            handle.wait().await.unwrap();
            records
        }

        let first = run_seeded(17).await;
        let second = run_seeded(17).await;
        assert_eq!(first, second);
        assert_eq!(first.len(), 50);
    }

    #[tokio::test]
    async fn stats_track_categories() {
        let (output, mut rx) = Output::channel(256);
        let producer = Producer::builder(BloodPressureGenerator::new())
            .output(output)
            .limit(200)
            .echo(false)
            .build();

        let handle = producer.start();
        let stats = handle.stats();
        drain(&mut rx).await;
        let summary = handle.wait().await.unwrap();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.sent, 200);
        assert_eq!(snapshot.failures, 0);
        assert_eq!(snapshot.by_category, summary.by_category);
        assert!(snapshot.by_category.contains_key("NORMAL"));
    }
}
