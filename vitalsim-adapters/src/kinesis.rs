//! Kinesis Data Streams sink.
//!
//! Sends each record with a single `PutRecord` call. Region and credentials
//! come from the standard AWS chain (environment, profile, instance role),
//! optionally overridden on the builder.
//!
//! ## Example
//!
//! ```rust,no_run
//! use vitalsim_adapters::kinesis::KinesisSink;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Point at LocalStack instead of AWS
//!     let sink = KinesisSink::builder()
//!         .region("us-east-1")
//!         .endpoint_url("http://localhost:4566")
//!         .build()
//!         .await?;
//!
//!     println!("sending to {:?}", sink);
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_kinesis::config::Region;
use aws_sdk_kinesis::error::{DisplayErrorContext, SdkError};
use aws_sdk_kinesis::primitives::Blob;
use aws_sdk_kinesis::Client;
use tracing::debug;
use vitalsim_sdk::{PutAck, Sink, SinkError};

use crate::AdapterError;

/// Kinesis sink implementing [`Sink`].
pub struct KinesisSink {
    client: Client,
    timeout: Option<Duration>,
    description: String,
}

impl KinesisSink {
    /// Create a new builder for configuring the sink.
    pub fn builder() -> KinesisSinkBuilder {
        KinesisSinkBuilder::default()
    }

    /// Wrap an already configured client.
    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            timeout: None,
            description: "kinesis".to_string(),
        }
    }
}

#[async_trait]
impl Sink for KinesisSink {
    async fn put_record(
        &self,
        stream_name: &str,
        data: &[u8],
        partition_key: &str,
    ) -> Result<PutAck, SinkError> {
        let request = self
            .client
            .put_record()
            .stream_name(stream_name)
            .data(Blob::new(data))
            .partition_key(partition_key)
            .send();

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, request)
                .await
                .map_err(|_| SinkError::Timeout)?,
            None => request.await,
        }
        .map_err(sink_error)?;

        debug!(
            shard_id = output.shard_id(),
            sequence_number = output.sequence_number(),
            "PutRecord acknowledged"
        );

        Ok(PutAck {
            shard_id: Some(output.shard_id().to_string()),
            sequence_number: Some(output.sequence_number().to_string()),
        })
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Map an SDK failure onto the sink error taxonomy.
fn sink_error<E, R>(err: SdkError<E, R>) -> SinkError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match &err {
        SdkError::TimeoutError(_) => SinkError::Timeout,
        SdkError::DispatchFailure(_) => {
            SinkError::Connection(DisplayErrorContext(&err).to_string())
        }
        _ => SinkError::Rejected(DisplayErrorContext(&err).to_string()),
    }
}

impl std::fmt::Debug for KinesisSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KinesisSink")
            .field("description", &self.description)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for KinesisSink.
#[derive(Debug, Default)]
pub struct KinesisSinkBuilder {
    region: Option<String>,
    endpoint_url: Option<String>,
    timeout: Option<Duration>,
}

impl KinesisSinkBuilder {
    /// Override the AWS region (default: from the environment/profile).
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Override the service endpoint, e.g. for LocalStack.
    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Fail a `PutRecord` call that takes longer than this.
    ///
    /// No timeout is applied by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Load AWS configuration and build the sink.
    pub async fn build(self) -> Result<KinesisSink, AdapterError> {
        if self.region.as_deref().is_some_and(|r| r.trim().is_empty()) {
            return Err(AdapterError::Config("region must not be empty".to_string()));
        }
        if let Some(url) = self.endpoint_url.as_deref() {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AdapterError::Config(format!(
                    "endpoint URL must start with http:// or https://, got {}",
                    url
                )));
            }
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = self.region.clone() {
            loader = loader.region(Region::new(region));
        }
        if let Some(url) = self.endpoint_url.clone() {
            loader = loader.endpoint_url(url);
        }
        let config = loader.load().await;

        let description = match (&self.endpoint_url, config.region()) {
            (Some(url), _) => format!("kinesis @ {}", url),
            (None, Some(region)) => format!("kinesis ({})", region),
            (None, None) => "kinesis".to_string(),
        };

        Ok(KinesisSink {
            client: Client::new(&config),
            timeout: self.timeout,
            description,
        })
    }
}
