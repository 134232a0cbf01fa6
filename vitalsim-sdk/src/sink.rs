//! The sink boundary: where serialized readings leave the producer.

use std::borrow::Cow;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::SinkError;

/// Acknowledgement returned by a sink for an accepted record.
///
/// Local sinks leave both fields empty; Kinesis fills them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutAck {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<String>,
}

/// Destination for serialized records.
///
/// This mirrors the streaming service's `PutRecord` call: one record,
/// one stream, one partition key, one acknowledgement or failure.
/// Implement it to plug in another service, or to wrap an existing sink
/// with your own retry or throttling policy.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use vitalsim_sdk::{PutAck, Sink, SinkError};
///
/// #[derive(Debug)]
/// struct Discard;
///
/// #[async_trait]
/// impl Sink for Discard {
///     async fn put_record(
///         &self,
///         _stream_name: &str,
///         _data: &[u8],
///         _partition_key: &str,
///     ) -> Result<PutAck, SinkError> {
///         Ok(PutAck::default())
///     }
///
///     fn description(&self) -> &str {
///         "discard"
///     }
/// }
/// ```
#[async_trait]
pub trait Sink: Send + Sync + Debug {
    /// Deliver one record.
    async fn put_record(
        &self,
        stream_name: &str,
        data: &[u8],
        partition_key: &str,
    ) -> Result<PutAck, SinkError>;

    /// Human-readable description used in logs.
    fn description(&self) -> &str;
}

/// A record as handed to a sink, owned.
///
/// This is what the channel output delivers, and what the file and TCP
/// outputs write as one JSON line each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub stream_name: String,
    pub partition_key: String,
    pub data: Vec<u8>,
}

impl Record {
    pub fn new(stream_name: &str, data: &[u8], partition_key: &str) -> Self {
        Self {
            stream_name: stream_name.to_string(),
            partition_key: partition_key.to_string(),
            data: data.to_vec(),
        }
    }

    /// The payload as text.
    pub fn data_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.data)
    }

    /// Parse the payload back into a reading.
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.data)
    }

    /// Serialize as a single JSON line (no trailing newline).
    ///
    /// JSON payloads are embedded byte for byte; anything else as a string.
    pub(crate) fn to_json_line(&self) -> serde_json::Result<String> {
        let data = match serde_json::from_slice::<&RawValue>(&self.data) {
            Ok(raw) => Payload::Json(raw),
            Err(_) => Payload::Text(String::from_utf8_lossy(&self.data)),
        };
        serde_json::to_string(&Envelope {
            stream_name: &self.stream_name,
            partition_key: &self.partition_key,
            data,
        })
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    stream_name: &'a str,
    partition_key: &'a str,
    data: Payload<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Payload<'a> {
    Json(&'a RawValue),
    Text(Cow<'a, str>),
}
