//! Built-in sink backends.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};

use crate::sink::{PutAck, Record, Sink};
use crate::SinkError;

/// Output destination for records.
///
/// Every variant reports failures back to the producer; nothing is
/// sent best-effort.
#[derive(Debug)]
pub enum Output {
    /// Print each record's payload on stdout, one per line.
    ///
    /// Stream name and partition key are not printed, so the output is the
    /// bare JSON reading.
    Stdout,

    /// Append each record as a JSON line to a file.
    ///
    /// The file is created if missing and opened once.
    File(FileOutput),

    /// Send each record as a JSON line over TCP.
    ///
    /// The connection is opened on first use and reused. A failed write
    /// drops the connection so the next attempt reconnects.
    Tcp(TcpOutput),

    /// Send records through a channel.
    ///
    /// Use `Output::channel()` to create this variant and get the receiver.
    Channel(mpsc::Sender<Record>),

    /// Any other sink, e.g. the Kinesis adapter.
    Custom(Arc<dyn Sink>),
}

impl Output {
    /// Create a stdout output.
    pub fn stdout() -> Self {
        Output::Stdout
    }

    /// Create a file output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vitalsim_sdk::Output;
    ///
    /// let output = Output::file("readings.ndjson");
    /// ```
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Output::File(FileOutput {
            path: path.into(),
            file: Mutex::new(None),
        })
    }

    /// Create a TCP output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vitalsim_sdk::Output;
    ///
    /// let output = Output::tcp("localhost:9090");
    /// ```
    pub fn tcp(addr: impl Into<String>) -> Self {
        Output::Tcp(TcpOutput {
            addr: addr.into(),
            stream: Mutex::new(None),
        })
    }

    /// Create a channel output and return both the output and receiver.
    ///
    /// Sends wait for capacity, so a slow receiver slows the producer
    /// down instead of losing records. Dropping the receiver makes the
    /// next send fail with [`SinkError::Closed`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use vitalsim_sdk::Output;
    ///
    /// let (output, mut rx) = Output::channel(16);
    ///
    /// // Later, receive records
    /// // while let Some(record) = rx.recv().await {
    /// //     println!("{}", record.data_str().unwrap());
    /// // }
    /// ```
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Record>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Output::Channel(tx), rx)
    }

    /// Wrap a custom sink.
    pub fn custom(sink: impl Sink + 'static) -> Self {
        Output::Custom(Arc::new(sink))
    }
}

#[async_trait]
impl Sink for Output {
    async fn put_record(
        &self,
        stream_name: &str,
        data: &[u8],
        partition_key: &str,
    ) -> Result<PutAck, SinkError> {
        match self {
            Output::Stdout => {
                write_line(&mut tokio::io::stdout(), data).await?;
                Ok(PutAck::default())
            }
            Output::File(output) => {
                output
                    .append(&Record::new(stream_name, data, partition_key))
                    .await?;
                Ok(PutAck::default())
            }
            Output::Tcp(output) => {
                output
                    .send(&Record::new(stream_name, data, partition_key))
                    .await?;
                Ok(PutAck::default())
            }
            Output::Channel(tx) => {
                tx.send(Record::new(stream_name, data, partition_key))
                    .await
                    .map_err(|_| SinkError::Closed)?;
                Ok(PutAck::default())
            }
            Output::Custom(sink) => sink.put_record(stream_name, data, partition_key).await,
        }
    }

    fn description(&self) -> &str {
        match self {
            Output::Stdout => "stdout",
            Output::File(output) => output.path.to_str().unwrap_or("file"),
            Output::Tcp(output) => &output.addr,
            Output::Channel(_) => "channel",
            Output::Custom(sink) => sink.description(),
        }
    }
}

/// Write `line` plus a newline and flush.
pub(crate) async fn write_line<W>(writer: &mut W, line: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

/// State for [`Output::File`].
#[derive(Debug)]
pub struct FileOutput {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileOutput {
    async fn append(&self, record: &Record) -> Result<(), SinkError> {
        let line = record
            .to_json_line()
            .map_err(|e| SinkError::Rejected(e.to_string()))?;

        let mut guard = self.file.lock().await;
        if guard.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await?;
            *guard = Some(file);
        }
        if let Some(file) = guard.as_mut() {
            write_line(file, line.as_bytes()).await?;
        }
        Ok(())
    }
}

/// State for [`Output::Tcp`].
#[derive(Debug)]
pub struct TcpOutput {
    addr: String,
    stream: Mutex<Option<TcpStream>>,
}

impl TcpOutput {
    async fn send(&self, record: &Record) -> Result<(), SinkError> {
        let mut line = record
            .to_json_line()
            .map_err(|e| SinkError::Rejected(e.to_string()))?;
        line.push('\n');

        let mut guard = self.stream.lock().await;
        if guard.is_none() {
            let stream = TcpStream::connect(&self.addr)
                .await
                .map_err(|e| SinkError::Connection(format!("{}: {}", self.addr, e)))?;
            *guard = Some(stream);
        }

        if let Some(stream) = guard.as_mut() {
            if let Err(e) = stream.write_all(line.as_bytes()).await {
                *guard = None;
                return Err(e.into());
            }
        }
        Ok(())
    }
}
