//! Stream assembly: a writable byte sink whose contents are framed into lines,
//! decoded, wrapped in a per-record context and dispatched to the transport.

mod passthrough;
pub mod stats;
mod worker;

pub use stats::PipelineStats;

use crate::parser::DEFAULT_MAX_LINE_LENGTH;
use crate::sink::{EnvDefaults, ReportingClient, SentryClient, SentryOptions, SinkError};
use crate::transport::{SentryTransport, TransportError};
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;
use passthrough::Passthrough;
use worker::RecordWorker;

/// Bytes buffered between the writer and the worker before writes suspend.
pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Reporting client error: {0}")]
    Sink(#[from] SinkError),
    #[error("Pipeline task failed: {0}")]
    Task(String),
}

/// Create a stream with default buffering and no pass-through.
///
/// Must be called from within a Tokio runtime.
pub fn create_write_stream(options: SentryOptions) -> Result<WriteStream, TransportError> {
    PipelineBuilder::new(options).build()
}

pub struct PipelineBuilder {
    options: SentryOptions,
    passthrough: Option<Passthrough>,
    buffer_capacity: usize,
    max_line_length: usize,
    default_client: Option<Arc<dyn ReportingClient>>,
    env: Option<EnvDefaults>,
}

impl PipelineBuilder {
    pub fn new(options: SentryOptions) -> Self {
        Self {
            options,
            passthrough: None,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            default_client: None,
            env: None,
        }
    }

    /// Copy every input byte, unchanged, to `writer`.
    pub fn passthrough<W>(mut self, writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        self.passthrough = Some(Box::new(writer));
        self
    }

    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(1);
        self
    }

    pub fn max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }

    /// Replace the client that is initialised when the options carry no
    /// `sentry_instance`.
    pub fn client(mut self, client: Arc<dyn ReportingClient>) -> Self {
        self.default_client = Some(client);
        self
    }

    /// Use these fallbacks instead of reading the process environment.
    pub fn env_defaults(mut self, env: EnvDefaults) -> Self {
        self.env = Some(env);
        self
    }

    pub fn build(self) -> Result<WriteStream, TransportError> {
        let env = self.env.unwrap_or_else(EnvDefaults::from_env);
        let default_client = self
            .default_client
            .unwrap_or_else(|| Arc::new(SentryClient::new()));
        let transport = Arc::new(SentryTransport::with_default_client(
            self.options,
            &env,
            default_client,
        )?);

        let (input, output) = tokio::io::duplex(self.buffer_capacity);
        let worker = RecordWorker::new(
            Arc::clone(&transport),
            self.max_line_length,
            self.passthrough,
        );
        let task = tokio::spawn(worker.run(output));

        tracing::debug!(
            buffer_capacity = self.buffer_capacity,
            max_line_length = self.max_line_length,
            "Write stream created"
        );

        Ok(WriteStream {
            input,
            task,
            transport,
        })
    }
}

/// Writable end of a pipeline.
///
/// Writes suspend while the internal buffer is full. Once the worker stops on
/// an error, writes fail with `BrokenPipe` and `finish` returns the cause.
pub struct WriteStream {
    input: DuplexStream,
    task: JoinHandle<Result<PipelineStats, PipelineError>>,
    transport: Arc<SentryTransport>,
}

impl std::fmt::Debug for WriteStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteStream")
            .field("transport", &self.transport)
            .field("finished", &self.task.is_finished())
            .finish_non_exhaustive()
    }
}

impl WriteStream {
    pub fn transport(&self) -> &Arc<SentryTransport> {
        &self.transport
    }

    /// Close the input, wait for buffered lines to be dispatched and return
    /// the stream's counters.
    pub async fn finish(self) -> Result<PipelineStats, PipelineError> {
        let WriteStream { mut input, task, .. } = self;

        // Shutdown only fails once the worker is gone; the task result has the cause.
        let _ = input.shutdown().await;
        drop(input);

        task.await
            .map_err(|e| PipelineError::Task(e.to_string()))?
    }
}

impl AsyncWrite for WriteStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().input).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().input).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().input).poll_shutdown(cx)
    }
}
