use super::passthrough::{Passthrough, PassthroughSink};
use super::{PipelineError, PipelineStats};
use crate::context::ContextCarrier;
use crate::parser::{LineFramer, RecordParser};
use crate::transport::SentryTransport;
use bytes::BytesMut;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads the input half of a stream and drives every complete line through
/// parse, context and dispatch, one record at a time. The pass-through, when
/// attached, consumes the same chunks on its own task.
pub(crate) struct RecordWorker {
    transport: Arc<SentryTransport>,
    framer: LineFramer,
    parser: RecordParser,
    carrier: ContextCarrier,
    passthrough: Option<PassthroughSink>,
    stats: PipelineStats,
}

impl RecordWorker {
    pub(crate) fn new(
        transport: Arc<SentryTransport>,
        max_line_length: usize,
        passthrough: Option<Passthrough>,
    ) -> Self {
        Self {
            transport,
            framer: LineFramer::new(max_line_length),
            parser: RecordParser::new(),
            carrier: ContextCarrier::new(),
            passthrough: passthrough.map(PassthroughSink::spawn),
            stats: PipelineStats::default(),
        }
    }

    pub(crate) async fn run<R>(mut self, mut reader: R) -> Result<PipelineStats, PipelineError>
    where
        R: AsyncRead + Unpin,
    {
        let result = self.pump(&mut reader).await;

        if let Some(passthrough) = self.passthrough.take() {
            passthrough.close().await;
        }

        if let Err(e) = &result {
            tracing::error!(error = %e, stats = ?self.stats, "Pipeline stopped");
        }
        result
    }

    async fn pump<R>(&mut self, reader: &mut R) -> Result<PipelineStats, PipelineError>
    where
        R: AsyncRead + Unpin,
    {
        let mut chunk = BytesMut::with_capacity(READ_CHUNK_SIZE);

        loop {
            chunk.clear();
            chunk.reserve(READ_CHUNK_SIZE);
            let read = reader.read_buf(&mut chunk).await?;
            if read == 0 {
                break;
            }
            self.stats.bytes += read as u64;

            self.framer.extend(&chunk);
            if let Some(passthrough) = self.passthrough.as_mut()
                && !passthrough.send(chunk.split().freeze()).await
            {
                self.passthrough = None;
            }

            self.drain_lines().await?;
        }

        let discarded = self.framer.discard_remainder();
        if discarded > 0 {
            tracing::debug!(bytes = discarded, "Discarding unterminated trailing line");
        }
        self.stats.discarded_bytes += discarded as u64;

        tracing::debug!(stats = ?self.stats, "Pipeline drained");
        Ok(self.stats)
    }

    async fn drain_lines(&mut self) -> Result<(), PipelineError> {
        while let Some(line) = self.framer.next_line() {
            self.stats.lines += 1;

            match line {
                Ok(line) => match self.parser.decode(&line) {
                    Some(record) => {
                        let transport = &self.transport;
                        let outcome = self
                            .carrier
                            .enter(record)
                            .run(|ctx, record| transport.dispatch(ctx, record))?;
                        self.stats.record(outcome);
                    }
                    None => self.stats.malformed += 1,
                },
                Err(e) => {
                    tracing::debug!("Dropping line: {}", e);
                    self.stats.malformed += 1;
                }
            }

            // One record per turn of the scheduler.
            tokio::task::yield_now().await;
        }
        Ok(())
    }
}
