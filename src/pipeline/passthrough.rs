use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub(crate) type Passthrough = Box<dyn AsyncWrite + Send + Unpin>;

/// Chunks queued for the pass-through writer before the reader waits on it.
const PASSTHROUGH_QUEUE_CHUNKS: usize = 16;

/// Second consumer of the input: copies every chunk to a writer on its own
/// task. A write failure detaches the writer; record dispatch carries on.
pub(crate) struct PassthroughSink {
    tx: Option<mpsc::Sender<Bytes>>,
    task: JoinHandle<()>,
}

impl PassthroughSink {
    pub(crate) fn spawn(writer: Passthrough) -> Self {
        let (tx, rx) = mpsc::channel(PASSTHROUGH_QUEUE_CHUNKS);
        let task = tokio::spawn(copy_chunks(writer, rx));
        Self { tx: Some(tx), task }
    }

    /// Queue a chunk. Returns `false` once the writer has been detached.
    pub(crate) async fn send(&mut self, chunk: Bytes) -> bool {
        let Some(tx) = self.tx.as_ref() else {
            return false;
        };
        if tx.send(chunk).await.is_err() {
            tracing::debug!("Pass-through detached; further chunks are not copied");
            self.tx = None;
            return false;
        }
        true
    }

    #[cfg(test)]
    pub(crate) fn is_attached(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Stop feeding the writer and wait until queued chunks are written and flushed.
    pub(crate) async fn close(mut self) {
        self.tx.take();
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Pass-through task failed");
        }
    }
}

async fn copy_chunks(mut writer: Passthrough, mut rx: mpsc::Receiver<Bytes>) {
    while let Some(chunk) = rx.recv().await {
        if let Err(e) = writer.write_all(&chunk).await {
            tracing::warn!(error = %e, "Pass-through write failed; detaching it");
            return;
        }
    }

    if let Err(e) = writer.flush().await {
        tracing::warn!(error = %e, "Pass-through flush failed");
    }
}
