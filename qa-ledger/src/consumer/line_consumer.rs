//! Line-oriented consumer reading JSON commands from any async reader.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::{debug, info, warn};

use super::{Consumer, StreamMessage};
use crate::errors::IngestError;

pub struct LineConsumer<R> {
    reader: Mutex<R>,
}

impl LineConsumer<BufReader<Stdin>> {
    /// Reads commands from the process's standard input.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> LineConsumer<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader: Mutex::new(reader),
        }
    }
}

#[async_trait::async_trait]
impl<R> Consumer for LineConsumer<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn run(
        &self,
        sender: mpsc::Sender<StreamMessage>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), IngestError> {
        let mut reader = self.reader.lock().await;
        let mut line_number: u64 = 0;
        let mut buf = String::new();

        loop {
            buf.clear();
            let read = tokio::select! {
                read = reader.read_line(&mut buf) => read.map_err(|e| IngestError::read(e.to_string()))?,
                _ = shutdown.recv() => {
                    info!("Consumer received shutdown signal");
                    return Ok(());
                }
            };
            if read == 0 {
                break;
            }
            line_number += 1;

            let Some(message) = StreamMessage::decode(line_number, &buf) else {
                continue;
            };
            if let StreamMessage::Malformed { line, error } = &message {
                warn!(line, error = %error, "Failed to decode command");
            }
            if sender.send(message).await.is_err() {
                debug!("Receiver dropped, stopping consumer");
                return Ok(());
            }
        }

        info!(lines = line_number, "Command source exhausted");
        sender
            .send(StreamMessage::End)
            .await
            .map_err(|e| IngestError::ChannelError(e.to_string()))
    }
}
