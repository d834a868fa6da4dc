//! Consumer module for the command flow.
//!
//! A consumer reads raw command lines from a source, decodes them and sends
//! them to the orchestrator.

mod line_consumer;
mod messages;

pub use line_consumer::LineConsumer;
pub use messages::StreamMessage;

use tokio::sync::{broadcast, mpsc};

use crate::errors::IngestError;

/// A source of commands.
#[async_trait::async_trait]
pub trait Consumer: Send + Sync {
    /// Sends decoded commands until the source is exhausted or `shutdown` fires.
    ///
    /// Implementations finish with `StreamMessage::End` when the source runs dry.
    async fn run(
        &self,
        sender: mpsc::Sender<StreamMessage>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), IngestError>;
}
