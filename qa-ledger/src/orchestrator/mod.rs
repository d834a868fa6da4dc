//! Orchestrator module for the command flow.
//!
//! Coordinates the consumer and the processor: every decoded command runs in
//! its own task, with at most `worker_concurrency` commands in flight, and its
//! response is sent to the response channel. Commands on the same record run
//! in stream order.

mod responses;
mod sequencer;

pub use responses::{write_responses, CommandResponse, ErrorBody, Outcome};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, instrument, warn};

use crate::consumer::{Consumer, StreamMessage};
use crate::errors::{IngestError, ProcessError};
use crate::processor::{CommandProcessor, OrderingKey};
use sequencer::Sequencer;

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Size of the consumer-to-orchestrator channel buffer.
    pub channel_buffer_size: usize,
    /// Maximum number of commands processed at the same time.
    pub worker_concurrency: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: 1000,
            worker_concurrency: 16,
        }
    }
}

/// Orchestrator that coordinates the command flow.
///
/// The orchestrator:
/// - Runs the consumer in the background
/// - Dispatches commands to bounded concurrent workers, keeping stream order
///   among commands that share an ordering key
/// - Routes every response to the response channel
/// - Handles shutdown signals
pub struct Orchestrator {
    consumer: Arc<dyn Consumer>,
    processor: Arc<CommandProcessor>,
    responses: mpsc::Sender<CommandResponse>,
    config: OrchestratorConfig,
    shutdown_tx: broadcast::Sender<()>,
    total_commands: Arc<AtomicU64>,
    total_failures: Arc<AtomicU64>,
}

impl Orchestrator {
    pub fn new(
        consumer: Arc<dyn Consumer>,
        processor: Arc<CommandProcessor>,
        responses: mpsc::Sender<CommandResponse>,
    ) -> Self {
        Self::with_config(consumer, processor, responses, OrchestratorConfig::default())
    }

    pub fn with_config(
        consumer: Arc<dyn Consumer>,
        processor: Arc<CommandProcessor>,
        responses: mpsc::Sender<CommandResponse>,
        config: OrchestratorConfig,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            consumer,
            processor,
            responses,
            config,
            shutdown_tx,
            total_commands: Arc::new(AtomicU64::new(0)),
            total_failures: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Run the orchestrator.
    ///
    /// Returns once the consumer is exhausted and every dispatched command has
    /// answered, or after a shutdown signal once in-flight commands finish.
    #[instrument(skip(self))]
    pub async fn run(&mut self) -> Result<(), IngestError> {
        info!(
            worker_concurrency = self.config.worker_concurrency,
            "Starting command orchestrator"
        );

        let (command_transmitter, mut command_receiver) =
            mpsc::channel::<StreamMessage>(self.config.channel_buffer_size);

        let consumer = self.consumer.clone();
        let shutdown_rx = self.shutdown_tx.subscribe();
        let consumer_handle = tokio::spawn(async move {
            if let Err(e) = consumer.run(command_transmitter, shutdown_rx).await {
                error!(error = %e, "Consumer error");
            }
        });

        let permits = Arc::new(Semaphore::new(self.config.worker_concurrency.max(1)));
        let mut workers = JoinSet::new();
        let mut sequencer = Sequencer::new();

        loop {
            tokio::select! {
                msg = command_receiver.recv() => {
                    match msg {
                        Some(StreamMessage::Command { line, command }) => {
                            let permit = permits
                                .clone()
                                .acquire_owned()
                                .await
                                .map_err(|e| IngestError::ChannelError(e.to_string()))?;
                            let processor = self.processor.clone();
                            let responses = self.responses.clone();
                            let total_commands = self.total_commands.clone();
                            let total_failures = self.total_failures.clone();
                            let mut turn = sequencer.enqueue(command.ordering_key(), line);

                            workers.spawn(async move {
                                turn.ready().await;
                                let result = processor.process(command).await;
                                let finished = turn.finish();
                                drop(permit);
                                total_commands.fetch_add(1, Ordering::Relaxed);
                                if let Err(e) = &result {
                                    total_failures.fetch_add(1, Ordering::Relaxed);
                                    debug!(line, error = %e, "Command rejected");
                                }
                                if responses.send(CommandResponse::from_result(line, result)).await.is_err() {
                                    warn!(line, "Response receiver dropped");
                                }
                                finished
                            });
                        }
                        Some(StreamMessage::Malformed { line, error }) => {
                            self.total_commands.fetch_add(1, Ordering::Relaxed);
                            self.total_failures.fetch_add(1, Ordering::Relaxed);
                            let response = CommandResponse::from_result(line, Err(ProcessError::Malformed(error)));
                            self.responses
                                .send(response)
                                .await
                                .map_err(|e| IngestError::ChannelError(e.to_string()))?;
                        }
                        Some(StreamMessage::End) | None => {
                            info!("Command stream ended");
                            break;
                        }
                    }
                }
                Some(joined) = workers.join_next(), if !workers.is_empty() => {
                    settle(joined, &mut sequencer);
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    let _ = self.shutdown_tx.send(());
                    break;
                }
            }
        }

        while let Some(joined) = workers.join_next().await {
            settle(joined, &mut sequencer);
        }
        let _ = consumer_handle.await;

        info!(
            pending_keys = sequencer.pending_keys(),
            total_commands = self.total_commands.load(Ordering::Relaxed),
            total_failures = self.total_failures.load(Ordering::Relaxed),
            "Orchestrator shutdown complete"
        );
        Ok(())
    }

    /// Trigger a graceful shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Number of commands answered so far, failures included.
    pub fn total_commands(&self) -> u64 {
        self.total_commands.load(Ordering::Relaxed)
    }

    pub fn total_failures(&self) -> u64 {
        self.total_failures.load(Ordering::Relaxed)
    }
}

/// Records a finished worker, freeing its ordering key when nothing queued behind it.
fn settle(joined: Result<Option<(OrderingKey, u64)>, JoinError>, sequencer: &mut Sequencer) {
    match joined {
        Ok(Some((key, line))) => sequencer.release(&key, line),
        Ok(None) => {}
        Err(e) => error!(error = %e, "Command worker panicked"),
    }
}
