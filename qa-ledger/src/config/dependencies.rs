//! Dependency initialization and wiring.

use std::sync::Arc;
use std::time::Duration;

use qa_ledger_core::{
    AccountService, ContentLifecycleController, TracingNotifier, VoteLedgerManager,
};
use qa_ledger_repository::{InMemoryLedgerStore, LedgerStore, PostgresLedgerStore};
use sqlx::postgres::PgPoolOptions;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{info, warn};

use super::settings::{ConnectionMode, Settings, StoreBackend};
use crate::consumer::LineConsumer;
use crate::orchestrator::{CommandResponse, Orchestrator, OrchestratorConfig};
use crate::processor::CommandProcessor;
use crate::AppError;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
    /// Receives one response per command; drained by the output writer.
    pub responses: mpsc::Receiver<CommandResponse>,
}

impl Dependencies {
    /// Initializes the store, the core services and the command flow.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(AppError)` - If the store cannot be prepared (retry mode keeps
    ///   waiting for the database instead)
    pub async fn new(settings: &Settings) -> Result<Self, AppError> {
        info!(
            store = ?settings.store,
            connection_mode = ?settings.connection_mode,
            worker_concurrency = settings.worker_concurrency,
            "Initializing dependencies"
        );

        let store: Arc<dyn LedgerStore> = match settings.store {
            StoreBackend::Memory => {
                warn!("Using the in-memory ledger store; nothing is persisted");
                Arc::new(InMemoryLedgerStore::new())
            }
            StoreBackend::Postgres => Arc::new(Self::connect_to_postgres(settings).await?),
        };

        if !store.check_tables_created().await? {
            return Err(AppError::config("Ledger tables are missing after migration"));
        }

        let processor = CommandProcessor::new(
            Arc::new(VoteLedgerManager::new(store.clone())),
            Arc::new(ContentLifecycleController::new(store.clone())),
            Arc::new(AccountService::new(store, Arc::new(TracingNotifier))),
        );

        let (response_tx, responses) = mpsc::channel(settings.command_channel_size);
        let orchestrator = Orchestrator::with_config(
            Arc::new(LineConsumer::stdin()),
            Arc::new(processor),
            response_tx,
            OrchestratorConfig {
                channel_buffer_size: settings.command_channel_size,
                worker_concurrency: settings.worker_concurrency,
            },
        );

        Ok(Self {
            orchestrator,
            responses,
        })
    }

    /// Connects to PostgreSQL with retry logic based on the connection mode,
    /// then applies the migrations.
    async fn connect_to_postgres(settings: &Settings) -> Result<PostgresLedgerStore, AppError> {
        let url = settings
            .database_url
            .as_deref()
            .ok_or_else(|| AppError::config("DATABASE_URL must be set for the postgres store"))?;

        let pool = loop {
            match Self::try_connect(url, settings.database_max_connections).await {
                Ok(pool) => break pool,
                Err(e) => match settings.connection_mode {
                    ConnectionMode::FailFast => return Err(e.into()),
                    ConnectionMode::Retry => {
                        warn!(
                            error = %e,
                            retry_interval_secs = settings.retry_interval.as_secs(),
                            "Failed to connect to PostgreSQL, retrying..."
                        );
                        sleep(settings.retry_interval.max(Duration::from_secs(1))).await;
                    }
                },
            }
        };
        info!("PostgreSQL connection established");

        let store = PostgresLedgerStore::new(pool).await?;
        store.migrate().await?;
        info!("Migrations applied");
        Ok(store)
    }

    async fn try_connect(url: &str, max_connections: u32) -> Result<sqlx::PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }
}
