use std::sync::Arc;

use anyhow::{anyhow, Context};
use tracing::info;

use fidi_connect::{BasiqClient, FireflyClient};
use fidi_core::{
    ledgers::{SourceLedgerGateway, TargetLedgerGateway},
    mappings::{AccountMappingService, AccountMappingServiceTrait},
    sync::{SyncScheduler, SyncService, SyncServiceTrait, SyncStateRepositoryTrait},
};
use fidi_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, AccountMappingRepository,
    SyncStateRepository,
};

use crate::config::Config;

pub struct AppState {
    pub mapping_service: Arc<dyn AccountMappingServiceTrait>,
    pub sync_service: Arc<dyn SyncServiceTrait>,
    pub sync_state_repository: Arc<dyn SyncStateRepositoryTrait>,
    pub scheduler: Arc<SyncScheduler>,
    pub basiq_client: Arc<BasiqClient>,
    pub source_ledger: Arc<dyn SourceLedgerGateway>,
    pub target_ledger: Arc<dyn TargetLedgerGateway>,
}

/// Opens the database, builds the ledger clients and wires the services.
/// The scheduler is returned stopped.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = config
        .db_path
        .to_str()
        .ok_or_else(|| anyhow!("DB_PATH is not valid UTF-8"))?;
    let db_path = init(db_path).context("failed to prepare the database directory")?;
    run_migrations(&db_path).context("failed to run database migrations")?;
    let pool = create_pool(&db_path).context("failed to open the database")?;
    let writer = spawn_writer(pool.as_ref().clone());
    info!("Database ready at {}", db_path);

    let mapping_repository = Arc::new(AccountMappingRepository::new(pool.clone(), writer.clone()));
    let sync_state_repository = Arc::new(SyncStateRepository::new(pool.clone(), writer));

    let basiq_api_key = config
        .basiq_api_key
        .as_deref()
        .ok_or_else(|| anyhow!("BASIQ_API_KEY is not set"))?;
    let basiq_client = Arc::new(BasiqClient::new(&config.basiq_api_url, basiq_api_key)?);

    let firefly_url = config
        .firefly_url
        .as_deref()
        .ok_or_else(|| anyhow!("FIREFLY_III_URL is not set"))?;
    let firefly_token = config
        .firefly_access_token
        .as_deref()
        .ok_or_else(|| anyhow!("FIREFLY_III_ACCESS_TOKEN is not set"))?;
    let firefly_client = Arc::new(FireflyClient::new(firefly_url, firefly_token)?);

    let source_ledger: Arc<dyn SourceLedgerGateway> = basiq_client.clone();
    let target_ledger: Arc<dyn TargetLedgerGateway> = firefly_client;

    let mapping_service: Arc<dyn AccountMappingServiceTrait> =
        Arc::new(AccountMappingService::new(mapping_repository.clone()));
    let sync_service: Arc<dyn SyncServiceTrait> = Arc::new(
        SyncService::new(
            mapping_repository,
            sync_state_repository.clone(),
            source_ledger.clone(),
            target_ledger.clone(),
        )
        .with_config(config.sync_config()),
    );
    let scheduler = Arc::new(
        SyncScheduler::new(sync_service.clone()).with_config(config.scheduler_config()),
    );

    Ok(Arc::new(AppState {
        mapping_service,
        sync_service,
        sync_state_repository,
        scheduler,
        basiq_client,
        source_ledger,
        target_ledger,
    }))
}
