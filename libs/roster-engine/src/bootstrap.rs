use std::sync::Arc;

use roster_api::storage::{RecordStore, StoreFactory};
use roster_storage_file::FileStoreFactory;
use roster_storage_memory::MemoryStoreFactory;

use crate::config::RosterConfig;
use crate::error::EngineError;
use crate::service::RecordService;

/// The running engine. Owns the store handle and the service built on it.
///
/// The store is opened in [`Engine::bootstrap`] and closed in
/// [`Engine::shutdown`]; request handlers only ever see the service.
pub struct Engine {
    store: Arc<dyn RecordStore>,
    service: RecordService,
    config: RosterConfig,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("service", &self.service)
            .field("config", &self.config)
            .finish()
    }
}

impl Engine {
    /// Bootstrap the engine from a parsed configuration.
    ///
    /// Creates the configured store and opens it.
    pub async fn bootstrap(config: RosterConfig) -> Result<Self, EngineError> {
        let storage_ctx = format!("storage '{}'", config.storage);
        let store = create_store(&config).map_err(|e| e.with_context(&storage_ctx))?;
        Self::with_store(config, store).await
    }

    /// Bootstrap around an already constructed store.
    pub async fn with_store(
        config: RosterConfig,
        store: Arc<dyn RecordStore>,
    ) -> Result<Self, EngineError> {
        store
            .init()
            .await
            .map_err(|e| EngineError::Store(e.with_context(format!("storage '{}'", config.storage))))?;
        tracing::info!(storage = %config.storage, "opened record store");

        let service = RecordService::new(store.clone(), config.validation.rules());
        Ok(Engine {
            store,
            service,
            config,
        })
    }

    pub fn service(&self) -> &RecordService {
        &self.service
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    /// Close the store. Services cloned from this engine report
    /// `Disconnected` afterwards.
    pub async fn shutdown(self) {
        if let Err(e) = self.store.close().await {
            tracing::error!(error = %e, "store close error");
        }
        tracing::info!("engine shut down");
    }
}

// ---------------------------------------------------------------------------
// Factory lookup: storage name → store
// ---------------------------------------------------------------------------

fn create_store(cfg: &RosterConfig) -> Result<Arc<dyn RecordStore>, EngineError> {
    let factory: &dyn StoreFactory = match cfg.storage.as_str() {
        "memory" => &MemoryStoreFactory,
        "file" => &FileStoreFactory,
        other => {
            return Err(EngineError::Config(format!(
                "unknown storage '{other}' (expected \"memory\" or \"file\")"
            )));
        }
    };
    let config_json = cfg.storage_config_json()?;
    Ok(factory.create(&config_json)?)
}
