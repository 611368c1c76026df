mod config;
mod storage;

use std::sync::Arc;

use roster_api::error::StoreError;
use roster_api::storage::{RecordStore, StoreFactory};

pub use config::FileStoreConfig;
pub use storage::FileStore;

// ════════════════════════════════════════════════════════════════
//  FileStoreFactory
// ════════════════════════════════════════════════════════════════

pub struct FileStoreFactory;

impl StoreFactory for FileStoreFactory {
    fn create(&self, config_json: &str) -> Result<Arc<dyn RecordStore>, StoreError> {
        let cfg: FileStoreConfig = serde_json::from_str(config_json)
            .map_err(|e| StoreError::logic(format!("file store config: {e}")))?;
        Ok(Arc::new(FileStore::new(&cfg.data_dir, &cfg.file_name)))
    }
}
