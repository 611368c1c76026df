use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tokio::sync::RwLock;

use roster_api::collection::Collection;
use roster_api::error::StoreError;
use roster_api::record::{NewStudent, RecordId, Student, StudentPatch};
use roster_api::storage::{RecordStore, StoreFactory, StoreFuture};

// ═══════════════════════════════════════════════════════════════
//  MemoryStoreConfig
// ═══════════════════════════════════════════════════════════════

/// The memory store takes no options; unknown keys are a config error.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryStoreConfig {}

// ═══════════════════════════════════════════════════════════════
//  MemoryStore
// ═══════════════════════════════════════════════════════════════

/// Volatile document store. Contents are lost on shutdown.
pub struct MemoryStore {
    docs: RwLock<Collection>,
    open: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Collection::new()),
            open: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.open.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreError::io("memory store is not open"))
        }
    }
}

impl RecordStore for MemoryStore {
    fn init(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.open.store(true, Ordering::Release);
            tracing::debug!("memory store opened");
            Ok(())
        })
    }

    fn insert(&self, student: NewStudent) -> StoreFuture<'_, Student> {
        Box::pin(async move {
            self.ensure_open()?;
            self.docs.write().await.insert(student, Utc::now())
        })
    }

    fn list(&self) -> StoreFuture<'_, Vec<Student>> {
        Box::pin(async move {
            self.ensure_open()?;
            Ok(self.docs.read().await.list_newest_first())
        })
    }

    fn get(&self, id: RecordId) -> StoreFuture<'_, Option<Student>> {
        Box::pin(async move {
            self.ensure_open()?;
            Ok(self.docs.read().await.get(&id).cloned())
        })
    }

    fn update(&self, id: RecordId, patch: StudentPatch) -> StoreFuture<'_, Option<Student>> {
        Box::pin(async move {
            self.ensure_open()?;
            self.docs.write().await.update(&id, patch, Utc::now())
        })
    }

    fn delete(&self, id: RecordId) -> StoreFuture<'_, Option<Student>> {
        Box::pin(async move {
            self.ensure_open()?;
            Ok(self.docs.write().await.remove(&id))
        })
    }

    fn is_connected(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn close(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.open.store(false, Ordering::Release);
            tracing::debug!("memory store closed");
            Ok(())
        })
    }
}

// ═══════════════════════════════════════════════════════════════
//  MemoryStoreFactory
// ═══════════════════════════════════════════════════════════════

pub struct MemoryStoreFactory;

impl StoreFactory for MemoryStoreFactory {
    fn create(&self, config_json: &str) -> Result<Arc<dyn RecordStore>, StoreError> {
        let _config: MemoryStoreConfig = if config_json == "{}" {
            MemoryStoreConfig::default()
        } else {
            serde_json::from_str(config_json)
                .map_err(|e| StoreError::logic(format!("memory store config: {e}")))?
        };
        Ok(Arc::new(MemoryStore::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_student(email: &str, marks: i64) -> NewStudent {
        NewStudent {
            name: "A".into(),
            email: email.into(),
            branch: "CS".into(),
            marks,
        }
    }

    async fn open_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.init().await.unwrap();
        store
    }

    #[tokio::test]
    async fn creates_then_deletes() {
        let store = open_store().await;
        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(store.insert(new_student(&format!("s{i}@x.com"), i)).await.unwrap().id);
        }
        store.delete(ids[1]).await.unwrap().unwrap();
        store.delete(ids[3]).await.unwrap().unwrap();

        let listed: Vec<_> = store.list().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(listed, [ids[4], ids[2], ids[0]]);
        assert!(store.get(ids[1]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_surfaces_as_duplicate_kind() {
        let store = open_store().await;
        store.insert(new_student("a@x.com", 1)).await.unwrap();
        let err = store.insert(new_student("a@x.com", 2)).await.unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn closed_store_rejects_operations() {
        let store = open_store().await;
        assert!(store.is_connected());
        store.close().await.unwrap();
        assert!(!store.is_connected());
        let err = store.list().await.unwrap_err();
        assert_eq!(err.kind, roster_api::error::ErrorKind::Io);
    }

    #[test]
    fn factory_rejects_unknown_options() {
        assert!(MemoryStoreFactory.create("{}").is_ok());
        assert!(MemoryStoreFactory.create(r#"{"max_records": 5}"#).is_err());
    }
}
