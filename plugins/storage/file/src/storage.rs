use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use roster_api::collection::Collection;
use roster_api::error::StoreError;
use roster_api::record::{NewStudent, RecordId, Student, StudentPatch};
use roster_api::storage::{RecordStore, StoreFuture};

// ════════════════════════════════════════════════════════════════
//  FileStore
// ════════════════════════════════════════════════════════════════

/// Durable document store backed by a JSON-lines file.
///
/// The whole collection lives in memory; every successful write rewrites the
/// file through a temp file + rename, so a crash leaves either the old or the
/// new contents on disk. A write whose persist step fails is not applied.
pub struct FileStore {
    data_dir: PathBuf,
    path: PathBuf,
    docs: RwLock<Collection>,
    open: AtomicBool,
}

impl FileStore {
    pub fn new(data_dir: &str, file_name: &str) -> Self {
        let data_dir = PathBuf::from(data_dir);
        Self {
            path: data_dir.join(file_name),
            data_dir,
            docs: RwLock::new(Collection::new()),
            open: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.open.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreError::io(format!("file store {} is not open", self.path.display())))
        }
    }

    // ── Load ──

    async fn load(&self) -> Result<Collection, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Collection::new()),
            Err(e) => return Err(StoreError::io(format!("read {}: {e}", self.path.display()))),
        };

        let mut docs = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let doc: Student = serde_json::from_str(line).map_err(|e| {
                StoreError::format(format!("{}:{}: {e}", self.path.display(), lineno + 1))
            })?;
            docs.push(doc);
        }
        Collection::from_documents(docs).map_err(|e| e.with_context(self.path.display()))
    }

    // ── Persist ──

    async fn persist(&self, docs: &Collection) -> Result<(), StoreError> {
        let mut buf = String::new();
        for doc in docs.documents() {
            buf.push_str(&serde_json::to_string(doc)?);
            buf.push('\n');
        }

        let tmp = self.path.with_extension("jsonl.tmp");
        let mut f = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| StoreError::io(format!("create {}: {e}", tmp.display())))?;
        f.write_all(buf.as_bytes())
            .await
            .map_err(|e| StoreError::io(format!("write {}: {e}", tmp.display())))?;
        f.sync_all()
            .await
            .map_err(|e| StoreError::io(format!("sync {}: {e}", tmp.display())))?;
        drop(f);

        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::io(format!("rename {}: {e}", self.path.display())))
    }

    /// Apply `op` to a copy of the collection, persist it, then swap it in.
    async fn write_with<T>(
        &self,
        op: impl FnOnce(&mut Collection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        self.ensure_open()?;
        let mut guard = self.docs.write().await;
        let mut next = guard.clone();
        let out = op(&mut next)?;
        self.persist(&next).await?;
        *guard = next;
        Ok(out)
    }
}

impl RecordStore for FileStore {
    fn init(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            tokio::fs::create_dir_all(&self.data_dir)
                .await
                .map_err(|e| StoreError::io(format!("mkdir {}: {e}", self.data_dir.display())))?;
            let loaded = self.load().await?;
            tracing::info!(path = %self.path.display(), records = loaded.len(), "file store opened");
            *self.docs.write().await = loaded;
            self.open.store(true, Ordering::Release);
            Ok(())
        })
    }

    fn insert(&self, student: NewStudent) -> StoreFuture<'_, Student> {
        Box::pin(async move {
            let now = Utc::now();
            self.write_with(|docs| docs.insert(student, now)).await
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
            let now = Utc::now();
            self.write_with(|docs| docs.update(&id, patch, now)).await
        })
    }

    fn delete(&self, id: RecordId) -> StoreFuture<'_, Option<Student>> {
        Box::pin(async move {
            self.ensure_open()?;
            // Skip the rewrite when nothing would change.
            if self.docs.read().await.get(&id).is_none() {
                return Ok(None);
            }
            self.write_with(|docs| Ok(docs.remove(&id))).await
        })
    }

    fn is_connected(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn close(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            if !self.open.swap(false, Ordering::AcqRel) {
                return Ok(());
            }
            // Every write is already on disk; a final persist covers a file
            // removed out from under us while running.
            let docs = self.docs.read().await;
            self.persist(&docs).await?;
            tracing::info!(path = %self.path.display(), records = docs.len(), "file store closed");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_student(name: &str, email: &str) -> NewStudent {
        NewStudent {
            name: name.into(),
            email: email.into(),
            branch: "ME".into(),
            marks: 77,
        }
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("db");
        let data_dir = data_dir.to_str().unwrap();

        let store = FileStore::new(data_dir, "students.jsonl");
        store.init().await.unwrap();
        let a = store.insert(new_student("A", "a@x.com")).await.unwrap();
        let b = store.insert(new_student("B", "b@x.com")).await.unwrap();
        store
            .update(a.id, StudentPatch { name: Some("A2".into()), ..Default::default() })
            .await
            .unwrap();
        store.delete(b.id).await.unwrap();
        store.close().await.unwrap();

        let reopened = FileStore::new(data_dir, "students.jsonl");
        reopened.init().await.unwrap();
        let all = reopened.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, a.id);
        assert_eq!(all[0].name, "A2");
        assert_eq!(all[0].created_at, a.created_at);
    }

    #[tokio::test]
    async fn duplicate_email_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_str().unwrap(), "students.jsonl");
        store.init().await.unwrap();
        store.insert(new_student("A", "a@x.com")).await.unwrap();
        let before = std::fs::read_to_string(store.path()).unwrap();

        let err = store.insert(new_student("B", "a@x.com")).await.unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn corrupt_line_fails_init() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("students.jsonl"), "{not json}\n").unwrap();
        let store = FileStore::new(dir.path().to_str().unwrap(), "students.jsonl");
        let err = store.init().await.unwrap_err();
        assert_eq!(err.kind, roster_api::error::ErrorKind::Format);
        assert!(!store.is_connected());
    }

    #[tokio::test]
    async fn missing_ids_are_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_str().unwrap(), "students.jsonl");
        store.init().await.unwrap();
        let id = RecordId::generate();
        assert!(store.get(id).await.unwrap().is_none());
        assert!(store.delete(id).await.unwrap().is_none());
        assert!(store.update(id, StudentPatch::default()).await.unwrap().is_none());
    }
}
