use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::StoreError;
use crate::record::{NewStudent, RecordId, Student, StudentPatch};

/// Boxed future returned by store methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Document store for student records.
///
/// The service layer doesn't know concrete implementations; for it the
/// persistence layer is just this trait. Implementations own the unique
/// `email` index and must make check-and-write atomic.
pub trait RecordStore: Send + Sync {
    /// Open the store. Called once before the first request.
    fn init(&self) -> StoreFuture<'_, ()>;

    /// Insert a new document, assigning id and timestamps.
    fn insert(&self, student: NewStudent) -> StoreFuture<'_, Student>;

    /// All documents, newest first.
    fn list(&self) -> StoreFuture<'_, Vec<Student>>;

    fn get(&self, id: RecordId) -> StoreFuture<'_, Option<Student>>;

    /// Merge `patch` into an existing document. `None` if the id is unknown.
    fn update(&self, id: RecordId, patch: StudentPatch) -> StoreFuture<'_, Option<Student>>;

    /// Remove a document, returning it. `None` if the id is unknown.
    fn delete(&self, id: RecordId) -> StoreFuture<'_, Option<Student>>;

    /// Whether the store is open and usable.
    fn is_connected(&self) -> bool;

    /// Flush and close. Later operations fail with an `Io` error.
    fn close(&self) -> StoreFuture<'_, ()>;
}

/// Builds a store from its JSON configuration.
pub trait StoreFactory: Send + Sync {
    fn create(&self, config_json: &str) -> Result<Arc<dyn RecordStore>, StoreError>;
}
