//! The record service: one method per API operation.
//!
//! Validates input against the payload schema, delegates to the store handle
//! it was built with, and folds every store outcome into [`ServiceError`].

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use roster_api::envelope::{DatabaseState, HealthReport};
use roster_api::input::{StudentPayload, ValidationRules};
use roster_api::record::{RecordId, Student};
use roster_api::storage::RecordStore;

use crate::error::ServiceError;

#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
    rules: ValidationRules,
}

impl std::fmt::Debug for RecordService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordService")
            .field("rules", &self.rules)
            .field("connected", &self.store.is_connected())
            .finish()
    }
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>, rules: ValidationRules) -> Self {
        Self { store, rules }
    }

    /// All records, newest first.
    pub async fn list(&self) -> Result<Vec<Student>, ServiceError> {
        Ok(self.store.list().await?)
    }

    pub async fn create(&self, body: Value) -> Result<Student, ServiceError> {
        let new = StudentPayload::from_value(body)?.into_new_student(&self.rules)?;
        let student = self.store.insert(new).await?;
        tracing::info!(id = %student.id, "created student");
        Ok(student)
    }

    pub async fn get(&self, id: &str) -> Result<Student, ServiceError> {
        let id = parse_id(id)?;
        self.store.get(id).await?.ok_or(ServiceError::NotFound)
    }

    /// Merge the supplied fields into an existing record.
    pub async fn update(&self, id: &str, body: Value) -> Result<Student, ServiceError> {
        let id = parse_id(id)?;
        let patch = StudentPayload::from_value(body)?.into_patch(&self.rules)?;
        let student = self.store.update(id, patch).await?.ok_or(ServiceError::NotFound)?;
        tracing::info!(id = %student.id, "updated student");
        Ok(student)
    }

    pub async fn delete(&self, id: &str) -> Result<Student, ServiceError> {
        let id = parse_id(id)?;
        let student = self.store.delete(id).await?.ok_or(ServiceError::NotFound)?;
        tracing::info!(id = %student.id, "deleted student");
        Ok(student)
    }

    /// Store connection state, independent of any record operation.
    pub fn health(&self) -> HealthReport {
        HealthReport::new(
            DatabaseState::from_connected(self.store.is_connected()),
            Utc::now(),
        )
    }
}

/// Malformed ids cannot name a record, so they are reported as not found.
fn parse_id(raw: &str) -> Result<RecordId, ServiceError> {
    RecordId::parse(raw).ok_or_else(|| {
        tracing::debug!(id = raw, "malformed record id");
        ServiceError::NotFound
    })
}
