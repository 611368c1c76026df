//! Document collection semantics shared by every store backend.
//!
//! Holds documents in insertion order and enforces the unique `email` index.
//! Backends wrap a [`Collection`] in their own lock and decide what to do
//! with the result (nothing for memory, rewrite the file for disk).

use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::record::{NewStudent, RecordId, Student, StudentPatch};

#[derive(Debug, Clone, Default)]
pub struct Collection {
    docs: Vec<Student>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted documents, in their stored order.
    ///
    /// Fails if the documents violate the id or email uniqueness invariants.
    pub fn from_documents(docs: Vec<Student>) -> Result<Self, StoreError> {
        let mut collection = Self::new();
        for doc in docs {
            if collection.position(&doc.id).is_some() {
                return Err(StoreError::format(format!("duplicate id {}", doc.id)));
            }
            if collection.email_taken(&doc.email, None) {
                return Err(StoreError::duplicate("email"));
            }
            collection.docs.push(doc);
        }
        Ok(collection)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Documents in insertion order.
    pub fn documents(&self) -> &[Student] {
        &self.docs
    }

    pub fn insert(&mut self, new: NewStudent, now: DateTime<Utc>) -> Result<Student, StoreError> {
        if self.email_taken(&new.email, None) {
            return Err(StoreError::duplicate("email"));
        }
        let student = new.into_student(RecordId::generate(), now);
        self.docs.push(student.clone());
        Ok(student)
    }

    pub fn get(&self, id: &RecordId) -> Option<&Student> {
        self.docs.iter().find(|s| s.id == *id)
    }

    /// All documents, newest `created_at` first. Equal timestamps keep the
    /// most recently inserted document first.
    pub fn list_newest_first(&self) -> Vec<Student> {
        let mut out: Vec<Student> = self.docs.iter().rev().cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }

    /// Merge `patch` into the document. `Ok(None)` when the id is unknown.
    ///
    /// On a unique-key collision the stored document is left unchanged.
    pub fn update(
        &mut self,
        id: &RecordId,
        patch: StudentPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Student>, StoreError> {
        let Some(idx) = self.position(id) else {
            return Ok(None);
        };
        if let Some(ref email) = patch.email {
            if self.email_taken(email, Some(id)) {
                return Err(StoreError::duplicate("email"));
            }
        }
        let doc = &mut self.docs[idx];
        patch.apply(doc, now);
        Ok(Some(doc.clone()))
    }

    pub fn remove(&mut self, id: &RecordId) -> Option<Student> {
        self.position(id).map(|idx| self.docs.remove(idx))
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.docs.iter().position(|s| s.id == *id)
    }

    fn email_taken(&self, email: &str, except: Option<&RecordId>) -> bool {
        self.docs
            .iter()
            .any(|s| s.email == email && Some(&s.id) != except)
    }
}
