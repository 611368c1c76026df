use std::fmt;

/// Error kind for store errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Backing medium unavailable, closed, or failing.
    Io,
    /// Persisted data could not be encoded or decoded.
    Format,
    /// A unique key is already taken by another document.
    Duplicate,
    Logic,
}

/// Store error, returned by all [`RecordStore`](crate::storage::RecordStore) methods.
#[derive(Debug, Clone)]
pub struct StoreError {
    pub kind: ErrorKind,
    pub message: String,
    /// Name of the unique field that collided, for `Duplicate`.
    pub field: Option<&'static str>,
}

impl StoreError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Io, message: msg.into(), field: None }
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Format, message: msg.into(), field: None }
    }

    pub fn duplicate(field: &'static str) -> Self {
        Self {
            kind: ErrorKind::Duplicate,
            message: format!("duplicate key on '{field}'"),
            field: Some(field),
        }
    }

    pub fn logic(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Logic, message: msg.into(), field: None }
    }

    /// Add context to the error, preserving the original ErrorKind.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
            field: self.field,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        self.kind == ErrorKind::Duplicate
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for StoreError {}

// ---------------------------------------------------------------------------
// From impls: standard error types → StoreError with correct ErrorKind
// ---------------------------------------------------------------------------

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::io(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::format(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_keeps_kind_and_field() {
        let err = StoreError::duplicate("email").with_context("insert");
        assert!(err.is_duplicate());
        assert_eq!(err.field, Some("email"));
        assert_eq!(err.message, "insert: duplicate key on 'email'");
    }

    #[test]
    fn io_error_maps_to_io_kind() {
        let err: StoreError = std::io::Error::other("disk gone").into();
        assert_eq!(err.kind, ErrorKind::Io);
        assert_eq!(err.to_string(), "Io: disk gone");
    }
}
