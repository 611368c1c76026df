use roster_api::error::StoreError;
use roster_api::input::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Add context to the error.
    ///
    /// For `Store` variant, context is added to the inner `StoreError`.
    /// For `Config`, context is prepended to the message.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            EngineError::Store(e) => EngineError::Store(e.with_context(ctx)),
            EngineError::Config(msg) => EngineError::Config(format!("{ctx}: {msg}")),
        }
    }
}

/// Outcome taxonomy of a record operation.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Bad client input; nothing reached the store.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A unique field already holds this value.
    #[error("duplicate value for unique field '{field}'")]
    Duplicate { field: &'static str },

    /// No record has the requested id (or the id is malformed).
    #[error("record not found")]
    NotFound,

    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        if e.is_duplicate() {
            ServiceError::Duplicate {
                field: e.field.unwrap_or("email"),
            }
        } else {
            ServiceError::Store(e)
        }
    }
}
