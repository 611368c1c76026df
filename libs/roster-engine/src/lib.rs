pub mod bootstrap;
pub mod config;
pub mod error;
pub mod service;

pub use bootstrap::Engine;
pub use config::RosterConfig;
pub use error::{EngineError, ServiceError};
pub use service::RecordService;
