//! Client side of the roster API: an HTTP client and the application state
//! a front-end renders from.

pub mod api;
pub mod app;
pub mod error;
pub mod form;
pub mod stats;

pub use api::ApiClient;
pub use app::{ActionOutcome, AppState, ClientApp, ConnectionStatus};
pub use error::ClientError;
pub use form::{FormError, StudentForm};
pub use stats::Stats;
