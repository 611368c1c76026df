//! HTTP gateway for the record service.
//!
//! Every response, success or failure, is wrapped in
//! [`Envelope`](roster_api::envelope::Envelope).

mod error;
mod http;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use roster_engine::{RecordService, RosterConfig};

pub use error::ApiError;

/// Gateway knobs taken from the server configuration.
#[derive(Debug, Clone)]
pub struct ApiOptions {
    /// Browser origin allowed to call the API with credentials.
    pub client_origin: String,
    /// Include the underlying failure text in 500 responses.
    pub expose_error_details: bool,
}

impl ApiOptions {
    pub fn from_config(cfg: &RosterConfig) -> Self {
        Self {
            client_origin: cfg.client_origin.clone(),
            expose_error_details: cfg.expose_error_details,
        }
    }
}

#[derive(Clone)]
pub(crate) struct AppState {
    service: RecordService,
    expose_error_details: bool,
}

/// Build the full router: routes, fallback, CORS and request tracing.
pub fn build_router(service: RecordService, options: &ApiOptions) -> Result<Router, String> {
    let origin = HeaderValue::from_str(&options.client_origin)
        .map_err(|e| format!("client origin '{}': {e}", options.client_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    let state = AppState {
        service,
        expose_error_details: options.expose_error_details,
    };

    Ok(Router::new()
        .route("/", get(http::handle_info))
        .route("/api/health", get(http::handle_health))
        .route(
            "/api/students",
            get(http::handle_list).post(http::handle_create),
        )
        .route(
            "/api/students/{id}",
            get(http::handle_get)
                .put(http::handle_update)
                .delete(http::handle_delete),
        )
        .fallback(http::handle_not_found)
        .method_not_allowed_fallback(http::handle_not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Bind `0.0.0.0:{port}` and serve until `shutdown` is cancelled.
pub async fn run(port: u16, router: Router, shutdown: CancellationToken) -> Result<(), String> {
    let listener = TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|e| format!("bind api :{port}: {e}"))?;
    tracing::info!(port, "api server listening");
    serve(listener, router, shutdown).await
}

/// Serve on an already bound listener.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
) -> Result<(), String> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| format!("axum serve: {e}"))
}
