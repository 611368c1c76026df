use tokio_util::sync::CancellationToken;

use roster_api_server::ApiOptions;
use roster_engine::Engine;

use crate::config::ServeArgs;
use crate::error::ServerError;

pub async fn run(args: ServeArgs) -> Result<(), ServerError> {
    tracing::info!("roster-server starting");

    // --- Load config ---
    let config = args.resolve()?;
    tracing::info!(
        config = args.config.as_deref().unwrap_or("<defaults>"),
        storage = %config.storage,
        port = config.api_port,
        "loaded config"
    );

    // --- Open the store ---
    let engine = Engine::bootstrap(config).await?;

    // --- HTTP API ---
    let router = roster_api_server::build_router(
        engine.service().clone(),
        &ApiOptions::from_config(engine.config()),
    )
    .map_err(ServerError::Api)?;

    let token = CancellationToken::new();
    let mut api_handle = tokio::spawn(roster_api_server::run(
        engine.config().api_port,
        router,
        token.clone(),
    ));

    // --- Wait for shutdown signal, or the server giving up on its own ---
    let served = tokio::select! {
        r = shutdown_signal() => {
            r?;
            tracing::info!("shutting down...");
            token.cancel();
            (&mut api_handle).await
        }
        joined = &mut api_handle => joined,
    };
    let served = served
        .map_err(|e| ServerError::Api(e.to_string()))
        .and_then(|r| r.map_err(ServerError::Api));
    if let Err(e) = &served {
        tracing::error!(error = %e, "api server error");
    }

    engine.shutdown().await;
    tracing::info!("shutdown complete");
    served
}

async fn shutdown_signal() -> Result<(), ServerError> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            r = tokio::signal::ctrl_c() => r?,
            _ = terminate.recv() => tracing::info!("received SIGTERM"),
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;
    Ok(())
}
