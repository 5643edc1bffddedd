//! Record store service for the shelf annotation editor.
//!
//! Serves the book table and display settings over HTTP, keeps them in
//! memory, and flushes the table to a JSON snapshot in the background.

mod config;
mod routes;
mod services;
mod state;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::ServerConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, code = e.error_code(), "invalid configuration");
    })?;
    let books = services::persistence::load_snapshot(&config.data_path).await?;
    let state = state::AppState::new(books, config.data_path.clone());

    // Spawn background persistence task.
    let persistence = services::persistence::spawn_persistence_task(state.clone(), config.flush_interval);

    let app = routes::app(state.clone());
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;

    tracing::info!(port = config.port, data = %config.data_path.display(), "shelfmark listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    persistence.abort();
    if state.is_dirty() {
        tracing::info!("flushing pending changes");
    }
    if let Err(e) = services::persistence::flush_if_dirty(&state).await {
        tracing::error!(error = %e, code = e.error_code(), "final flush failed");
        return Err(e.into());
    }
    tracing::info!("shelfmark stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable; running until killed");
        std::future::pending::<()>().await;
    }
}
