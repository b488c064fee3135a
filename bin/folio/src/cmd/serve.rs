//! Serve command - dynamic server rendering pages on request

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use folio_core::{
    Config, Preferences,
    prefs::{JsonFileBackend, MemoryBackend, PrefsBackend},
};
use folio_generator::{HtmlGenerator, PostStore};
use tokio::net::TcpListener;

use super::check::quick_validate;
use crate::{
    config_root,
    server::{AppState, create_router},
};

/// Run the serve command.
///
/// `port` overrides `server.port` from the configuration. Pending preference
/// writes are flushed on Ctrl+C.
pub async fn run(config_path: &Path, port: Option<u16>) -> Result<()> {
    tracing::info!(?config_path, ?port, "Starting server");

    let config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;
    let root = config_root(config_path);

    let store = PostStore::from_config(&config, root);
    for warn in quick_validate(&store) {
        println!("  ⚠ {warn}");
    }

    let backend: Box<dyn PrefsBackend> = match &config.server.prefs_path {
        Some(path) => {
            let path = root.join(path);
            tracing::info!(path = %path.display(), "Persisting preferences to file");
            Box::new(JsonFileBackend::new(path))
        }
        None => Box::new(MemoryBackend::default()),
    };
    let prefs = Preferences::new(backend);

    let port = port.unwrap_or(config.server.port);
    let state = AppState::new(HtmlGenerator::new(config), store, prefs.clone());
    let app = create_router(state);

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {addr}"))?;

    println!();
    println!("  Server running at http://{addr}");
    println!("  Press Ctrl+C to stop");
    println!();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Server error")?;

    tokio::task::spawn_blocking(move || prefs.flush_now())
        .await
        .wrap_err("Failed to flush preferences")?;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}
