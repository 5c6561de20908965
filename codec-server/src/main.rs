//! codec-server: portfolio codec web server.
//!
//! Reads config from env vars (see `config.rs`); a `.env` file is loaded
//! first if present.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use codec_core::CodecRegistry;
use codec_server::{build_router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "codec_server=debug,codec_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    let registry = match &config.registry_path {
        Some(path) => {
            tracing::info!("Loading registry from {}", path.display());
            CodecRegistry::load_from_file(path)?
        }
        None => CodecRegistry::builtin().context("built-in registry is invalid")?,
    };
    tracing::info!(
        "Registry ready: {} frequencies, {} characters, {} projects, {} secret patterns",
        registry.len(),
        registry.characters().len(),
        registry.projects().len(),
        registry.patterns().len()
    );

    let addr = config.bind_addr;
    tracing::info!("Serving static files from: {}", config.static_dir.display());
    tracing::info!(
        "Proxying {} -> {}",
        config.dev_proxy_prefix,
        config.dev_proxy_target
    );

    tracing::info!(
        "Sessions: at most {}, idle expiry {}s",
        config.max_sessions,
        config.session_idle.as_secs()
    );

    let state = AppState::new(Arc::new(registry), config);
    state.spawn_session_reaper(Duration::from_secs(60));
    let app = build_router(state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Port {} is already in use. Try: lsof -ti:{} | xargs kill -9",
                    addr.port(),
                    addr.port()
                );
            }
            return Err(e).with_context(|| format!("failed to bind to {}", addr));
        }
    };
    tracing::info!("codec-server listening on http://{}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
