//! Static page server.
//!
//! Serves the viewer pages from an asset directory and answers a health check.
//! No simulation logic runs here; the pages talk to the backend directly.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::{
    response::{Html, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use tokio::signal::unix::{signal, SignalKind};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::ServerConfig;

/// Embedded landing page, used when no asset directory is found.
const EMBEDDED_INDEX_HTML: &str = include_str!("../static/index.html");

/// Start the server and run until SIGINT, SIGTERM or a listener failure.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let static_dir = find_static_dir(config.static_dir.as_deref());
    match &static_dir {
        Some(dir) => tracing::info!(static_dir = %dir.display(), "Serving static assets"),
        None => tracing::warn!("No static directory found, serving embedded index only"),
    }

    let app = router(static_dir.as_deref());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    if config.open_browser {
        // Use localhost for browser URL even though we bind to 0.0.0.0
        let url = format!("http://127.0.0.1:{}", config.port);
        tracing::info!(%url, "Opening browser");
        #[cfg(target_os = "macos")]
        let _ = std::process::Command::new("open").arg(&url).spawn();
        #[cfg(target_os = "linux")]
        let _ = std::process::Command::new("xdg-open").arg(&url).spawn();
    }

    // Set up OS signal handlers
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let shutdown = async move {
        tokio::select! {
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, initiating graceful shutdown");
            }
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, initiating graceful shutdown");
            }
        }
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        "Frontend server running at http://localhost:{}",
        config.port
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Build the router.
///
/// With an asset directory, every path other than the health check is served
/// from it (`/` resolves to `index.html`). Without one, only the embedded
/// landing page is available.
pub fn router(static_dir: Option<&Path>) -> Router {
    let app = Router::new().route("/api/health", get(health_handler));

    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app.route("/", get(index_handler)),
    };

    app.layer(CorsLayer::permissive())
}

/// Find the static files directory.
/// Checks the configured path first, then the usual dev locations.
pub fn find_static_dir(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        return path.is_dir().then(|| path.to_path_buf());
    }

    let candidates = [
        "static",                  // Next to the binary's working directory
        "bloodflow-viewer/static", // From repo root
    ];

    candidates
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_dir())
}

// --- Handlers ---

async fn index_handler() -> Html<&'static str> {
    Html(EMBEDDED_INDEX_HTML)
}

/// GET /api/health
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}
