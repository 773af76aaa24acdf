//! HTTP front-end
//!
//! Routes:
//! - `GET /` upload form
//! - `POST /upload` multipart upload, answers with an HTML preview page
//! - `POST /process` raw SVG body, answers with the polylines as JSON
//! - `POST /preview.png` raw SVG body, answers with the PNG itself

mod handlers;
pub mod page;
mod response;
pub mod upload;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use log::info;

use crate::config::ServerConfig;
use crate::parser::PolylineSource;
use crate::renderer::RasterConfig;

pub use response::{ErrorDetails, JsonError};
pub use upload::{allowed_file, DrawParams};

/// State shared by all request handlers. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub source: Arc<dyn PolylineSource>,
    pub raster: Arc<RasterConfig>,
}

impl AppState {
    /// Build the state, picking the polyline source from the configuration
    pub fn new(config: ServerConfig) -> Self {
        let source = config.polyline_source();
        Self {
            config: Arc::new(config),
            source,
            raster: Arc::new(RasterConfig::default()),
        }
    }

    /// Replace the polyline source
    pub fn with_source(mut self, source: Arc<dyn PolylineSource>) -> Self {
        self.source = source;
        self
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let limit = state.config.max_upload_bytes;
    Router::new()
        .route("/", get(handlers::index))
        .route("/upload", post(handlers::upload))
        .route("/process", post(handlers::process))
        .route("/preview.png", post(handlers::preview_png))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

/// Bind the configured address and serve until the process is stopped
pub async fn serve(config: ServerConfig) -> std::io::Result<()> {
    let bind = config.bind;
    info!(
        "Using {:?} parser, upload limit {} bytes",
        config.parser, config.max_upload_bytes
    );
    let app = router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}
