//! Contract analysis pipeline and its HTTP API.
//!
//! - `POST /api/extract-text`: multipart `file` → `{ text }`
//! - `POST /api/process-text`: `{ text }` → contract record
//! - `POST /api/analyze`: multipart `file` → `{ record, view }`
//! - `GET /api/health`

mod error;
mod handlers;
mod pipeline;
mod routes;

#[cfg(test)]
mod testing;

pub use error::PipelineError;
pub use handlers::UPLOAD_FIELD;
pub use pipeline::{Analysis, Pipeline};
pub use routes::create_router;

use std::net::SocketAddr;

/// Shared state for the web server. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }
}

/// Start the web server.
pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(state.clone());

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    tracing::info!(
        model = state.pipeline.model(),
        max_upload_mb = state.pipeline.limits().max_megabytes(),
        "Starting server at http://{}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
