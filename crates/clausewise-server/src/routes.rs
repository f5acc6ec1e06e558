//! Router configuration.

use axum::Router;
use axum::extract::{DefaultBodyLimit, Request};
use axum::http::{Method, header};
use axum::middleware::{self, Next};
use axum::routing::{get, post};
use clausewise_core::UploadLimits;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use crate::AppState;
use crate::handlers;

/// Headroom over the upload limit for multipart framing. Bodies under the cap
/// are read in full so oversized files get the specific "too large" message.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// The API router. CORS preflights (`Origin` plus
/// `Access-Control-Request-Method`) are answered by the CORS layer; any other
/// `OPTIONS` request reaches the routes directly and gets `{}`.
pub fn create_router(state: AppState) -> Router {
    let body_limit = body_limit(state.pipeline.limits());
    let api = Router::new()
        .route("/api/health", get(handlers::health))
        .route(
            "/api/extract-text",
            post(handlers::extract_text).options(handlers::preflight),
        )
        .route(
            "/api/process-text",
            post(handlers::process_text).options(handlers::preflight),
        )
        .route(
            "/api/analyze",
            post(handlers::analyze).options(handlers::preflight),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    let plain = api.clone();
    api.layer(CorsLayer::permissive())
        .layer(middleware::from_fn(move |req: Request, next: Next| {
            let plain = plain.clone();
            async move {
                if req.method() == Method::OPTIONS && !is_cors_preflight(&req) {
                    return match plain.oneshot(req).await {
                        Ok(response) => response,
                        Err(never) => match never {},
                    };
                }
                next.run(req).await
            }
        }))
}

fn is_cors_preflight(req: &Request) -> bool {
    let headers = req.headers();
    headers.contains_key(header::ORIGIN)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

fn body_limit(limits: &UploadLimits) -> usize {
    limits
        .max_bytes
        .saturating_mul(2)
        .saturating_add(MULTIPART_OVERHEAD)
}
