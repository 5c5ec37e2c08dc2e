//! HTTP API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Layers (outermost → innermost): CORS → access log → handler.

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the API router around a shared context.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(ctx: ApiContext) -> Router {
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/symptoms/catalog", get(endpoints::symptoms::catalog))
        .route("/symptoms/classify", post(endpoints::symptoms::classify))
        .route("/symptoms/check", post(endpoints::symptoms::check))
        .route("/symptoms/history", get(endpoints::symptoms::history))
        .route("/symptoms/summary", get(endpoints::symptoms::summary))
        .route("/symptoms/:id", delete(endpoints::symptoms::delete))
        .route("/chat/ask", post(endpoints::chat::ask))
        .route(
            "/metrics",
            post(endpoints::metrics::record).get(endpoints::metrics::list),
        )
        .route("/metrics/latest", get(endpoints::metrics::latest))
        .route("/metrics/:id", delete(endpoints::metrics::delete))
        .route(
            "/reminders",
            post(endpoints::reminders::create).get(endpoints::reminders::list),
        )
        .route("/reminders/due", get(endpoints::reminders::due))
        .route(
            "/reminders/:id/active",
            put(endpoints::reminders::set_active),
        )
        .route("/reminders/:id", delete(endpoints::reminders::delete))
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .layer(axum::middleware::from_fn(middleware::access_log::log_access))
        .layer(CorsLayer::permissive())
}
