//! REST API server module
//!
//! Serves the orchestration operations over HTTP under `/api`, plus an
//! event stream, OpenAPI docs and (optionally) the web page bundle.

use crate::{Config, Result, TuneFetch};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Jobs
/// - `POST /api/download` - Submit a fetch job
/// - `GET /api/progress/:task_id` - Poll a job
///
/// ## Lookup
/// - `POST /api/search` - Resolve a query to track metadata
/// - `POST /api/suggestions` - Best-effort song suggestions
///
/// ## Library
/// - `GET /api/library` - List stored files
/// - `GET /api/music/*filename` - Stream a stored file
/// - `POST /api/delete` - Delete a stored mp3
///
/// ## System
/// - `GET /api/health` - Health check
/// - `GET /api/openapi.json` - OpenAPI specification
/// - `GET /api/events` - Server-sent job events
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(service: Arc<TuneFetch>, config: Arc<Config>) -> Router {
    let state = AppState::new(service);

    let api = Router::new()
        // Jobs
        .route("/download", post(routes::submit_job))
        .route("/progress/:task_id", get(routes::poll_job))
        // Lookup
        .route("/search", post(routes::resolve_query))
        .route("/suggestions", post(routes::suggest))
        // Library
        .route("/library", get(routes::list_library))
        .route("/music/*filename", get(routes::fetch_file))
        .route("/delete", post(routes::delete_file))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/events", get(routes::event_stream));

    let router = Router::new().nest("/api", api);

    // Swagger UI serves its own copy of the spec so it never collides with /api/openapi.json
    let router = if config.server.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state);

    let router = match &config.server.api.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    let router = router.layer(TraceLayer::new_for_http());

    if config.server.api.cors_enabled {
        let cors = build_cors_layer(&config.server.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// Supports "*" for any origin; an empty list is treated the same way.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Runs until [`TuneFetch::shutdown`] is called, then lets in-flight
/// requests finish before returning.
///
/// # Example
///
/// ```no_run
/// use tunefetch::{Config, TuneFetch};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let service = Arc::new(TuneFetch::new((*config).clone()).await?);
///
/// // Start API server (blocks until shutdown)
/// tunefetch::api::start_api_server(service, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(service: Arc<TuneFetch>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.server.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let shutdown = service.shutdown_token();
    let app = create_router(service, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %listener.local_addr().unwrap_or(bind_address),
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
