//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the tunefetch REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the tunefetch REST API
///
/// The spec can be accessed via:
/// - `/api/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "tunefetch REST API",
        version = "0.1.0",
        description = "Search for songs, fetch them as mp3 or opus in the background, and manage the stored library",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Jobs
        crate::api::routes::submit_job,
        crate::api::routes::poll_job,

        // Lookup
        crate::api::routes::resolve_query,
        crate::api::routes::suggest,

        // Library
        crate::api::routes::list_library,
        crate::api::routes::fetch_file,
        crate::api::routes::delete_file,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::JobId,
        crate::types::JobStatus,
        crate::types::JobRecord,
        crate::types::JobEvent,
        crate::types::Codec,
        crate::types::ArtifactInfo,
        crate::types::CatalogEntry,
        crate::types::TrackMetadata,
        crate::types::Suggestion,
        crate::types::SubmitOptions,

        // Config types from config.rs
        crate::config::Config,
        crate::config::StorageConfig,
        crate::config::EngineConfig,
        crate::config::SuggestionConfig,
        crate::config::JobConfig,
        crate::config::ServerConfig,
        crate::config::ApiConfig,

        // API request/response types
        crate::api::routes::SubmitRequest,
        crate::api::routes::SubmitResponse,
        crate::api::routes::QueryRequest,
        crate::api::routes::DeleteRequest,
        crate::api::routes::DeleteResponse,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "jobs", description = "Background fetch jobs - Submit and poll"),
        (name = "lookup", description = "Metadata resolution and song suggestions"),
        (name = "library", description = "Stored files - List, stream and delete"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec, events"),
    )
)]
pub struct ApiDoc;
