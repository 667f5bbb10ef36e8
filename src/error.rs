//! Error types for tunefetch
//!
//! This module provides the error taxonomy for the service:
//! - Input validation errors raised synchronously by request-facing operations
//! - Resolution errors reported by the metadata provider
//! - Catalog errors for files referenced by name
//! - Engine errors, which only ever surface inside a job's terminal record
//! - HTTP status code mapping and structured error bodies for the REST API

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for tunefetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tunefetch
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download_dir")
        key: Option<String>,
    },

    /// A request field was empty or malformed; no job was created
    #[error("{0}")]
    Validation(String),

    /// Metadata resolution error
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Catalog file error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The fetch-and-transcode engine failed while running a job
    #[error("{0}")]
    Engine(String),

    /// External tool is missing or could not be executed
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// The job store actor has stopped (shutdown in progress)
    #[error("job store is not running: shutdown in progress")]
    JobStoreClosed,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Errors reported by the metadata provider
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The provider found nothing for the query
    #[error("no results found for '{query}'")]
    NotFound {
        /// The query that produced no results
        query: String,
    },

    /// The provider raised an error
    #[error("Search failed: {reason}")]
    Failed {
        /// The provider's failure message
        reason: String,
    },
}

/// Errors for catalog files referenced by name
#[derive(Debug, Error)]
pub enum CatalogError {
    /// File does not exist in the storage directory
    #[error("File not found: {filename}")]
    NotFound {
        /// The requested file name
        filename: String,
    },

    /// File exists but its encoding family may not be deleted
    #[error("File cannot be deleted: {filename}")]
    NotDeletable {
        /// The requested file name
        filename: String,
    },

    /// File name is not a plain name inside the storage directory
    #[error("invalid file name: {filename}")]
    InvalidName {
        /// The rejected file name
        filename: String,
    },
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "file_not_found",
///     "message": "File not found: song.mp3",
///     "details": {
///       "filename": "song.mp3"
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::Validation(_) => 400,
            Error::Catalog(CatalogError::InvalidName { .. }) => 400,

            // 403 Forbidden
            Error::Catalog(CatalogError::NotDeletable { .. }) => 403,

            // 404 Not Found
            Error::Resolution(ResolutionError::NotFound { .. }) => 404,
            Error::Catalog(CatalogError::NotFound { .. }) => 404,

            // 500 Internal Server Error
            Error::Resolution(ResolutionError::Failed { .. }) => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,

            // 502 Bad Gateway - External engine errors
            Error::Engine(_) => 502,

            // 503 Service Unavailable
            Error::ExternalTool(_) => 503,
            Error::JobStoreClosed => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(_) => "validation_error",
            Error::Resolution(e) => match e {
                ResolutionError::NotFound { .. } => "resolution_not_found",
                ResolutionError::Failed { .. } => "resolution_failed",
            },
            Error::Catalog(e) => match e {
                CatalogError::NotFound { .. } => "file_not_found",
                CatalogError::NotDeletable { .. } => "not_deletable",
                CatalogError::InvalidName { .. } => "invalid_filename",
            },
            Error::Engine(_) => "engine_error",
            Error::ExternalTool(_) => "external_tool_error",
            Error::JobStoreClosed => "shutting_down",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            Error::Resolution(ResolutionError::NotFound { query }) => Some(serde_json::json!({
                "query": query,
            })),
            Error::Catalog(
                CatalogError::NotFound { filename }
                | CatalogError::NotDeletable { filename }
                | CatalogError::InvalidName { filename },
            ) => Some(serde_json::json!({
                "filename": filename,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    /// Returns a vec of (Error, expected_status_code, expected_error_code) for
    /// every match arm in ToHttpStatus.
    fn all_error_variants() -> Vec<(Error, u16, &'static str)> {
        vec![
            (
                Error::Config {
                    message: "bad value".into(),
                    key: Some("download_dir".into()),
                },
                400,
                "config_error",
            ),
            (
                Error::Validation("No URL provided".into()),
                400,
                "validation_error",
            ),
            (
                Error::Resolution(ResolutionError::NotFound {
                    query: "nothing".into(),
                }),
                404,
                "resolution_not_found",
            ),
            (
                Error::Resolution(ResolutionError::Failed {
                    reason: "timeout".into(),
                }),
                500,
                "resolution_failed",
            ),
            (
                Error::Catalog(CatalogError::NotFound {
                    filename: "a.mp3".into(),
                }),
                404,
                "file_not_found",
            ),
            (
                Error::Catalog(CatalogError::NotDeletable {
                    filename: "a.opus".into(),
                }),
                403,
                "not_deletable",
            ),
            (
                Error::Catalog(CatalogError::InvalidName {
                    filename: "../a.mp3".into(),
                }),
                400,
                "invalid_filename",
            ),
            (Error::Engine("HTTP 403".into()), 502, "engine_error"),
            (
                Error::ExternalTool("yt-dlp not found".into()),
                503,
                "external_tool_error",
            ),
            (Error::JobStoreClosed, 503, "shutting_down"),
            (
                Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
                500,
                "io_error",
            ),
            (
                Error::ApiServerError("bind failed".into()),
                500,
                "api_server_error",
            ),
            (Error::Other("unknown".into()), 500, "internal_error"),
        ]
    }

    #[test]
    fn every_variant_maps_to_expected_status_and_code() {
        for (error, status, code) in all_error_variants() {
            assert_eq!(error.status_code(), status, "status for {error:?}");
            assert_eq!(error.error_code(), code, "code for {error:?}");
        }
    }

    #[test]
    fn resolution_failure_message_keeps_provider_text() {
        let error = Error::Resolution(ResolutionError::Failed {
            reason: "network unreachable".into(),
        });
        assert_eq!(error.to_string(), "Search failed: network unreachable");
    }

    #[test]
    fn catalog_errors_carry_filename_details() {
        let api_error: ApiError = Error::Catalog(CatalogError::NotDeletable {
            filename: "track.opus".into(),
        })
        .into();

        assert_eq!(api_error.error.code, "not_deletable");
        let details = api_error.error.details.unwrap();
        assert_eq!(details["filename"], "track.opus");
    }

    #[test]
    fn validation_error_has_no_details() {
        let api_error: ApiError = Error::Validation("No query provided".into()).into();

        assert_eq!(api_error.error.code, "validation_error");
        assert_eq!(api_error.error.message, "No query provided");
        assert!(api_error.error.details.is_none());
    }

    #[test]
    fn api_error_omits_null_details_when_serialized() {
        let json = serde_json::to_value(ApiError::validation("bad")).unwrap();
        assert!(json["error"].get("details").is_none());
    }
}
