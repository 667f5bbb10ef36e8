//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`jobs`] - Submit and poll fetch jobs
//! - [`lookup`] - Search and suggestions
//! - [`library`] - Stored files
//! - [`system`] - Health, events, OpenAPI

use crate::types::SubmitOptions;
use serde::{Deserialize, Deserializer, Serialize};

mod jobs;
mod library;
mod lookup;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use jobs::*;
pub use library::*;
pub use lookup::*;
pub use system::*;

// ============================================================================
// Request/Response Types (shared across handlers)
// ============================================================================

/// Request body for POST /download
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SubmitRequest {
    /// Search text or direct source URL
    #[serde(default)]
    pub url: String,

    /// Display title (default: "Unknown")
    #[serde(default)]
    pub title: Option<String>,

    /// "mp3" (default) or "opus"
    #[serde(default)]
    pub codec: Option<String>,

    /// Bitrate in kbit/s, as a number or numeric string
    #[serde(default, deserialize_with = "lenient_quality")]
    pub quality: Option<u32>,
}

impl SubmitRequest {
    /// Split into the locator and the submit options
    pub fn into_parts(self) -> (String, SubmitOptions) {
        (
            self.url,
            SubmitOptions {
                title: self.title,
                codec: self.codec,
                quality: self.quality,
            },
        )
    }
}

/// Response body for POST /download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SubmitResponse {
    /// Id to poll with GET /progress/:task_id
    #[schema(value_type = String)]
    pub task_id: crate::types::JobId,
}

/// Request body for POST /search and POST /suggestions
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct QueryRequest {
    /// Free-text query
    #[serde(default)]
    pub query: String,
}

/// Request body for POST /delete
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct DeleteRequest {
    /// Name of the file inside the storage directory
    #[serde(default)]
    pub filename: String,
}

/// Response body for POST /delete
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct DeleteResponse {
    /// Always true on success
    pub success: bool,
}

/// Accept the bitrate as a JSON number or a numeric string
///
/// Anything else (null, negative, fractional strings, garbage) becomes
/// `None` so the codec default applies.
fn lenient_quality<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => match n.as_u64() {
            Some(n) => u32::try_from(n).ok(),
            None => n
                .as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && *f <= f64::from(u32::MAX))
                .map(|f| f as u32),
        },
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
