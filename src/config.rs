//! Configuration types for tunefetch

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// Artifact storage configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StorageConfig {
    /// Flat directory holding produced artifacts (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
        }
    }
}

/// Fetch-and-transcode engine configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct EngineConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub binary_path: Option<PathBuf>,

    /// Whether to search PATH for the executable if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Extra arguments appended to every engine invocation (e.g. cookies, proxy)
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary_path: None,
            search_path: true,
            extra_args: Vec::new(),
        }
    }
}

/// Suggestion filtering configuration
///
/// Suggestions are advisory, so these only shape what the best-effort list
/// contains; they never cause an error.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SuggestionConfig {
    /// Maximum number of suggestions returned (default: 5)
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Candidates shorter than this are rejected as clips (default: 60)
    #[serde(default = "default_min_duration_secs")]
    pub min_duration_secs: u64,

    /// Candidates longer than this are rejected as long-form (default: 600)
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: u64,

    /// Number of raw candidates requested from the provider (default: 15)
    #[serde(default = "default_search_depth")]
    pub search_depth: usize,

    /// Appended to the query to bias results toward music (default: " song")
    #[serde(default = "default_query_suffix")]
    pub query_suffix: String,

    /// Case-insensitive title keywords that exclude a candidate
    #[serde(default = "default_reject_keywords")]
    pub reject_keywords: Vec<String>,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            min_duration_secs: default_min_duration_secs(),
            max_duration_secs: default_max_duration_secs(),
            search_depth: default_search_depth(),
            query_suffix: default_query_suffix(),
            reject_keywords: default_reject_keywords(),
        }
    }
}

/// Job store configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct JobConfig {
    /// How long terminal job records are kept, in seconds (default: 3600, 0 = forever)
    #[serde(default = "default_retention", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub retention: Duration,

    /// How often the store looks for expired records, in seconds (default: 60)
    #[serde(default = "default_sweep_interval", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub sweep_interval: Duration,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            retention: default_retention(),
            sweep_interval: default_sweep_interval(),
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:5000)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,

    /// Directory with the web page bundle, served for non-API paths
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
            static_dir: None,
        }
    }
}

/// API and external server integration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// Main configuration for TuneFetch
///
/// Every section is optional in the TOML file; missing values take the
/// defaults documented on each field.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Artifact storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Fetch-and-transcode engine
    #[serde(default)]
    pub engine: EngineConfig,

    /// Suggestion filtering
    #[serde(default)]
    pub suggestions: SuggestionConfig,

    /// Job store retention
    #[serde(default)]
    pub jobs: JobConfig,

    /// REST API
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Download directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.storage.download_dir
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config {
            message: e.to_string(),
            key: None,
        })
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        Self::from_toml_str(&text)
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_true() -> bool {
    true
}

fn default_max_results() -> usize {
    5
}

fn default_min_duration_secs() -> u64 {
    60
}

fn default_max_duration_secs() -> u64 {
    600
}

fn default_search_depth() -> usize {
    15
}

fn default_query_suffix() -> String {
    " song".to_string()
}

fn default_reject_keywords() -> Vec<String> {
    [
        "#shorts",
        "shorts",
        "cricket",
        "wicket",
        "ipl",
        "match",
        "highlights",
        "reaction",
        "gameplay",
        "tutorial",
        "podcast",
        "vlog",
        "unboxing",
        "review",
        "trailer",
        "teaser",
        "behind the scenes",
        "interview",
        "news",
        "cooking",
        "recipe",
        "workout",
        "fitness",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_retention() -> Duration {
    Duration::from_secs(3600)
}

fn default_sweep_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
