//! Core types for tunefetch

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for a fetch job
///
/// Generated at submission time by [`crate::jobs::JobIdGenerator`]; any
/// string is accepted on lookup so that unknown ids resolve to the
/// unknown-job record instead of a parse error.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Create a new JobId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Job lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Created, no engine event processed yet
    Starting,
    /// Retrieving source bytes
    Downloading,
    /// Retrieval finished, transcoding to the target codec
    Converting,
    /// Artifact ready
    Done,
    /// Engine failed
    Error,
    /// Never submitted, or evicted from the store
    Unknown,
}

impl JobStatus {
    /// `done` and `error` are the only terminal states
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }

    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Starting => "starting",
            JobStatus::Downloading => "downloading",
            JobStatus::Converting => "converting",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
            JobStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target audio encoding family
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// MPEG-1 Layer III
    #[default]
    Mp3,
    /// Opus in an Ogg container
    Opus,
}

impl Codec {
    /// Parse a requested codec name, falling back to [`Codec::Mp3`] for
    /// anything unrecognized
    pub fn from_request(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("opus") => Codec::Opus,
            _ => Codec::Mp3,
        }
    }

    /// Infer the codec from a file extension (without the dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "mp3" => Some(Codec::Mp3),
            "opus" | "ogg" => Some(Codec::Opus),
            _ => None,
        }
    }

    /// Allowed bitrates in kbit/s
    pub fn allowed_qualities(&self) -> &'static [u32] {
        match self {
            Codec::Mp3 => &[128, 192, 256, 320],
            Codec::Opus => &[64, 96, 128, 160, 192],
        }
    }

    /// Bitrate used when the request omits one or asks for a disallowed value
    pub fn default_quality(&self) -> u32 {
        match self {
            Codec::Mp3 => 320,
            Codec::Opus => 128,
        }
    }

    /// Clamp a requested bitrate to this codec's allowed set
    pub fn normalize_quality(&self, requested: Option<u32>) -> u32 {
        requested
            .filter(|q| self.allowed_qualities().contains(q))
            .unwrap_or_else(|| self.default_quality())
    }

    /// Name understood by the engine's `--audio-format`
    pub fn as_str(&self) -> &'static str {
        match self {
            Codec::Mp3 => "mp3",
            Codec::Opus => "opus",
        }
    }

    /// Content type used when serving files of this family
    pub fn mime_type(&self) -> &'static str {
        match self {
            Codec::Mp3 => "audio/mpeg",
            Codec::Opus => "audio/ogg",
        }
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated fetch request, ready to hand to the engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchSpec {
    /// Search text or direct source URL (never empty)
    pub locator: String,
    /// Display title supplied by the client
    pub title: String,
    /// Target encoding family
    pub codec: Codec,
    /// Bitrate in kbit/s, already normalized for `codec`
    pub quality: u32,
}

/// Descriptor of an artifact produced by a successful job
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ArtifactInfo {
    /// On-disk file name inside the storage directory
    pub filename: String,
    /// Display title as supplied at submission time
    pub title: String,
    /// Size in bytes
    pub size: u64,
    /// Human-readable size ("812 KB", "4.2 MB")
    pub size_human: String,
    /// Encoding family the job produced
    pub codec: Codec,
}

/// Point-in-time view of a job
///
/// Constructed only through the named constructors so that `result` and
/// `error` are never populated together and only appear in their terminal
/// state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct JobRecord {
    /// Lifecycle state
    pub status: JobStatus,
    /// Progress within the current phase, 0..=100
    pub percent: u8,
    /// Artifact descriptor, present only when `status == done`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ArtifactInfo>,
    /// Failure message, present only when `status == error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobRecord {
    /// Initial record written at submission
    pub fn starting() -> Self {
        Self::in_progress(JobStatus::Starting, 0)
    }

    /// Fallback for ids the store does not know
    pub fn unknown() -> Self {
        Self::in_progress(JobStatus::Unknown, 0)
    }

    /// Non-terminal record; `percent` is clamped to 100
    pub fn in_progress(status: JobStatus, percent: u8) -> Self {
        Self {
            status,
            percent: percent.min(100),
            result: None,
            error: None,
        }
    }

    /// Terminal success record
    pub fn done(result: ArtifactInfo) -> Self {
        Self {
            status: JobStatus::Done,
            percent: 100,
            result: Some(result),
            error: None,
        }
    }

    /// Terminal failure record
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Error,
            percent: 0,
            result: None,
            error: Some(message.into()),
        }
    }

    /// Whether this record is final
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Broadcast whenever a job record changes
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct JobEvent {
    /// Job the record belongs to
    pub task_id: JobId,
    /// The new record
    #[serde(flatten)]
    pub record: JobRecord,
}

/// Options for submitting a fetch job
///
/// Everything is optional: the title defaults to "Unknown", the codec to
/// mp3, and the quality to the codec's default. Unrecognized codecs and
/// disallowed qualities fall back the same way instead of being rejected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubmitOptions {
    /// Display title stored in the job result
    #[serde(default)]
    pub title: Option<String>,

    /// Requested codec name ("mp3" or "opus", case-insensitive)
    #[serde(default)]
    pub codec: Option<String>,

    /// Requested bitrate in kbit/s
    #[serde(default)]
    pub quality: Option<u32>,
}

/// Catalog entry derived from a file in the storage directory
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CatalogEntry {
    /// File name
    pub filename: String,
    /// Display title (file name without extension)
    pub title: String,
    /// Size in bytes
    pub size: u64,
    /// Human-readable size
    pub size_human: String,
    /// Last modification time, seconds since the Unix epoch
    pub modified: f64,
    /// Encoding family inferred from the extension
    pub codec: Codec,
}

/// Resolved metadata for a single track
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TrackMetadata {
    /// Track title
    pub title: String,
    /// Artist or uploader
    pub artist: String,
    /// Album, when the source exposes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    /// Duration in seconds (0 when unknown)
    pub duration: u64,
    /// Canonical source URL, usable as a submit locator
    pub url: String,
    /// Thumbnail URL
    pub thumbnail: String,
}

/// Lightweight search candidate returned by the metadata provider
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Suggestion {
    /// Candidate title
    pub title: String,
    /// Artist or uploader
    pub artist: String,
    /// Duration in seconds (0 when unknown)
    pub duration: u64,
    /// Source URL
    pub url: String,
    /// Thumbnail URL
    pub thumbnail: String,
}
