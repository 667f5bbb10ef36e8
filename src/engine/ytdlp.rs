//! yt-dlp backed fetch engine and metadata provider

use super::parser::{
    ARTIFACT_MARKER, FetchLine, PROGRESS_MARKER, engine_failure_message, parse_candidate,
    parse_fetch_line, parse_track,
};
use super::traits::{FetchEngine, MetadataProvider};
use crate::error::ResolutionError;
use crate::progress::RawProgress;
use crate::types::{FetchSpec, Suggestion, TrackMetadata};
use crate::utils::is_direct_url;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// Keep only the tail of stderr; failure messages come from the last lines
const STDERR_TAIL_LINES: usize = 50;

/// Engine backed by the external `yt-dlp` binary
///
/// Search text is turned into a `ytsearch` query; http(s) URLs are passed
/// through unchanged. Audio extraction and transcoding are delegated to
/// yt-dlp's post-processors (which in turn use ffmpeg).
///
/// # Examples
///
/// ```no_run
/// use tunefetch::engine::YtDlp;
/// use std::path::PathBuf;
///
/// // Create with explicit path
/// let ytdlp = YtDlp::new(PathBuf::from("/usr/local/bin/yt-dlp"));
///
/// // Or auto-discover from PATH
/// let ytdlp = YtDlp::from_path().expect("yt-dlp not found in PATH");
/// ```
pub struct YtDlp {
    binary_path: PathBuf,
    extra_args: Vec<String>,
}

impl YtDlp {
    /// Create an engine with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            extra_args: Vec::new(),
        }
    }

    /// Attempt to find `yt-dlp` in PATH
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Append arguments to every invocation (cookies, proxy, rate limits)
    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }

    /// Path of the binary this engine runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.args(&self.extra_args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    /// Arguments for a fetch run, excluding the binary and extra args
    pub(crate) fn fetch_args(spec: &FetchSpec, output_dir: &Path) -> Vec<String> {
        vec![
            "--newline".into(),
            "--no-playlist".into(),
            "--no-simulate".into(),
            "--progress".into(),
            "--extract-audio".into(),
            "--audio-format".into(),
            spec.codec.as_str().into(),
            "--audio-quality".into(),
            format!("{}K", spec.quality),
            "--progress-template".into(),
            format!(
                "download:{} %(progress.status)s %(progress.downloaded_bytes)s \
                 %(progress.total_bytes)s %(progress.total_bytes_estimate)s",
                PROGRESS_MARKER
            ),
            "--print".into(),
            format!("after_move:{} %(filepath)s", ARTIFACT_MARKER),
            "--paths".into(),
            output_dir.display().to_string(),
            "--output".into(),
            "%(title)s.%(ext)s".into(),
            search_target(&spec.locator, 1),
        ]
    }

    /// Run a metadata command and return its stdout lines, or the failure message
    async fn run_json_command(&self, args: &[String]) -> Result<Vec<serde_json::Value>, String> {
        let output = self
            .command()
            .args(args)
            .output()
            .await
            .map_err(|e| format!("Failed to execute yt-dlp: {}", e))?;

        if !output.status.success() {
            let stderr: Vec<String> = String::from_utf8_lossy(&output.stderr)
                .lines()
                .map(str::to_string)
                .collect();
            return Err(engine_failure_message(&stderr, output.status.code()));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| match serde_json::from_str(l) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping non-JSON yt-dlp output line");
                    None
                }
            })
            .collect())
    }
}

/// Turn a locator into something yt-dlp accepts
///
/// URLs are used as-is; free text becomes `ytsearch<n>:<text>`.
pub(crate) fn search_target(locator: &str, results: usize) -> String {
    let locator = locator.trim();
    if is_direct_url(locator) {
        locator.to_string()
    } else {
        format!("ytsearch{}:{}", results, locator)
    }
}

#[async_trait]
impl FetchEngine for YtDlp {
    async fn fetch(
        &self,
        spec: &FetchSpec,
        output_dir: &Path,
        progress: mpsc::Sender<RawProgress>,
    ) -> crate::Result<PathBuf> {
        let mut child = self
            .command()
            .args(Self::fetch_args(spec, output_dir))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| crate::Error::ExternalTool(format!("Failed to execute yt-dlp: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| crate::Error::Other("yt-dlp stdout was not captured".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| crate::Error::Other("yt-dlp stderr was not captured".into()))?;

        // Drain stderr concurrently so a chatty process never blocks on a full pipe
        let stderr_task = tokio::spawn(async move {
            let mut tail = std::collections::VecDeque::with_capacity(STDERR_TAIL_LINES);
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            Vec::from(tail)
        });

        let mut artifact = None;
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            match parse_fetch_line(&line) {
                Some(FetchLine::Progress(event)) => {
                    if progress.send(event).await.is_err() {
                        tracing::debug!("Progress receiver dropped, continuing without updates");
                    }
                }
                Some(FetchLine::Artifact(path)) => artifact = Some(path),
                None => {}
            }
        }
        drop(progress);

        let status = child.wait().await?;
        let stderr_lines = stderr_task.await.unwrap_or_default();

        if !status.success() {
            return Err(crate::Error::Engine(engine_failure_message(
                &stderr_lines,
                status.code(),
            )));
        }

        artifact.ok_or_else(|| crate::Error::Engine("yt-dlp did not report an output file".into()))
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

#[async_trait]
impl MetadataProvider for YtDlp {
    async fn resolve(&self, query: &str) -> crate::Result<TrackMetadata> {
        let args = vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--skip-download".to_string(),
            "--no-warnings".to_string(),
            search_target(query, 1),
        ];

        let entries = self
            .run_json_command(&args)
            .await
            .map_err(|reason| ResolutionError::Failed { reason })?;

        entries
            .iter()
            .find_map(parse_track)
            .ok_or_else(|| {
                ResolutionError::NotFound {
                    query: query.to_string(),
                }
                .into()
            })
    }

    async fn search(&self, query: &str, limit: usize) -> crate::Result<Vec<Suggestion>> {
        let args = vec![
            "--dump-json".to_string(),
            "--flat-playlist".to_string(),
            "--skip-download".to_string(),
            "--no-warnings".to_string(),
            format!("ytsearch{}:{}", limit, query.trim()),
        ];

        let entries = self
            .run_json_command(&args)
            .await
            .map_err(crate::Error::ExternalTool)?;

        Ok(entries.iter().filter_map(parse_candidate).collect())
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}
