//! Parsers for yt-dlp output

use crate::progress::{RawProgress, TotalSize};
use crate::types::{Suggestion, TrackMetadata};
use serde_json::Value;
use std::path::PathBuf;

/// Prefix of the lines produced by our `--progress-template`
pub(crate) const PROGRESS_MARKER: &str = "tunefetch-progress";

/// Prefix of the line produced by our `--print after_move:` template
pub(crate) const ARTIFACT_MARKER: &str = "tunefetch-file";

/// One meaningful line of fetch output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchLine {
    /// A progress event
    Progress(RawProgress),
    /// The final artifact path, printed after all post-processing
    Artifact(PathBuf),
}

/// Parse one stdout line of a fetch run
///
/// Recognizes the progress template
/// (`tunefetch-progress <status> <downloaded> <total> <estimate>`, with `NA`
/// for missing numbers), the artifact line, and the audio extractor's
/// destination line, which marks the start of conversion. Other bracketed
/// status lines come back as [`RawProgress::Other`]; anything else is `None`.
pub fn parse_fetch_line(line: &str) -> Option<FetchLine> {
    let line = line.trim_end();

    if let Some(rest) = line.strip_prefix(PROGRESS_MARKER) {
        let mut fields = rest.split_whitespace();
        let status = fields.next()?;
        let downloaded = fields.next().and_then(parse_number);
        let total = fields.next().and_then(parse_number);
        let estimate = fields.next().and_then(parse_number);

        let event = match status {
            "downloading" => RawProgress::Downloading {
                downloaded_bytes: downloaded,
                total: TotalSize::from_fields(total, estimate),
            },
            "finished" => RawProgress::Finished,
            other => RawProgress::Other(other.to_string()),
        };
        return Some(FetchLine::Progress(event));
    }

    if let Some(path) = line.strip_prefix(ARTIFACT_MARKER) {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        return Some(FetchLine::Artifact(PathBuf::from(path)));
    }

    if line.starts_with("[ExtractAudio]") {
        return Some(FetchLine::Progress(RawProgress::Finished));
    }

    if line.starts_with('[') {
        return Some(FetchLine::Progress(RawProgress::Other(line.to_string())));
    }

    None
}

/// yt-dlp prints integers, floats (`1234.0`) or `NA`
fn parse_number(field: &str) -> Option<u64> {
    if let Ok(n) = field.parse::<u64>() {
        return Some(n);
    }
    field
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n as u64)
}

/// Build the failure message for a non-zero exit
///
/// Prefers the last `ERROR:` line of stderr, then the last non-empty line,
/// then a generic message with the exit code.
pub fn engine_failure_message(stderr_lines: &[String], exit_code: Option<i32>) -> String {
    let last_error = stderr_lines
        .iter()
        .rev()
        .find_map(|l| l.trim().strip_prefix("ERROR:").map(|m| m.trim().to_string()));

    if let Some(message) = last_error.filter(|m| !m.is_empty()) {
        return message;
    }

    if let Some(line) = stderr_lines.iter().rev().map(|l| l.trim()).find(|l| !l.is_empty()) {
        return line.to_string();
    }

    match exit_code {
        Some(code) => format!("yt-dlp exited with status {}", code),
        None => "yt-dlp was terminated by a signal".to_string(),
    }
}

fn str_field<'a>(entry: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| entry.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
}

fn duration_secs(entry: &Value) -> u64 {
    entry
        .get("duration")
        .and_then(Value::as_f64)
        .filter(|d| d.is_finite() && *d > 0.0)
        .map(|d| d as u64)
        .unwrap_or(0)
}

fn thumbnail(entry: &Value) -> String {
    if let Some(url) = str_field(entry, &["thumbnail"]) {
        return url.to_string();
    }
    // Flat search results only carry the thumbnail list
    entry
        .get("thumbnails")
        .and_then(Value::as_array)
        .and_then(|thumbs| {
            thumbs
                .iter()
                .rev()
                .find_map(|t| t.get("url").and_then(Value::as_str))
        })
        .unwrap_or_default()
        .to_string()
}

fn source_url(entry: &Value) -> Option<String> {
    if let Some(url) = str_field(entry, &["webpage_url", "url", "original_url"]) {
        return Some(url.to_string());
    }
    str_field(entry, &["id"]).map(|id| format!("https://www.youtube.com/watch?v={}", id))
}

/// Parse one `--dump-json` document into track metadata
///
/// Returns `None` when the document has no title or no usable URL.
pub fn parse_track(entry: &Value) -> Option<TrackMetadata> {
    let title = str_field(entry, &["track", "title"])?.to_string();
    let url = source_url(entry)?;

    Some(TrackMetadata {
        title,
        artist: str_field(entry, &["artist", "creator", "uploader", "channel"])
            .unwrap_or_default()
            .to_string(),
        album: str_field(entry, &["album"]).map(str::to_string),
        duration: duration_secs(entry),
        url,
        thumbnail: thumbnail(entry),
    })
}

/// Parse one flat-playlist search entry into a suggestion candidate
pub fn parse_candidate(entry: &Value) -> Option<Suggestion> {
    let title = str_field(entry, &["title"])?.to_string();
    let url = source_url(entry)?;

    Some(Suggestion {
        title,
        artist: str_field(entry, &["uploader", "channel"])
            .unwrap_or_default()
            .to_string(),
        duration: duration_secs(entry),
        url,
        thumbnail: thumbnail(entry),
    })
}
