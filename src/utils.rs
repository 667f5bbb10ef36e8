//! Utility functions for sizes, file names and locators

use std::path::{Component, Path};

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// Render a byte count the way the catalog and job results show it
///
/// Sizes below one MiB are shown as whole kilobytes, larger ones as
/// megabytes with one decimal.
///
/// # Examples
///
/// ```
/// use tunefetch::utils::human_size;
///
/// assert_eq!(human_size(300 * 1024), "300 KB");
/// assert_eq!(human_size(5 * 1024 * 1024 + 300 * 1024), "5.3 MB");
/// ```
#[must_use]
pub fn human_size(bytes: u64) -> String {
    let bytes = bytes as f64;
    if bytes < MIB {
        format!("{:.0} KB", bytes / KIB)
    } else {
        format!("{:.1} MB", bytes / MIB)
    }
}

/// Check that a name refers to a file directly inside a directory
///
/// Rejects empty names, absolute paths, separators and `.`/`..`, so that a
/// client-supplied name can never escape the storage directory.
///
/// # Examples
///
/// ```
/// use tunefetch::utils::is_plain_filename;
///
/// assert!(is_plain_filename("Song A.mp3"));
/// assert!(!is_plain_filename("../etc/passwd"));
/// assert!(!is_plain_filename("nested/song.mp3"));
/// ```
#[must_use]
pub fn is_plain_filename(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Whether a locator is a direct http(s) URL rather than search text
#[must_use]
pub fn is_direct_url(locator: &str) -> bool {
    url::Url::parse(locator.trim())
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}
