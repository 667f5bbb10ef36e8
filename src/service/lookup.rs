//! Metadata resolution and suggestions.

use crate::config::SuggestionConfig;
use crate::error::{Error, Result};
use crate::types::{Suggestion, TrackMetadata};
use regex::{Regex, RegexBuilder};

use super::TuneFetch;

impl TuneFetch {
    /// Resolve a free-text query to metadata for a single track
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for an empty query
    /// - [`crate::ResolutionError::NotFound`] when the provider found nothing
    /// - [`crate::ResolutionError::Failed`] when the provider failed
    pub async fn resolve(&self, query: &str) -> Result<TrackMetadata> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::Validation("No query provided".to_string()));
        }

        let track = self.provider.resolve(query).await?;
        tracing::debug!(query = %query, title = %track.title, "Resolved query");
        Ok(track)
    }

    /// Best-effort list of song-like results for a query
    ///
    /// Never fails: an empty query, a provider error, or no matching
    /// candidates all produce an empty list.
    pub async fn suggest(&self, query: &str) -> Vec<Suggestion> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let config = &self.config.suggestions;
        let biased_query = format!("{}{}", query, config.query_suffix);

        match self.provider.search(&biased_query, config.search_depth).await {
            Ok(candidates) => self.suggestion_filter.apply(candidates),
            Err(e) => {
                tracing::debug!(query = %query, error = %e, "Suggestion search failed");
                Vec::new()
            }
        }
    }
}

/// Compiled suggestion rules
#[derive(Debug)]
pub(crate) struct SuggestionFilter {
    min_duration_secs: u64,
    max_duration_secs: u64,
    max_results: usize,
    reject: Option<Regex>,
}

impl SuggestionFilter {
    /// Compile the keyword denylist into a single case-insensitive pattern
    ///
    /// Spaces inside a keyword match any single character, so
    /// "behind the scenes" also catches "behind-the-scenes".
    pub(crate) fn from_config(config: &SuggestionConfig) -> Result<Self> {
        let alternatives: Vec<String> = config
            .reject_keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(|k| regex::escape(k).replace(' ', "."))
            .collect();

        let reject = if alternatives.is_empty() {
            None
        } else {
            let pattern = format!("({})", alternatives.join("|"));
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| Error::Config {
                    message: format!("invalid reject keyword pattern: {}", e),
                    key: Some("suggestions.reject_keywords".to_string()),
                })?;
            Some(regex)
        };

        Ok(Self {
            min_duration_secs: config.min_duration_secs,
            max_duration_secs: config.max_duration_secs,
            max_results: config.max_results,
            reject,
        })
    }

    /// Whether a candidate looks like a song
    ///
    /// Unknown durations (0) are rejected along with clips and long-form.
    pub(crate) fn accepts(&self, candidate: &Suggestion) -> bool {
        if candidate.duration < self.min_duration_secs || candidate.duration > self.max_duration_secs
        {
            return false;
        }
        !self
            .reject
            .as_ref()
            .is_some_and(|reject| reject.is_match(&candidate.title))
    }

    /// Filter candidates in provider order, keeping at most `max_results`
    pub(crate) fn apply(&self, candidates: Vec<Suggestion>) -> Vec<Suggestion> {
        candidates
            .into_iter()
            .filter(|c| self.accepts(c))
            .take(self.max_results)
            .collect()
    }
}
