//! External design references
//!
//! A reference is a link to a design hosted in an external design tool
//! (`https://www.figma.com/design/<key>/<name>?node-id=1-2`). This module
//! recognizes such links inside free text and resolves them into a stable
//! document key plus an optional sub-node id.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Host that serves external design documents
pub const REFERENCE_HOST: &str = "figma.com";

/// Path segments that precede the document key
const DOCUMENT_SEGMENTS: &[&str] = &["design", "file"];

/// Longest display name derived from a link
pub const MAX_DISPLAY_NAME: usize = 40;

/// Reference links embedded in free text.
///
/// Only well-formed links with a document key match, so a malformed URL never
/// produces a pending reference.
static REFERENCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://(?:[A-Za-z0-9-]+\.)*figma\.com/(?:design|file)/[A-Za-z0-9]+(?:/[^\s?#]*)?(?:\?[^\s#]*)?(?:#\S*)?")
        .expect("reference pattern is a valid regex")
});

/// Sentence punctuation and closing brackets that end prose, not links
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '>', '\'', '"'];

fn strip_trailing(candidate: &str) -> &str {
    candidate.trim_end_matches(TRAILING_PUNCTUATION)
}

/// Reasons a link cannot be used as a design reference
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecognitionError {
    /// The text is not a URL at all
    #[error("could not parse link: {0}")]
    Malformed(String),

    /// A valid URL that does not point at a design document
    #[error("invalid reference: {reason}")]
    NotAReference { reason: String },
}

impl RecognitionError {
    fn not_a_reference(reason: impl Into<String>) -> Self {
        Self::NotAReference {
            reason: reason.into(),
        }
    }
}

/// A resolved reference to an externally hosted design
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalReference {
    /// Link exactly as the user supplied it
    pub url: String,
    /// Stable document identifier
    pub document_key: String,
    /// Optional sub-node (frame) identifier, normalised to `a:b`
    pub node_id: Option<String>,
    /// Human readable name from the URL slug, if present
    pub slug: Option<String>,
}

impl ExternalReference {
    /// Resolve a link into a reference
    ///
    /// # Errors
    /// - `RecognitionError::Malformed` if `url` is not a URL
    /// - `RecognitionError::NotAReference` if the URL is valid but does not
    ///   name a design document
    pub fn parse(url: &str) -> Result<Self, RecognitionError> {
        let trimmed = url.trim();
        let parsed =
            Url::parse(trimmed).map_err(|e| RecognitionError::Malformed(format!("{trimmed}: {e}")))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RecognitionError::not_a_reference(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| RecognitionError::not_a_reference("link has no host"))?
            .to_ascii_lowercase();
        if host != REFERENCE_HOST && !host.ends_with(&format!(".{REFERENCE_HOST}")) {
            return Err(RecognitionError::not_a_reference(format!(
                "'{host}' is not a design host"
            )));
        }

        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();
        let key_index = segments
            .iter()
            .position(|seg| DOCUMENT_SEGMENTS.contains(seg))
            .ok_or_else(|| RecognitionError::not_a_reference("link does not point at a design or file"))?;
        let document_key = segments
            .get(key_index + 1)
            .filter(|key| key.chars().all(|c| c.is_ascii_alphanumeric()))
            .ok_or_else(|| RecognitionError::not_a_reference("link is missing a document key"))?
            .to_string();
        let slug = segments.get(key_index + 2).map(|s| (*s).to_string());

        let node_id = parsed
            .query_pairs()
            .find(|(k, _)| k == "node-id")
            .map(|(_, v)| v.replace('-', ":"))
            .filter(|v| !v.is_empty());

        Ok(Self {
            url: trimmed.to_string(),
            document_key,
            node_id,
            slug,
        })
    }

    /// Find the first reference link in free text
    ///
    /// Returns the matched substring; callers resolve it with [`Self::parse`].
    #[must_use]
    pub fn find_in(text: &str) -> Option<&str> {
        REFERENCE_PATTERN.find(text).map(|m| strip_trailing(m.as_str()))
    }

    /// All reference links in free text, in order
    pub fn find_all(text: &str) -> impl Iterator<Item = &str> {
        REFERENCE_PATTERN.find_iter(text).map(|m| strip_trailing(m.as_str()))
    }

    /// Find and resolve the first reference in free text
    #[must_use]
    pub fn detect(text: &str) -> Option<Self> {
        let candidate = Self::find_in(text)?;
        match Self::parse(candidate) {
            Ok(reference) => Some(reference),
            Err(e) => {
                tracing::debug!(candidate, error = %e, "link matched pattern but did not resolve");
                None
            }
        }
    }

    /// Display name derived from the link, truncated to [`MAX_DISPLAY_NAME`]
    #[must_use]
    pub fn display_name(&self) -> String {
        let base = match self.slug.as_deref() {
            Some(slug) => slug.replace(['-', '_'], " "),
            None => self.url.clone(),
        };
        truncate(&base, MAX_DISPLAY_NAME)
    }
}

impl fmt::Display for ExternalReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node_id {
            Some(node) => write!(f, "{}#{}", self.document_key, node),
            None => f.write_str(&self.document_key),
        }
    }
}

/// Truncate on a char boundary, appending an ellipsis when shortened
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
