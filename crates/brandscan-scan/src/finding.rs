//! Findings
//!
//! A [`Finding`] is one categorized compliance observation with exactly one
//! [`FindingStatus`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingStatus {
    /// Compliant
    Pass,
    /// Minor deviation
    Warning,
    /// Non-compliant
    Fail,
}

impl FindingStatus {
    /// Whether this status asks for action
    #[inline]
    #[must_use]
    pub fn is_issue(self) -> bool {
        !matches!(self, Self::Pass)
    }
}

impl fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pass => "pass",
            Self::Warning => "warning",
            Self::Fail => "fail",
        })
    }
}

/// Opaque cross-reference into the guideline pages
///
/// Carried verbatim from catalog to report; resolution happens elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuidelineKey(String);

impl GuidelineKey {
    /// Wrap a slug such as `/guidelines/our-logos`
    #[inline]
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// The slug, unchanged
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GuidelineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GuidelineKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One categorized compliance observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Identifier, unique within a report
    pub id: String,
    /// Category such as "Logo Usage"
    pub category: String,
    /// Short headline
    pub title: String,
    /// Longer explanation
    pub description: String,
    /// Outcome
    pub status: FindingStatus,
    /// Actionable fix, mostly present on warnings and failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Guideline cross-reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guideline: Option<GuidelineKey>,
}

impl Finding {
    /// Create a finding without suggestion or guideline
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        status: FindingStatus,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            title: title.into(),
            description: description.into(),
            status,
            suggestion: None,
            guideline: None,
        }
    }

    /// Attach a suggestion
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach a guideline key
    #[must_use]
    pub fn with_guideline(mut self, key: impl Into<GuidelineKey>) -> Self {
        self.guideline = Some(key.into());
        self
    }

    /// Whether the finding asks for action
    #[inline]
    #[must_use]
    pub fn is_issue(&self) -> bool {
        self.status.is_issue()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guideline_key_round_trips_unchanged() {
        let finding = Finding::new("f1", "Logo Usage", "t", "d", FindingStatus::Fail)
            .with_guideline("/guidelines/our-logos?tab=Clear space#top");
        let json = serde_json::to_string(&finding).unwrap();
        let back: Finding = serde_json::from_str(&json).unwrap();
        assert_eq!(
            back.guideline.as_ref().map(GuidelineKey::as_str),
            Some("/guidelines/our-logos?tab=Clear space#top")
        );
        assert_eq!(back, finding);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&FindingStatus::Warning).unwrap(), "\"warning\"");
        assert!(FindingStatus::Fail.is_issue());
        assert!(!FindingStatus::Pass.is_issue());
    }

    #[test]
    fn optional_fields_are_omitted() {
        let json = serde_json::to_value(Finding::new("f4", "Spacing", "t", "d", FindingStatus::Pass)).unwrap();
        assert!(json.get("suggestion").is_none());
        assert!(json.get("guideline").is_none());
    }
}
