//! Reports and their chat transcripts
//!
//! A [`Report`] is immutable once built except for its [`Transcript`], which
//! only ever grows at the end. Cloning a report is cheap and clones share the
//! same transcript.

use crate::summary::ScanSummary;
use brandscan_artifact::AttachmentDescriptor;
use brandscan_scan::Finding;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use ulid::Ulid;
use uuid::Uuid;

/// Unique report identifier (ULID, sortable by creation time)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(Ulid);

impl ReportId {
    /// Generate a fresh id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Underlying ULID
    #[inline]
    #[must_use]
    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReportId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s.trim()).map(Self)
    }
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One message of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentDescriptor>,
    /// Report this message presents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ReportId>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            attachment: None,
            analysis: None,
            timestamp: Utc::now(),
        }
    }

    /// Message from the user
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    /// Message from the assistant
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    /// Attach a submitted artifact
    #[must_use]
    pub fn with_attachment(mut self, attachment: AttachmentDescriptor) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Reference a report
    #[must_use]
    pub fn with_analysis(mut self, report: ReportId) -> Self {
        self.analysis = Some(report);
        self
    }

    /// Override the timestamp
    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Append-only, shared chat transcript
///
/// There is deliberately no way to remove or edit a message.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Arc<RwLock<Vec<ChatMessage>>>,
}

impl Transcript {
    /// Create transcript with initial messages
    #[must_use]
    pub fn with_messages(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages: Arc::new(RwLock::new(messages)),
        }
    }

    /// Append a message, returning its position
    pub fn push(&self, message: ChatMessage) -> usize {
        let mut messages = self.messages.write();
        messages.push(message);
        messages.len() - 1
    }

    /// Copy of all messages in arrival order
    #[must_use]
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.read().clone()
    }

    /// Most recent message
    #[must_use]
    pub fn last(&self) -> Option<ChatMessage> {
        self.messages.read().last().cloned()
    }

    /// Number of messages
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    /// Whether the transcript is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }
}

impl Serialize for Transcript {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.messages.read().serialize(serializer)
    }
}

/// A scored compliance report
#[derive(Debug, Clone)]
pub struct Report {
    id: ReportId,
    created_at: DateTime<Utc>,
    source: AttachmentDescriptor,
    summary: ScanSummary,
    findings: Arc<[Finding]>,
    transcript: Transcript,
}

impl Report {
    /// Assemble a report; callers guarantee `summary` was computed from `findings`
    pub(crate) fn assemble(
        id: ReportId,
        created_at: DateTime<Utc>,
        source: AttachmentDescriptor,
        summary: ScanSummary,
        findings: Vec<Finding>,
        transcript: Transcript,
    ) -> Self {
        Self {
            id,
            created_at,
            source,
            summary,
            findings: findings.into(),
            transcript,
        }
    }

    /// Report id
    #[inline]
    #[must_use]
    pub fn id(&self) -> ReportId {
        self.id
    }

    /// Creation time
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Source attachment
    #[inline]
    #[must_use]
    pub fn source(&self) -> &AttachmentDescriptor {
        &self.source
    }

    /// Display name of the source
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.source.name()
    }

    /// Summary
    #[inline]
    #[must_use]
    pub fn summary(&self) -> &ScanSummary {
        &self.summary
    }

    /// Findings in scan order
    #[inline]
    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Chat transcript
    #[inline]
    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Finding by id
    #[must_use]
    pub fn finding(&self, id: &str) -> Option<&Finding> {
        self.findings.iter().find(|f| f.id == id)
    }

    /// Whether any finding falls in a category (case-insensitive)
    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.findings
            .iter()
            .any(|f| f.category.eq_ignore_ascii_case(category))
    }

    /// Distinct categories in finding order
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for f in self.findings.iter() {
            if !out.contains(&f.category.as_str()) {
                out.push(&f.category);
            }
        }
        out
    }

    /// Findings that ask for action, failures first
    #[must_use]
    pub fn issues(&self) -> Vec<&Finding> {
        let mut issues: Vec<&Finding> = self.findings.iter().filter(|f| f.is_issue()).collect();
        issues.sort_by_key(|f| std::cmp::Reverse(f.status));
        issues
    }

    /// True when any finding failed
    #[inline]
    #[must_use]
    pub fn needs_attention(&self) -> bool {
        self.summary.failed() > 0
    }
}

impl Serialize for Report {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        #[derive(Serialize)]
        struct Record<'a> {
            id: ReportId,
            created_at: DateTime<Utc>,
            source: &'a AttachmentDescriptor,
            summary: &'a ScanSummary,
            score_band: crate::summary::ScoreBand,
            findings: &'a [Finding],
            transcript: &'a Transcript,
        }

        Record {
            id: self.id,
            created_at: self.created_at,
            source: &self.source,
            summary: &self.summary,
            score_band: self.summary.band(),
            findings: &self.findings,
            transcript: &self.transcript,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_id_parses_back() {
        let id = ReportId::new();
        assert_eq!(id.to_string().parse::<ReportId>().unwrap(), id);
        assert!("not-an-id".parse::<ReportId>().is_err());
    }

    #[test]
    fn transcript_is_shared_and_ordered() {
        let transcript = Transcript::default();
        let shared = transcript.clone();
        assert_eq!(transcript.push(ChatMessage::user("first")), 0);
        assert_eq!(shared.push(ChatMessage::assistant("second")), 1);

        let contents: Vec<_> = transcript.snapshot().into_iter().map(|m| m.content).collect();
        assert_eq!(contents, ["first", "second"]);
        assert_eq!(shared.last().unwrap().role, ChatRole::Assistant);
    }

    #[test]
    fn message_serializes_without_empty_fields() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(json["role"], "user");
        assert!(json.get("attachment").is_none());
        assert!(json.get("analysis").is_none());
    }
}
