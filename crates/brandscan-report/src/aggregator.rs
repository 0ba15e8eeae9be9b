//! Report aggregation
//!
//! Turns scan findings into a [`Report`]: counts, score, a fresh id that does
//! not collide with the store, and the opening exchange of the transcript.

use crate::error::AggregationError;
use crate::report::{ChatMessage, Report, ReportId, Transcript};
use crate::store::ReportStore;
use crate::summary::ScanSummary;
use brandscan_artifact::AttachmentDescriptor;
use brandscan_scan::{Finding, FindingStatus};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fmt::Write as _;

/// Attempts at drawing a fresh id before giving up
const MAX_ID_ATTEMPTS: usize = 8;

/// Builds reports against a store
#[derive(Debug, Clone)]
pub struct Aggregator {
    store: ReportStore,
}

impl Aggregator {
    /// Create aggregator checking ids against `store`
    #[inline]
    #[must_use]
    pub fn new(store: ReportStore) -> Self {
        Self { store }
    }

    /// Aggregate findings into a report created now
    ///
    /// The user's submission message defaults to one naming the source.
    ///
    /// # Errors
    /// - `AggregationError::NoFindings` for an empty findings list
    /// - `AggregationError::DuplicateFindingId` if two findings share an id
    pub fn aggregate(
        &self,
        source: AttachmentDescriptor,
        findings: Vec<Finding>,
    ) -> Result<Report, AggregationError> {
        let prompt = format!("Check this design: {}", source.name());
        self.aggregate_at(source, prompt, findings, Utc::now())
    }

    /// Aggregate with the user's own submission message
    ///
    /// # Errors
    /// See [`Aggregator::aggregate`]
    pub fn aggregate_with_prompt(
        &self,
        source: AttachmentDescriptor,
        prompt: impl Into<String>,
        findings: Vec<Finding>,
    ) -> Result<Report, AggregationError> {
        self.aggregate_at(source, prompt, findings, Utc::now())
    }

    /// Aggregate with an explicit creation time
    ///
    /// # Errors
    /// See [`Aggregator::aggregate`]
    pub fn aggregate_at(
        &self,
        source: AttachmentDescriptor,
        prompt: impl Into<String>,
        findings: Vec<Finding>,
        created_at: DateTime<Utc>,
    ) -> Result<Report, AggregationError> {
        let summary = ScanSummary::from_findings(&findings)?;

        let mut ids = HashSet::with_capacity(findings.len());
        if let Some(dup) = findings.iter().find(|f| !ids.insert(f.id.as_str())) {
            return Err(AggregationError::DuplicateFindingId(dup.id.clone()));
        }

        let id = self.fresh_id()?;
        let transcript = Transcript::with_messages(vec![
            ChatMessage::user(prompt)
                .with_attachment(source.clone())
                .at(created_at),
            ChatMessage::assistant(opening_summary(&summary, &findings))
                .with_analysis(id)
                .at(created_at),
        ]);

        tracing::info!(
            report = %id,
            source = source.name(),
            passed = summary.passed(),
            warnings = summary.warnings(),
            failed = summary.failed(),
            score = summary.score(),
            "report created"
        );

        Ok(Report::assemble(id, created_at, source, summary, findings, transcript))
    }

    fn fresh_id(&self) -> Result<ReportId, AggregationError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = ReportId::new();
            if !self.store.contains(&id) {
                return Ok(id);
            }
            tracing::debug!(report = %id, "report id collision, drawing again");
        }
        Err(AggregationError::IdExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }
}

/// "I've analyzed your design. Found 1 issue and 2 suggestions. ..."
fn opening_summary(summary: &ScanSummary, findings: &[Finding]) -> String {
    let mut text = format!(
        "I've analyzed your design. Found {} and {}.",
        plural(summary.failed(), "issue"),
        plural(summary.warnings(), "suggestion"),
    );
    if let Some(main) = findings.iter().find(|f| f.status == FindingStatus::Fail) {
        let _ = write!(text, " The main concern is: {}.", main.title.to_lowercase());
    } else if summary.warnings() == 0 {
        text.push_str(" Everything checked is on-brand.");
    }
    text
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("1 {word}")
    } else {
        format!("{n} {word}s")
    }
}
