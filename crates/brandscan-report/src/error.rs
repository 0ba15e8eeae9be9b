//! Error types for aggregation and storage

use crate::report::ReportId;

/// Degenerate aggregation input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregationError {
    /// A report needs at least one finding to be scored
    #[error("cannot build a report from zero findings")]
    NoFindings,

    /// Finding ids must be unique within a report
    #[error("duplicate finding id '{0}'")]
    DuplicateFindingId(String),

    /// Could not find a fresh report id
    #[error("could not allocate a unique report id after {attempts} attempts")]
    IdExhausted { attempts: usize },
}

/// Report store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Report id already present
    #[error("report {0} already exists")]
    DuplicateId(ReportId),
}
