//! Brandscan Reports
//!
//! Scored compliance reports and the session's report collection.
//!
//! # Core Concepts
//!
//! - [`ScanSummary`]: status counts and the bounded score
//! - [`Report`]: immutable findings and summary plus a growing [`Transcript`]
//! - [`Aggregator`]: builds reports with ids unique within a [`ReportStore`]
//! - [`ReportStore`]: most-recent-first collection with a viewed pointer
//!
//! # Example
//!
//! ```rust,ignore
//! let store = ReportStore::new();
//! let report = Aggregator::new(store.clone()).aggregate(descriptor, findings)?;
//! store.open_with_data(report);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod aggregator;
pub mod demo;
mod error;
pub mod render;
mod report;
mod store;
mod summary;

pub use aggregator::Aggregator;
pub use error::{AggregationError, StoreError};
pub use report::{ChatMessage, ChatRole, Report, ReportId, Transcript};
pub use store::{ReportStore, StoreConfig, StoreEvent, DEFAULT_CLOSE_GRACE};
pub use summary::{score, ScanSummary, ScoreBand, FAIL_PENALTY, WARNING_PENALTY};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
