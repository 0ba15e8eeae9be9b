//! Brandscan Core - Design Assistant
//!
//! Ties validation, scanning and reporting into one conversational
//! assistant:
//! - Composes messages with at most one pending design attachment
//! - Runs one analysis at a time and opens the resulting report
//! - Answers questions grounded in the report being viewed
//!
//! # Example
//!
//! ```rust,ignore
//! use brandscan_core::{AnalysisConfig, DesignAssistant, SendOutcome};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let assistant = DesignAssistant::new(AnalysisConfig::new())?;
//! let mut composer = assistant.composer();
//! composer.set_text("Check https://www.figma.com/design/abc123/Hero");
//!
//! if let SendOutcome::Report(report) = assistant.send(&mut composer).await? {
//!     println!("{} scored {}", report.name(), report.summary().score());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod assistant;
pub mod chat;
pub mod composer;
pub mod config;
pub mod error;
pub mod producing;
pub mod telemetry;

pub use assistant::{DesignAssistant, SendOutcome};
pub use chat::{
    generic_answer, ground, Answer, ChatReply, ChatSession, GeneralResponder, GroundedResponder,
    KeywordResponder, SUGGESTIONS,
};
pub use composer::{Composer, ComposerEvent, ComposerState, FileOutcome, Submission};
pub use config::{AnalysisConfig, ChatConfig};
pub use error::{AnalysisError, ComposerError, ConfigError};
pub use producing::{ProducingFlag, ProducingGuard};
pub use telemetry::LogFormat;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the assistant
    pub use crate::{
        AnalysisConfig, AnalysisError, ChatReply, Composer, ComposerState, DesignAssistant,
        SendOutcome, Submission,
    };
    pub use brandscan_artifact::{Attachment, AttachmentKind, ExternalReference, FileValidator};
    pub use brandscan_report::{Report, ReportId, ReportStore};
    pub use brandscan_scan::{Finding, FindingStatus, ScanBackend};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
