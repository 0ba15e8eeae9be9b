//! Testing utilities for the Brandscan workspace
//!
//! Shared fixtures: upload bytes, reference links, findings with chosen
//! status counts, and assistants that answer without simulated delays.

#![allow(missing_docs)]

use brandscan_artifact::{Attachment, FileValidator};
use brandscan_core::{AnalysisConfig, DesignAssistant};
use brandscan_scan::{Finding, FindingStatus, ScanBackend, ScanError};
use std::sync::Arc;
use std::time::Duration;

/// PNG signature followed by a few filler bytes
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

/// A valid design link with a frame
pub const REFERENCE_URL: &str = "https://www.figma.com/design/abc123/Mobile-App?node-id=1-2";

/// A second, distinct design link
pub const OTHER_REFERENCE_URL: &str = "https://www.figma.com/file/xyz789/Landing";

pub fn png_upload(name: &str) -> Attachment {
    Attachment::upload(&FileValidator::default(), name, "image/png", PNG_BYTES.to_vec()).unwrap()
}

pub fn reference_attachment() -> Attachment {
    Attachment::from_link(REFERENCE_URL).unwrap()
}

/// Findings with the given number of passes, warnings and failures
///
/// Ids are `t1..tN`; each status gets its own category so ordering by
/// category is observable.
pub fn findings(passed: usize, warnings: usize, failed: usize) -> Vec<Finding> {
    let statuses = std::iter::repeat(FindingStatus::Pass)
        .take(passed)
        .chain(std::iter::repeat(FindingStatus::Warning).take(warnings))
        .chain(std::iter::repeat(FindingStatus::Fail).take(failed));

    statuses
        .enumerate()
        .map(|(i, status)| {
            let category = match status {
                FindingStatus::Pass => "Spacing",
                FindingStatus::Warning => "Color",
                FindingStatus::Fail => "Typography",
            };
            let finding = Finding::new(
                format!("t{}", i + 1),
                category,
                format!("{category} check {}", i + 1),
                format!("Result of check {}", i + 1),
                status,
            );
            if status.is_issue() {
                finding.with_suggestion(format!("Adjust {} to match the guidelines", category.to_lowercase()))
            } else {
                finding
            }
        })
        .collect()
}

/// Configuration without simulated delays
pub fn quick_config() -> AnalysisConfig {
    AnalysisConfig::new()
        .with_scan_delay(Duration::ZERO)
        .with_chat_delay(Duration::ZERO)
}

/// Assistant on the mock backend without simulated delays
pub fn setup_test_assistant() -> DesignAssistant {
    DesignAssistant::new(quick_config()).unwrap()
}

/// Assistant on a fixed backend
pub fn assistant_with(backend: impl ScanBackend + 'static) -> DesignAssistant {
    DesignAssistant::with_backend(quick_config(), Arc::new(backend))
}

/// Backend that always returns the same findings
#[derive(Debug, Clone)]
pub struct FixedBackend(pub Vec<Finding>);

#[async_trait::async_trait]
impl ScanBackend for FixedBackend {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn analyze(&self, _attachment: &Attachment) -> Result<Vec<Finding>, ScanError> {
        Ok(self.0.clone())
    }
}

/// Backend that always fails with the given error
#[derive(Debug, Clone)]
pub struct FailingBackend(pub ScanError);

#[async_trait::async_trait]
impl ScanBackend for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn analyze(&self, _attachment: &Attachment) -> Result<Vec<Finding>, ScanError> {
        Err(self.0.clone())
    }
}

/// Backend that takes a while before returning fixed findings
#[derive(Debug, Clone)]
pub struct SlowBackend {
    pub delay: Duration,
    pub findings: Vec<Finding>,
}

#[async_trait::async_trait]
impl ScanBackend for SlowBackend {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn analyze(&self, _attachment: &Attachment) -> Result<Vec<Finding>, ScanError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.findings.clone())
    }
}
