//! Demo reports for a fresh session
//!
//! Built through the [`Aggregator`] like any other report, so their summaries
//! obey the same invariants.

use crate::aggregator::Aggregator;
use crate::error::AggregationError;
use crate::store::ReportStore;
use brandscan_artifact::{AttachmentDescriptor, AttachmentKind, ContentHash, ExternalReference};
use brandscan_scan::{Catalog, Finding, FindingStatus};
use chrono::{Duration, Utc};

const DEMO_REFERENCE: &str = "https://figma.com/design/abc123/Mobile-App";

/// Seed `store` with an upload report and a reference report
///
/// # Errors
/// Any [`AggregationError`] while building the reports
pub fn seed(store: &ReportStore) -> Result<(), AggregationError> {
    let aggregator = Aggregator::new(store.clone());
    let now = Utc::now();

    let onboarding = aggregator.aggregate_at(
        onboarding_source(),
        "Review my mobile app onboarding screens",
        onboarding_findings(),
        now - Duration::days(1),
    )?;

    let banner = aggregator.aggregate_at(
        AttachmentDescriptor::Image {
            name: "Homepage banner v2.png".into(),
            mime: "image/png".into(),
            size: 482_133,
            hash: ContentHash::compute(b"Homepage banner v2.png"),
        },
        "Check this homepage banner design",
        Catalog::standard().findings_for(AttachmentKind::Image),
        now - Duration::hours(2),
    )?;

    for report in [onboarding, banner] {
        if let Err(e) = store.add(report) {
            tracing::debug!(error = %e, "demo report skipped");
        }
    }
    tracing::info!(reports = store.len(), "demo reports seeded");
    Ok(())
}

fn onboarding_source() -> AttachmentDescriptor {
    AttachmentDescriptor::Reference {
        name: "Mobile app onboarding".into(),
        reference: ExternalReference {
            url: DEMO_REFERENCE.into(),
            document_key: "abc123".into(),
            node_id: None,
            slug: Some("Mobile-App".into()),
        },
    }
}

fn onboarding_findings() -> Vec<Finding> {
    vec![
        Finding::new(
            "f10",
            "Color",
            "All brand colors correct",
            "Color usage is consistent with our brand palette.",
            FindingStatus::Pass,
        ),
        Finding::new(
            "f11",
            "Typography",
            "Type scale followed",
            "All text sizes follow our defined type scale.",
            FindingStatus::Pass,
        ),
        Finding::new(
            "f12",
            "Spacing",
            "Minor spacing inconsistency",
            "The spacing between cards varies slightly (16px vs 12px).",
            FindingStatus::Warning,
        )
        .with_suggestion("Standardize card spacing to 16px using --space-m token."),
        Finding::new(
            "f13",
            "Accessibility",
            "Touch targets adequate",
            "All interactive elements meet the 44x44px minimum touch target.",
            FindingStatus::Pass,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_two_consistent_reports() {
        let store = ReportStore::new();
        seed(&store).unwrap();

        let reports = store.all();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].name(), "Homepage banner v2.png");
        assert_eq!(reports[0].summary().score(), 47);
        assert_eq!(reports[1].name(), "Mobile app onboarding");
        assert_eq!(reports[1].summary().score(), 70);
        assert!(store.viewed().is_none());
        for report in reports {
            assert_eq!(report.summary().total(), report.findings().len());
        }
    }
}
