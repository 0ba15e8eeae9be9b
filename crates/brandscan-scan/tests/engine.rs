//! Functional tests for the scan engine with the built-in catalog.
//!
//! Core guarantees exercised here:
//! - Every finding carries exactly one status and issues carry a fix.
//! - Output order follows catalog categories, not backend order.
//! - The remote placeholder fails loudly instead of returning an empty report.

use brandscan_artifact::{Attachment, FileValidator};
use brandscan_scan::{
    BackendKind, Catalog, CatalogBackend, FindingStatus, ScanConfig, ScanEngine, ScanError,
};
use std::sync::Arc;

fn reference() -> Attachment {
    Attachment::from_link("https://www.figma.com/design/abc123/Mobile-App?node-id=4-2").unwrap()
}

/// Tenet: the standard scan of a reference yields the nine catalog findings in
/// category order.
#[tokio::test]
async fn standard_scan_is_category_ordered() {
    let catalog = Arc::new(Catalog::standard());
    let engine = ScanEngine::new(Arc::new(CatalogBackend::new(Arc::clone(&catalog))))
        .with_order(Arc::clone(&catalog));

    let findings = engine.scan(&reference()).await.unwrap();
    let ranks: Vec<_> = findings.iter().map(|f| catalog.category_rank(&f.category)).collect();
    let mut sorted = ranks.clone();
    sorted.sort_unstable();
    assert_eq!(ranks, sorted);

    let failing = findings.iter().filter(|f| f.status == FindingStatus::Fail).count();
    assert_eq!(failing, 1);
    assert!(findings.iter().filter(|f| f.is_issue()).all(|f| f.suggestion.is_some()));
}

/// Tenet: a custom catalog loaded through configuration drives both findings
/// and ordering.
#[tokio::test]
async fn configured_catalog_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.toml");
    std::fs::write(
        &path,
        r#"
        categories = ["Accessibility", "Color"]

        [[rule]]
        id = "c1"
        category = "Color"
        title = "Palette"
        description = "Palette ok"
        status = "pass"

        [[rule]]
        id = "a1"
        category = "Accessibility"
        title = "Contrast"
        description = "Low contrast on footer links"
        status = "fail"
        suggestion = "Raise contrast to 4.5:1"
        "#,
    )
    .unwrap();

    let config = ScanConfig {
        catalog_path: Some(path),
        mock_delay_ms: 0,
        reference_delay_ms: 0,
        ..ScanConfig::default()
    };
    let engine = ScanEngine::from_config(&config).unwrap();
    let upload = Attachment::upload(&FileValidator::default(), "a.png", "image/png", vec![1, 2, 3]).unwrap();
    let ids: Vec<_> = engine.scan(&upload).await.unwrap().into_iter().map(|f| f.id).collect();
    assert_eq!(ids, ["a1", "c1"]);
}

/// Tenet: a remote backend failure is a distinct, retryable error.
#[tokio::test]
async fn remote_failure_is_distinct() {
    let config = ScanConfig {
        backend: BackendKind::Remote,
        ..ScanConfig::default()
    };
    let engine = ScanEngine::from_config(&config).unwrap();
    let err = engine.scan(&reference()).await.unwrap_err();
    assert!(matches!(err, ScanError::BackendUnavailable { .. }));
    assert!(err.is_retryable());
}
