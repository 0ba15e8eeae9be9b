//! Text rendering of reports

use crate::report::Report;
use brandscan_scan::FindingStatus;
use chrono::{DateTime, Utc};
use std::fmt::Write as _;

/// Closing line of every rendered report
pub const FOLLOW_UP: &str =
    "Would you like me to expand on any of these findings or help you fix the issues?";

/// Human label for a status
#[must_use]
pub fn status_label(status: FindingStatus) -> &'static str {
    match status {
        FindingStatus::Fail => "⚠️ Needs attention",
        FindingStatus::Warning => "🟡 Almost there",
        FindingStatus::Pass => "✅ On-brand",
    }
}

/// Markdown scan report
#[must_use]
pub fn markdown(report: &Report) -> String {
    let summary = report.summary();
    let mut out = format!("**Design Scan Report for {}**\n\n", report.name());
    let _ = writeln!(
        out,
        "Score: {}/100 ({}) · {} passed · {} warnings · {} failed\n",
        summary.score(),
        summary.band(),
        summary.passed(),
        summary.warnings(),
        summary.failed(),
    );
    for finding in report.findings() {
        let _ = writeln!(
            out,
            "{} **{}**: {}\n",
            status_label(finding.status),
            finding.category,
            finding.title
        );
    }
    out.push('\n');
    out.push_str(FOLLOW_UP);
    out
}

/// Relative age such as "5 minutes ago" or "Yesterday"
#[must_use]
pub fn age_label(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(created_at);
    let minutes = age.num_minutes().max(0);
    let hours = age.num_hours();
    let days = age.num_days();

    if minutes < 60 {
        format!("{minutes} minutes ago")
    } else if hours < 24 {
        format!("{hours} hours ago")
    } else if days == 1 {
        "Yesterday".to_string()
    } else if days < 7 {
        format!("{days} days ago")
    } else {
        created_at.format("%Y-%m-%d").to_string()
    }
}
