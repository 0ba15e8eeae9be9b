//! Conversation logic
//!
//! While a report is being viewed every answer comes from a
//! [`GroundedResponder`] and is checked against that report before it is
//! shown: an answer citing a finding the report does not contain is replaced
//! by a generic summary of the report. With no report open the ungrounded
//! [`GeneralResponder`] answers instead.

use brandscan_report::{ChatMessage, Report, ReportId, ReportStore, Transcript};
use brandscan_scan::{Finding, FindingStatus};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

/// A responder's answer and the findings it is based on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    /// Ids of the findings the answer talks about
    pub cited: Vec<String>,
}

impl Answer {
    /// Answer citing nothing
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cited: Vec::new(),
        }
    }
}

/// Produces answers about one report
#[async_trait::async_trait]
pub trait GroundedResponder: Send + Sync {
    /// Answer a question about `report`
    async fn answer(&self, report: &Report, question: &str) -> Answer;
}

/// Keyword topics and the category fragments they map to
const TOPICS: &[(&[&str], &str)] = &[
    (&["logo"], "logo"),
    (&["color", "colour", "palette"], "color"),
    (&["spacing", "space", "grid"], "spacing"),
    (&["typography", "font", "italic", "typeface"], "typography"),
    (&["imagery", "image", "photo"], "imagery"),
    (&["copy", "tone", "voice", "wording"], "copywriting"),
    (&["asset"], "brand asset"),
    (&["accessib", "contrast", "wcag", "touch"], "accessibility"),
    (&["emotion", "feel"], "emotional"),
];

/// Keyword-triggered explanations built only from the report's findings
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordResponder;

impl KeywordResponder {
    fn fix_guidance(report: &Report) -> Answer {
        let fixes: Vec<&Finding> = report
            .issues()
            .into_iter()
            .filter(|f| f.suggestion.is_some())
            .collect();
        if fixes.is_empty() {
            return Answer::plain(
                "There is nothing to fix: no finding in this report comes with a suggested change.",
            );
        }
        let mut text = String::from("To fix the issues:");
        for (i, f) in fixes.iter().enumerate() {
            let _ = write!(
                text,
                " {}) {} ({}): {}",
                i + 1,
                f.title,
                f.category,
                f.suggestion.as_deref().unwrap_or_default()
            );
        }
        Answer {
            text,
            cited: fixes.iter().map(|f| f.id.clone()).collect(),
        }
    }

    fn explain(findings: &[&Finding]) -> Answer {
        let mut text = String::new();
        for f in findings {
            if !text.is_empty() {
                text.push(' ');
            }
            let _ = write!(text, "{}: {} ({}). {}", f.category, f.title, f.status, f.description);
            if let Some(s) = &f.suggestion {
                let _ = write!(text, " Suggested fix: {s}");
            }
        }
        Answer {
            text,
            cited: findings.iter().map(|f| f.id.clone()).collect(),
        }
    }
}

#[async_trait::async_trait]
impl GroundedResponder for KeywordResponder {
    async fn answer(&self, report: &Report, question: &str) -> Answer {
        let q = question.to_lowercase();

        let fragments: Vec<&str> = TOPICS
            .iter()
            .filter(|(words, _)| words.iter().any(|w| q.contains(w)))
            .map(|(_, fragment)| *fragment)
            .collect();

        if !fragments.is_empty() {
            let matching: Vec<&Finding> = report
                .findings()
                .iter()
                .filter(|f| {
                    let category = f.category.to_lowercase();
                    fragments.iter().any(|frag| category.contains(frag))
                })
                .collect();
            if !matching.is_empty() {
                return Self::explain(&matching);
            }
            tracing::debug!(report = %report.id(), ?fragments, "topic not in report");
            return generic_answer(report);
        }

        // Questions about the score itself get the summary, not a to-do list
        let about_score = ["score", "rating", "points"].iter().any(|w| q.contains(w));
        let wants_change = ["fix", "improve", "raise"].iter().any(|w| q.contains(w));
        if about_score && !wants_change {
            return generic_answer(report);
        }

        let asks_how = q
            .split_whitespace()
            .any(|w| w.trim_matches(|c: char| !c.is_alphanumeric()) == "how");
        if q.contains("fix") || asks_how {
            return Self::fix_guidance(report);
        }

        generic_answer(report)
    }
}

/// Summary of the report that mentions only categories it contains
#[must_use]
pub fn generic_answer(report: &Report) -> Answer {
    let s = report.summary();
    let mut text = format!(
        "This report scored {}/100 with {} passed, {} warnings and {} failed. I can explain: {}.",
        s.score(),
        s.passed(),
        s.warnings(),
        s.failed(),
        report.categories().join(", ")
    );
    if report.findings().iter().any(|f| f.status != FindingStatus::Pass) {
        text.push_str(" Ask me how to fix the issues.");
    }
    Answer::plain(text)
}

/// Keep an answer only if every finding it cites belongs to `report`
#[must_use]
pub fn ground(report: &Report, answer: Answer) -> Answer {
    match answer.cited.iter().find(|id| report.finding(id).is_none()) {
        None => answer,
        Some(id) => {
            tracing::warn!(report = %report.id(), finding = %id, "ungrounded answer replaced");
            generic_answer(report)
        }
    }
}

/// Follow-up suggestions shown under the welcome message
pub const SUGGESTIONS: &[&str] = &["Check my design", "Explain this guideline", "Validate my colors"];

/// Canned answers about the brand when no report is open
#[derive(Debug, Clone, Default)]
pub struct GeneralResponder {
    role: Option<String>,
}

impl GeneralResponder {
    /// Create responder for a user role
    #[must_use]
    pub fn new(role: Option<String>) -> Self {
        Self { role }
    }

    /// Welcome message
    #[must_use]
    pub fn welcome(&self) -> String {
        let greeting = match &self.role {
            Some(role) => format!(
                "Hi there! I'm your brand quality assistant. I see you're a {role}. "
            ),
            None => "Hi there! I'm your brand quality assistant. ".to_string(),
        };
        format!(
            "{greeting}I'm here to help you create consistent, on-brand designs. You can ask me \
             questions about brand guidelines, upload a design for review, or paste a design \
             link. How can I help you today?"
        )
    }

    /// Follow-up suggestions
    #[must_use]
    pub fn suggestions(&self) -> &'static [&'static str] {
        SUGGESTIONS
    }

    /// Answer a general question
    #[must_use]
    pub fn respond(&self, input: &str) -> &'static str {
        let q = input.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| q.contains(w));

        if has(&["check", "review", "analyze"]) {
            "I'd be happy to review your design! Please upload an image (PNG, JPG) or paste a \
             design link, and I'll analyze it for brand compliance, design tokens, accessibility, \
             and more."
        } else if has(&["logo"]) {
            "Our logo usage guidelines ensure consistent brand recognition. The logo should always \
             be placed on approved background colors and maintain proper spacing. Would you like \
             me to check a specific design for logo compliance?"
        } else if has(&["color", "colour"]) {
            "Our color palette is carefully curated to maintain brand consistency. Make sure to use \
             approved brand colors from our design tokens. I can validate color usage in your \
             designs, just upload or share a design link!"
        } else if has(&["spacing"]) {
            "Consistent spacing is key to our brand identity. We use a systematic spacing scale \
             based on design tokens. Would you like me to review the spacing in your design?"
        } else if has(&["typography", "font"]) {
            "Typography plays a crucial role in our brand voice. We have specific type scales and \
             font weights that should be used consistently. I can help validate typography in \
             your designs!"
        } else if has(&["accessibility"]) {
            "Accessibility is a core principle. All designs should meet WCAG 2.1 AA standards, \
             including proper contrast ratios and semantic structure. I can check your designs \
             for accessibility compliance."
        } else if has(&["tone", "voice"]) {
            "Our brand voice is warm, friendly, and empowering. Copy should be simple, active, and \
             focus on value. I can review your copywriting for tone consistency!"
        } else {
            "I'm here to help with brand guidelines, design validation, and answering questions \
             about our brand standards. You can ask me about logos, colors, typography, spacing, \
             accessibility, or upload a design for review. What would you like to know?"
        }
    }
}

/// Result of asking a question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    /// Answer about the viewed report, appended to its transcript
    Grounded { report: ReportId, message: ChatMessage },
    /// Ungrounded answer, appended to the general transcript
    General(ChatMessage),
    /// The report was closed or switched before the answer was ready
    Discarded { report: ReportId },
}

/// Conversation state for one application
#[derive(Clone)]
pub struct ChatSession {
    store: ReportStore,
    responder: Arc<dyn GroundedResponder>,
    general: GeneralResponder,
    transcript: Transcript,
    delay: Duration,
}

impl ChatSession {
    /// Create session over a store
    #[must_use]
    pub fn new(store: ReportStore, general: GeneralResponder) -> Self {
        Self {
            store,
            responder: Arc::new(KeywordResponder),
            general,
            transcript: Transcript::default(),
            delay: Duration::ZERO,
        }
    }

    /// Use another grounded responder
    #[must_use]
    pub fn with_responder(mut self, responder: Arc<dyn GroundedResponder>) -> Self {
        self.responder = responder;
        self
    }

    /// Simulated time before an answer is applied
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Conversation outside any report
    #[inline]
    #[must_use]
    pub fn general_transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Ungrounded responder
    #[inline]
    #[must_use]
    pub fn general(&self) -> &GeneralResponder {
        &self.general
    }

    /// Ask a question
    ///
    /// With a report open, the question is appended to its transcript at
    /// once; the answer is appended only if the same report is still viewed
    /// when it is ready.
    pub async fn ask(&self, question: &str) -> ChatReply {
        let Some(report) = self.store.viewed() else {
            self.transcript.push(ChatMessage::user(question));
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let message = ChatMessage::assistant(self.general.respond(question));
            self.transcript.push(message.clone());
            return ChatReply::General(message);
        };

        let id = report.id();
        report.transcript().push(ChatMessage::user(question));

        let answer = ground(&report, self.responder.answer(&report, question).await);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.store.viewed_id() != Some(id) {
            tracing::debug!(report = %id, "report closed before answer was ready, discarding");
            return ChatReply::Discarded { report: id };
        }

        let message = ChatMessage::assistant(answer.text).with_analysis(id);
        report.transcript().push(message.clone());
        tracing::debug!(report = %id, cited = ?answer.cited, "grounded answer applied");
        ChatReply::Grounded { report: id, message }
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("delay", &self.delay)
            .field("general_messages", &self.transcript.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandscan_artifact::{AttachmentDescriptor, ContentHash};
    use brandscan_report::Aggregator;

    fn report_with(findings: Vec<Finding>) -> Report {
        Aggregator::new(ReportStore::new())
            .aggregate(
                AttachmentDescriptor::Image {
                    name: "screen.png".into(),
                    mime: "image/png".into(),
                    size: 1,
                    hash: ContentHash::compute(b"screen"),
                },
                findings,
            )
            .unwrap()
    }

    fn no_logo_report() -> Report {
        report_with(vec![
            Finding::new("c1", "Color", "Banner off-brand", "Uses #0055AA", FindingStatus::Warning)
                .with_suggestion("Use #0050A5"),
            Finding::new("s1", "Spacing", "Grid respected", "8px grid", FindingStatus::Pass),
        ])
    }

    #[tokio::test]
    async fn logo_question_without_logo_findings_gets_generic_answer() {
        let report = no_logo_report();
        let answer = KeywordResponder.answer(&report, "What about the logo?").await;
        assert_eq!(answer, generic_answer(&report));
        assert!(!answer.text.to_lowercase().contains("logo"));
        assert!(answer.text.contains("Color, Spacing"));
    }

    #[tokio::test]
    async fn score_question_gets_summary_not_fixes() {
        let report = no_logo_report();
        let answer = KeywordResponder.answer(&report, "How is the score computed?").await;
        assert_eq!(answer, generic_answer(&report));
        assert!(answer.text.starts_with("This report scored"));

        let answer = KeywordResponder.answer(&report, "how do I improve the score").await;
        assert!(answer.text.contains("Use #0050A5"));
    }

    #[tokio::test]
    async fn topic_question_explains_present_findings() {
        let report = no_logo_report();
        let answer = KeywordResponder.answer(&report, "why is the colour wrong").await;
        assert_eq!(answer.cited, ["c1"]);
        assert!(answer.text.contains("Banner off-brand"));
        assert!(answer.text.contains("Use #0050A5"));
    }

    #[tokio::test]
    async fn fix_lists_only_issue_suggestions() {
        let report = report_with(vec![
            Finding::new("f1", "Logo Usage", "Logo bg", "d", FindingStatus::Fail).with_suggestion("Move logo"),
            Finding::new("f2", "Spacing", "Gap", "d", FindingStatus::Warning).with_suggestion("Use 16px"),
            Finding::new("f3", "Color", "Fine", "d", FindingStatus::Pass).with_suggestion("Keep it"),
        ]);
        let answer = KeywordResponder.answer(&report, "fix these please").await;
        assert_eq!(answer.cited, ["f1", "f2"]);
        assert!(answer.text.starts_with("To fix the issues: 1) Logo bg"));
        assert!(!answer.text.contains("Keep it"));
    }

    #[test]
    fn ungrounded_citation_is_replaced() {
        let report = no_logo_report();
        let forged = Answer {
            text: "Your logo is too small.".into(),
            cited: vec!["f1".into()],
        };
        assert_eq!(ground(&report, forged), generic_answer(&report));

        let honest = Answer {
            text: "Banner color".into(),
            cited: vec!["c1".into()],
        };
        assert_eq!(ground(&report, honest.clone()), honest);
    }

    #[test]
    fn general_responder_is_keyword_driven() {
        let general = GeneralResponder::new(Some("designer".into()));
        assert!(general.welcome().contains("I see you're a designer."));
        assert!(general.respond("Tell me about fonts").starts_with("Typography"));
        assert!(general.respond("can you review this").starts_with("I'd be happy"));
        assert_eq!(general.suggestions().len(), 3);
    }
}
