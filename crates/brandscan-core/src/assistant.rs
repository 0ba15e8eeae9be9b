//! Design assistant
//!
//! Owns one of everything a running application needs (validator, scan
//! engine, report store, chat session) and drives a submission through the
//! pipeline:
//!
//! 1. raise the producing flag (one submission at a time)
//! 2. scan the attachment
//! 3. aggregate findings into a report
//! 4. insert the report into the store and open it
//!
//! Validation and recognition happen earlier, when the attachment is built,
//! so nothing invalid reaches the scanner. Any failure leaves the store
//! untouched.

use crate::chat::{ChatReply, ChatSession, GeneralResponder};
use crate::composer::{Composer, Submission};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, ComposerError, ConfigError};
use crate::producing::ProducingFlag;
use brandscan_artifact::{Attachment, FileValidator};
use brandscan_report::{Aggregator, Report, ReportStore};
use brandscan_scan::{ScanBackend, ScanEngine};
use std::sync::Arc;

/// What sending a message produced
#[derive(Debug, Clone)]
pub enum SendOutcome {
    /// An attachment was analyzed into a new report
    Report(Report),
    /// A plain question was answered
    Reply(ChatReply),
}

/// Application state and analysis pipeline
#[derive(Debug)]
pub struct DesignAssistant {
    config: AnalysisConfig,
    validator: FileValidator,
    engine: ScanEngine,
    store: ReportStore,
    aggregator: Aggregator,
    chat: ChatSession,
    producing: ProducingFlag,
}

impl DesignAssistant {
    /// Build from configuration, choosing the scan backend it names
    ///
    /// # Errors
    /// `ConfigError::Catalog` if a configured catalog cannot be loaded
    pub fn new(config: AnalysisConfig) -> Result<Self, ConfigError> {
        let engine = ScanEngine::from_config(&config.scan)?;
        Ok(Self::assemble(config, engine))
    }

    /// Build with an explicit scan backend, ordering by the standard catalog
    #[must_use]
    pub fn with_backend(config: AnalysisConfig, backend: Arc<dyn ScanBackend>) -> Self {
        let engine = ScanEngine::new(backend).with_timeout(config.scan.timeout());
        Self::assemble(config, engine)
    }

    fn assemble(config: AnalysisConfig, engine: ScanEngine) -> Self {
        let store = ReportStore::from_config(&config.store);
        let chat = ChatSession::new(store.clone(), GeneralResponder::new(config.chat.role.clone()))
            .with_delay(config.chat.response_delay());
        tracing::info!(
            backend = engine.backend_name(),
            reports = store.len(),
            "design assistant ready"
        );
        Self {
            validator: FileValidator::new(config.validation),
            aggregator: Aggregator::new(store.clone()),
            engine,
            store,
            chat,
            producing: ProducingFlag::new(),
            config,
        }
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Upload validator
    #[inline]
    #[must_use]
    pub fn validator(&self) -> &FileValidator {
        &self.validator
    }

    /// Report store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    /// Chat session
    #[inline]
    #[must_use]
    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    /// Whether a submission is being analyzed
    #[inline]
    #[must_use]
    pub fn is_producing(&self) -> bool {
        self.producing.is_raised()
    }

    /// New composer sharing this assistant's validator and producing flag
    #[must_use]
    pub fn composer(&self) -> Composer {
        Composer::new(self.validator, self.producing.clone())
    }

    /// Analyze an attachment into a report and open it
    ///
    /// # Errors
    /// - `AnalysisError::Composer(Busy)` if another submission is running
    /// - `AnalysisError::Scan` if the analyzer failed
    /// - `AnalysisError::Aggregation` for degenerate findings
    pub async fn analyze(
        &self,
        attachment: &Attachment,
        prompt: Option<&str>,
    ) -> Result<Report, AnalysisError> {
        let Some(_producing) = self.producing.raise() else {
            return Err(ComposerError::Busy.into());
        };

        let result = self.run_pipeline(attachment, prompt).await;
        if let Err(e) = &result {
            tracing::warn!(key = %attachment.key(), error = %e, "analysis failed");
        }
        result
    }

    async fn run_pipeline(
        &self,
        attachment: &Attachment,
        prompt: Option<&str>,
    ) -> Result<Report, AnalysisError> {
        let findings = self.engine.scan(attachment).await?;
        let descriptor = attachment.descriptor();
        let report = match prompt.map(str::trim).filter(|p| !p.is_empty()) {
            Some(prompt) => self.aggregator.aggregate_with_prompt(descriptor, prompt, findings)?,
            None => self.aggregator.aggregate(descriptor, findings)?,
        };
        Ok(self.store.open_with_data(report))
    }

    /// Validate raw upload bytes, then analyze them
    ///
    /// # Errors
    /// `AnalysisError::Validation` if the file is rejected, otherwise see
    /// [`DesignAssistant::analyze`]
    pub async fn analyze_file(
        &self,
        name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<Report, AnalysisError> {
        let attachment = Attachment::upload(&self.validator, name, mime, bytes)?;
        self.analyze(&attachment, None).await
    }

    /// Resolve a link, then analyze it
    ///
    /// # Errors
    /// `AnalysisError::Recognition` if the link is not a design reference,
    /// otherwise see [`DesignAssistant::analyze`]
    pub async fn analyze_link(&self, url: &str) -> Result<Report, AnalysisError> {
        let attachment = Attachment::from_link(url)?;
        self.analyze(&attachment, None).await
    }

    /// Handle a composed message
    ///
    /// A message with an attachment is analyzed; plain text is a chat
    /// question.
    ///
    /// # Errors
    /// See [`DesignAssistant::analyze`]
    pub async fn submit(&self, submission: Submission) -> Result<SendOutcome, AnalysisError> {
        match submission.attachment {
            Some(attachment) => {
                let prompt = Some(submission.text.as_str());
                self.analyze(&attachment, prompt).await.map(SendOutcome::Report)
            }
            None => Ok(SendOutcome::Reply(self.chat.ask(&submission.text).await)),
        }
    }

    /// Send the composer's content
    ///
    /// When the failure is worth retrying the text and attachment are put
    /// back into the composer.
    ///
    /// # Errors
    /// `AnalysisError::Composer` if the composer refuses, otherwise see
    /// [`DesignAssistant::submit`]
    pub async fn send(&self, composer: &mut Composer) -> Result<SendOutcome, AnalysisError> {
        let submission = composer.send()?;
        let kept = submission.clone();
        let outcome = self.submit(submission).await;
        if let Err(e) = &outcome {
            if e.is_retryable() {
                tracing::info!(error = %e, "send failed, composer restored for retry");
                composer.restore(kept);
            }
        }
        outcome
    }
}
