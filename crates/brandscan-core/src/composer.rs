//! Message composer with a single pending attachment
//!
//! The composer watches free text and file events and keeps at most one
//! attachment ready to send:
//!
//! | from | event | to |
//! |---|---|---|
//! | `Empty`, `PendingUpload` | text gains a reference link | `PendingReference` |
//! | `PendingReference` (detected) | its link leaves the text | `Empty` |
//! | any | image dropped, pasted or picked | `PendingUpload` |
//! | any | link attached explicitly | `PendingReference` |
//! | pending | dismiss | `Empty` |
//! | any | send | `Empty` |
//!
//! Only the first link in the text counts. Links already in the text when an
//! attachment is dropped, picked, attached or dismissed are not detected
//! again until they leave the text, so the last explicit action always wins.

use crate::error::ComposerError;
use crate::producing::ProducingFlag;
use brandscan_artifact::{
    Attachment, AttachmentKind, ExternalReference, FileValidator, RecognitionError,
    ValidationError,
};
use std::sync::Arc;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// Composer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComposerState {
    Empty,
    PendingReference,
    PendingUpload,
}

/// Composer notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerEvent {
    /// An attachment became pending
    Attached {
        kind: AttachmentKind,
        name: Option<String>,
        /// Whether it replaced another pending attachment
        replaced: bool,
    },
    /// The detected link was removed from the text
    Cleared,
    /// The pending attachment was dismissed
    Dismissed,
    /// The message was sent
    Sent { with_attachment: bool },
}

/// How a file event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// The file is now the pending attachment
    Attached,
    /// Not an image; nothing changed
    Ignored,
}

/// A message ready for the assistant
#[derive(Debug, Clone)]
pub struct Submission {
    pub text: String,
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Clone)]
struct Pending {
    attachment: Attachment,
    /// Link text the reference was detected from
    matched: Option<String>,
}

/// Chat input composer
#[derive(Debug)]
pub struct Composer {
    text: String,
    pending: Option<Pending>,
    /// Links that must not be detected while they stay in the text
    suppressed: Vec<String>,
    validator: FileValidator,
    producing: ProducingFlag,
    events: broadcast::Sender<ComposerEvent>,
}

impl Composer {
    /// Create composer
    #[must_use]
    pub fn new(validator: FileValidator, producing: ProducingFlag) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            text: String::new(),
            pending: None,
            suppressed: Vec::new(),
            validator,
            producing,
            events,
        }
    }

    /// Subscribe to state changes
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ComposerEvent> {
        self.events.subscribe()
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> ComposerState {
        match self.pending.as_ref().map(|p| p.attachment.kind()) {
            None => ComposerState::Empty,
            Some(AttachmentKind::Reference) => ComposerState::PendingReference,
            Some(AttachmentKind::Image) => ComposerState::PendingUpload,
        }
    }

    /// Pending attachment
    #[must_use]
    pub fn pending(&self) -> Option<&Attachment> {
        self.pending.as_ref().map(|p| &p.attachment)
    }

    /// Current text
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether sending is currently refused
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.producing.is_raised()
    }

    fn emit(&self, event: ComposerEvent) {
        let _ = self.events.send(event);
    }

    fn suppress_links_in_text(&mut self) {
        for link in ExternalReference::find_all(&self.text) {
            if !self.suppressed.iter().any(|s| s == link) {
                self.suppressed.push(link.to_string());
            }
        }
    }

    /// First link in `links` that may be detected and resolves
    fn detectable(&self, links: &[&str]) -> Option<(String, ExternalReference)> {
        let link = links
            .iter()
            .find(|l| !self.suppressed.iter().any(|s| s == *l))?;
        match ExternalReference::parse(link) {
            Ok(reference) => Some(((*link).to_string(), reference)),
            Err(e) => {
                tracing::debug!(error = %e, "link in text did not resolve");
                None
            }
        }
    }

    fn attach(&mut self, attachment: Attachment, matched: Option<String>) {
        let replaced = self.pending.take();
        if matched.is_none() {
            self.suppress_links_in_text();
        }
        tracing::debug!(
            kind = ?attachment.kind(),
            name = attachment.display_name().unwrap_or_default(),
            replaced = replaced.is_some(),
            "attachment pending"
        );
        self.emit(ComposerEvent::Attached {
            kind: attachment.kind(),
            name: attachment.display_name().map(str::to_string),
            replaced: replaced.is_some(),
        });
        self.pending = Some(Pending { attachment, matched });
    }

    /// Replace the text, detecting reference links
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();

        let text = self.text.clone();
        let links: Vec<&str> = ExternalReference::find_all(&text).collect();
        self.suppressed.retain(|s| links.contains(&s.as_str()));

        let detected = self.pending.as_ref().and_then(|p| p.matched.clone());
        if let Some(current) = detected {
            if links.contains(&current.as_str()) {
                return;
            }
            // The link was removed or edited in place
            match self.detectable(&links) {
                Some((link, reference)) => self.attach(Attachment::reference(reference), Some(link)),
                None => {
                    self.pending = None;
                    tracing::debug!("detected link removed from text");
                    self.emit(ComposerEvent::Cleared);
                }
            }
            return;
        }

        if self.state() == ComposerState::PendingReference {
            return;
        }

        if let Some((link, reference)) = self.detectable(&links) {
            self.attach(Attachment::reference(reference), Some(link));
        }
    }

    fn take_file(
        &mut self,
        source: &'static str,
        name: &str,
        mime: &str,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<FileOutcome, ValidationError> {
        let is_image = mime.trim().to_ascii_lowercase().starts_with("image/");
        if !is_image {
            tracing::debug!(source, file = name, mime, "non-image input ignored");
            return Ok(FileOutcome::Ignored);
        }
        let attachment = Attachment::upload(&self.validator, name, mime, bytes).map_err(|e| {
            tracing::info!(source, file = name, error = %e, "upload rejected");
            e
        })?;
        self.attach(attachment, None);
        Ok(FileOutcome::Attached)
    }

    /// Handle a dropped file
    ///
    /// # Errors
    /// Any [`ValidationError`]; state is unchanged on error
    pub fn drop_file(
        &mut self,
        name: &str,
        mime: &str,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<FileOutcome, ValidationError> {
        self.take_file("drop", name, mime, bytes)
    }

    /// Handle pasted clipboard content
    ///
    /// # Errors
    /// Any [`ValidationError`]; state is unchanged on error
    pub fn paste(
        &mut self,
        name: &str,
        mime: &str,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<FileOutcome, ValidationError> {
        self.take_file("paste", name, mime, bytes)
    }

    /// Handle a file chosen in the picker
    ///
    /// # Errors
    /// Any [`ValidationError`]; state is unchanged on error
    pub fn pick(
        &mut self,
        name: &str,
        mime: &str,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<FileOutcome, ValidationError> {
        self.take_file("picker", name, mime, bytes)
    }

    /// Attach a reference link explicitly
    ///
    /// # Errors
    /// Any [`RecognitionError`]; state is unchanged on error
    pub fn attach_link(&mut self, url: &str) -> Result<(), RecognitionError> {
        let attachment = Attachment::from_link(url)?;
        self.attach(attachment, None);
        Ok(())
    }

    /// Drop the pending attachment
    pub fn dismiss(&mut self) {
        if self.pending.take().is_none() {
            return;
        }
        self.suppress_links_in_text();
        tracing::debug!("attachment dismissed");
        self.emit(ComposerEvent::Dismissed);
    }

    /// Take the text and pending attachment for sending
    ///
    /// # Errors
    /// - `ComposerError::Busy` while a submission is being produced
    /// - `ComposerError::Empty` if there is no text and no attachment
    pub fn send(&mut self) -> Result<Submission, ComposerError> {
        if self.producing.is_raised() {
            return Err(ComposerError::Busy);
        }
        if self.text.trim().is_empty() && self.pending.is_none() {
            return Err(ComposerError::Empty);
        }
        let attachment = self.pending.take().map(|p| p.attachment);
        let text = std::mem::take(&mut self.text).trim().to_string();
        self.suppressed.clear();
        self.emit(ComposerEvent::Sent {
            with_attachment: attachment.is_some(),
        });
        Ok(Submission { text, attachment })
    }

    /// Put back a submission that could not be delivered
    ///
    /// The text and attachment come back as they were sent. A reference whose
    /// link is still in the text keeps following that link.
    pub fn restore(&mut self, submission: Submission) {
        self.text = submission.text;
        self.pending = None;
        self.suppressed.clear();
        let Some(attachment) = submission.attachment else {
            return;
        };
        let matched = attachment
            .as_reference()
            .map(|r| r.url.as_str())
            .filter(|url| ExternalReference::find_all(&self.text).any(|l| l == *url))
            .map(str::to_string);
        tracing::debug!(detected = matched.is_some(), "submission restored");
        self.attach(attachment, matched);
    }
}
