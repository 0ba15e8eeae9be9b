//! Design attachments
//!
//! An [`Attachment`] is a design artifact waiting to be analysed: either an
//! uploaded image (bytes that already passed validation) or a resolved
//! external reference. It is transient; once submitted, only its
//! [`AttachmentDescriptor`] lives on inside the report.

use crate::hash::ContentHash;
use crate::reference::{ExternalReference, RecognitionError};
use crate::validation::{FileClass, FileMeta, FileValidator, ValidationError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Attachment modality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    /// Local upload
    Image,
    /// External design reference
    Reference,
}

/// Validated upload bytes
#[derive(Clone)]
pub struct ImagePayload {
    meta: FileMeta,
    class: FileClass,
    hash: ContentHash,
    bytes: Arc<[u8]>,
}

impl ImagePayload {
    /// File metadata
    #[inline]
    #[must_use]
    pub fn meta(&self) -> &FileMeta {
        &self.meta
    }

    /// Detected class
    #[inline]
    #[must_use]
    pub fn class(&self) -> FileClass {
        self.class
    }

    /// Content hash of the bytes
    #[inline]
    #[must_use]
    pub fn hash(&self) -> ContentHash {
        self.hash
    }

    /// Raw bytes
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("meta", &self.meta)
            .field("class", &self.class)
            .field("hash", &self.hash.short())
            .finish_non_exhaustive()
    }
}

/// What an attachment carries
#[derive(Debug, Clone)]
pub enum AttachmentPayload {
    /// Uploaded file
    Image(ImagePayload),
    /// Resolved external reference
    Reference(ExternalReference),
}

/// Key identifying an attachment for in-flight tracking
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttachmentKey {
    /// Upload, keyed by content
    Upload(ContentHash),
    /// Reference, keyed by document and node
    Reference(String),
}

impl fmt::Display for AttachmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload(hash) => write!(f, "upload:{}", hash.short()),
            Self::Reference(key) => write!(f, "reference:{key}"),
        }
    }
}

/// A pending design artifact
#[derive(Debug, Clone)]
pub struct Attachment {
    payload: AttachmentPayload,
    preview: Option<String>,
    display_name: Option<String>,
}

impl Attachment {
    /// Validate an upload and wrap it as an attachment
    ///
    /// The declared size is taken from the bytes themselves. Images get a
    /// `data:` URL preview.
    ///
    /// # Errors
    /// Any [`ValidationError`] raised by `validator`
    pub fn upload(
        validator: &FileValidator,
        name: impl Into<String>,
        mime: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<Self, ValidationError> {
        let bytes: Arc<[u8]> = bytes.into();
        let meta = FileMeta::new(name, mime, bytes.len() as u64);
        let class = validator.validate(&meta)?;
        let hash = ContentHash::compute(&bytes);

        let preview = (class == FileClass::Image).then(|| data_url(&meta.essence(), &bytes));
        let display_name = Some(meta.name.clone());

        tracing::debug!(file = %meta.name, hash = %hash.short(), "upload accepted");

        Ok(Self {
            payload: AttachmentPayload::Image(ImagePayload {
                meta,
                class,
                hash,
                bytes,
            }),
            preview,
            display_name,
        })
    }

    /// Wrap an already resolved reference
    #[must_use]
    pub fn reference(reference: ExternalReference) -> Self {
        let display_name = Some(reference.display_name());
        Self {
            payload: AttachmentPayload::Reference(reference),
            preview: None,
            display_name,
        }
    }

    /// Resolve a link and wrap it as an attachment
    ///
    /// # Errors
    /// Any [`RecognitionError`] from [`ExternalReference::parse`]
    pub fn from_link(url: &str) -> Result<Self, RecognitionError> {
        ExternalReference::parse(url).map(Self::reference)
    }

    /// Attachment modality
    #[inline]
    #[must_use]
    pub fn kind(&self) -> AttachmentKind {
        match self.payload {
            AttachmentPayload::Image(_) => AttachmentKind::Image,
            AttachmentPayload::Reference(_) => AttachmentKind::Reference,
        }
    }

    /// Payload
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &AttachmentPayload {
        &self.payload
    }

    /// Preview (data URL for uploads)
    #[inline]
    #[must_use]
    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    /// Attach a preview, e.g. a thumbnail fetched for a reference
    #[inline]
    #[must_use]
    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        self.preview = Some(preview.into());
        self
    }

    /// Display name
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// The reference, if this is one
    #[inline]
    #[must_use]
    pub fn as_reference(&self) -> Option<&ExternalReference> {
        match &self.payload {
            AttachmentPayload::Reference(r) => Some(r),
            AttachmentPayload::Image(_) => None,
        }
    }

    /// In-flight tracking key
    #[must_use]
    pub fn key(&self) -> AttachmentKey {
        match &self.payload {
            AttachmentPayload::Image(img) => AttachmentKey::Upload(img.hash),
            AttachmentPayload::Reference(r) => AttachmentKey::Reference(r.to_string()),
        }
    }

    /// Serializable summary kept inside reports and chat messages
    #[must_use]
    pub fn descriptor(&self) -> AttachmentDescriptor {
        match &self.payload {
            AttachmentPayload::Image(img) => AttachmentDescriptor::Image {
                name: img.meta.name.clone(),
                mime: img.meta.essence(),
                size: img.meta.size,
                hash: img.hash,
            },
            AttachmentPayload::Reference(r) => AttachmentDescriptor::Reference {
                name: self
                    .display_name
                    .clone()
                    .unwrap_or_else(|| r.display_name()),
                reference: r.clone(),
            },
        }
    }
}

/// Source attachment as recorded in a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AttachmentDescriptor {
    /// Uploaded file
    Image {
        name: String,
        mime: String,
        size: u64,
        hash: ContentHash,
    },
    /// External reference
    Reference {
        name: String,
        reference: ExternalReference,
    },
}

impl AttachmentDescriptor {
    /// Display name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Image { name, .. } | Self::Reference { name, .. } => name,
        }
    }

    /// Attachment modality
    #[must_use]
    pub fn kind(&self) -> AttachmentKind {
        match self {
            Self::Image { .. } => AttachmentKind::Image,
            Self::Reference { .. } => AttachmentKind::Reference,
        }
    }
}

fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];

    #[test]
    fn upload_builds_preview_and_hash() {
        let att = Attachment::upload(&FileValidator::default(), "banner.png", "image/png", PNG_MAGIC.to_vec())
            .unwrap();
        assert_eq!(att.kind(), AttachmentKind::Image);
        assert_eq!(att.display_name(), Some("banner.png"));
        assert_eq!(att.preview(), Some("data:image/png;base64,iVBORw=="));
        assert_eq!(att.key(), AttachmentKey::Upload(ContentHash::compute(PNG_MAGIC)));
    }

    #[test]
    fn pdf_has_no_preview() {
        let att =
            Attachment::upload(&FileValidator::default(), "brief.pdf", "application/pdf", b"%PDF".to_vec())
                .unwrap();
        assert!(att.preview().is_none());
    }

    #[test]
    fn upload_rejects_invalid_file() {
        let err = Attachment::upload(&FileValidator::default(), "payload.exe", "image/png", vec![0u8; 4])
            .unwrap_err();
        assert!(matches!(err, ValidationError::BlockedExtension { .. }));
    }

    #[test]
    fn reference_descriptor_carries_key_and_node() {
        let att = Attachment::from_link("https://figma.com/design/abc/Hero?node-id=1-2").unwrap();
        assert_eq!(att.kind(), AttachmentKind::Reference);
        assert_eq!(att.key(), AttachmentKey::Reference("abc#1:2".to_string()));
        match att.descriptor() {
            AttachmentDescriptor::Reference { name, reference } => {
                assert_eq!(name, "Hero");
                assert_eq!(reference.document_key, "abc");
                assert_eq!(reference.node_id.as_deref(), Some("1:2"));
            }
            other => panic!("expected reference descriptor, got {other:?}"),
        }
    }

    #[test]
    fn descriptor_serializes_with_type_tag() {
        let att = Attachment::from_link("https://figma.com/file/k1").unwrap();
        let json = serde_json::to_value(att.descriptor()).unwrap();
        assert_eq!(json["type"], "reference");
        assert_eq!(json["reference"]["document_key"], "k1");
    }
}
