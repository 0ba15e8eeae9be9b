//! Brandscan Artifacts
//!
//! Everything a design artifact goes through before it can be scanned.
//!
//! # Core Concepts
//!
//! - [`FileValidator`]: size, extension and MIME gatekeeping for uploads
//! - [`ExternalReference`]: a link to an externally hosted design, resolved
//!   into a document key and optional node id
//! - [`Attachment`]: a pending artifact (validated upload or reference)
//! - [`AttachmentDescriptor`]: the serializable record kept in reports
//! - [`ContentHash`]: 32-byte Blake3 hash identifying upload bytes
//!
//! # Example
//!
//! ```rust,ignore
//! use brandscan_artifact::{Attachment, FileValidator};
//!
//! let validator = FileValidator::default();
//! let upload = Attachment::upload(&validator, "hero.png", "image/png", bytes)?;
//! println!("{}", upload.key());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod attachment;
mod hash;
mod reference;
mod validation;

pub use attachment::{
    Attachment, AttachmentDescriptor, AttachmentKey, AttachmentKind, AttachmentPayload,
    ImagePayload,
};
pub use hash::{ContentHash, HashError};
pub use reference::{ExternalReference, RecognitionError, MAX_DISPLAY_NAME, REFERENCE_HOST};
pub use validation::{
    validate, FileClass, FileMeta, FileValidator, ValidationError, ValidationLimits,
    ALLOWED_MIME_TYPES, BLOCKED_EXTENSIONS, MAX_DOCUMENT_BYTES, MAX_IMAGE_BYTES,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
