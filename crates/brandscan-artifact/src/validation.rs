//! Upload gatekeeping
//!
//! Every uploaded file passes through [`FileValidator::validate`] before any
//! other component sees it. Checks run in a fixed order:
//! 1. size limit for the detected class (image or document)
//! 2. executable/script extension deny-list, regardless of declared MIME type
//! 3. vector images, which cannot be sanitized yet
//! 4. declared MIME type allow-list
//!
//! The validator is pure: it only inspects metadata and never stores anything.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bytes in one mebibyte
const MIB: u64 = 1024 * 1024;

/// Default image limit (10 MiB)
pub const MAX_IMAGE_BYTES: u64 = 10 * MIB;

/// Default document limit (5 MiB)
pub const MAX_DOCUMENT_BYTES: u64 = 5 * MIB;

/// Extensions that are never accepted, whatever the declared MIME type says
pub const BLOCKED_EXTENSIONS: &[&str] = &[
    "exe", "sh", "bat", "cmd", "com", "pif", "scr", "vbs", "js", "jar",
];

/// Declared MIME types accepted for analysis
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg", "application/pdf"];

const VECTOR_MIME_TYPE: &str = "image/svg+xml";
const VECTOR_EXTENSION: &str = "svg";
const DOCUMENT_MIME_TYPE: &str = "application/pdf";

/// Metadata of a file offered for upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    /// File name as supplied by the user agent
    pub name: String,
    /// Declared MIME type
    pub mime: String,
    /// Size in bytes
    pub size: u64,
}

impl FileMeta {
    /// Create new file metadata
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, mime: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            size,
        }
    }

    /// Declared MIME type, lowercased and without parameters
    #[must_use]
    pub fn essence(&self) -> String {
        mime_essence(&self.mime)
    }

    /// Lowercased extension of the file name, if any
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let name = self.name.trim();
        let (_, ext) = name.rsplit_once('.')?;
        if ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Whether the declared MIME type is an image type
    #[inline]
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.essence().starts_with("image/")
    }
}

/// Size class a file is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileClass {
    /// Raster or vector image
    Image,
    /// Document such as PDF
    Document,
}

impl FileClass {
    /// Detect the class from a declared MIME type
    #[must_use]
    pub fn detect(mime: &str) -> Option<Self> {
        let essence = mime_essence(mime);
        if essence.starts_with("image/") {
            Some(Self::Image)
        } else if essence == DOCUMENT_MIME_TYPE {
            Some(Self::Document)
        } else {
            None
        }
    }
}

impl fmt::Display for FileClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => f.write_str("Image"),
            Self::Document => f.write_str("Document"),
        }
    }
}

/// Byte limits per file class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    /// Maximum image size in bytes
    pub max_image_bytes: u64,
    /// Maximum document size in bytes
    pub max_document_bytes: u64,
}

impl ValidationLimits {
    /// Limit for a class
    #[inline]
    #[must_use]
    pub fn limit_for(&self, class: FileClass) -> u64 {
        match class {
            FileClass::Image => self.max_image_bytes,
            FileClass::Document => self.max_document_bytes,
        }
    }
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_image_bytes: MAX_IMAGE_BYTES,
            max_document_bytes: MAX_DOCUMENT_BYTES,
        }
    }
}

/// Reasons an upload is rejected before scanning
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// File exceeds the limit for its class
    #[error("{class} file is too large ({size} bytes). Maximum size is {}MB.", mib(.limit))]
    SizeExceeded {
        class: FileClass,
        size: u64,
        limit: u64,
    },

    /// Executable or script extension
    #[error("'.{extension}' files are not allowed for security reasons.")]
    BlockedExtension { extension: String },

    /// Vector images cannot be sanitized yet
    #[error("SVG files are not currently supported for security reasons.")]
    VectorImage,

    /// Declared MIME type outside the allow-list
    #[error("Only PNG, JPG, and PDF files are supported (got '{mime}').")]
    UnsupportedType { mime: String },
}

impl ValidationError {
    /// Whether the rejection is a security rejection rather than a format one
    #[inline]
    #[must_use]
    pub fn is_security_rejection(&self) -> bool {
        matches!(self, Self::BlockedExtension { .. } | Self::VectorImage)
    }
}

/// Stateless upload validator
#[derive(Debug, Clone, Copy, Default)]
pub struct FileValidator {
    limits: ValidationLimits,
}

impl FileValidator {
    /// Create validator with the given limits
    #[inline]
    #[must_use]
    pub fn new(limits: ValidationLimits) -> Self {
        Self { limits }
    }

    /// Configured limits
    #[inline]
    #[must_use]
    pub fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    /// Validate file metadata
    ///
    /// # Returns
    /// The detected file class when the file is acceptable
    ///
    /// # Errors
    /// - `ValidationError::SizeExceeded` if the file is over its class limit
    /// - `ValidationError::BlockedExtension` for executable/script names
    /// - `ValidationError::VectorImage` for SVG uploads
    /// - `ValidationError::UnsupportedType` for anything outside the allow-list
    pub fn validate(&self, meta: &FileMeta) -> Result<FileClass, ValidationError> {
        let essence = meta.essence();
        let class = FileClass::detect(&essence);

        if let Some(class) = class {
            let limit = self.limits.limit_for(class);
            if meta.size > limit {
                tracing::debug!(file = %meta.name, size = meta.size, limit, "upload over size limit");
                return Err(ValidationError::SizeExceeded {
                    class,
                    size: meta.size,
                    limit,
                });
            }
        }

        let extension = meta.extension();
        if let Some(ext) = extension.as_deref() {
            if BLOCKED_EXTENSIONS.contains(&ext) {
                tracing::warn!(file = %meta.name, mime = %essence, "blocked extension");
                return Err(ValidationError::BlockedExtension {
                    extension: ext.to_string(),
                });
            }
        }

        if essence == VECTOR_MIME_TYPE || extension.as_deref() == Some(VECTOR_EXTENSION) {
            return Err(ValidationError::VectorImage);
        }

        if !ALLOWED_MIME_TYPES.contains(&essence.as_str()) {
            return Err(ValidationError::UnsupportedType { mime: essence });
        }

        // Allow-listed types always have a class
        Ok(class.unwrap_or(FileClass::Document))
    }
}

/// Validate with default limits
///
/// # Errors
/// See [`FileValidator::validate`]
pub fn validate(meta: &FileMeta) -> Result<FileClass, ValidationError> {
    FileValidator::default().validate(meta)
}

fn mib(bytes: &u64) -> u64 {
    bytes / MIB
}

fn mime_essence(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_png_jpeg_pdf() {
        assert_eq!(validate(&FileMeta::new("a.png", "image/png", 10)), Ok(FileClass::Image));
        assert_eq!(validate(&FileMeta::new("a.jpg", "image/jpeg", 10)), Ok(FileClass::Image));
        assert_eq!(
            validate(&FileMeta::new("brief.pdf", "application/pdf", 10)),
            Ok(FileClass::Document)
        );
    }

    #[test]
    fn size_limit_depends_on_class() {
        let big_image = FileMeta::new("a.png", "image/png", MAX_IMAGE_BYTES + 1);
        let err = validate(&big_image).unwrap_err();
        assert!(matches!(err, ValidationError::SizeExceeded { class: FileClass::Image, .. }));
        assert!(err.to_string().contains("10MB"));

        // 6 MiB is fine for an image but not for a document
        let six = 6 * MIB;
        assert!(validate(&FileMeta::new("a.png", "image/png", six)).is_ok());
        let err = validate(&FileMeta::new("a.pdf", "application/pdf", six)).unwrap_err();
        assert!(err.to_string().contains("5MB"));
    }

    #[test]
    fn exactly_at_limit_is_accepted() {
        let meta = FileMeta::new("a.png", "image/png", MAX_IMAGE_BYTES);
        assert!(validate(&meta).is_ok());
    }

    #[test]
    fn blocked_extension_wins_over_mime() {
        let err = validate(&FileMeta::new("payload.exe", "image/png", 100)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::BlockedExtension {
                extension: "exe".to_string()
            }
        );
        assert!(err.is_security_rejection());
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let err = validate(&FileMeta::new("RUN.SH", "application/pdf", 1)).unwrap_err();
        assert!(matches!(err, ValidationError::BlockedExtension { .. }));
    }

    #[test]
    fn svg_has_distinct_message() {
        let err = validate(&FileMeta::new("logo.svg", "image/svg+xml", 100)).unwrap_err();
        assert_eq!(err, ValidationError::VectorImage);
        assert!(err.to_string().contains("SVG"));
    }

    #[test]
    fn unsupported_type() {
        let err = validate(&FileMeta::new("a.gif", "image/gif", 100)).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedType { .. }));
        let err = validate(&FileMeta::new("notes.txt", "text/plain", 100)).unwrap_err();
        assert!(!err.is_security_rejection());
    }

    #[test]
    fn mime_parameters_are_ignored() {
        let meta = FileMeta::new("a.png", "IMAGE/PNG; q=1", 10);
        assert!(validate(&meta).is_ok());
    }

    #[test]
    fn custom_limits() {
        let validator = FileValidator::new(ValidationLimits {
            max_image_bytes: 100,
            max_document_bytes: 50,
        });
        assert!(validator.validate(&FileMeta::new("a.png", "image/png", 101)).is_err());
        assert!(validator.validate(&FileMeta::new("a.pdf", "application/pdf", 50)).is_ok());
    }

    #[test]
    fn extension_parsing() {
        assert_eq!(FileMeta::new("a.b.PNG", "", 0).extension().as_deref(), Some("png"));
        assert_eq!(FileMeta::new("noext", "", 0).extension(), None);
        assert_eq!(FileMeta::new("trailing.", "", 0).extension(), None);
    }
}
