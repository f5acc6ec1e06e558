//! Upload boundary: the raw bytes handed to the extractor and the text it yields.

use bytes::Bytes;
use thiserror::Error;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Observed default upload ceiling (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const PDF_MAGIC: &[u8] = b"%PDF-";
const MIB: usize = 1024 * 1024;

/// Size constraints enforced when a [`RawDocument`] is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_bytes: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadLimits {
    pub fn from_megabytes(mb: usize) -> Self {
        Self {
            max_bytes: mb.saturating_mul(MIB),
        }
    }

    /// The limit in whole MiB, for messages shown to the uploader.
    pub fn max_megabytes(&self) -> usize {
        self.max_bytes / MIB
    }
}

/// Why an upload was refused before any parsing happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("no file provided")]
    MissingFile,

    #[error("file is empty")]
    EmptyFile,

    #[error("file is {size} bytes, maximum is {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("no text provided")]
    NoText,

    /// The request body itself could not be read (bad multipart or JSON framing).
    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

/// An uploaded document: immutable bytes plus the media type they were accepted as.
///
/// Construction enforces the upload invariants (non-empty, within
/// [`UploadLimits`], PDF-compatible), so every `RawDocument` that exists is
/// safe to hand to the extractor.
#[derive(Debug, Clone)]
pub struct RawDocument {
    bytes: Bytes,
    media_type: &'static str,
    file_name: Option<String>,
}

impl RawDocument {
    /// Accept an upload.
    ///
    /// `declared_type` is the client-supplied content type. When it is absent
    /// or generic (`application/octet-stream`), the `%PDF-` signature decides.
    pub fn new(
        bytes: impl Into<Bytes>,
        declared_type: Option<&str>,
        limits: &UploadLimits,
    ) -> Result<Self, InvalidInput> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(InvalidInput::EmptyFile);
        }
        if bytes.len() > limits.max_bytes {
            return Err(InvalidInput::TooLarge {
                size: bytes.len(),
                max: limits.max_bytes,
            });
        }
        let media_type = resolve_media_type(declared_type, &bytes)?;
        Ok(Self {
            bytes,
            media_type,
            file_name: None,
        })
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn media_type(&self) -> &'static str {
        self.media_type
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }
}

fn resolve_media_type(declared: Option<&str>, bytes: &[u8]) -> Result<&'static str, InvalidInput> {
    let declared = declared
        .map(|d| d.split(';').next().unwrap_or(d).trim().to_ascii_lowercase())
        .filter(|d| !d.is_empty());

    match declared.as_deref() {
        Some("application/pdf" | "application/x-pdf" | "application/acrobat") => Ok(PDF_MEDIA_TYPE),
        None | Some("application/octet-stream") if bytes.starts_with(PDF_MAGIC) => {
            Ok(PDF_MEDIA_TYPE)
        }
        Some(other) => Err(InvalidInput::UnsupportedMediaType(other.to_string())),
        None => Err(InvalidInput::UnsupportedMediaType("unknown".to_string())),
    }
}

/// Plain text pulled out of a document. Never empty or whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    /// Wrap extracted text, or `None` if it has no visible content.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl AsRef<str> for ExtractedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
