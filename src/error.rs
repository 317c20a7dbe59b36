//! Error types for the data-to-layout pipeline

use thiserror::Error;

use crate::document::DocumentError;

/// Errors that abort a pipeline run
///
/// Every variant is fail-fast: the orchestrator stops at the first one and
/// reports it, nothing is retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The `size` descriptor did not contain a `<width>x<height>` pair
    #[error("Invalid size format in the spreadsheet: '{value}'")]
    InvalidSize { value: String },

    /// A required column is missing from a row
    #[error("Required property \"{field}\" has not been found in {label}")]
    MissingRequiredField { field: String, label: String },

    /// A required column is present but empty on a non-blank row
    #[error("Required property \"{field}\" is empty in {label}")]
    EmptyRequiredField { field: String, label: String },

    /// The page holding the template library does not exist
    #[error("Can not find page '{page}' with templates, please add it to the document")]
    TemplateRootMissing { page: String },

    /// No group in the template library is named after the row's size
    #[error("Can not find template set for size {size}")]
    SizeGroupMissing { size: String },

    /// No variant in the size group matches the canonical variant key
    #[error("Can not find variant {{{key}}} for size {size}")]
    VariantNotFound { key: String, size: String },

    /// A content field is configured with a kind the filler does not know
    #[error("Wrong content kind '{kind}' configured for field {field}")]
    UnsupportedContentKind { kind: String, field: String },

    /// An image field holds something that is not a base64 payload
    #[error("Image data in field {field} is not valid base64: {source}")]
    InvalidImageData {
        field: String,
        #[source]
        source: base64::DecodeError,
    },

    /// A required font could not be loaded before the row loop
    #[error("Font {family} {style} is not available")]
    FontUnavailable { family: String, style: String },

    /// Update requested with nothing selected on the canvas
    #[error("Nothing is selected")]
    NoSelection,

    /// A selected node has no row with a matching reporting label
    #[error("No data found for element {name}")]
    NoMatchingRow { name: String },

    /// A row references an image that is not in the persistent cache
    #[error("Image {key} is not in the cache")]
    CacheMiss { key: String },

    /// A request arrived after the session was closed
    #[error("session is closed")]
    SessionClosed,

    /// Failure reported by the host document
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl PipelineError {
    /// Create an invalid size error
    pub fn invalid_size(value: impl Into<String>) -> Self {
        Self::InvalidSize {
            value: value.into(),
        }
    }

    /// Create a missing required field error
    pub fn missing_field(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
            label: label.into(),
        }
    }

    /// Create an empty required field error
    pub fn empty_field(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self::EmptyRequiredField {
            field: field.into(),
            label: label.into(),
        }
    }

    /// Stable kebab-case identifier of the error kind, used in UI messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidSize { .. } => "format-error",
            Self::MissingRequiredField { .. } => "missing-required-field",
            Self::EmptyRequiredField { .. } => "empty-required-field",
            Self::TemplateRootMissing { .. } => "template-root-missing",
            Self::SizeGroupMissing { .. } => "size-group-missing",
            Self::VariantNotFound { .. } => "variant-not-found",
            Self::UnsupportedContentKind { .. } => "unsupported-content-kind",
            Self::InvalidImageData { .. } => "invalid-image-data",
            Self::FontUnavailable { .. } => "font-unavailable",
            Self::NoSelection => "no-selection",
            Self::NoMatchingRow { .. } => "no-matching-row",
            Self::CacheMiss { .. } => "cache-miss",
            Self::SessionClosed => "session-closed",
            Self::Document(_) => "document-error",
        }
    }
}

/// Convenience alias used across the crate
pub type PipelineResult<T> = Result<T, PipelineError>;
