//! Error types for slide-deck assembly.

use slidesmith_ooxml::OoxmlError;
use thiserror::Error;

/// Result type for PPTX operations
pub type Result<T> = std::result::Result<T, PptxError>;

/// Transport decoding of the theme failed
pub const REASON_MALFORMED_ENCODING: &str = "malformed-encoding";

/// The theme bytes are not a readable package archive
pub const REASON_MALFORMED_CONTAINER: &str = "malformed-container";

/// A part inside the theme package could not be parsed
pub const REASON_MALFORMED_PART: &str = "malformed-part";

/// Errors that can occur while building a slide deck
#[derive(Error, Debug)]
pub enum PptxError {
    /// The supplied theme could not be decoded or read.
    ///
    /// Recovered by [`crate::theme::ThemeOutcome::resolve`]; never surfaces
    /// from the generation pipeline.
    #[error("Theme decode error ({reason}): {detail}")]
    ThemeDecode { reason: &'static str, detail: String },

    /// The document could not be serialized
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// Reserved for stricter slide-text validation; not currently raised
    #[error("Parse error at slide {index}: {reason}")]
    Parse { index: usize, reason: String },

    /// A slide references a master that was never registered
    #[error("Slide {index} references unregistered master '{master}'")]
    DanglingMaster { index: usize, master: String },

    /// A slide names no master although masters are registered
    #[error("Slide {index} has no master but {registered} master(s) are registered")]
    UnassignedMaster { index: usize, registered: usize },

    /// Style configuration error
    #[error("Style configuration error: {reason}")]
    Config { reason: String },

    /// Package (ZIP/relationships) error
    #[error("Package error: {0}")]
    Package(#[from] OoxmlError),

    /// XML parsing error
    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error (for StyleConfig)
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Base64 transport decoding error
    #[error("Transport decoding error: {0}")]
    Transport(#[from] base64::DecodeError),
}

impl PptxError {
    /// Create a theme decode error
    pub fn theme_decode(reason: &'static str, detail: impl ToString) -> Self {
        Self::ThemeDecode {
            reason,
            detail: detail.to_string(),
        }
    }

    /// Create a serialization error
    pub fn serialization(reason: impl Into<String>) -> Self {
        Self::Serialization {
            reason: reason.into(),
        }
    }

    /// Create a dangling master error
    pub fn dangling_master(index: usize, master: impl Into<String>) -> Self {
        Self::DanglingMaster {
            index,
            master: master.into(),
        }
    }

    /// Create a style configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Whether this error belongs to the theme path (and is therefore recoverable)
    pub fn is_theme_error(&self) -> bool {
        matches!(self, Self::ThemeDecode { .. })
    }

    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::ThemeDecode { .. } => "PPTX001",
            Self::Serialization { .. } => "PPTX002",
            Self::Parse { .. } => "PPTX003",
            Self::DanglingMaster { .. } => "PPTX004",
            Self::Config { .. } => "PPTX005",
            Self::Package(_) => "PPTX006",
            Self::XmlError(_) => "PPTX007",
            Self::IoError(_) => "PPTX008",
            Self::TomlError(_) => "PPTX009",
            Self::Transport(_) => "PPTX010",
            Self::UnassignedMaster { .. } => "PPTX011",
        }
    }
}
