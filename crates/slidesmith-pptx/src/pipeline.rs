//! Request handling: slide texts and an optional theme in, an encoded deck out.
//!
//! The steps always run in the same order: resolve the theme, register its
//! masters, assemble and append slides, serialize. Theme problems are
//! absorbed on the way; anything else fails the request as a whole.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::assembler::SlideAssembler;
use crate::document::DocumentBuilder;
use crate::error::{PptxError, Result};
use crate::parser::SlideBlock;
use crate::style::StyleConfig;
use crate::theme::ThemeOutcome;
use crate::transport;

/// Message returned alongside a generated deck
pub const SUCCESS_MESSAGE: &str = "Presentation generated successfully";

/// A generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Raw text of each slide, in order
    pub slides: Vec<String>,

    /// Base64-encoded theme package
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

/// A successful response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Base64-encoded `.pptx`
    pub file: String,

    pub message: String,
}

/// A failed response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&PptxError> for ErrorResponse {
    fn from(err: &PptxError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

/// Runs generation requests with a fixed style
#[derive(Debug, Clone, Default)]
pub struct Generator {
    style: StyleConfig,
}

impl Generator {
    /// Create a generator
    pub fn new(style: StyleConfig) -> Self {
        Self { style }
    }

    /// The style decks are rendered with
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Build a `.pptx` from slide texts and an optional encoded theme
    pub fn generate_document(&self, slides: &[String], theme: Option<&str>) -> Result<Vec<u8>> {
        let outcome = ThemeOutcome::resolve(theme);
        debug!("Theme applied: {}", outcome.is_themed());

        let mut builder = DocumentBuilder::with_style(self.style.clone());
        builder.register_masters(outcome);

        let blocks = SlideBlock::sequence(slides.iter().map(String::as_str));
        let specs = SlideAssembler::new(&self.style).assemble(&blocks, builder.masters());
        builder.append_slides(specs)?;

        builder.serialize()
    }

    /// Handle a request end to end, encoding the deck for transport
    pub fn handle(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let bytes = self.generate_document(&request.slides, request.theme.as_deref())?;
        info!(
            "Generated presentation: {} slide(s), {} bytes",
            request.slides.len(),
            bytes.len()
        );

        Ok(GenerationResponse {
            file: transport::encode(&bytes),
            message: SUCCESS_MESSAGE.to_string(),
        })
    }
}
