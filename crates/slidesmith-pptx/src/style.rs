//! Built-in visual style and its TOML configuration.
//!
//! [`StyleConfig`] is the style applied when no theme is supplied (and the
//! source of text sizes/colours in every case). It is a plain value handed
//! to the assembler and document builder at construction time.
//!
//! ```toml
//! [meta]
//! locale = "fr-FR"
//! title = "Bilan annuel"
//!
//! [text]
//! color = "1F2937"
//! title_slide_size = 48
//!
//! [slide]
//! background = "F8FAFC"
//! ```

use crate::constants::{
    DEFAULT_SLIDE_HEIGHT_EMU, DEFAULT_SLIDE_WIDTH_EMU, MAX_SLIDE_EXTENT_EMU, MIN_SLIDE_EXTENT_EMU,
};
use crate::error::{PptxError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Style configuration for generated decks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Document metadata
    #[serde(default)]
    pub meta: StyleMeta,

    /// Text sizes and colour
    #[serde(default)]
    pub text: TextStyle,

    /// Slide size and background
    #[serde(default)]
    pub slide: SlideStyle,

    /// Theme fonts used when no theme supplies them
    #[serde(default)]
    pub fonts: FontStyle,
}

/// Document metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleMeta {
    /// Language tag written on every text run (e.g., "en-US", "fr-FR")
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Presentation title (docProps/core.xml)
    #[serde(default = "default_title")]
    pub title: String,

    /// Author (docProps/core.xml)
    #[serde(default = "default_author")]
    pub author: String,
}

fn default_locale() -> String {
    "en-US".to_string()
}
fn default_title() -> String {
    "Presentation".to_string()
}
fn default_author() -> String {
    "slidesmith".to_string()
}

/// Text sizes (points) and colour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Text colour (hex RGB)
    #[serde(default = "default_text_color")]
    pub color: String,

    /// Title slide heading size
    #[serde(default = "default_title_slide_size")]
    pub title_slide_size: u32,

    /// Content slide heading size
    #[serde(default = "default_heading_size")]
    pub heading_size: u32,

    /// Bullet text size
    #[serde(default = "default_body_size")]
    pub body_size: u32,
}

fn default_text_color() -> String {
    "363636".to_string()
}
fn default_title_slide_size() -> u32 {
    44
}
fn default_heading_size() -> u32 {
    32
}
fn default_body_size() -> u32 {
    24
}

/// Slide size (EMU) and background
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideStyle {
    /// Slide width in EMU
    #[serde(default = "default_width")]
    pub width: i64,

    /// Slide height in EMU
    #[serde(default = "default_height")]
    pub height: i64,

    /// Background colour (hex RGB)
    #[serde(default = "default_background")]
    pub background: String,
}

fn default_width() -> i64 {
    DEFAULT_SLIDE_WIDTH_EMU
}
fn default_height() -> i64 {
    DEFAULT_SLIDE_HEIGHT_EMU
}
fn default_background() -> String {
    "FFFFFF".to_string()
}

/// Theme font pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontStyle {
    /// Heading font
    #[serde(default = "default_major_font")]
    pub major: String,

    /// Body font
    #[serde(default = "default_minor_font")]
    pub minor: String,
}

fn default_major_font() -> String {
    "Calibri Light".to_string()
}
fn default_minor_font() -> String {
    "Calibri".to_string()
}

impl Default for StyleMeta {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            title: default_title(),
            author: default_author(),
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: default_text_color(),
            title_slide_size: default_title_slide_size(),
            heading_size: default_heading_size(),
            body_size: default_body_size(),
        }
    }
}

impl Default for SlideStyle {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            background: default_background(),
        }
    }
}

impl Default for FontStyle {
    fn default() -> Self {
        Self {
            major: default_major_font(),
            minor: default_minor_font(),
        }
    }
}

impl StyleConfig {
    /// Load a StyleConfig from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse and validate a StyleConfig from a TOML string
    pub fn parse(toml_content: &str) -> Result<Self> {
        let config: StyleConfig = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Override the language tag
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.meta.locale = locale.into();
        self
    }

    /// Check values the serializer relies on
    pub fn validate(&self) -> Result<()> {
        for (name, color) in [
            ("text.color", &self.text.color),
            ("slide.background", &self.slide.background),
        ] {
            if !is_hex_rgb(color) {
                return Err(PptxError::config(format!(
                    "{} must be six hex digits, got '{}'",
                    name, color
                )));
            }
        }

        for (name, size) in [
            ("text.title_slide_size", self.text.title_slide_size),
            ("text.heading_size", self.text.heading_size),
            ("text.body_size", self.text.body_size),
        ] {
            if !(1..=4000).contains(&size) {
                return Err(PptxError::config(format!(
                    "{} must be between 1 and 4000 points, got {}",
                    name, size
                )));
            }
        }

        let extent = MIN_SLIDE_EXTENT_EMU..=MAX_SLIDE_EXTENT_EMU;
        if !extent.contains(&self.slide.width) || !extent.contains(&self.slide.height) {
            return Err(PptxError::config(format!(
                "slide width and height must be between {} and {} EMU",
                MIN_SLIDE_EXTENT_EMU, MAX_SLIDE_EXTENT_EMU
            )));
        }

        if self.meta.locale.trim().is_empty() {
            return Err(PptxError::config("meta.locale must not be empty"));
        }

        Ok(())
    }
}

/// Six hex digits, no leading `#`
pub(crate) fn is_hex_rgb(value: &str) -> bool {
    value.len() == 6 && value.chars().all(|c| c.is_ascii_hexdigit())
}
