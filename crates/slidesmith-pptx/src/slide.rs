//! Slide data structures.
//!
//! This module defines the intermediate representation between slide text
//! and PPTX generation. Geometry is expressed as a percentage of the slide,
//! converted to EMU only at serialization time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PptxError, Result};

/// One coordinate of a text box, relative to the slide
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    /// Percentage of the slide width or height
    Percent(f64),

    /// Sized from the content at serialization time
    Auto,
}

impl Dimension {
    /// Resolve against a slide extent in EMU (`Auto` yields `None`)
    pub fn to_emu(&self, extent: i64) -> Option<i64> {
        match self {
            Self::Percent(p) => Some((extent as f64 * p / 100.0).round() as i64),
            Self::Auto => None,
        }
    }

    fn percent(&self) -> Option<f64> {
        match self {
            Self::Percent(p) => Some(*p),
            Self::Auto => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(p) => write!(f, "{}%", p),
            Self::Auto => f.write_str("auto"),
        }
    }
}

impl FromStr for Dimension {
    type Err = PptxError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        s.strip_suffix('%')
            .and_then(|n| n.trim().parse::<f64>().ok())
            .map(Self::Percent)
            .ok_or_else(|| PptxError::serialization(format!("invalid dimension '{}'", s)))
    }
}

/// Position and size of a text box as percentages of the slide
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxGeometry {
    pub x: Dimension,
    pub y: Dimension,
    pub w: Dimension,
    pub h: Dimension,
}

impl BoxGeometry {
    /// Geometry with fixed position and width and content-sized height
    pub fn auto_height(x: f64, y: f64, w: f64) -> Self {
        Self {
            x: Dimension::Percent(x),
            y: Dimension::Percent(y),
            w: Dimension::Percent(w),
            h: Dimension::Auto,
        }
    }

    /// Parse from the `"5%"`-style string form
    pub fn parse(x: &str, y: &str, w: &str, h: &str) -> Result<Self> {
        Ok(Self {
            x: x.parse()?,
            y: y.parse()?,
            w: w.parse()?,
            h: h.parse()?,
        })
    }

    /// Check that the box lies on the slide
    ///
    /// Position and width must be percentages; every percentage must be
    /// finite and within 0..=100, and the box must not extend past the
    /// right or bottom edge.
    pub fn validate(&self) -> Result<()> {
        let (x, y, w) = match (self.x.percent(), self.y.percent(), self.w.percent()) {
            (Some(x), Some(y), Some(w)) => (x, y, w),
            _ => {
                return Err(PptxError::serialization(format!(
                    "only height may be auto, got {}",
                    self
                )))
            }
        };

        let values = [Some(x), Some(y), Some(w), self.h.percent()];
        if values
            .iter()
            .flatten()
            .any(|v| !v.is_finite() || *v < 0.0 || *v > 100.0)
        {
            return Err(PptxError::serialization(format!(
                "geometry out of range: {}",
                self
            )));
        }

        if x + w > 100.0 + f64::EPSILON {
            return Err(PptxError::serialization(format!(
                "box extends past the right edge: {}",
                self
            )));
        }
        if let Some(h) = self.h.percent() {
            if y + h > 100.0 + f64::EPSILON {
                return Err(PptxError::serialization(format!(
                    "box extends past the bottom edge: {}",
                    self
                )));
            }
        }

        Ok(())
    }
}

impl fmt::Display for BoxGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x={} y={} w={} h={}", self.x, self.y, self.w, self.h)
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    /// DrawingML `algn` attribute value
    pub fn ooxml(&self) -> &'static str {
        match self {
            Self::Left => "l",
            Self::Center => "ctr",
            Self::Right => "r",
        }
    }
}

/// Text styling for a box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleHints {
    /// Font size in points
    pub font_size: u32,

    pub bold: bool,

    pub align: Align,

    /// RGB hex colour; `None` inherits from the layout/theme
    pub color: Option<String>,

    /// Render each paragraph with a bullet glyph
    pub bulleted: bool,
}

impl StyleHints {
    /// Plain left-aligned text at the given size
    pub fn sized(font_size: u32) -> Self {
        Self {
            font_size,
            bold: false,
            align: Align::Left,
            color: None,
            bulleted: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn centered(mut self) -> Self {
        self.align = Align::Center;
        self
    }

    pub fn bulleted(mut self) -> Self {
        self.bulleted = true;
        self
    }

    pub fn with_color(mut self, color: Option<String>) -> Self {
        self.color = color;
        self
    }
}

/// Contents of a text box
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextBody {
    /// A single paragraph
    Single(String),

    /// One paragraph per entry
    Bullets(Vec<String>),
}

impl TextBody {
    /// Paragraph texts in order
    pub fn paragraphs(&self) -> Vec<&str> {
        match self {
            Self::Single(text) => vec![text.as_str()],
            Self::Bullets(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

/// A positioned, styled text box
#[derive(Debug, Clone, PartialEq)]
pub struct TextBoxSpec {
    pub text: TextBody,
    pub geometry: BoxGeometry,
    pub style: StyleHints,
}

/// Role of a slide within the deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideRole {
    /// Opening slide (index 0)
    Title,

    /// Every other slide
    Content,
}

/// A fully assembled slide
#[derive(Debug, Clone, PartialEq)]
pub struct SlideSpec {
    pub role: SlideRole,

    /// Name of the registered master this slide uses, if any
    pub master_name: Option<String>,

    pub text_boxes: Vec<TextBoxSpec>,
}

impl SlideSpec {
    /// Create a slide with no text boxes
    pub fn new(role: SlideRole, master_name: Option<String>) -> Self {
        Self {
            role,
            master_name,
            text_boxes: Vec::new(),
        }
    }

    /// Add a text box
    pub fn with_text_box(mut self, text_box: TextBoxSpec) -> Self {
        self.text_boxes.push(text_box);
        self
    }

    /// Check if this is the title slide
    pub fn is_title_slide(&self) -> bool {
        self.role == SlideRole::Title
    }
}
