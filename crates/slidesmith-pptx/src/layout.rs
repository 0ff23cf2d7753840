//! Layout definitions (masters) and the document's master registry.
//!
//! A [`LayoutDefinition`] is the reusable part of a theme: a named bundle of
//! background, placeholder regions and slide-number styling. Definitions
//! live in a [`MasterRegistry`] owned by the document builder.

use serde::Serialize;
use std::collections::HashMap;

/// A fill taken from a theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Fill {
    /// Explicit RGB colour as six hex digits (e.g. "1F4E79")
    Solid(String),

    /// Reference into the colour scheme (e.g. "bg1", "accent1")
    Scheme(String),
}

/// Visual style attached to a background or placeholder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StyleDescriptor {
    /// Fill colour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,

    /// Font size in hundredths of a point (OOXML `sz`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,

    /// Text colour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Fill>,
}

impl StyleDescriptor {
    /// A descriptor holding only a fill
    pub fn filled(fill: Fill) -> Self {
        Self {
            fill: Some(fill),
            ..Default::default()
        }
    }

    /// True when nothing was captured
    pub fn is_empty(&self) -> bool {
        self.fill.is_none() && self.font_size.is_none() && self.color.is_none()
    }
}

/// Types of placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderType {
    /// Title placeholder
    Title,

    /// Center title (for title slides)
    CenterTitle,

    /// Subtitle
    Subtitle,

    /// Body text
    Body,

    /// Generic content object (the OOXML default when `type` is absent)
    Object,

    /// Date/time
    DateTime,

    /// Footer
    Footer,

    /// Slide number
    SlideNumber,

    /// Picture
    Picture,

    /// Other/custom
    Other,
}

impl PlaceholderType {
    /// Get the OOXML type attribute value
    pub fn ooxml_type(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::CenterTitle => "ctrTitle",
            Self::Subtitle => "subTitle",
            Self::Body => "body",
            Self::Object => "obj",
            Self::DateTime => "dt",
            Self::Footer => "ftr",
            Self::SlideNumber => "sldNum",
            Self::Picture => "pic",
            Self::Other => "",
        }
    }

    /// Parse from OOXML type attribute
    pub fn from_ooxml_type(s: &str) -> Self {
        match s {
            "title" => Self::Title,
            "ctrTitle" => Self::CenterTitle,
            "subTitle" => Self::Subtitle,
            "body" => Self::Body,
            "obj" => Self::Object,
            "dt" => Self::DateTime,
            "ftr" => Self::Footer,
            "sldNum" => Self::SlideNumber,
            "pic" => Self::Picture,
            _ => Self::Other,
        }
    }

    /// Whether this is one of the two title flavours
    pub fn is_title(&self) -> bool {
        matches!(self, Self::Title | Self::CenterTitle)
    }
}

/// Position and size of a region in EMU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Frame {
    pub fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }
}

/// A named, positioned content region on a layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceholderSpec {
    /// Placeholder type
    pub kind: PlaceholderType,

    /// Placeholder index (`idx` attribute)
    pub index: u32,

    /// Shape name as authored in the theme
    pub name: String,

    /// Frame, when the layout (or its master) positions the region
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<Frame>,

    /// Text styling captured for the region
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleDescriptor>,
}

impl PlaceholderSpec {
    /// Create a placeholder without frame or style
    pub fn new(kind: PlaceholderType, index: u32, name: impl Into<String>) -> Self {
        Self {
            kind,
            index,
            name: name.into(),
            frame: None,
            style: None,
        }
    }

    /// Set the frame
    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frame = Some(frame);
        self
    }
}

/// A reusable layout ("master") extracted from a theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutDefinition {
    /// Name, unique within a document
    pub name: String,

    /// Background style
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<StyleDescriptor>,

    /// Placeholder regions, in authoring order
    pub placeholders: Vec<PlaceholderSpec>,

    /// Style of the slide-number field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slide_number_style: Option<StyleDescriptor>,
}

impl LayoutDefinition {
    /// Create an empty layout definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            background: None,
            placeholders: Vec::new(),
            slide_number_style: None,
        }
    }

    /// Set the background
    pub fn with_background(mut self, background: StyleDescriptor) -> Self {
        self.background = Some(background);
        self
    }

    /// Add a placeholder to this layout
    pub fn add_placeholder(&mut self, placeholder: PlaceholderSpec) {
        self.placeholders.push(placeholder);
    }

    /// Get the title placeholder if present
    pub fn title_placeholder(&self) -> Option<&PlaceholderSpec> {
        self.placeholders.iter().find(|p| p.kind.is_title())
    }

    /// Get the body/content placeholder if present
    pub fn body_placeholder(&self) -> Option<&PlaceholderSpec> {
        self.placeholders
            .iter()
            .find(|p| matches!(p.kind, PlaceholderType::Body | PlaceholderType::Object))
    }

    /// Get the slide-number placeholder if present
    pub fn slide_number_placeholder(&self) -> Option<&PlaceholderSpec> {
        self.placeholders
            .iter()
            .find(|p| p.kind == PlaceholderType::SlideNumber)
    }

    /// Check if this layout has a specific placeholder type
    pub fn has_placeholder(&self, kind: PlaceholderType) -> bool {
        self.placeholders.iter().any(|p| p.kind == kind)
    }
}

/// Ordered name → [`LayoutDefinition`] mapping
///
/// Registration order is preserved. Registering a name twice replaces the
/// definition but keeps the slot of the first registration.
#[derive(Debug, Clone, Default)]
pub struct MasterRegistry {
    order: Vec<String>,
    map: HashMap<String, LayoutDefinition>,
}

impl MasterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition under its own name
    pub fn register(&mut self, definition: LayoutDefinition) {
        let name = definition.name.clone();
        if self.map.insert(name.clone(), definition).is_none() {
            self.order.push(name);
        } else {
            log::debug!("Master '{}' re-registered, replacing earlier definition", name);
        }
    }

    /// Look up a definition by exact name
    pub fn get(&self, name: &str) -> Option<&LayoutDefinition> {
        self.map.get(name)
    }

    /// Check whether a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// First registered definition
    pub fn first(&self) -> Option<&LayoutDefinition> {
        self.order.first().and_then(|name| self.map.get(name))
    }

    /// First definition (in registration order) whose name contains
    /// `fragment`, compared case-insensitively
    pub fn find_by_name_fragment(&self, fragment: &str) -> Option<&LayoutDefinition> {
        let needle = fragment.to_lowercase();
        self.iter()
            .find(|definition| definition.name.to_lowercase().contains(&needle))
    }

    /// 0-based registration position of a name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|n| n == name)
    }

    /// Iterate in registration order
    pub fn iter(&self) -> impl Iterator<Item = &LayoutDefinition> {
        self.order.iter().filter_map(|name| self.map.get(name))
    }

    /// Number of registered definitions
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
