//! Theme loading.
//!
//! A theme arrives as text-safe encoded bytes of an OPC package: an Office
//! theme (`.thmx`, parts under `theme/`) or a presentation or template
//! (`.pptx`/`.potx`, parts under `ppt/`). The [`ThemeExtractor`] turns it
//! into a [`ThemeBundle`] of layout definitions plus colour, font and slide
//! size metadata.
//!
//! Reading the container goes through [`DocumentContainerCodec`], so the
//! package format can change without touching the document builder.
//!
//! A theme that cannot be read never fails a generation request:
//! [`ThemeOutcome::resolve`] logs the problem and falls back to
//! [`ThemeOutcome::Unthemed`].

use std::collections::HashMap;

use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use slidesmith_ooxml::{OoxmlArchive, Relationships};

use crate::constants::{MAX_SLIDE_EXTENT_EMU, MIN_SLIDE_EXTENT_EMU};
use crate::error::{
    PptxError, Result, REASON_MALFORMED_CONTAINER, REASON_MALFORMED_ENCODING,
    REASON_MALFORMED_PART,
};
use crate::layout::{
    Fill, Frame, LayoutDefinition, PlaceholderSpec, PlaceholderType, StyleDescriptor,
};
use crate::transport;

/// Colour roles of a DrawingML colour scheme, in schema order
pub const SCHEME_ROLES: [&str; 12] = [
    "dk1", "lt1", "dk2", "lt2", "accent1", "accent2", "accent3", "accent4", "accent5",
    "accent6", "hlink", "folHlink",
];

/// Named colour scheme (`a:clrScheme`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorScheme {
    /// Scheme name
    pub name: String,

    /// Role → RGB hex, in the order the theme lists them
    pub colors: Vec<(String, String)>,
}

impl ColorScheme {
    /// The stock Office scheme
    pub fn office() -> Self {
        let colors = [
            ("dk1", "000000"),
            ("lt1", "FFFFFF"),
            ("dk2", "44546A"),
            ("lt2", "E7E6E6"),
            ("accent1", "4472C4"),
            ("accent2", "ED7D31"),
            ("accent3", "A5A5A5"),
            ("accent4", "FFC000"),
            ("accent5", "5B9BD5"),
            ("accent6", "70AD47"),
            ("hlink", "0563C1"),
            ("folHlink", "954F72"),
        ];

        Self {
            name: "Office".to_string(),
            colors: colors
                .iter()
                .map(|(role, rgb)| (role.to_string(), rgb.to_string()))
                .collect(),
        }
    }

    /// RGB hex for a role
    pub fn get(&self, role: &str) -> Option<&str> {
        self.colors
            .iter()
            .find(|(r, _)| r == role)
            .map(|(_, rgb)| rgb.as_str())
    }

    /// True when every scheme role has a colour
    pub fn is_complete(&self) -> bool {
        SCHEME_ROLES.iter().all(|role| self.get(role).is_some())
    }
}

/// Heading and body typefaces (`a:fontScheme`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FontScheme {
    /// Heading font
    pub major: String,

    /// Body font
    pub minor: String,
}

/// Slide size in EMU (`p:sldSz`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlideSize {
    pub cx: i64,
    pub cy: i64,
}

impl SlideSize {
    /// Both sides within the range PowerPoint opens
    pub fn is_valid(&self) -> bool {
        let range = MIN_SLIDE_EXTENT_EMU..=MAX_SLIDE_EXTENT_EMU;
        range.contains(&self.cx) && range.contains(&self.cy)
    }
}

/// Everything reusable read from a theme package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ThemeBundle {
    /// Theme name (`a:theme/@name`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Layout definitions in package order
    pub masters: Vec<LayoutDefinition>,

    /// Colour scheme
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_scheme: Option<ColorScheme>,

    /// Font scheme
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_scheme: Option<FontScheme>,

    /// Slide size of the source presentation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_geometry: Option<SlideSize>,
}

impl ThemeBundle {
    /// Names of the layout definitions, in order
    pub fn master_names(&self) -> Vec<&str> {
        self.masters.iter().map(|m| m.name.as_str()).collect()
    }
}

/// Access to the parts of a theme container
pub trait DocumentContainerCodec {
    /// The opened container
    type Container;

    /// Open raw container bytes
    fn open(&self, bytes: &[u8]) -> Result<Self::Container>;

    /// Layout definitions, in package order
    fn read_masters(&self, container: &Self::Container) -> Result<Vec<LayoutDefinition>>;

    /// Theme name, if the container carries a theme part
    fn read_theme_name(&self, container: &Self::Container) -> Result<Option<String>>;

    /// Colour scheme, if present
    fn read_color_scheme(&self, container: &Self::Container) -> Result<Option<ColorScheme>>;

    /// Font scheme, if present
    fn read_font_scheme(&self, container: &Self::Container) -> Result<Option<FontScheme>>;

    /// Slide size, if present
    fn read_layout_geometry(&self, container: &Self::Container) -> Result<Option<SlideSize>>;
}

/// [`DocumentContainerCodec`] for OPC packages
#[derive(Debug, Clone, Copy, Default)]
pub struct OoxmlContainerCodec;

impl DocumentContainerCodec for OoxmlContainerCodec {
    type Container = OoxmlArchive;

    fn open(&self, bytes: &[u8]) -> Result<OoxmlArchive> {
        OoxmlArchive::from_bytes(bytes)
            .map_err(|e| PptxError::theme_decode(REASON_MALFORMED_CONTAINER, e))
    }

    fn read_masters(&self, archive: &OoxmlArchive) -> Result<Vec<LayoutDefinition>> {
        let master_parts = archive.numbered_parts("slideMasters", "slideMaster");
        let layout_parts = archive.numbered_parts("slideLayouts", "slideLayout");

        let mut masters: HashMap<String, PartShapes> = HashMap::new();
        for (_, path) in &master_parts {
            masters.insert(path.clone(), parse_part_shapes(archive, path)?);
        }

        if layout_parts.is_empty() {
            return Ok(master_parts
                .iter()
                .filter_map(|(number, path)| {
                    let shapes = masters.remove(path)?;
                    Some(shapes.into_definition(format!("Slide Master {}", number), None))
                })
                .collect());
        }

        let mut definitions = Vec::with_capacity(layout_parts.len());
        for (number, path) in &layout_parts {
            let layout = parse_part_shapes(archive, path)?;
            let master = owning_master(archive, path)?.and_then(|m| masters.get(&m));
            if master.is_none() {
                debug!("Layout {} has no readable slide master", path);
            }
            definitions.push(layout.into_definition(format!("Layout {}", number), master));
        }

        Ok(definitions)
    }

    fn read_theme_name(&self, archive: &OoxmlArchive) -> Result<Option<String>> {
        Ok(read_theme_part(archive)?.and_then(|theme| theme.name))
    }

    fn read_color_scheme(&self, archive: &OoxmlArchive) -> Result<Option<ColorScheme>> {
        Ok(read_theme_part(archive)?.and_then(|theme| theme.color_scheme))
    }

    fn read_font_scheme(&self, archive: &OoxmlArchive) -> Result<Option<FontScheme>> {
        Ok(read_theme_part(archive)?.and_then(|theme| theme.font_scheme))
    }

    fn read_layout_geometry(&self, archive: &OoxmlArchive) -> Result<Option<SlideSize>> {
        let Some(path) = archive.find_by_suffix("presentation.xml") else {
            return Ok(None);
        };
        let Some(xml) = archive.get(path) else {
            return Ok(None);
        };

        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                    if e.local_name().as_ref() == b"sldSz" =>
                {
                    let cx = attr_value(e, b"cx").and_then(|v| v.parse::<i64>().ok());
                    let cy = attr_value(e, b"cy").and_then(|v| v.parse::<i64>().ok());
                    return Ok(match (cx, cy) {
                        (Some(cx), Some(cy)) => {
                            let size = SlideSize { cx, cy };
                            if size.is_valid() {
                                Some(size)
                            } else {
                                warn!("Ignoring out-of-range slide size {}x{} in {}", cx, cy, path);
                                None
                            }
                        }
                        _ => None,
                    });
                }
                Ok(Event::Eof) => return Ok(None),
                Err(e) => return Err(malformed_part(path, e)),
                _ => {}
            }
            buf.clear();
        }
    }
}

/// Decodes a theme upload into a [`ThemeBundle`]
#[derive(Debug, Clone, Default)]
pub struct ThemeExtractor<C = OoxmlContainerCodec> {
    codec: C,
}

impl ThemeExtractor<OoxmlContainerCodec> {
    /// Extractor for OPC packages
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: DocumentContainerCodec> ThemeExtractor<C> {
    /// Extractor over a custom container codec
    pub fn with_codec(codec: C) -> Self {
        Self { codec }
    }

    /// Decode the transport encoding, then read the package
    pub fn extract(&self, encoded: &str) -> Result<ThemeBundle> {
        let bytes = transport::decode(encoded)
            .map_err(|e| PptxError::theme_decode(REASON_MALFORMED_ENCODING, e))?;
        self.extract_bytes(&bytes)
    }

    /// Read an already decoded package
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<ThemeBundle> {
        let container = self.codec.open(bytes)?;

        let masters = self.codec.read_masters(&container)?;
        if masters.is_empty() {
            debug!("Theme carries no slide masters");
        }

        let bundle = ThemeBundle {
            name: self.codec.read_theme_name(&container)?,
            masters,
            color_scheme: self.codec.read_color_scheme(&container)?,
            font_scheme: self.codec.read_font_scheme(&container)?,
            layout_geometry: self.codec.read_layout_geometry(&container)?,
        };

        debug!(
            "Extracted theme {:?}: {} master(s), colours: {}, fonts: {}",
            bundle.name,
            bundle.masters.len(),
            bundle.color_scheme.is_some(),
            bundle.font_scheme.is_some()
        );

        Ok(bundle)
    }
}

/// A theme, or the explicit absence of one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeOutcome {
    /// A readable theme was supplied
    Themed(ThemeBundle),

    /// No theme, or one that could not be read
    Unthemed,
}

impl ThemeOutcome {
    /// Resolve an optional encoded theme with the OPC extractor
    pub fn resolve(encoded: Option<&str>) -> Self {
        Self::resolve_with(&ThemeExtractor::new(), encoded)
    }

    /// Resolve an optional encoded theme with a given extractor
    ///
    /// Theme errors are logged and turn into [`ThemeOutcome::Unthemed`].
    pub fn resolve_with<C: DocumentContainerCodec>(
        extractor: &ThemeExtractor<C>,
        encoded: Option<&str>,
    ) -> Self {
        let encoded = match encoded {
            Some(s) if !s.trim().is_empty() => s,
            _ => return Self::Unthemed,
        };

        match extractor.extract(encoded) {
            Ok(bundle) => Self::Themed(bundle),
            Err(e) => {
                warn!("Ignoring theme, using default style: {} [{}]", e, e.code());
                Self::Unthemed
            }
        }
    }

    /// Whether a theme was applied
    pub fn is_themed(&self) -> bool {
        matches!(self, Self::Themed(_))
    }

    /// The bundle, if themed
    pub fn bundle(&self) -> Option<&ThemeBundle> {
        match self {
            Self::Themed(bundle) => Some(bundle),
            Self::Unthemed => None,
        }
    }

    /// Take the bundle, if themed
    pub fn into_bundle(self) -> Option<ThemeBundle> {
        match self {
            Self::Themed(bundle) => Some(bundle),
            Self::Unthemed => None,
        }
    }
}

impl From<Option<ThemeBundle>> for ThemeOutcome {
    fn from(bundle: Option<ThemeBundle>) -> Self {
        bundle.map_or(Self::Unthemed, Self::Themed)
    }
}

// ---------------------------------------------------------------------------
// Part readers
// ---------------------------------------------------------------------------

/// Shapes read from a slide master or slide layout part
#[derive(Debug, Default)]
struct PartShapes {
    name: Option<String>,
    background: Option<StyleDescriptor>,
    placeholders: Vec<PlaceholderSpec>,
}

impl PartShapes {
    /// Build a definition, filling gaps from the owning master
    fn into_definition(self, fallback_name: String, master: Option<&PartShapes>) -> LayoutDefinition {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(fallback_name);

        let mut definition = LayoutDefinition::new(name);
        definition.background = self
            .background
            .or_else(|| master.and_then(|m| m.background.clone()));

        for mut placeholder in self.placeholders {
            if let Some(inherited) = master.and_then(|m| m.matching_placeholder(&placeholder)) {
                if placeholder.frame.is_none() {
                    placeholder.frame = inherited.frame;
                }
                if placeholder.style.is_none() {
                    placeholder.style = inherited.style.clone();
                }
            }
            definition.add_placeholder(placeholder);
        }

        definition.slide_number_style = definition
            .slide_number_placeholder()
            .and_then(|p| p.style.clone())
            .or_else(|| {
                master
                    .and_then(|m| m.placeholder_of(PlaceholderType::SlideNumber))
                    .and_then(|p| p.style.clone())
            });

        definition
    }

    fn placeholder_of(&self, kind: PlaceholderType) -> Option<&PlaceholderSpec> {
        self.placeholders.iter().find(|p| p.kind == kind)
    }

    /// Master placeholder a layout placeholder inherits from
    ///
    /// Title flavours inherit from the master title, content flavours from
    /// the master body; anything else matches on type, then index.
    fn matching_placeholder(&self, placeholder: &PlaceholderSpec) -> Option<&PlaceholderSpec> {
        let master_kind = match placeholder.kind {
            PlaceholderType::CenterTitle => PlaceholderType::Title,
            PlaceholderType::Subtitle | PlaceholderType::Object => PlaceholderType::Body,
            other => other,
        };

        self.placeholder_of(master_kind)
            .or_else(|| {
                self.placeholders
                    .iter()
                    .find(|p| p.index == placeholder.index && placeholder.index != 0)
            })
    }
}

/// Placeholder shape being read
#[derive(Debug, Default)]
struct ShapeState {
    name: String,
    placeholder: Option<(PlaceholderType, u32)>,
    offset: Option<(i64, i64)>,
    extent: Option<(i64, i64)>,
    style: StyleDescriptor,
}

impl ShapeState {
    fn finish(self) -> Option<PlaceholderSpec> {
        let (kind, index) = self.placeholder?;
        let mut spec = PlaceholderSpec::new(kind, index, self.name);
        if let (Some((x, y)), Some((cx, cy))) = (self.offset, self.extent) {
            spec.frame = Some(Frame::new(x, y, cx, cy));
        }
        if !self.style.is_empty() {
            spec.style = Some(self.style);
        }
        Some(spec)
    }
}

/// Slide master of a layout, resolved through the layout's relationships
fn owning_master(archive: &OoxmlArchive, layout_path: &str) -> Result<Option<String>> {
    let rels_path = OoxmlArchive::rels_path_for(layout_path);
    let Some(xml) = archive.get(&rels_path) else {
        return Ok(None);
    };

    let rels = Relationships::parse(xml)
        .map_err(|e| PptxError::theme_decode(REASON_MALFORMED_PART, format!("{}: {}", rels_path, e)))?;

    Ok(rels
        .first_of_type(Relationships::TYPE_SLIDE_MASTER)
        .map(|target| Relationships::resolve_target(layout_path, target)))
}

/// Read the name, background and placeholders of a master or layout part
fn parse_part_shapes(archive: &OoxmlArchive, path: &str) -> Result<PartShapes> {
    let Some(xml) = archive.get(path) else {
        return Ok(PartShapes::default());
    };

    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut shapes = PartShapes::default();
    let mut shape: Option<ShapeState> = None;

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| malformed_part(path, e))?
        {
            Event::Start(ref e) => {
                visit_shape_element(e, &stack, &mut shapes, &mut shape);
                stack.push(e.local_name().as_ref().to_vec());
            }
            Event::Empty(ref e) => {
                visit_shape_element(e, &stack, &mut shapes, &mut shape);
            }
            Event::End(ref e) => {
                stack.pop();
                if e.local_name().as_ref() == b"sp" {
                    if let Some(placeholder) = shape.take().and_then(ShapeState::finish) {
                        shapes.placeholders.push(placeholder);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    debug!(
        "Read {} placeholder(s) from {}",
        shapes.placeholders.len(),
        path
    );
    Ok(shapes)
}

fn visit_shape_element(
    e: &BytesStart,
    stack: &[Vec<u8>],
    shapes: &mut PartShapes,
    shape: &mut Option<ShapeState>,
) {
    let local = e.local_name();
    let parent = stack.last().map(Vec::as_slice);
    let grandparent = stack.len().checked_sub(2).map(|i| stack[i].as_slice());

    match local.as_ref() {
        b"cSld" => shapes.name = attr_value(e, b"name"),
        b"sp" => *shape = Some(ShapeState::default()),
        b"cNvPr" => {
            if let Some(current) = shape.as_mut() {
                current.name = attr_value(e, b"name").unwrap_or_default();
            }
        }
        b"ph" => {
            if let Some(current) = shape.as_mut() {
                let kind = attr_value(e, b"type")
                    .map(|t| PlaceholderType::from_ooxml_type(&t))
                    .unwrap_or(PlaceholderType::Object);
                let index = attr_value(e, b"idx")
                    .and_then(|i| i.parse().ok())
                    .unwrap_or(0);
                current.placeholder = Some((kind, index));
            }
        }
        b"off" | b"ext" if matches!((grandparent, parent), (Some(b"spPr"), Some(b"xfrm"))) => {
            if let Some(current) = shape.as_mut() {
                let pair = if local.as_ref() == b"off" {
                    (b"x".as_slice(), b"y".as_slice())
                } else {
                    (b"cx".as_slice(), b"cy".as_slice())
                };
                let a = attr_value(e, pair.0).and_then(|v| v.parse::<i64>().ok());
                let b = attr_value(e, pair.1).and_then(|v| v.parse::<i64>().ok());
                if let (Some(a), Some(b)) = (a, b) {
                    if local.as_ref() == b"off" {
                        current.offset = Some((a, b));
                    } else {
                        current.extent = Some((a, b));
                    }
                }
            }
        }
        b"defRPr" | b"rPr" | b"endParaRPr" => {
            if let Some(current) = shape.as_mut() {
                if current.style.font_size.is_none() {
                    current.style.font_size = attr_value(e, b"sz").and_then(|s| s.parse().ok());
                }
            }
        }
        b"srgbClr" | b"schemeClr" | b"sysClr" => {
            let Some(fill) = color_fill(e) else {
                return;
            };
            match (grandparent, parent) {
                (Some(b"bgPr"), Some(b"solidFill")) | (_, Some(b"bgRef")) => {
                    if shapes.background.is_none() {
                        shapes.background = Some(StyleDescriptor::filled(fill));
                    }
                }
                (Some(b"spPr"), Some(b"solidFill")) => {
                    if let Some(current) = shape.as_mut() {
                        current.style.fill.get_or_insert(fill);
                    }
                }
                (Some(b"defRPr" | b"rPr" | b"endParaRPr"), Some(b"solidFill")) => {
                    if let Some(current) = shape.as_mut() {
                        current.style.color.get_or_insert(fill);
                    }
                }
                _ => {}
            }
        }
        _ => {}
    }
}

/// Fill for a DrawingML colour element
fn color_fill(e: &BytesStart) -> Option<Fill> {
    match e.local_name().as_ref() {
        b"srgbClr" => attr_value(e, b"val").map(Fill::Solid),
        b"sysClr" => attr_value(e, b"lastClr").map(Fill::Solid),
        b"schemeClr" => attr_value(e, b"val").map(Fill::Scheme),
        _ => None,
    }
}

/// Contents of a DrawingML theme part
#[derive(Debug, Default)]
struct ThemePart {
    name: Option<String>,
    color_scheme: Option<ColorScheme>,
    font_scheme: Option<FontScheme>,
}

/// Read the first theme part of the package
fn read_theme_part(archive: &OoxmlArchive) -> Result<Option<ThemePart>> {
    let Some((_, path)) = archive.numbered_parts("theme", "theme").into_iter().next() else {
        return Ok(None);
    };
    let Some(xml) = archive.get(&path) else {
        return Ok(None);
    };

    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut state = ThemeReadState::default();

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| malformed_part(&path, e))?
        {
            Event::Start(ref e) => {
                state.visit(e, &stack);
                stack.push(e.local_name().as_ref().to_vec());
            }
            Event::Empty(ref e) => state.visit(e, &stack),
            Event::End(_) => {
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(Some(state.finish()))
}

#[derive(Debug, Default)]
struct ThemeReadState {
    name: Option<String>,
    colors: Option<ColorScheme>,
    major: Option<String>,
    minor: Option<String>,
}

impl ThemeReadState {
    fn visit(&mut self, e: &BytesStart, stack: &[Vec<u8>]) {
        let parent = stack.last().map(Vec::as_slice);
        let grandparent = stack.len().checked_sub(2).map(|i| stack[i].as_slice());

        match e.local_name().as_ref() {
            b"theme" => self.name = attr_value(e, b"name"),
            b"clrScheme" => {
                self.colors = Some(ColorScheme {
                    name: attr_value(e, b"name").unwrap_or_default(),
                    colors: Vec::new(),
                });
            }
            b"srgbClr" | b"sysClr" if matches!(grandparent, Some(b"clrScheme")) => {
                let rgb = match e.local_name().as_ref() {
                    b"srgbClr" => attr_value(e, b"val"),
                    _ => attr_value(e, b"lastClr"),
                };
                if let (Some(scheme), Some(role), Some(rgb)) = (self.colors.as_mut(), parent, rgb) {
                    scheme
                        .colors
                        .push((String::from_utf8_lossy(role).into_owned(), rgb));
                }
            }
            b"latin" => match parent {
                Some(b"majorFont") => self.major = attr_value(e, b"typeface"),
                Some(b"minorFont") => self.minor = attr_value(e, b"typeface"),
                _ => {}
            },
            _ => {}
        }
    }

    fn finish(self) -> ThemePart {
        let font_scheme = match (self.major, self.minor) {
            (None, None) => None,
            (major, minor) => Some(FontScheme {
                major: major.unwrap_or_else(|| "Calibri Light".to_string()),
                minor: minor.unwrap_or_else(|| "Calibri".to_string()),
            }),
        };

        ThemePart {
            name: self.name,
            color_scheme: self.colors.filter(|scheme| !scheme.colors.is_empty()),
            font_scheme,
        }
    }
}

fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

fn malformed_part(path: &str, e: quick_xml::Error) -> PptxError {
    PptxError::theme_decode(REASON_MALFORMED_PART, format!("{}: {}", path, e))
}
