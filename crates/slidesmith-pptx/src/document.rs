//! The slide document under construction.
//!
//! [`DocumentBuilder`] owns the master registry and the slide list for one
//! generation request. The order of calls is fixed:
//!
//! 1. [`DocumentBuilder::register_masters`] with the resolved theme
//! 2. [`DocumentBuilder::append_slides`] with the assembled slides
//! 3. [`DocumentBuilder::serialize`], which consumes the builder
//!
//! ```rust,ignore
//! let mut builder = DocumentBuilder::new();
//! builder.register_masters(ThemeOutcome::resolve(theme));
//! let slides = SlideAssembler::default().assemble(&blocks, builder.masters());
//! builder.append_slides(slides)?;
//! let pptx = builder.serialize()?;
//! ```

use log::debug;

use crate::error::{PptxError, Result};
use crate::layout::MasterRegistry;
use crate::slide::SlideSpec;
use crate::style::StyleConfig;
use crate::theme::{ColorScheme, FontScheme, SlideSize, ThemeOutcome};
use crate::writer::PptxWriter;

/// Builds and serializes one presentation
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    style: StyleConfig,
    masters: MasterRegistry,
    theme_name: Option<String>,
    color_scheme: Option<ColorScheme>,
    font_scheme: Option<FontScheme>,
    layout_geometry: Option<SlideSize>,
    slides: Vec<SlideSpec>,
}

impl DocumentBuilder {
    /// Empty document with the built-in style
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty document with a custom style
    pub fn with_style(style: StyleConfig) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    /// Copy a theme's masters and scheme into the document
    ///
    /// An unthemed outcome, or a theme without masters, leaves the registry
    /// empty and slides render with the built-in style.
    pub fn register_masters(&mut self, outcome: ThemeOutcome) {
        let Some(bundle) = outcome.into_bundle() else {
            debug!("No theme; using built-in style");
            return;
        };

        for master in bundle.masters {
            self.masters.register(master);
        }
        self.theme_name = bundle.name;
        self.color_scheme = bundle.color_scheme;
        self.font_scheme = bundle.font_scheme;
        self.layout_geometry = bundle.layout_geometry;

        debug!("Registered {} master(s)", self.masters.len());
    }

    /// Append slides in order
    ///
    /// Fails without appending anything if a slide names a master that is
    /// not registered, or names none while masters are registered.
    pub fn append_slides(&mut self, specs: Vec<SlideSpec>) -> Result<()> {
        for (offset, spec) in specs.iter().enumerate() {
            let index = self.slides.len() + offset;
            match &spec.master_name {
                Some(name) if !self.masters.contains(name) => {
                    return Err(PptxError::dangling_master(index, name));
                }
                None if !self.masters.is_empty() => {
                    return Err(PptxError::UnassignedMaster {
                        index,
                        registered: self.masters.len(),
                    });
                }
                _ => {}
            }
        }

        self.slides.extend(specs);
        Ok(())
    }

    /// Registered masters
    pub fn masters(&self) -> &MasterRegistry {
        &self.masters
    }

    /// Appended slides
    pub fn slides(&self) -> &[SlideSpec] {
        &self.slides
    }

    /// Number of appended slides
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// The style this document renders with
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Slide size: the theme's when it has one, else the style's
    pub fn slide_size(&self) -> SlideSize {
        self.layout_geometry.unwrap_or(SlideSize {
            cx: self.style.slide.width,
            cy: self.style.slide.height,
        })
    }

    /// Render the document to `.pptx` bytes
    pub fn serialize(self) -> Result<Vec<u8>> {
        if self.slides.is_empty() {
            return Err(PptxError::serialization("presentation has no slides"));
        }

        let bytes = PptxWriter::new(&self.style)
            .with_slide_size(self.slide_size())
            .with_masters(&self.masters)
            .with_theme(
                self.theme_name.as_deref(),
                self.color_scheme.as_ref(),
                self.font_scheme.as_ref(),
            )
            .generate(&self.slides)?;

        debug!(
            "Serialized {} slide(s) into {} bytes",
            self.slides.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutDefinition;
    use crate::slide::{BoxGeometry, SlideRole, StyleHints, TextBody, TextBoxSpec};
    use crate::theme::ThemeBundle;
    use slidesmith_ooxml::OoxmlArchive;

    fn slide(master: Option<&str>) -> SlideSpec {
        SlideSpec::new(SlideRole::Content, master.map(String::from)).with_text_box(TextBoxSpec {
            text: TextBody::Single("Agenda".into()),
            geometry: BoxGeometry::auto_height(5.0, 5.0, 90.0),
            style: StyleHints::sized(32).bold(),
        })
    }

    fn themed(names: &[&str]) -> ThemeOutcome {
        ThemeOutcome::Themed(ThemeBundle {
            masters: names.iter().map(|n| LayoutDefinition::new(*n)).collect(),
            layout_geometry: Some(SlideSize {
                cx: 12_192_000,
                cy: 6_858_000,
            }),
            ..Default::default()
        })
    }

    #[test]
    fn test_new_document_is_empty() {
        let builder = DocumentBuilder::new();
        assert!(builder.masters().is_empty());
        assert_eq!(builder.slide_count(), 0);
    }

    #[test]
    fn test_serialize_zero_slides_fails() {
        let err = DocumentBuilder::new().serialize().unwrap_err();
        assert!(matches!(err, PptxError::Serialization { .. }));
    }

    #[test]
    fn test_serialize_one_slide() {
        let mut builder = DocumentBuilder::new();
        builder.append_slides(vec![slide(None)]).unwrap();

        let bytes = builder.serialize().unwrap();
        let archive = OoxmlArchive::from_bytes(&bytes).unwrap();
        assert_eq!(archive.numbered_parts("slides", "slide").len(), 1);
    }

    #[test]
    fn test_unthemed_registers_nothing() {
        let mut builder = DocumentBuilder::new();
        builder.register_masters(ThemeOutcome::Unthemed);
        builder.register_masters(themed(&[]));

        assert!(builder.masters().is_empty());
    }

    #[test]
    fn test_theme_masters_and_geometry() {
        let mut builder = DocumentBuilder::new();
        builder.register_masters(themed(&["Title Master", "Content Master"]));

        assert_eq!(builder.masters().len(), 2);
        assert_eq!(builder.slide_size().cx, 12_192_000);

        builder
            .append_slides(vec![slide(Some("Title Master")), slide(Some("Content Master"))])
            .unwrap();
        let bytes = builder.serialize().unwrap();
        let archive = OoxmlArchive::from_bytes(&bytes).unwrap();
        let presentation = archive.get_string("ppt/presentation.xml").unwrap();
        assert!(presentation.contains("<p:sldSz cx=\"12192000\" cy=\"6858000\"/>"));
    }

    #[test]
    fn test_dangling_master_rejected() {
        let mut builder = DocumentBuilder::new();
        builder.append_slides(vec![slide(None)]).unwrap();

        let err = builder
            .append_slides(vec![slide(None), slide(Some("Content Master"))])
            .unwrap_err();

        assert!(matches!(err, PptxError::DanglingMaster { index: 2, .. }));
        // Nothing from the rejected batch was appended
        assert_eq!(builder.slide_count(), 1);
    }

    #[test]
    fn test_append_preserves_order() {
        let mut builder = DocumentBuilder::new();
        builder.register_masters(themed(&["A", "B"]));
        builder
            .append_slides(vec![slide(Some("B")), slide(Some("A")), slide(Some("B"))])
            .unwrap();

        let masters: Vec<Option<&str>> = builder
            .slides()
            .iter()
            .map(|s| s.master_name.as_deref())
            .collect();
        assert_eq!(masters, vec![Some("B"), Some("A"), Some("B")]);
    }

    #[test]
    fn test_slide_without_master_rejected_when_themed() {
        let mut builder = DocumentBuilder::new();
        builder.register_masters(themed(&["A", "B"]));

        let err = builder
            .append_slides(vec![slide(Some("A")), slide(None)])
            .unwrap_err();

        assert!(matches!(
            err,
            PptxError::UnassignedMaster {
                index: 1,
                registered: 2
            }
        ));
        assert_eq!(builder.slide_count(), 0);
    }

    #[test]
    fn test_custom_style_used() {
        let style = StyleConfig::default().with_locale("es-ES");
        let mut builder = DocumentBuilder::with_style(style);
        builder.append_slides(vec![slide(None)]).unwrap();

        let bytes = builder.serialize().unwrap();
        let archive = OoxmlArchive::from_bytes(&bytes).unwrap();
        let slide = archive.get_string("ppt/slides/slide1.xml").unwrap();
        assert!(slide.contains("lang=\"es-ES\""));
    }
}
