//! # slidesmith-pptx
//!
//! Slide-deck assembly: plain-text slide blocks plus an optional Office
//! theme in, a PowerPoint (PPTX) package out.
//!
//! ## Pipeline
//!
//! 1. **Theme**: decode the uploaded theme and read its layouts, colours and
//!    fonts ([`ThemeExtractor`]); an unreadable theme degrades to the
//!    built-in style ([`ThemeOutcome`])
//! 2. **Masters**: register the theme layouts in the document ([`DocumentBuilder`])
//! 3. **Slides**: parse each block into a title and bullets and lay them out
//!    ([`SlideAssembler`])
//! 4. **Package**: serialize to `.pptx` and encode for transport ([`Generator`])
//!
//! ## Example
//!
//! ```rust,no_run
//! use slidesmith_pptx::{Generator, GenerationRequest, StyleConfig};
//!
//! let request = GenerationRequest {
//!     slides: vec!["# Welcome".into(), "## Agenda\n- Point A\n- Point B".into()],
//!     theme: None,
//! };
//!
//! let response = Generator::new(StyleConfig::default()).handle(&request)?;
//! println!("{}", response.message);
//! # Ok::<(), slidesmith_pptx::PptxError>(())
//! ```

pub mod assembler;
pub mod document;
pub mod error;
pub mod layout;
pub mod parser;
pub mod pipeline;
pub mod slide;
pub mod style;
pub mod theme;
pub mod transport;
pub mod writer;

// Re-exports
pub use assembler::{select_content_master, select_title_master, SlideAssembler};
pub use document::DocumentBuilder;
pub use error::{PptxError, Result};
pub use layout::{LayoutDefinition, MasterRegistry, PlaceholderSpec, PlaceholderType};
pub use parser::{parse, ParsedSlideContent, SlideBlock};
pub use pipeline::{ErrorResponse, GenerationRequest, GenerationResponse, Generator};
pub use slide::{SlideRole, SlideSpec, TextBoxSpec};
pub use style::StyleConfig;
pub use theme::{
    ColorScheme, DocumentContainerCodec, FontScheme, OoxmlContainerCodec, SlideSize,
    ThemeBundle, ThemeExtractor, ThemeOutcome,
};
pub use writer::PptxWriter;

/// PPTX-related constants
pub mod constants {
    /// Default slide width in EMU (10")
    pub const DEFAULT_SLIDE_WIDTH_EMU: i64 = 9_144_000;

    /// Default slide height in EMU (5.625", 16:9 at 10" wide)
    pub const DEFAULT_SLIDE_HEIGHT_EMU: i64 = 5_143_500;

    /// Standard 4:3 slide height in EMU (7.5")
    pub const STANDARD_SLIDE_HEIGHT_EMU: i64 = 6_858_000;

    /// Smallest slide side PowerPoint accepts in EMU (1")
    pub const MIN_SLIDE_EXTENT_EMU: i64 = 914_400;

    /// Largest slide side PowerPoint accepts in EMU (56")
    pub const MAX_SLIDE_EXTENT_EMU: i64 = 51_206_400;

    /// EMU per inch
    pub const EMU_PER_INCH: i64 = 914_400;

    /// EMU per point
    pub const EMU_PER_POINT: i64 = 12_700;

    /// PresentationML namespace
    pub const NS_PRESENTATION: &str =
        "http://schemas.openxmlformats.org/presentationml/2006/main";

    /// DrawingML namespace
    pub const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    /// Relationships namespace
    pub const NS_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emu_constants() {
        assert_eq!(constants::EMU_PER_INCH, 914_400);
        assert_eq!(constants::EMU_PER_POINT, 12_700);

        // 1 inch = 72 points
        assert_eq!(constants::EMU_PER_INCH, 72 * constants::EMU_PER_POINT);
    }

    #[test]
    fn test_default_slide_is_widescreen() {
        assert_eq!(constants::DEFAULT_SLIDE_WIDTH_EMU, 10 * constants::EMU_PER_INCH);

        let aspect_ratio =
            constants::DEFAULT_SLIDE_WIDTH_EMU as f64 / constants::DEFAULT_SLIDE_HEIGHT_EMU as f64;
        assert!((aspect_ratio - 16.0 / 9.0).abs() < 0.01);
    }

    #[test]
    fn test_slide_extent_bounds() {
        assert_eq!(constants::MIN_SLIDE_EXTENT_EMU, constants::EMU_PER_INCH);
        assert_eq!(constants::MAX_SLIDE_EXTENT_EMU, 56 * constants::EMU_PER_INCH);
    }

    #[test]
    fn test_standard_slide_is_four_by_three() {
        let aspect_ratio =
            constants::DEFAULT_SLIDE_WIDTH_EMU as f64 / constants::STANDARD_SLIDE_HEIGHT_EMU as f64;
        assert!((aspect_ratio - 4.0 / 3.0).abs() < 0.01);
    }
}
