//! Slide assembly.
//!
//! Turns parsed slide blocks into positioned text boxes:
//!
//! - **Title slide** (index 0): one centred, bold heading in the middle band
//! - **Content slides**: a bold heading at the top and, when the block has
//!   bullet lines, a bulleted box below it
//!
//! When masters are registered, each slide also names the master it uses:
//! the first master whose name mentions "title" for the opening slide and
//! the first mentioning "content" for the rest, falling back to the first
//! registered master.

use log::debug;

use crate::layout::{LayoutDefinition, MasterRegistry};
use crate::parser::{ParsedSlideContent, SlideBlock};
use crate::slide::{BoxGeometry, SlideRole, SlideSpec, StyleHints, TextBody, TextBoxSpec};
use crate::style::StyleConfig;

/// Title slide heading: x 5%, y 40%, w 90%
const TITLE_SLIDE_BOX: (f64, f64, f64) = (5.0, 40.0, 90.0);

/// Content slide heading: x 5%, y 5%, w 90%
const CONTENT_TITLE_BOX: (f64, f64, f64) = (5.0, 5.0, 90.0);

/// Bullet box: x 5%, y 25%, w 90%
const BULLET_BOX: (f64, f64, f64) = (5.0, 25.0, 90.0);

/// Builds [`SlideSpec`]s from slide blocks
#[derive(Debug, Clone)]
pub struct SlideAssembler {
    title_slide_size: u32,
    heading_size: u32,
    body_size: u32,
    color: String,
}

impl Default for SlideAssembler {
    fn default() -> Self {
        Self::new(&StyleConfig::default())
    }
}

impl SlideAssembler {
    /// Create an assembler using the text settings of a style
    pub fn new(style: &StyleConfig) -> Self {
        Self {
            title_slide_size: style.text.title_slide_size,
            heading_size: style.text.heading_size,
            body_size: style.text.body_size,
            color: style.text.color.clone(),
        }
    }

    /// Assemble one slide per block, in block order
    pub fn assemble(&self, blocks: &[SlideBlock], masters: &MasterRegistry) -> Vec<SlideSpec> {
        let title_master = select_title_master(masters).map(|m| m.name.clone());
        let content_master = select_content_master(masters).map(|m| m.name.clone());

        blocks
            .iter()
            .map(|block| {
                let content = block.parse();
                if block.index == 0 {
                    self.title_slide(&content, title_master.clone())
                } else {
                    self.content_slide(content, content_master.clone())
                }
            })
            .inspect(|slide| {
                debug!(
                    "Assembled {:?} slide with {} text box(es), master {:?}",
                    slide.role,
                    slide.text_boxes.len(),
                    slide.master_name
                );
            })
            .collect()
    }

    fn title_slide(&self, content: &ParsedSlideContent, master: Option<String>) -> SlideSpec {
        let (x, y, w) = TITLE_SLIDE_BOX;

        SlideSpec::new(SlideRole::Title, master).with_text_box(TextBoxSpec {
            text: TextBody::Single(content.title.clone()),
            geometry: BoxGeometry::auto_height(x, y, w),
            style: StyleHints::sized(self.title_slide_size)
                .bold()
                .centered()
                .with_color(Some(self.color.clone())),
        })
    }

    fn content_slide(&self, content: ParsedSlideContent, master: Option<String>) -> SlideSpec {
        let (x, y, w) = CONTENT_TITLE_BOX;

        let mut slide = SlideSpec::new(SlideRole::Content, master).with_text_box(TextBoxSpec {
            text: TextBody::Single(content.title),
            geometry: BoxGeometry::auto_height(x, y, w),
            style: StyleHints::sized(self.heading_size)
                .bold()
                .with_color(Some(self.color.clone())),
        });

        if !content.bullet_points.is_empty() {
            let (x, y, w) = BULLET_BOX;
            slide = slide.with_text_box(TextBoxSpec {
                text: TextBody::Bullets(content.bullet_points),
                geometry: BoxGeometry::auto_height(x, y, w),
                style: StyleHints::sized(self.body_size)
                    .bulleted()
                    .with_color(Some(self.color.clone())),
            });
        }

        slide
    }
}

/// Master for the opening slide
pub fn select_title_master(masters: &MasterRegistry) -> Option<&LayoutDefinition> {
    masters
        .find_by_name_fragment("title")
        .or_else(|| masters.first())
}

/// Master for every slide after the first
pub fn select_content_master(masters: &MasterRegistry) -> Option<&LayoutDefinition> {
    masters
        .find_by_name_fragment("content")
        .or_else(|| masters.first())
}
