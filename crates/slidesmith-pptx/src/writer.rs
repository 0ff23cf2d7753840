//! PresentationML package generation.
//!
//! Renders registered layouts and assembled slides into a complete `.pptx`
//! package. Every slide is built from free-standing text boxes whose frames
//! are computed from percentage geometry and the slide size.

use crate::constants::*;
use crate::error::{PptxError, Result};
use crate::layout::{
    Fill, Frame, LayoutDefinition, MasterRegistry, PlaceholderSpec, PlaceholderType,
    StyleDescriptor,
};
use crate::slide::{SlideRole, SlideSpec, TextBoxSpec};
use crate::style::StyleConfig;
use crate::theme::{ColorScheme, FontScheme, SlideSize, SCHEME_ROLES};
use log::debug;
use slidesmith_ooxml::{OoxmlArchive, Relationships};

/// Line height as a multiple of the font size
const LINE_SPACING: f64 = 1.2;

/// Average glyph width as a fraction of the font size
const AVG_CHAR_WIDTH: f64 = 0.5;

/// Default top + bottom text inset (0.05" each)
const VERTICAL_INSET_EMU: i64 = 91_440;

/// Default left + right text inset (0.1" each)
const HORIZONTAL_INSET_EMU: i64 = 182_880;

/// Bullet indent (0.375")
const BULLET_INDENT_EMU: i64 = 342_900;

/// PPTX package writer
pub struct PptxWriter<'a> {
    /// Text, size and metadata settings
    style: &'a StyleConfig,

    /// Slide size in EMU
    slide_size: SlideSize,

    /// Layouts registered from a theme
    masters: Option<&'a MasterRegistry>,

    /// Theme name
    theme_name: Option<&'a str>,

    /// Theme colours (merged over the Office scheme)
    color_scheme: Option<&'a ColorScheme>,

    /// Theme fonts
    font_scheme: Option<&'a FontScheme>,
}

impl<'a> PptxWriter<'a> {
    /// Create a writer for the given style
    pub fn new(style: &'a StyleConfig) -> Self {
        Self {
            style,
            slide_size: SlideSize {
                cx: style.slide.width,
                cy: style.slide.height,
            },
            masters: None,
            theme_name: None,
            color_scheme: None,
            font_scheme: None,
        }
    }

    /// Override the slide size
    pub fn with_slide_size(mut self, slide_size: SlideSize) -> Self {
        self.slide_size = slide_size;
        self
    }

    /// Render these layouts instead of the built-in pair
    pub fn with_masters(mut self, masters: &'a MasterRegistry) -> Self {
        if !masters.is_empty() {
            self.masters = Some(masters);
        }
        self
    }

    /// Use theme name, colours and fonts for the theme part
    pub fn with_theme(
        mut self,
        name: Option<&'a str>,
        color_scheme: Option<&'a ColorScheme>,
        font_scheme: Option<&'a FontScheme>,
    ) -> Self {
        self.theme_name = name;
        self.color_scheme = color_scheme;
        self.font_scheme = font_scheme;
        self
    }

    /// Generate the PPTX as bytes
    pub fn generate(&self, slides: &[SlideSpec]) -> Result<Vec<u8>> {
        let archive = self.write(slides)?;
        archive
            .to_bytes()
            .map_err(|e| PptxError::serialization(format!("failed to write package: {}", e)))
    }

    /// Build the package in memory
    pub fn write(&self, slides: &[SlideSpec]) -> Result<OoxmlArchive> {
        if slides.is_empty() {
            return Err(PptxError::serialization("presentation has no slides"));
        }
        if !self.slide_size.is_valid() {
            return Err(PptxError::serialization(format!(
                "invalid slide size {}x{}",
                self.slide_size.cx, self.slide_size.cy
            )));
        }

        let layouts = self.layouts();
        let mut archive = OoxmlArchive::new();

        archive.set_string("[Content_Types].xml", self.content_types_xml(layouts.len(), slides.len()));
        archive.set_string("_rels/.rels", root_rels().to_xml());
        archive.set_string("docProps/app.xml", self.app_xml(slides.len()));
        archive.set_string("docProps/core.xml", self.core_xml());

        let (presentation_rels, slide_rel_ids) = presentation_rels(slides.len());
        archive.set_string("ppt/presentation.xml", self.presentation_xml(&slide_rel_ids));
        archive.set_string("ppt/_rels/presentation.xml.rels", presentation_rels.to_xml());
        archive.set_string("ppt/presProps.xml", pres_props_xml());
        archive.set_string("ppt/viewProps.xml", view_props_xml());
        archive.set_string("ppt/tableStyles.xml", table_styles_xml());
        archive.set_string("ppt/theme/theme1.xml", self.theme_xml());

        let (master_rels, layout_rel_ids) = master_rels(layouts.len());
        archive.set_string("ppt/slideMasters/slideMaster1.xml", self.slide_master_xml(&layout_rel_ids));
        archive.set_string("ppt/slideMasters/_rels/slideMaster1.xml.rels", master_rels.to_xml());

        let mut layout_rels = Relationships::new();
        layout_rels.add("../slideMasters/slideMaster1.xml", Relationships::TYPE_SLIDE_MASTER);
        let layout_rels_xml = layout_rels.to_xml();

        for (i, layout) in layouts.iter().enumerate() {
            let number = i + 1;
            archive.set_string(
                format!("ppt/slideLayouts/slideLayout{}.xml", number),
                self.slide_layout_xml(layout),
            );
            archive.set_string(
                format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", number),
                layout_rels_xml.clone(),
            );
        }

        for (i, slide) in slides.iter().enumerate() {
            let number = i + 1;
            let layout_number = self.layout_number_for(slide);

            archive.set_string(
                format!("ppt/slides/slide{}.xml", number),
                self.slide_xml(slide)?,
            );

            let mut rels = Relationships::new();
            rels.add(
                format!("../slideLayouts/slideLayout{}.xml", layout_number),
                Relationships::TYPE_SLIDE_LAYOUT,
            );
            archive.set_string(format!("ppt/slides/_rels/slide{}.xml.rels", number), rels.to_xml());
        }

        debug!(
            "Wrote presentation: {} layout(s), {} slide(s), {} part(s)",
            layouts.len(),
            slides.len(),
            archive.len()
        );

        Ok(archive)
    }

    /// Layouts to render, in registration order
    fn layouts(&self) -> Vec<LayoutDefinition> {
        match self.masters {
            Some(masters) => masters.iter().cloned().collect(),
            None => builtin_layouts(self.slide_size),
        }
    }

    /// 1-based layout part number for a slide
    fn layout_number_for(&self, slide: &SlideSpec) -> usize {
        match (self.masters, slide.master_name.as_deref()) {
            (Some(masters), Some(name)) => masters.position(name).map_or(1, |p| p + 1),
            (Some(_), None) => 1,
            (None, _) => match slide.role {
                SlideRole::Title => 1,
                SlideRole::Content => 2,
            },
        }
    }

    /// Write [Content_Types].xml
    fn content_types_xml(&self, layout_count: usize, slide_count: usize) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
  <Override PartName="/ppt/presProps.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presProps+xml"/>
  <Override PartName="/ppt/tableStyles.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml"/>
  <Override PartName="/ppt/viewProps.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml"/>
  <Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>
  <Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>
  <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
  <Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
"#,
        );

        for i in 1..=layout_count {
            content.push_str(&format!(
                "  <Override PartName=\"/ppt/slideLayouts/slideLayout{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml\"/>\n",
                i
            ));
        }

        for i in 1..=slide_count {
            content.push_str(&format!(
                "  <Override PartName=\"/ppt/slides/slide{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>\n",
                i
            ));
        }

        content.push_str("</Types>");
        content
    }

    /// Write docProps/app.xml
    fn app_xml(&self, slide_count: usize) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
  <TotalTime>0</TotalTime>
  <Application>slidesmith</Application>
  <PresentationFormat>{}</PresentationFormat>
  <Slides>{}</Slides>
  <Notes>0</Notes>
  <HiddenSlides>0</HiddenSlides>
  <ScaleCrop>false</ScaleCrop>
  <LinksUpToDate>false</LinksUpToDate>
  <SharedDoc>false</SharedDoc>
  <HyperlinksChanged>false</HyperlinksChanged>
  <AppVersion>1.0</AppVersion>
</Properties>"#,
            presentation_format(self.slide_size),
            slide_count
        )
    }

    /// Write docProps/core.xml
    fn core_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <dc:title>{}</dc:title>
  <dc:creator>{}</dc:creator>
  <dc:language>{}</dc:language>
  <cp:lastModifiedBy>{}</cp:lastModifiedBy>
</cp:coreProperties>"#,
            escape_xml(&self.style.meta.title),
            escape_xml(&self.style.meta.author),
            escape_xml(&self.style.meta.locale),
            escape_xml(&self.style.meta.author),
        )
    }

    /// Write ppt/presentation.xml
    fn presentation_xml(&self, slide_rel_ids: &[String]) -> String {
        let mut slide_refs = String::new();
        for (i, rel_id) in slide_rel_ids.iter().enumerate() {
            slide_refs.push_str(&format!(
                "    <p:sldId id=\"{}\" r:id=\"{}\"/>\n",
                256 + i,
                rel_id
            ));
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">
  <p:sldMasterIdLst>
    <p:sldMasterId id="2147483648" r:id="rId1"/>
  </p:sldMasterIdLst>
  <p:sldIdLst>
{}  </p:sldIdLst>
  <p:sldSz cx="{}" cy="{}"/>
  <p:notesSz cx="{}" cy="{}"/>
</p:presentation>"#,
            NS_DRAWING,
            NS_RELATIONSHIPS,
            NS_PRESENTATION,
            slide_refs,
            self.slide_size.cx,
            self.slide_size.cy,
            self.slide_size.cy, // Notes are rotated
            self.slide_size.cx
        )
    }

    /// Write ppt/theme/theme1.xml
    fn theme_xml(&self) -> String {
        let office = ColorScheme::office();
        let scheme = self.color_scheme.unwrap_or(&office);

        let mut colors = String::new();
        for role in SCHEME_ROLES {
            let rgb = scheme
                .get(role)
                .or_else(|| office.get(role))
                .unwrap_or("000000");
            colors.push_str(&format!(
                "      <a:{role}><a:srgbClr val=\"{}\"/></a:{role}>\n",
                escape_xml(rgb),
                role = role
            ));
        }

        let (major, minor) = match self.font_scheme {
            Some(fonts) => (fonts.major.as_str(), fonts.minor.as_str()),
            None => (self.style.fonts.major.as_str(), self.style.fonts.minor.as_str()),
        };
        let theme_name = self.theme_name.unwrap_or("Office Theme");
        let scheme_name = if scheme.name.is_empty() { "Office" } else { scheme.name.as_str() };

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="{ns}" name="{name}">
  <a:themeElements>
    <a:clrScheme name="{scheme}">
{colors}    </a:clrScheme>
    <a:fontScheme name="{scheme}">
      <a:majorFont>
        <a:latin typeface="{major}"/>
        <a:ea typeface=""/>
        <a:cs typeface=""/>
      </a:majorFont>
      <a:minorFont>
        <a:latin typeface="{minor}"/>
        <a:ea typeface=""/>
        <a:cs typeface=""/>
      </a:minorFont>
    </a:fontScheme>
    <a:fmtScheme name="Office">
      <a:fillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:fillStyleLst>
      <a:lnStyleLst>
        <a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
      </a:lnStyleLst>
      <a:effectStyleLst>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
      </a:effectStyleLst>
      <a:bgFillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:bgFillStyleLst>
    </a:fmtScheme>
  </a:themeElements>
</a:theme>"#,
            ns = NS_DRAWING,
            name = escape_xml(theme_name),
            scheme = escape_xml(scheme_name),
            colors = colors,
            major = escape_xml(major),
            minor = escape_xml(minor),
        )
    }

    /// Write ppt/slideMasters/slideMaster1.xml
    fn slide_master_xml(&self, layout_rel_ids: &[String]) -> String {
        let mut layout_ids = String::new();
        for (i, rel_id) in layout_rel_ids.iter().enumerate() {
            layout_ids.push_str(&format!(
                "    <p:sldLayoutId id=\"{}\" r:id=\"{}\"/>\n",
                2_147_483_649u64 + i as u64,
                rel_id
            ));
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:cSld>
{}    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
    </p:spTree>
  </p:cSld>
  <p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
  <p:sldLayoutIdLst>
{}  </p:sldLayoutIdLst>
</p:sldMaster>"#,
            NS_DRAWING,
            NS_RELATIONSHIPS,
            NS_PRESENTATION,
            background_xml(&Fill::Solid(self.style.slide.background.clone())),
            layout_ids
        )
    }

    /// Write ppt/slideLayouts/slideLayoutN.xml
    fn slide_layout_xml(&self, layout: &LayoutDefinition) -> String {
        let type_attr = layout_type(layout)
            .map(|t| format!(" type=\"{}\"", t))
            .unwrap_or_default();

        let background = layout
            .background
            .as_ref()
            .and_then(|bg| bg.fill.as_ref())
            .map(background_xml)
            .unwrap_or_default();

        let mut shapes = String::new();
        for (i, placeholder) in layout.placeholders.iter().enumerate() {
            let style = placeholder.style.as_ref().or(
                if placeholder.kind == PlaceholderType::SlideNumber {
                    layout.slide_number_style.as_ref()
                } else {
                    None
                },
            );
            shapes.push_str(&self.placeholder_xml(i as u32 + 2, placeholder, style));
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"{} preserve="1">
  <p:cSld name="{}">
{}    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
{}    </p:spTree>
  </p:cSld>
  <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sldLayout>"#,
            NS_DRAWING,
            NS_RELATIONSHIPS,
            NS_PRESENTATION,
            type_attr,
            escape_xml(&layout.name),
            background,
            shapes
        )
    }

    /// Placeholder shape on a layout
    fn placeholder_xml(
        &self,
        id: u32,
        placeholder: &PlaceholderSpec,
        style: Option<&StyleDescriptor>,
    ) -> String {
        let mut ph_attrs = String::new();
        if !matches!(placeholder.kind, PlaceholderType::Object | PlaceholderType::Other) {
            ph_attrs.push_str(&format!(" type=\"{}\"", placeholder.kind.ooxml_type()));
        }
        if placeholder.index != 0 {
            ph_attrs.push_str(&format!(" idx=\"{}\"", placeholder.index));
        }

        let shape_fill = style
            .and_then(|s| s.fill.as_ref())
            .map(|fill| format!("<a:solidFill>{}</a:solidFill>", color_xml(fill)))
            .unwrap_or_default();
        let sp_pr = match placeholder.frame {
            Some(frame) => format!("<p:spPr>{}{}</p:spPr>", xfrm_xml(frame), shape_fill),
            None if !shape_fill.is_empty() => format!("<p:spPr>{}</p:spPr>", shape_fill),
            None => "<p:spPr/>".to_string(),
        };

        let lst_style = match style {
            Some(s) if s.font_size.is_some() || s.color.is_some() => {
                let size = s.font_size.map(|sz| format!(" sz=\"{}\"", sz)).unwrap_or_default();
                let color = s
                    .color
                    .as_ref()
                    .map(|c| format!("<a:solidFill>{}</a:solidFill>", color_xml(c)))
                    .unwrap_or_default();
                format!(
                    "<a:lstStyle><a:lvl1pPr><a:defRPr{}>{}</a:defRPr></a:lvl1pPr></a:lstStyle>",
                    size, color
                )
            }
            _ => "<a:lstStyle/>".to_string(),
        };

        let name = if placeholder.name.is_empty() {
            format!("Placeholder {}", id - 1)
        } else {
            placeholder.name.clone()
        };

        format!(
            r#"      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="{}" name="{}"/>
          <p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>
          <p:nvPr><p:ph{}/></p:nvPr>
        </p:nvSpPr>
        {}
        <p:txBody>
          <a:bodyPr/>
          {}
          <a:p><a:endParaRPr lang="{}"/></a:p>
        </p:txBody>
      </p:sp>
"#,
            id,
            escape_xml(&name),
            ph_attrs,
            sp_pr,
            lst_style,
            escape_xml(&self.style.meta.locale)
        )
    }

    /// Write ppt/slides/slideN.xml
    fn slide_xml(&self, slide: &SlideSpec) -> Result<String> {
        let mut shapes = String::new();
        for (i, text_box) in slide.text_boxes.iter().enumerate() {
            shapes.push_str(&self.text_box_xml(i as u32 + 2, text_box)?);
        }

        Ok(format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:cSld>
    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
{}    </p:spTree>
  </p:cSld>
  <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sld>"#,
            NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION, shapes
        ))
    }

    /// Free text shape for one text box
    fn text_box_xml(&self, id: u32, text_box: &TextBoxSpec) -> Result<String> {
        text_box.geometry.validate()?;

        let frame = self.frame_for(text_box);
        let auto_fit = if text_box.geometry.h.to_emu(self.slide_size.cy).is_none() {
            "<a:spAutoFit/>"
        } else {
            "<a:normAutofit/>"
        };

        let mut paragraphs = String::new();
        for text in text_box.text.paragraphs() {
            paragraphs.push_str(&self.paragraph_xml(text, text_box));
        }

        Ok(format!(
            r#"      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="{}" name="TextBox {}"/>
          <p:cNvSpPr txBox="1"/>
          <p:nvPr/>
        </p:nvSpPr>
        <p:spPr>
          {}
          <a:prstGeom prst="rect"><a:avLst/></a:prstGeom>
          <a:noFill/>
        </p:spPr>
        <p:txBody>
          <a:bodyPr wrap="square" rtlCol="0">{}</a:bodyPr>
          <a:lstStyle/>
{}        </p:txBody>
      </p:sp>
"#,
            id,
            id - 1,
            xfrm_xml(frame),
            auto_fit,
            paragraphs
        ))
    }

    /// One paragraph with a single run
    fn paragraph_xml(&self, text: &str, text_box: &TextBoxSpec) -> String {
        let hints = &text_box.style;
        let align = hints.align.ooxml();

        let p_pr = if hints.bulleted {
            format!(
                "<a:pPr marL=\"{}\" indent=\"-{}\" algn=\"{}\"><a:buFont typeface=\"Arial\"/><a:buChar char=\"&#8226;\"/></a:pPr>",
                BULLET_INDENT_EMU, BULLET_INDENT_EMU, align
            )
        } else {
            format!("<a:pPr algn=\"{}\"/>", align)
        };

        let mut r_pr = format!(
            "lang=\"{}\" sz=\"{}\"",
            escape_xml(&self.style.meta.locale),
            hints.font_size * 100
        );
        if hints.bold {
            r_pr.push_str(" b=\"1\"");
        }
        r_pr.push_str(" dirty=\"0\"");

        let fill = hints
            .color
            .as_ref()
            .map(|rgb| format!("<a:solidFill><a:srgbClr val=\"{}\"/></a:solidFill>", escape_xml(rgb)))
            .unwrap_or_default();

        if text.is_empty() {
            return format!(
                "          <a:p>{}<a:endParaRPr {}>{}</a:endParaRPr></a:p>\n",
                p_pr, r_pr, fill
            );
        }

        format!(
            "          <a:p>{}<a:r><a:rPr {}>{}</a:rPr><a:t>{}</a:t></a:r></a:p>\n",
            p_pr,
            r_pr,
            fill,
            escape_xml(text)
        )
    }

    /// Absolute frame of a text box in EMU
    fn frame_for(&self, text_box: &TextBoxSpec) -> Frame {
        let SlideSize { cx: width, cy: height } = self.slide_size;
        let geometry = &text_box.geometry;

        let x = geometry.x.to_emu(width).unwrap_or(0);
        let y = geometry.y.to_emu(height).unwrap_or(0);
        let cx = geometry.w.to_emu(width).unwrap_or(width - x);
        let cy = geometry
            .h
            .to_emu(height)
            .unwrap_or_else(|| estimate_height(text_box, cx).min((height - y).max(line_height(text_box))));

        Frame::new(x, y, cx, cy)
    }
}

/// Height needed to show a text box's paragraphs at its font size
fn estimate_height(text_box: &TextBoxSpec, width: i64) -> i64 {
    let font_size = text_box.style.font_size.max(1) as f64;
    let mut usable = width - HORIZONTAL_INSET_EMU;
    if text_box.style.bulleted {
        usable -= BULLET_INDENT_EMU;
    }
    let char_width = font_size * AVG_CHAR_WIDTH * EMU_PER_POINT as f64;
    let chars_per_line = ((usable.max(1) as f64) / char_width).floor().max(1.0);

    let lines: f64 = text_box
        .text
        .paragraphs()
        .iter()
        .map(|p| (p.chars().count() as f64 / chars_per_line).ceil().max(1.0))
        .sum();

    (lines * line_height(text_box) as f64).round() as i64 + VERTICAL_INSET_EMU
}

fn line_height(text_box: &TextBoxSpec) -> i64 {
    (text_box.style.font_size as f64 * LINE_SPACING * EMU_PER_POINT as f64).round() as i64
}

/// The two layouts written when no theme layouts are registered
pub fn builtin_layouts(slide_size: SlideSize) -> Vec<LayoutDefinition> {
    let frame = |x: f64, y: f64, w: f64, h: f64| {
        Frame::new(
            (slide_size.cx as f64 * x).round() as i64,
            (slide_size.cy as f64 * y).round() as i64,
            (slide_size.cx as f64 * w).round() as i64,
            (slide_size.cy as f64 * h).round() as i64,
        )
    };

    let mut title = LayoutDefinition::new("Title Slide");
    title.add_placeholder(
        PlaceholderSpec::new(PlaceholderType::CenterTitle, 0, "Title 1")
            .with_frame(frame(0.075, 0.31, 0.85, 0.214)),
    );
    title.add_placeholder(
        PlaceholderSpec::new(PlaceholderType::Subtitle, 1, "Subtitle 2")
            .with_frame(frame(0.15, 0.567, 0.70, 0.255)),
    );

    let mut content = LayoutDefinition::new("Title and Content");
    content.add_placeholder(
        PlaceholderSpec::new(PlaceholderType::Title, 0, "Title 1")
            .with_frame(frame(0.05, 0.04, 0.90, 0.167)),
    );
    content.add_placeholder(
        PlaceholderSpec::new(PlaceholderType::Object, 1, "Content Placeholder 2")
            .with_frame(frame(0.05, 0.233, 0.90, 0.66)),
    );

    vec![title, content]
}

/// `type` attribute for a layout, from its placeholders
fn layout_type(layout: &LayoutDefinition) -> Option<&'static str> {
    if layout.has_placeholder(PlaceholderType::CenterTitle) {
        Some("title")
    } else if layout.title_placeholder().is_some() && layout.body_placeholder().is_some() {
        Some("obj")
    } else {
        None
    }
}

fn root_rels() -> Relationships {
    let mut rels = Relationships::new();
    rels.add("ppt/presentation.xml", Relationships::TYPE_OFFICE_DOCUMENT);
    rels.add("docProps/core.xml", Relationships::TYPE_CORE_PROPERTIES);
    rels.add("docProps/app.xml", Relationships::TYPE_EXTENDED_PROPERTIES);
    rels
}

/// Presentation relationships and the IDs of its slides
///
/// The slide master is always `rId1`.
fn presentation_rels(slide_count: usize) -> (Relationships, Vec<String>) {
    let mut rels = Relationships::new();
    rels.add("slideMasters/slideMaster1.xml", Relationships::TYPE_SLIDE_MASTER);
    rels.add("presProps.xml", Relationships::TYPE_PRES_PROPS);
    rels.add("viewProps.xml", Relationships::TYPE_VIEW_PROPS);
    rels.add("tableStyles.xml", Relationships::TYPE_TABLE_STYLES);
    rels.add("theme/theme1.xml", Relationships::TYPE_THEME);

    let slide_ids = (1..=slide_count)
        .map(|i| rels.add(format!("slides/slide{}.xml", i), Relationships::TYPE_SLIDE))
        .collect();

    (rels, slide_ids)
}

/// Slide master relationships and the IDs of its layouts
fn master_rels(layout_count: usize) -> (Relationships, Vec<String>) {
    let mut rels = Relationships::new();
    let layout_ids = (1..=layout_count)
        .map(|i| {
            rels.add(
                format!("../slideLayouts/slideLayout{}.xml", i),
                Relationships::TYPE_SLIDE_LAYOUT,
            )
        })
        .collect();
    rels.add("../theme/theme1.xml", Relationships::TYPE_THEME);

    (rels, layout_ids)
}

fn pres_props_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentationPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"/>"#,
        NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION
    )
}

fn table_styles_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:tblStyleLst xmlns:a="{}" def="{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}"/>"#,
        NS_DRAWING
    )
}

fn view_props_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:viewPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:normalViewPr>
    <p:restoredLeft sz="15620"/>
    <p:restoredTop sz="94660"/>
  </p:normalViewPr>
  <p:gridSpacing cx="76200" cy="76200"/>
</p:viewPr>"#,
        NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION
    )
}

fn xfrm_xml(frame: Frame) -> String {
    format!(
        "<a:xfrm><a:off x=\"{}\" y=\"{}\"/><a:ext cx=\"{}\" cy=\"{}\"/></a:xfrm>",
        frame.x, frame.y, frame.cx, frame.cy
    )
}

fn color_xml(fill: &Fill) -> String {
    match fill {
        Fill::Solid(rgb) => format!("<a:srgbClr val=\"{}\"/>", escape_xml(rgb)),
        Fill::Scheme(name) => format!("<a:schemeClr val=\"{}\"/>", escape_xml(name)),
    }
}

fn background_xml(fill: &Fill) -> String {
    format!(
        "    <p:bg><p:bgPr><a:solidFill>{}</a:solidFill><a:effectLst/></p:bgPr></p:bg>\n",
        color_xml(fill)
    )
}

/// `PresentationFormat` label for app.xml
fn presentation_format(size: SlideSize) -> &'static str {
    let ratio = size.cx as f64 / size.cy as f64;
    if (ratio - 16.0 / 9.0).abs() < 0.01 {
        "On-screen Show (16:9)"
    } else if (ratio - 4.0 / 3.0).abs() < 0.01 {
        "On-screen Show (4:3)"
    } else if (ratio - 16.0 / 10.0).abs() < 0.01 {
        "On-screen Show (16:10)"
    } else {
        "Custom"
    }
}

/// Escape XML special characters, dropping characters XML 1.0 cannot carry
fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(c),
            c if (c as u32) < 0x20 => {}
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slide::{BoxGeometry, StyleHints, TextBody};

    fn title_slide(text: &str) -> SlideSpec {
        SlideSpec::new(SlideRole::Title, None).with_text_box(TextBoxSpec {
            text: TextBody::Single(text.into()),
            geometry: BoxGeometry::auto_height(5.0, 40.0, 90.0),
            style: StyleHints::sized(44)
                .bold()
                .centered()
                .with_color(Some("363636".into())),
        })
    }

    fn bullet_slide(items: &[&str]) -> SlideSpec {
        SlideSpec::new(SlideRole::Content, None).with_text_box(TextBoxSpec {
            text: TextBody::Bullets(items.iter().map(|s| s.to_string()).collect()),
            geometry: BoxGeometry::auto_height(5.0, 25.0, 90.0),
            style: StyleHints::sized(24).bulleted(),
        })
    }

    #[test]
    fn test_empty_presentation_rejected() {
        let style = StyleConfig::default();
        let err = PptxWriter::new(&style).generate(&[]).unwrap_err();
        assert!(matches!(err, PptxError::Serialization { .. }));
    }

    #[test]
    fn test_package_parts() {
        let style = StyleConfig::default();
        let archive = PptxWriter::new(&style)
            .write(&[title_slide("Welcome"), bullet_slide(&["A", "B"])])
            .unwrap();

        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/app.xml",
            "docProps/core.xml",
            "ppt/presentation.xml",
            "ppt/_rels/presentation.xml.rels",
            "ppt/presProps.xml",
            "ppt/viewProps.xml",
            "ppt/tableStyles.xml",
            "ppt/theme/theme1.xml",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/slideLayouts/slideLayout2.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
            "ppt/slides/_rels/slide2.xml.rels",
        ] {
            assert!(archive.contains(part), "missing {}", part);
        }

        let content_types = archive.get_string("[Content_Types].xml").unwrap();
        assert!(content_types.contains("/ppt/slides/slide2.xml"));
        assert!(content_types.contains("/ppt/slideLayouts/slideLayout2.xml"));
        assert!(!content_types.contains("slideLayout3.xml"));
    }

    #[test]
    fn test_builtin_layout_selection() {
        let style = StyleConfig::default();
        let archive = PptxWriter::new(&style)
            .write(&[title_slide("Welcome"), bullet_slide(&["A"])])
            .unwrap();

        let rels = archive.get_string("ppt/slides/_rels/slide1.xml.rels").unwrap();
        assert!(rels.contains("../slideLayouts/slideLayout1.xml"));
        let rels = archive.get_string("ppt/slides/_rels/slide2.xml.rels").unwrap();
        assert!(rels.contains("../slideLayouts/slideLayout2.xml"));

        let layout = archive.get_string("ppt/slideLayouts/slideLayout1.xml").unwrap();
        assert!(layout.contains("name=\"Title Slide\""));
        assert!(layout.contains("type=\"ctrTitle\""));
    }

    #[test]
    fn test_registered_masters_become_layouts() {
        let style = StyleConfig::default();
        let mut masters = MasterRegistry::new();
        masters.register(
            LayoutDefinition::new("Title Master")
                .with_background(StyleDescriptor::filled(Fill::Scheme("accent1".into()))),
        );
        masters.register(LayoutDefinition::new("Content Master"));
        masters.register(LayoutDefinition::new("Quote"));

        let mut slide = bullet_slide(&["A"]);
        slide.master_name = Some("Content Master".into());

        let archive = PptxWriter::new(&style)
            .with_masters(&masters)
            .write(&[slide])
            .unwrap();

        assert!(archive.contains("ppt/slideLayouts/slideLayout3.xml"));
        let layout = archive.get_string("ppt/slideLayouts/slideLayout1.xml").unwrap();
        assert!(layout.contains("name=\"Title Master\""));
        assert!(layout.contains("<a:schemeClr val=\"accent1\"/>"));

        let rels = archive.get_string("ppt/slides/_rels/slide1.xml.rels").unwrap();
        assert!(rels.contains("../slideLayouts/slideLayout2.xml"));

        let master = archive.get_string("ppt/slideMasters/slideMaster1.xml").unwrap();
        assert_eq!(master.matches("<p:sldLayoutId ").count(), 3);
    }

    #[test]
    fn test_slide_text_runs() {
        let style = StyleConfig::default().with_locale("fr-FR");
        let archive = PptxWriter::new(&style)
            .write(&[title_slide("Café & co"), bullet_slide(&["Un", "Deux"])])
            .unwrap();

        let slide1 = archive.get_string("ppt/slides/slide1.xml").unwrap();
        assert!(slide1.contains("<a:t>Café &amp; co</a:t>"));
        assert!(slide1.contains("lang=\"fr-FR\" sz=\"4400\" b=\"1\""));
        assert!(slide1.contains("algn=\"ctr\""));
        assert!(slide1.contains("<a:srgbClr val=\"363636\"/>"));
        assert!(slide1.contains("<a:spAutoFit/>"));

        let slide2 = archive.get_string("ppt/slides/slide2.xml").unwrap();
        assert_eq!(slide2.matches("<a:buChar char=\"&#8226;\"/>").count(), 2);
        assert!(slide2.contains("<a:t>Deux</a:t>"));
    }

    #[test]
    fn test_frames_from_percentages() {
        let style = StyleConfig::default();
        let archive = PptxWriter::new(&style).write(&[title_slide("Welcome")]).unwrap();
        let slide = archive.get_string("ppt/slides/slide1.xml").unwrap();

        // x = 5% of 9144000, y = 40% of 5143500, w = 90% of 9144000
        assert!(slide.contains("<a:off x=\"457200\" y=\"2057400\"/>"));
        assert!(slide.contains("<a:ext cx=\"8229600\""));
    }

    #[test]
    fn test_out_of_range_slide_size_rejected() {
        let style = StyleConfig::default();
        for size in [SlideSize { cx: 1, cy: 1 }, SlideSize { cx: 0, cy: 5_143_500 }] {
            let err = PptxWriter::new(&style)
                .with_slide_size(size)
                .generate(&[title_slide("Welcome")])
                .unwrap_err();
            assert!(matches!(err, PptxError::Serialization { .. }));
        }
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        let style = StyleConfig::default();
        let mut slide = title_slide("Welcome");
        slide.text_boxes[0].geometry = BoxGeometry::auto_height(50.0, 40.0, 90.0);

        let err = PptxWriter::new(&style).generate(&[slide]).unwrap_err();
        assert!(matches!(err, PptxError::Serialization { .. }));
    }

    #[test]
    fn test_theme_part_uses_scheme() {
        let style = StyleConfig::default();
        let scheme = ColorScheme {
            name: "Harbour".into(),
            colors: vec![("accent1".into(), "1F6FB2".into())],
        };
        let fonts = FontScheme {
            major: "Georgia".into(),
            minor: "Verdana".into(),
        };

        let archive = PptxWriter::new(&style)
            .with_theme(Some("Harbour"), Some(&scheme), Some(&fonts))
            .write(&[title_slide("Welcome")])
            .unwrap();
        let theme = archive.get_string("ppt/theme/theme1.xml").unwrap();

        assert!(theme.contains("<a:accent1><a:srgbClr val=\"1F6FB2\"/></a:accent1>"));
        // Missing roles come from the Office scheme
        assert!(theme.contains("<a:accent2><a:srgbClr val=\"ED7D31\"/></a:accent2>"));
        assert!(theme.contains("<a:latin typeface=\"Georgia\"/>"));
        assert!(theme.contains("name=\"Harbour\""));
    }

    #[test]
    fn test_estimate_height_grows_with_text() {
        let short = title_slide("Hi");
        let long = title_slide(&"word ".repeat(60));

        let short_height = estimate_height(&short.text_boxes[0], 8_229_600);
        let long_height = estimate_height(&long.text_boxes[0], 8_229_600);

        assert_eq!(short_height, line_height(&short.text_boxes[0]) + VERTICAL_INSET_EMU);
        assert!(long_height > short_height);
    }

    #[test]
    fn test_presentation_format() {
        assert_eq!(
            presentation_format(SlideSize { cx: 9_144_000, cy: 5_143_500 }),
            "On-screen Show (16:9)"
        );
        assert_eq!(
            presentation_format(SlideSize { cx: 9_144_000, cy: 6_858_000 }),
            "On-screen Show (4:3)"
        );
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("Hello & World"), "Hello &amp; World");
        assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
        assert_eq!(escape_xml("\"quoted\""), "&quot;quoted&quot;");
        assert_eq!(escape_xml("bell\u{7}"), "bell");
    }
}
