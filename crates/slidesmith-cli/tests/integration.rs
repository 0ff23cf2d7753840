//! Integration tests for the slidesmith CLI
//!
//! These drive the command functions against real files:
//! outline (+ theme) -> PPTX

use std::fs;
use std::io::{Cursor, Write};

use slidesmith_cli::{generate_command, inspect_theme_command, OutputFormat};
use slidesmith_ooxml::OoxmlArchive;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const OUTLINE: &str = "# Quarterly Review\n\n## Highlights\n- Revenue up\n- Churn down\n\n## Next Steps\n- Hire\n- Ship\n";

/// Create a minimal `.thmx` with one master and two named layouts
fn create_test_theme() -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    zip.start_file("theme/theme/theme1.xml", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Brand">
  <a:themeElements>
    <a:clrScheme name="Brand">
      <a:dk1><a:srgbClr val="000000"/></a:dk1>
      <a:accent1><a:srgbClr val="C00000"/></a:accent1>
    </a:clrScheme>
  </a:themeElements>
</a:theme>"#,
    )
    .unwrap();

    zip.start_file("theme/slideMasters/slideMaster1.xml", options)
        .unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld><p:spTree/></p:cSld>
</p:sldMaster>"#,
    )
    .unwrap();

    for (number, name) in [(1, "Title Master"), (2, "Content Master")] {
        zip.start_file(format!("theme/slideLayouts/slideLayout{}.xml", number), options)
            .unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld name="{}"><p:spTree/></p:cSld>
</p:sldLayout>"#,
                name
            )
            .as_bytes(),
        )
        .unwrap();
    }

    zip.finish().unwrap();
    buffer.into_inner()
}

fn slide_count(archive: &OoxmlArchive) -> usize {
    archive.numbered_parts("slides", "slide").len()
}

#[test]
fn test_generate_default_output_path() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("review.txt");
    fs::write(&input, OUTLINE).unwrap();

    let written = generate_command(&input, None, None, None, None).unwrap();
    assert_eq!(written, dir.path().join("review.pptx"));

    let archive = OoxmlArchive::open(&written).unwrap();
    assert_eq!(slide_count(&archive), 3);

    let slide = archive.get_string("ppt/slides/slide2.xml").unwrap();
    assert!(slide.contains("Highlights"));
    assert!(slide.contains("Churn down"));
}

#[test]
fn test_generate_with_theme_and_style() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("review.txt");
    let theme = dir.path().join("brand.thmx");
    let config = dir.path().join("style.toml");
    let output = dir.path().join("out.pptx");

    fs::write(&input, OUTLINE).unwrap();
    fs::write(&theme, create_test_theme()).unwrap();
    fs::write(&config, "[text]\nbody_size = 20\n").unwrap();

    generate_command(
        &input,
        Some(&output),
        Some(&theme),
        Some(&config),
        Some("nl-NL"),
    )
    .unwrap();

    let archive = OoxmlArchive::open(&output).unwrap();
    assert_eq!(slide_count(&archive), 3);

    let layout = archive.get_string("ppt/slideLayouts/slideLayout1.xml").unwrap();
    assert!(layout.contains("Title Master"));

    let rels = archive.get_string("ppt/slides/_rels/slide2.xml.rels").unwrap();
    assert!(rels.contains("../slideLayouts/slideLayout2.xml"));

    let slide = archive.get_string("ppt/slides/slide2.xml").unwrap();
    assert!(slide.contains("lang=\"nl-NL\""));
    assert!(slide.contains("sz=\"2000\""));

    let theme_part = archive.get_string("ppt/theme/theme1.xml").unwrap();
    assert!(theme_part.contains("C00000"));
}

#[test]
fn test_generate_with_unreadable_theme_still_succeeds() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("review.txt");
    let theme = dir.path().join("broken.thmx");

    fs::write(&input, OUTLINE).unwrap();
    fs::write(&theme, b"this is not a zip archive").unwrap();

    let written = generate_command(&input, None, Some(&theme), None, None).unwrap();
    let archive = OoxmlArchive::open(&written).unwrap();
    assert_eq!(slide_count(&archive), 3);
}

#[test]
fn test_generate_missing_input() {
    let dir = TempDir::new().unwrap();
    let err = generate_command(&dir.path().join("missing.txt"), None, None, None, None)
        .unwrap_err();
    assert!(err.to_string().contains("Input file not found"));
}

#[test]
fn test_generate_empty_outline_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("empty.txt");
    fs::write(&input, "\n\n\n").unwrap();

    assert!(generate_command(&input, None, None, None, None).is_err());
}

#[test]
fn test_generate_bad_style_config() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("review.txt");
    let config = dir.path().join("style.toml");
    fs::write(&input, OUTLINE).unwrap();
    fs::write(&config, "[text]\ncolor = \"not-a-colour\"\n").unwrap();

    let err = generate_command(&input, None, None, Some(&config), None).unwrap_err();
    assert!(err.to_string().contains("Failed to load style config"));
}

#[test]
fn test_inspect_theme() {
    let dir = TempDir::new().unwrap();
    let theme = dir.path().join("brand.thmx");
    fs::write(&theme, create_test_theme()).unwrap();

    inspect_theme_command(&theme, OutputFormat::Text).unwrap();
    inspect_theme_command(&theme, OutputFormat::Json).unwrap();
}

#[test]
fn test_inspect_theme_rejects_non_package() {
    let dir = TempDir::new().unwrap();
    let theme = dir.path().join("broken.thmx");
    fs::write(&theme, b"plain text").unwrap();

    assert!(inspect_theme_command(&theme, OutputFormat::Text).is_err());
}
