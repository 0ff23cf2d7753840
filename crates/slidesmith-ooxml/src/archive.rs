//! Archive handling for OOXML packages
//!
//! PPTX, POTX and THMX files are ZIP archives containing XML parts and
//! resources. Themes and presentations root their parts differently
//! (`theme/...` vs `ppt/...`), so part discovery here matches on the
//! trailing directory and file stem rather than on a fixed root.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use zip::read::ZipArchive;
use zip::write::ZipWriter;
use zip::CompressionMethod;

use crate::error::Result;

/// Represents an unpacked OOXML package
#[derive(Debug, Default)]
pub struct OoxmlArchive {
    /// All parts in the archive, keyed by path
    files: HashMap<String, Vec<u8>>,
}

impl OoxmlArchive {
    /// Create an empty package
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and unpack a package file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Unpack a package held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Create from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut files = HashMap::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            // Skip directories
            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            files.insert(name, contents);
        }

        Ok(Self { files })
    }

    /// Get a part's contents by path
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    /// Get a part's contents as a string (lossy UTF-8)
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.files
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Check if a part exists in the archive
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// List all parts in the archive
    pub fn file_list(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(|s| s.as_str())
    }

    /// Number of parts in the archive
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the archive has no parts
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Find numbered parts such as `slideLayout3.xml` inside a directory
    /// named `dir`, wherever that directory sits in the package.
    ///
    /// Returns `(number, path)` pairs sorted by number. Relationship parts
    /// and files without a numeric suffix are ignored.
    pub fn numbered_parts(&self, dir: &str, stem: &str) -> Vec<(u32, String)> {
        let mut parts: Vec<(u32, String)> = self
            .files
            .keys()
            .filter_map(|path| {
                let (parent, file_name) = path.rsplit_once('/')?;
                let parent_name = parent.rsplit('/').next().unwrap_or(parent);
                if parent_name != dir {
                    return None;
                }
                let number = file_name
                    .strip_prefix(stem)?
                    .strip_suffix(".xml")?
                    .parse::<u32>()
                    .ok()?;
                Some((number, path.clone()))
            })
            .collect();

        parts.sort();
        parts
    }

    /// Find the first part whose path ends with the given suffix
    /// (e.g. `"/presentation.xml"`).
    pub fn find_by_suffix(&self, suffix: &str) -> Option<&str> {
        let mut matches: Vec<&str> = self
            .files
            .keys()
            .map(|s| s.as_str())
            .filter(|path| path.ends_with(suffix))
            .collect();
        matches.sort();
        matches.into_iter().next()
    }

    /// Path of the relationships part belonging to `part`
    ///
    /// `ppt/slideLayouts/slideLayout1.xml` becomes
    /// `ppt/slideLayouts/_rels/slideLayout1.xml.rels`.
    pub fn rels_path_for(part: &str) -> String {
        match part.rsplit_once('/') {
            Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
            None => format!("_rels/{}.rels", part),
        }
    }

    /// Set or update a part's contents
    pub fn set(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        self.files.insert(path.into(), contents);
    }

    /// Set a part's contents from a string
    pub fn set_string(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into().into_bytes());
    }

    /// Remove a part from the archive
    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.files.remove(path)
    }

    /// Write the archive to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Write the archive to any writer
    ///
    /// `[Content_Types].xml` is written first, as Office expects; the
    /// remaining parts follow in sorted order for deterministic output.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated);

        let mut paths: Vec<_> = self.files.keys().collect();
        paths.sort_by(|a, b| {
            let a_key = (a.as_str() != "[Content_Types].xml", a.as_str());
            let b_key = (b.as_str() != "[Content_Types].xml", b.as_str());
            a_key.cmp(&b_key)
        });

        for path in paths {
            let contents = &self.files[path];
            zip.start_file(path.as_str(), options)?;
            zip.write_all(contents)?;
        }

        zip.finish()?;
        Ok(())
    }

    /// Serialize the archive to an in-memory ZIP buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_to(&mut buffer)?;
        Ok(buffer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OoxmlError;

    #[test]
    fn test_file_operations() {
        let mut archive = OoxmlArchive::new();

        archive.set_string("test.xml", "<root/>");
        assert!(archive.contains("test.xml"));
        assert_eq!(archive.get_string("test.xml"), Some("<root/>".to_string()));
        assert_eq!(archive.len(), 1);

        archive.remove("test.xml");
        assert!(!archive.contains("test.xml"));
        assert!(archive.is_empty());
    }

    #[test]
    fn test_numbered_parts_any_root() {
        let mut archive = OoxmlArchive::new();
        archive.set_string("ppt/slideLayouts/slideLayout10.xml", "<a/>");
        archive.set_string("ppt/slideLayouts/slideLayout2.xml", "<a/>");
        archive.set_string("theme/slideLayouts/slideLayout1.xml", "<a/>");
        archive.set_string("ppt/slideLayouts/_rels/slideLayout2.xml.rels", "<a/>");
        archive.set_string("ppt/slideMasters/slideMaster1.xml", "<a/>");

        let parts = archive.numbered_parts("slideLayouts", "slideLayout");
        let numbers: Vec<u32> = parts.iter().map(|(n, _)| *n).collect();

        assert_eq!(numbers, vec![1, 2, 10]);
        assert_eq!(parts[0].1, "theme/slideLayouts/slideLayout1.xml");
    }

    #[test]
    fn test_find_by_suffix() {
        let mut archive = OoxmlArchive::new();
        archive.set_string("ppt/presentation.xml", "<p/>");
        archive.set_string("ppt/_rels/presentation.xml.rels", "<r/>");

        assert_eq!(
            archive.find_by_suffix("/presentation.xml"),
            Some("ppt/presentation.xml")
        );
        assert_eq!(archive.find_by_suffix("/missing.xml"), None);
    }

    #[test]
    fn test_rels_path_for() {
        assert_eq!(
            OoxmlArchive::rels_path_for("ppt/slideLayouts/slideLayout1.xml"),
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels"
        );
        assert_eq!(
            OoxmlArchive::rels_path_for("presentation.xml"),
            "_rels/presentation.xml.rels"
        );
    }

    #[test]
    fn test_roundtrip_through_bytes() {
        let mut archive = OoxmlArchive::new();
        archive.set_string("ppt/presentation.xml", "<p:presentation/>");
        archive.set_string("[Content_Types].xml", "<Types/>");

        let bytes = archive.to_bytes().unwrap();
        let restored = OoxmlArchive::from_bytes(&bytes).unwrap();

        assert_eq!(restored.len(), 2);
        assert_eq!(
            restored.get_string("ppt/presentation.xml"),
            Some("<p:presentation/>".to_string())
        );
    }

    #[test]
    fn test_content_types_written_first() {
        let mut archive = OoxmlArchive::new();
        archive.set_string("a.xml", "<a/>");
        archive.set_string("[Content_Types].xml", "<Types/>");

        let bytes = archive.to_bytes().unwrap();
        let mut zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let first = zip.by_index(0).unwrap();

        assert_eq!(first.name(), "[Content_Types].xml");
    }

    #[test]
    fn test_garbage_is_archive_error() {
        let result = OoxmlArchive::from_bytes(b"definitely not a zip file");
        assert!(matches!(result, Err(OoxmlError::Archive(_))));
    }

    #[test]
    fn test_write_and_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.zip");

        let mut archive = OoxmlArchive::new();
        archive.set_string("theme/theme/theme1.xml", "<a:theme/>");
        archive.write_to_file(&path).unwrap();

        let restored = OoxmlArchive::open(&path).unwrap();
        assert!(restored.contains("theme/theme/theme1.xml"));
    }
}
