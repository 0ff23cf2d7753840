//! # slidesmith-ooxml
//!
//! Open Packaging Convention (OPC) access for slidesmith.
//!
//! PowerPoint documents, templates and Office themes (`.pptx`, `.potx`,
//! `.thmx`) are ZIP archives of XML parts tied together by relationship
//! files. This crate provides:
//! - An unpacked, in-memory view of a package ([`OoxmlArchive`])
//! - Parsing and serialization of `.rels` parts ([`Relationships`])
//!
//! ## Example
//!
//! ```no_run
//! use slidesmith_ooxml::{OoxmlArchive, Relationships};
//!
//! let archive = OoxmlArchive::open("corporate.thmx")?;
//! for (index, part) in archive.numbered_parts("slideLayouts", "slideLayout") {
//!     let rels_path = OoxmlArchive::rels_path_for(&part);
//!     if let Some(xml) = archive.get(&rels_path) {
//!         let rels = Relationships::parse(xml)?;
//!         println!("layout {} has {} relationships", index, rels.len());
//!     }
//! }
//! # Ok::<(), slidesmith_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod error;
pub mod relationships;

pub use archive::OoxmlArchive;
pub use error::{OoxmlError, Result};
pub use relationships::{RelationshipTarget, Relationships};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
