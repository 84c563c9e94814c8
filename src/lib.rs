//! # pdfslice
//!
//! Geometric query engine for documents converted into annotated XML
//! layout trees (`pdftohtml -xml`).
//!
//! Documents whose only reliable structure is 2-D layout (ministry
//! reports, gazettes, statistical annexes) can still be mined by reasoning
//! over fragment geometry. pdfslice parses the annotated tree, exposes every
//! positioned text/image fragment, and lets you chain tolerant geometric
//! and textual predicates to locate content and reconstruct tables.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfslice::{open, ConvertOptions, Filter};
//!
//! fn main() -> pdfslice::Result<()> {
//!     let doc = open("report.pdf", &ConvertOptions::default())?;
//!
//!     // Everything right of the "Total" label, in the same visual band.
//!     let label = doc.filter(&Filter::new().auto_regex("^Total$"))?;
//!     let value = doc.all().strictly_right_of(&label, false);
//!     println!("{}", value.clean_text(true));
//!
//!     Ok(())
//! }
//! ```
//!
//! Selections are cheap, immutable views; every operation returns a new
//! one:
//!
//! ```
//! use pdfslice::{from_xml_str, TableOptions};
//!
//! let doc = from_xml_str(
//!     r#"<pdf2xml><page number="1" width="600" height="800">
//!         <text top="100" left="80" width="60" height="12">name</text>
//!         <text top="100" left="300" width="60" height="12">value</text>
//!         <text top="130" left="80" width="60" height="12">alpha</text>
//!         <text top="130" left="300" width="60" height="12">42</text>
//!     </page></pdf2xml>"#,
//! )
//! .unwrap();
//!
//! let grid = doc.all().get_table(&TableOptions::new());
//! assert_eq!(grid.len(), 2);
//! assert_eq!(grid[1][1].as_deref(), Some("42"));
//! ```

pub mod convert;
pub mod error;
pub mod model;
pub mod query;
pub mod table;
pub mod text;

pub use convert::{convert_pdf, ConvertOptions};
pub use error::{Error, Result};
pub use model::{BBox, Document, Element, FontSpec, Page, Tag};
pub use query::{Cmp, Filter, IntoRegion, PosAttr, Region, Selection, LINE_THRESHOLD};
pub use table::{extract_table, extract_table_filtered, TableOptions, DEFAULT_ROW_THRESHOLD};

use std::path::{Path, PathBuf};

/// Convert a PDF with the external tool and parse the resulting tree.
pub fn open<P: AsRef<Path>>(path: P, options: &ConvertOptions) -> Result<Document> {
    Document::open(path, options)
}

/// Parse an annotated XML tree from bytes.
pub fn from_xml(xml: &[u8]) -> Result<Document> {
    Document::from_xml(xml)
}

/// Parse an annotated XML tree from a string.
pub fn from_xml_str(xml: &str) -> Result<Document> {
    Document::from_xml_str(xml)
}

/// Builder for loading a document from either a PDF path or raw XML.
///
/// # Example
///
/// ```no_run
/// use pdfslice::{ConvertOptions, Loader};
///
/// let doc = Loader::new()
///     .with_path("report.pdf")
///     .with_options(ConvertOptions::new().with_hidden_text(false))
///     .load()?;
/// # Ok::<(), pdfslice::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Loader {
    path: Option<PathBuf>,
    xml: Option<Vec<u8>>,
    options: ConvertOptions,
}

impl Loader {
    /// Create a new loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a PDF file via the external conversion tool.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Load from an already-converted XML tree.
    pub fn with_xml(mut self, xml: impl Into<Vec<u8>>) -> Self {
        self.xml = Some(xml.into());
        self
    }

    /// Set conversion options (used only with a PDF path).
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Load the document. XML input takes precedence over a path; with
    /// neither, this fails with [`Error::NoInput`].
    pub fn load(self) -> Result<Document> {
        if let Some(xml) = self.xml {
            return Document::from_xml(&xml);
        }
        if let Some(path) = self.path {
            return Document::open(path, &self.options);
        }
        Err(Error::NoInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_without_input() {
        let result = Loader::new().load();
        assert!(matches!(result, Err(Error::NoInput)));
    }

    #[test]
    fn test_loader_from_xml() {
        let doc = Loader::new()
            .with_xml(&br#"<pdf2xml><page number="1" width="10" height="10"/></pdf2xml>"#[..])
            .load()
            .unwrap();
        assert_eq!(doc.num_pages(), 1);
    }

    #[test]
    fn test_loader_builder() {
        let loader = Loader::new()
            .with_path("report.pdf")
            .with_options(ConvertOptions::new().with_ignore_images(false));
        assert_eq!(loader.path, Some(PathBuf::from("report.pdf")));
        assert!(!loader.options.ignore_images);
    }
}
