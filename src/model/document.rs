//! Document-level types and the markup tree adapter.
//!
//! [`Document::from_xml`] parses the annotated XML tree produced by the
//! conversion tool into an owned model: pages, elements in tree order,
//! cumulative page offsets, and fontspec declarations. The tree is read-only
//! after parse; queries never touch raw XML again.

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::OnceCell;
use serde::Serialize;

use super::{Element, Page, Tag};
use crate::convert::{convert_pdf, ConvertOptions};
use crate::error::{Error, Result};
use crate::query::{Filter, Selection};

/// Font attributes declared by one fontspec in the tree.
#[derive(Debug, Clone, Serialize)]
pub struct FontSpec {
    /// Font id referenced by text elements
    pub id: String,

    /// Raw fontspec attributes (family, size, color, ...)
    attrs: HashMap<String, String>,
}

impl FontSpec {
    /// Look up a raw fontspec attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Font family name.
    pub fn family(&self) -> Option<&str> {
        self.attr("family")
    }

    /// Font size in page-native units.
    pub fn size(&self) -> Option<f64> {
        self.attr("size").and_then(|s| s.parse().ok())
    }

    /// Font color as serialized in the tree (e.g. `#000000`).
    pub fn color(&self) -> Option<&str> {
        self.attr("color")
    }
}

/// A parsed layout document.
///
/// Owns every element of the tree and the per-page cumulative vertical
/// offsets that give elements a document-wide coordinate axis. A `Document`
/// is created once per input and outlives all selections built on it;
/// selections are cheap views into its element list.
#[derive(Debug)]
pub struct Document {
    pages: Vec<Page>,
    elements: Vec<Element>,
    offsets: Vec<f64>,
    fontspecs: Vec<FontSpec>,
    font_index: OnceCell<HashMap<String, usize>>,
}

impl Document {
    /// Parse an annotated XML tree from bytes.
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(xml).map_err(|e| Error::Parse(e.to_string()))?;
        Self::from_xml_str(text)
    }

    /// Parse an annotated XML tree from a string.
    pub fn from_xml_str(xml: &str) -> Result<Self> {
        let tree = roxmltree::Document::parse(xml)?;
        Self::from_tree(&tree)
    }

    /// Convert a PDF file with the external tool, then parse the result.
    pub fn open<P: AsRef<Path>>(path: P, options: &ConvertOptions) -> Result<Self> {
        let xml = convert_pdf(path, options)?;
        Self::from_xml(&xml)
    }

    fn from_tree(tree: &roxmltree::Document) -> Result<Self> {
        let mut pages = Vec::new();
        let mut elements = Vec::new();
        let mut offsets = Vec::new();
        let mut fontspecs = Vec::new();
        let mut offset = 0.0;

        for page_node in tree
            .root_element()
            .children()
            .filter(|n| n.has_tag_name("page"))
        {
            let number: u32 = parse_attr(&page_node, "number")?;
            let width: f64 = parse_attr(&page_node, "width")?;
            let height: f64 = parse_attr(&page_node, "height")?;

            if number as usize != pages.len() + 1 {
                return Err(Error::Parse(format!(
                    "page {} out of order (expected {})",
                    number,
                    pages.len() + 1
                )));
            }

            offsets.push(offset);
            offset += height;
            pages.push(Page {
                number,
                width,
                height,
            });

            for node in page_node.children().filter(|n| n.is_element()) {
                let name = node.tag_name().name();
                if name == "fontspec" {
                    fontspecs.push(FontSpec {
                        id: req_attr(&node, "id")?.to_string(),
                        attrs: raw_attrs(&node),
                    });
                } else if let Some(tag) = Tag::from_name(name) {
                    elements.push(Element {
                        tag,
                        page: number,
                        left: parse_attr(&node, "left")?,
                        top: parse_attr(&node, "top")?,
                        width: parse_attr(&node, "width")?,
                        height: parse_attr(&node, "height")?,
                        font: node.attribute("font").map(str::to_string),
                        text: node_text(&node),
                        attrs: raw_attrs(&node),
                    });
                }
            }
        }

        log::debug!(
            "parsed {} pages, {} elements, {} fontspecs",
            pages.len(),
            elements.len(),
            fontspecs.len()
        );

        Ok(Self {
            pages,
            elements,
            offsets,
            fontspecs,
            font_index: OnceCell::new(),
        })
    }

    /// Select every text and image element of the document, in canonical
    /// reading order.
    pub fn all(&self) -> Selection<'_> {
        Selection::new(self, (0..self.elements.len()).collect())
    }

    /// Filter all elements of the document; shorthand for `all().filter(..)`.
    pub fn filter(&self, filter: &Filter) -> Result<Selection<'_>> {
        self.all().filter(filter)
    }

    /// Number of pages in the document.
    pub fn num_pages(&self) -> usize {
        self.pages.len()
    }

    /// All pages, in document order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Get a page by number (1-indexed).
    pub fn page(&self, number: u32) -> Option<&Page> {
        if number == 0 {
            return None;
        }
        self.pages.get((number - 1) as usize)
    }

    /// Cumulative vertical page offsets, one per page.
    ///
    /// `offsets()[i]` is the sum of the heights of pages `1..=i`, so adding
    /// it to a page-local vertical coordinate yields the document-space
    /// coordinate.
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    /// Vertical offset of the given page (1-indexed).
    ///
    /// # Panics
    ///
    /// Panics if the page number is out of range.
    pub fn offset_for_page(&self, number: u32) -> f64 {
        self.offsets[(number - 1) as usize]
    }

    /// Document-space top edge of an element.
    pub fn doc_top(&self, element: &Element) -> f64 {
        element.top as f64 + self.offset_for_page(element.page)
    }

    /// Document-space bottom edge of an element.
    pub fn doc_bottom(&self, element: &Element) -> f64 {
        element.bottom() as f64 + self.offset_for_page(element.page)
    }

    /// Look up a fontspec by id.
    ///
    /// The id-to-fontspec index is built on first lookup and reused for the
    /// lifetime of the document.
    pub fn fontspec(&self, id: &str) -> Result<&FontSpec> {
        let index = self.font_index.get_or_init(|| {
            self.fontspecs
                .iter()
                .enumerate()
                .map(|(i, f)| (f.id.clone(), i))
                .collect()
        });
        index
            .get(id)
            .map(|&i| &self.fontspecs[i])
            .ok_or_else(|| Error::UnknownFont(id.to_string()))
    }

    /// All fontspec declarations, in tree order.
    pub fn fontspecs(&self) -> &[FontSpec] {
        &self.fontspecs
    }

    pub(crate) fn element(&self, id: usize) -> &Element {
        &self.elements[id]
    }
}

fn req_attr<'a>(node: &roxmltree::Node<'a, '_>, name: &str) -> Result<&'a str> {
    node.attribute(name).ok_or_else(|| {
        Error::Parse(format!(
            "<{}> is missing the {} attribute",
            node.tag_name().name(),
            name
        ))
    })
}

fn parse_attr<T: std::str::FromStr>(node: &roxmltree::Node, name: &str) -> Result<T> {
    let raw = req_attr(node, name)?;
    raw.parse().map_err(|_| {
        Error::Parse(format!(
            "<{}> has a malformed {} attribute: {:?}",
            node.tag_name().name(),
            name,
            raw
        ))
    })
}

fn raw_attrs(node: &roxmltree::Node) -> HashMap<String, String> {
    node.attributes()
        .map(|a| (a.name().to_string(), a.value().to_string()))
        .collect()
}

/// Concatenated text of the node and its descendants. Inline markup such as
/// `<b>` and `<i>` is flattened.
fn node_text(node: &roxmltree::Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}
