//! Positioned fragments of a page.

use std::collections::HashMap;

use serde::Serialize;

/// Element kinds the query engine operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    /// A positioned text run
    Text,
    /// A positioned image fragment
    Image,
}

impl Tag {
    /// The element name used in the XML tree.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Text => "text",
            Tag::Image => "image",
        }
    }

    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Tag::Text),
            "image" => Some(Tag::Image),
            _ => None,
        }
    }
}

/// A single positioned text or image fragment.
///
/// Geometry is in page-native pixel units as serialized by the conversion
/// tool: integer `left`/`top`/`width`/`height` relative to the owning page.
/// Elements are immutable once parsed.
#[derive(Debug, Clone, Serialize)]
pub struct Element {
    /// Element kind
    pub tag: Tag,

    /// Owning page number (1-indexed)
    pub page: u32,

    /// Left edge
    pub left: i32,

    /// Top edge
    pub top: i32,

    /// Width
    pub width: i32,

    /// Height
    pub height: i32,

    /// Font id reference (text elements only)
    pub font: Option<String>,

    /// Concatenated text content of the fragment ("" for images)
    pub text: String,

    /// Raw XML attributes, kept for structural node queries
    #[serde(skip)]
    pub(crate) attrs: HashMap<String, String>,
}

impl Element {
    /// Right edge (`left + width`).
    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    /// Bottom edge (`top + height`).
    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    /// Horizontal midpoint.
    pub fn midx(&self) -> f64 {
        (self.left as f64 + self.right() as f64) / 2.0
    }

    /// Vertical midpoint (page-local).
    pub fn midy(&self) -> f64 {
        (self.top as f64 + self.bottom() as f64) / 2.0
    }

    /// Look up a raw attribute as serialized in the tree.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// An element bounding box in page-native units.
///
/// This is the data handed to external visual debuggers: box geometry plus
/// the page it lives on, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BBox {
    /// Page number (1-indexed)
    pub page: u32,
    /// Left edge
    pub left: i32,
    /// Top edge
    pub top: i32,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
}
