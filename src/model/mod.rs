//! Layout model types.
//!
//! This module defines the owned representation of the annotated markup
//! tree: the document with its pages, offsets, and fontspec registry, and
//! the immutable positioned elements that selections are built from.

mod document;
mod element;
mod page;

pub use document::{Document, FontSpec};
pub use element::{BBox, Element, Tag};
pub use page::Page;
