//! The selection query engine.
//!
//! Selections are ordered, deduplicated views over document elements with
//! predicate filtering, set algebra, directional relationship operators,
//! line grouping, and text extraction.

mod filter;
pub mod geom;
mod selection;

pub use filter::{Cmp, Filter, PosAttr};
pub use selection::{IntoRegion, Region, Selection, LINE_THRESHOLD};
