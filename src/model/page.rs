//! Page-level types.

use serde::Serialize;

/// Metadata for one page of the document.
///
/// Pages own no elements; elements carry their page number and are resolved
/// back through the document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in page-native units
    pub width: f64,

    /// Page height in page-native units
    pub height: f64,
}

impl Page {
    /// Get page dimensions as (width, height) tuple.
    pub fn dimensions(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Check if the page is in landscape orientation.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}
