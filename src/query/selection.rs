//! Ordered, deduplicating element selections and their query operators.

use std::collections::HashSet;
use std::ops::{BitAnd, BitOr};

use regex::Regex;

use crate::error::Result;
use crate::model::{BBox, Document, Element, Page};
use crate::query::filter::Filter;
use crate::query::geom;
use crate::table::{self, TableOptions};
use crate::text;

/// Default threshold for [`Selection::get_by_line`], in layout units.
pub const LINE_THRESHOLD: f64 = 8.0;

/// An ordered collection of elements plus the document they live in.
///
/// Elements are sorted once, at construction, into canonical reading order
/// (tolerant top-then-left; see [`geom::reading_order`]). Every operation
/// returns a new `Selection`; aggregate geometry is computed on demand from
/// the current element set and never cached.
///
/// An empty selection has sentinel geometry (`left`/`top` = `+∞`,
/// `right`/`bottom` = `−∞`, `width`/`height` = 0) so that directional
/// comparisons against it exclude everything.
#[derive(Clone)]
pub struct Selection<'d> {
    doc: &'d Document,
    ids: Vec<usize>,
    pages: Vec<u32>,
}

/// A horizontal/vertical extent a directional operator compares against:
/// either a plain coordinate or another selection's aggregate edges.
#[derive(Debug, Clone, Copy)]
pub struct Region {
    left: f64,
    right: f64,
    doc_top: f64,
    doc_bottom: f64,
    empty: bool,
}

/// Conversion into a [`Region`] for directional operators.
pub trait IntoRegion {
    fn into_region(self) -> Region;
}

impl IntoRegion for f64 {
    fn into_region(self) -> Region {
        Region {
            left: self,
            right: self,
            doc_top: self,
            doc_bottom: self,
            empty: false,
        }
    }
}

impl IntoRegion for i32 {
    fn into_region(self) -> Region {
        (self as f64).into_region()
    }
}

impl<'a, 'd> IntoRegion for &'a Selection<'d> {
    fn into_region(self) -> Region {
        Region {
            left: self.left(),
            right: self.right(),
            doc_top: self.doc_top(),
            doc_bottom: self.doc_bottom(),
            empty: self.is_empty(),
        }
    }
}

impl<'d> Selection<'d> {
    /// Build a selection over the given element ids, sorted canonically.
    pub(crate) fn new(doc: &'d Document, mut ids: Vec<usize>) -> Self {
        ids.sort_by(|&a, &b| geom::reading_order(doc.element(a), doc.element(b)));
        let mut pages: Vec<u32> = ids.iter().map(|&id| doc.element(id).page).collect();
        pages.sort_unstable();
        pages.dedup();
        Self { doc, ids, pages }
    }

    fn singleton(&self, id: usize) -> Selection<'d> {
        Selection {
            doc: self.doc,
            ids: vec![id],
            pages: vec![self.doc.element(id).page],
        }
    }

    /// An empty selection over the same document.
    pub fn empty(&self) -> Selection<'d> {
        Selection {
            doc: self.doc,
            ids: Vec::new(),
            pages: Vec::new(),
        }
    }

    /// The owning document.
    pub fn document(&self) -> &'d Document {
        self.doc
    }

    /// Number of elements in the selection.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the selection holds no elements.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The element at a position in canonical order, as a singleton
    /// selection. Out-of-range positions yield an empty selection, not an
    /// error: callers routinely probe tentative positions.
    pub fn get(&self, index: usize) -> Selection<'d> {
        match self.ids.get(index) {
            Some(&id) => self.singleton(id),
            None => self.empty(),
        }
    }

    /// The first element as a singleton selection, or empty.
    pub fn first(&self) -> Selection<'d> {
        self.get(0)
    }

    /// Iterate over the elements as singleton selections, in canonical
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = Selection<'d>> + '_ {
        self.ids.iter().map(|&id| self.singleton(id))
    }

    /// Iterate over the underlying elements, in canonical order.
    pub fn elements(&self) -> impl Iterator<Item = &'d Element> + '_ {
        self.ids.iter().map(|&id| self.doc.element(id))
    }

    /// The first underlying element, if any.
    pub fn element(&self) -> Option<&'d Element> {
        self.ids.first().map(|&id| self.doc.element(id))
    }

    /// Distinct page numbers touched by the selection, ascending.
    pub fn page_numbers(&self) -> &[u32] {
        &self.pages
    }

    /// The pages touched by the selection.
    pub fn pages(&self) -> Vec<&'d Page> {
        self.pages
            .iter()
            .filter_map(|&n| self.doc.page(n))
            .collect()
    }

    /// The single page all elements lie on.
    ///
    /// # Panics
    ///
    /// Panics if the selection spans zero or multiple pages; that is caller
    /// misuse, not a data condition.
    pub fn page(&self) -> &'d Page {
        assert_eq!(
            self.pages.len(),
            1,
            "page() requires a single-page selection, got {} pages",
            self.pages.len()
        );
        self.doc.page(self.pages[0]).unwrap()
    }

    /// Bounding boxes of all elements, in canonical order. This is the
    /// geometry feed for external visual debuggers.
    pub fn bounding_boxes(&self) -> Vec<BBox> {
        self.elements()
            .map(|el| BBox {
                page: el.page,
                left: el.left,
                top: el.top,
                width: el.width,
                height: el.height,
            })
            .collect()
    }

    // ---- Aggregate geometry ----

    /// Leftmost left edge, or `+∞` when empty.
    pub fn left(&self) -> f64 {
        self.elements()
            .map(|el| el.left as f64)
            .fold(f64::INFINITY, f64::min)
    }

    /// Rightmost right edge, or `−∞` when empty.
    pub fn right(&self) -> f64 {
        self.elements()
            .map(|el| el.right() as f64)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Topmost top edge (page-local), or `+∞` when empty.
    pub fn top(&self) -> f64 {
        self.elements()
            .map(|el| el.top as f64)
            .fold(f64::INFINITY, f64::min)
    }

    /// Bottommost bottom edge (page-local), or `−∞` when empty.
    pub fn bottom(&self) -> f64 {
        self.elements()
            .map(|el| el.bottom() as f64)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Largest element width, or 0 when empty.
    pub fn width(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.elements()
            .map(|el| el.width as f64)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Largest element height, or 0 when empty.
    pub fn height(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.elements()
            .map(|el| el.height as f64)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Document-space top: the page-local top plus the smallest offset of
    /// the touched pages. `+∞` when empty.
    pub fn doc_top(&self) -> f64 {
        if self.is_empty() {
            return f64::INFINITY;
        }
        self.top() + self.min_offset()
    }

    /// Document-space bottom: the page-local bottom plus the largest offset
    /// of the touched pages. `−∞` when empty.
    pub fn doc_bottom(&self) -> f64 {
        if self.is_empty() {
            return f64::NEG_INFINITY;
        }
        self.bottom() + self.max_offset()
    }

    /// Horizontal midpoint of the aggregate extent.
    pub fn midx(&self) -> f64 {
        (self.left() + self.right()) / 2.0
    }

    /// Vertical midpoint of the aggregate extent (page-local).
    pub fn midy(&self) -> f64 {
        (self.top() + self.bottom()) / 2.0
    }

    /// Vertical midpoint of the aggregate extent in document space.
    pub fn doc_midy(&self) -> f64 {
        (self.doc_top() + self.doc_bottom()) / 2.0
    }

    fn min_offset(&self) -> f64 {
        // Offsets grow with page number, so the first touched page holds
        // the minimum.
        self.doc.offset_for_page(self.pages[0])
    }

    fn max_offset(&self) -> f64 {
        self.doc.offset_for_page(self.pages[self.pages.len() - 1])
    }

    // ---- Filtering ----

    /// Apply a filter; every supplied condition must accept an element for
    /// it to survive. Invalid regex or node-query conditions error here.
    pub fn filter(&self, filter: &Filter) -> Result<Selection<'d>> {
        let compiled = filter.compile()?;
        let ids = self
            .ids
            .iter()
            .copied()
            .filter(|&id| compiled.accepts(&self.singleton(id)))
            .collect();
        Ok(Selection::new(self.doc, ids))
    }

    /// Keep the elements whose singleton selection satisfies the predicate.
    pub fn retain(&self, mut predicate: impl FnMut(&Selection<'d>) -> bool) -> Selection<'d> {
        let ids = self
            .ids
            .iter()
            .copied()
            .filter(|&id| predicate(&self.singleton(id)))
            .collect();
        Selection::new(self.doc, ids)
    }

    // ---- Directional operators ----

    /// Elements whose right edge is left of the region's left edge.
    /// An empty comparison selection excludes everything.
    pub fn left_of(&self, region: impl IntoRegion) -> Selection<'d> {
        let r = region.into_region();
        if r.empty {
            return self.empty();
        }
        self.retain(|s| s.right() < r.left)
    }

    /// Like [`Selection::left_of`], but additionally requires vertical
    /// overlap with the comparison selection in document space. With
    /// `mid_point`, the comparison extent collapses to its vertical
    /// midpoint before the overlap test.
    pub fn strictly_left_of(&self, other: &Selection<'d>, mid_point: bool) -> Selection<'d> {
        if other.is_empty() {
            return self.empty();
        }
        let left = other.left();
        let (b_min, b_max) = vertical_band(other, mid_point);
        self.retain(|s| {
            geom::ranges_overlap(s.doc_top(), s.doc_bottom(), b_min, b_max) && s.right() < left
        })
    }

    /// Elements whose left edge is right of the region's right edge.
    pub fn right_of(&self, region: impl IntoRegion) -> Selection<'d> {
        let r = region.into_region();
        if r.empty {
            return self.empty();
        }
        self.retain(|s| s.left() > r.right)
    }

    /// Like [`Selection::right_of`], but requires vertical overlap; see
    /// [`Selection::strictly_left_of`].
    pub fn strictly_right_of(&self, other: &Selection<'d>, mid_point: bool) -> Selection<'d> {
        if other.is_empty() {
            return self.empty();
        }
        let right = other.right();
        let (b_min, b_max) = vertical_band(other, mid_point);
        self.retain(|s| {
            geom::ranges_overlap(s.doc_top(), s.doc_bottom(), b_min, b_max) && s.left() > right
        })
    }

    /// Elements whose document-space bottom is above the region's
    /// document-space top.
    pub fn above(&self, region: impl IntoRegion) -> Selection<'d> {
        let r = region.into_region();
        if r.empty {
            return self.empty();
        }
        self.retain(|s| s.doc_bottom() < r.doc_top)
    }

    /// Like [`Selection::above`], but additionally requires horizontal
    /// overlap with the comparison selection.
    pub fn strictly_above(&self, other: &Selection<'d>, mid_point: bool) -> Selection<'d> {
        if other.is_empty() {
            return self.empty();
        }
        let doc_top = other.doc_top();
        let (b_min, b_max) = horizontal_band(other, mid_point);
        self.retain(|s| {
            geom::ranges_overlap(s.left(), s.right(), b_min, b_max) && s.doc_bottom() < doc_top
        })
    }

    /// Elements whose document-space top is below the region's
    /// document-space bottom.
    pub fn below(&self, region: impl IntoRegion) -> Selection<'d> {
        let r = region.into_region();
        if r.empty {
            return self.empty();
        }
        self.retain(|s| s.doc_top() > r.doc_bottom)
    }

    /// Like [`Selection::below`], but requires horizontal overlap; see
    /// [`Selection::strictly_above`].
    pub fn strictly_below(&self, other: &Selection<'d>, mid_point: bool) -> Selection<'d> {
        if other.is_empty() {
            return self.empty();
        }
        let doc_bottom = other.doc_bottom();
        let (b_min, b_max) = horizontal_band(other, mid_point);
        self.retain(|s| {
            geom::ranges_overlap(s.left(), s.right(), b_min, b_max) && s.doc_top() > doc_bottom
        })
    }

    // ---- Line grouping ----

    /// Group elements into visual lines, walking canonical order and
    /// breaking whenever an element's document-space top drifts more than
    /// `threshold` units from the line's reference top.
    ///
    /// The final accumulated line is always yielded, so an empty selection
    /// produces one empty line.
    pub fn get_by_line(&self, threshold: f64) -> Vec<Selection<'d>> {
        let mut lines = Vec::new();
        let mut current: Vec<usize> = Vec::new();
        let mut current_top: Option<f64> = None;
        for &id in &self.ids {
            let doc_top = self.doc.doc_top(self.doc.element(id));
            let reference = *current_top.get_or_insert(doc_top);
            if (doc_top - reference).abs() > threshold {
                lines.push(Selection::new(self.doc, std::mem::take(&mut current)));
                current_top = Some(doc_top);
            }
            current.push(id);
        }
        lines.push(Selection::new(self.doc, current));
        lines
    }

    // ---- Text extraction ----

    /// Concatenated element text in canonical order, joined with single
    /// spaces. Each fragment is trimmed and `"- "` runs collapse to `"-"`
    /// to undo line-wrap joins at fragment boundaries.
    pub fn text(&self) -> String {
        self.text_list(true).join(" ")
    }

    /// Per-element text in canonical order. With `join_words`, fragments
    /// are trimmed and `"- "` runs collapse to `"-"`; without, raw text is
    /// returned.
    pub fn text_list(&self, join_words: bool) -> Vec<String> {
        self.elements()
            .map(|el| {
                if join_words {
                    el.text.trim().replace("- ", "-")
                } else {
                    el.text.clone()
                }
            })
            .collect()
    }

    /// Like [`Selection::text`], with space runs collapsed and (optionally)
    /// hyphenation line breaks removed.
    pub fn clean_text(&self, fix_hyphens: bool) -> String {
        let cleaned = text::remove_multispace(&self.text());
        if fix_hyphens {
            text::remove_hyphenation(&cleaned)
        } else {
            cleaned
        }
    }

    /// Search the selection text with a regex, returning the first match.
    pub fn find(&self, re: &Regex) -> Option<String> {
        re.find(&self.text()).map(|m| m.as_str().to_string())
    }

    // ---- Table reconstruction ----

    /// Reconstruct a rectangular grid of cell text from the selection; see
    /// [`crate::table`].
    pub fn get_table(&self, options: &TableOptions) -> Vec<Vec<Option<String>>> {
        table::extract_table(self, options)
    }

    /// Like [`Selection::get_table`], with a caller-supplied garbage
    /// predicate used by the pruning passes.
    pub fn get_table_filtered(
        &self,
        options: &TableOptions,
        is_garbage: impl Fn(&str) -> bool,
    ) -> Vec<Vec<Option<String>>> {
        table::extract_table_filtered(self, options, is_garbage)
    }
}

fn vertical_band(other: &Selection, mid_point: bool) -> (f64, f64) {
    let (min, max) = (other.doc_top(), other.doc_bottom());
    if mid_point {
        let mid = (min + max) / 2.0;
        (mid, mid)
    } else {
        (min, max)
    }
}

fn horizontal_band(other: &Selection, mid_point: bool) -> (f64, f64) {
    let (min, max) = (other.left(), other.right());
    if mid_point {
        let mid = (min + max) / 2.0;
        (mid, mid)
    } else {
        (min, max)
    }
}

impl std::fmt::Debug for Selection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("len", &self.len())
            .field("pages", &self.pages)
            .field("text", &self.text())
            .finish()
    }
}

/// Union on element identity; the result is re-sorted canonically.
impl<'d> BitOr for &Selection<'d> {
    type Output = Selection<'d>;

    fn bitor(self, rhs: Self) -> Selection<'d> {
        assert!(
            std::ptr::eq(self.doc, rhs.doc),
            "set algebra requires selections over the same document"
        );
        let ids: HashSet<usize> = self.ids.iter().chain(rhs.ids.iter()).copied().collect();
        Selection::new(self.doc, ids.into_iter().collect())
    }
}

/// Intersection on element identity; the result is re-sorted canonically.
impl<'d> BitAnd for &Selection<'d> {
    type Output = Selection<'d>;

    fn bitand(self, rhs: Self) -> Selection<'d> {
        assert!(
            std::ptr::eq(self.doc, rhs.doc),
            "set algebra requires selections over the same document"
        );
        let left: HashSet<usize> = self.ids.iter().copied().collect();
        let right: HashSet<usize> = rhs.ids.iter().copied().collect();
        Selection::new(self.doc, left.intersection(&right).copied().collect())
    }
}
