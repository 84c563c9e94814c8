//! Table reconstruction from positioned text fragments.
//!
//! Turns a selection of loosely grouped fragments into a rectangular grid
//! of cell strings: rows are grouped by tolerant vertical equality, column
//! bands are inferred from the rows that match the target column count,
//! band gaps are closed by midpoint interpolation, and a set of repair
//! passes fixes merged cells, prunes garbage, and rejoins line-wrapped
//! rows.
//!
//! Row grouping here deliberately uses tolerant equality against the row's
//! reference top, not the fixed-delta test of
//! [`Selection::get_by_line`](crate::Selection::get_by_line). The two
//! thresholds are configured separately; unifying them would silently
//! change output for existing layouts.

use crate::query::{geom, Selection};

/// Default absolute threshold for grouping fragments into table rows.
pub const DEFAULT_ROW_THRESHOLD: f64 = 10.0;

/// Fraction of empty cells at which a row counts as a wrapped continuation
/// of the previous row.
const CONTINUATION_NULL_RATIO: f64 = 0.3;

/// Options for table reconstruction.
#[derive(Debug, Clone)]
pub struct TableOptions {
    /// Target column count; inferred from the widest row when `None`
    pub columns: Option<usize>,

    /// Absolute threshold for the row-grouping similarity test
    pub row_threshold: f64,
}

impl TableOptions {
    /// Create new table options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target column count.
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Set the row-grouping threshold.
    pub fn with_row_threshold(mut self, threshold: f64) -> Self {
        self.row_threshold = threshold;
        self
    }
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            columns: None,
            row_threshold: DEFAULT_ROW_THRESHOLD,
        }
    }
}

/// A fragment reduced to what cell assignment needs.
struct Fragment {
    left: f64,
    right: f64,
    midx: f64,
    doc_top: f64,
    text: String,
}

/// Reconstruct a grid of cell text from a selection of candidate cells.
///
/// Empty cells are `None`. An empty selection yields a single empty row.
pub fn extract_table(
    selection: &Selection,
    options: &TableOptions,
) -> Vec<Vec<Option<String>>> {
    extract_table_filtered(selection, options, |_| false)
}

/// Like [`extract_table`], with a garbage predicate: rows and columns whose
/// every cell is empty or flagged garbage are dropped.
pub fn extract_table_filtered(
    selection: &Selection,
    options: &TableOptions,
    is_garbage: impl Fn(&str) -> bool,
) -> Vec<Vec<Option<String>>> {
    if selection.is_empty() {
        return vec![Vec::new()];
    }

    let doc = selection.document();
    let fragments: Vec<Fragment> = selection
        .elements()
        .map(|el| Fragment {
            left: el.left as f64,
            right: el.right() as f64,
            midx: el.midx(),
            doc_top: doc.doc_top(el),
            text: el.text.trim().replace("- ", "-"),
        })
        .collect();

    let rows = group_rows(&fragments, options.row_threshold);
    log::debug!("table: {} fragments in {} rows", fragments.len(), rows.len());

    let max_cols = options
        .columns
        .unwrap_or_else(|| rows.iter().map(Vec::len).max().unwrap_or(0));

    let bands = match infer_columns(&rows, max_cols) {
        Some(bands) => close_gaps(&bands, selection.left(), selection.right()),
        None => {
            log::warn!(
                "table: no row matches the target column count {}, giving up",
                max_cols
            );
            return Vec::new();
        }
    };
    log::debug!("table: {} column bands {:?}", bands.len(), bands);

    let mut grid = assign_cells(&rows, &bands);
    repair_merged_cells(&mut grid);

    // Prune rows, then columns, where nothing but empties and garbage
    // remains.
    grid.retain(|row| row.iter().any(|cell| is_content(cell, &is_garbage)));
    let kept: Vec<usize> = (0..bands.len())
        .filter(|&i| grid.iter().any(|row| is_content(&row[i], &is_garbage)))
        .collect();
    let grid: Vec<Vec<Option<String>>> = grid
        .into_iter()
        .map(|mut row| kept.iter().map(|&i| row[i].take()).collect())
        .collect();

    merge_continuations(grid)
}

fn is_content(cell: &Option<String>, is_garbage: &impl Fn(&str) -> bool) -> bool {
    matches!(cell, Some(text) if !text.is_empty() && !is_garbage(text))
}

/// Group fragments into rows: a fragment joins the current row while its
/// document-space top is similar (within the threshold) to the row's
/// reference top, which is the top of the row's first fragment.
fn group_rows(fragments: &[Fragment], threshold: f64) -> Vec<Vec<&Fragment>> {
    let mut rows: Vec<Vec<&Fragment>> = Vec::new();
    let mut current: Vec<&Fragment> = Vec::new();
    let mut current_top: Option<f64> = None;
    for fragment in fragments {
        let reference = *current_top.get_or_insert(fragment.doc_top);
        if !geom::similar_within(reference, fragment.doc_top, threshold) {
            rows.push(std::mem::take(&mut current));
            current_top = Some(fragment.doc_top);
        }
        current.push(fragment);
    }
    rows.push(current);
    rows
}

/// Infer initial column bands: every row whose length equals the target
/// column count votes with its fragments' per-column min left and max
/// right. Returns `None` when no row votes.
fn infer_columns(rows: &[Vec<&Fragment>], max_cols: usize) -> Option<Vec<(f64, f64)>> {
    let mut bands = vec![(f64::INFINITY, f64::NEG_INFINITY); max_cols];
    let mut voted = false;
    for row in rows.iter().filter(|row| row.len() == max_cols) {
        voted = true;
        for (band, fragment) in bands.iter_mut().zip(row.iter()) {
            band.0 = band.0.min(fragment.left);
            band.1 = band.1.max(fragment.right);
        }
    }
    voted.then_some(bands)
}

/// Rewrite bands so interior boundaries sit midway between adjacent bands'
/// facing edges, clamped to the selection extent at the outside. The
/// result covers the full horizontal span without gaps or overlaps.
fn close_gaps(bands: &[(f64, f64)], sel_left: f64, sel_right: f64) -> Vec<(f64, f64)> {
    let last = bands.len() - 1;
    bands
        .iter()
        .enumerate()
        .map(|(i, band)| {
            let left = if i == 0 {
                sel_left
            } else {
                (bands[i - 1].1 + band.0) / 2.0
            };
            let right = if i == last {
                sel_right
            } else {
                (bands[i + 1].0 + band.1) / 2.0
            };
            (left, right)
        })
        .collect()
}

/// Assign each fragment to the column band containing its horizontal
/// midpoint; unmatched fragments are dropped, skipped columns stay `None`,
/// and every row is padded to the full column count.
fn assign_cells(rows: &[Vec<&Fragment>], bands: &[(f64, f64)]) -> Vec<Vec<Option<String>>> {
    rows.iter()
        .map(|row| {
            let mut cells: Vec<Option<String>> = Vec::with_capacity(bands.len());
            for fragment in row {
                let matched = bands
                    .iter()
                    .position(|&(left, right)| left <= fragment.midx && fragment.midx <= right);
                if let Some(col) = matched {
                    while cells.len() < col {
                        cells.push(None);
                    }
                    cells.push(Some(fragment.text.clone()));
                }
            }
            while cells.len() < bands.len() {
                cells.push(None);
            }
            cells
        })
        .collect()
}

/// Split cells containing a double-space run across an adjacent empty
/// column: into the following column when it is empty, otherwise into the
/// preceding one. Backfill never targets the first column.
fn repair_merged_cells(grid: &mut [Vec<Option<String>>]) {
    for row in grid.iter_mut() {
        for i in 0..row.len() {
            let Some(cell) = row[i].clone() else {
                continue;
            };
            let Some((head, tail)) = cell.split_once("  ") else {
                continue;
            };
            if i + 1 < row.len() && row[i + 1].is_none() {
                row[i] = Some(head.to_string());
                row[i + 1] = Some(tail.to_string());
            } else if i >= 2 && row[i - 1].is_none() {
                row[i - 1] = Some(head.to_string());
                row[i] = Some(tail.to_string());
            }
        }
    }
}

/// Fold wrapped continuation rows into their predecessor: a row (other
/// than the first) whose empty-cell ratio reaches the threshold appends
/// each populated cell to the matching column of the previously emitted
/// row, separated by a space. Consecutive continuation rows extend the
/// same chain.
fn merge_continuations(grid: Vec<Vec<Option<String>>>) -> Vec<Vec<Option<String>>> {
    if grid.is_empty() {
        return grid;
    }
    let colcount = grid[0].len() as f64;
    let mut merged: Vec<Vec<Option<String>>> = Vec::new();
    for (i, row) in grid.into_iter().enumerate() {
        let nulls = row.iter().filter(|cell| cell.is_none()).count() as f64;
        let continuation = i > 0 && colcount > 0.0 && nulls / colcount >= CONTINUATION_NULL_RATIO;
        match (continuation, merged.last_mut()) {
            (true, Some(previous)) => {
                for (j, cell) in row.into_iter().enumerate() {
                    let Some(text) = cell else { continue };
                    if let Some(Some(target)) = previous.get_mut(j) {
                        if !target.ends_with(' ') {
                            target.push(' ');
                        }
                        target.push_str(&text);
                    }
                }
            }
            _ => merged.push(row),
        }
    }
    merged
}
