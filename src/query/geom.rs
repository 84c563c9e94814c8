//! Tolerant numeric comparison and the canonical reading-order comparator.
//!
//! Layout engines jitter baselines by a few units, so raw coordinate
//! comparison misgroups fragments that visually share a row. Every ordering
//! and grouping decision in the engine goes through the tolerant helpers
//! here.

use std::cmp::Ordering;

use crate::model::Element;

/// Absolute tolerance for treating two elements as the same visual row in
/// the canonical comparator.
pub const ROW_TOLERANCE: f64 = 4.0;

/// Relative epsilon used by tolerant equality when no absolute threshold is
/// given.
pub const SIMILAR_EPSILON: f64 = 0.005;

/// Tolerant equality with a relative epsilon: the difference is compared
/// against the mean magnitude of the operands.
pub fn similar(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    ((a - b).abs() / ((a + b) / 2.0)).abs() < SIMILAR_EPSILON
}

/// Tolerant equality with an absolute threshold.
pub fn similar_within(a: f64, b: f64, threshold: f64) -> bool {
    (a - b).abs() < threshold
}

/// Whether the ranges `[a_min, a_max]` and `[b_min, b_max]` intersect.
pub fn ranges_overlap(a_min: f64, a_max: f64, b_min: f64, b_max: f64) -> bool {
    !(a_min > b_max || a_max < b_min)
}

/// Canonical reading-order comparator: page by page, top-to-bottom, then
/// left-to-right, tolerating up to [`ROW_TOLERANCE`] units of vertical
/// jitter within a row.
///
/// Tops are page-local; a stable sort keeps tree order for elements the
/// comparator considers equal.
///
/// The tolerance makes the comparison intransitive: tops 0/3/6 chain
/// pairwise into one row while the extremes compare by top. Callers must
/// only rely on elements of the same visual row ending up adjacent, never
/// on a unique total order of jittered runs.
pub fn reading_order(a: &Element, b: &Element) -> Ordering {
    if a.page != b.page {
        return a.page.cmp(&b.page);
    }
    if similar_within(a.top as f64, b.top as f64, ROW_TOLERANCE) {
        if similar_within(a.left as f64, b.left as f64, ROW_TOLERANCE) {
            Ordering::Equal
        } else {
            a.left.cmp(&b.left)
        }
    } else {
        a.top.cmp(&b.top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tag;
    use std::collections::HashMap;

    fn el(left: i32, top: i32) -> Element {
        Element {
            tag: Tag::Text,
            page: 1,
            left,
            top,
            width: 10,
            height: 10,
            font: None,
            text: String::new(),
            attrs: HashMap::new(),
        }
    }

    #[test]
    fn test_similar_relative() {
        assert!(similar(1000.0, 1004.0));
        assert!(!similar(1000.0, 1010.0));
        assert!(similar(0.0, 0.0));
    }

    #[test]
    fn test_similar_within() {
        assert!(similar_within(10.0, 13.9, 4.0));
        assert!(!similar_within(10.0, 14.0, 4.0));
    }

    #[test]
    fn test_reading_order_rows_before_columns() {
        // 4+ units apart vertically: top decides.
        assert_eq!(reading_order(&el(0, 10), &el(100, 20)), Ordering::Less);
        assert_eq!(reading_order(&el(0, 20), &el(100, 10)), Ordering::Greater);
    }

    #[test]
    fn test_reading_order_within_row() {
        // Within 4 units vertically: left decides.
        assert_eq!(reading_order(&el(50, 10), &el(60, 12)), Ordering::Less);
        assert_eq!(reading_order(&el(60, 12), &el(50, 10)), Ordering::Greater);
        assert_eq!(reading_order(&el(50, 10), &el(51, 12)), Ordering::Equal);
    }

    #[test]
    fn test_reading_order_sorts_jittered_chains() {
        // Long runs of tops three units apart chain pairwise within the
        // tolerance while the extremes compare by top. Sorting such runs
        // must terminate with every element retained.
        let mut els: Vec<Element> = (0..200).map(|i| el(200 - i, (i * 3) % 60)).collect();
        els.sort_by(|a, b| reading_order(a, b));
        assert_eq!(els.len(), 200);
    }

    #[test]
    fn test_reading_order_pages_dominate() {
        // An element low on page 1 still precedes one high on page 2.
        let a = el(0, 500);
        let mut b = el(0, 10);
        b.page = 2;
        assert_eq!(reading_order(&a, &b), Ordering::Less);
        assert_eq!(reading_order(&b, &a), Ordering::Greater);
    }

    #[test]
    fn test_ranges_overlap() {
        assert!(ranges_overlap(0.0, 10.0, 5.0, 15.0));
        assert!(ranges_overlap(0.0, 10.0, 10.0, 20.0));
        assert!(!ranges_overlap(0.0, 10.0, 11.0, 20.0));
    }
}
