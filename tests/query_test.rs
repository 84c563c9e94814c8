//! Integration tests for the selection query engine.

use pdfslice::{from_xml_str, Cmp, Document, Filter, PosAttr, Tag};

/// Two pages, heights 800 and 600, with a small layout:
///
/// page 1: a heading row, a label/value pair, and an image
/// page 2: a single line near the top
fn sample() -> Document {
    from_xml_str(
        r##"<?xml version="1.0"?>
<pdf2xml>
<page number="1" width="900" height="800">
  <fontspec id="0" size="22" family="Helvetica" color="#000000"/>
  <fontspec id="1" size="11" family="Times" color="#333333"/>
  <text top="50" left="100" width="200" height="24" font="0"><b>Annual Report</b></text>
  <text top="200" left="100" width="60" height="12" font="1">Total</text>
  <text top="202" left="400" width="80" height="12" font="1">1.234,56</text>
  <text top="400" left="100" width="120" height="12" font="1">Unrelated note</text>
  <image top="600" left="100" width="300" height="150" src="chart.png"/>
</page>
<page number="2" width="900" height="600">
  <text top="10" left="100" width="100" height="12" font="1">Appendix</text>
</page>
</pdf2xml>"##,
    )
    .unwrap()
}

#[test]
fn test_canonical_order_tolerates_jitter() {
    let doc = sample();
    // "Total" (top=200) and the value (top=202) form one visual row and
    // must order by left, not by raw top.
    let row: Vec<String> = doc
        .all()
        .filter(&Filter::new().position(PosAttr::Top, Cmp::Gte, 200.0))
        .unwrap()
        .filter(&Filter::new().position(PosAttr::Top, Cmp::Lt, 210.0))
        .unwrap()
        .text_list(true);
    assert_eq!(row, vec!["Total", "1.234,56"]);
}

#[test]
fn test_aggregate_geometry() {
    let doc = sample();
    let label = doc.filter(&Filter::new().search("Total")).unwrap();
    assert_eq!(label.left(), 100.0);
    assert_eq!(label.right(), 160.0);
    assert_eq!(label.top(), 200.0);
    assert_eq!(label.bottom(), 212.0);
    assert_eq!(label.width(), 60.0);
    assert_eq!(label.midx(), 130.0);
}

#[test]
fn test_empty_selection_sentinels() {
    let doc = sample();
    let none = doc.filter(&Filter::new().search("no such text")).unwrap();
    assert!(none.is_empty());
    assert_eq!(none.left(), f64::INFINITY);
    assert_eq!(none.right(), f64::NEG_INFINITY);
    assert_eq!(none.top(), f64::INFINITY);
    assert_eq!(none.bottom(), f64::NEG_INFINITY);
    assert_eq!(none.width(), 0.0);
    assert_eq!(none.height(), 0.0);
}

#[test]
fn test_document_space_offsets() {
    let doc = sample();
    assert_eq!(doc.offsets(), &[0.0, 800.0]);
    let appendix = doc.filter(&Filter::new().search("Appendix")).unwrap();
    assert_eq!(appendix.doc_top(), 810.0);
    assert_eq!(appendix.doc_bottom(), 822.0);
}

#[test]
fn test_filter_search_is_case_sensitive() {
    let doc = sample();
    assert_eq!(doc.filter(&Filter::new().search("Total")).unwrap().len(), 1);
    assert_eq!(doc.filter(&Filter::new().search("total")).unwrap().len(), 0);
}

#[test]
fn test_filter_auto_regex() {
    let doc = sample();
    // Anchors tolerate surrounding whitespace, spaces match runs, and
    // matching is case-insensitive.
    let hit = doc
        .filter(&Filter::new().auto_regex("^annual report$"))
        .unwrap();
    assert_eq!(hit.len(), 1);
    assert_eq!(hit.text(), "Annual Report");
}

#[test]
fn test_filter_regex() {
    let doc = sample();
    let hit = doc
        .filter(&Filter::new().regex(r"\d+\.\d+,\d+"))
        .unwrap();
    assert_eq!(hit.text(), "1.234,56");
}

#[test]
fn test_filter_invalid_regex_errors() {
    let doc = sample();
    assert!(doc.filter(&Filter::new().regex("(broken")).is_err());
}

#[test]
fn test_filter_tags() {
    let doc = sample();
    // Default filter matches text only.
    assert_eq!(doc.filter(&Filter::new()).unwrap().len(), 5);
    assert_eq!(doc.filter(&Filter::new().tag(Tag::Image)).unwrap().len(), 1);
    assert_eq!(doc.filter(&Filter::new().any_tag()).unwrap().len(), 6);
}

#[test]
fn test_filter_node_query() {
    let doc = sample();
    let headings = doc.filter(&Filter::new().node_query("[@font='0']")).unwrap();
    assert_eq!(headings.text(), "Annual Report");

    let images = doc
        .filter(&Filter::new().any_tag().node_query("[@src]"))
        .unwrap();
    assert_eq!(images.len(), 1);
}

#[test]
fn test_filter_pages() {
    let doc = sample();
    assert_eq!(doc.filter(&Filter::new().page(2)).unwrap().len(), 1);
    assert_eq!(doc.filter(&Filter::new().pages([1, 2])).unwrap().len(), 5);
}

#[test]
fn test_filter_positional_and_check() {
    let doc = sample();
    let below_heading = doc
        .filter(
            &Filter::new()
                .position(PosAttr::DocTop, Cmp::Gt, 100.0)
                .position(PosAttr::DocTop, Cmp::Lt, 500.0),
        )
        .unwrap();
    assert_eq!(below_heading.len(), 3);

    let narrow = doc
        .filter(&Filter::new().check(|s| s.width() < 70.0))
        .unwrap();
    assert_eq!(narrow.text(), "Total");
}

#[test]
fn test_filter_similar_comparison() {
    let doc = sample();
    let hit = doc
        .filter(&Filter::new().position(PosAttr::Top, Cmp::Similar, 201.0))
        .unwrap();
    // 200 and 202 are within 0.5% of 201.
    assert_eq!(hit.len(), 2);
}

#[test]
fn test_set_algebra() {
    let doc = sample();
    let total = doc.filter(&Filter::new().search("Total")).unwrap();
    let appendix = doc.filter(&Filter::new().search("Appendix")).unwrap();
    let everything = doc.filter(&Filter::new()).unwrap();

    let both = &total | &appendix;
    assert_eq!(both.len(), 2);

    // Idempotent and commutative.
    assert_eq!((&total | &total).len(), total.len());
    assert_eq!((&total & &total).len(), total.len());
    assert_eq!((&total & &appendix).len(), 0);
    assert_eq!((&everything & &total).len(), 1);
    assert_eq!((&both | &total).len(), 2);
}

#[test]
fn test_left_of_right_of_partition() {
    let doc = sample();
    let all = doc.filter(&Filter::new()).unwrap();
    let left = all.left_of(350.0);
    let right = all.right_of(350.0);
    assert_eq!(left.len() + right.len(), all.len());
    assert_eq!((&left & &right).len(), 0);
}

#[test]
fn test_directional_against_empty_is_empty() {
    let doc = sample();
    let all = doc.filter(&Filter::new()).unwrap();
    let none = all.filter(&Filter::new().search("missing")).unwrap();
    assert!(all.left_of(&none).is_empty());
    assert!(all.right_of(&none).is_empty());
    assert!(all.above(&none).is_empty());
    assert!(all.below(&none).is_empty());
    assert!(all.strictly_left_of(&none, false).is_empty());
    assert!(all.strictly_below(&none, true).is_empty());
}

#[test]
fn test_strictly_right_of_requires_band_overlap() {
    let doc = sample();
    let all = doc.filter(&Filter::new()).unwrap();
    let label = doc.filter(&Filter::new().search("Total")).unwrap();

    // Plain right_of also catches fragments on other rows/pages.
    let loose = all.right_of(&label);
    assert!(loose.len() >= 1);

    // The strict variant keeps only the value sharing the label's band.
    let strict = all.strictly_right_of(&label, false);
    assert_eq!(strict.text(), "1.234,56");

    let strict_mid = all.strictly_right_of(&label, true);
    assert_eq!(strict_mid.text(), "1.234,56");
}

#[test]
fn test_above_below() {
    let doc = sample();
    let all = doc.filter(&Filter::new()).unwrap();
    let note = doc.filter(&Filter::new().search("Unrelated")).unwrap();

    let above = all.above(&note);
    assert_eq!(above.len(), 3);
    let below = all.below(&note);
    assert_eq!(below.text(), "Appendix");

    // Page 2 content sits below a numeric document-space bound too.
    assert_eq!(all.below(805.0).text(), "Appendix");
}

#[test]
fn test_get_out_of_range_is_empty() {
    let doc = sample();
    let all = doc.filter(&Filter::new()).unwrap();
    assert!(!all.get(0).is_empty());
    assert!(all.get(99).is_empty());
    assert!(all.get(99).get(0).is_empty());
}

#[test]
fn test_get_by_line() {
    let doc = sample();
    let all = doc.filter(&Filter::new()).unwrap();
    let lines = all.get_by_line(8.0);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1].text(), "Total 1.234,56");

    // The trailing line is always yielded, even for an empty selection.
    let none = all.filter(&Filter::new().search("missing")).unwrap();
    let lines = none.get_by_line(8.0);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].is_empty());
}

#[test]
fn test_text_and_clean_text() {
    let doc = from_xml_str(
        r#"<pdf2xml><page number="1" width="600" height="800">
  <text top="100" left="100" width="100" height="12">exam-</text>
  <text top="100" left="210" width="100" height="12">ple   text</text>
</page></pdf2xml>"#,
    )
    .unwrap();
    let all = doc.filter(&Filter::new()).unwrap();
    assert_eq!(all.text(), "exam- ple   text");
    assert_eq!(all.clean_text(true), "example text");
    assert_eq!(all.clean_text(false), "exam- ple text");
}

#[test]
fn test_find() {
    let doc = sample();
    let all = doc.filter(&Filter::new()).unwrap();
    let re = regex::Regex::new(r"\d+\.\d+,\d+").unwrap();
    assert_eq!(all.find(&re).as_deref(), Some("1.234,56"));
}

#[test]
fn test_page_accessors() {
    let doc = sample();
    let appendix = doc.filter(&Filter::new().search("Appendix")).unwrap();
    assert_eq!(appendix.page().number, 2);
    assert_eq!(appendix.page_numbers(), &[2]);

    let all = doc.filter(&Filter::new()).unwrap();
    assert_eq!(all.page_numbers(), &[1, 2]);
}

#[test]
#[should_panic(expected = "single-page selection")]
fn test_page_on_multi_page_selection_panics() {
    let doc = sample();
    let all = doc.filter(&Filter::new()).unwrap();
    let _ = all.page();
}

#[test]
fn test_bounding_boxes() {
    let doc = sample();
    let heading = doc.filter(&Filter::new().search("Annual")).unwrap();
    let boxes = heading.bounding_boxes();
    assert_eq!(boxes.len(), 1);
    assert_eq!(boxes[0].page, 1);
    assert_eq!(boxes[0].left, 100);
    assert_eq!(boxes[0].top, 50);
    assert_eq!(boxes[0].width, 200);
    assert_eq!(boxes[0].height, 24);

    let json = serde_json::to_value(&boxes).unwrap();
    assert_eq!(json[0]["page"], 1);
    assert_eq!(json[0]["left"], 100);
}

#[test]
fn test_fontspec_registry() {
    let doc = sample();
    let font = doc.fontspec("0").unwrap();
    assert_eq!(font.family(), Some("Helvetica"));
    assert_eq!(font.size(), Some(22.0));
    assert!(doc.fontspec("7").is_err());
}
