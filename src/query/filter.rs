//! Predicate-based element filtering.
//!
//! A [`Filter`] is a conjunction of a closed set of predicate variants:
//! text containment, regex matching (plain and whitespace-tolerant "auto"
//! mode), structural node queries, tag and page membership, positional
//! comparisons, and custom checks. An element survives only if every
//! supplied condition accepts it.

use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::error::{Error, Result};
use crate::model::{Element, Tag};
use crate::query::geom;
use crate::query::Selection;

/// Geometric attributes available to positional comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosAttr {
    Top,
    Bottom,
    Left,
    Right,
    DocTop,
    DocBottom,
    MidX,
    MidY,
    DocMidY,
    Width,
    Height,
}

/// Comparators available to positional comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    /// Tolerant equality with relative epsilon [`geom::SIMILAR_EPSILON`]
    Similar,
}

impl Cmp {
    fn apply(&self, a: f64, b: f64) -> bool {
        match self {
            Cmp::Gt => a > b,
            Cmp::Gte => a >= b,
            Cmp::Lt => a < b,
            Cmp::Lte => a <= b,
            Cmp::Eq => a == b,
            Cmp::Similar => geom::similar(a, b),
        }
    }
}

type Check = Box<dyn Fn(&Selection) -> bool>;

enum Condition {
    TextContains(String),
    AutoRegex(String),
    Regex(String),
    NodeQuery(String),
    PageIn(Vec<u32>),
    Positional(PosAttr, Cmp, f64),
    Check(Check),
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::TextContains(s) => write!(f, "TextContains({:?})", s),
            Condition::AutoRegex(s) => write!(f, "AutoRegex({:?})", s),
            Condition::Regex(s) => write!(f, "Regex({:?})", s),
            Condition::NodeQuery(s) => write!(f, "NodeQuery({:?})", s),
            Condition::PageIn(p) => write!(f, "PageIn({:?})", p),
            Condition::Positional(a, c, v) => write!(f, "Positional({:?}, {:?}, {})", a, c, v),
            Condition::Check(_) => write!(f, "Check(..)"),
        }
    }
}

/// Which element tags a filter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TagChoice {
    #[default]
    Text,
    Image,
    Any,
}

/// A conjunction of filter conditions, built incrementally.
///
/// Defaults to matching `text` elements only; use [`Filter::any_tag`] to
/// match images as well.
#[derive(Debug, Default)]
pub struct Filter {
    conditions: Vec<Condition>,
    tag: TagChoice,
}

impl Filter {
    /// Create an empty filter matching all text elements.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the element text to contain the given substring
    /// (case-sensitive).
    pub fn search(mut self, needle: impl Into<String>) -> Self {
        self.conditions.push(Condition::TextContains(needle.into()));
        self
    }

    /// Require the element text to match a whitespace-tolerant pattern,
    /// case-insensitively.
    ///
    /// A leading `^` anchors after leading whitespace, a trailing `$`
    /// anchors before trailing whitespace, and every literal space matches
    /// one or more whitespace characters.
    pub fn auto_regex(mut self, pattern: impl Into<String>) -> Self {
        self.conditions.push(Condition::AutoRegex(pattern.into()));
        self
    }

    /// Require the element text to match a regex, case-insensitively.
    pub fn regex(mut self, pattern: impl Into<String>) -> Self {
        self.conditions.push(Condition::Regex(pattern.into()));
        self
    }

    /// Require the element node to satisfy a structural query over its raw
    /// attributes, e.g. `[@font='2']` or `[@src]`.
    ///
    /// A query starting with `[` is interpreted as being prefixed with
    /// `self`.
    pub fn node_query(mut self, query: impl Into<String>) -> Self {
        self.conditions.push(Condition::NodeQuery(query.into()));
        self
    }

    /// Match only elements with the given tag.
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tag = match tag {
            Tag::Text => TagChoice::Text,
            Tag::Image => TagChoice::Image,
        };
        self
    }

    /// Match both text and image elements.
    pub fn any_tag(mut self) -> Self {
        self.tag = TagChoice::Any;
        self
    }

    /// Match only elements on the given page.
    pub fn page(mut self, number: u32) -> Self {
        self.conditions.push(Condition::PageIn(vec![number]));
        self
    }

    /// Match only elements on one of the given pages.
    pub fn pages(mut self, numbers: impl IntoIterator<Item = u32>) -> Self {
        self.conditions
            .push(Condition::PageIn(numbers.into_iter().collect()));
        self
    }

    /// Add a positional comparison; multiple comparisons AND together.
    pub fn position(mut self, attr: PosAttr, cmp: Cmp, value: f64) -> Self {
        self.conditions.push(Condition::Positional(attr, cmp, value));
        self
    }

    /// Add a custom predicate evaluated against each element as a singleton
    /// selection.
    pub fn check(mut self, check: impl Fn(&Selection) -> bool + 'static) -> Self {
        self.conditions.push(Condition::Check(Box::new(check)));
        self
    }

    /// Compile the filter into evaluable predicates. Regex and node-query
    /// conditions surface their parse errors here.
    pub(crate) fn compile(&self) -> Result<CompiledFilter<'_>> {
        let mut preds = Vec::with_capacity(self.conditions.len());
        for condition in &self.conditions {
            preds.push(match condition {
                Condition::TextContains(s) => Pred::Text(s),
                Condition::AutoRegex(p) => {
                    let pattern = auto_pattern(p);
                    log::debug!("auto-regex {:?} compiled from {:?}", pattern, p);
                    Pred::Re(case_insensitive(&pattern)?)
                }
                Condition::Regex(p) => Pred::Re(case_insensitive(p)?),
                Condition::NodeQuery(q) => Pred::Query(NodeQuery::parse(q)?),
                Condition::PageIn(pages) => Pred::PageIn(pages),
                Condition::Positional(attr, cmp, value) => Pred::Positional(*attr, *cmp, *value),
                Condition::Check(f) => Pred::Check(f.as_ref()),
            });
        }
        Ok(CompiledFilter {
            preds,
            tag: self.tag,
        })
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

/// Substitute whitespace-tolerant anchors and spaces into a pattern.
fn auto_pattern(pattern: &str) -> String {
    let mut p = pattern.to_string();
    if let Some(rest) = p.strip_prefix('^') {
        p = format!("^\\s*{}", rest);
    }
    if let Some(rest) = p.strip_suffix('$') {
        p = format!("{}\\s*$", rest);
    }
    p.replace(' ', "\\s+")
}

enum Pred<'f> {
    Text(&'f str),
    Re(Regex),
    Query(NodeQuery),
    PageIn(&'f [u32]),
    Positional(PosAttr, Cmp, f64),
    Check(&'f dyn Fn(&Selection) -> bool),
}

pub(crate) struct CompiledFilter<'f> {
    preds: Vec<Pred<'f>>,
    tag: TagChoice,
}

impl CompiledFilter<'_> {
    /// Evaluate all conditions against one element, presented as a
    /// singleton selection.
    pub(crate) fn accepts(&self, item: &Selection) -> bool {
        let element = match item.element() {
            Some(el) => el,
            None => return false,
        };

        let tag_ok = match self.tag {
            TagChoice::Text => element.tag == Tag::Text,
            TagChoice::Image => element.tag == Tag::Image,
            TagChoice::Any => true,
        };
        if !tag_ok {
            return false;
        }

        self.preds.iter().all(|pred| match pred {
            Pred::Text(needle) => element.text.contains(needle),
            Pred::Re(re) => re.is_match(&element.text),
            Pred::Query(q) => q.matches(element),
            Pred::PageIn(pages) => pages.contains(&element.page),
            Pred::Positional(attr, cmp, value) => cmp.apply(positional(item, *attr), *value),
            Pred::Check(f) => f(item),
        })
    }
}

fn positional(item: &Selection, attr: PosAttr) -> f64 {
    match attr {
        PosAttr::Top => item.top(),
        PosAttr::Bottom => item.bottom(),
        PosAttr::Left => item.left(),
        PosAttr::Right => item.right(),
        PosAttr::DocTop => item.doc_top(),
        PosAttr::DocBottom => item.doc_bottom(),
        PosAttr::MidX => item.midx(),
        PosAttr::MidY => item.midy(),
        PosAttr::DocMidY => item.doc_midy(),
        PosAttr::Width => item.width(),
        PosAttr::Height => item.height(),
    }
}

/// One attribute predicate of a structural node query.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrPred {
    name: String,
    /// `Some((true, v))` for `=`, `Some((false, v))` for `!=`, `None` for
    /// bare attribute presence
    value: Option<(bool, String)>,
}

/// A parsed structural query: one or more `[@attr]` / `[@attr='v']` /
/// `[@attr!='v']` predicates over an element's raw attributes, ANDed.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NodeQuery {
    preds: Vec<AttrPred>,
}

impl NodeQuery {
    fn parse(query: &str) -> Result<Self> {
        let mut rest = query.trim();
        rest = rest.strip_prefix("self").unwrap_or(rest);
        if rest.is_empty() {
            return Err(Error::Query("empty query".to_string()));
        }

        let mut preds = Vec::new();
        while !rest.is_empty() {
            let inner_end = rest
                .find(']')
                .ok_or_else(|| Error::Query(format!("unterminated predicate in {:?}", query)))?;
            let inner = rest[..inner_end]
                .strip_prefix("[@")
                .ok_or_else(|| Error::Query(format!("expected [@attr...] in {:?}", query)))?;
            rest = &rest[inner_end + 1..];

            let pred = if let Some((name, value)) = inner.split_once("!=") {
                AttrPred {
                    name: name.to_string(),
                    value: Some((false, unquote(value, query)?)),
                }
            } else if let Some((name, value)) = inner.split_once('=') {
                AttrPred {
                    name: name.to_string(),
                    value: Some((true, unquote(value, query)?)),
                }
            } else {
                AttrPred {
                    name: inner.to_string(),
                    value: None,
                }
            };
            if pred.name.is_empty() {
                return Err(Error::Query(format!("missing attribute name in {:?}", query)));
            }
            preds.push(pred);
        }
        Ok(Self { preds })
    }

    fn matches(&self, element: &Element) -> bool {
        self.preds.iter().all(|pred| {
            let actual = element.attr(&pred.name);
            match (&pred.value, actual) {
                (None, actual) => actual.is_some(),
                (Some((eq, expected)), Some(actual)) => (actual == expected) == *eq,
                (Some(_), None) => false,
            }
        })
    }
}

fn unquote(value: &str, query: &str) -> Result<String> {
    let stripped = value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')));
    stripped
        .map(str::to_string)
        .ok_or_else(|| Error::Query(format!("unquoted value in {:?}", query)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn element_with(attrs: &[(&str, &str)]) -> Element {
        Element {
            tag: Tag::Text,
            page: 1,
            left: 0,
            top: 0,
            width: 10,
            height: 10,
            font: None,
            text: String::new(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn test_auto_pattern_substitution() {
        assert_eq!(auto_pattern("^Total amount$"), "^\\s*Total\\s+amount\\s*$");
        assert_eq!(auto_pattern("plain"), "plain");
        assert_eq!(auto_pattern("^lead"), "^\\s*lead");
    }

    #[test]
    fn test_node_query_equality() {
        let q = NodeQuery::parse("[@font='2']").unwrap();
        assert!(q.matches(&element_with(&[("font", "2")])));
        assert!(!q.matches(&element_with(&[("font", "3")])));
        assert!(!q.matches(&element_with(&[])));
    }

    #[test]
    fn test_node_query_presence_and_negation() {
        let q = NodeQuery::parse("self[@src]").unwrap();
        assert!(q.matches(&element_with(&[("src", "img.png")])));
        assert!(!q.matches(&element_with(&[])));

        let q = NodeQuery::parse(r#"[@font!="2"]"#).unwrap();
        assert!(q.matches(&element_with(&[("font", "1")])));
        assert!(!q.matches(&element_with(&[("font", "2")])));
    }

    #[test]
    fn test_node_query_conjunction() {
        let q = NodeQuery::parse("[@font='2'][@left]").unwrap();
        assert!(q.matches(&element_with(&[("font", "2"), ("left", "10")])));
        assert!(!q.matches(&element_with(&[("font", "2")])));
    }

    #[test]
    fn test_node_query_errors() {
        assert!(NodeQuery::parse("").is_err());
        assert!(NodeQuery::parse("[@font='2'").is_err());
        assert!(NodeQuery::parse("[@font=2]").is_err());
        assert!(NodeQuery::parse("[font='2']").is_err());
    }

    #[test]
    fn test_invalid_regex_surfaces_on_compile() {
        let filter = Filter::new().regex("(unclosed");
        assert!(filter.compile().is_err());
    }

    #[test]
    fn test_cmp_apply() {
        assert!(Cmp::Gt.apply(2.0, 1.0));
        assert!(Cmp::Lte.apply(1.0, 1.0));
        assert!(Cmp::Similar.apply(1000.0, 1001.0));
        assert!(!Cmp::Similar.apply(1000.0, 1100.0));
    }
}
