//! Structural selector matching against the flat DOM table.
//!
//! Matching is right to left over compound selectors joined by descendant or
//! child combinators. Pseudo-classes and pseudo-elements are ignored since
//! they never change which element a rule can reach. `:host`,
//! `:host-context()` and `::ng-deep` stand for the component boundary and
//! are dropped from the chain; sibling combinators never match.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::contract::{BindingType, DomElement, DomStructure};

/// Decides whether a CSS selector applies to a DOM entry.
pub trait SelectorMatcher {
    /// Returns `true` when `selector` structurally matches the element at
    /// `key`. A selector list matches when any of its members does.
    fn matches(&self, selector: &str, key: &str, element: &DomElement) -> bool;
}

/// [`SelectorMatcher`] over one DOM snapshot, caching compiled selectors.
pub struct DomSelectorMatcher<'a> {
    dom: &'a DomStructure,
    compiled: Mutex<HashMap<String, Arc<Vec<Complex>>>>,
}

impl<'a> DomSelectorMatcher<'a> {
    /// Creates a matcher for `dom`.
    #[must_use]
    pub fn new(dom: &'a DomStructure) -> Self {
        Self { dom, compiled: Mutex::new(HashMap::new()) }
    }

    fn compile(&self, selector: &str) -> Arc<Vec<Complex>> {
        let mut cache = self.compiled.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            cache
                .entry(selector.to_string())
                .or_insert_with(|| Arc::new(split_list(selector).iter().filter_map(|s| parse_complex(s)).collect())),
        )
    }

    fn matches_complex(&self, complex: &Complex, element: &DomElement) -> bool {
        match complex.compounds.len() {
            0 => false,
            n => self.match_at(complex, n - 1, element),
        }
    }

    fn match_at(&self, complex: &Complex, index: usize, element: &DomElement) -> bool {
        if !complex.compounds[index].matches(element) {
            return false;
        }
        if index == 0 {
            return !complex.rooted || element.parent.is_none();
        }
        let parent = |e: &DomElement| e.parent.as_ref().and_then(|p| self.dom.get(p));
        match complex.combinators[index - 1] {
            Combinator::Child => parent(element).is_some_and(|p| self.match_at(complex, index - 1, p)),
            Combinator::Descendant => {
                let mut current = parent(element);
                while let Some(ancestor) = current {
                    if self.match_at(complex, index - 1, ancestor) {
                        return true;
                    }
                    current = parent(ancestor);
                }
                false
            }
        }
    }
}

impl SelectorMatcher for DomSelectorMatcher<'_> {
    fn matches(&self, selector: &str, _key: &str, element: &DomElement) -> bool {
        self.compile(selector).iter().any(|c| self.matches_complex(c, element))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrTest {
    name: String,
    test: Option<(AttrOp, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttrTest>,
    /// `:host`, `:host-context()` or `::ng-deep`
    boundary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
    combinators: Vec<Combinator>,
    /// First compound must be a template root (`:host > x`).
    rooted: bool,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attributes.is_empty()
    }

    fn matches(&self, element: &DomElement) -> bool {
        if let Some(tag) = &self.tag {
            if tag != "*" && !tag.eq_ignore_ascii_case(&element.tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if attribute(element, "id") != Some(id.as_str()) {
                return false;
            }
        }
        let static_classes = attribute(element, "class").unwrap_or("");
        let has_class = |class: &str| {
            static_classes.split_whitespace().any(|c| c == class)
                || element.bindings.iter().any(|b| b.kind == BindingType::Class && b.name == class)
        };
        if !self.classes.iter().all(|c| has_class(c)) {
            return false;
        }
        self.attributes.iter().all(|test| attribute_matches(test, element))
    }
}

fn attribute<'e>(element: &'e DomElement, name: &str) -> Option<&'e str> {
    element.attributes.iter().find(|a| a.name.eq_ignore_ascii_case(name)).map(|a| a.value.as_str())
}

fn attribute_matches(test: &AttrTest, element: &DomElement) -> bool {
    let Some(value) = attribute(element, &test.name) else {
        // A bound attribute is present but its value is only known at runtime.
        return test.test.is_none()
            && element.bindings.iter().any(|b| {
                matches!(b.kind, BindingType::Attribute | BindingType::Property) && b.name == test.name
            });
    };
    let Some((op, expected)) = &test.test else { return true };
    match op {
        AttrOp::Equals => value == expected,
        AttrOp::Includes => value.split_whitespace().any(|v| v == expected),
        AttrOp::DashMatch => value == expected || value.starts_with(&format!("{expected}-")),
        AttrOp::Prefix => !expected.is_empty() && value.starts_with(expected.as_str()),
        AttrOp::Suffix => !expected.is_empty() && value.ends_with(expected.as_str()),
        AttrOp::Substring => !expected.is_empty() && value.contains(expected.as_str()),
    }
}

/// Splits a selector list on top-level commas.
fn split_list(selector: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let (mut depth, mut start) = (0i32, 0);
    for (i, c) in selector.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(selector[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(selector[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || c == '\\'
}

/// Compiles one complex selector. Returns `None` for selectors that can
/// never match structurally (sibling combinators).
fn parse_complex(selector: &str) -> Option<Complex> {
    let chars: Vec<char> = selector.chars().collect();
    let mut compounds: Vec<Compound> = Vec::new();
    let mut combinators: Vec<Combinator> = Vec::new();
    let mut current = Compound::default();
    let mut pending: Option<Combinator> = None;
    let mut i = 0;

    let ident = |i: &mut usize| {
        let start = *i;
        while *i < chars.len() && is_ident(chars[*i]) {
            *i += 1;
        }
        chars[start..*i].iter().filter(|c| **c != '\\').collect::<String>()
    };

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() || c == '>' || c == '+' || c == '~' {
            let combinator = match c {
                '>' => Some(Combinator::Child),
                '+' | '~' => return None,
                _ => None,
            };
            if !current.is_empty() || current.boundary {
                push_compound(&mut compounds, &mut combinators, &mut pending, std::mem::take(&mut current));
            }
            if !compounds.is_empty() {
                pending = match (pending, combinator) {
                    (_, Some(Combinator::Child)) | (Some(Combinator::Child), _) => Some(Combinator::Child),
                    _ => Some(Combinator::Descendant),
                };
            }
            i += 1;
            continue;
        }
        match c {
            '.' => {
                i += 1;
                current.classes.push(ident(&mut i));
            }
            '#' => {
                i += 1;
                current.id = Some(ident(&mut i));
            }
            '*' => {
                i += 1;
                current.tag = Some("*".to_string());
            }
            '&' => i += 1,
            '[' => {
                let end = chars[i..].iter().position(|&c| c == ']').map_or(chars.len(), |p| i + p);
                let inner: String = chars[i + 1..end].iter().collect();
                current.attributes.push(parse_attribute_test(&inner));
                i = end + 1;
            }
            ':' => {
                let double = chars.get(i + 1) == Some(&':');
                i += if double { 2 } else { 1 };
                let name = ident(&mut i);
                if chars.get(i) == Some(&'(') {
                    let mut depth = 0;
                    while i < chars.len() {
                        match chars[i] {
                            '(' => depth += 1,
                            ')' => {
                                depth -= 1;
                                if depth == 0 {
                                    i += 1;
                                    break;
                                }
                            }
                            _ => {}
                        }
                        i += 1;
                    }
                }
                if matches!(name.as_str(), "host" | "host-context" | "ng-deep") {
                    current.boundary = true;
                } else if current.is_empty() && !current.boundary {
                    // a bare pseudo-class still stands for some element
                    current.tag = Some("*".to_string());
                }
            }
            c if is_ident(c) => current.tag = Some(ident(&mut i).to_ascii_lowercase()),
            _ => i += 1,
        }
    }
    if !current.is_empty() || current.boundary {
        push_compound(&mut compounds, &mut combinators, &mut pending, current);
    }

    // Drop boundary compounds together with the combinator that links them.
    let mut rooted = false;
    let mut kept_compounds = Vec::new();
    let mut kept_combinators = Vec::new();
    let mut link = None;
    for (index, compound) in compounds.into_iter().enumerate() {
        let next_link = combinators.get(index).copied();
        if compound.boundary {
            if kept_compounds.is_empty() && next_link == Some(Combinator::Child) {
                rooted = true;
            }
            link = link.or(Some(Combinator::Descendant));
            continue;
        }
        if !kept_compounds.is_empty() {
            kept_combinators.push(link.unwrap_or(Combinator::Descendant));
        }
        kept_compounds.push(compound);
        link = next_link;
    }
    Some(Complex { compounds: kept_compounds, combinators: kept_combinators, rooted })
}

/// Appends `compound`, linking it to the previous one with the pending
/// combinator so that `combinators` always has one entry fewer.
fn push_compound(
    compounds: &mut Vec<Compound>,
    combinators: &mut Vec<Combinator>,
    pending: &mut Option<Combinator>,
    compound: Compound,
) {
    if !compounds.is_empty() {
        combinators.push(pending.take().unwrap_or(Combinator::Descendant));
    }
    *pending = None;
    compounds.push(compound);
}

fn parse_attribute_test(inner: &str) -> AttrTest {
    let ops = [
        ("~=", AttrOp::Includes),
        ("|=", AttrOp::DashMatch),
        ("^=", AttrOp::Prefix),
        ("$=", AttrOp::Suffix),
        ("*=", AttrOp::Substring),
        ("=", AttrOp::Equals),
    ];
    for (token, op) in ops {
        if let Some((name, value)) = inner.split_once(token) {
            let value = value.trim();
            let value = value.strip_suffix(" i").or_else(|| value.strip_suffix(" s")).unwrap_or(value).trim();
            let value = value.trim_matches(|c| c == '"' || c == '\'');
            return AttrTest { name: name.trim().to_string(), test: Some((op, value.to_string())) };
        }
    }
    AttrTest { name: inner.trim().to_string(), test: None }
}
