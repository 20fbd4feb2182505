//! DOM collector: flattens the parsed template into the keyed DOM table.
//!
//! Keys are selector paths (`div#root > ul.items > li`). A segment is the
//! tag, `#id` and every static class; a segment repeated under the same
//! parent gets `:nth-of-type(n)`. Control-flow blocks are not entries of the
//! table, they contribute to the `structural` stack of every element they
//! enclose.

use std::collections::HashMap;

use crate::contract::{DomElement, DomStructure, StructuralDirective, StructuralKind};
use crate::dom_path::PATH_SEPARATOR;
use crate::error::Result;
use crate::parse::template::{BlockNode, ElementNode, TemplateNode};
use crate::parse::{ParsedAsset, TemplateAsset};

use super::element::{extract_facets, static_classes};

/// Parses `template` and flattens it into a [`DomStructure`].
///
/// # Errors
///
/// Propagates the template parse failure.
pub async fn collect_dom(template: &TemplateAsset) -> Result<DomStructure> {
    let nodes = template.parse().await?;
    Ok(flatten(&nodes))
}

/// Flattens parsed template nodes into a [`DomStructure`].
#[must_use]
pub fn flatten(nodes: &[TemplateNode]) -> DomStructure {
    let mut walker = Walker::default();
    let mut roots = Vec::new();
    walker.walk(nodes, None, &mut roots);
    walker.dom
}

/// Selector segment for one element.
#[must_use]
pub fn segment(element: &ElementNode) -> String {
    let mut segment = element.name.clone();
    if let Some(id) = element.attribute("id").filter(|id| !id.is_empty() && !id.contains("{{")) {
        segment.push('#');
        segment.push_str(id);
    }
    for class in static_classes(element) {
        segment.push('.');
        segment.push_str(class);
    }
    segment
}

#[derive(Default)]
struct Walker {
    dom: DomStructure,
    stack: Vec<StructuralDirective>,
    /// parent key → segment → occurrences so far
    seen: HashMap<String, HashMap<String, usize>>,
}

/// Directive that opened the current chain of sibling blocks, so `@else`,
/// `@empty` and the defer sub-blocks can repeat its expression.
#[derive(Default)]
struct Chain {
    expression: Option<String>,
}

impl Walker {
    fn walk(&mut self, nodes: &[TemplateNode], parent: Option<&str>, children: &mut Vec<String>) {
        let mut chain = Chain::default();
        for node in nodes {
            match node {
                TemplateNode::Element(element) => {
                    let key = self.element(element, parent);
                    children.push(key);
                }
                TemplateNode::Block(block) => {
                    let directive = block_directive(block, &mut chain);
                    let pushed = directive.is_some();
                    if let Some(directive) = directive {
                        self.stack.push(directive);
                    }
                    self.walk(&block.children, parent, children);
                    if pushed {
                        self.stack.pop();
                    }
                }
            }
        }
    }

    fn element(&mut self, element: &ElementNode, parent: Option<&str>) -> String {
        let segment = segment(element);
        let count = self
            .seen
            .entry(parent.unwrap_or_default().to_string())
            .or_default()
            .entry(segment.clone())
            .or_insert(0);
        *count += 1;
        let segment = if *count > 1 { format!("{segment}:nth-of-type({count})") } else { segment };
        let key = match parent {
            Some(parent) => format!("{parent}{PATH_SEPARATOR}{segment}"),
            None => segment,
        };

        let facets = extract_facets(element);
        let own = facets.structural.len();
        self.stack.extend(facets.structural);
        self.dom.insert(
            key.clone(),
            DomElement {
                tag: element.name.clone(),
                parent: parent.map(String::from),
                children: Vec::new(),
                bindings: facets.bindings,
                attributes: facets.attributes,
                events: facets.events,
                structural: (!self.stack.is_empty()).then(|| self.stack.clone()),
            },
        );

        let mut children = Vec::new();
        self.walk(&element.children, Some(&key), &mut children);
        if let Some(entry) = self.dom.get_mut(&key) {
            entry.children = children;
        }
        self.stack.truncate(self.stack.len() - own);
        key
    }
}

fn block_directive(block: &BlockNode, chain: &mut Chain) -> Option<StructuralDirective> {
    let parameters = block.parameters.as_str();
    let head = parameters.split(';').next().unwrap_or("").trim();
    let (kind, expression, alias, branch) = match block.name.as_str() {
        "if" => {
            let (expression, alias) = split_alias(parameters);
            chain.expression = Some(expression.clone());
            (StructuralKind::If, Some(expression), alias, None)
        }
        "else if" => {
            let (expression, alias) = split_alias(parameters);
            (StructuralKind::If, Some(expression), alias, Some("else if"))
        }
        "else" => (StructuralKind::If, chain.expression.clone(), None, Some("else")),
        "for" => {
            let (alias, expression) = match head.split_once(" of ") {
                Some((alias, expression)) => (Some(alias.trim().to_string()), expression.trim().to_string()),
                None => (None, head.to_string()),
            };
            chain.expression = Some(expression.clone());
            (StructuralKind::For, Some(expression), alias, None)
        }
        "empty" => (StructuralKind::For, chain.expression.clone(), None, Some("empty")),
        "switch" => (StructuralKind::Switch, Some(head.to_string()), None, None),
        "case" => (StructuralKind::SwitchCase, Some(head.to_string()), None, None),
        "default" => (StructuralKind::SwitchDefault, None, None, None),
        "defer" => {
            let trigger = (!head.is_empty()).then(|| head.to_string());
            chain.expression.clone_from(&trigger);
            (StructuralKind::Defer, trigger, None, None)
        }
        "placeholder" | "loading" | "error" => {
            (StructuralKind::Defer, chain.expression.clone(), None, Some(block.name.as_str()))
        }
        _ => return None,
    };
    Some(StructuralDirective {
        kind,
        expression: expression.filter(|e| !e.is_empty()),
        alias,
        branch: branch.map(String::from),
    })
}

/// Splits `cond; as alias` (or `cond as alias`) into its parts.
fn split_alias(parameters: &str) -> (String, Option<String>) {
    let mut clauses = parameters.split(';').map(str::trim);
    let head = clauses.next().unwrap_or("");
    if let Some((expression, alias)) = head.split_once(" as ") {
        return (expression.trim().to_string(), Some(alias.trim().to_string()));
    }
    let alias = clauses.find_map(|c| c.strip_prefix("as ").map(|a| a.trim().to_string()));
    (head.to_string(), alias)
}
