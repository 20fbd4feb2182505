//! Element helpers: split one template element's attributes into bindings,
//! static attributes, event listeners and structural directives.

use crate::contract::{
    Attribute, Binding, BindingType, EventListener, StructuralDirective, StructuralKind,
};
use crate::parse::template::ElementNode;

/// The contract-facing facets of one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementFacets {
    /// Property, class, style and attribute bindings.
    pub bindings: Vec<Binding>,
    /// Static attributes, template references and animation triggers.
    pub attributes: Vec<Attribute>,
    /// Event listeners, including `xChange` for two-way bindings.
    pub events: Vec<EventListener>,
    /// Directives declared on the element itself (`*ngIf`, `*ngFor`, ...).
    pub structural: Vec<StructuralDirective>,
}

/// Classifies a binding target by its prefix.
#[must_use]
pub fn classify_binding(target: &str) -> (BindingType, &str) {
    if let Some(name) = target.strip_prefix("class.") {
        (BindingType::Class, name)
    } else if let Some(name) = target.strip_prefix("style.") {
        (BindingType::Style, name)
    } else if let Some(name) = target.strip_prefix("attr.") {
        (BindingType::Attribute, name)
    } else {
        (BindingType::Property, target)
    }
}

/// Extracts the facets of `element` in attribute order.
#[must_use]
pub fn extract_facets(element: &ElementNode) -> ElementFacets {
    let mut facets = ElementFacets::default();
    for attribute in &element.attributes {
        let name = attribute.name.as_str();
        let value = attribute.value.as_deref().unwrap_or("").trim();

        if let Some(target) = banana_target(name) {
            facets.bindings.push(binding(target, value));
            facets.events.push(EventListener {
                name: format!("{target}Change"),
                handler: value.to_string(),
            });
        } else if let Some(target) = bracketed(name, '[', ']').or_else(|| name.strip_prefix("bind-")) {
            facets.bindings.push(binding(target, value));
        } else if let Some(event) = bracketed(name, '(', ')').or_else(|| name.strip_prefix("on-")) {
            facets.events.push(EventListener { name: event.to_string(), handler: value.to_string() });
        } else if let Some(directive) = name.strip_prefix('*') {
            match micro_syntax(directive, value) {
                Some(structural) => facets.structural.push(structural),
                None => facets.attributes.push(Attribute { name: name.to_string(), value: value.to_string() }),
            }
        } else if value.contains("{{") && !name.starts_with(['#', '@']) {
            facets.bindings.push(binding(name, value));
        } else {
            facets.attributes.push(Attribute { name: name.to_string(), value: value.to_string() });
        }
    }
    facets
}

/// Static class tokens from the `class` attribute, skipping interpolated ones.
#[must_use]
pub fn static_classes(element: &ElementNode) -> Vec<&str> {
    element
        .attribute("class")
        .filter(|v| !v.contains("{{"))
        .map(|v| v.split_whitespace().collect())
        .unwrap_or_default()
}

fn binding(target: &str, source: &str) -> Binding {
    let (kind, name) = classify_binding(target);
    Binding { kind, name: name.to_string(), source: source.to_string() }
}

fn bracketed(name: &str, open: char, close: char) -> Option<&str> {
    name.strip_prefix(open)?.strip_suffix(close).filter(|inner| !inner.is_empty())
}

fn banana_target(name: &str) -> Option<&str> {
    name.strip_prefix("[(")
        .and_then(|n| n.strip_suffix(")]"))
        .or_else(|| name.strip_prefix("bindon-"))
        .filter(|inner| !inner.is_empty())
}

/// Reads the structural micro-syntax of `*ngIf`, `*ngFor` and the switch
/// directives. Unknown directives stay plain attributes.
fn micro_syntax(directive: &str, value: &str) -> Option<StructuralDirective> {
    let mut clauses = value.split(';').map(str::trim);
    let head = clauses.next().unwrap_or("");
    match directive {
        "ngIf" => {
            let (expression, alias) = match head.split_once(" as ") {
                Some((expr, alias)) => (expr.trim(), Some(alias.trim().to_string())),
                None => (head, None),
            };
            let alias = alias.or_else(|| {
                clauses.find_map(|c| c.strip_prefix("as ").map(|a| a.trim().to_string()))
            });
            Some(directive_of(StructuralKind::If, Some(expression), alias))
        }
        "ngFor" => {
            let head = head.strip_prefix("let ").unwrap_or(head);
            let (alias, expression) = match head.split_once(" of ") {
                Some((alias, expr)) => (Some(alias.trim().to_string()), expr.trim()),
                None => (None, head),
            };
            Some(directive_of(StructuralKind::For, Some(expression), alias))
        }
        "ngSwitchCase" => Some(directive_of(StructuralKind::SwitchCase, Some(head), None)),
        "ngSwitchDefault" => Some(directive_of(StructuralKind::SwitchDefault, None, None)),
        _ => None,
    }
}

fn directive_of(kind: StructuralKind, expression: Option<&str>, alias: Option<String>) -> StructuralDirective {
    StructuralDirective {
        kind,
        expression: expression.filter(|e| !e.is_empty()).map(String::from),
        alias,
        branch: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::template::{parse_template, TemplateNode};
    use pretty_assertions::assert_eq;

    fn element(source: &str) -> ElementNode {
        match parse_template(source).unwrap().remove(0) {
            TemplateNode::Element(e) => e,
            TemplateNode::Block(_) => panic!("expected an element"),
        }
    }

    #[test]
    fn bindings_are_classified_by_prefix() {
        let facets = extract_facets(&element(
            r#"<button [class.active]="on" [style.width.px]="w" [attr.aria-label]="label" [disabled]="busy" bind-title="t"></button>"#,
        ));

        let kinds: Vec<(BindingType, &str)> =
            facets.bindings.iter().map(|b| (b.kind, b.name.as_str())).collect();
        assert_eq!(
            kinds,
            vec![
                (BindingType::Class, "active"),
                (BindingType::Style, "width.px"),
                (BindingType::Attribute, "aria-label"),
                (BindingType::Property, "disabled"),
                (BindingType::Property, "title"),
            ]
        );
        assert_eq!(facets.bindings[3].source, "busy");
    }

    #[test]
    fn two_way_binding_yields_property_and_change_event() {
        let facets = extract_facets(&element(r#"<input [(ngModel)]="name" (blur)="touch()" on-focus="focus()">"#));

        assert_eq!(facets.bindings[0].name, "ngModel");
        let events: Vec<&str> = facets.events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(events, vec!["ngModelChange", "blur", "focus"]);
        assert_eq!(facets.events[1].handler, "touch()");
    }

    #[test]
    fn static_attributes_references_and_triggers_are_kept() {
        let facets = extract_facets(&element(
            r#"<div id="root" class="card wide" #panel @fade title="Hi {{ name }}" hidden></div>"#,
        ));

        let names: Vec<&str> = facets.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["id", "class", "#panel", "@fade", "hidden"]);
        assert_eq!(facets.bindings[0].name, "title");
        assert_eq!(facets.bindings[0].source, "Hi {{ name }}");
    }

    #[test]
    fn structural_micro_syntax_becomes_directives() {
        let facets = extract_facets(&element(
            r#"<li *ngFor="let item of items; trackBy: byId" *ngIf="user$ | async as user"></li>"#,
        ));

        assert_eq!(facets.structural[0].kind, StructuralKind::For);
        assert_eq!(facets.structural[0].expression.as_deref(), Some("items"));
        assert_eq!(facets.structural[0].alias.as_deref(), Some("item"));
        assert_eq!(facets.structural[1].kind, StructuralKind::If);
        assert_eq!(facets.structural[1].expression.as_deref(), Some("user$ | async"));
        assert_eq!(facets.structural[1].alias.as_deref(), Some("user"));
        assert!(facets.attributes.is_empty());
    }

    #[test]
    fn static_classes_skip_interpolated_values() {
        assert_eq!(static_classes(&element(r#"<p class=" a  b "></p>"#)), vec!["a", "b"]);
        assert!(static_classes(&element(r#"<p class="a {{ extra }}"></p>"#)).is_empty());
    }
}
