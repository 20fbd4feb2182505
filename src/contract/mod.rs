//! Component contract: a structural snapshot of one component's public
//! surface, template DOM and stylesheet rules.

pub mod builder;
pub mod hash;

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ContractError, Result};

/// Flat DOM table keyed by selector-path key.
pub type DomStructure = IndexMap<String, DomElement>;

/// The unit of record produced by the builder and consumed by the diff engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentContract {
    /// Identity and provenance.
    pub meta: Meta,
    /// Inputs, outputs, methods, lifecycle hooks and imports.
    #[serde(default)]
    pub public_api: PublicApi,
    /// Content projection slots.
    #[serde(default)]
    pub slots: IndexMap<String, String>,
    /// Template elements keyed by selector path.
    #[serde(default)]
    pub dom: DomStructure,
    /// Stylesheet rules and the elements they apply to.
    #[serde(default)]
    pub styles: StylesSection,
}

/// Whether the template lives in the decorator or in its own file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    /// Template written in the decorator's `template` field.
    Inline,
    /// Template loaded from `templateUrl`.
    External,
}

/// Contract identity and provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    /// Component class name, or the template base name as a fallback.
    pub name: String,
    /// CSS selector the component is mounted with.
    pub selector: String,
    /// Class source file the contract was generated from.
    pub source_file: String,
    /// Origin of the template.
    pub template_type: TemplateType,
    /// RFC 3339 generation timestamp.
    pub generated_at: String,
    /// Content hash; empty until the builder seals the contract.
    #[serde(default)]
    pub hash: String,
}

/// Public surface extracted from the component class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicApi {
    /// Property name → binding descriptor.
    #[serde(default)]
    pub properties: IndexMap<String, PropertyBinding>,
    /// Event name → descriptor.
    #[serde(default)]
    pub events: IndexMap<String, EventBinding>,
    /// Method name → signature.
    #[serde(default)]
    pub methods: IndexMap<String, MethodSignature>,
    /// Lifecycle hooks in class order.
    #[serde(default)]
    pub lifecycle: Vec<String>,
    /// ES imports of the class file.
    #[serde(default)]
    pub imports: Vec<ImportInfo>,
}

/// A bindable class property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyBinding {
    /// Declared or inferred type text.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Whether the property is a component input.
    pub is_input: bool,
    /// Whether the input must be bound.
    pub required: bool,
    /// Input transform function, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
}

/// An event the component emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBinding {
    /// Payload type text.
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Signature of one class method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodSignature {
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterInfo>,
    /// Declared return type, `void` when omitted.
    pub return_type: String,
    /// Not marked `private` or `protected`.
    pub is_public: bool,
    /// Declared `static`.
    pub is_static: bool,
    /// Declared `async`.
    pub is_async: bool,
}

/// One method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterInfo {
    /// Parameter name.
    pub name: String,
    /// Declared type, `any` when omitted.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Declared with `?`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    /// Default value expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// One imported symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportInfo {
    /// Local name of the symbol.
    pub name: String,
    /// Module specifier.
    pub path: String,
}

/// One template element in the flat DOM table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomElement {
    /// Lower-cased tag name.
    pub tag: String,
    /// Key of the parent element, `None` for roots.
    pub parent: Option<String>,
    /// Keys of child elements in source order.
    #[serde(default)]
    pub children: Vec<String>,
    /// Bound properties, classes, styles and attributes.
    #[serde(default)]
    pub bindings: Vec<Binding>,
    /// Static attributes.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Event listeners.
    #[serde(default)]
    pub events: Vec<EventListener>,
    /// Enclosing control-flow directives, outermost first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structural: Option<Vec<StructuralDirective>>,
}

/// Kind of a template binding, derived from its name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingType {
    /// `[class.x]`
    Class,
    /// `[style.x]`
    Style,
    /// Any other `[x]`.
    Property,
    /// `[attr.x]`
    Attribute,
}

/// A template binding such as `[disabled]="isBusy"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Classification of the binding.
    #[serde(rename = "type")]
    pub kind: BindingType,
    /// Binding target without brackets.
    pub name: String,
    /// Bound expression text.
    pub source: String,
}

/// A static attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Attribute value; empty for boolean attributes.
    pub value: String,
}

/// An event listener such as `(click)="save()"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventListener {
    /// Event name without parentheses.
    pub name: String,
    /// Handler expression text.
    pub handler: String,
}

/// Control-flow construct enclosing an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StructuralKind {
    /// `@for` / `*ngFor`
    For,
    /// `@if` / `*ngIf`
    If,
    /// `@switch` / `[ngSwitch]`
    Switch,
    /// `@case` / `*ngSwitchCase`
    SwitchCase,
    /// `@default` / `*ngSwitchDefault`
    SwitchDefault,
    /// `@defer`
    Defer,
}

/// One entry of an element's structural stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralDirective {
    /// Directive kind.
    pub kind: StructuralKind,
    /// Condition, iterable, switch value or defer trigger.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    /// Loop variable for `for`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Branch within the construct (`then`, `else`, `empty`, `placeholder`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Stylesheet section of the contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylesSection {
    /// Stylesheet the rules were read from; empty without one.
    #[serde(default)]
    pub source_file: String,
    /// Selector → rule.
    #[serde(default)]
    pub rules: IndexMap<String, StyleRule>,
}

/// A stylesheet rule and the DOM keys its selector matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRule {
    /// DOM keys matched structurally; empty for unused rules.
    #[serde(default)]
    pub applies_to: Vec<String>,
    /// Declaration map.
    #[serde(default)]
    pub properties: IndexMap<String, String>,
}

impl StylesSection {
    /// Merges `other` into `self`, keeping `self`'s rule order and letting
    /// later declarations win.
    pub fn merge(&mut self, other: StylesSection) {
        if self.source_file.is_empty() {
            self.source_file = other.source_file;
        }
        for (selector, rule) in other.rules {
            let entry = self.rules.entry(selector).or_default();
            for key in rule.applies_to {
                if !entry.applies_to.contains(&key) {
                    entry.applies_to.push(key);
                }
            }
            entry.properties.extend(rule.properties);
        }
    }
}

/// On-disk form of a contract: the contract body plus a top-level hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedContract {
    /// Content hash, equal to `contract.meta.hash`.
    pub hash: String,
    /// The contract body.
    #[serde(flatten)]
    pub contract: ComponentContract,
}

impl ComponentContract {
    /// Checks the referential invariants of the DOM and style sections.
    ///
    /// `origin` is only used to label the error.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::InvalidContractFormat`] when a `parent`,
    /// `children` or `appliesTo` entry names a key missing from `dom`.
    pub fn validate(&self, origin: &Path) -> Result<()> {
        for (key, element) in &self.dom {
            if let Some(parent) = &element.parent {
                if !self.dom.contains_key(parent) {
                    return Err(ContractError::invalid(
                        origin,
                        format!("dom[{key}].parent references unknown key {parent}"),
                    ));
                }
            }
            if let Some(child) = element.children.iter().find(|c| !self.dom.contains_key(*c)) {
                return Err(ContractError::invalid(
                    origin,
                    format!("dom[{key}].children references unknown key {child}"),
                ));
            }
        }
        for (selector, rule) in &self.styles.rules {
            if let Some(key) = rule.applies_to.iter().find(|k| !self.dom.contains_key(*k)) {
                return Err(ContractError::invalid(
                    origin,
                    format!("styles.rules[{selector}].appliesTo references unknown key {key}"),
                ));
            }
        }
        Ok(())
    }

    /// Parses a persisted contract document and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::InvalidContractFormat`] when the JSON does not
    /// have the contract shape or breaks a referential invariant.
    pub fn from_json(origin: &Path, json: &str) -> Result<Self> {
        let persisted: PersistedContract = serde_json::from_str(json)
            .map_err(|e| ContractError::invalid(origin, e.to_string()))?;
        let mut contract = persisted.contract;
        if contract.meta.hash.is_empty() {
            contract.meta.hash = persisted.hash;
        }
        contract.validate(origin)?;
        Ok(contract)
    }

    /// Serializes the contract in its persisted form.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Serialize`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        let persisted = PersistedContract { hash: self.meta.hash.clone(), contract: self.clone() };
        Ok(serde_json::to_string_pretty(&persisted)?)
    }
}
