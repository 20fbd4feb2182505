//! Slot collector: content projection points declared with `<ng-content>`.

use indexmap::IndexMap;

use crate::contract::DomStructure;

/// Name used for an `<ng-content>` without `select`.
pub const DEFAULT_SLOT: &str = "default";

/// Maps every `<ng-content>` in `dom` to a slot name and its selector.
///
/// The name is the `select` value with brackets, dots and `#` stripped
/// (`[card-title]` becomes `card-title`); without `select` the slot is
/// [`DEFAULT_SLOT`] with selector `*`.
#[must_use]
pub fn collect_slots(dom: &DomStructure) -> IndexMap<String, String> {
    let mut slots = IndexMap::new();
    for element in dom.values().filter(|e| e.tag == "ng-content") {
        let select = element
            .attributes
            .iter()
            .find(|a| a.name == "select")
            .map(|a| a.value.trim())
            .filter(|v| !v.is_empty());
        match select {
            Some(selector) => {
                let name: String =
                    selector.chars().filter(|c| !matches!(c, '[' | ']' | '.' | '#')).collect();
                slots.insert(name, selector.to_string());
            }
            None => {
                slots.insert(DEFAULT_SLOT.to_string(), "*".to_string());
            }
        }
    }
    slots
}
