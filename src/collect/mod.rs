//! Structural collectors. Each turns one parsed facet of a component into
//! one section of its contract.

pub mod dom;
pub mod element;
pub mod inline_styles;
pub mod meta;
pub mod public_api;
pub mod selector;
pub mod slots;
pub mod styles;

pub use dom::collect_dom;
pub use inline_styles::collect_inline_styles;
pub use meta::{generate_meta, MetaSource};
pub use public_api::public_api;
pub use selector::{DomSelectorMatcher, SelectorMatcher};
pub use slots::collect_slots;
pub use styles::collect_styles;
