//! Public API extractor over the parsed class surface.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::contract::{
    EventBinding, ImportInfo, MethodSignature, ParameterInfo, PropertyBinding, PublicApi,
};
use crate::parse::typescript::{
    Accessor, ClassMember, ClassSurface, Decorator, MethodDecl, PropertyDecl, Visibility,
};

/// Angular lifecycle hooks, in the order Angular invokes them.
pub const LIFECYCLE_HOOKS: [&str; 8] = [
    "ngOnChanges",
    "ngOnInit",
    "ngDoCheck",
    "ngAfterContentInit",
    "ngAfterContentChecked",
    "ngAfterViewInit",
    "ngAfterViewChecked",
    "ngOnDestroy",
];

static SIGNAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(input|model|output)(\.required)?\s*(?:<(.*)>)?\s*\((.*)\)\s*$")
        .unwrap_or_else(|e| panic!("invalid signal regex: {e}"))
});

static EMITTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^new\s+EventEmitter\s*(?:<(.*)>)?\s*\(").unwrap_or_else(|e| panic!("invalid emitter regex: {e}"))
});

/// Maps a parsed class surface onto the contract's public API section.
#[must_use]
pub fn public_api(surface: &ClassSurface) -> PublicApi {
    let mut api = PublicApi {
        imports: surface
            .imports
            .iter()
            .map(|i| ImportInfo { name: i.name.clone(), path: i.path.clone() })
            .collect(),
        ..PublicApi::default()
    };

    for member in &surface.members {
        match member {
            ClassMember::Property(property) => add_property(&mut api, property),
            ClassMember::Method(method) => add_method(&mut api, method),
        }
    }
    api
}

fn add_property(api: &mut PublicApi, property: &PropertyDecl) {
    let initializer = property.initializer.as_deref().unwrap_or("").trim();

    if let Some(decorator) = find(&property.decorators, "Input") {
        let name = alias(&decorator.arguments).unwrap_or_else(|| property.name.clone());
        let type_name = property.type_annotation.clone().unwrap_or_else(|| infer_type(initializer));
        api.properties.insert(name, input_binding(type_name, &decorator.arguments));
        return;
    }
    if let Some(decorator) = find(&property.decorators, "Output") {
        let name = alias(&decorator.arguments).unwrap_or_else(|| property.name.clone());
        let type_name = EMITTER_RE
            .captures(initializer)
            .map_or_else(|| "any".to_string(), |c| c.get(1).map_or("any", |m| m.as_str().trim()).to_string());
        api.events.insert(name, EventBinding { type_name });
        return;
    }
    if let Some(signal) = SIGNAL_RE.captures(initializer) {
        let function = signal.get(1).map_or("", |m| m.as_str());
        let required = signal.get(2).is_some();
        let generic = signal.get(3).map(|m| m.as_str().trim().to_string());
        let arguments = signal.get(4).map_or("", |m| m.as_str());
        let (initial, options) = if required { ("", arguments) } else { split_first_argument(arguments) };
        let name = alias(options).unwrap_or_else(|| property.name.clone());

        match function {
            "output" => {
                api.events.insert(name, EventBinding { type_name: generic.unwrap_or_else(|| "void".into()) });
            }
            _ => {
                let type_name = generic.unwrap_or_else(|| infer_type(initial));
                let mut binding = input_binding(type_name.clone(), options);
                binding.required |= required;
                api.properties.insert(name.clone(), binding);
                if function == "model" {
                    api.events.insert(format!("{name}Change"), EventBinding { type_name });
                }
            }
        }
        return;
    }
    if property.modifiers.visibility == Visibility::Public && !property.modifiers.is_static {
        let type_name = property.type_annotation.clone().unwrap_or_else(|| infer_type(initializer));
        api.properties.insert(
            property.name.clone(),
            PropertyBinding { type_name, is_input: false, required: false, transform: None },
        );
    }
}

fn add_method(api: &mut PublicApi, method: &MethodDecl) {
    if method.accessor == Some(Accessor::Setter) {
        if let Some(decorator) = find(&method.decorators, "Input") {
            let name = alias(&decorator.arguments).unwrap_or_else(|| method.name.clone());
            let type_name = method
                .parameters
                .first()
                .and_then(|p| p.type_annotation.clone())
                .unwrap_or_else(|| "any".into());
            api.properties.insert(name, input_binding(type_name, &decorator.arguments));
        }
        return;
    }
    if method.accessor.is_some() || method.name == "constructor" {
        return;
    }
    if LIFECYCLE_HOOKS.contains(&method.name.as_str()) && !api.lifecycle.contains(&method.name) {
        api.lifecycle.push(method.name.clone());
    }
    api.methods.insert(
        method.name.clone(),
        MethodSignature {
            parameters: method
                .parameters
                .iter()
                .map(|p| ParameterInfo {
                    name: p.name.clone(),
                    type_name: p.type_annotation.clone().unwrap_or_else(|| "any".into()),
                    optional: p.optional,
                    default_value: p.default_value.clone(),
                })
                .collect(),
            return_type: method.return_type.clone().unwrap_or_else(|| "void".into()),
            is_public: method.modifiers.visibility == Visibility::Public,
            is_static: method.modifiers.is_static,
            is_async: method.modifiers.is_async,
        },
    );
}

fn find<'d>(decorators: &'d [Decorator], name: &str) -> Option<&'d Decorator> {
    decorators.iter().find(|d| d.name == name)
}

fn input_binding(type_name: String, options: &str) -> PropertyBinding {
    PropertyBinding {
        type_name,
        is_input: true,
        required: option(options, "required").is_some_and(|v| v == "true"),
        transform: option(options, "transform"),
    }
}

/// Public alias from a decorator argument (`'alias'`) or an options object
/// (`{ alias: 'x' }`).
fn alias(arguments: &str) -> Option<String> {
    let trimmed = arguments.trim();
    if let Some(quoted) = unquote(trimmed) {
        return Some(quoted);
    }
    option(trimmed, "alias")
}

/// Reads `key: value` out of an object literal's text.
fn option(object: &str, key: &str) -> Option<String> {
    let body = object.trim().strip_prefix('{')?.strip_suffix('}')?;
    crate::parse::typescript::split_top_level(body, ',').into_iter().find_map(|entry| {
        let (k, v) = entry.split_once(':')?;
        (k.trim() == key).then(|| {
            let v = v.trim();
            unquote(v).unwrap_or_else(|| v.to_string())
        })
    })
}

fn unquote(text: &str) -> Option<String> {
    ['\'', '"', '`'].iter().find_map(|q| {
        text.strip_prefix(*q)?.strip_suffix(*q).map(String::from)
    })
}

/// Splits `initial, { options }` into its two parts.
fn split_first_argument(arguments: &str) -> (&str, &str) {
    let parts = crate::parse::typescript::split_top_level(arguments, ',');
    match parts.as_slice() {
        [] => ("", ""),
        [first] => (first.trim(), ""),
        [first, second, ..] => (first.trim(), second.trim()),
    }
}

/// Best-effort type of an initializer expression.
fn infer_type(initializer: &str) -> String {
    let init = initializer.trim();
    let inferred = if init.is_empty() {
        "any"
    } else if unquote(init).is_some() {
        "string"
    } else if init == "true" || init == "false" {
        "boolean"
    } else if init.parse::<f64>().is_ok() {
        "number"
    } else if init.starts_with('[') {
        "any[]"
    } else if init == "null" {
        "null"
    } else if let Some(rest) = init.strip_prefix("new ") {
        return rest.split(|c: char| c == '(' || c == '<').next().unwrap_or("any").trim().to_string();
    } else {
        "unknown"
    };
    inferred.to_string()
}
