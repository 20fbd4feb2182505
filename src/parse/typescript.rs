//! Lightweight extractor for the class surface of an Angular component file.
//!
//! This is not a TypeScript parser. It blanks comments, locates the
//! `@Component` decorator and the decorated class, splits the class body into
//! member declarations and reads each declaration's decorators, modifiers,
//! name, type annotation and initializer. That is enough to derive inputs,
//! outputs, methods, lifecycle hooks and imports for a contract.

use once_cell::sync::Lazy;
use regex::Regex;

static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*import\s+(?:type\s+)?([^'";]*?)\s+from\s+['"]([^'"]+)['"]"#)
        .unwrap_or_else(|e| panic!("invalid import regex: {e}"))
});

static CLASS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)(?:\s*<[^{]*?>)?(?:\s+extends\s+[^{]+?)?(?:\s+implements\s+([^{]+?))?\s*\{",
    )
    .unwrap_or_else(|e| panic!("invalid class regex: {e}"))
});

static IDENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(#?[A-Za-z_$][\w$]*)").unwrap_or_else(|e| panic!("invalid identifier regex: {e}"))
});

const MODIFIERS: [&str; 10] = [
    "public", "private", "protected", "static", "readonly", "async", "override", "declare",
    "abstract", "accessor",
];

/// Member visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// No modifier or `public`.
    #[default]
    Public,
    /// `protected`
    Protected,
    /// `private` or an ES `#private` name.
    Private,
}

/// Modifiers preceding a member name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Access level.
    pub visibility: Visibility,
    /// `static`
    pub is_static: bool,
    /// `async`
    pub is_async: bool,
    /// `readonly`
    pub is_readonly: bool,
}

/// A decorator applied to a member, e.g. `@Input({ required: true })`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decorator {
    /// Decorator name without `@`.
    pub name: String,
    /// Raw argument text between the parentheses.
    pub arguments: String,
}

/// Kind of accessor, if the member is one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    /// `get name()`
    Getter,
    /// `set name(v)`
    Setter,
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    /// Parameter name.
    pub name: String,
    /// Type annotation text.
    pub type_annotation: Option<String>,
    /// Declared with `?`.
    pub optional: bool,
    /// Default value expression.
    pub default_value: Option<String>,
}

/// A class property declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    /// Property name.
    pub name: String,
    /// Decorators in source order.
    pub decorators: Vec<Decorator>,
    /// Modifiers.
    pub modifiers: Modifiers,
    /// Type annotation text.
    pub type_annotation: Option<String>,
    /// Initializer expression text.
    pub initializer: Option<String>,
}

/// A class method, constructor or accessor declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    /// Method name.
    pub name: String,
    /// Decorators in source order.
    pub decorators: Vec<Decorator>,
    /// Modifiers.
    pub modifiers: Modifiers,
    /// Accessor kind, if any.
    pub accessor: Option<Accessor>,
    /// Parameters in order.
    pub parameters: Vec<ParamDecl>,
    /// Return type annotation text.
    pub return_type: Option<String>,
}

/// A class member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassMember {
    /// Field declaration.
    Property(PropertyDecl),
    /// Method, constructor or accessor.
    Method(MethodDecl),
}

/// One imported binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Local name.
    pub name: String,
    /// Module specifier.
    pub path: String,
}

/// Metadata read from the `@Component` decorator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentDecorator {
    /// `selector`
    pub selector: Option<String>,
    /// `templateUrl`
    pub template_url: Option<String>,
    /// Inline `template` text.
    pub template: Option<String>,
    /// 1-based line where the inline template text starts.
    pub template_line: usize,
    /// `styleUrl` / `styleUrls`
    pub style_urls: Vec<String>,
    /// Inline `styles` entries with their starting lines.
    pub styles: Vec<(String, usize)>,
}

/// Everything the collectors need from a component class file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSurface {
    /// Name of the decorated (or first) class.
    pub class_name: Option<String>,
    /// `@Component` metadata, when present.
    pub decorator: Option<ComponentDecorator>,
    /// Interfaces named in `implements`.
    pub implements: Vec<String>,
    /// Members in source order.
    pub members: Vec<ClassMember>,
    /// ES imports of the file.
    pub imports: Vec<ImportDecl>,
}

/// Syntax error with the 1-based line it was detected on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    /// Line of the offending construct.
    pub line: usize,
    /// Description of the problem.
    pub message: String,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Extracts the class surface of a component source file.
///
/// A file without any class yields an empty surface; the builder then falls
/// back to template-derived metadata.
///
/// # Errors
///
/// Returns a [`SourceError`] when the decorator or class body is unbalanced.
pub fn parse_class_surface(source: &str) -> Result<ClassSurface, SourceError> {
    let clean = blank_comments(source);
    let mut surface = ClassSurface { imports: parse_imports(&clean), ..ClassSurface::default() };

    let mut search_from = 0;
    if let Some(at) = clean.find("@Component(") {
        let open = at + "@Component".len();
        let len = balanced(&clean[open..], '(', ')')
            .ok_or_else(|| error_at(&clean, at, "unbalanced @Component decorator"))?;
        let arguments = &clean[open + 1..open + 1 + len];
        surface.decorator = Some(parse_component_decorator(arguments, line_of(&clean, open + 1)));
        search_from = open + len + 2;
    }

    let Some(captures) = CLASS_RE.captures(&clean[search_from..]) else {
        return Ok(surface);
    };
    let whole = captures.get(0).map_or(0..0, |m| m.range());
    surface.class_name = captures.get(1).map(|m| m.as_str().to_string());
    surface.implements = captures
        .get(2)
        .map(|m| m.as_str().split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    let brace = search_from + whole.end - 1;
    let body_len = balanced(&clean[brace..], '{', '}')
        .ok_or_else(|| error_at(&clean, brace, "unbalanced class body"))?;
    let body = &clean[brace + 1..brace + 1 + body_len];
    surface.members = split_members(body).iter().filter_map(|m| parse_member(m)).collect();
    Ok(surface)
}

fn parse_imports(clean: &str) -> Vec<ImportDecl> {
    let mut imports = Vec::new();
    for captures in IMPORT_RE.captures_iter(clean) {
        let clause = captures.get(1).map_or("", |m| m.as_str()).trim();
        let path = captures.get(2).map_or("", |m| m.as_str()).to_string();
        let (default_part, named_part) = match clause.find('{') {
            Some(open) => {
                let close = clause.rfind('}').unwrap_or(clause.len());
                (&clause[..open], Some(&clause[open + 1..close]))
            }
            None => (clause, None),
        };
        for default in default_part.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let name = default.strip_prefix("* as ").map_or(default, str::trim);
            imports.push(ImportDecl { name: name.to_string(), path: path.clone() });
        }
        for named in named_part.unwrap_or("").split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let named = named.strip_prefix("type ").unwrap_or(named);
            let local = named.rsplit(" as ").next().unwrap_or(named).trim();
            imports.push(ImportDecl { name: local.to_string(), path: path.clone() });
        }
    }
    imports
}

fn parse_component_decorator(arguments: &str, first_line: usize) -> ComponentDecorator {
    let mut decorator = ComponentDecorator::default();
    let line_at = |offset: usize| first_line + arguments[..offset].matches('\n').count();

    decorator.selector = property_value(arguments, "selector").map(|(s, _)| s);
    decorator.template_url = property_value(arguments, "templateUrl").map(|(s, _)| s);
    if let Some((template, offset)) = property_value(arguments, "template") {
        decorator.template = Some(template);
        decorator.template_line = line_at(offset);
    }
    if let Some((url, _)) = property_value(arguments, "styleUrl") {
        decorator.style_urls.push(url);
    }
    if let Some(offset) = property_offset(arguments, "styleUrls") {
        decorator.style_urls.extend(
            string_literals(array_text(&arguments[offset..])).into_iter().map(|(s, _)| s),
        );
    }
    if let Some(offset) = property_offset(arguments, "styles") {
        let rest = &arguments[offset..];
        let literals = if rest.starts_with('[') {
            string_literals(array_text(rest))
        } else {
            string_literal(rest).map(|(s, len)| vec![(s, len)]).into_iter().flatten().collect()
        };
        for (text, _) in literals {
            let at = offset + rest.find(text.as_str()).unwrap_or(0);
            decorator.styles.push((text, line_at(at)));
        }
    }
    decorator
}

/// Offset of the value of `key: value` within an object literal's text.
fn property_offset(object: &str, key: &str) -> Option<usize> {
    let pattern = Regex::new(&format!(r"(?:^|[\s,{{]){}\s*:\s*", regex::escape(key))).ok()?;
    pattern.find(object).map(|m| m.end())
}

/// String value of `key` and the offset of its text.
fn property_value(object: &str, key: &str) -> Option<(String, usize)> {
    let offset = property_offset(object, key)?;
    string_literal(&object[offset..]).map(|(s, _)| (s, offset + 1))
}

/// Reads the string literal `text` starts with, returning its content and
/// total length including quotes.
fn string_literal(text: &str) -> Option<(String, usize)> {
    let quote = text.chars().next().filter(|c| matches!(c, '\'' | '"' | '`'))?;
    let mut content = String::new();
    let mut escaped = false;
    for (i, c) in text.char_indices().skip(1) {
        if escaped {
            content.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some((content, i + 1));
        } else {
            content.push(c);
        }
    }
    None
}

/// All string literals in `text`, with their offsets.
fn string_literals(text: &str) -> Vec<(String, usize)> {
    let mut found = Vec::new();
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        match string_literal(rest) {
            Some((content, len)) => {
                found.push((content, i));
                i += len;
            }
            None => i += rest.chars().next().map_or(1, char::len_utf8),
        }
    }
    found
}

/// Text of the bracketed array `text` starts with, or all of `text`.
fn array_text(text: &str) -> &str {
    balanced(text, '[', ']').map_or(text, |len| &text[1..=len])
}

/// Length of the content of the group opened by `text`'s first character,
/// skipping string literals.
fn balanced(text: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut chars = text.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                let (_, len) = string_literal(&text[i..])?;
                let end = i + len;
                for (j, _) in chars.by_ref() {
                    if j + 1 >= end {
                        break;
                    }
                }
            }
            c if c == open => depth += 1,
            c if c == close => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i - open.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits a class body into member declaration texts.
///
/// A member ends at a top-level `;`, at the closing brace of a method body,
/// or at a newline when the text so far is a complete field declaration.
fn split_members(body: &str) -> Vec<String> {
    let mut members = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut body_depth: Option<i32> = None;
    let mut chars = body.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                if let Some((_, len)) = string_literal(&body[i..]) {
                    current.push_str(&body[i..i + len]);
                    while chars.peek().is_some_and(|(j, _)| *j < i + len) {
                        chars.next();
                    }
                    continue;
                }
            }
            '{' | '(' | '[' => {
                if c == '{' && depth == 0 && opens_body(&current) {
                    body_depth = Some(depth);
                }
                depth += 1;
            }
            '}' | ')' | ']' => {
                depth -= 1;
                if c == '}' && body_depth == Some(depth) {
                    current.push(c);
                    push_member(&mut members, &mut current);
                    body_depth = None;
                    continue;
                }
            }
            ';' if depth == 0 => {
                push_member(&mut members, &mut current);
                continue;
            }
            '\n' if depth == 0 && field_is_complete(&current) && !continues(&body[i..]) => {
                push_member(&mut members, &mut current);
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    push_member(&mut members, &mut current);
    members
}

fn push_member(members: &mut Vec<String>, current: &mut String) {
    let text = current.trim();
    if !text.is_empty() {
        members.push(text.to_string());
    }
    current.clear();
}

/// A `{` at depth 0 opens a method body when it follows a parameter list,
/// a return type annotation or an arrow.
fn opens_body(text: &str) -> bool {
    let text = text.trim_end();
    if text.ends_with(')') || text.ends_with("=>") {
        return true;
    }
    let (_, rest) = strip_decorators(text.trim_start());
    let rest = rest.trim_start();
    // `name(params): ReturnType {` without an initializer.
    rest.contains('(') && top_level_find(rest, '=').is_none() && {
        let before_paren = &rest[..rest.find('(').unwrap_or(0)];
        !before_paren.contains(':')
    }
}

/// The current text is a field declaration that could end at this newline.
fn field_is_complete(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    let (_, rest) = strip_decorators(trimmed);
    if rest.trim().is_empty() {
        return false;
    }
    !trimmed.ends_with(|c: char| "=,(:|&?.+-*/{[".contains(c))
}

/// The next line continues the current expression or opens a method body.
fn continues(rest: &str) -> bool {
    rest.trim_start().starts_with(|c: char| ".?:=|&)]},+-*/{".contains(c))
}

/// Position of the first top-level `needle` (for `=`, ignoring `=>`, `==`).
fn top_level_find(text: &str, needle: char) -> Option<usize> {
    let mut depth = 0i32;
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    for (k, &(i, c)) in chars.iter().enumerate() {
        let prev = if k > 0 { Some(chars[k - 1].1) } else { None };
        let next = chars.get(k + 1).map(|&(_, n)| n);
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            '<' if needle != '<' => depth += 1,
            '>' if prev != Some('=') => depth -= 1,
            c if c == needle && depth == 0 => {
                if needle == '='
                    && (next == Some('>') || next == Some('=') || matches!(prev, Some('=' | '!')))
                {
                    continue;
                }
                return Some(i);
            }
            _ => {}
        }
    }
    None
}

/// Splits leading decorators off a member text.
fn strip_decorators(text: &str) -> (Vec<Decorator>, &str) {
    let mut decorators = Vec::new();
    let mut rest = text.trim_start();
    while let Some(after_at) = rest.strip_prefix('@') {
        let Some(m) = IDENT_RE.find(after_at) else { break };
        let name = m.as_str().to_string();
        let mut remaining = &after_at[m.end()..];
        let mut arguments = String::new();
        if remaining.starts_with('(') {
            let Some(len) = balanced(remaining, '(', ')') else { break };
            arguments = remaining[1..=len].trim().to_string();
            remaining = &remaining[len + 2..];
        }
        decorators.push(Decorator { name, arguments });
        rest = remaining.trim_start();
    }
    (decorators, rest)
}

fn parse_member(text: &str) -> Option<ClassMember> {
    let (decorators, mut rest) = strip_decorators(text);
    let mut modifiers = Modifiers::default();
    let mut accessor = None;
    while let Some(word) = IDENT_RE.find(rest).map(|m| m.as_str()) {
        let after = rest[word.len()..].trim_start();
        // A modifier keyword is only a modifier when another name follows it.
        let followed_by_name = after.starts_with(|c: char| c.is_alphabetic() || c == '_' || c == '$' || c == '#' || c == '[' || c == '*');
        match word {
            "public" if followed_by_name => modifiers.visibility = Visibility::Public,
            "private" if followed_by_name => modifiers.visibility = Visibility::Private,
            "protected" if followed_by_name => modifiers.visibility = Visibility::Protected,
            "static" if followed_by_name => modifiers.is_static = true,
            "readonly" if followed_by_name => modifiers.is_readonly = true,
            "async" if followed_by_name => modifiers.is_async = true,
            "get" if followed_by_name => accessor = Some(Accessor::Getter),
            "set" if followed_by_name => accessor = Some(Accessor::Setter),
            w if MODIFIERS.contains(&w) && followed_by_name => {}
            _ => break,
        }
        rest = after;
    }
    let rest = rest.trim_start_matches('*').trim_start();
    let name = IDENT_RE.find(rest)?.as_str();
    if let Some(stripped) = name.strip_prefix('#') {
        modifiers.visibility = Visibility::Private;
        let after = rest[name.len()..].trim_start();
        return Some(member_after_name(stripped, after, decorators, modifiers, accessor));
    }
    let after = rest[name.len()..].trim_start();
    Some(member_after_name(name, after, decorators, modifiers, accessor))
}

fn member_after_name(
    name: &str,
    after: &str,
    decorators: Vec<Decorator>,
    modifiers: Modifiers,
    accessor: Option<Accessor>,
) -> ClassMember {
    let after = after.trim_start_matches(['?', '!']).trim_start();
    let after = if after.starts_with('<') {
        balanced(after, '<', '>').map_or(after, |len| after[len + 2..].trim_start())
    } else {
        after
    };

    if after.starts_with('(') {
        let params_len = balanced(after, '(', ')').unwrap_or(after.len().saturating_sub(2));
        let params_text = after.get(1..=params_len).unwrap_or("");
        let tail = after.get(params_len + 2..).unwrap_or("").trim_start();
        let return_type = tail.strip_prefix(':').map(|t| {
            let end = t.find('{').unwrap_or(t.len());
            t[..end].trim().to_string()
        });
        return ClassMember::Method(MethodDecl {
            name: name.to_string(),
            decorators,
            modifiers,
            accessor,
            parameters: parse_params(params_text),
            return_type: return_type.filter(|t| !t.is_empty()),
        });
    }

    let (annotation_text, initializer) = match top_level_find(after, '=') {
        Some(eq) => (&after[..eq], Some(after[eq + 1..].trim().to_string())),
        None => (after, None),
    };
    let type_annotation = annotation_text
        .trim()
        .strip_prefix(':')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    ClassMember::Property(PropertyDecl {
        name: name.to_string(),
        decorators,
        modifiers,
        type_annotation,
        initializer,
    })
}

fn parse_params(text: &str) -> Vec<ParamDecl> {
    split_top_level(text, ',')
        .into_iter()
        .filter_map(|param| {
            let (_, mut rest) = strip_decorators(param.trim());
            while let Some(word) = IDENT_RE.find(rest).map(|m| m.as_str()) {
                let after = rest[word.len()..].trim_start();
                if MODIFIERS.contains(&word) && after.starts_with(|c: char| c.is_alphabetic() || c == '_') {
                    rest = after;
                } else {
                    break;
                }
            }
            let rest = rest.trim_start_matches("...");
            let name = IDENT_RE.find(rest)?.as_str();
            let mut after = rest[name.len()..].trim_start();
            let optional = after.starts_with('?');
            after = after.trim_start_matches('?').trim_start();
            let (annotation, default_value) = match top_level_find(after, '=') {
                Some(eq) => (&after[..eq], Some(after[eq + 1..].trim().to_string())),
                None => (after, None),
            };
            Some(ParamDecl {
                name: name.to_string(),
                type_annotation: annotation.trim().strip_prefix(':').map(|t| t.trim().to_string()),
                optional,
                default_value,
            })
        })
        .collect()
}

/// Splits on `sep` outside brackets, parens, braces, generics and strings.
pub(crate) fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    let mut prev = ' ';
    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if c == q && prev != '\\' {
                quote = None;
            }
            prev = c;
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            '>' if prev != '=' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
        prev = c;
    }
    if !text[start..].trim().is_empty() {
        parts.push(&text[start..]);
    }
    parts
}

/// Replaces comments with spaces, keeping newlines and string contents.
fn blank_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut quote: Option<char> = None;
    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match (c, chars.peek()) {
            ('\'' | '"' | '`', _) => {
                quote = Some(c);
                out.push(c);
            }
            ('/', Some('/')) => {
                out.push(' ');
                for inner in chars.by_ref() {
                    if inner == '\n' {
                        out.push('\n');
                        break;
                    }
                    out.push(' ');
                }
            }
            ('/', Some('*')) => {
                chars.next();
                out.push_str("  ");
                let mut prev = ' ';
                for inner in chars.by_ref() {
                    out.push(if inner == '\n' { '\n' } else { ' ' });
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

fn error_at(text: &str, offset: usize, message: &str) -> SourceError {
    SourceError { line: line_of(text, offset), message: message.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CARD: &str = r#"import { Component, EventEmitter, Input, Output, input, output, OnInit } from '@angular/core';
import { NgClass as Klass } from '@angular/common';
import * as utils from './utils';

// A card.
@Component({
  selector: 'app-card',
  standalone: true,
  templateUrl: './card.component.html',
  styleUrls: ['./card.component.scss', './theme.scss'],
})
export class CardComponent implements OnInit, OnDestroy {
  @Input() title: string = '';
  @Input({ required: true, transform: booleanAttribute }) disabled!: boolean;
  @Input('cardSize') size?: 'sm' | 'lg';
  label = input<string>('x');
  count = input.required<number>();
  @Output() closed = new EventEmitter<void>();
  selected = output<string>()
  private readonly store = inject(Store);

  constructor(private http: HttpClient) {}

  ngOnInit(): void {
    this.load({ a: 1 });
  }

  protected async load(options: { a: number }, retries = 3): Promise<void> {
    if (retries > 0) { return; }
  }

  static create(...args: unknown[]): CardComponent { return new CardComponent(null); }

  get isEmpty(): boolean { return !this.title; }

  ngOnDestroy() {}
}
"#;

    fn member<'a>(surface: &'a ClassSurface, name: &str) -> &'a ClassMember {
        surface
            .members
            .iter()
            .find(|m| match m {
                ClassMember::Property(p) => p.name == name,
                ClassMember::Method(mth) => mth.name == name,
            })
            .unwrap_or_else(|| panic!("member {name} not found"))
    }

    fn property<'a>(surface: &'a ClassSurface, name: &str) -> &'a PropertyDecl {
        match member(surface, name) {
            ClassMember::Property(p) => p,
            ClassMember::Method(_) => panic!("{name} is a method"),
        }
    }

    fn method<'a>(surface: &'a ClassSurface, name: &str) -> &'a MethodDecl {
        match member(surface, name) {
            ClassMember::Method(m) => m,
            ClassMember::Property(_) => panic!("{name} is a property"),
        }
    }

    #[test]
    fn reads_decorator_metadata() {
        let surface = parse_class_surface(CARD).unwrap();
        let decorator = surface.decorator.unwrap();

        assert_eq!(decorator.selector.as_deref(), Some("app-card"));
        assert_eq!(decorator.template_url.as_deref(), Some("./card.component.html"));
        assert_eq!(decorator.style_urls, vec!["./card.component.scss", "./theme.scss"]);
        assert!(decorator.template.is_none());
    }

    #[test]
    fn reads_class_header_and_imports() {
        let surface = parse_class_surface(CARD).unwrap();

        assert_eq!(surface.class_name.as_deref(), Some("CardComponent"));
        assert_eq!(surface.implements, vec!["OnInit", "OnDestroy"]);
        let names: Vec<&str> = surface.imports.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Component", "EventEmitter", "Input", "Output", "input", "output", "OnInit", "Klass", "utils"]
        );
        assert_eq!(surface.imports[7].path, "@angular/common");
    }

    #[test]
    fn splits_members_in_source_order() {
        let surface = parse_class_surface(CARD).unwrap();
        let names: Vec<&str> = surface
            .members
            .iter()
            .map(|m| match m {
                ClassMember::Property(p) => p.name.as_str(),
                ClassMember::Method(m) => m.name.as_str(),
            })
            .collect();
        assert_eq!(
            names,
            vec![
                "title", "disabled", "size", "label", "count", "closed", "selected", "store",
                "constructor", "ngOnInit", "load", "create", "isEmpty", "ngOnDestroy"
            ]
        );
    }

    #[test]
    fn reads_property_details() {
        let surface = parse_class_surface(CARD).unwrap();

        let disabled = property(&surface, "disabled");
        assert_eq!(disabled.decorators[0].name, "Input");
        assert_eq!(disabled.decorators[0].arguments, "{ required: true, transform: booleanAttribute }");
        assert_eq!(disabled.type_annotation.as_deref(), Some("boolean"));

        let size = property(&surface, "size");
        assert_eq!(size.type_annotation.as_deref(), Some("'sm' | 'lg'"));

        let count = property(&surface, "count");
        assert_eq!(count.initializer.as_deref(), Some("input.required<number>()"));

        let store = property(&surface, "store");
        assert_eq!(store.modifiers.visibility, Visibility::Private);
        assert!(store.modifiers.is_readonly);
    }

    #[test]
    fn reads_method_signatures() {
        let surface = parse_class_surface(CARD).unwrap();

        let load = method(&surface, "load");
        assert_eq!(load.modifiers.visibility, Visibility::Protected);
        assert!(load.modifiers.is_async);
        assert_eq!(load.return_type.as_deref(), Some("Promise<void>"));
        assert_eq!(load.parameters.len(), 2);
        assert_eq!(load.parameters[0].type_annotation.as_deref(), Some("{ a: number }"));
        assert_eq!(load.parameters[1].default_value.as_deref(), Some("3"));

        let create = method(&surface, "create");
        assert!(create.modifiers.is_static);
        assert_eq!(create.parameters[0].name, "args");

        assert_eq!(method(&surface, "isEmpty").accessor, Some(Accessor::Getter));
        assert_eq!(method(&surface, "ngOnDestroy").return_type, None);
    }

    #[test]
    fn inline_template_and_styles_record_their_lines() {
        let source = "@Component({\n  selector: 'x-inline',\n  template: `\n    <div class=\"a\"></div>\n  `,\n  styles: [`.a { color: red; }`]\n})\nexport class InlineComponent {}\n";
        let surface = parse_class_surface(source).unwrap();
        let decorator = surface.decorator.unwrap();

        assert!(decorator.template.as_deref().unwrap().contains("<div class=\"a\">"));
        assert_eq!(decorator.template_line, 3);
        assert_eq!(decorator.styles, vec![(".a { color: red; }".to_string(), 6)]);
    }

    #[test]
    fn unbalanced_class_body_is_an_error() {
        let err = parse_class_surface("export class Broken {\n  run() {\n").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn file_without_class_yields_empty_surface() {
        let surface = parse_class_surface("export const x = 1;").unwrap();
        assert!(surface.class_name.is_none());
        assert!(surface.members.is_empty());
    }
}
