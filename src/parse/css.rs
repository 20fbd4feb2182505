//! Stylesheet parser producing the rule list the style collectors consume.
//!
//! Handles plain CSS plus the SCSS shapes component stylesheets commonly use:
//! nested rules (`&` or descendant nesting), line comments, variables and
//! `@use`/`@include` statements. Conditional at-rules (`@media`, `@supports`,
//! `@container`, `@layer`) contribute their rules with the at-rule prelude as
//! context; other block at-rules (`@keyframes`, `@font-face`, ...) are skipped.

/// A single declaration: `color: red`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Property name, lower-cased unless it is a custom property.
    pub name: String,
    /// Value text, trimmed.
    pub value: String,
}

/// One style rule after nesting has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    /// Individual selectors of the selector list, whitespace-normalized.
    pub selectors: Vec<String>,
    /// Enclosing conditional at-rule preludes, outermost first.
    pub context: Vec<String>,
    /// Declarations in source order.
    pub declarations: Vec<Declaration>,
    /// 1-based line of the rule's opening brace.
    pub line: usize,
}

impl CssRule {
    /// Selector text as written in the contract: the selector list joined
    /// with `, `, prefixed by any at-rule context.
    #[must_use]
    pub fn key(&self) -> String {
        let selector = self.selectors.join(", ");
        if self.context.is_empty() {
            selector
        } else {
            format!("{} {selector}", self.context.join(" "))
        }
    }
}

/// A parsed stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    /// Rules in source order (a parent rule precedes its nested rules).
    pub rules: Vec<CssRule>,
}

/// Syntax error with the 1-based line it was detected on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssError {
    /// Line of the offending construct.
    pub line: usize,
    /// Description of the problem.
    pub message: String,
}

impl std::fmt::Display for CssError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

const CONDITIONAL_AT_RULES: [&str; 5] = ["@media", "@supports", "@container", "@layer", "@document"];

/// Parses stylesheet text.
///
/// # Errors
///
/// Returns a [`CssError`] for unbalanced braces or unterminated strings.
pub fn parse_stylesheet(input: &str) -> Result<Stylesheet, CssError> {
    let source = strip_comments(input);
    let mut parser = Parser { src: &source, pos: 0 };
    let mut rules = Vec::new();
    parser.parse_block(&[], &[], &mut rules, None)?;
    Ok(Stylesheet { rules })
}

fn parse_declaration(text: &str) -> Option<Declaration> {
    let text = text.trim();
    if text.starts_with('@') || text.starts_with('$') {
        return None;
    }
    let (name, value) = text.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let name = if name.starts_with("--") { name.to_string() } else { name.to_ascii_lowercase() };
    Some(Declaration { name, value: value.trim().to_string() })
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

/// What ended a scanned chunk of text.
enum Stop {
    Open,
    Semicolon,
    Close,
    Eof,
}

impl<'a> Parser<'a> {
    /// Parses statements until the matching `}` (when `open_line` is set) or
    /// end of input, returning the declarations found at this level.
    fn parse_block(
        &mut self,
        parents: &[String],
        context: &[String],
        out: &mut Vec<CssRule>,
        open_line: Option<usize>,
    ) -> Result<Vec<Declaration>, CssError> {
        let src: &'a str = self.src;
        let mut declarations = Vec::new();
        loop {
            let start = self.pos;
            let stop = self.scan()?;
            let text = src[start..self.pos].trim();
            match stop {
                Stop::Semicolon => {
                    self.pos += 1;
                    if open_line.is_some() {
                        declarations.extend(parse_declaration(text));
                    }
                }
                Stop::Close => {
                    if open_line.is_none() {
                        return Err(self.error("unexpected '}'"));
                    }
                    self.pos += 1;
                    declarations.extend(parse_declaration(text));
                    return Ok(declarations);
                }
                Stop::Eof => {
                    return match open_line {
                        Some(line) => {
                            Err(CssError { line, message: "unclosed block".to_string() })
                        }
                        None => Ok(declarations),
                    };
                }
                Stop::Open => {
                    let line = self.line_at(self.pos);
                    self.pos += 1;
                    self.parse_nested(text, line, parents, context, out)?;
                }
            }
        }
    }

    fn parse_nested(
        &mut self,
        prelude: &str,
        line: usize,
        parents: &[String],
        context: &[String],
        out: &mut Vec<CssRule>,
    ) -> Result<(), CssError> {
        let prelude = normalize_whitespace(prelude);
        if prelude.starts_with('@') {
            let is_conditional = CONDITIONAL_AT_RULES
                .iter()
                .any(|at| {
                    prelude == *at
                        || prelude.starts_with(&format!("{at} "))
                        || prelude.starts_with(&format!("{at}("))
                });
            if !is_conditional {
                // @keyframes, @font-face, @mixin, ... carry no DOM selectors.
                return self.skip_block(line);
            }
            let mut inner_context = context.to_vec();
            inner_context.push(prelude);
            let slot = out.len();
            let declarations = self.parse_block(parents, &inner_context, out, Some(line))?;
            if !declarations.is_empty() && !parents.is_empty() {
                out.insert(
                    slot,
                    CssRule {
                        selectors: parents.to_vec(),
                        context: inner_context,
                        declarations,
                        line,
                    },
                );
            }
            return Ok(());
        }

        let selectors = resolve_selectors(parents, &prelude);
        let slot = out.len();
        let declarations = self.parse_block(&selectors, context, out, Some(line))?;
        let has_nested = out.len() > slot;
        if !declarations.is_empty() || !has_nested {
            out.insert(slot, CssRule { selectors, context: context.to_vec(), declarations, line });
        }
        Ok(())
    }

    fn skip_block(&mut self, line: usize) -> Result<(), CssError> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.scan()? {
                Stop::Open => depth += 1,
                Stop::Close => depth -= 1,
                Stop::Semicolon => {}
                Stop::Eof => {
                    return Err(CssError { line, message: "unclosed block".to_string() })
                }
            }
            self.pos += 1;
        }
        Ok(())
    }

    /// Advances to the next `{`, `;` or `}` outside strings and parentheses.
    fn scan(&mut self) -> Result<Stop, CssError> {
        let bytes = self.src.as_bytes();
        let mut parens = 0usize;
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                quote @ (b'"' | b'\'') => self.skip_string(quote)?,
                b'(' => parens += 1,
                b')' => parens = parens.saturating_sub(1),
                b'{' if parens == 0 => {
                    // SCSS interpolation `#{...}` stays part of the text.
                    if self.pos > 0 && bytes[self.pos - 1] == b'#' {
                        self.skip_interpolation()?;
                        continue;
                    }
                    return Ok(Stop::Open);
                }
                b';' if parens == 0 => return Ok(Stop::Semicolon),
                b'}' if parens == 0 => return Ok(Stop::Close),
                _ => {}
            }
            self.pos += 1;
        }
        Ok(Stop::Eof)
    }

    fn skip_string(&mut self, quote: u8) -> Result<(), CssError> {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        self.pos += 1;
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\\' => self.pos += 1,
                b if b == quote => return Ok(()),
                b'\n' => break,
                _ => {}
            }
            self.pos += 1;
        }
        Err(CssError { line: self.line_at(start), message: "unterminated string".to_string() })
    }

    fn skip_interpolation(&mut self) -> Result<(), CssError> {
        let start = self.pos;
        match self.src[self.pos..].find('}') {
            Some(offset) => {
                self.pos += offset + 1;
                Ok(())
            }
            None => Err(CssError {
                line: self.line_at(start),
                message: "unterminated interpolation".to_string(),
            }),
        }
    }

    fn line_at(&self, pos: usize) -> usize {
        self.src[..pos].bytes().filter(|&b| b == b'\n').count() + 1
    }

    fn error(&self, message: &str) -> CssError {
        CssError { line: self.line_at(self.pos), message: message.to_string() }
    }
}

/// Combines a nested selector list with its parents.
///
/// `&` is replaced by the parent selector; otherwise the child is treated
/// as a descendant of each parent.
fn resolve_selectors(parents: &[String], prelude: &str) -> Vec<String> {
    let children: Vec<String> = split_selector_list(prelude);
    if parents.is_empty() {
        return children;
    }
    let mut resolved = Vec::with_capacity(parents.len() * children.len());
    for parent in parents {
        for child in &children {
            if child.contains('&') {
                resolved.push(child.replace('&', parent));
            } else {
                resolved.push(format!("{parent} {child}"));
            }
        }
    }
    resolved
}

/// Splits `a, b:is(c, d)` on top-level commas.
fn split_selector_list(list: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in list.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(normalize_whitespace(&current));
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    parts.push(normalize_whitespace(&current));
    parts.retain(|p| !p.is_empty());
    parts
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Blanks out `/* */` and `//` comments, keeping newlines so line numbers
/// stay accurate.
fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut quote: Option<char> = None;
    let mut parens = 0usize;
    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else if c == q || c == '\n' {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                out.push(c);
            }
            '/' if chars.peek() == Some(&'*') => {
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
            // `//` inside `url(...)` or after a scheme colon is not a comment.
            '/' if chars.peek() == Some(&'/') && parens == 0 && !out.ends_with(':') => {
                for inner in chars.by_ref() {
                    if inner == '\n' {
                        out.push('\n');
                        break;
                    }
                    out.push(' ');
                }
            }
            _ => {
                match c {
                    '(' => parens += 1,
                    ')' => parens = parens.saturating_sub(1),
                    _ => {}
                }
                out.push(c);
            }
        }
    }
    out
}
