//! Template parser producing an element/block tree.
//!
//! Understands HTML elements and attributes (including Angular binding
//! syntax in attribute names) and the built-in control-flow blocks
//! (`@if`, `@for`, `@switch`, `@defer` and their branches). Text content,
//! interpolations and comments are skipped since the contract only records
//! structure.

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// One attribute as written, e.g. `[disabled]="busy"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateAttribute {
    /// Attribute name including any binding punctuation.
    pub name: String,
    /// Value without quotes; `None` for bare attributes.
    pub value: Option<String>,
}

/// An element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNode {
    /// Lower-cased tag name.
    pub name: String,
    /// Attributes in source order.
    pub attributes: Vec<TemplateAttribute>,
    /// Child elements and blocks.
    pub children: Vec<TemplateNode>,
    /// 1-based line of the start tag.
    pub line: usize,
}

impl ElementNode {
    /// Value of the first attribute called `name`, compared ASCII
    /// case-insensitively.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_deref().unwrap_or(""))
    }
}

/// A control-flow block such as `@if (cond) { ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockNode {
    /// Block keyword: `if`, `else if`, `else`, `for`, `empty`, `switch`,
    /// `case`, `default`, `defer`, `placeholder`, `loading` or `error`.
    pub name: String,
    /// Text between the block's parentheses, trimmed.
    pub parameters: String,
    /// Child elements and blocks.
    pub children: Vec<TemplateNode>,
    /// 1-based line of the `@` keyword.
    pub line: usize,
}

/// A node of the parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateNode {
    /// An HTML element.
    Element(ElementNode),
    /// A control-flow block.
    Block(BlockNode),
}

/// Syntax error with the 1-based line it was detected on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateError {
    /// Line of the offending construct.
    pub line: usize,
    /// Description of the problem.
    pub message: String,
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

enum Open {
    Element(ElementNode),
    Block(BlockNode),
}

/// Parses template text into its root nodes.
///
/// # Errors
///
/// Returns a [`TemplateError`] for unclosed elements or blocks, mismatched
/// closing tags and malformed start tags.
pub fn parse_template(input: &str) -> Result<Vec<TemplateNode>, TemplateError> {
    TemplateParser { src: input, pos: 0, stack: Vec::new(), roots: Vec::new() }.run()
}

struct TemplateParser<'a> {
    src: &'a str,
    pos: usize,
    stack: Vec<Open>,
    roots: Vec<TemplateNode>,
}

impl TemplateParser<'_> {
    fn run(mut self) -> Result<Vec<TemplateNode>, TemplateError> {
        while self.pos < self.src.len() {
            let rest = &self.src[self.pos..];
            if rest.starts_with("<!--") {
                self.skip_past("-->", "unterminated comment")?;
            } else if rest.starts_with("</") {
                self.close_element()?;
            } else if rest.starts_with('<') && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
                self.open_element()?;
            } else if rest.starts_with("{{") {
                self.skip_past("}}", "unterminated interpolation")?;
            } else if rest.starts_with('@') && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
                self.open_block();
            } else if rest.starts_with('}') && matches!(self.stack.last(), Some(Open::Block(_))) {
                self.pos += 1;
                if let Some(Open::Block(block)) = self.stack.pop() {
                    self.attach(TemplateNode::Block(block));
                }
            } else {
                self.pos += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
        match self.stack.pop() {
            None => Ok(self.roots),
            Some(Open::Element(el)) => Err(TemplateError {
                line: el.line,
                message: format!("unclosed element <{}>", el.name),
            }),
            Some(Open::Block(block)) => Err(TemplateError {
                line: block.line,
                message: format!("unclosed block @{}", block.name),
            }),
        }
    }

    fn attach(&mut self, node: TemplateNode) {
        match self.stack.last_mut() {
            Some(Open::Element(el)) => el.children.push(node),
            Some(Open::Block(block)) => block.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn open_element(&mut self) -> Result<(), TemplateError> {
        let line = self.line();
        self.pos += 1;
        let name = self.take_while(|c| !c.is_whitespace() && c != '>' && c != '/').to_ascii_lowercase();
        let mut attributes = Vec::new();
        loop {
            self.skip_whitespace();
            let rest = &self.src[self.pos..];
            if rest.is_empty() {
                return Err(TemplateError { line, message: format!("unterminated start tag <{name}>") });
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                self.attach(leaf(name, attributes, line));
                return Ok(());
            }
            if rest.starts_with('>') {
                self.pos += 1;
                if VOID_ELEMENTS.contains(&name.as_str()) {
                    self.attach(leaf(name, attributes, line));
                } else {
                    self.stack.push(Open::Element(ElementNode {
                        name,
                        attributes,
                        children: Vec::new(),
                        line,
                    }));
                }
                return Ok(());
            }
            attributes.push(self.attribute(line)?);
        }
    }

    fn attribute(&mut self, line: usize) -> Result<TemplateAttribute, TemplateError> {
        let name = self
            .take_while(|c| !c.is_whitespace() && c != '=' && c != '>' && c != '/')
            .to_string();
        if name.is_empty() {
            // A lone `/` that is not part of `/>`.
            self.pos += 1;
            return Ok(TemplateAttribute { name: "/".to_string(), value: None });
        }
        self.skip_whitespace();
        if !self.src[self.pos..].starts_with('=') {
            return Ok(TemplateAttribute { name, value: None });
        }
        self.pos += 1;
        self.skip_whitespace();
        let rest = &self.src[self.pos..];
        let value = match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let Some(end) = rest[1..].find(quote) else {
                    return Err(TemplateError {
                        line,
                        message: format!("unterminated value for attribute {name}"),
                    });
                };
                self.pos += end + 2;
                rest[1..=end].to_string()
            }
            _ => self.take_while(|c| !c.is_whitespace() && c != '>').to_string(),
        };
        Ok(TemplateAttribute { name, value: Some(value) })
    }

    fn close_element(&mut self) -> Result<(), TemplateError> {
        let line = self.line();
        self.pos += 2;
        let name = self.take_while(|c| c != '>').trim().to_ascii_lowercase();
        if self.pos >= self.src.len() {
            return Err(TemplateError { line, message: format!("unterminated end tag </{name}>") });
        }
        self.pos += 1;

        let matching = self.stack.iter().rposition(|open| match open {
            Open::Element(el) => el.name == name,
            Open::Block(_) => false,
        });
        let Some(index) = matching else {
            return Err(TemplateError { line, message: format!("unexpected end tag </{name}>") });
        };
        if self.stack[index + 1..].iter().any(|open| matches!(open, Open::Block(_))) {
            return Err(TemplateError {
                line,
                message: format!("end tag </{name}> closes an element outside its block"),
            });
        }
        // Elements left open inside the matched one are closed implicitly (`<li>`, `<p>`).
        while self.stack.len() > index {
            if let Some(Open::Element(el)) = self.stack.pop() {
                self.attach(TemplateNode::Element(el));
            }
        }
        Ok(())
    }

    fn open_block(&mut self) {
        let line = self.line();
        let start = self.pos;
        self.pos += 1;
        let mut name = self.take_while(|c| c.is_ascii_alphanumeric()).to_string();
        if name == "else" {
            let save = self.pos;
            self.skip_whitespace();
            if self.src[self.pos..].starts_with("if")
                && !self.src[self.pos + 2..].starts_with(|c: char| c.is_ascii_alphanumeric())
            {
                self.pos += 2;
                name = "else if".to_string();
            } else {
                self.pos = save;
            }
        }
        if name == "let" {
            // `@let x = expr;` declares a template variable, no structure.
            match self.src[self.pos..].find(';') {
                Some(end) => self.pos += end + 1,
                None => self.pos = self.src.len(),
            }
            return;
        }

        let save = self.pos;
        self.skip_whitespace();
        let mut parameters = String::new();
        if self.src[self.pos..].starts_with('(') {
            match balanced_parens(&self.src[self.pos..]) {
                Some(inner_len) => {
                    parameters = self.src[self.pos + 1..self.pos + 1 + inner_len].trim().to_string();
                    self.pos += inner_len + 2;
                    self.skip_whitespace();
                }
                None => {
                    self.pos = start + 1;
                    return;
                }
            }
        }
        if self.src[self.pos..].starts_with('{') {
            self.pos += 1;
            self.stack.push(Open::Block(BlockNode { name, parameters, children: Vec::new(), line }));
        } else {
            // Plain text such as an e-mail address.
            self.pos = save;
        }
    }

    fn skip_past(&mut self, terminator: &str, message: &str) -> Result<(), TemplateError> {
        let line = self.line();
        match self.src[self.pos..].find(terminator) {
            Some(offset) => {
                self.pos += offset + terminator.len();
                Ok(())
            }
            None => Err(TemplateError { line, message: message.to_string() }),
        }
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &str {
        let rest = &self.src[self.pos..];
        let len = rest.find(|c: char| !keep(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn line(&self) -> usize {
        self.src[..self.pos].bytes().filter(|&b| b == b'\n').count() + 1
    }
}

fn leaf(name: String, attributes: Vec<TemplateAttribute>, line: usize) -> TemplateNode {
    TemplateNode::Element(ElementNode { name, attributes, children: Vec::new(), line })
}

/// Length of the text inside the parenthesis group that `s` starts with,
/// skipping quoted strings.
fn balanced_parens(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i - 1);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn element(node: &TemplateNode) -> &ElementNode {
        match node {
            TemplateNode::Element(el) => el,
            TemplateNode::Block(b) => panic!("expected element, got block @{}", b.name),
        }
    }

    fn block(node: &TemplateNode) -> &BlockNode {
        match node {
            TemplateNode::Block(b) => b,
            TemplateNode::Element(el) => panic!("expected block, got <{}>", el.name),
        }
    }

    #[test]
    fn parses_nested_elements_and_attributes() {
        let nodes = parse_template(
            r#"<div id="root" class="card big">
  <button type=button [disabled]="busy" (click)="save()" hidden>Save</button>
</div>"#,
        )
        .unwrap();

        assert_eq!(nodes.len(), 1);
        let root = element(&nodes[0]);
        assert_eq!(root.name, "div");
        assert_eq!(root.attribute("class"), Some("card big"));
        let button = element(&root.children[0]);
        assert_eq!(button.line, 2);
        let names: Vec<&str> = button.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["type", "[disabled]", "(click)", "hidden"]);
        assert_eq!(button.attribute("type"), Some("button"));
        assert_eq!(button.attributes[3].value, None);
    }

    #[test]
    fn void_and_self_closing_elements_have_no_children() {
        let nodes = parse_template("<p><input name=q><br/><app-icon /></p>").unwrap();
        let p = element(&nodes[0]);
        let tags: Vec<&str> = p.children.iter().map(|n| element(n).name.as_str()).collect();
        assert_eq!(tags, vec!["input", "br", "app-icon"]);
    }

    #[test]
    fn control_flow_blocks_nest_their_content() {
        let nodes = parse_template(
            "@if (user(); as u) {\n  <span>{{ u.name }}</span>\n} @else if (loading) {\n  <i></i>\n} @else {\n  <em></em>\n}\n@for (item of items; track item.id) { <li></li> } @empty { <p></p> }",
        )
        .unwrap();

        let names: Vec<&str> = nodes.iter().map(|n| block(n).name.as_str()).collect();
        assert_eq!(names, vec!["if", "else if", "else", "for", "empty"]);
        assert_eq!(block(&nodes[0]).parameters, "user(); as u");
        assert_eq!(block(&nodes[3]).parameters, "item of items; track item.id");
        assert_eq!(element(&block(&nodes[0]).children[0]).name, "span");
    }

    #[test]
    fn switch_cases_are_children_of_the_switch() {
        let nodes =
            parse_template("@switch (mode) { @case ('a') { <b></b> } @default { <u></u> } }").unwrap();
        let switch = block(&nodes[0]);
        assert_eq!(switch.parameters, "mode");
        assert_eq!(block(&switch.children[0]).name, "case");
        assert_eq!(block(&switch.children[0]).parameters, "'a'");
        assert_eq!(block(&switch.children[1]).name, "default");
    }

    #[test]
    fn text_braces_comments_and_let_are_ignored() {
        let nodes = parse_template(
            "<!-- <div> -->\n@let total = a + b;\n<p>mail me@example.com {{ a > b ? '}' : '{' }}</p>",
        )
        .unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(element(&nodes[0]).name, "p");
        assert!(element(&nodes[0]).children.is_empty());
    }

    #[test]
    fn unclosed_element_reports_its_line() {
        let err = parse_template("<section>\n  <div>\n</section>\n<main>").unwrap_err();
        assert_eq!(err.line, 4);
        assert!(err.message.contains("<main>"));
    }

    #[test]
    fn end_tag_inside_block_must_not_close_outer_element() {
        let err = parse_template("<div>@if (x) {</div>}").unwrap_err();
        assert!(err.message.contains("outside its block"));
    }

    #[test]
    fn unexpected_end_tag_is_an_error() {
        let err = parse_template("<div></span></div>").unwrap_err();
        assert!(err.message.contains("</span>"));
    }
}
