//! Template text as a node tree.
//!
//! Templates are parsed once into a flat list of nodes, with loop blocks
//! nesting their bodies. Every later step (inclusion, interpolation, loop
//! expansion, slot filling) walks this tree instead of rewriting strings, so
//! the order in which markers are handled is decided by the walker and not by
//! the order regexes happen to run in.
//!
//! | Syntax | Node |
//! |--------|------|
//! | `<% ref, {..} %>` | [`Node::Include`] |
//! | `{{ path }}` | [`Node::Token`] |
//! | `{{slot:NAME}}` | [`Node::Placeholder`] |
//! | `<!-- monad:loop v in path -->` … `<!-- monad:endloop -->` | [`Node::Loop`] |
//!
//! Anything malformed (an unclosed `{{`, a loop header without `in`) is kept
//! as literal text.
//!
//! The tree is parsed from template text once. Values substituted by a later
//! step are pushed as [`Node::Text`] and never parsed again, so a value that
//! happens to contain `{{ .. }}` or `<% .. %>` comes out as written.

pub const INCLUDE_OPEN: &str = "<%";
pub const INCLUDE_CLOSE: &str = "%>";
pub const TOKEN_OPEN: &str = "{{";
pub const TOKEN_CLOSE: &str = "}}";
pub const LOOP_OPEN: &str = "<!-- monad:loop";
pub const LOOP_CLOSE: &str = "<!-- monad:endloop -->";
const COMMENT_CLOSE: &str = "-->";
pub const SLOT_PREFIX: &str = "slot:";

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    /// Dotted lookup path, trimmed.
    Token(String),
    /// Layout insertion point.
    Placeholder(String),
    Include {
        reference: String,
        args: Option<String>,
    },
    Loop {
        var: String,
        path: String,
        body: Vec<Node>,
    },
}

impl Node {
    /// Write this node back in template syntax.
    pub fn write_source(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Token(expr) => write_token(expr, out),
            Node::Placeholder(name) => {
                out.push_str(TOKEN_OPEN);
                out.push_str(SLOT_PREFIX);
                out.push_str(name);
                out.push_str(TOKEN_CLOSE);
            }
            Node::Include { reference, args } => {
                out.push_str(INCLUDE_OPEN);
                out.push(' ');
                out.push_str(reference);
                if let Some(args) = args {
                    out.push_str(", ");
                    out.push_str(args);
                }
                out.push(' ');
                out.push_str(INCLUDE_CLOSE);
            }
            Node::Loop { var, path, body } => {
                write_loop_open(var, path, out);
                for node in body {
                    node.write_source(out);
                }
                out.push_str(LOOP_CLOSE);
            }
        }
    }
}

pub fn write_token(expr: &str, out: &mut String) {
    out.push_str(TOKEN_OPEN);
    out.push_str(expr);
    out.push_str(TOKEN_CLOSE);
}

pub fn write_loop_open(var: &str, path: &str, out: &mut String) {
    out.push_str(LOOP_OPEN);
    out.push(' ');
    out.push_str(var);
    out.push_str(" in ");
    out.push_str(path);
    out.push_str(" -->");
}

/// Append literal text, merging it into a trailing text node.
pub fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    match nodes.last_mut() {
        Some(Node::Text(last)) => last.push_str(text),
        _ => nodes.push(Node::Text(text.to_string())),
    }
}

/// Serialize nodes back to template text.
pub fn to_source(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.write_source(&mut out);
    }
    out
}

/// First segment of a dotted path (`p` for `p.title`).
pub fn path_root(expr: &str) -> &str {
    expr.split('.').next().unwrap_or(expr).trim()
}

/// Parse template text into nodes.
pub fn parse(text: &str) -> Vec<Node> {
    let mut parser = Parser { text, pos: 0 };
    parser.parse_block(false).0
}

#[derive(Clone, Copy)]
enum Marker {
    Include,
    Token,
    LoopOpen,
    LoopClose,
}

fn next_marker(rest: &str) -> Option<(usize, Marker)> {
    [
        (INCLUDE_OPEN, Marker::Include),
        (TOKEN_OPEN, Marker::Token),
        (LOOP_OPEN, Marker::LoopOpen),
        (LOOP_CLOSE, Marker::LoopClose),
    ]
    .into_iter()
    .filter_map(|(pattern, marker)| rest.find(pattern).map(|at| (at, marker)))
    .min_by_key(|(at, _)| *at)
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl Parser<'_> {
    /// Parse until end of input or, inside a loop, the matching close marker.
    /// Returns the nodes and whether a close marker ended the block.
    fn parse_block(&mut self, in_loop: bool) -> (Vec<Node>, bool) {
        let mut nodes = Vec::new();
        let mut text = String::new();

        while self.pos < self.text.len() {
            let rest = &self.text[self.pos..];
            let Some((offset, marker)) = next_marker(rest) else {
                text.push_str(rest);
                self.pos = self.text.len();
                break;
            };
            text.push_str(&rest[..offset]);
            self.pos += offset;
            let rest = &self.text[self.pos..];

            match marker {
                Marker::LoopClose => {
                    self.pos += LOOP_CLOSE.len();
                    if in_loop {
                        flush_text(&mut text, &mut nodes);
                        return (nodes, true);
                    }
                    text.push_str(LOOP_CLOSE);
                }
                Marker::LoopOpen => match parse_loop_header(rest) {
                    Some((var, path, header_len)) => {
                        let body_start = self.pos + header_len;
                        self.pos = body_start;
                        let (body, closed) = self.parse_block(true);
                        if closed {
                            flush_text(&mut text, &mut nodes);
                            nodes.push(Node::Loop { var, path, body });
                        } else {
                            // Unterminated: the header is plain text and the
                            // body is parsed again at this level.
                            text.push_str(&rest[..header_len]);
                            self.pos = body_start;
                        }
                    }
                    None => {
                        text.push_str(LOOP_OPEN);
                        self.pos += LOOP_OPEN.len();
                    }
                },
                Marker::Include => {
                    let inner_start = INCLUDE_OPEN.len();
                    match rest[inner_start..].find(INCLUDE_CLOSE) {
                        Some(len) => {
                            let inner = &rest[inner_start..inner_start + len];
                            flush_text(&mut text, &mut nodes);
                            nodes.push(parse_include(inner));
                            self.pos += inner_start + len + INCLUDE_CLOSE.len();
                        }
                        None => {
                            text.push_str(INCLUDE_OPEN);
                            self.pos += INCLUDE_OPEN.len();
                        }
                    }
                }
                Marker::Token => {
                    let inner_start = TOKEN_OPEN.len();
                    let inner = rest[inner_start..]
                        .find(TOKEN_CLOSE)
                        .map(|len| &rest[inner_start..inner_start + len]);
                    match inner.map(|i| (i, i.trim())) {
                        Some((raw, expr)) if !expr.is_empty() && !expr.contains(TOKEN_OPEN) => {
                            flush_text(&mut text, &mut nodes);
                            nodes.push(match expr.strip_prefix(SLOT_PREFIX) {
                                Some(name) => Node::Placeholder(name.trim().to_string()),
                                None => Node::Token(expr.to_string()),
                            });
                            self.pos += inner_start + raw.len() + TOKEN_CLOSE.len();
                        }
                        _ => {
                            text.push_str(TOKEN_OPEN);
                            self.pos += TOKEN_OPEN.len();
                        }
                    }
                }
            }
        }

        flush_text(&mut text, &mut nodes);
        (nodes, false)
    }
}

fn flush_text(text: &mut String, nodes: &mut Vec<Node>) {
    if !text.is_empty() {
        nodes.push(Node::Text(std::mem::take(text)));
    }
}

/// Parse `<!-- monad:loop VAR in PATH -->` at the start of `rest`.
/// Returns `(var, path, header_len)`.
fn parse_loop_header(rest: &str) -> Option<(String, String, usize)> {
    let after_open = &rest[LOOP_OPEN.len()..];
    if !after_open.starts_with(char::is_whitespace) {
        return None;
    }
    let close = after_open.find(COMMENT_CLOSE)?;
    let parts: Vec<&str> = after_open[..close].split_whitespace().collect();
    match parts.as_slice() {
        [var, "in", path] if is_identifier(var) => Some((
            var.to_string(),
            path.to_string(),
            LOOP_OPEN.len() + close + COMMENT_CLOSE.len(),
        )),
        _ => None,
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

/// Split `ref, {args}` into its parts.
fn parse_include(inner: &str) -> Node {
    let inner = inner.trim();
    let (reference, args) = match inner.split_once(',') {
        Some((reference, args)) => {
            let args = args.trim();
            (reference, (!args.is_empty()).then(|| args.to_string()))
        }
        None => (inner, None),
    };
    Node::Include {
        reference: unquote(reference.trim()).to_string(),
        args,
    }
}

fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}
