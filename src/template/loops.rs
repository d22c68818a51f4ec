//! Collection loop expansion.
//!
//! ```text
//! <!-- monad:loop post in posts.items -->
//!   <a href="{{post.url}}">{{@index1}}. {{post.title}}</a>
//! <!-- monad:endloop -->
//! ```
//!
//! The path's first segment is either a variable bound by an enclosing loop
//! or a top-level collections key. Each item renders the body once with
//! `{{VAR}}`, `{{VAR.field}}`, `{{@index}}` (from 0) and `{{@index1}}` (from
//! 1) substituted. Tokens not scoped to a loop are kept for the final
//! interpolation pass; item values land in text nodes, which that pass
//! leaves alone.

use super::context::{lookup_path, lookup_segments, value_to_text};
use super::node::{self, Node};
use serde_json::Value;
use tracing::warn;

struct Binding<'a> {
    var: &'a str,
    item: &'a Value,
    index: usize,
}

pub fn not_a_list_marker(path: &str) -> String {
    format!("<!-- monad: loop path \"{path}\" is not a list -->")
}

/// Expand every loop block in `nodes` against `collections`.
pub fn expand_loops(nodes: &[Node], collections: &Value) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    render(nodes, collections, &mut Vec::new(), &mut out);
    out
}

fn render<'a>(
    nodes: &'a [Node],
    collections: &'a Value,
    scope: &mut Vec<Binding<'a>>,
    out: &mut Vec<Node>,
) {
    for node in nodes {
        match node {
            Node::Text(text) => node::push_text(out, text),
            Node::Token(expr) => match scoped_value(expr, scope) {
                Some(text) => node::push_text(out, &text),
                None => out.push(node.clone()),
            },
            Node::Loop { var, path, body } => {
                let Some(Value::Array(items)) = resolve(path, collections, scope) else {
                    warn!(path = %path, "loop path does not resolve to a list");
                    node::push_text(out, &not_a_list_marker(path));
                    continue;
                };
                for (index, item) in items.iter().enumerate() {
                    scope.push(Binding {
                        var: var.as_str(),
                        item,
                        index,
                    });
                    render(body, collections, scope, out);
                    scope.pop();
                }
            }
            Node::Placeholder(_) | Node::Include { .. } => out.push(node.clone()),
        }
    }
}

fn resolve<'a>(path: &str, collections: &'a Value, scope: &[Binding<'a>]) -> Option<&'a Value> {
    let root = node::path_root(path);
    match scope.iter().rev().find(|b| b.var == root) {
        Some(binding) => lookup_segments(binding.item, path.split('.').skip(1).map(str::trim)),
        None => lookup_path(collections, path),
    }
}

/// Text for a loop-scoped token; `None` when no enclosing loop owns it.
fn scoped_value(expr: &str, scope: &[Binding<'_>]) -> Option<String> {
    match (expr, scope.last()) {
        ("@index", Some(b)) => Some(b.index.to_string()),
        ("@index1", Some(b)) => Some((b.index + 1).to_string()),
        _ => {
            let root = node::path_root(expr);
            let binding = scope.iter().rev().find(|b| b.var == root)?;
            let segments = expr.split('.').skip(1).map(str::trim);
            Some(lookup_segments(binding.item, segments).map(value_to_text).unwrap_or_default())
        }
    }
}
