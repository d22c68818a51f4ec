//! `{{ path }}` substitution.

use super::context::RenderContext;
use super::node::{self, Node};

/// Whether a token must be left for loop expansion: any path rooted at a
/// variable bound by an enclosing loop block, and the `@index` names inside
/// one. Outside every loop `@index` is an ordinary miss.
fn is_loop_scoped(expr: &str, bound: &[String]) -> bool {
    let root = node::path_root(expr);
    (root.starts_with('@') && !bound.is_empty()) || bound.iter().any(|var| var == root)
}

/// The text for `expr`, or `None` when it belongs to a loop variable in
/// `bound` and must stay a token.
pub(crate) fn resolve_token(expr: &str, ctx: &RenderContext, bound: &[String]) -> Option<String> {
    if is_loop_scoped(expr, bound) {
        None
    } else {
        Some(ctx.lookup_text(expr))
    }
}

/// Replace every token in `nodes` with its value from `ctx` and serialize.
///
/// Text nodes are written as they are, so values substituted by earlier
/// passes are not resolved twice. Loop blocks that survive to this point
/// (collections disabled) keep their markers and item-scoped tokens.
pub fn interpolate(nodes: &[Node], ctx: &RenderContext) -> String {
    let mut out = String::new();
    render_nodes(nodes, ctx, &mut Vec::new(), &mut out);
    out
}

fn render_nodes(nodes: &[Node], ctx: &RenderContext, bound: &mut Vec<String>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Token(expr) => match resolve_token(expr, ctx, bound) {
                Some(value) => out.push_str(&value),
                None => node.write_source(out),
            },
            Node::Placeholder(_) | Node::Include { .. } => node.write_source(out),
            Node::Loop { var, path, body } => {
                node::write_loop_open(var, path, out);
                bound.push(var.clone());
                render_nodes(body, ctx, bound, out);
                bound.pop();
                out.push_str(node::LOOP_CLOSE);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn ctx() -> RenderContext {
        RenderContext::new(
            Arc::new(json!({"title": "Site", "year": 2024, "draft": false})),
            json!({"title": "About", "tags": ["a"]}),
        )
    }

    fn interp(text: &str, ctx: &RenderContext) -> String {
        interpolate(&node::parse(text), ctx)
    }

    #[test]
    fn substitutes_values() {
        let out = interp(
            "<title>{{ page.title }} | {{site.title}}</title>{{site.year}}{{site.draft}}",
            &ctx(),
        );
        assert_eq!(out, "<title>About | Site</title>2024false");
    }

    #[test]
    fn misses_become_empty() {
        assert_eq!(interp("[{{ page.nope }}]", &ctx()), "[]");
    }

    #[test]
    fn index_outside_a_loop_is_a_miss() {
        assert_eq!(interp("[{{@index}}|{{ @index1 }}]", &ctx()), "[|]");
    }

    #[test]
    fn containers_become_json() {
        assert_eq!(interp("{{page.tags}}", &ctx()), r#"["a"]"#);
    }

    #[test]
    fn values_are_inserted_once() {
        let ctx = RenderContext::new(Arc::new(json!({"t": "{{site.t}}"})), json!({}));
        assert_eq!(interp("{{site.t}}", &ctx), "{{site.t}}");
    }

    #[test]
    fn text_nodes_are_not_parsed_again() {
        let nodes = vec![
            Node::Text("{{page.title}}".into()),
            Node::Token("page.title".into()),
        ];
        assert_eq!(interpolate(&nodes, &ctx()), "{{page.title}}About");
    }

    #[test]
    fn loop_tokens_survive() {
        let src = "<!-- monad:loop p in posts.items -->{{p.title}} {{@index}} {{site.title}}<!-- monad:endloop -->";
        let out = interp(src, &ctx());
        assert_eq!(
            out,
            "<!-- monad:loop p in posts.items -->{{p.title}} {{@index}} Site<!-- monad:endloop -->"
        );
    }

    #[test]
    fn placeholders_and_includes_untouched() {
        assert_eq!(
            interp("{{slot:main}}<% nav %>", &ctx()),
            "{{slot:main}}<% nav %>"
        );
    }
}
