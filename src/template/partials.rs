//! Fragment lookup and recursive inclusion.
//!
//! A reference such as `blog/card` names the file `blog/_card.html` under the
//! fragments directory: the last path segment gains a leading underscore and,
//! when it has no extension, `.html`. Lookup goes through [`FragmentSource`]
//! so renders can run against the filesystem or an in-memory set.
//!
//! Inclusion is depth-first. Each fragment is composed with a child context
//! whose `data` layer carries the inclusion's arguments, then interpolated in
//! that context before it is spliced back. A fragment that is already on the
//! current inclusion chain is not entered again; a diagnostic comment takes
//! its place.

use super::context::RenderContext;
use super::interpolate;
use super::node::{self, Node};
use crate::relaxed_json;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A fragment's text plus the key that identifies it on an inclusion chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub key: String,
    pub text: String,
}

pub trait FragmentSource {
    /// Look a reference up; `None` when no such fragment exists.
    fn read(&self, reference: &str) -> Option<Fragment>;
}

/// Map a reference onto its relative file path (`blog/card` → `blog/_card.html`).
pub fn fragment_rel_path(reference: &str) -> Option<PathBuf> {
    let segments: Vec<&str> = reference
        .trim()
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    let (last, dirs) = segments.split_last()?;
    if segments.contains(&"..") {
        return None;
    }
    let mut path: PathBuf = dirs.iter().collect();
    let file = last.strip_prefix('_').unwrap_or(last);
    if Path::new(file).extension().is_some() {
        path.push(format!("_{file}"));
    } else {
        path.push(format!("_{file}.html"));
    }
    Some(path)
}

/// Fragments read from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsFragments {
    root: PathBuf,
}

impl FsFragments {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FragmentSource for FsFragments {
    fn read(&self, reference: &str) -> Option<Fragment> {
        let path = self.root.join(fragment_rel_path(reference)?);
        match fs::read_to_string(&path) {
            Ok(text) => {
                let key = fs::canonicalize(&path).unwrap_or(path);
                Some(Fragment {
                    key: key.display().to_string(),
                    text,
                })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read fragment");
                None
            }
        }
    }
}

/// Fragments held in memory, keyed by their relative file path.
#[derive(Debug, Clone, Default)]
pub struct MemoryFragments {
    files: HashMap<PathBuf, String>,
}

impl MemoryFragments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `text` under a reference (`"blog/card"`).
    pub fn insert(&mut self, reference: &str, text: impl Into<String>) {
        if let Some(path) = fragment_rel_path(reference) {
            self.files.insert(path, text.into());
        }
    }

    pub fn with(mut self, reference: &str, text: impl Into<String>) -> Self {
        self.insert(reference, text);
        self
    }
}

impl FragmentSource for MemoryFragments {
    fn read(&self, reference: &str) -> Option<Fragment> {
        let path = fragment_rel_path(reference)?;
        self.files.get(&path).map(|text| Fragment {
            key: path.display().to_string(),
            text: text.clone(),
        })
    }
}

pub fn missing_marker(reference: &str) -> String {
    format!("<!-- monad: fragment \"{reference}\" not found -->")
}

pub fn cycle_marker(reference: &str) -> String {
    format!("<!-- monad: include cycle at \"{reference}\" -->")
}

/// Depth-first inclusion over a [`FragmentSource`].
pub struct Composer<'a> {
    source: &'a dyn FragmentSource,
}

impl<'a> Composer<'a> {
    pub fn new(source: &'a dyn FragmentSource) -> Self {
        Self { source }
    }

    /// Expand every inclusion in `text`. When `interpolate` is false the
    /// top-level tokens are left in place for a later pass; fragment bodies
    /// are always interpolated in their own context, and their values come
    /// back as text nodes.
    pub fn compose(&self, text: &str, ctx: &RenderContext, interpolate: bool) -> Vec<Node> {
        let mut out = Vec::new();
        let mut chain = Vec::new();
        let mut bound = Vec::new();
        self.render(
            &node::parse(text),
            ctx,
            interpolate,
            &mut chain,
            &mut bound,
            &mut out,
        );
        out
    }

    fn render(
        &self,
        nodes: &[Node],
        ctx: &RenderContext,
        interpolate: bool,
        chain: &mut Vec<String>,
        bound: &mut Vec<String>,
        out: &mut Vec<Node>,
    ) {
        for node in nodes {
            match node {
                Node::Text(text) => node::push_text(out, text),
                Node::Token(expr) if interpolate => match interpolate::resolve_token(expr, ctx, bound) {
                    Some(value) => node::push_text(out, &value),
                    None => out.push(node.clone()),
                },
                Node::Token(_) | Node::Placeholder(_) => out.push(node.clone()),
                Node::Include { reference, args } => {
                    self.include(reference, args.as_deref(), ctx, chain, bound, out);
                }
                Node::Loop { var, path, body } => {
                    let mut composed = Vec::new();
                    bound.push(var.clone());
                    self.render(body, ctx, interpolate, chain, bound, &mut composed);
                    bound.pop();
                    out.push(Node::Loop {
                        var: var.clone(),
                        path: path.clone(),
                        body: composed,
                    });
                }
            }
        }
    }

    fn include(
        &self,
        reference: &str,
        args: Option<&str>,
        ctx: &RenderContext,
        chain: &mut Vec<String>,
        bound: &mut Vec<String>,
        out: &mut Vec<Node>,
    ) {
        let Some(fragment) = self.source.read(reference) else {
            warn!(fragment = reference, "fragment not found");
            node::push_text(out, &missing_marker(reference));
            return;
        };
        if chain.contains(&fragment.key) {
            warn!(fragment = reference, chain = ?chain, "include cycle");
            node::push_text(out, &cycle_marker(reference));
            return;
        }

        let data = match args {
            None => serde_json::Map::new(),
            Some(args) => relaxed_json::parse_object(args).unwrap_or_else(|e| {
                warn!(fragment = reference, error = %e, "invalid inclusion arguments");
                serde_json::Map::new()
            }),
        };
        let child = ctx.with_data(data);

        debug!(fragment = reference, depth = chain.len() + 1, "including");
        chain.push(fragment.key);
        self.render(&node::parse(&fragment.text), &child, true, chain, bound, out);
        chain.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn ctx() -> RenderContext {
        RenderContext::new(
            Arc::new(json!({"title": "Site"})),
            json!({"title": "Home"}),
        )
    }

    fn compose(source: &dyn FragmentSource, text: &str) -> String {
        node::to_source(&Composer::new(source).compose(text, &ctx(), true))
    }

    #[test]
    fn reference_to_path() {
        assert_eq!(fragment_rel_path("header"), Some(PathBuf::from("_header.html")));
        assert_eq!(
            fragment_rel_path("blog/card"),
            Some(PathBuf::from("blog/_card.html"))
        );
        assert_eq!(
            fragment_rel_path("layouts/_wide.htm"),
            Some(PathBuf::from("layouts/_wide.htm"))
        );
        assert_eq!(fragment_rel_path("../secret"), None);
        assert_eq!(fragment_rel_path(""), None);
    }

    #[test]
    fn includes_with_arguments() {
        let source = MemoryFragments::new()
            .with("card", "<h2>{{data.title}}</h2><small>{{page.title}}</small>");
        let out = compose(&source, r#"<% card, { title: "Hello" } %>"#);
        assert_eq!(out, "<h2>Hello</h2><small>Home</small>");
    }

    #[test]
    fn nested_arguments_merge_over_parent() {
        let source = MemoryFragments::new()
            .with("outer", r#"<% inner, { b: "B2" } %>"#)
            .with("inner", "{{data.a}}-{{data.b}}");
        let out = compose(&source, r#"<% outer, { a: "A", b: "B1" } %>"#);
        assert_eq!(out, "A-B2");
    }

    #[test]
    fn missing_fragment_leaves_marker() {
        let out = compose(&MemoryFragments::new(), "<p><% nowhere %></p>");
        assert_eq!(out, format!("<p>{}</p>", missing_marker("nowhere")));
    }

    #[test]
    fn self_inclusion_terminates() {
        let source = MemoryFragments::new().with("loop", "x<% loop %>y");
        let out = compose(&source, "<% loop %>");
        assert_eq!(out, format!("x{}y", cycle_marker("loop")));
    }

    #[test]
    fn mutual_inclusion_terminates() {
        let source = MemoryFragments::new()
            .with("a", "[a<% b %>]")
            .with("b", "[b<% a %>]");
        let out = compose(&source, "<% a %>");
        assert_eq!(out, format!("[a[b{}]]", cycle_marker("a")));
    }

    #[test]
    fn repeated_sibling_inclusion_is_not_a_cycle() {
        let source = MemoryFragments::new().with("dot", ".");
        assert_eq!(compose(&source, "<% dot %><% dot %>"), "..");
    }

    #[test]
    fn invalid_arguments_become_empty_data() {
        let source = MemoryFragments::new().with("card", "[{{data.title}}]");
        assert_eq!(compose(&source, "<% card, { title: %>"), "[]");
    }

    #[test]
    fn deferred_top_level_keeps_tokens() {
        let source = MemoryFragments::new().with("t", "{{page.title}}");
        let out = Composer::new(&source).compose("<% t %> {{page.title}}", &ctx(), false);
        assert_eq!(
            out,
            vec![Node::Text("Home ".into()), Node::Token("page.title".into())]
        );
    }

    #[test]
    fn loop_variables_survive_inside_fragments() {
        let source = MemoryFragments::new().with("card", "<b>{{p.title}}</b>{{data.x}}");
        let out = compose(
            &source,
            r#"<!-- monad:loop p in posts --><% card, { x: 1 } %><!-- monad:endloop -->"#,
        );
        assert_eq!(
            out,
            "<!-- monad:loop p in posts --><b>{{p.title}}</b>1<!-- monad:endloop -->"
        );
    }

    #[test]
    fn empty_arguments_equal_inlining() {
        let card = r#"<div class="card"><% badge, { label: "new" } %>{{page.title}}{{data.x}}</div>"#;
        let source = MemoryFragments::new()
            .with("card", card)
            .with("badge", "<b>{{data.label}}</b>");
        let included = compose(&source, "<p><% card, {} %></p>");
        assert_eq!(compose(&source, "<p><% card %></p>"), included);
        assert_eq!(compose(&source, &format!("<p>{card}</p>")), included);
        assert_eq!(included, r#"<p><div class="card"><b>new</b>Home</div></p>"#);
    }

    #[test]
    fn argument_values_are_not_resolved_again() {
        let source = MemoryFragments::new().with("code", "<code>{{data.snippet}}</code>");
        let nodes = Composer::new(&source).compose(
            r#"<% code, { snippet: "{{page.title}}" } %>"#,
            &ctx(),
            false,
        );
        assert_eq!(
            nodes,
            vec![Node::Text("<code>{{page.title}}</code>".into())]
        );
    }

    #[test]
    fn reads_fragments_from_disk() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("blog")).unwrap();
        fs::write(tmp.path().join("blog/_card.html"), "<article>{{data.t}}</article>").unwrap();
        fs::write(tmp.path().join("_self.html"), "<% self %>").unwrap();

        let source = FsFragments::new(tmp.path());
        assert_eq!(
            compose(&source, "<% 'blog/card', {t: 'x'} %>"),
            "<article>x</article>"
        );
        assert_eq!(compose(&source, "<% self %>"), cycle_marker("self"));
        assert!(source.read("nope").is_none());
    }
}
