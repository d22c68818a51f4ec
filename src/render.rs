//! The per-page render pipeline.
//!
//! ```text
//! source ─ parse_page ─▶ (meta, body) ─ extract_slots ─▶ slots
//!                                                          │ compose (deferred)
//! layouts/NAME ─ compose (deferred) ─▶ layout nodes ◀─ fill_placeholders
//!                                         │
//!                          expand_loops (collections on)
//!                                         │
//!                                    interpolate
//!                                         │
//!                        inject_assets ─ minify (optional) ─▶ RenderResult
//! ```
//!
//! Everything between parsing and interpolation works on the node tree, so
//! tokens left at the top level are resolved in one final pass that reaches
//! slots and layout alike, and values substituted earlier (fragment data,
//! collection items) are never resolved twice.

use crate::assets::{self, AssetTags};
use crate::audit::Warning;
use crate::audit::dom::Document;
use crate::config::SiteConfig;
use crate::frontmatter::{self, Meta};
use crate::routes::Route;
use crate::scan::PageSource;
use crate::template::{
    self, ComposeOptions, FragmentSource, Node, RenderContext, SlotNodes, expand_loops,
    extract_slots, fill_placeholders, interpolate,
};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Serialize;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// One rendered page. `warnings` stays empty until the audit pass.
#[derive(Debug, Clone, Serialize)]
pub struct RenderResult {
    pub route: Route,
    /// Source path relative to the pages directory.
    pub source: PathBuf,
    pub html: String,
    pub warnings: Vec<Warning>,
    pub meta: Meta,
}

/// Shared state for rendering every page of one build.
pub struct SiteRenderer<'a> {
    config: &'a SiteConfig,
    fragments: &'a dyn FragmentSource,
    site: Arc<Value>,
    collections: Option<Arc<Value>>,
    assets: AssetTags,
}

impl<'a> SiteRenderer<'a> {
    pub fn new(config: &'a SiteConfig, fragments: &'a dyn FragmentSource) -> Self {
        Self {
            config,
            fragments,
            site: Arc::new(Value::Object(config.site.clone())),
            collections: None,
            assets: AssetTags::default(),
        }
    }

    pub fn with_collections(mut self, collections: Option<Arc<Value>>) -> Self {
        self.collections = collections;
        self
    }

    pub fn with_assets(mut self, assets: AssetTags) -> Self {
        self.assets = assets;
        self
    }

    fn site_str(&self, key: &str) -> Option<&str> {
        self.site.get(key).and_then(Value::as_str)
    }

    /// Render `source` at `route`. Never fails: page-local problems degrade
    /// to diagnostics in the output and `tracing` events.
    pub fn render_page(&self, source: &PageSource, route: &Route) -> RenderResult {
        let (mut meta, body) = frontmatter::parse_page(&source.text, source.format, &self.config.markdown);
        let slots = extract_slots(&body);
        let main_text = slots.get(template::slots::MAIN).unwrap_or_default();
        let layout_name = meta
            .layout
            .clone()
            .unwrap_or_else(|| self.config.templates.default_layout.clone());

        if meta.description.is_none() {
            meta.description = self.site_str("description").map(str::to_string);
        }
        let mut ctx = self.context(&meta, source, route, &layout_name);
        let mut main = self.compose(main_text, &ctx);

        // The default title is the first <h1> of the rendered main slot. Once
        // known, main is composed again so fragments see the final page.title.
        if meta.title.is_none() {
            let rendered = self.finish(&main, &ctx);
            meta.title = first_h1_text(&rendered).or_else(|| self.site_str("title").map(str::to_string));
            ctx = self.context(&meta, source, route, &layout_name);
            main = self.compose(main_text, &ctx);
        }

        let mut composed = SlotNodes::new();
        for (name, content) in slots.iter() {
            if name != template::slots::MAIN {
                composed.insert(name.to_string(), self.compose(content, &ctx));
            }
        }
        composed.insert(template::slots::MAIN.to_string(), main);

        let head_extra = self.head_extras(&meta, route);
        if !head_extra.is_empty() {
            let mut head = self.compose(&head_extra, &ctx);
            head.extend(composed.remove("head").unwrap_or_default());
            composed.insert("head".to_string(), head);
        }

        let layout = self.compose(&self.layout_text(&layout_name), &ctx);
        let mut html = self.finish(&fill_placeholders(&layout, &composed), &ctx);
        html = assets::inject_assets(&html, &self.assets);
        if self.config.build.minify {
            html = assets::minify(&html);
        }

        debug!(route = %route.url, source = %source.rel_path.display(), bytes = html.len(), "rendered");
        RenderResult {
            route: route.clone(),
            source: source.rel_path.clone(),
            html,
            warnings: Vec::new(),
            meta,
        }
    }

    fn context(&self, meta: &Meta, source: &PageSource, route: &Route, layout: &str) -> RenderContext {
        let ctx = RenderContext::new(self.site.clone(), self.page_value(meta, source, route, layout));
        match &self.collections {
            Some(collections) => ctx.with_collections(collections.clone()),
            None => ctx,
        }
    }

    /// Expand inclusions, leaving top-level tokens for [`Self::finish`].
    fn compose(&self, text: &str, ctx: &RenderContext) -> Vec<Node> {
        template::compose(text, ctx, self.fragments, ComposeOptions::deferred())
    }

    /// Expand loops when collections are on, then resolve remaining tokens.
    fn finish(&self, nodes: &[Node], ctx: &RenderContext) -> String {
        match &self.collections {
            Some(collections) => interpolate(&expand_loops(nodes, collections), ctx),
            None => interpolate(nodes, ctx),
        }
    }

    fn page_value(&self, meta: &Meta, source: &PageSource, route: &Route, layout: &str) -> Value {
        let url = match self.config.base_url() {
            Some(base) => format!("{base}{}", route.url),
            None => route.url.clone(),
        };
        json!({
            "route": route.url,
            "url": url,
            "source": source.rel_path.to_string_lossy().replace('\\', "/"),
            "layout": layout,
            "title": meta.title.clone().unwrap_or_default(),
            "description": meta.description.clone().unwrap_or_default(),
            "meta": serde_json::to_value(meta).unwrap_or(Value::Null),
        })
    }

    /// Raw `head` markup from the page plus Open Graph tags.
    fn head_extras(&self, meta: &Meta, route: &Route) -> String {
        let mut out = meta.head.clone().unwrap_or_default();
        if let Some(og) = &meta.og {
            let title = og.title.as_deref().or(meta.title.as_deref());
            let page_url = self.config.base_url().map(|base| format!("{base}{}", route.url));
            let image = og.image.as_deref().map(|img| match self.config.base_url() {
                Some(base) if img.starts_with('/') => format!("{base}{img}"),
                _ => img.to_string(),
            });
            let markup = html! {
                meta property="og:type" content="website";
                @if let Some(title) = title {
                    meta property="og:title" content=(title);
                }
                @if let Some(subtitle) = &og.subtitle {
                    meta property="og:description" content=(subtitle);
                }
                @if let Some(image) = &image {
                    meta property="og:image" content=(image);
                }
                @if let Some(url) = &page_url {
                    meta property="og:url" content=(url);
                }
            };
            out.push_str(&markup.into_string());
        }
        out
    }

    fn layout_text(&self, name: &str) -> String {
        let reference = format!("layouts/{name}");
        match self.fragments.read(&reference) {
            Some(fragment) => fragment.text,
            None => {
                debug!(layout = name, "layout not found, using built-in layout");
                builtin_layout().into_string()
            }
        }
    }
}

/// Text of the first `<h1>` in a body, if any.
fn first_h1_text(body: &str) -> Option<String> {
    let doc = Document::parse(body);
    let (id, _) = doc.first("h1")?;
    Some(doc.text_content(id)).filter(|t| !t.is_empty())
}

/// The layout used when a page names one that does not exist.
pub fn builtin_layout() -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (PreEscaped("{{page.title}}")) }
                meta name="description" content="{{page.description}}";
                (PreEscaped("{{slot:head}}"))
            }
            body {
                main id="main" {
                    (PreEscaped("{{slot:main}}"))
                }
                (PreEscaped("{{slot:footer}}"))
            }
        }
    }
}
