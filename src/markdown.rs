//! Markdown to HTML conversion.
//!
//! Thin wrapper over [pulldown-cmark](https://docs.rs/pulldown-cmark) that maps
//! the `[markdown]` config flags onto parser options.
//!
//! CommonMark does not know `<% ref %>` inclusion tags and would escape them
//! into text. They are swapped for HTML comments before parsing and put back
//! afterwards, so inclusions in a Markdown body expand like anywhere else.
//! Inside code spans and blocks the tag comes back escaped and shows as
//! written.

use crate::config::MarkdownConfig;
use crate::template::node::{INCLUDE_CLOSE, INCLUDE_OPEN};
use pulldown_cmark::{Event, Options, Parser, html as md_html};
use quick_xml::escape::escape;

fn options(config: &MarkdownConfig) -> Options {
    let mut options = Options::empty();
    if config.gfm && !config.strict {
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);
    }
    options
}

fn include_placeholder(n: usize) -> String {
    format!("<!--monad-include:{n}-->")
}

/// Replace every complete inclusion tag with a numbered comment.
fn shield_includes(markdown: &str) -> (String, Vec<&str>) {
    let mut out = String::with_capacity(markdown.len());
    let mut tags = Vec::new();
    let mut rest = markdown;
    while let Some(start) = rest.find(INCLUDE_OPEN) {
        let Some(len) = rest[start + INCLUDE_OPEN.len()..].find(INCLUDE_CLOSE) else {
            break;
        };
        let end = start + INCLUDE_OPEN.len() + len + INCLUDE_CLOSE.len();
        out.push_str(&rest[..start]);
        out.push_str(&include_placeholder(tags.len()));
        tags.push(&rest[start..end]);
        rest = &rest[end..];
    }
    out.push_str(rest);
    (out, tags)
}

fn restore_includes(mut html: String, tags: &[&str]) -> String {
    for (n, tag) in tags.iter().enumerate() {
        let placeholder = include_placeholder(n);
        html = html.replace(&placeholder, tag);
        let escaped = escape(placeholder.as_str()).into_owned();
        if html.contains(escaped.as_str()) {
            html = html.replace(escaped.as_str(), &escape(*tag));
        }
    }
    html
}

/// Render a markdown body to an HTML fragment.
pub fn render(markdown: &str, config: &MarkdownConfig) -> String {
    let (shielded, tags) = shield_includes(markdown);
    let breaks = config.breaks;
    let parser = Parser::new_ext(&shielded, options(config)).map(|event| match event {
        Event::SoftBreak if breaks => Event::HardBreak,
        other => other,
    });
    let mut html = String::with_capacity(shielded.len() * 3 / 2);
    md_html::push_html(&mut html, parser);
    if tags.is_empty() {
        html
    } else {
        restore_includes(html, &tags)
    }
}
