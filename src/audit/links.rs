//! Internal link integrity.
//!
//! Only root-relative anchors (`href="/..."`) are checked. A link is good
//! when, after dropping query, fragment, trailing slash and `index.html`, it
//! names a route in the table or a file that exists under the output root.

use super::dom::Document;
use super::{Category, Check, PageAudit, Warning};
use crate::routes::normalize_url;

pub fn checks() -> Vec<Check> {
    vec![Check {
        category: Category::Link,
        name: "internal_links",
        enabled: |_| true,
        run: internal_links,
    }]
}

fn is_internal(href: &str) -> bool {
    href.starts_with('/') && !href.starts_with("//")
}

fn resolves(href: &str, page: &PageAudit<'_>) -> bool {
    if page.routes.contains(href) {
        return true;
    }
    let Some(root) = page.output_root else {
        return false;
    };
    let normalized = normalize_url(href);
    let rel = normalized.trim_start_matches('/');
    !rel.is_empty() && root.join(rel).is_file()
}

pub fn internal_links(doc: &Document, page: &PageAudit<'_>) -> Vec<Warning> {
    doc.find_all("a")
        .filter_map(|(_, a)| a.attr("href").map(str::trim))
        .filter(|href| is_internal(href))
        .filter(|href| !resolves(href, page))
        .map(|href| {
            Warning::new(
                Category::Link,
                "internal_links",
                format!("link to {href} does not match any page or file"),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::config::AuditConfig;
    use tempfile::TempDir;

    fn check(html: &str, output_root: Option<&std::path::Path>) -> Vec<Warning> {
        let config = AuditConfig::default();
        let routes = routes(&["index.html", "about.html"]);
        let page = PageAudit {
            output_root,
            ..page(&config, &routes)
        };
        internal_links(&Document::parse(html), &page)
    }

    #[test]
    fn missing_route_is_one_warning() {
        let w = check(r#"<a href="/missing/">x</a>"#, None);
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].category, Category::Link);
        assert!(w[0].message.contains("/missing/"));
    }

    #[test]
    fn trailing_slash_insensitive() {
        assert!(check(r#"<a href="/about">a</a><a href="/about/#team">b</a><a href="/">c</a>"#, None).is_empty());
        assert!(check(r#"<a href="/about/index.html?x=1">a</a>"#, None).is_empty());
    }

    #[test]
    fn external_and_relative_links_are_skipped() {
        let html = r##"<a href="https://example.com/nope">a</a><a href="//cdn.example/x">b</a>
                      <a href="#top">c</a><a href="mailto:a@b.c">d</a><a href="nope.html">e</a><a>f</a>"##;
        assert!(check(html, None).is_empty());
    }

    #[test]
    fn static_files_count_as_targets() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("files")).unwrap();
        std::fs::write(tmp.path().join("files/cv.pdf"), "pdf").unwrap();
        assert!(check(r#"<a href="/files/cv.pdf">cv</a>"#, Some(tmp.path())).is_empty());
        assert_eq!(check(r#"<a href="/files/gone.pdf">x</a>"#, Some(tmp.path())).len(), 1);
    }

    #[test]
    fn every_broken_anchor_is_reported() {
        assert_eq!(check(r#"<a href="/x">1</a><a href="/x">2</a>"#, None).len(), 2);
    }
}
