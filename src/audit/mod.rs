//! Build-time audit of rendered pages.
//!
//! | Category | Module | Checks |
//! |---|---|---|
//! | **SEO** | [`seo`] | title, description, h1, img_alt, img_size, canonical, favicon |
//! | **Link** | [`links`] | internal anchors resolve to a route or a static file |
//! | **Accessibility** | [`a11y`] | heading order, ARIA, alt text, names, focus, forms, tables, landmarks, contrast |
//!
//! Every page's final HTML is parsed once into a [`dom::Document`] and
//! handed to each enabled check. Checks are plain functions returning their
//! findings; a check that panics is logged and contributes nothing, so one
//! bad rule never takes the rest of the audit down with it.

pub mod a11y;
pub mod contrast;
pub mod dom;
pub mod links;
pub mod seo;

use crate::config::{AuditConfig, AuditMode};
use crate::routes::RouteTable;
use dom::Document;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Seo,
    Accessibility,
    Link,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Seo, Category::Accessibility, Category::Link];

    pub fn mode(self, config: &AuditConfig) -> AuditMode {
        match self {
            Category::Seo => config.seo,
            Category::Accessibility => config.accessibility,
            Category::Link => config.links,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Seo => "seo",
            Category::Accessibility => "accessibility",
            Category::Link => "link",
        })
    }
}

/// One audit finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub category: Category,
    /// Name of the check that produced it (`h1`, `contrast`, …).
    pub check: String,
    pub message: String,
}

impl Warning {
    pub fn new(category: Category, check: &str, message: impl Into<String>) -> Self {
        Self {
            category,
            check: check.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}] {}", self.category, self.check, self.message)
    }
}

/// Everything a check may consult besides the document itself.
#[derive(Debug, Clone, Copy)]
pub struct PageAudit<'a> {
    /// Route of the page under audit.
    pub route: &'a str,
    pub config: &'a AuditConfig,
    pub routes: &'a RouteTable,
    /// Output root, for checks that look at files on disk. `None` skips them.
    pub output_root: Option<&'a Path>,
}

pub type CheckFn = fn(&Document, &PageAudit<'_>) -> Vec<Warning>;

pub struct Check {
    pub category: Category,
    pub name: &'static str,
    pub enabled: fn(&AuditConfig) -> bool,
    pub run: CheckFn,
}

/// Every check, in report order.
pub fn checks() -> Vec<Check> {
    let mut all = seo::checks();
    all.extend(links::checks());
    all.extend(a11y::checks());
    all
}

/// Run one check, turning a panic into an empty result.
pub fn run_guarded(check: &Check, doc: &Document, page: &PageAudit<'_>) -> Vec<Warning> {
    match panic::catch_unwind(AssertUnwindSafe(|| (check.run)(doc, page))) {
        Ok(warnings) => warnings,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(check = check.name, route = page.route, %reason, "audit check panicked");
            Vec::new()
        }
    }
}

/// Audit one page's final HTML.
pub fn audit_page(html: &str, page: &PageAudit<'_>) -> Vec<Warning> {
    let enabled: Vec<Check> = checks()
        .into_iter()
        .filter(|c| c.category.mode(page.config).is_enabled() && (c.enabled)(page.config))
        .collect();
    if enabled.is_empty() {
        return Vec::new();
    }
    let doc = Document::parse(html);
    enabled
        .iter()
        .flat_map(|check| run_guarded(check, &doc, page))
        .collect()
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn panicking_check_yields_nothing() {
        fn boom(_: &Document, _: &PageAudit<'_>) -> Vec<Warning> {
            panic!("rule exploded")
        }
        let check = Check {
            category: Category::Seo,
            name: "boom",
            enabled: |_| true,
            run: boom,
        };
        let config = AuditConfig::default();
        let routes = routes(&["index.html"]);
        let doc = Document::parse("<p>x</p>");
        assert!(run_guarded(&check, &doc, &page(&config, &routes)).is_empty());
    }

    #[test]
    fn off_categories_are_skipped() {
        let html = "<html><body><h1>a</h1><h1>b</h1><img src=x.png></body></html>";
        let routes = routes(&["index.html"]);

        let config = AuditConfig::default();
        let all = audit_page(html, &page(&config, &routes));
        assert!(all.iter().any(|w| w.category == Category::Seo));
        assert!(all.iter().any(|w| w.category == Category::Accessibility));

        let config = AuditConfig {
            seo: AuditMode::Off,
            accessibility: AuditMode::Off,
            links: AuditMode::Off,
            ..AuditConfig::default()
        };
        assert!(audit_page(html, &page(&config, &routes)).is_empty());
    }

    #[test]
    fn two_h1_and_missing_alt_give_separate_seo_warnings() {
        let html = "<html><head><title>T</title><meta name=description content=d>\
                    <link rel=canonical href=https://x/></head>\
                    <body><h1>a</h1><h1>b</h1><img src=a.png></body></html>";
        let routes = routes(&["index.html"]);
        let config = AuditConfig::default();
        let seo: Vec<Warning> = audit_page(html, &page(&config, &routes))
            .into_iter()
            .filter(|w| w.category == Category::Seo)
            .collect();
        assert!(seo.iter().any(|w| w.check == "h1"));
        assert!(seo.iter().any(|w| w.check == "img_alt"));
        assert!(seo.len() >= 2);
    }

    #[test]
    fn clean_page_has_no_seo_warnings() {
        let html = r#"<html><head><title>Home</title>
            <meta name="description" content="A page">
            <link rel="canonical" href="https://example.com/"></head>
            <body><h1>Home</h1><img src="/a.png" alt="A harbour at dusk"></body></html>"#;
        let routes = routes(&["index.html"]);
        let config = AuditConfig::default();
        let seo: Vec<Warning> = audit_page(html, &page(&config, &routes))
            .into_iter()
            .filter(|w| w.category == Category::Seo)
            .collect();
        assert!(seo.is_empty(), "{seo:?}");
    }

    #[test]
    fn category_serializes_lowercase() {
        let w = Warning::new(Category::Accessibility, "aria", "x");
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["category"], "accessibility");
        assert_eq!(w.to_string(), "[accessibility/aria] x");
    }
}
