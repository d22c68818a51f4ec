//! Search-engine basics every page should carry.

use super::dom::Document;
use super::{Category, Check, PageAudit, Warning};
use std::fs;
use std::path::PathBuf;

pub fn checks() -> Vec<Check> {
    vec![
        Check {
            category: Category::Seo,
            name: "title",
            enabled: |c| c.seo_checks.title,
            run: title,
        },
        Check {
            category: Category::Seo,
            name: "description",
            enabled: |c| c.seo_checks.description,
            run: description,
        },
        Check {
            category: Category::Seo,
            name: "h1",
            enabled: |c| c.seo_checks.h1,
            run: h1,
        },
        Check {
            category: Category::Seo,
            name: "img_alt",
            enabled: |c| c.seo_checks.img_alt,
            run: img_alt,
        },
        Check {
            category: Category::Seo,
            name: "img_size",
            enabled: |c| c.seo_checks.img_size,
            run: img_size,
        },
        Check {
            category: Category::Seo,
            name: "canonical",
            enabled: |c| c.seo_checks.canonical,
            run: canonical,
        },
        Check {
            category: Category::Seo,
            name: "favicon",
            enabled: |c| c.seo_checks.favicon,
            run: favicon,
        },
    ]
}

fn warn(check: &str, message: impl Into<String>) -> Warning {
    Warning::new(Category::Seo, check, message)
}

pub fn title(doc: &Document, _: &PageAudit<'_>) -> Vec<Warning> {
    match doc.first("title") {
        None => vec![warn("title", "page has no <title>")],
        Some((id, _)) if doc.text_content(id).is_empty() => {
            vec![warn("title", "<title> is empty")]
        }
        Some(_) => Vec::new(),
    }
}

pub fn description(doc: &Document, _: &PageAudit<'_>) -> Vec<Warning> {
    let meta = doc
        .find_all("meta")
        .find(|(_, e)| e.attr("name").is_some_and(|n| n.eq_ignore_ascii_case("description")));
    match meta {
        None => vec![warn("description", "page has no meta description")],
        Some((_, e)) if e.non_empty_attr("content").is_none() => {
            vec![warn("description", "meta description is empty")]
        }
        Some(_) => Vec::new(),
    }
}

pub fn h1(doc: &Document, _: &PageAudit<'_>) -> Vec<Warning> {
    match doc.count("h1") {
        0 => vec![warn("h1", "page has no <h1>")],
        1 => Vec::new(),
        n => vec![warn("h1", format!("page has {n} <h1> elements, expected one"))],
    }
}

fn img_label(src: Option<&str>) -> String {
    src.map_or_else(|| "<img>".to_string(), |s| format!("image {s}"))
}

pub fn img_alt(doc: &Document, _: &PageAudit<'_>) -> Vec<Warning> {
    doc.find_all("img")
        .filter_map(|(_, img)| {
            let label = img_label(img.attr("src"));
            match img.attr("alt") {
                None => Some(warn("img_alt", format!("{label} has no alt attribute"))),
                Some(alt) if alt.trim().is_empty() => {
                    Some(warn("img_alt", format!("{label} has empty alt text")))
                }
                Some(_) => None,
            }
        })
        .collect()
}

/// Map an image `src` onto a file under the output root. External URLs,
/// data URIs and protocol-relative references resolve to nothing.
fn local_image_path(src: &str, route: &str, page: &PageAudit<'_>) -> Option<PathBuf> {
    let root = page.output_root?;
    let src = src.split(['?', '#']).next()?.trim();
    if src.is_empty() || src.starts_with("//") || src.contains("://") || src.starts_with("data:") {
        return None;
    }
    let site_path = if src.starts_with('/') {
        src.to_string()
    } else {
        let dir = match route.rfind('/') {
            Some(i) => &route[..=i],
            None => "/",
        };
        format!("{dir}{src}")
    };
    Some(root.join(site_path.trim_start_matches('/')))
}

pub fn img_size(doc: &Document, page: &PageAudit<'_>) -> Vec<Warning> {
    let budget = page.config.image_budget_kb.saturating_mul(1024);
    doc.find_all("img")
        .filter_map(|(_, img)| {
            let src = img.non_empty_attr("src")?;
            let path = local_image_path(src, page.route, page)?;
            let size = fs::metadata(&path).ok().filter(|m| m.is_file())?.len();
            (size > budget).then(|| {
                warn(
                    "img_size",
                    format!(
                        "image {src} is {} KB, over the {} KB budget",
                        size.div_ceil(1024),
                        page.config.image_budget_kb
                    ),
                )
            })
        })
        .collect()
}

pub fn canonical(doc: &Document, _: &PageAudit<'_>) -> Vec<Warning> {
    let found = doc
        .find_all("link")
        .any(|(_, e)| e.has_token("rel", "canonical") && e.non_empty_attr("href").is_some());
    if found {
        Vec::new()
    } else {
        vec![warn("canonical", "page has no canonical link")]
    }
}

pub fn favicon(doc: &Document, _: &PageAudit<'_>) -> Vec<Warning> {
    let found = doc
        .find_all("link")
        .any(|(_, e)| e.has_token("rel", "icon") && e.non_empty_attr("href").is_some());
    if found {
        Vec::new()
    } else {
        vec![warn("favicon", "page declares no favicon")]
    }
}
