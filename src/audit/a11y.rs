//! Accessibility rules that can be decided from static markup.
//!
//! Each rule is its own check so it can be switched off in
//! `[audit.a11y_checks]`. Rules look only at the document; nothing here
//! runs scripts or computes styles beyond inline `style` attributes.

use super::contrast::{self, Rgb};
use super::dom::{Document, Element, NodeId};
use super::{Category, Check, PageAudit, Warning};

pub fn checks() -> Vec<Check> {
    fn check(name: &'static str, enabled: fn(&crate::config::AuditConfig) -> bool, run: super::CheckFn) -> Check {
        Check {
            category: Category::Accessibility,
            name,
            enabled,
            run,
        }
    }
    vec![
        check("heading_order", |c| c.a11y_checks.heading_order, heading_order),
        check("aria", |c| c.a11y_checks.aria, aria),
        check("alt_text", |c| c.a11y_checks.alt_text, alt_text),
        check("interactive_names", |c| c.a11y_checks.interactive_names, interactive_names),
        check("tabindex", |c| c.a11y_checks.tabindex, tabindex),
        check("anchor_href", |c| c.a11y_checks.anchor_href, anchor_href),
        check("button_type", |c| c.a11y_checks.button_type, button_type),
        check("click_handlers", |c| c.a11y_checks.click_handlers, click_handlers),
        check("form_labels", |c| c.a11y_checks.form_labels, form_labels),
        check("table_captions", |c| c.a11y_checks.table_captions, table_captions),
        check("skip_link", |c| c.a11y_checks.skip_link, skip_link),
        check("landmarks", |c| c.a11y_checks.landmarks, landmarks),
        check("contrast", |c| c.a11y_checks.contrast, contrast_check),
    ]
}

fn warn(check: &str, message: impl Into<String>) -> Warning {
    Warning::new(Category::Accessibility, check, message)
}

fn heading_level(name: &str) -> Option<u8> {
    match name.as_bytes() {
        [b'h', d @ b'1'..=b'6'] => Some(d - b'0'),
        _ => None,
    }
}

pub fn heading_order(doc: &Document, _: &PageAudit<'_>) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let mut previous: Option<u8> = None;
    for (_, el) in doc.elements() {
        let Some(level) = heading_level(&el.name) else {
            continue;
        };
        if let Some(prev) = previous
            && level > prev + 1
        {
            warnings.push(warn(
                "heading_order",
                format!("heading level jumps from h{prev} to h{level}"),
            ));
        }
        previous = Some(level);
    }
    let h1s = doc.count("h1");
    if h1s > 1 {
        warnings.push(warn("heading_order", format!("{h1s} <h1> elements on one page")));
    }
    warnings
}

const ARIA_ATTRIBUTES: &[&str] = &[
    "aria-activedescendant", "aria-atomic", "aria-autocomplete", "aria-braillelabel",
    "aria-brailleroledescription", "aria-busy", "aria-checked", "aria-colcount", "aria-colindex",
    "aria-colindextext", "aria-colspan", "aria-controls", "aria-current", "aria-describedby",
    "aria-description", "aria-details", "aria-disabled", "aria-dropeffect", "aria-errormessage",
    "aria-expanded", "aria-flowto", "aria-grabbed", "aria-haspopup", "aria-hidden",
    "aria-invalid", "aria-keyshortcuts", "aria-label", "aria-labelledby", "aria-level",
    "aria-live", "aria-modal", "aria-multiline", "aria-multiselectable", "aria-orientation",
    "aria-owns", "aria-placeholder", "aria-posinset", "aria-pressed", "aria-readonly",
    "aria-relevant", "aria-required", "aria-roledescription", "aria-rowcount", "aria-rowindex",
    "aria-rowindextext", "aria-rowspan", "aria-selected", "aria-setsize", "aria-sort",
    "aria-valuemax", "aria-valuemin", "aria-valuenow", "aria-valuetext",
];

const ARIA_ROLES: &[&str] = &[
    "alert", "alertdialog", "application", "article", "banner", "blockquote", "button", "caption",
    "cell", "checkbox", "code", "columnheader", "combobox", "complementary", "contentinfo",
    "definition", "deletion", "dialog", "directory", "document", "emphasis", "feed", "figure",
    "form", "generic", "grid", "gridcell", "group", "heading", "img", "insertion", "link", "list",
    "listbox", "listitem", "log", "main", "marquee", "math", "menu", "menubar", "menuitem",
    "menuitemcheckbox", "menuitemradio", "meter", "navigation", "none", "note", "option",
    "paragraph", "presentation", "progressbar", "radio", "radiogroup", "region", "row",
    "rowgroup", "rowheader", "scrollbar", "search", "searchbox", "separator", "slider",
    "spinbutton", "status", "strong", "subscript", "superscript", "switch", "tab", "table",
    "tablist", "tabpanel", "term", "textbox", "time", "timer", "toolbar", "tooltip", "tree",
    "treegrid", "treeitem",
];

pub fn aria(doc: &Document, _: &PageAudit<'_>) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for (_, el) in doc.elements() {
        for (name, _) in &el.attrs {
            if name.starts_with("aria-") && !ARIA_ATTRIBUTES.contains(&name.as_str()) {
                warnings.push(warn(
                    "aria",
                    format!("unknown ARIA attribute {name} on <{}>", el.name),
                ));
            }
        }
        if let Some(roles) = el.attr("role") {
            for role in roles.split_ascii_whitespace() {
                if !ARIA_ROLES.contains(&role.to_ascii_lowercase().as_str()) {
                    warnings.push(warn("aria", format!("unknown role \"{role}\" on <{}>", el.name)));
                }
            }
        }
    }
    warnings
}

const REDUNDANT_ALT_PREFIXES: &[&str] = &[
    "image of", "picture of", "photo of", "photograph of", "graphic of", "an image of",
    "a picture of", "a photo of",
];

const IMAGE_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg", ".avif", ".bmp",
];

fn looks_like_filename(alt: &str) -> bool {
    let lower = alt.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
        || (!lower.contains(' ') && (lower.starts_with("img_") || lower.starts_with("dsc")))
}

pub fn alt_text(doc: &Document, _: &PageAudit<'_>) -> Vec<Warning> {
    doc.find_all("img")
        .filter_map(|(_, img)| {
            let src = img.attr("src").unwrap_or("<img>");
            let Some(alt) = img.attr("alt") else {
                return Some(warn("alt_text", format!("image {src} has no alt attribute")));
            };
            let lower = alt.trim().to_ascii_lowercase();
            if REDUNDANT_ALT_PREFIXES.iter().any(|p| lower.starts_with(p)) {
                Some(warn(
                    "alt_text",
                    format!("alt text \"{alt}\" on {src} repeats that it is an image"),
                ))
            } else if looks_like_filename(alt.trim()) {
                Some(warn(
                    "alt_text",
                    format!("alt text \"{alt}\" on {src} looks like a file name"),
                ))
            } else {
                None
            }
        })
        .collect()
}

/// Whether an element exposes a name to assistive technology.
fn has_accessible_name(doc: &Document, id: NodeId) -> bool {
    let el = doc.element(id);
    if el.non_empty_attr("aria-label").is_some()
        || el.non_empty_attr("aria-labelledby").is_some()
        || el.non_empty_attr("title").is_some()
        || !doc.text_content(id).is_empty()
    {
        return true;
    }
    doc.descendants(id).into_iter().any(|d| {
        let child = doc.element(d);
        (child.name == "img" && child.non_empty_attr("alt").is_some())
            || (child.name == "svg" && child.non_empty_attr("aria-label").is_some())
    })
}

pub fn interactive_names(doc: &Document, _: &PageAudit<'_>) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for (id, el) in doc.elements() {
        let unnamed = match el.name.as_str() {
            "a" if el.has_attr("href") => !has_accessible_name(doc, id),
            "button" => !has_accessible_name(doc, id),
            "input" if el.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("button")) => {
                el.non_empty_attr("value").is_none()
                    && el.non_empty_attr("aria-label").is_none()
                    && el.non_empty_attr("title").is_none()
            }
            _ => false,
        };
        if unnamed {
            let what = match el.attr("href") {
                Some(href) if el.name == "a" => format!("link to {href}"),
                _ => format!("<{}>", el.name),
            };
            warnings.push(warn("interactive_names", format!("{what} has no accessible name")));
        }
    }
    warnings
}

pub fn tabindex(doc: &Document, _: &PageAudit<'_>) -> Vec<Warning> {
    doc.elements()
        .filter_map(|(_, el)| {
            let value: i64 = el.attr("tabindex")?.trim().parse().ok()?;
            (value > 0).then(|| {
                warn(
                    "tabindex",
                    format!("<{}> has tabindex=\"{value}\"; positive values reorder focus", el.name),
                )
            })
        })
        .collect()
}

pub fn anchor_href(doc: &Document, _: &PageAudit<'_>) -> Vec<Warning> {
    doc.find_all("a")
        .filter(|(_, a)| !a.has_attr("href") && !a.has_attr("role"))
        .map(|(id, _)| {
            let text = doc.text_content(id);
            warn("anchor_href", format!("<a> \"{text}\" has no href"))
        })
        .collect()
}

pub fn button_type(doc: &Document, _: &PageAudit<'_>) -> Vec<Warning> {
    doc.find_all("button")
        .filter(|(_, b)| b.non_empty_attr("type").is_none())
        .map(|(id, _)| {
            let text = doc.text_content(id);
            warn("button_type", format!("<button> \"{text}\" has no type attribute"))
        })
        .collect()
}

const INTERACTIVE_TAGS: &[&str] = &[
    "a", "button", "input", "select", "textarea", "summary", "details", "option", "label",
];

pub fn click_handlers(doc: &Document, _: &PageAudit<'_>) -> Vec<Warning> {
    doc.elements()
        .filter(|(_, el)| {
            el.has_attr("onclick")
                && !INTERACTIVE_TAGS.contains(&el.name.as_str())
                && !el.has_attr("role")
        })
        .map(|(_, el)| {
            warn(
                "click_handlers",
                format!("<{}> has a click handler but no role", el.name),
            )
        })
        .collect()
}

fn needs_label(el: &Element) -> bool {
    match el.name.as_str() {
        "select" | "textarea" => true,
        "input" => !matches!(
            el.attr("type").map(str::to_ascii_lowercase).as_deref(),
            Some("hidden" | "submit" | "button" | "reset" | "image")
        ),
        _ => false,
    }
}

pub fn form_labels(doc: &Document, _: &PageAudit<'_>) -> Vec<Warning> {
    let label_targets: Vec<&str> = doc
        .find_all("label")
        .filter_map(|(_, l)| l.non_empty_attr("for"))
        .collect();
    doc.elements()
        .filter(|(_, el)| needs_label(el))
        .filter(|(id, el)| {
            let by_for = el
                .non_empty_attr("id")
                .is_some_and(|i| label_targets.contains(&i));
            !(by_for
                || el.non_empty_attr("aria-label").is_some()
                || el.non_empty_attr("aria-labelledby").is_some()
                || el.non_empty_attr("title").is_some()
                || doc.has_ancestor(*id, "label"))
        })
        .map(|(_, el)| {
            let name = el
                .attr("name")
                .or_else(|| el.attr("id"))
                .map(|n| format!(" \"{n}\""))
                .unwrap_or_default();
            warn("form_labels", format!("<{}>{name} has no label", el.name))
        })
        .collect()
}

pub fn table_captions(doc: &Document, _: &PageAudit<'_>) -> Vec<Warning> {
    doc.find_all("table")
        .filter(|(id, t)| {
            !t.has_token("role", "presentation")
                && !t.has_token("role", "none")
                && t.non_empty_attr("aria-label").is_none()
                && t.non_empty_attr("aria-labelledby").is_none()
                && !doc
                    .descendants(*id)
                    .into_iter()
                    .any(|d| doc.element(d).name == "caption")
        })
        .map(|_| warn("table_captions", "data table has no <caption>"))
        .collect()
}

pub fn skip_link(doc: &Document, _: &PageAudit<'_>) -> Vec<Warning> {
    if doc.first("body").is_none() {
        return Vec::new();
    }
    let skip = doc.find_all("a").find(|(id, a)| {
        a.attr("href").is_some_and(|h| h.len() > 1 && h.starts_with('#'))
            && doc.text_content(*id).to_ascii_lowercase().contains("skip")
    });
    let Some((_, link)) = skip else {
        return vec![warn("skip_link", "page has no skip link")];
    };
    let target = link.attr("href").map(|h| &h[1..]).unwrap_or_default();
    let exists = doc.element_by_id(target).is_some()
        || doc.find_all("a").any(|(_, a)| a.attr("name") == Some(target));
    if exists {
        Vec::new()
    } else {
        vec![warn("skip_link", format!("skip link target #{target} does not exist"))]
    }
}

pub fn landmarks(doc: &Document, _: &PageAudit<'_>) -> Vec<Warning> {
    let mains = doc
        .elements()
        .filter(|(_, el)| el.name == "main" || el.has_token("role", "main"))
        .count();
    match mains {
        1 => Vec::new(),
        0 => vec![warn("landmarks", "page has no <main> landmark")],
        n => vec![warn("landmarks", format!("page has {n} main landmarks, expected one"))],
    }
}

/// Background in effect for `id`: its own inline background, else the
/// nearest ancestor's, else white.
fn effective_background(doc: &Document, id: NodeId) -> Rgb {
    std::iter::once(doc.element(id))
        .chain(doc.ancestors(id).map(|(_, e)| e))
        .find_map(|e| e.attr("style").and_then(contrast::style_background))
        .unwrap_or(Rgb::WHITE)
}

pub fn contrast_check(doc: &Document, page: &PageAudit<'_>) -> Vec<Warning> {
    let min = page.config.min_contrast;
    doc.elements()
        .filter_map(|(id, el)| {
            let fg = contrast::style_color(el.attr("style")?)?;
            let bg = effective_background(doc, id);
            let ratio = contrast::contrast_ratio(fg, bg);
            (ratio < min).then(|| {
                warn(
                    "contrast",
                    format!(
                        "<{}> text {} on {} has contrast {ratio:.2}, below {min}",
                        el.name,
                        fg.hex(),
                        bg.hex()
                    ),
                )
            })
        })
        .collect()
}
