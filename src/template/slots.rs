//! Named page regions and layout placeholders.
//!
//! A page marks regions with
//!
//! ```text
//! <!-- monad:slot head -->...<!-- monad:endslot -->
//! ```
//!
//! Everything outside the marked regions is the `main` slot. A layout pulls
//! slots in with `{{slot:NAME}}`; placeholders with no matching slot become
//! empty. Slots are extracted from page text and filled into a parsed
//! layout, after each side has been composed.

use super::node::Node;
use std::collections::BTreeMap;

pub const SLOT_OPEN: &str = "<!-- monad:slot";
pub const SLOT_CLOSE: &str = "<!-- monad:endslot -->";
pub const MAIN: &str = "main";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slots {
    named: BTreeMap<String, String>,
}

impl Slots {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    /// Append to a slot, creating it when absent.
    pub fn append(&mut self, name: &str, content: &str) {
        self.named.entry(name.to_string()).or_default().push_str(content);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.named.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Composed slot contents by name.
pub type SlotNodes = BTreeMap<String, Vec<Node>>;

/// Split a page body into its slots.
///
/// Repeated slot names concatenate in document order. If the page marks a
/// `main` slot explicitly, any unmarked remainder is appended after it.
pub fn extract_slots(body: &str) -> Slots {
    let mut slots = Slots::default();
    let mut remainder = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(start) = rest.find(SLOT_OPEN) {
        let Some((name, header_len)) = parse_slot_header(&rest[start..]) else {
            remainder.push_str(&rest[..start + SLOT_OPEN.len()]);
            rest = &rest[start + SLOT_OPEN.len()..];
            continue;
        };
        remainder.push_str(&rest[..start]);
        let content_start = start + header_len;
        let (content, after) = match rest[content_start..].find(SLOT_CLOSE) {
            Some(len) => (
                &rest[content_start..content_start + len],
                content_start + len + SLOT_CLOSE.len(),
            ),
            None => (&rest[content_start..], rest.len()),
        };
        slots.append(&name, content);
        rest = &rest[after..];
    }
    remainder.push_str(rest);

    if !remainder.trim().is_empty() || slots.get(MAIN).is_none() {
        slots.append(MAIN, remainder.trim());
    }
    slots
}

fn parse_slot_header(text: &str) -> Option<(String, usize)> {
    let after = &text[SLOT_OPEN.len()..];
    if !after.starts_with(char::is_whitespace) {
        return None;
    }
    let close = after.find("-->")?;
    let name = after[..close].trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some((name.to_string(), SLOT_OPEN.len() + close + 3))
}

/// Replace each `{{slot:NAME}}` in `layout` with the slot's nodes.
/// Placeholders inside loop blocks are filled too.
pub fn fill_placeholders(layout: &[Node], slots: &SlotNodes) -> Vec<Node> {
    let mut out = Vec::with_capacity(layout.len());
    for node in layout {
        match node {
            Node::Placeholder(name) => {
                if let Some(content) = slots.get(name) {
                    out.extend(content.iter().cloned());
                }
            }
            Node::Loop { var, path, body } => out.push(Node::Loop {
                var: var.clone(),
                path: path.clone(),
                body: fill_placeholders(body, slots),
            }),
            other => out.push(other.clone()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::node;

    #[test]
    fn unmarked_body_is_main() {
        let slots = extract_slots("\n<p>Hello</p>\n");
        assert_eq!(slots.get("main"), Some("<p>Hello</p>"));
    }

    #[test]
    fn named_slots_are_removed_from_main() {
        let slots = extract_slots(
            "<!-- monad:slot head --><link rel=\"x\"><!-- monad:endslot -->\n<p>Body</p>\n\
             <!-- monad:slot aside -->A<!-- monad:endslot --><!-- monad:slot aside -->B<!-- monad:endslot -->",
        );
        assert_eq!(slots.get("head"), Some("<link rel=\"x\">"));
        assert_eq!(slots.get("aside"), Some("AB"));
        assert_eq!(slots.get("main"), Some("<p>Body</p>"));
    }

    #[test]
    fn explicit_main_keeps_remainder_after_it() {
        let slots = extract_slots("<!-- monad:slot main -->M<!-- monad:endslot -->tail");
        assert_eq!(slots.get("main"), Some("Mtail"));

        let slots = extract_slots("<!-- monad:slot main -->M<!-- monad:endslot -->\n");
        assert_eq!(slots.get("main"), Some("M"));
    }

    #[test]
    fn unterminated_slot_runs_to_end() {
        let slots = extract_slots("before<!-- monad:slot foot -->after");
        assert_eq!(slots.get("foot"), Some("after"));
        assert_eq!(slots.get("main"), Some("before"));
    }

    #[test]
    fn fills_placeholders() {
        let mut slots = SlotNodes::new();
        slots.insert("main".into(), vec![Node::Text("<p>{{page.title}}</p>".into())]);
        slots.insert("head".into(), node::parse("<meta>"));
        let out = fill_placeholders(
            &node::parse("<head>{{slot:head}}</head><body>{{ slot:main }}{{slot:footer}}{{page.title}}</body>"),
            &slots,
        );
        assert_eq!(
            out,
            vec![
                Node::Text("<head>".into()),
                Node::Text("<meta>".into()),
                Node::Text("</head><body>".into()),
                Node::Text("<p>{{page.title}}</p>".into()),
                Node::Token("page.title".into()),
                Node::Text("</body>".into()),
            ]
        );
    }

    #[test]
    fn placeholders_inside_loops_are_filled() {
        let mut slots = SlotNodes::new();
        slots.insert("main".into(), node::parse("x"));
        let out = fill_placeholders(
            &node::parse("<!-- monad:loop p in ps -->{{slot:main}}<!-- monad:endloop -->{{ {{slot:main}}"),
            &slots,
        );
        assert_eq!(
            node::to_source(&out),
            "<!-- monad:loop p in ps -->x<!-- monad:endloop -->{{ x"
        );
    }
}
