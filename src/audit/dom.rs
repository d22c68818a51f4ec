//! A small, forgiving HTML element tree for the audit checks.
//!
//! Built on `quick-xml` with every well-formedness check switched off, plus
//! the HTML rules an XML reader does not know:
//!
//! - void elements (`img`, `br`, `meta`, …) never take children
//! - an end tag closes the nearest open element of that name; end tags with
//!   no open match are dropped
//! - `script` and `style` bodies are masked before parsing so their `<` and
//!   `&` never reach the tokenizer
//! - ill-formed markup is skipped; only an unrecoverable tokenizer error
//!   ends the tree where it stands
//!
//! Good enough to count headings and read attributes; not a browser.

use quick_xml::Reader;
use quick_xml::errors::Error;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

pub type NodeId = usize;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Element(NodeId),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Lowercase tag name.
    pub name: String,
    /// Attributes in source order; names lowercased, values entity-decoded.
    pub attrs: Vec<(String, String)>,
    pub parent: Option<NodeId>,
    pub children: Vec<Child>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(k, _)| k == name)
    }

    /// Attribute value with surrounding whitespace removed, `None` when
    /// absent or blank.
    pub fn non_empty_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Whether a space-separated attribute (`rel`, `role`) contains `token`.
    pub fn has_token(&self, name: &str, token: &str) -> bool {
        self.attr(name).is_some_and(|v| {
            v.split_ascii_whitespace()
                .any(|t| t.eq_ignore_ascii_case(token))
        })
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    /// Index 0 is a synthetic `#document` root; the rest are in document order.
    elements: Vec<Element>,
}

impl Document {
    pub fn parse(html: &str) -> Document {
        let masked = mask_raw_text(html);
        let mut doc = Document {
            elements: vec![Element {
                name: "#document".to_string(),
                attrs: Vec::new(),
                parent: None,
                children: Vec::new(),
            }],
        };
        let mut open: Vec<NodeId> = Vec::new();

        let mut reader = Reader::from_str(&masked);
        reader.config_mut().trim_text(false);
        reader.config_mut().enable_all_checks(false);
        reader.config_mut().allow_unmatched_ends = true;
        reader.config_mut().allow_dangling_amp = true;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let id = doc.push_element(&e, open.last().copied());
                    if !VOID_ELEMENTS.contains(&doc.elements[id].name.as_str()) {
                        open.push(id);
                    }
                }
                Ok(Event::Empty(e)) => {
                    // `/>` only self-closes void and foreign (svg, math) elements.
                    let in_foreign = open
                        .iter()
                        .any(|&id| matches!(doc.elements[id].name.as_str(), "svg" | "math"));
                    let id = doc.push_element(&e, open.last().copied());
                    let name = doc.elements[id].name.as_str();
                    if !in_foreign && !matches!(name, "svg" | "math") && !VOID_ELEMENTS.contains(&name) {
                        open.push(id);
                    }
                }
                Ok(Event::End(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                    if let Some(pos) = open.iter().rposition(|&id| doc.elements[id].name == name) {
                        open.truncate(pos);
                    }
                }
                Ok(Event::Text(t)) => {
                    let text = decode_entities(&String::from_utf8_lossy(&t));
                    if !text.is_empty() {
                        let parent = open.last().copied().unwrap_or(0);
                        doc.elements[parent].children.push(Child::Text(text));
                    }
                }
                Ok(Event::GeneralRef(r)) => {
                    let text = decode_entities(&format!("&{};", String::from_utf8_lossy(&r)));
                    let parent = open.last().copied().unwrap_or(0);
                    doc.elements[parent].children.push(Child::Text(text));
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(Error::IllFormed(e)) => {
                    debug!(error = %e, position = reader.buffer_position(), "skipping ill-formed markup");
                }
                Err(e) => {
                    debug!(error = %e, position = reader.buffer_position(), "HTML tokenizer stopped early");
                    break;
                }
            }
        }
        doc
    }

    fn push_element(&mut self, start: &BytesStart<'_>, parent: Option<NodeId>) -> NodeId {
        let name = String::from_utf8_lossy(start.name().as_ref()).to_ascii_lowercase();
        let attrs = start
            .html_attributes()
            .with_checks(false)
            .flatten()
            .map(|attr| {
                (
                    String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase(),
                    decode_entities(&String::from_utf8_lossy(&attr.value)),
                )
            })
            .collect();
        let parent = parent.unwrap_or(0);
        let id = self.elements.len();
        self.elements.push(Element {
            name,
            attrs,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.elements[parent].children.push(Child::Element(id));
        id
    }

    pub fn element(&self, id: NodeId) -> &Element {
        &self.elements[id]
    }

    /// Every element in document order, without the synthetic root.
    pub fn elements(&self) -> impl Iterator<Item = (NodeId, &Element)> {
        self.elements.iter().enumerate().skip(1)
    }

    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = (NodeId, &'a Element)> {
        self.elements().filter(move |(_, e)| e.name == name)
    }

    pub fn first<'a>(&'a self, name: &'a str) -> Option<(NodeId, &'a Element)> {
        self.find_all(name).next()
    }

    pub fn count(&self, name: &str) -> usize {
        self.find_all(name).count()
    }

    /// Parent chain from the nearest ancestor outwards, root excluded.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &Element)> {
        std::iter::successors(self.elements[id].parent, |&p| self.elements[p].parent)
            .filter(|&p| p != 0)
            .map(|p| (p, &self.elements[p]))
    }

    pub fn has_ancestor(&self, id: NodeId, name: &str) -> bool {
        self.ancestors(id).any(|(_, e)| e.name == name)
    }

    /// Descendant elements of `id` in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.child_elements(id).rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.child_elements(next).rev());
        }
        out
    }

    fn child_elements(&self, id: NodeId) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.elements[id].children.iter().filter_map(|c| match c {
            Child::Element(e) => Some(*e),
            Child::Text(_) => None,
        })
    }

    /// Concatenated descendant text with whitespace runs collapsed.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut raw = String::new();
        self.collect_text(id, &mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        for child in &self.elements[id].children {
            match child {
                Child::Text(t) => out.push_str(t),
                Child::Element(e) => {
                    out.push(' ');
                    self.collect_text(*e, out);
                    out.push(' ');
                }
            }
        }
    }

    pub fn element_by_id(&self, id_value: &str) -> Option<NodeId> {
        self.elements()
            .find(|(_, e)| e.attr("id") == Some(id_value))
            .map(|(id, _)| id)
    }
}

/// Blank out the bodies of raw-text elements, keeping their tags.
fn mask_raw_text(html: &str) -> String {
    let lower = html.to_ascii_lowercase();
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;

    while pos < html.len() {
        let next = RAW_TEXT_ELEMENTS
            .iter()
            .filter_map(|tag| {
                lower[pos..]
                    .find(&format!("<{tag}"))
                    .map(|at| (pos + at, *tag))
            })
            .min_by_key(|(at, _)| *at);
        let Some((start, tag)) = next else {
            break;
        };
        let Some(open_end) = lower[start..].find('>').map(|i| start + i + 1) else {
            break;
        };
        let close = format!("</{tag}");
        let body_end = lower[open_end..]
            .find(&close)
            .map_or(html.len(), |i| open_end + i);
        out.push_str(&html[pos..open_end]);
        pos = body_end;
    }
    out.push_str(&html[pos..]);
    out
}

/// Decode the handful of character references HTML authors actually write.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after.find(';').filter(|&end| end <= 10).and_then(|end| {
            let name = &after[..end];
            let ch = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => name
                    .strip_prefix("#x")
                    .or_else(|| name.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| name.strip_prefix('#').and_then(|d| d.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, end))
        });
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &after[end + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
