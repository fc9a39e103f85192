use core::fmt;

use super::{DOM, DOMNode, NodeId, NodeKind};

use serde_json::{Map, Value, json};

// -----------------------
// Module-scope helpers
// -----------------------

/// Elements that never have children or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text children are serialized verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

fn flush_text(children: &mut Vec<Value>, text_buf: &mut String) {
    if !text_buf.trim().is_empty() {
        children.push(json!({ "type": "text", "text": text_buf.clone() }));
    }
    text_buf.clear();
}

fn push_non_null(children: &mut Vec<Value>, v: Value) {
    if !v.is_null() {
        children.push(v);
    }
}

fn coalesce_children(dom: &DOM, id: NodeId) -> Vec<Value> {
    let mut children: Vec<Value> = Vec::new();
    let mut text_buf = String::new();
    for c in dom.children(id) {
        if let Some(NodeKind::Text { text }) = dom.kind(c) {
            text_buf.push_str(text);
            continue;
        }
        flush_text(&mut children, &mut text_buf);
        let v = node_to_json(dom, c);
        push_non_null(&mut children, v);
    }
    flush_text(&mut children, &mut text_buf);
    children
}

fn node_to_json(dom: &DOM, id: NodeId) -> Value {
    let Some(DOMNode { kind, attrs }) = dom.node(id) else {
        return Value::Null;
    };
    match kind {
        NodeKind::Document => json!({ "type": "document", "children": coalesce_children(dom, id) }),
        NodeKind::Fragment => json!({ "type": "fragment", "children": coalesce_children(dom, id) }),
        NodeKind::Element { tag, template } => {
            // Convert attrs SmallVec to map and sort by key for determinism
            let mut pairs: Vec<(String, String)> = attrs.iter().cloned().collect();
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            let mut attrs_obj = Map::new();
            for (k, v) in pairs {
                attrs_obj.insert(k, Value::String(v));
            }
            let children = template.map_or_else(
                || coalesce_children(dom, id),
                |content| coalesce_children(dom, content),
            );
            json!({
                "type": "element",
                "tag": tag,
                "attrs": Value::Object(attrs_obj),
                "children": children,
            })
        }
        NodeKind::Text { text } => {
            if text.trim().is_empty() {
                Value::Null
            } else {
                json!({ "type": "text", "text": text })
            }
        }
        NodeKind::Comment { text } => json!({ "type": "comment", "text": text }),
    }
}

fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape character data for markup output; `attribute` also escapes double quotes.
fn escape_markup(s: &str, attribute: bool, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn write_markup(dom: &DOM, id: NodeId, out: &mut String) {
    let Some(DOMNode { kind, attrs }) = dom.node(id) else {
        return;
    };
    match kind {
        NodeKind::Document | NodeKind::Fragment => write_children_markup(dom, id, out),
        NodeKind::Element { tag, template } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in attrs.iter() {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_markup(value, true, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&tag.as_str()) {
                return;
            }
            write_children_markup(dom, template.unwrap_or(id), out);
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        NodeKind::Text { text } => {
            let raw = dom
                .parent(id)
                .and_then(|parent| dom.tag_name(parent))
                .is_some_and(|parent_tag| RAW_TEXT_ELEMENTS.contains(&parent_tag));
            if raw {
                out.push_str(text);
            } else {
                escape_markup(text, false, out);
            }
        }
        NodeKind::Comment { text } => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}

fn write_children_markup(dom: &DOM, id: NodeId, out: &mut String) {
    for child in dom.children(id) {
        write_markup(dom, child, out);
    }
}

impl fmt::Debug for DOM {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Header
        writeln!(f, "DOM")?;

        // Pretty print starting from root
        fn write_indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
            for _ in 0..depth {
                f.write_str("  ")?;
            }
            Ok(())
        }

        fn fmt_children(
            dom: &DOM,
            id: NodeId,
            f: &mut fmt::Formatter<'_>,
            depth: usize,
        ) -> fmt::Result {
            for child in dom.children(id) {
                fmt_node(dom, child, f, depth + 1)?;
            }
            Ok(())
        }

        fn fmt_node(
            dom: &DOM,
            id: NodeId,
            f: &mut fmt::Formatter<'_>,
            depth: usize,
        ) -> fmt::Result {
            let Some(DOMNode { kind, attrs }) = dom.node(id) else {
                return Ok(());
            };

            // Small helper to write sorted attributes
            fn write_attrs(
                f: &mut fmt::Formatter<'_>,
                attrs: &smallvec::SmallVec<(String, String), 4>,
            ) -> fmt::Result {
                if attrs.is_empty() {
                    return Ok(());
                }
                let mut pairs: Vec<(String, String)> = attrs.iter().cloned().collect();
                pairs.sort_by(|a, b| a.0.cmp(&b.0));
                for (k, v) in pairs {
                    write!(f, " {}=\"{}\"", k, escape_text(&v))?;
                }
                Ok(())
            }

            match kind {
                NodeKind::Document => {
                    write_indent(f, depth)?;
                    writeln!(f, "#document")?;
                    fmt_children(dom, id, f, depth)?;
                }
                NodeKind::Fragment => {
                    write_indent(f, depth)?;
                    writeln!(f, "#fragment")?;
                    fmt_children(dom, id, f, depth)?;
                }
                NodeKind::Element { tag, template } => {
                    write_indent(f, depth)?;
                    write!(f, "<{tag}")?;
                    write_attrs(f, attrs)?;
                    writeln!(f, ">")?;
                    if let Some(content) = template {
                        fmt_node(dom, *content, f, depth + 1)?;
                    }
                    fmt_children(dom, id, f, depth)?;
                    write_indent(f, depth)?;
                    writeln!(f, "</{tag}>")?;
                }
                NodeKind::Text { text } => {
                    // Skip pure-whitespace text nodes in the printer for cleaner output
                    if text.chars().all(char::is_whitespace) {
                        return Ok(());
                    }
                    write_indent(f, depth)?;
                    writeln!(f, "\"{}\"", escape_text(text))?;
                }
                NodeKind::Comment { text } => {
                    write_indent(f, depth)?;
                    writeln!(f, "<!-- {} -->", escape_text(text))?;
                }
            }
            Ok(())
        }

        fmt_node(self, self.root, f, 0)
    }
}

impl DOM {
    /// Build a deterministic JSON representation of the DOM.
    /// Schema:
    /// - Document: { "type":"document", "children":[ ... ] }
    /// - Element: { "type":"element", "tag": "div", "attrs": {..}, "children":[ ... ] }
    /// - Text: { "type":"text", "text":"..." }
    /// - Comment: { "type":"comment", "text":"..." }
    pub fn to_json_value(&self) -> Value {
        node_to_json(self, self.root)
    }

    /// Pretty JSON string for snapshots and test comparisons.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(&self.to_json_value()).unwrap_or_else(|_| String::from("{}"))
    }

    /// Markup for `node` itself and its subtree.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        write_markup(self, node, &mut out);
        out
    }

    /// Markup for the children of `node` (template content for `<template>`).
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        write_children_markup(self, self.template_content(node).unwrap_or(node), &mut out);
        out
    }
}
