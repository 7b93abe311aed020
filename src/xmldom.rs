//! A small fluent XML DOM: an arena-backed document with cursor handles.
//!
//! Mutations happen at a cursor's active element; navigation returns fresh
//! cursors. The arena (`XmlDocument`) is shared via `Rc<RefCell<_>>` so that
//! derived cursors hold a back reference rather than owning the tree — the
//! "(document handle, element handle) pair" shape called out for a
//! mutable-cursor redesign.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeId(usize);

#[derive(Debug)]
enum NodeKind {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<NodeId>,
    },
    Text(String),
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
}

#[derive(Debug, Default)]
struct XmlDocument {
    nodes: Vec<Node>,
}

impl XmlDocument {
    fn alloc(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        self.nodes.push(Node { kind, parent });
        NodeId(self.nodes.len() - 1)
    }

    fn element(&self, id: NodeId) -> Option<(&str, &[(String, String)], &[NodeId])> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { tag, attrs, children } => Some((tag.as_str(), attrs, children)),
            NodeKind::Text(_) => None,
        }
    }
}

/// A cursor on a node within a shared [`XmlDocument`].
///
/// Cloning an `Xml` clones the cursor, not the document: all clones derived
/// from the same `build*`/`parse` call share one arena.
#[derive(Clone, Debug)]
pub struct Xml {
    doc: Rc<RefCell<XmlDocument>>,
    node: NodeId,
}

impl Xml {
    fn new_root(tag: &str) -> Self {
        let mut doc = XmlDocument::default();
        let root = doc.alloc(
            NodeKind::Element {
                tag: tag.to_string(),
                attrs: Vec::new(),
                children: Vec::new(),
            },
            None,
        );
        Xml {
            doc: Rc::new(RefCell::new(doc)),
            node: root,
        }
    }

    /// Builds a document rooted at `<configuration>`.
    pub fn build_configuration() -> Xml {
        Xml::new_root("configuration")
    }

    /// Builds a document rooted at `<rpc>`, pre-filled with the NETCONF
    /// base:1.0 namespace and the given message-id.
    pub fn build_rpc(message_id: &str) -> Xml {
        let xml = Xml::new_root("rpc");
        xml.set_attribute("xmlns", crate::capability::NETCONF_NAMESPACE);
        xml.set_attribute("message-id", message_id);
        xml
    }

    /// Builds a document rooted at a caller-named element.
    pub fn build_named(name: &str) -> Xml {
        Xml::new_root(name)
    }

    /// Builds a document along a spine of nested element names, returning a
    /// cursor on the leaf. An empty spine yields `None`.
    pub fn build_spine(names: &[&str]) -> Option<Xml> {
        let (first, rest) = names.split_first()?;
        let mut cursor = Xml::new_root(first);
        for name in rest {
            cursor = cursor.append(name);
        }
        Some(cursor)
    }

    /// Parses a standalone XML fragment/document into a fresh arena,
    /// returning a cursor on the root element.
    pub fn parse(input: &str) -> Result<Xml> {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(false);
        reader.config_mut().expand_empty_elements = false;

        let mut doc = XmlDocument::default();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut root: Option<NodeId> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| Error::protocol("parse xml", e.to_string()))?;
            match event {
                Event::DocType(_) => {
                    return Err(Error::protocol(
                        "parse xml",
                        "DOCTYPE declarations are rejected",
                    ))
                }
                Event::Start(start) => {
                    let id = push_element(&mut doc, &start, stack.last().copied(), reader.decoder())?;
                    if let Some(parent) = stack.last() {
                        add_child(&mut doc, *parent, id);
                    } else {
                        root = Some(id);
                    }
                    stack.push(id);
                }
                Event::Empty(start) => {
                    let id = push_element(&mut doc, &start, stack.last().copied(), reader.decoder())?;
                    if let Some(parent) = stack.last() {
                        add_child(&mut doc, *parent, id);
                    } else {
                        root = Some(id);
                    }
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(text) => {
                    let raw = text
                        .unescape()
                        .map_err(|e| Error::protocol("parse xml", e.to_string()))?;
                    let trimmed = trim_newlines(&raw);
                    if !trimmed.is_empty() {
                        if let Some(parent) = stack.last() {
                            let id = doc.alloc(NodeKind::Text(trimmed.to_string()), Some(*parent));
                            add_child(&mut doc, *parent, id);
                        }
                    }
                }
                Event::CData(cdata) => {
                    let text = String::from_utf8_lossy(cdata.as_ref()).into_owned();
                    if let Some(parent) = stack.last() {
                        let id = doc.alloc(NodeKind::Text(text), Some(*parent));
                        add_child(&mut doc, *parent, id);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        let root = root.ok_or_else(|| Error::protocol("parse xml", "no root element"))?;
        Ok(Xml {
            doc: Rc::new(RefCell::new(doc)),
            node: root,
        })
    }

    // -- mutation -----------------------------------------------------

    /// Appends a childless child element, returning a cursor on it.
    pub fn append(&self, name: &str) -> Xml {
        let mut doc = self.doc.borrow_mut();
        let id = doc.alloc(
            NodeKind::Element {
                tag: name.to_string(),
                attrs: Vec::new(),
                children: Vec::new(),
            },
            Some(self.node),
        );
        add_child(&mut doc, self.node, id);
        drop(doc);
        Xml { doc: self.doc.clone(), node: id }
    }

    /// Appends a child element with a single text node, returning a cursor
    /// on the new element.
    pub fn append_text(&self, name: &str, text: &str) -> Xml {
        let child = self.append(name);
        child.set_text(text);
        child
    }

    /// Appends one child element per entry in `texts`, all named `name`.
    /// Duplicates are not deduplicated.
    pub fn append_text_many(&self, name: &str, texts: &[&str]) {
        for text in texts {
            self.append_text(name, text);
        }
    }

    /// Appends one child element per `(name, value)` pair, in the caller's
    /// order.
    pub fn append_map(&self, pairs: &[(&str, &str)]) {
        for (name, value) in pairs {
            self.append_text(name, value);
        }
    }

    /// Appends a child element named `name` whose own children are built
    /// from `pairs`, returning a cursor on `name`.
    pub fn append_named_map(&self, name: &str, pairs: &[(&str, &str)]) -> Xml {
        let child = self.append(name);
        child.append_map(pairs);
        child
    }

    /// Appends a child element named `name` whose content is parsed from
    /// `inner_markup` and grafted as real child nodes, for embedding
    /// already-serialized markup (e.g. an opaque `<data>` payload) rather
    /// than rebuilding it node by node. Returns `Err` rather than panicking
    /// when `inner_markup` together with `name` does not form well-formed
    /// XML, since callers may pass through caller-supplied strings.
    pub fn append_raw(&self, name: &str, inner_markup: &str) -> Result<Xml> {
        let wrapped = format!("<{0}>{1}</{0}>", name, inner_markup);
        let parsed = Xml::parse(&wrapped)?;
        let mut doc = self.doc.borrow_mut();
        let source = parsed.doc.borrow();
        let new_id = clone_node(&mut doc, &source, parsed.node, Some(self.node));
        drop(source);
        add_child(&mut doc, self.node, new_id);
        drop(doc);
        Ok(Xml { doc: self.doc.clone(), node: new_id })
    }

    /// Creates a peer of this element under its parent, returning a cursor
    /// on the new sibling.
    pub fn add_sibling(&self, name: &str) -> Result<Xml> {
        let parent = self
            .doc
            .borrow()
            .nodes[self.node.0]
            .parent
            .ok_or_else(|| Error::Argument("cannot add a sibling: element has no parent".into()))?;
        let sibling = Xml { doc: self.doc.clone(), node: parent };
        Ok(sibling.append(name))
    }

    /// Creates one sibling per name in `names`.
    pub fn add_siblings(&self, names: &[&str]) -> Result<Vec<Xml>> {
        names.iter().map(|n| self.add_sibling(n)).collect()
    }

    /// Materializes a `"a/b/c"` chain of nested children, returning a cursor
    /// on the deepest element.
    pub fn add_path(&self, path: &str) -> Xml {
        let mut cursor = self.clone();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            cursor = cursor.append(segment);
        }
        cursor
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        let mut doc = self.doc.borrow_mut();
        if let NodeKind::Element { attrs, .. } = &mut doc.nodes[self.node.0].kind {
            if let Some(existing) = attrs.iter_mut().find(|(n, _)| n == name) {
                existing.1 = value.to_string();
            } else {
                attrs.push((name.to_string(), value.to_string()));
            }
        }
    }

    pub fn remove_attribute(&self, name: &str) {
        let mut doc = self.doc.borrow_mut();
        if let NodeKind::Element { attrs, .. } = &mut doc.nodes[self.node.0].kind {
            attrs.retain(|(n, _)| n != name);
        }
    }

    pub fn clear_attributes(&self) {
        let mut doc = self.doc.borrow_mut();
        if let NodeKind::Element { attrs, .. } = &mut doc.nodes[self.node.0].kind {
            attrs.clear();
        }
    }

    /// Sets (or creates) a single text child, leaving any element children
    /// untouched.
    pub fn set_text(&self, text: &str) {
        let mut doc = self.doc.borrow_mut();
        let existing_text_child = match &doc.nodes[self.node.0].kind {
            NodeKind::Element { children, .. } => children
                .iter()
                .copied()
                .find(|c| matches!(doc.nodes[c.0].kind, NodeKind::Text(_))),
            NodeKind::Text(_) => None,
        };
        if let Some(id) = existing_text_child {
            doc.nodes[id.0].kind = NodeKind::Text(text.to_string());
        } else {
            let id = doc.alloc(NodeKind::Text(text.to_string()), Some(self.node));
            add_child(&mut doc, self.node, id);
        }
    }

    /// Replaces all children with a single text node.
    pub fn set_text_content(&self, text: &str) {
        {
            let mut doc = self.doc.borrow_mut();
            if let NodeKind::Element { children, .. } = &mut doc.nodes[self.node.0].kind {
                children.clear();
            }
        }
        self.set_text(text);
    }

    // -- Junos vendor attribute helpers --------------------------------

    pub fn junos_delete(&self) {
        self.set_attribute("delete", "delete");
    }

    pub fn junos_activate(&self) {
        self.set_attribute("active", "active");
    }

    pub fn junos_deactivate(&self) {
        self.set_attribute("inactive", "inactive");
    }

    pub fn junos_rename(&self, new_name: &str) {
        self.set_attribute("rename", "rename");
        self.set_attribute("name", new_name);
    }

    pub fn junos_insert(&self, position: &str, anchor: Option<&str>) {
        self.set_attribute("insert", position);
        if let Some(anchor) = anchor {
            self.set_attribute("name", anchor);
        }
    }

    // -- navigation -----------------------------------------------------

    /// Tag name of this cursor's active element, if it is an element.
    pub fn tag(&self) -> Option<String> {
        let doc = self.doc.borrow();
        doc.element(self.node).map(|(tag, _, _)| tag.to_string())
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        let doc = self.doc.borrow();
        doc.element(self.node)
            .and_then(|(_, attrs, _)| attrs.iter().find(|(n, _)| n == name).map(|(_, v)| v.clone()))
    }

    /// Descendants (by tag name) under this cursor's element, in document
    /// order.
    fn descendants_named(&self, doc: &std::cell::Ref<XmlDocument>, tag: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        if let Some((_, _, children)) = doc.element(self.node) {
            for &child in children {
                collect_named(doc, child, tag, &mut found);
            }
        }
        found
    }

    /// First text-node child's trimmed text, if any.
    fn first_text(&self, doc: &std::cell::Ref<XmlDocument>) -> Option<String> {
        let (_, _, children) = doc.element(self.node)?;
        children.iter().find_map(|c| match &doc.nodes[c.0].kind {
            NodeKind::Text(t) => Some(trim_newlines(t).to_string()),
            NodeKind::Element { .. } => None,
        })
    }

    /// Finds the text content reachable by `path`: an ordered sequence of
    /// element-name steps, optionally interleaved with `"name~value"`
    /// filter tokens.
    pub fn find_value(&self, path: &[&str]) -> Option<String> {
        let focus = self.find_focus(path)?;
        let doc = self.doc.borrow();
        focus.first_text(&doc)
    }

    /// Finds the element(s) reachable by `path`. When the last step is a
    /// filter token the result is the single matched element; otherwise it
    /// is every element with the focus's tag name under its parent.
    pub fn find_nodes(&self, path: &[&str]) -> Vec<Xml> {
        if path.is_empty() {
            return Vec::new();
        }
        let last_is_filter = path.last().map(|s| s.contains('~')).unwrap_or(false);
        if last_is_filter {
            return match self.find_focus(path) {
                Some(focus) => vec![focus],
                None => Vec::new(),
            };
        }
        let Some(focus) = self.find_focus(path) else {
            return Vec::new();
        };
        let doc = self.doc.borrow();
        let Some(parent) = doc.nodes[focus.node.0].parent else {
            return vec![focus];
        };
        let tag = match doc.element(focus.node) {
            Some((t, _, _)) => t.to_string(),
            None => return vec![focus],
        };
        let siblings = match doc.element(parent) {
            Some((_, _, children)) => children
                .iter()
                .copied()
                .filter(|id| matches!(&doc.nodes[id.0].kind, NodeKind::Element { tag: t, .. } if t == &tag))
                .collect::<Vec<_>>(),
            None => vec![focus.node],
        };
        drop(doc);
        siblings
            .into_iter()
            .map(|id| Xml { doc: self.doc.clone(), node: id })
            .collect()
    }

    fn find_focus(&self, path: &[&str]) -> Option<Xml> {
        let mut current = self.clone();
        let mut i = 0;
        while i < path.len() {
            let step = path[i];
            if step.contains('~') {
                // A bare filter token with no preceding tag step has
                // nothing to filter; treat it as a non-match.
                return None;
            } else {
                let doc = current.doc.borrow();
                let candidates = current.descendants_named(&doc, step);
                if candidates.is_empty() {
                    return None;
                }
                // Peek: is the *next* token a filter applying to this
                // collection?
                if let Some(next) = path.get(i + 1) {
                    if let Some((filter_field, filter_value)) = next.split_once('~') {
                        let matched = candidates.into_iter().find(|&cand| {
                            let child_text = match doc.element(cand) {
                                Some((_, _, children)) => children.iter().find_map(|c| match doc.element(*c) {
                                    Some((t, _, _)) if t == filter_field => {
                                        Xml { doc: current.doc.clone(), node: *c }.first_text(&doc)
                                    }
                                    _ => None,
                                }),
                                None => None,
                            };
                            child_text.as_deref() == Some(filter_value)
                        });
                        drop(doc);
                        match matched {
                            Some(id) => {
                                current = Xml { doc: current.doc.clone(), node: id };
                                i += 2;
                                continue;
                            }
                            None => return None,
                        }
                    }
                }
                let first = candidates[0];
                drop(doc);
                current = Xml { doc: current.doc.clone(), node: first };
                i += 1;
            }
        }
        Some(current)
    }

    // -- serialization ----------------------------------------------------

    /// Serializes the whole owning document (from the root, not just this
    /// cursor), pretty-printed with 4-space indent and no XML declaration.
    pub fn to_xml_string(&self) -> String {
        let doc = self.doc.borrow();
        let mut root = self.node;
        while let Some(parent) = doc.nodes[root.0].parent {
            root = parent;
        }
        let mut out = String::new();
        write_node(&doc, root, 0, &mut out);
        out
    }

    /// Serializes starting at this cursor's element rather than the
    /// document root, compact (no pretty-printing); used for embedding a
    /// fragment into an RPC body.
    pub fn to_fragment_string(&self) -> String {
        let doc = self.doc.borrow();
        let mut out = String::new();
        write_node_compact(&doc, self.node, &mut out);
        out
    }
}

fn push_element(
    doc: &mut XmlDocument,
    start: &BytesStart<'_>,
    parent: Option<NodeId>,
    decoder: Decoder,
) -> Result<NodeId> {
    let tag = local_name(start);
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::protocol("parse xml", e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(|e| Error::protocol("parse xml", e.to_string()))?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(doc.alloc(
        NodeKind::Element { tag, attrs, children: Vec::new() },
        parent,
    ))
}

fn local_name(start: &BytesStart<'_>) -> String {
    let full = start.name();
    let raw = full.as_ref();
    let name = match raw.iter().position(|&b| b == b':') {
        Some(idx) => &raw[idx + 1..],
        None => raw,
    };
    String::from_utf8_lossy(name).into_owned()
}

fn clone_node(
    target: &mut XmlDocument,
    source: &XmlDocument,
    id: NodeId,
    parent: Option<NodeId>,
) -> NodeId {
    match &source.nodes[id.0].kind {
        NodeKind::Text(t) => target.alloc(NodeKind::Text(t.clone()), parent),
        NodeKind::Element { tag, attrs, children } => {
            let new_id = target.alloc(
                NodeKind::Element { tag: tag.clone(), attrs: attrs.clone(), children: Vec::new() },
                parent,
            );
            for &child in children {
                let child_id = clone_node(target, source, child, Some(new_id));
                add_child(target, new_id, child_id);
            }
            new_id
        }
    }
}

fn collect_named(doc: &std::cell::Ref<XmlDocument>, id: NodeId, tag: &str, out: &mut Vec<NodeId>) {
    if let Some((t, _, children)) = doc.element(id) {
        if t == tag {
            out.push(id);
        }
        for &child in children {
            collect_named(doc, child, tag, out);
        }
    }
}

fn add_child(doc: &mut XmlDocument, parent: NodeId, child: NodeId) {
    if let NodeKind::Element { children, .. } = &mut doc.nodes[parent.0].kind {
        children.push(child);
    }
}

fn trim_newlines(s: &str) -> &str {
    s.trim_matches(|c: char| c == '\n' || c == '\r')
        .trim_matches(|c: char| c.is_whitespace())
}

fn write_node(doc: &XmlDocument, id: NodeId, depth: usize, out: &mut String) {
    match &doc.nodes[id.0].kind {
        NodeKind::Text(text) => {
            indent(out, depth);
            out.push_str(&escape_text(text));
            out.push('\n');
        }
        NodeKind::Element { tag, attrs, children } => {
            indent(out, depth);
            out.push('<');
            out.push_str(tag);
            for (k, v) in attrs {
                let _ = write!(out, " {}=\"{}\"", k, escape_attr(v));
            }
            if children.is_empty() {
                out.push_str("/>\n");
                return;
            }
            out.push('>');
            if children.len() == 1 && matches!(doc.nodes[children[0].0].kind, NodeKind::Text(_)) {
                if let NodeKind::Text(text) = &doc.nodes[children[0].0].kind {
                    out.push_str(&escape_text(text));
                }
                out.push_str(&format!("</{}>\n", tag));
                return;
            }
            out.push('\n');
            for child in children {
                write_node(doc, *child, depth + 1, out);
            }
            indent(out, depth);
            out.push_str(&format!("</{}>\n", tag));
        }
    }
}

fn write_node_compact(doc: &XmlDocument, id: NodeId, out: &mut String) {
    match &doc.nodes[id.0].kind {
        NodeKind::Text(text) => out.push_str(&escape_text(text)),
        NodeKind::Element { tag, attrs, children } => {
            out.push('<');
            out.push_str(tag);
            for (k, v) in attrs {
                let _ = write!(out, " {}=\"{}\"", k, escape_attr(v));
            }
            if children.is_empty() {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for child in children {
                write_node_compact(doc, *child, out);
            }
            out.push_str(&format!("</{}>", tag));
        }
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("    ");
    }
}

fn escape_text(s: &str) -> String {
    let bytes = BytesText::new(s);
    String::from_utf8_lossy(&bytes.into_inner()).into_owned()
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_and_serialize_configuration() {
        let config = Xml::build_configuration();
        let system = config.append("system");
        system.append_text("host-name", "router1");
        let fragment = config.to_xml_string();
        assert!(fragment.contains("<configuration>"));
        assert!(fragment.contains("<host-name>router1</host-name>"));
    }

    #[test]
    fn append_map_preserves_order() {
        let root = Xml::build_named("interface");
        root.append_map(&[("name", "ge-0/0/0"), ("unit", "0")]);
        let xml = root.to_xml_string();
        let name_pos = xml.find("<name>").unwrap();
        let unit_pos = xml.find("<unit>").unwrap();
        assert!(name_pos < unit_pos);
    }

    #[test]
    fn add_sibling_requires_a_parent() {
        let root = Xml::build_named("lonely");
        assert!(root.add_sibling("peer").is_err());
    }

    #[test]
    fn add_path_builds_nested_chain() {
        let root = Xml::build_configuration();
        let leaf = root.add_path("system/services/netconf");
        leaf.set_text("enabled");
        let xml = root.to_xml_string();
        assert!(xml.contains("<system>"));
        assert!(xml.contains("<services>"));
        assert!(xml.contains("<netconf>enabled</netconf>"));
    }

    #[test]
    fn junos_attribute_helpers_set_expected_attributes() {
        let root = Xml::build_named("interface");
        root.junos_delete();
        assert_eq!(root.attribute("delete").as_deref(), Some("delete"));

        let renamed = Xml::build_named("unit");
        renamed.junos_rename("1");
        assert_eq!(renamed.attribute("rename").as_deref(), Some("rename"));
        assert_eq!(renamed.attribute("name").as_deref(), Some("1"));
    }

    #[test]
    fn set_text_replaces_existing_text_child_only() {
        let root = Xml::build_named("name");
        root.set_text("first");
        root.set_text("second");
        assert_eq!(root.to_xml_string(), "<name>second</name>\n");
    }

    #[test]
    fn parse_round_trips_simple_document() {
        let xml = Xml::parse("<rpc-reply><ok/></rpc-reply>").unwrap();
        assert_eq!(xml.tag().as_deref(), Some("rpc-reply"));
        assert_eq!(xml.find_value(&["ok"]), None);
        assert_eq!(xml.find_nodes(&["ok"]).len(), 1);
    }

    #[test]
    fn parse_rejects_doctype() {
        let err = Xml::parse("<!DOCTYPE foo><rpc/>").unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn find_value_walks_a_plain_path() {
        let xml = Xml::parse(
            "<data><configuration><system><host-name>router1</host-name></system></configuration></data>",
        )
        .unwrap();
        assert_eq!(
            xml.find_value(&["configuration", "system", "host-name"]),
            Some("router1".to_string())
        );
    }

    #[test]
    fn find_value_applies_a_filter_token() {
        let xml = Xml::parse(
            "<data><configuration><interfaces>\
                <interface><name>ge-0/0/0</name><mtu>1500</mtu></interface>\
                <interface><name>ge-0/0/1</name><mtu>9000</mtu></interface>\
             </interfaces></configuration></data>",
        )
        .unwrap();
        assert_eq!(
            xml.find_value(&["interface", "name~ge-0/0/1", "mtu"]),
            Some("9000".to_string())
        );
    }

    #[test]
    fn find_nodes_without_filter_returns_all_matching_siblings() {
        let xml = Xml::parse(
            "<interfaces><interface><name>a</name></interface><interface><name>b</name></interface></interfaces>",
        )
        .unwrap();
        assert_eq!(xml.find_nodes(&["interface"]).len(), 2);
    }

    #[test]
    fn to_fragment_string_is_compact() {
        let root = Xml::build_named("rpc");
        let inner = root.append("get");
        inner.append("filter");
        assert_eq!(root.to_fragment_string(), "<rpc><get><filter/></get></rpc>");
    }
}
