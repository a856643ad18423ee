// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! DOM node storage and node handles

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Shared node storage of one document
pub(crate) type NodeStore = Arc<RwLock<HashMap<NodeId, NodeData>>>;

/// Unique node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Create a new unique node ID; IDs grow in creation order
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Element,
    Text,
    Comment,
    DocumentType,
}

/// Internal node data
#[derive(Debug, Clone)]
pub struct NodeData {
    pub node_type: NodeType,
    /// Lowercase tag name (elements only)
    pub tag_name: Option<String>,
    /// Text of text/comment nodes
    pub text: Option<String>,
    /// Attributes in source order
    pub attributes: Vec<(String, String)>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl NodeData {
    fn blank(node_type: NodeType) -> Self {
        Self {
            node_type,
            tag_name: None,
            text: None,
            attributes: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn element(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: Some(tag_name.into().to_ascii_lowercase()),
            ..Self::blank(NodeType::Element)
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            text: Some(content.into()),
            ..Self::blank(NodeType::Text)
        }
    }

    pub fn comment(content: impl Into<String>) -> Self {
        Self {
            text: Some(content.into()),
            ..Self::blank(NodeType::Comment)
        }
    }

    pub fn document() -> Self {
        Self::blank(NodeType::Document)
    }

    pub fn doctype() -> Self {
        Self::blank(NodeType::DocumentType)
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A reference to a node in a document
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    nodes: NodeStore,
}

impl Node {
    pub(crate) fn new(id: NodeId, nodes: NodeStore) -> Self {
        Self { id, nodes }
    }

    pub(crate) fn store(&self) -> &NodeStore {
        &self.nodes
    }

    fn with<R>(&self, f: impl FnOnce(&NodeData) -> R) -> Option<R> {
        self.nodes.read().get(&self.id).map(f)
    }

    pub fn node_type(&self) -> NodeType {
        self.with(|n| n.node_type).unwrap_or(NodeType::Comment)
    }

    pub fn is_element(&self) -> bool {
        self.node_type() == NodeType::Element
    }

    /// Lowercase tag name
    pub fn local_name(&self) -> Option<String> {
        self.with(|n| n.tag_name.clone()).flatten()
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.with(|n| n.attribute(name).map(str::to_string)).flatten()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.with(|n| n.attribute(name).is_some()).unwrap_or(false)
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();
        if let Some(node) = self.nodes.write().get_mut(&self.id) {
            match node.attributes.iter_mut().find(|(k, _)| *k == name) {
                Some(slot) => slot.1 = value,
                None => node.attributes.push((name, value)),
            }
        }
    }

    pub fn remove_attribute(&self, name: &str) {
        if let Some(node) = self.nodes.write().get_mut(&self.id) {
            node.attributes.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        }
    }

    pub fn attributes(&self) -> Vec<(String, String)> {
        self.with(|n| n.attributes.clone()).unwrap_or_default()
    }

    pub fn parent(&self) -> Option<Node> {
        self.with(|n| n.parent)
            .flatten()
            .map(|id| Node::new(id, self.nodes.clone()))
    }

    pub fn children(&self) -> Vec<Node> {
        self.with(|n| n.children.clone())
            .unwrap_or_default()
            .into_iter()
            .map(|id| Node::new(id, self.nodes.clone()))
            .collect()
    }

    /// All descendants in document order
    pub fn descendants(&self) -> Vec<Node> {
        let nodes = self.nodes.read();
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = nodes
            .get(&self.id)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            if let Some(data) = nodes.get(&id) {
                stack.extend(data.children.iter().rev().copied());
                out.push(Node::new(id, self.nodes.clone()));
            }
        }
        out
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        let nodes = self.nodes.read();
        let mut out = String::new();
        collect_text(&nodes, self.id, &mut out);
        out
    }

    /// Replace all children with a single text node
    pub fn set_text_content(&self, content: impl Into<String>) {
        let content = content.into();
        let mut nodes = self.nodes.write();
        let Some(node) = nodes.get_mut(&self.id) else {
            return;
        };
        if node.node_type == NodeType::Text {
            node.text = Some(content);
            return;
        }
        let old = std::mem::take(&mut node.children);
        let text_id = NodeId::new();
        node.children.push(text_id);
        for id in old {
            nodes.remove(&id);
        }
        let mut text = NodeData::text(content);
        text.parent = Some(self.id);
        nodes.insert(text_id, text);
    }

    /// Append a child, detaching it from any previous parent
    pub fn append_child(&self, child: &Node) {
        let mut nodes = self.nodes.write();
        if let Some(old_parent) = nodes.get(&child.id).and_then(|d| d.parent) {
            if let Some(p) = nodes.get_mut(&old_parent) {
                p.children.retain(|&id| id != child.id);
            }
        }
        if let Some(data) = nodes.get_mut(&child.id) {
            data.parent = Some(self.id);
        }
        if let Some(parent) = nodes.get_mut(&self.id) {
            parent.children.push(child.id);
        }
    }

    pub fn inner_html(&self) -> String {
        let nodes = self.nodes.read();
        let mut out = String::new();
        if let Some(node) = nodes.get(&self.id) {
            for &child in &node.children {
                serialize(&nodes, child, &mut out);
            }
        }
        out
    }

    pub fn outer_html(&self) -> String {
        let nodes = self.nodes.read();
        let mut out = String::new();
        serialize(&nodes, self.id, &mut out);
        out
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

fn collect_text(nodes: &HashMap<NodeId, NodeData>, id: NodeId, out: &mut String) {
    if let Some(node) = nodes.get(&id) {
        match node.node_type {
            NodeType::Text => out.push_str(node.text.as_deref().unwrap_or("")),
            NodeType::Element | NodeType::Document => {
                // script bodies are not page text
                if node.tag_name.as_deref() == Some("script") {
                    return;
                }
                for &child in &node.children {
                    collect_text(nodes, child, out);
                }
            }
            _ => {}
        }
    }
}

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

fn serialize(nodes: &HashMap<NodeId, NodeData>, id: NodeId, out: &mut String) {
    let Some(node) = nodes.get(&id) else {
        return;
    };
    match node.node_type {
        NodeType::Text => out.push_str(&escape_text(node.text.as_deref().unwrap_or(""))),
        NodeType::Comment => {
            out.push_str("<!--");
            out.push_str(node.text.as_deref().unwrap_or(""));
            out.push_str("-->");
        }
        NodeType::DocumentType => out.push_str("<!DOCTYPE html>"),
        NodeType::Document => {
            for &child in &node.children {
                serialize(nodes, child, out);
            }
        }
        NodeType::Element => {
            let tag = node.tag_name.as_deref().unwrap_or("div");
            out.push('<');
            out.push_str(tag);
            for (k, v) in &node.attributes {
                out.push(' ');
                out.push_str(k);
                out.push_str("=\"");
                out.push_str(&escape_attr(v));
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&tag) {
                return;
            }
            for &child in &node.children {
                serialize(nodes, child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}
