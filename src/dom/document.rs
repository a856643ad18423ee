// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Document representation

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use url::Url;

use super::element::Element;
use super::node::{Node, NodeData, NodeId, NodeStore};
use super::selector::Selector;

/// HTML Document representation
#[derive(Debug, Clone)]
pub struct Document {
    /// URL the document was loaded from
    pub url: Option<Url>,
    title: Arc<RwLock<String>>,
    root_id: NodeId,
    pub(crate) nodes: NodeStore,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        let root_id = NodeId::new();
        let mut nodes = HashMap::new();
        nodes.insert(root_id, NodeData::document());

        Self {
            url: None,
            title: Arc::new(RwLock::new(String::new())),
            root_id,
            nodes: Arc::new(RwLock::new(nodes)),
        }
    }

    /// Create a document with URL
    pub fn with_url(url: Url) -> Self {
        Self {
            url: Some(url),
            ..Self::new()
        }
    }

    pub fn title(&self) -> String {
        self.title.read().clone()
    }

    pub(crate) fn set_title(&self, title: impl Into<String>) {
        *self.title.write() = title.into();
    }

    /// Get the root node
    pub fn root(&self) -> Node {
        Node::new(self.root_id, self.nodes.clone())
    }

    /// Get the <body> element
    pub fn body(&self) -> Option<Element> {
        self.query_selector("body")
    }

    /// All elements in document order
    pub fn elements(&self) -> Vec<Element> {
        self.root()
            .descendants()
            .into_iter()
            .filter_map(Element::new)
            .collect()
    }

    /// Find the first matching element
    pub fn query_selector(&self, selector: &str) -> Option<Element> {
        let sel = Selector::parse(selector).ok()?;
        self.elements().into_iter().find(|e| sel.matches(&e.node))
    }

    /// Find all matching elements
    pub fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        match Selector::parse(selector) {
            Ok(sel) => self
                .elements()
                .into_iter()
                .filter(|e| sel.matches(&e.node))
                .collect(),
            Err(e) => {
                tracing::debug!(error = %e, "Selector rejected");
                Vec::new()
            }
        }
    }

    /// Create a new detached element
    pub fn create_element(&self, tag: &str) -> Element {
        let id = NodeId::new();
        self.nodes.write().insert(id, NodeData::element(tag));
        Element {
            node: Node::new(id, self.nodes.clone()),
        }
    }

    /// Get all links (<a> elements with href)
    pub fn links(&self) -> Vec<Element> {
        self.query_selector_all("a[href]")
    }

    pub fn forms(&self) -> Vec<Element> {
        self.query_selector_all("form")
    }

    /// Find a form by its `name` attribute, falling back to `id`
    pub fn form_named(&self, name: &str) -> Option<Element> {
        self.forms()
            .into_iter()
            .find(|f| f.name().as_deref() == Some(name))
            .or_else(|| {
                self.forms()
                    .into_iter()
                    .find(|f| f.id().as_deref() == Some(name))
            })
    }

    /// Bodies of inline scripts
    pub fn scripts(&self) -> Vec<String> {
        self.query_selector_all("script")
            .into_iter()
            .filter(|s| !s.has_attribute("src"))
            .map(|s| {
                s.node
                    .children()
                    .iter()
                    .map(Node::text_content)
                    .collect::<String>()
            })
            .collect()
    }

    pub fn outer_html(&self) -> String {
        self.root().outer_html()
    }

    /// Visible text of the page
    pub fn text_content(&self) -> String {
        self.root().text_content()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
