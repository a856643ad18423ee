// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Element-specific DOM operations

use super::node::{Node, NodeType};
use super::selector::Selector;

/// Element node with form-control helpers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub node: Node,
}

impl Element {
    /// Wrap a node if it is an element
    pub fn new(node: Node) -> Option<Self> {
        (node.node_type() == NodeType::Element).then_some(Self { node })
    }

    /// Lowercase tag name
    pub fn local_name(&self) -> String {
        self.node.local_name().unwrap_or_default()
    }

    pub fn id(&self) -> Option<String> {
        self.node.get_attribute("id")
    }

    pub fn name(&self) -> Option<String> {
        self.node.get_attribute("name")
    }

    /// Lowercased `type` attribute with the HTML defaults applied
    pub fn control_type(&self) -> String {
        match self.local_name().as_str() {
            "input" => self
                .get_attribute("type")
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "text".to_string()),
            "button" => self
                .get_attribute("type")
                .map(|t| t.trim().to_ascii_lowercase())
                .unwrap_or_else(|| "submit".to_string()),
            other => other.to_string(),
        }
    }

    /// Element children only
    pub fn children(&self) -> Vec<Element> {
        self.node.children().into_iter().filter_map(Element::new).collect()
    }

    /// Element descendants in document order
    pub fn descendants(&self) -> Vec<Element> {
        self.node
            .descendants()
            .into_iter()
            .filter_map(Element::new)
            .collect()
    }

    pub fn parent_element(&self) -> Option<Element> {
        self.node.parent().and_then(Element::new)
    }

    /// First descendant matching a selector
    pub fn query_selector(&self, selector: &str) -> Option<Element> {
        self.query_selector_all(selector).into_iter().next()
    }

    /// All descendants matching a selector
    pub fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        match Selector::parse(selector) {
            Ok(sel) => self
                .descendants()
                .into_iter()
                .filter(|e| sel.matches(&e.node))
                .collect(),
            Err(e) => {
                tracing::debug!(error = %e, "Selector rejected");
                Vec::new()
            }
        }
    }

    /// Closest ancestor-or-self with the given tag
    pub fn closest_tag(&self, tag: &str) -> Option<Element> {
        let mut current = Some(self.clone());
        while let Some(el) = current {
            if el.local_name() == tag {
                return Some(el);
            }
            current = el.parent_element();
        }
        None
    }

    /// Current value of a form control
    pub fn value(&self) -> Option<String> {
        match self.local_name().as_str() {
            "textarea" => Some(self.text_content()),
            "select" => {
                let options = self.query_selector_all("option");
                options
                    .iter()
                    .find(|o| o.has_attribute("selected"))
                    .or_else(|| options.first())
                    .map(Element::option_value)
            }
            "input" | "button" | "option" => self.get_attribute("value"),
            _ => None,
        }
    }

    /// Set the value of a form control
    pub fn set_value(&self, value: impl Into<String>) {
        let value = value.into();
        match self.local_name().as_str() {
            "textarea" => self.set_text_content(value),
            "select" => {
                for option in self.query_selector_all("option") {
                    if option.option_value() == value {
                        option.set_attribute("selected", "selected");
                    } else {
                        option.remove_attribute("selected");
                    }
                }
            }
            _ => self.set_attribute("value", value),
        }
    }

    fn option_value(&self) -> String {
        self.get_attribute("value")
            .unwrap_or_else(|| self.text_content().trim().to_string())
    }

    pub fn checked(&self) -> bool {
        self.has_attribute("checked")
    }

    pub fn set_checked(&self, checked: bool) {
        if checked {
            self.set_attribute("checked", "checked");
        } else {
            self.remove_attribute("checked");
        }
    }

    pub fn disabled(&self) -> bool {
        self.has_attribute("disabled")
    }

    pub fn href(&self) -> Option<String> {
        self.get_attribute("href")
    }

    /// Visible label: text for links and buttons, value for inputs
    pub fn label(&self) -> String {
        let raw = match self.local_name().as_str() {
            "input" => self.get_attribute("value").unwrap_or_default(),
            _ => self.text_content(),
        };
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Append a child element
    pub fn append(&self, child: &Element) {
        self.node.append_child(&child.node);
    }
}

impl std::ops::Deref for Element {
    type Target = Node;

    fn deref(&self) -> &Self::Target {
        &self.node
    }
}
