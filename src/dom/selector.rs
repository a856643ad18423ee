// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! CSS selector subset for DOM queries
//!
//! Supports type, `#id`, `.class`, `[attr]`, `[attr=value]` (quoted or
//! bare), the descendant combinator and comma-separated groups.

use crate::error::{Error, Result};

use super::node::Node;

/// A parsed selector group
#[derive(Debug, Clone)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

/// Compound selectors joined by descendant combinators, rightmost last
#[derive(Debug, Clone)]
struct Complex {
    compounds: Vec<Compound>,
}

#[derive(Debug, Clone, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl Selector {
    /// Parse a selector string
    pub fn parse(selector: &str) -> Result<Self> {
        let invalid = |reason: &str| {
            Error::HtmlParse(format!("invalid selector '{}': {}", selector, reason))
        };

        let alternatives = split_outside_brackets(selector, ',')
            .into_iter()
            .map(|group| {
                let compounds = split_outside_brackets(&group, ' ')
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .map(|s| parse_compound(&s).map_err(|r| invalid(&r)))
                    .collect::<Result<Vec<_>>>()?;
                if compounds.is_empty() {
                    return Err(invalid("empty group"));
                }
                Ok(Complex { compounds })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { alternatives })
    }

    /// Check whether an element node matches
    pub fn matches(&self, node: &Node) -> bool {
        node.is_element() && self.alternatives.iter().any(|c| c.matches(node))
    }
}

impl Complex {
    fn matches(&self, node: &Node) -> bool {
        let Some((last, ancestors)) = self.compounds.split_last() else {
            return false;
        };
        if !last.matches(node) {
            return false;
        }
        // Greedy right-to-left ancestor walk is exact for descendant-only chains
        let mut remaining = ancestors.iter().rev().peekable();
        let mut current = node.parent();
        while let (Some(wanted), Some(candidate)) = (remaining.peek(), current.clone()) {
            if candidate.is_element() && wanted.matches(&candidate) {
                remaining.next();
            }
            current = candidate.parent();
        }
        remaining.peek().is_none()
    }
}

impl Compound {
    fn matches(&self, node: &Node) -> bool {
        if let Some(ref tag) = self.tag {
            if node.local_name().as_deref() != Some(tag.as_str()) {
                return false;
            }
        }
        if let Some(ref id) = self.id {
            if node.get_attribute("id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_attr = node.get_attribute("class").unwrap_or_default();
            let classes: Vec<&str> = class_attr.split_whitespace().collect();
            if !self.classes.iter().all(|c| classes.contains(&c.as_str())) {
                return false;
            }
        }
        self.attributes.iter().all(|(name, value)| match value {
            None => node.has_attribute(name),
            Some(v) => node.get_attribute(name).as_deref() == Some(v.as_str()),
        })
    }
}

fn parse_compound(input: &str) -> std::result::Result<Compound, String> {
    let mut compound = Compound::default();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    let read_ident = |start: usize| -> (String, usize) {
        let mut end = start;
        while end < chars.len() && (chars[end].is_alphanumeric() || matches!(chars[end], '-' | '_')) {
            end += 1;
        }
        (chars[start..end].iter().collect(), end)
    };

    while i < chars.len() {
        match chars[i] {
            '*' => i += 1,
            '#' => {
                let (ident, end) = read_ident(i + 1);
                if ident.is_empty() {
                    return Err("empty id".into());
                }
                compound.id = Some(ident);
                i = end;
            }
            '.' => {
                let (ident, end) = read_ident(i + 1);
                if ident.is_empty() {
                    return Err("empty class".into());
                }
                compound.classes.push(ident);
                i = end;
            }
            '[' => {
                let close = find_closing_bracket(&chars, i).ok_or("unclosed '['")?;
                let body: String = chars[i + 1..close].iter().collect();
                compound.attributes.push(parse_attribute(&body)?);
                i = close + 1;
            }
            c if c.is_alphanumeric() => {
                let (ident, end) = read_ident(i);
                compound.tag = Some(ident.to_ascii_lowercase());
                i = end;
            }
            c => return Err(format!("unsupported character '{}'", c)),
        }
    }

    Ok(compound)
}

fn parse_attribute(body: &str) -> std::result::Result<(String, Option<String>), String> {
    match body.split_once('=') {
        None => {
            let name = body.trim();
            if name.is_empty() {
                return Err("empty attribute".into());
            }
            Ok((name.to_ascii_lowercase(), None))
        }
        Some((name, value)) => {
            let name = name.trim();
            if name.is_empty() || name.ends_with(['~', '|', '^', '$', '*']) {
                return Err(format!("unsupported attribute test '{}'", body));
            }
            let value = value.trim();
            let unquoted = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            Ok((name.to_ascii_lowercase(), Some(unquoted.to_string())))
        }
    }
}

/// Index of the ']' closing the '[' at `open`, skipping quoted text
fn find_closing_bracket(chars: &[char], open: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (idx, &c) in chars.iter().enumerate().skip(open + 1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, ']') => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Split on a separator that is not inside brackets or quotes
fn split_outside_brackets(input: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in input.trim().chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, c) if c == sep && depth == 0 => {
                parts.push(std::mem::take(&mut current).trim().to_string());
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    parts.push(current.trim().to_string());
    parts
}
