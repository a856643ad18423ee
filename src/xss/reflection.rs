// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Classification of how a stored value comes back in a page

use serde::{Deserialize, Serialize};

use crate::dom::Document;

/// How a payload appears in a rendered page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reflection {
    /// Markup present verbatim: the page is vulnerable
    Unescaped,
    /// Only an HTML-escaped form is present
    Escaped,
    /// Not found at all
    Absent,
}

impl Reflection {
    /// Classify a raw page source for `payload`
    ///
    /// A payload without markup characters reads the same escaped or not
    /// and classifies as `Unescaped` whenever it is present.
    pub fn classify(source: &str, payload: &str) -> Self {
        if payload.is_empty() {
            return Reflection::Absent;
        }
        if source.contains(payload) {
            return Reflection::Unescaped;
        }
        if escaped_forms(payload).iter().any(|form| source.contains(form.as_str())) {
            return Reflection::Escaped;
        }
        Reflection::Absent
    }

    pub fn is_vulnerable(&self) -> bool {
        matches!(self, Reflection::Unescaped)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Reflection::Unescaped => "unescaped",
            Reflection::Escaped => "escaped",
            Reflection::Absent => "absent",
        }
    }
}

impl std::fmt::Display for Reflection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Escaped renderings produced by common output encoders
fn escaped_forms(payload: &str) -> Vec<String> {
    let base = payload
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    let quoted = base.replace('"', "&quot;");
    let mut forms = vec![
        quoted.replace('\'', "&#039;"),
        quoted.replace('\'', "&#39;"),
        quoted.replace('\'', "&apos;"),
        quoted,
        base,
    ];
    forms.dedup();
    forms
}

/// True when an inline script of the parsed page carries `marker`
pub fn script_injected(document: &Document, marker: &str) -> bool {
    !marker.is_empty() && document.scripts().iter().any(|s| s.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    const PAYLOAD: &str = "<script>alert('x1')</script>";

    #[test]
    fn test_classify() {
        let raw = format!("<td>{}</td>", PAYLOAD);
        assert_eq!(Reflection::classify(&raw, PAYLOAD), Reflection::Unescaped);

        let escaped = "<td>&lt;script&gt;alert(&#039;x1&#039;)&lt;/script&gt;</td>";
        assert_eq!(Reflection::classify(escaped, PAYLOAD), Reflection::Escaped);

        let partly = "<td>&lt;script&gt;alert('x1')&lt;/script&gt;</td>";
        assert_eq!(Reflection::classify(partly, PAYLOAD), Reflection::Escaped);

        assert_eq!(Reflection::classify("<td>semester</td>", PAYLOAD), Reflection::Absent);
        assert_eq!(Reflection::classify("anything", ""), Reflection::Absent);
    }

    #[test]
    fn test_script_injected() {
        let doc = parse_html(&format!("<table><tr><td>{}</td></tr></table>", PAYLOAD)).unwrap();
        assert!(script_injected(&doc, "x1"));
        assert!(!script_injected(&doc, "x2"));

        let doc = parse_html("<td>&lt;script&gt;alert('x1')&lt;/script&gt;</td>").unwrap();
        assert!(!script_injected(&doc, "x1"));
    }
}
