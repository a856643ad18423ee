// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response type

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use url::Url;

/// HTTP response representation
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Final URL (after redirects)
    pub url: Url,
    pub response_time_ms: u64,
}

impl Response {
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
        url: Url,
        response_time_ms: u64,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            url,
            response_time_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Body as text, lossy conversion
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Whether the body should be treated as a document
    ///
    /// Old PHP installs often omit the content type, so a missing one
    /// counts as HTML.
    pub fn is_document(&self) -> bool {
        match self.content_type() {
            None => true,
            Some(ct) => {
                let ct = ct.to_ascii_lowercase();
                ct.contains("text/html") || ct.contains("application/xhtml") || ct.starts_with("text/plain")
            }
        }
    }

    pub fn body_len(&self) -> usize {
        self.body.len()
    }
}
