// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP request type

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use url::form_urlencoded;
use url::Url;

use super::{headers, FORM_URLENCODED};
use crate::error::Result;

/// HTTP request representation
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    /// Per-request timeout (client default when None)
    pub timeout: Option<Duration>,
}

impl Request {
    /// Create a request with an arbitrary method
    pub fn new(method: Method, url: impl AsRef<str>) -> Result<Self> {
        Ok(Self::from_url(method, Url::parse(url.as_ref())?))
    }

    /// Create a request for an already parsed URL
    pub fn from_url(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// Create a new GET request
    pub fn get(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::GET, url)
    }

    /// Create a new POST request
    pub fn post(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::POST, url)
    }

    /// Set a header; invalid names or values are dropped
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        match (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::warn!(header = %name.as_ref(), "Dropping invalid request header"),
        }
        self
    }

    /// Set the request body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set an urlencoded form body, keeping field order and duplicates
    pub fn form<K, V>(self, fields: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let body = encode_form(fields);
        self.header(headers::CONTENT_TYPE, FORM_URLENCODED).body(body)
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Header value as string, if present and valid
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body as UTF-8 text (lossy)
    pub fn body_text(&self) -> String {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default()
    }
}

/// Encode name/value pairs as application/x-www-form-urlencoded
pub(crate) fn encode_form<K, V>(fields: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in fields {
        serializer.append_pair(name.as_ref(), value.as_ref());
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_body_keeps_order() {
        let req = Request::post("http://localhost:8000/index.php")
            .unwrap()
            .form(&[("fname", "a b"), ("delete[]", "1"), ("logout", "")]);

        assert_eq!(req.method, Method::POST);
        assert_eq!(req.header_str("content-type"), Some(FORM_URLENCODED));
        assert_eq!(req.body_text(), "fname=a+b&delete%5B%5D=1&logout=");
    }

    #[test]
    fn test_invalid_header_dropped() {
        let req = Request::get("http://localhost/")
            .unwrap()
            .header("cookie", "PHPSESSID=abc")
            .header("bad header", "x");
        assert_eq!(req.headers.len(), 1);
    }
}
