// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie jar for the emulated browser session

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use url::Url;

/// A single HTTP cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Host the cookie belongs to (empty = any host)
    pub domain: String,
    pub path: String,
    /// Expiration time (None = session cookie)
    pub expires: Option<DateTime<Utc>>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

/// SameSite cookie attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SameSite {
    #[default]
    None,
    Lax,
    Strict,
}

impl Cookie {
    /// Create a new cookie
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: "/".to_string(),
            expires: None,
            secure: false,
            http_only: false,
            same_site: SameSite::default(),
        }
    }

    /// Set the domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set expiration time
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn is_expired(&self) -> bool {
        self.expires.map_or(false, |exp| exp <= Utc::now())
    }

    /// Check if the cookie should be sent to the given URL
    pub fn matches(&self, url: &Url) -> bool {
        let host = url.host_str().unwrap_or("");
        self.domain_matches(host)
            && url.path().starts_with(&self.path)
            && !(self.secure && url.scheme() != "https")
            && !self.is_expired()
    }

    fn domain_matches(&self, host: &str) -> bool {
        if self.domain.is_empty() {
            return true;
        }
        let domain = self.domain.trim_start_matches('.');
        host.eq_ignore_ascii_case(domain) || host.ends_with(&format!(".{}", domain))
    }

    /// Parse a Set-Cookie header value
    pub fn parse(header: &str, url: &Url) -> Option<Self> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.trim().split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = Cookie::new(name, value.trim().trim_matches('"'));
        cookie.domain = url.host_str().unwrap_or("").to_string();

        for part in parts {
            let part = part.trim();
            match part.split_once('=') {
                Some((attr, val)) => {
                    let val = val.trim();
                    match attr.trim().to_ascii_lowercase().as_str() {
                        "domain" if !val.is_empty() => {
                            cookie.domain = val.trim_start_matches('.').to_string()
                        }
                        "path" if val.starts_with('/') => cookie.path = val.to_string(),
                        "expires" => {
                            if let Ok(dt) = DateTime::parse_from_rfc2822(val) {
                                cookie.expires = Some(dt.with_timezone(&Utc));
                            }
                        }
                        // Max-Age wins over Expires regardless of order
                        "max-age" => {
                            if let Ok(secs) = val.parse::<i64>() {
                                cookie.expires = Some(Utc::now() + chrono::Duration::seconds(secs));
                            }
                        }
                        "samesite" => {
                            cookie.same_site = match val.to_ascii_lowercase().as_str() {
                                "strict" => SameSite::Strict,
                                "lax" => SameSite::Lax,
                                _ => SameSite::None,
                            };
                        }
                        _ => {}
                    }
                }
                None => match part.to_ascii_lowercase().as_str() {
                    "secure" => cookie.secure = true,
                    "httponly" => cookie.http_only = true,
                    _ => {}
                },
            }
        }

        Some(cookie)
    }

    /// Cookie header fragment ("name=value")
    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

#[derive(Debug, Clone)]
struct StoredCookie {
    seq: u64,
    cookie: Cookie,
}

/// Thread-safe cookie storage, keyed by domain
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Arc<DashMap<String, Vec<StoredCookie>>>,
    seq: Arc<AtomicU64>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a cookie (same name, domain and path)
    ///
    /// A cookie that arrives already expired deletes its stored twin,
    /// which is how servers clear sessions.
    pub fn add(&self, cookie: Cookie) {
        let mut entry = self.cookies.entry(cookie.domain.clone()).or_default();
        entry.retain(|c| c.cookie.name != cookie.name || c.cookie.path != cookie.path);
        if !cookie.is_expired() {
            let seq = self.seq.fetch_add(1, Ordering::Relaxed);
            entry.push(StoredCookie { seq, cookie });
        }
    }

    /// Add a cookie from a Set-Cookie header
    pub fn add_from_header(&self, header: &str, url: &Url) {
        match Cookie::parse(header, url) {
            Some(cookie) => self.add(cookie),
            None => tracing::debug!(header = %header, "Ignoring malformed Set-Cookie"),
        }
    }

    /// Cookies applicable to a URL, in the order they were set
    pub fn get_cookies(&self, url: &Url) -> Vec<Cookie> {
        let mut matching: Vec<StoredCookie> = self
            .cookies
            .iter()
            .flat_map(|e| e.value().clone())
            .filter(|c| c.cookie.matches(url))
            .collect();
        matching.sort_by_key(|c| c.seq);
        matching.into_iter().map(|c| c.cookie).collect()
    }

    /// Look up a cookie for a URL by name
    pub fn get(&self, url: &Url, name: &str) -> Option<Cookie> {
        self.get_cookies(url).into_iter().find(|c| c.name == name)
    }

    /// Cookie header value for a URL
    pub fn get_cookie_header(&self, url: &Url) -> Option<String> {
        let cookies = self.get_cookies(url);
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(Cookie::to_header_value)
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Remove a specific cookie
    pub fn remove(&self, name: &str, domain: &str, path: &str) {
        if let Some(mut cookies) = self.cookies.get_mut(domain) {
            cookies.retain(|c| c.cookie.name != name || c.cookie.path != path);
        }
    }

    pub fn clear(&self) {
        self.cookies.clear();
    }

    /// Total cookie count, expired ones included until next lookup
    pub fn len(&self) -> usize {
        self.cookies.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
