// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP layer shared by the page driver and the restoration fallback
//!
//! The driver's client keeps cookies in its own jar; the restoration client
//! is built with cookie handling off and carries the session explicitly.

mod client;
mod cookie;
mod request;
mod response;

pub use client::{HttpClient, HttpClientConfig};
pub use cookie::{Cookie, CookieJar, SameSite};
pub use request::Request;
pub use response::Response;

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Content type of HTML form posts
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Common HTTP headers
pub mod headers {
    pub const ACCEPT: &str = "accept";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const COOKIE: &str = "cookie";
    pub const SET_COOKIE: &str = "set-cookie";
    pub const REFERER: &str = "referer";
}
