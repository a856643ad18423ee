// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Session credential extraction
//!
//! After a browser-driven login the session lives in the driver's cookie
//! state. The credential is looked up by name; cookie order is never
//! relied on.

use std::fmt;

use crate::browser::UiDriver;
use crate::error::{Error, Result};
use crate::http::Cookie;

/// Session cookie name used by the application
pub const SESSION_COOKIE: &str = "PHPSESSID";

/// Characters of the value shown in logs
const VISIBLE_PREFIX: usize = 4;

/// The cookie that authenticates an out-of-band request
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential {
    name: String,
    value: String,
}

impl SessionCredential {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Pick the `expected` cookie out of a cookie list
    pub fn extract(cookies: &[Cookie], expected: &str) -> Result<Self> {
        if cookies.is_empty() {
            return Err(Error::session(expected, "the browser session holds no cookies"));
        }

        let cookie = cookies.iter().find(|c| c.name == expected).ok_or_else(|| {
            let present: Vec<&str> = cookies.iter().map(|c| c.name.as_str()).collect();
            Error::session(
                expected,
                format!("cookie not present (session holds: {})", present.join(", ")),
            )
        })?;

        let credential = Self::new(cookie.name.clone(), cookie.value.clone());
        credential.validate(expected)?;
        tracing::debug!(session = %credential.masked(), "Session credential extracted");
        Ok(credential)
    }

    /// Extract the credential from a driver's current cookies
    pub fn from_driver<D: UiDriver + ?Sized>(driver: &D, expected: &str) -> Result<Self> {
        Self::extract(&driver.current_cookies(), expected)
    }

    /// Check name and value before the credential is used
    pub fn validate(&self, expected: &str) -> Result<()> {
        if self.name != expected {
            return Err(Error::session(
                expected,
                format!("credential is named '{}'", self.name),
            ));
        }
        if self.value.trim().is_empty() {
            return Err(Error::session(expected, "credential value is empty"));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// `name=value` as sent in the Cookie header
    pub fn header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    /// Log-safe rendering
    pub fn masked(&self) -> String {
        let prefix: String = self.value.chars().take(VISIBLE_PREFIX).collect();
        format!("{}={}***", self.name, prefix)
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredential")
            .field("name", &self.name)
            .field("value", &"***")
            .finish()
    }
}
