// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page driver configuration

use std::time::Duration;

use crate::http::{HttpClientConfig, DEFAULT_USER_AGENT};
use crate::js::JsRuntimeConfig;

/// Configuration of the emulated browser session
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// User agent string
    pub user_agent: String,
    /// Timeout for a single page exchange
    pub timeout: Duration,
    /// Maximum redirects per navigation
    pub max_redirects: usize,
    /// Accept invalid TLS certificates
    pub ignore_https_errors: bool,
    /// Evaluate `javascript:` hrefs and onclick handlers
    pub handlers_enabled: bool,
    /// Limits and dialog answers for handler execution
    pub js_config: JsRuntimeConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_redirects: 10,
            ignore_https_errors: false,
            handlers_enabled: true,
            js_config: JsRuntimeConfig::default(),
        }
    }
}

impl DriverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Ignore HTTPS errors
    pub fn ignore_https_errors(mut self, ignore: bool) -> Self {
        self.ignore_https_errors = ignore;
        self
    }

    /// Enable/disable inline handler evaluation
    pub fn handlers_enabled(mut self, enabled: bool) -> Self {
        self.handlers_enabled = enabled;
        self
    }

    pub fn js_config(mut self, config: JsRuntimeConfig) -> Self {
        self.js_config = config;
        self
    }

    /// HTTP client settings for the driver's cookie-keeping client
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            user_agent: self.user_agent.clone(),
            timeout: self.timeout,
            max_redirects: self.max_redirects,
            accept_invalid_certs: self.ignore_https_errors,
            handle_cookies: true,
        }
    }
}
