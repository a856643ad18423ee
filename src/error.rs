// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the SchoolMate harness
//!
//! Every variant is fatal for the scenario that raised it. Nothing in the
//! crate retries: a restoration that cannot be trusted must fail loudly,
//! otherwise the corrupted fixture leaks into every later scenario.

use thiserror::Error;

use crate::fixture::EntityKind;

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    /// Network-level failure (connect, timeout, body read)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// No usable session credential after login
    #[error("Session extraction failed (expected cookie '{expected}'): {reason}")]
    SessionExtraction { expected: String, reason: String },

    /// The raw restoration POST did not return 200
    #[error("Restoration of {entity} failed: {url} returned status {status}")]
    RestorationFailed {
        entity: EntityKind,
        status: u16,
        url: String,
    },

    /// The entity kind cannot be restored through the raw fallback
    #[error("Restoration not supported for {entity}: {reason}")]
    UnsupportedRestoration { entity: EntityKind, reason: String },

    /// HTML parsing failed
    #[error("HTML parsing error: {0}")]
    HtmlParse(String),

    /// Element lookup failed on the current page
    #[error("{what} not found: {locator}")]
    ElementNotFound { what: &'static str, locator: String },

    /// An operation needed a loaded page
    #[error("No page loaded")]
    NoPage,

    /// A page load answered with an error status
    #[error("Unexpected status {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// Page content assertion failed
    #[error("Assertion failed: expected '{expected}' on {url}")]
    Assertion { expected: String, url: String },

    /// Form submission error
    #[error("Form submission failed: {reason}")]
    FormSubmission {
        reason: String,
        form: Option<String>,
        status: Option<u16>,
    },

    /// Script engine error
    #[error("JavaScript error: {0}")]
    Js(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a session extraction error
    pub fn session(expected: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::SessionExtraction {
            expected: expected.into(),
            reason: reason.into(),
        }
    }

    /// Create an element-not-found error
    pub fn not_found(what: &'static str, locator: impl Into<String>) -> Self {
        Error::ElementNotFound {
            what,
            locator: locator.into(),
        }
    }

    /// Create an assertion error
    pub fn assertion(expected: impl Into<String>, url: impl Into<String>) -> Self {
        Error::Assertion {
            expected: expected.into(),
            url: url.into(),
        }
    }

    /// Create a form submission error
    pub fn form_submission(reason: impl Into<String>) -> Self {
        Error::FormSubmission {
            reason: reason.into(),
            form: None,
            status: None,
        }
    }

    /// Create a configuration error
    pub fn js<S: Into<String>>(msg: S) -> Self {
        Error::Js(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Check if this is a network-level failure
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Check if this is a session credential failure
    pub fn is_session_error(&self) -> bool {
        matches!(self, Error::SessionExtraction { .. })
    }

    /// Check if this is a failed restoration
    pub fn is_restoration_failure(&self) -> bool {
        matches!(self, Error::RestorationFailed { .. })
    }

    /// Get HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::RestorationFailed { status, .. } => Some(*status),
            Error::UnexpectedStatus { status, .. } => Some(*status),
            Error::FormSubmission { status, .. } => *status,
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Get URL if available
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::RestorationFailed { url, .. } => Some(url),
            Error::UnexpectedStatus { url, .. } => Some(url),
            Error::Assertion { url, .. } => Some(url),
            _ => None,
        }
    }

    /// Attach the form name to a submission error
    pub fn with_form(mut self, name: impl Into<String>) -> Self {
        if let Error::FormSubmission { ref mut form, .. } = self {
            *form = Some(name.into());
        }
        self
    }
}
