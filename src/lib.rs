// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # SchoolMate stored XSS harness
//!
//! Drives the SchoolMate PHP application through a lightweight browser
//! emulation, stores XSS payloads in its seeded fixture records, confirms
//! whether they come back unescaped, and restores the records afterwards.
//!
//! ## Features
//!
//! - Browser emulation: cookie jar, form submission, inline handlers on boa
//! - Fixture contracts: navigation, fields and seeded values per entity
//! - Session-authenticated restoration: raw POST with the login's cookie
//! - Reflection classification: unescaped, escaped or absent
//! - Per-entity locks so scenarios never share a record
//!
//! ## Example
//!
//! ```rust,no_run
//! use schoolmate_xss::{EntityKind, Environment, SchoolMate, StoredPayload, StoredXssScenario};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut helper = SchoolMate::new(Environment::load()?)?;
//!
//!     let payload = StoredPayload::with_random_marker();
//!     let report = StoredXssScenario::with_payload(EntityKind::Student, &payload)?
//!         .run(&mut helper)
//!         .await?;
//!
//!     println!("{}: {}", report.entity, report.reflection);
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod config;
pub mod dom;
pub mod error;
pub mod fixture;
pub mod http;
pub mod js;
pub mod restore;
pub mod scenario;
pub mod xss;

// Re-exports for convenience

// Browser emulation
pub use browser::{DriverConfig, Form, FormField, UiDriver, WebTester};

// Configuration
pub use config::{Credentials, Environment, Role};

// DOM
pub use dom::{Document, Element, Node};

// Errors
pub use error::{Error, Result};

// Fixtures
pub use fixture::{CleanupOutcome, EntityContract, EntityKind, FixtureGuard, SchoolMate};

// HTTP
pub use http::{Cookie, CookieJar, HttpClient, Request, Response};

// JavaScript
pub use js::{HandlerOutcome, JsRuntime, JsRuntimeConfig};

// Restoration
pub use restore::{
    RestorationReport, RestorationRequest, SessionCredential, SessionRestorer, SESSION_COOKIE,
};

// Scenarios
pub use scenario::{ScenarioReport, StoredXssScenario};

// XSS
pub use xss::{PayloadKind, Reflection, StoredPayload};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
