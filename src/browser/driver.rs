// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Browser-driving capability consumed by the fixture layer

use async_trait::async_trait;

use crate::error::Result;
use crate::http::Cookie;

/// What the harness needs from a browser session
///
/// The restoration fallback only reads [`UiDriver::current_cookies`]; the
/// other operations drive the application pages.
///
/// # Example
///
/// ```rust,no_run
/// use schoolmate_xss::browser::{UiDriver, WebTester};
///
/// # async fn run() -> schoolmate_xss::Result<()> {
/// let mut tester = WebTester::new("http://localhost:8000/")?;
/// tester.navigate("index.php").await?;
/// tester.fill_field("username", "test").await?;
/// tester.fill_field("password", "test").await?;
/// tester.click("Login").await?;
/// tester.assert_contains("Manage")?;
/// let cookies = tester.current_cookies();
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait UiDriver: Send {
    /// Load a page relative to the base URL
    async fn navigate(&mut self, path: &str) -> Result<()>;

    /// Set a field of the working form
    async fn fill_field(&mut self, name: &str, value: &str) -> Result<()>;

    /// Activate a link or button by its visible text, or a button by name
    async fn click(&mut self, label: &str) -> Result<()>;

    /// Fail unless the current page contains `text`
    fn assert_contains(&self, text: &str) -> Result<()>;

    /// Cookies the session would send to the base URL
    fn current_cookies(&self) -> Vec<Cookie>;
}
