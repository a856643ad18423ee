// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Browser emulation for driving the application UI
//!
//! A page-at-a-time tester with form handling and inline handlers run on
//! the JavaScript runtime, enough to replay the admin flows.

mod config;
mod driver;
mod form;
mod tester;

pub use config::DriverConfig;
pub use driver::UiDriver;
pub use form::{Form, FormField};
pub use tester::{Page, WebTester};
