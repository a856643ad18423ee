// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! JavaScript runtime using boa_engine
//!
//! Runs inline event handlers and `javascript:` links with the form-level
//! DOM bindings SchoolMate's navigation relies on.

mod dom_api;
mod runtime;
mod value;

pub use dom_api::{DomApiInstaller, DomBindings};
pub use runtime::{javascript_source, HandlerOutcome, JsRuntime, JsRuntimeConfig};
pub use value::JsValue;
