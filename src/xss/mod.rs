// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Stored XSS confirmation
//!
//! A probe stores a marker payload in a fixture field, reloads a page that
//! renders the field, and classifies what came back:
//! - verbatim markup means the output is not encoded
//! - an HTML-escaped copy means the field is handled safely
//! - nothing means the payload never reached the page

mod payloads;
mod reflection;

pub use payloads::{PayloadKind, StoredPayload};
pub use reflection::{script_injected, Reflection};
