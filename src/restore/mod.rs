// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Out-of-band fixture restoration
//!
//! A stored payload can leave an edit page unusable, so cleanup cannot
//! always go through the UI. The restorer reuses the browser's session
//! cookie and posts the record's canonical fields directly:
//!
//! 1. extract the session credential from the driver by name
//! 2. build the entity's restoration field list
//! 3. POST it to the entry script with an explicit `Cookie` header
//!
//! Only a 200 counts as success. The trailing `logout` field ends the
//! session on the server.

mod request;
mod restorer;
mod session;

pub use request::RestorationRequest;
pub use restorer::{RestorationReport, SessionRestorer};
pub use session::{SessionCredential, SESSION_COOKIE};
