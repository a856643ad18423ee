// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Field list of a raw restoration POST

use reqwest::Method;
use url::Url;

use super::session::SessionCredential;
use crate::error::{Error, Result};
use crate::fixture::{EntityKind, RestorePath};
use crate::http::{headers, Request};

/// Ordered form fields that put one entity back to its seeded state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestorationRequest {
    entity: EntityKind,
    fields: Vec<(String, String)>,
}

impl RestorationRequest {
    /// Build the request from the entity's contract
    pub fn for_entity(kind: EntityKind) -> Result<Self> {
        let contract = kind.contract();
        if contract.canonical.is_none() {
            return Err(Error::UnsupportedRestoration {
                entity: kind,
                reason: "no canonical values are known".to_string(),
            });
        }
        match contract.restore {
            RestorePath::RawPost(fields) => Ok(Self {
                entity: kind,
                fields: fields
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
            }),
            RestorePath::UiReplay => Err(Error::UnsupportedRestoration {
                entity: kind,
                reason: "restored by replaying the edit form".to_string(),
            }),
        }
    }

    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// urlencoded body, fields in contract order
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.fields.iter())
            .finish()
    }

    /// HTTP request carrying the session explicitly in the Cookie header
    pub fn to_http(&self, url: Url, credential: &SessionCredential) -> Request {
        Request::from_url(Method::POST, url)
            .header(headers::COOKIE, credential.header_value())
            .form(&self.fields)
    }
}
