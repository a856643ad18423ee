// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Stored XSS scenario runner
//!
//! One run stores a payload in a fixture record, checks how the manage
//! page renders it, and always puts the record back before returning.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::fixture::{self, CleanupOutcome, EntityKind, SchoolMate};
use crate::restore::RestorationReport;
use crate::xss::{script_injected, Reflection, StoredPayload};

/// What a scenario observed
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub entity: EntityKind,
    pub field: String,
    pub payload: String,
    pub reflection: Reflection,
    /// The page carries an inline script with the marker
    pub script_injected: bool,
    /// Set when the record was restored out of band
    pub restoration: Option<RestorationReport>,
    /// Fields read back after restoration
    pub verified: Vec<(String, String)>,
}

impl ScenarioReport {
    pub fn is_vulnerable(&self) -> bool {
        self.reflection.is_vulnerable()
    }
}

/// Corrupt, confirm, restore, verify
#[derive(Debug, Clone)]
pub struct StoredXssScenario {
    entity: EntityKind,
    field: &'static str,
    payload: String,
    marker: Option<String>,
}

impl StoredXssScenario {
    /// Store `payload` in the entity's first editable field
    pub fn new(entity: EntityKind, payload: impl Into<String>) -> Self {
        Self {
            entity,
            field: entity.contract().fields.first().copied().unwrap_or_default(),
            payload: payload.into(),
            marker: None,
        }
    }

    /// Build the payload, fitted to the entity's length budget
    pub fn with_payload(entity: EntityKind, payload: &StoredPayload) -> Result<Self> {
        let built = payload.clone().for_entity(entity).build()?;
        let mut scenario = Self::new(entity, built);
        scenario.marker = Some(payload.marker().to_string());
        Ok(scenario)
    }

    /// Target another editable field
    pub fn field(mut self, name: &str) -> Result<Self> {
        self.field = self
            .entity
            .contract()
            .fields
            .iter()
            .copied()
            .find(|f| *f == name)
            .ok_or_else(|| Error::config(format!("{} has no field '{}'", self.entity, name)))?;
        Ok(self)
    }

    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub async fn run(&self, helper: &mut SchoolMate) -> Result<ScenarioReport> {
        let contract = self.entity.contract();
        let canonical = contract.canonical.ok_or_else(|| Error::UnsupportedRestoration {
            entity: self.entity,
            reason: "no canonical values to restore after the probe".to_string(),
        })?;

        let _guard = fixture::lock(self.entity).await;
        tracing::info!(entity = %self.entity, field = %self.field, "Running stored XSS scenario");

        let values: Vec<&str> = contract
            .fields
            .iter()
            .zip(canonical)
            .map(|(name, value)| {
                if *name == self.field {
                    self.payload.as_str()
                } else {
                    *value
                }
            })
            .collect();

        let confirmation = self.confirm(helper, &values).await;
        let cleanup = helper.cleanup(self.entity).await;

        let ((reflection, injected), outcome) = match (confirmation, cleanup) {
            (Ok(confirmed), Ok(outcome)) => (confirmed, outcome),
            (Err(e), Ok(_)) => return Err(e),
            (Ok(_), Err(e)) => return Err(e),
            // a record left corrupted outranks the failed confirmation
            (Err(e), Err(cleanup)) => {
                tracing::warn!(entity = %self.entity, error = %e, "Confirmation failed before cleanup");
                return Err(cleanup);
            }
        };

        let verified = helper.read_fields(self.entity).await?;
        for ((name, actual), expected) in verified.iter().zip(canonical) {
            if actual != expected {
                let url = helper
                    .tester()
                    .current_url()
                    .map(|u| u.to_string())
                    .unwrap_or_default();
                return Err(Error::assertion(format!("{}={}", name, expected), url));
            }
        }

        tracing::info!(
            entity = %self.entity,
            reflection = %reflection,
            script_injected = injected,
            "Scenario finished"
        );

        Ok(ScenarioReport {
            entity: self.entity,
            field: self.field.to_string(),
            payload: self.payload.clone(),
            reflection,
            script_injected: injected,
            restoration: match outcome {
                CleanupOutcome::Posted(report) => Some(report),
                CleanupOutcome::Replayed => None,
            },
            verified,
        })
    }

    async fn confirm(&self, helper: &mut SchoolMate, values: &[&str]) -> Result<(Reflection, bool)> {
        helper.edit(self.entity, values).await?;
        helper.open_manage_page(self.entity).await?;

        let source = helper.tester().page_source()?;
        let reflection = Reflection::classify(source, &self.payload);
        let needle = self.marker.as_deref().unwrap_or(&self.payload);
        let injected = script_injected(helper.tester().document()?, needle);
        tracing::debug!(entity = %self.entity, reflection = %reflection, "Payload classified");
        Ok((reflection, injected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::fake::FakeSchoolMate;
    use crate::xss::PayloadKind;

    #[tokio::test]
    async fn test_student_payload_confirmed_and_restored() {
        let app = FakeSchoolMate::start().await;
        let mut helper = SchoolMate::new(app.environment()).unwrap();

        let payload = StoredPayload::new("st1").kind(PayloadKind::ScriptTag);
        let scenario = StoredXssScenario::with_payload(EntityKind::Student, &payload).unwrap();
        let report = scenario.run(&mut helper).await.unwrap();

        assert_eq!(report.field, "fname");
        assert_eq!(report.payload, "<script>alert('st1')</script>");
        assert_eq!(report.reflection, Reflection::Unescaped);
        assert!(report.script_injected);
        assert!(report.is_vulnerable());

        let restoration = report.restoration.expect("student is restored out of band");
        assert_eq!(restoration.status, 200);
        assert_eq!(restoration.fields.last().map(String::as_str), Some("logout"));

        let verified: Vec<&str> = report.verified.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(verified, vec!["name", "s", "surname"]);
        assert_eq!(app.record(EntityKind::Student), vec!["name", "s", "surname"]);

        // the restoration POST ended the session it borrowed
        let ended = app.ended_sessions();
        assert_eq!(ended.len(), 1);
        assert!(!app.is_active(&ended[0]));
    }

    #[tokio::test]
    async fn test_escaping_app_is_not_vulnerable() {
        let app = FakeSchoolMate::start_escaping().await;
        let mut helper = SchoolMate::new(app.environment()).unwrap();

        let payload = StoredPayload::new("s2");
        let scenario = StoredXssScenario::with_payload(EntityKind::Semester, &payload).unwrap();
        assert_eq!(scenario.payload(), "<b>s2</b>");

        let report = scenario.run(&mut helper).await.unwrap();
        assert_eq!(report.reflection, Reflection::Escaped);
        assert!(!report.script_injected);
        assert!(report.restoration.is_none());
        assert_eq!(app.record(EntityKind::Semester), vec!["semester"]);
    }

    #[tokio::test]
    async fn test_second_field_keeps_canonical_first() {
        let app = FakeSchoolMate::start().await;
        let mut helper = SchoolMate::new(app.environment()).unwrap();

        let scenario = StoredXssScenario::new(EntityKind::Parent, "<i>p</i>")
            .field("lname")
            .unwrap();
        let report = scenario.run(&mut helper).await.unwrap();
        assert_eq!(report.reflection, Reflection::Unescaped);
        assert!(!report.script_injected);
        assert_eq!(app.record(EntityKind::Parent), vec!["parent", "parent"]);

        assert!(StoredXssScenario::new(EntityKind::Parent, "x").field("mi").is_err());
    }

    #[tokio::test]
    async fn test_failed_probe_still_restores() {
        let app = FakeSchoolMate::start().await;
        let mut helper = SchoolMate::new(app.environment()).unwrap();
        app.fail_next_save();

        let err = StoredXssScenario::new(EntityKind::Parent, "<b>p</b>")
            .run(&mut helper)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(500));
        assert!(!err.is_restoration_failure());
        assert_eq!(app.record(EntityKind::Parent), vec!["parent", "parent"]);
    }

    #[tokio::test]
    async fn test_failed_restoration_is_reported_over_failed_edit() {
        let app = FakeSchoolMate::start().await;
        let mut helper = SchoolMate::new(app.environment()).unwrap();
        // the edit and the raw restoration POST both answer 500
        app.fail_saves(2);

        let err = StoredXssScenario::new(EntityKind::Student, "<b>s</b>")
            .run(&mut helper)
            .await
            .unwrap_err();
        assert!(err.is_restoration_failure());
        assert_eq!(err.status_code(), Some(500));
        assert!(matches!(
            err,
            Error::RestorationFailed {
                entity: EntityKind::Student,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_entity_without_seed_is_refused() {
        let app = FakeSchoolMate::start().await;
        let mut helper = SchoolMate::new(app.environment()).unwrap();

        let err = StoredXssScenario::new(EntityKind::Announcement, "<b>a</b>")
            .run(&mut helper)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedRestoration { .. }));
        assert_eq!(app.request_count(), 0);
    }
}
