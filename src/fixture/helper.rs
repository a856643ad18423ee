// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! High-level SchoolMate operations
//!
//! Every edit starts from a fresh admin login and walks the same menu the
//! seeded contracts describe. Cleanup either replays the edit with the
//! seeded values or, for records whose edit page the payload breaks, goes
//! through the session restorer.

use super::entity::{EntityContract, EntityKind, Navigation, RestorePath};
use crate::browser::WebTester;
use crate::config::{Environment, Role, ENTRY_SCRIPT};
use crate::error::{Error, Result};
use crate::restore::{RestorationReport, SessionCredential, SessionRestorer, SESSION_COOKIE};

/// Name of the selection checkboxes on the manage pages
const SELECT_CHECKBOX: &str = "delete[]";

/// How a record was put back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The edit form was submitted again with the seeded values
    Replayed,
    /// A raw authenticated POST restored the record
    Posted(RestorationReport),
}

/// Driver for the SchoolMate admin UI
#[derive(Debug)]
pub struct SchoolMate {
    environment: Environment,
    tester: WebTester,
    restorer: SessionRestorer,
}

impl SchoolMate {
    /// Create a helper with a fresh browser session
    pub fn new(environment: Environment) -> Result<Self> {
        let tester = WebTester::for_environment(&environment)?;
        Self::with_tester(environment, tester)
    }

    /// Create a helper around an existing browser session
    pub fn with_tester(environment: Environment, tester: WebTester) -> Result<Self> {
        let restorer = SessionRestorer::for_environment(&environment)?;
        Ok(Self {
            environment,
            tester,
            restorer,
        })
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn tester(&self) -> &WebTester {
        &self.tester
    }

    pub fn tester_mut(&mut self) -> &mut WebTester {
        &mut self.tester
    }

    /// Log in from the home page
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        self.tester.begin_at(ENTRY_SCRIPT).await?;
        self.tester.set_text_field("username", username)?;
        self.tester.set_text_field("password", password)?;
        self.tester.submit().await?;
        tracing::debug!(username = %username, "Logged in");
        Ok(())
    }

    pub async fn login_as(&mut self, role: Role) -> Result<()> {
        let credentials = self.environment.credentials(role).clone();
        self.login(&credentials.username, &credentials.password).await
    }

    pub async fn login_as_admin(&mut self) -> Result<()> {
        self.login_as(Role::Admin).await
    }

    pub async fn login_as_teacher(&mut self) -> Result<()> {
        self.login_as(Role::Teacher).await
    }

    pub async fn login_as_student(&mut self) -> Result<()> {
        self.login_as(Role::Student).await
    }

    pub async fn login_as_parent(&mut self) -> Result<()> {
        self.login_as(Role::Parent).await
    }

    /// Credential of the current session
    pub fn session_cookie(&self) -> Result<SessionCredential> {
        SessionCredential::from_driver(&self.tester, SESSION_COOKIE)
    }

    /// Append a plain submit button to a form, bypassing its validation
    pub fn add_submit_button(&mut self, form_name: &str) -> Result<()> {
        self.tester.add_submit_button(form_name)
    }

    /// Log in as admin and open the entity's manage page
    pub async fn open_manage_page(&mut self, kind: EntityKind) -> Result<()> {
        let navigation = kind.contract().navigation;
        self.login_as_admin().await?;
        self.tester.click_link_with_text(navigation.menu_link()).await?;
        self.tester.assert_match(navigation.heading())
    }

    /// Open the edit form of the entity's fixture record
    pub async fn go_to_edit(&mut self, kind: EntityKind) -> Result<()> {
        self.open_manage_page(kind).await?;
        if let Navigation::List {
            list_form,
            checkbox_value,
            edit_button,
            ..
        } = kind.contract().navigation
        {
            self.tester.set_working_form(list_form)?;
            self.tester.check_checkbox(SELECT_CHECKBOX, checkbox_value)?;
            self.tester.click_button_with_text(edit_button).await?;
        }
        Ok(())
    }

    /// Overwrite the record's editable fields, in contract order
    pub async fn edit(&mut self, kind: EntityKind, values: &[&str]) -> Result<()> {
        let contract = kind.contract();
        contract.check_values(values)?;
        self.go_to_edit(kind).await?;
        self.fill_edit_form(contract, values).await?;
        tracing::info!(entity = %kind, fields = values.len(), "Fixture edited");
        Ok(())
    }

    async fn fill_edit_form(&mut self, contract: &EntityContract, values: &[&str]) -> Result<()> {
        self.tester.set_working_form(contract.edit_form)?;
        for (field, value) in contract.fields.iter().zip(values) {
            self.tester.set_text_field(field, value)?;
        }
        self.tester.click_button_with_text(contract.submit_button).await
    }

    /// Title holds at most 15 characters
    pub async fn edit_test_semester(&mut self, title: &str) -> Result<()> {
        self.edit(EntityKind::Semester, &[title]).await
    }

    pub async fn edit_test_parent(&mut self, first_name: &str, last_name: &str) -> Result<()> {
        self.edit(EntityKind::Parent, &[first_name, last_name]).await
    }

    pub async fn edit_test_student(&mut self, fname: &str, mi: &str, lname: &str) -> Result<()> {
        self.edit(EntityKind::Student, &[fname, mi, lname]).await
    }

    /// Edits teacher #1
    pub async fn edit_test_teacher(&mut self, fname: &str, lname: &str) -> Result<()> {
        self.edit(EntityKind::Teacher, &[fname, lname]).await
    }

    /// Edits user #2; the password is typed twice
    pub async fn edit_test_user(&mut self, username: &str, password: &str) -> Result<()> {
        self.edit(EntityKind::User, &[username, password, password]).await
    }

    pub async fn edit_test_announcement(&mut self, title: &str, message: &str) -> Result<()> {
        self.edit(EntityKind::Announcement, &[title, message]).await
    }

    /// Put the record back to its seeded values
    pub async fn cleanup(&mut self, kind: EntityKind) -> Result<CleanupOutcome> {
        let contract = kind.contract();
        match contract.restore {
            RestorePath::UiReplay => {
                let values = contract.canonical.ok_or_else(|| Error::UnsupportedRestoration {
                    entity: kind,
                    reason: "no canonical values are known".to_string(),
                })?;
                self.edit(kind, values).await?;
                Ok(CleanupOutcome::Replayed)
            }
            RestorePath::RawPost(_) => {
                self.login_as_admin().await?;
                let report = self.restorer.restore(&self.tester, kind).await?;
                Ok(CleanupOutcome::Posted(report))
            }
        }
    }

    pub async fn cleanup_test_semester(&mut self) -> Result<CleanupOutcome> {
        self.cleanup(EntityKind::Semester).await
    }

    pub async fn cleanup_test_parent(&mut self) -> Result<CleanupOutcome> {
        self.cleanup(EntityKind::Parent).await
    }

    pub async fn cleanup_student_test_user(&mut self) -> Result<CleanupOutcome> {
        self.cleanup(EntityKind::Student).await
    }

    pub async fn cleanup_test_teacher(&mut self) -> Result<CleanupOutcome> {
        self.cleanup(EntityKind::Teacher).await
    }

    pub async fn cleanup_test_user(&mut self) -> Result<CleanupOutcome> {
        self.cleanup(EntityKind::User).await
    }

    /// Read the record's editable fields back from its edit form
    pub async fn read_fields(&mut self, kind: EntityKind) -> Result<Vec<(String, String)>> {
        let contract = kind.contract();
        self.go_to_edit(kind).await?;
        self.tester.set_working_form(contract.edit_form)?;
        contract
            .fields
            .iter()
            .map(|field| Ok((field.to_string(), self.tester.field_value(field)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::fake::FakeSchoolMate;
    use crate::http::{headers, HttpClient, HttpClientConfig, Request};

    #[tokio::test]
    async fn test_login_yields_session_cookie() {
        let app = FakeSchoolMate::start().await;
        let mut helper = SchoolMate::new(app.environment()).unwrap();

        assert!(helper.session_cookie().unwrap_err().is_session_error());
        helper.login_as_admin().await.unwrap();

        let credential = helper.session_cookie().unwrap();
        assert_eq!(credential.name(), SESSION_COOKIE);
        assert!(app.is_active(credential.value()));
    }

    #[tokio::test]
    async fn test_wrong_password_has_no_session() {
        let app = FakeSchoolMate::start().await;
        let mut helper = SchoolMate::new(app.environment()).unwrap();

        helper.login("test", "nope").await.unwrap();
        helper.tester().assert_text_present("Invalid").unwrap();
        assert!(helper.session_cookie().is_err());
    }

    #[tokio::test]
    async fn test_edit_and_replay_cleanup() {
        let app = FakeSchoolMate::start().await;
        let mut helper = SchoolMate::new(app.environment()).unwrap();

        helper.edit_test_parent("<b>x</b>", "y").await.unwrap();
        assert_eq!(app.record(EntityKind::Parent), vec!["<b>x</b>", "y"]);

        let outcome = helper.cleanup_test_parent().await.unwrap();
        assert_eq!(outcome, CleanupOutcome::Replayed);
        assert_eq!(app.record(EntityKind::Parent), vec!["parent", "parent"]);
    }

    #[tokio::test]
    async fn test_user_edit_selects_record_two() {
        let app = FakeSchoolMate::start().await;
        let mut helper = SchoolMate::new(app.environment()).unwrap();

        helper.edit_test_user("admin2", "secret").await.unwrap();
        assert_eq!(app.record(EntityKind::User), vec!["admin2", "secret", "secret"]);
        assert_eq!(app.last_selected(), Some("2".to_string()));

        helper.cleanup_test_user().await.unwrap();
        assert_eq!(
            helper.read_fields(EntityKind::User).await.unwrap(),
            vec![
                ("username".to_string(), "teacher".to_string()),
                ("password".to_string(), "teacher".to_string()),
                ("password2".to_string(), "teacher".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_student_cleanup_goes_out_of_band() {
        let app = FakeSchoolMate::start().await;
        let mut helper = SchoolMate::new(app.environment()).unwrap();

        helper.edit_test_student("a", "b", "c").await.unwrap();
        assert_eq!(app.record(EntityKind::Student), vec!["a", "b", "c"]);

        let outcome = helper.cleanup_student_test_user().await.unwrap();
        let CleanupOutcome::Posted(report) = outcome else {
            panic!("student cleanup must use the raw POST");
        };
        assert_eq!(report.status, 200);
        assert_eq!(app.record(EntityKind::Student), vec!["name", "s", "surname"]);
    }

    #[tokio::test]
    async fn test_restoration_is_idempotent() {
        let app = FakeSchoolMate::start().await;
        let mut helper = SchoolMate::new(app.environment()).unwrap();

        for _ in 0..2 {
            helper.cleanup_student_test_user().await.unwrap();
            assert_eq!(app.record(EntityKind::Student), vec!["name", "s", "surname"]);
        }
        // each restoration logs in afresh and ends its own session
        assert_eq!(app.ended_sessions().len(), 2);
    }

    #[tokio::test]
    async fn test_restoration_credential_is_dead_afterwards() {
        let app = FakeSchoolMate::start().await;
        let mut helper = SchoolMate::new(app.environment()).unwrap();

        helper.cleanup_student_test_user().await.unwrap();
        let spent = helper.session_cookie().unwrap();
        assert!(!app.is_active(spent.value()));

        // a privileged edit replayed on the same credential is refused
        let client = HttpClient::with_config(HttpClientConfig::without_cookies()).unwrap();
        let request = Request::post(format!("{}/index.php", app.uri()))
            .unwrap()
            .header(headers::COOKIE, spent.header_value())
            .form(&[
                ("fname", "hijacked"),
                ("mi", "x"),
                ("lname", "hijacked"),
                ("editstudent", "1"),
                ("studentid", "1"),
                ("page", "1"),
                ("page2", "2"),
            ]);
        let response = client.execute(request).await.unwrap();

        assert_eq!(response.status_code(), 200);
        assert!(response.text_lossy().contains("Please log in"));
        assert_eq!(app.record(EntityKind::Student), vec!["name", "s", "surname"]);
    }

    #[tokio::test]
    async fn test_value_count_checked_before_navigation() {
        let app = FakeSchoolMate::start().await;
        let mut helper = SchoolMate::new(app.environment()).unwrap();

        let err = helper.edit(EntityKind::Parent, &["only-one"]).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(app.request_count(), 0);
    }

    #[tokio::test]
    async fn test_cleanup_without_canonical_values() {
        let app = FakeSchoolMate::start().await;
        let mut helper = SchoolMate::new(app.environment()).unwrap();

        let err = helper.cleanup(EntityKind::Announcement).await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedRestoration { .. }));
    }
}
