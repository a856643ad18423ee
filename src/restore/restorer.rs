// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Session-authenticated restoration of fixture records
//!
//! The restorer borrows the session of a browser-driven login and replays
//! the entity's edit as one raw POST, bypassing the page that the stored
//! payload may have broken.

use std::time::Instant;

use serde::Serialize;
use url::Url;

use super::request::RestorationRequest;
use super::session::{SessionCredential, SESSION_COOKIE};
use crate::browser::UiDriver;
use crate::config::{normalize_base_url, Environment, ENTRY_SCRIPT};
use crate::error::{Error, Result};
use crate::fixture::EntityKind;
use crate::http::{HttpClient, HttpClientConfig};

/// Outcome of a successful restoration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestorationReport {
    pub entity: EntityKind,
    pub status: u16,
    pub url: String,
    pub elapsed_ms: u64,
    /// Field names sent, in order
    pub fields: Vec<String>,
}

/// Sends raw restoration POSTs with an explicit session cookie
///
/// Its client never stores or sends cookies on its own and does not follow
/// redirects: anything but a direct 200 counts as a failure.
///
/// # Example
///
/// ```rust,no_run
/// use schoolmate_xss::browser::WebTester;
/// use schoolmate_xss::fixture::EntityKind;
/// use schoolmate_xss::restore::SessionRestorer;
///
/// # async fn run(tester: &WebTester) -> schoolmate_xss::Result<()> {
/// let restorer = SessionRestorer::new("http://localhost:8000/")?;
/// let report = restorer.restore(tester, EntityKind::Student).await?;
/// println!("restored {} in {}ms", report.entity, report.elapsed_ms);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SessionRestorer {
    base_url: Url,
    client: HttpClient,
    expected_cookie: String,
}

impl SessionRestorer {
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_config(base_url, HttpClientConfig::without_cookies())
    }

    /// Cookie handling and redirects are switched off whatever `config` says
    pub fn with_config(base_url: impl AsRef<str>, config: HttpClientConfig) -> Result<Self> {
        let base_url = Url::parse(&normalize_base_url(base_url.as_ref())?)?;
        let client = HttpClient::with_config(HttpClientConfig {
            handle_cookies: false,
            max_redirects: 0,
            ..config
        })?;
        Ok(Self {
            base_url,
            client,
            expected_cookie: SESSION_COOKIE.to_string(),
        })
    }

    pub fn for_environment(environment: &Environment) -> Result<Self> {
        Self::new(environment.base()?)
    }

    /// Name of the session cookie to look up (default `PHPSESSID`)
    pub fn expected_cookie(mut self, name: impl Into<String>) -> Self {
        self.expected_cookie = name.into();
        self
    }

    /// The URL restoration requests are posted to
    pub fn endpoint(&self) -> Result<Url> {
        Ok(self.base_url.join(ENTRY_SCRIPT)?)
    }

    /// Restore `kind` using the session held by `driver`
    pub async fn restore<D: UiDriver + ?Sized>(
        &self,
        driver: &D,
        kind: EntityKind,
    ) -> Result<RestorationReport> {
        let credential = SessionCredential::from_driver(driver, &self.expected_cookie)?;
        self.restore_with_credential(&credential, kind).await
    }

    /// Restore `kind` with an already extracted credential
    pub async fn restore_with_credential(
        &self,
        credential: &SessionCredential,
        kind: EntityKind,
    ) -> Result<RestorationReport> {
        credential.validate(&self.expected_cookie)?;
        let request = RestorationRequest::for_entity(kind)?;
        let url = self.endpoint()?;

        tracing::info!(
            entity = %kind,
            url = %url,
            session = %credential.masked(),
            "Restoring fixture"
        );

        let start = Instant::now();
        let response = self
            .client
            .execute(request.to_http(url, credential))
            .await?;
        let status = response.status_code();
        let elapsed_ms = start.elapsed().as_millis() as u64;

        if status != 200 {
            tracing::warn!(entity = %kind, url = %response.url, status, "Restoration rejected");
            return Err(Error::RestorationFailed {
                entity: kind,
                status,
                url: response.url.to_string(),
            });
        }

        tracing::info!(entity = %kind, status, time_ms = elapsed_ms, "Fixture restored");
        Ok(RestorationReport {
            entity: kind,
            status,
            url: response.url.to_string(),
            elapsed_ms,
            fields: request.field_names().into_iter().map(String::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::http::Cookie;

    const STUDENT_BODY: &str =
        "fname=name&mi=s&lname=surname&username=3&editstudent=1&studentid=1&page=1&page2=2&logout=";

    /// Driver stand-in that only holds cookies
    struct CookieDriver(Vec<Cookie>);

    #[async_trait]
    impl UiDriver for CookieDriver {
        async fn navigate(&mut self, _path: &str) -> Result<()> {
            Ok(())
        }

        async fn fill_field(&mut self, _name: &str, _value: &str) -> Result<()> {
            Ok(())
        }

        async fn click(&mut self, _label: &str) -> Result<()> {
            Ok(())
        }

        fn assert_contains(&self, _text: &str) -> Result<()> {
            Ok(())
        }

        fn current_cookies(&self) -> Vec<Cookie> {
            self.0.clone()
        }
    }

    fn session(value: &str) -> CookieDriver {
        CookieDriver(vec![
            Cookie::new("theme", "dark"),
            Cookie::new(SESSION_COOKIE, value),
        ])
    }

    #[tokio::test]
    async fn test_restore_sends_contract_with_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/index.php"))
            .and(header("cookie", "PHPSESSID=abc123"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string(STUDENT_BODY))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let restorer = SessionRestorer::new(server.uri()).unwrap();
        let report = restorer
            .restore(&session("abc123"), EntityKind::Student)
            .await
            .unwrap();

        assert_eq!(report.entity, EntityKind::Student);
        assert_eq!(report.status, 200);
        assert_eq!(
            report.fields,
            vec![
                "fname",
                "mi",
                "lname",
                "username",
                "editstudent",
                "studentid",
                "page",
                "page2",
                "logout"
            ]
        );
    }

    #[tokio::test]
    async fn test_mismatched_cookie_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let restorer = SessionRestorer::new(server.uri()).unwrap();
        let driver = CookieDriver(vec![Cookie::new("JSESSIONID", "abc123")]);
        let err = restorer
            .restore(&driver, EntityKind::Student)
            .await
            .unwrap_err();
        assert!(err.is_session_error());

        let err = restorer
            .restore(&CookieDriver(Vec::new()), EntityKind::Student)
            .await
            .unwrap_err();
        assert!(err.is_session_error());

        let err = restorer
            .restore_with_credential(&SessionCredential::new("sid", "abc"), EntityKind::Student)
            .await
            .unwrap_err();
        assert!(err.is_session_error());
    }

    #[tokio::test]
    async fn test_empty_value_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let restorer = SessionRestorer::new(server.uri()).unwrap();
        let err = restorer
            .restore(&session(""), EntityKind::Student)
            .await
            .unwrap_err();
        assert!(err.is_session_error());
    }

    #[tokio::test]
    async fn test_non_200_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/index.php"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let restorer = SessionRestorer::new(server.uri()).unwrap();
        let err = restorer
            .restore(&session("abc123"), EntityKind::Student)
            .await
            .unwrap_err();
        assert!(err.is_restoration_failure());
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.url(), Some(format!("{}/index.php", server.uri()).as_str()));
    }

    #[tokio::test]
    async fn test_redirect_is_not_followed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/index.php"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/login.php"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let restorer = SessionRestorer::new(server.uri()).unwrap();
        let err = restorer
            .restore(&session("abc123"), EntityKind::Student)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(302));
    }

    #[tokio::test]
    async fn test_unsupported_kind_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let restorer = SessionRestorer::new(server.uri()).unwrap();
        let err = restorer
            .restore(&session("abc123"), EntityKind::Semester)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedRestoration { .. }));
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport() {
        // nothing listens on the discard port
        let restorer = SessionRestorer::new("http://127.0.0.1:9/").unwrap();
        let err = restorer
            .restore(&session("abc123"), EntityKind::Student)
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_endpoint_under_base_path() {
        let restorer = SessionRestorer::new("http://localhost/schoolmate").unwrap();
        assert_eq!(
            restorer.endpoint().unwrap().as_str(),
            "http://localhost/schoolmate/index.php"
        );
        let restorer = restorer.expected_cookie("SID");
        assert_eq!(restorer.expected_cookie, "SID");
    }
}
