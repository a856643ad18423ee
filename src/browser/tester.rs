// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page-level web tester
//!
//! Keeps one page loaded at a time, a working form, and the session cookies
//! in the client's jar. Links and buttons are activated the way a browser
//! would: inline handlers first, then the element's default action.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Method;
use url::Url;

use super::config::DriverConfig;
use super::driver::UiDriver;
use super::form::Form;
use crate::config::{normalize_base_url, Environment};
use crate::dom::{parse_html_with_url, Document, Element};
use crate::error::{Error, Result};
use crate::http::{headers, Cookie, HttpClient, Request};
use crate::js::{javascript_source, HandlerOutcome, JsRuntime};

/// The currently loaded page
#[derive(Debug, Clone)]
pub struct Page {
    /// Final URL after redirects
    pub url: Url,
    pub status: u16,
    /// Raw response body
    pub source: String,
    pub document: Document,
    scripts: JsRuntime,
}

/// Browser emulation used to drive the application UI
#[derive(Debug)]
pub struct WebTester {
    base_url: Url,
    config: DriverConfig,
    client: HttpClient,
    page: Option<Page>,
    working_form: Option<Form>,
}

impl WebTester {
    /// Create a tester rooted at `base_url`
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_config(base_url, DriverConfig::default())
    }

    pub fn with_config(base_url: impl AsRef<str>, config: DriverConfig) -> Result<Self> {
        let base_url = Url::parse(&normalize_base_url(base_url.as_ref())?)?;
        let client = HttpClient::with_config(config.http_config())?;
        Ok(Self {
            base_url,
            config,
            client,
            page: None,
            working_form: None,
        })
    }

    /// Create a tester for the configured application
    pub fn for_environment(environment: &Environment) -> Result<Self> {
        Self::new(environment.base()?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// The loaded page
    pub fn page(&self) -> Result<&Page> {
        self.page.as_ref().ok_or(Error::NoPage)
    }

    pub fn document(&self) -> Result<&Document> {
        Ok(&self.page()?.document)
    }

    pub fn current_url(&self) -> Option<&Url> {
        self.page.as_ref().map(|p| &p.url)
    }

    /// Load a page relative to the base URL
    pub async fn begin_at(&mut self, path: &str) -> Result<()> {
        let url = self.base_url.join(path.trim_start_matches('/'))?;
        tracing::debug!(url = %url, "Beginning at");
        self.get(url).await
    }

    async fn get(&mut self, url: Url) -> Result<()> {
        let request = self.with_referer(Request::from_url(Method::GET, url));
        self.load(request).await
    }

    fn with_referer(&self, request: Request) -> Request {
        match self.page {
            Some(ref page) => request.header(headers::REFERER, page.url.as_str()),
            None => request,
        }
    }

    async fn load(&mut self, request: Request) -> Result<()> {
        let request = request.timeout(self.config.timeout);
        let method = request.method.clone();
        let response = self.client.execute(request).await?;
        let status = response.status_code();

        tracing::debug!(
            method = %method,
            url = %response.url,
            status,
            time_ms = response.response_time_ms,
            "Page loaded"
        );

        if status >= 400 {
            return Err(Error::UnexpectedStatus {
                status,
                url: response.url.to_string(),
            });
        }

        let source = response.text_lossy();
        let document = if response.is_document() {
            parse_html_with_url(&source, Some(response.url.clone()))?
        } else {
            Document::with_url(response.url.clone())
        };
        let scripts = if self.config.handlers_enabled {
            JsRuntime::for_document(&document, self.config.js_config.clone())
        } else {
            JsRuntime::default()
        };

        self.page = Some(Page {
            url: response.url,
            status,
            source,
            document,
            scripts,
        });
        self.working_form = None;
        Ok(())
    }

    /// Select the form used by field operations and `submit`
    pub fn set_working_form(&mut self, name: &str) -> Result<()> {
        let element = self
            .document()?
            .form_named(name)
            .ok_or_else(|| Error::not_found("Form", name))?;
        self.working_form = Some(Form::from_element(element));
        Ok(())
    }

    /// The working form, or the first form on the page
    pub fn working_form(&self) -> Result<Form> {
        if let Some(ref form) = self.working_form {
            return Ok(form.clone());
        }
        self.document()?
            .forms()
            .into_iter()
            .next()
            .map(Form::from_element)
            .ok_or_else(|| Error::not_found("Form", "any form on the page"))
    }

    /// Without a working form, the first form that has the field becomes it
    fn form_for_field(&mut self, name: &str) -> Result<Form> {
        if self.working_form.is_none() {
            let found = self
                .document()?
                .forms()
                .into_iter()
                .map(Form::from_element)
                .find(|f| f.field(name).is_some());
            if let Some(form) = found {
                self.working_form = Some(form.clone());
                return Ok(form);
            }
        }
        self.working_form()
    }

    pub fn set_text_field(&mut self, name: &str, value: &str) -> Result<()> {
        self.form_for_field(name)?.set_field(name, value)
    }

    /// Check a checkbox; with `value`, the one carrying that value
    pub fn check_checkbox(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        self.form_for_field(name)?.check(name, value)
    }

    /// Current value of a working-form field
    pub fn field_value(&self, name: &str) -> Result<String> {
        let form = self.working_form()?;
        form.field_value(name).ok_or_else(|| {
            Error::not_found(
                "Field",
                format!("{} in form {}", name, form.name.as_deref().unwrap_or("<unnamed>")),
            )
        })
    }

    /// Submit the working form with its first submit button
    pub async fn submit(&mut self) -> Result<()> {
        let form = self.working_form()?;
        let submitter = form.submit_buttons().into_iter().next();
        self.submit_form(&form, submitter.as_ref(), true).await
    }

    async fn submit_form(
        &mut self,
        form: &Form,
        submitter: Option<&Element>,
        run_onsubmit: bool,
    ) -> Result<()> {
        if run_onsubmit {
            if let Some(source) = form.element().get_attribute("onsubmit") {
                if let Some(outcome) = self.run_handler(&source)? {
                    if outcome.cancels_default() {
                        tracing::debug!(form = ?form.name, "Submission cancelled by onsubmit");
                        return Ok(());
                    }
                }
            }
        }

        let base = self.page()?.url.clone();
        let request = form.build_request(submitter, &base).map_err(|e| match form.name {
            Some(ref name) => e.with_form(name.clone()),
            None => e,
        })?;
        tracing::debug!(
            form = ?form.name,
            method = %form.method,
            action = %request.url,
            "Submitting form"
        );
        let request = self.with_referer(request);
        self.load(request).await
    }

    fn run_handler(&self, source: &str) -> Result<Option<HandlerOutcome>> {
        if !self.config.handlers_enabled {
            return Ok(None);
        }
        let page = self.page()?;
        page.scripts.run_handler(&page.document, source).map(Some)
    }

    /// Apply the navigation a handler asked for; true if a page was loaded
    async fn follow(&mut self, outcome: &HandlerOutcome) -> Result<bool> {
        if let Some(ref element) = outcome.submitted {
            let form = Form::from_element(element.clone());
            self.submit_form(&form, None, false).await?;
            return Ok(true);
        }
        if let Some(ref target) = outcome.navigate {
            let url = self.page()?.url.join(target)?;
            self.get(url).await?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Run an element's onclick; true if it navigated or cancelled
    async fn run_onclick(&mut self, element: &Element) -> Result<bool> {
        let Some(source) = element.get_attribute("onclick") else {
            return Ok(false);
        };
        match self.run_handler(&source)? {
            Some(outcome) => Ok(self.follow(&outcome).await? || outcome.cancels_default()),
            None => Ok(false),
        }
    }

    fn find_link(&self, text: &str, exact: bool) -> Result<Option<Element>> {
        let links = self.document()?.query_selector_all("a");
        let found = links
            .iter()
            .find(|l| l.label() == text)
            .or_else(|| {
                (!exact)
                    .then(|| links.iter().find(|l| l.label().contains(text)))
                    .flatten()
            })
            .cloned();
        Ok(found)
    }

    /// Click the link whose text is `text` (or, failing that, contains it)
    pub async fn click_link_with_text(&mut self, text: &str) -> Result<()> {
        let link = self
            .find_link(text, false)?
            .ok_or_else(|| Error::not_found("Link", text))?;
        self.activate_link(link).await
    }

    async fn activate_link(&mut self, link: Element) -> Result<()> {
        if self.run_onclick(&link).await? {
            return Ok(());
        }

        let href = link.href().unwrap_or_default();
        if let Some(source) = javascript_source(&href) {
            if let Some(outcome) = self.run_handler(source)? {
                self.follow(&outcome).await?;
            }
            return Ok(());
        }

        let url = self.page()?.url.join(&href)?;
        tracing::debug!(text = %link.label(), url = %url, "Following link");
        self.get(url).await
    }

    /// Buttons of the working form first, then the rest of the page
    fn find_button(&self, predicate: impl Fn(&Element) -> bool) -> Result<Option<Element>> {
        if let Some(ref form) = self.working_form {
            if let Some(button) = form.buttons().into_iter().find(|b| predicate(b)) {
                return Ok(Some(button));
            }
        }
        Ok(self
            .document()?
            .query_selector_all("input, button")
            .into_iter()
            .filter(|e| matches!(e.control_type().as_str(), "submit" | "image" | "button"))
            .find(|b| predicate(b)))
    }

    /// Click the button whose label is exactly `text`
    pub async fn click_button_with_text(&mut self, text: &str) -> Result<()> {
        let button = self
            .find_button(|b| b.label() == text)?
            .ok_or_else(|| Error::not_found("Button", text))?;
        self.activate_button(button).await
    }

    async fn activate_button(&mut self, button: Element) -> Result<()> {
        if self.run_onclick(&button).await? {
            return Ok(());
        }

        let kind = button.control_type();
        if kind != "submit" && kind != "image" {
            tracing::debug!(button = %button.label(), kind = %kind, "Button has no default action");
            return Ok(());
        }
        let form = button
            .closest_tag("form")
            .map(Form::from_element)
            .ok_or_else(|| Error::form_submission("submit button outside of a form"))?;
        self.submit_form(&form, Some(&button), true).await
    }

    /// Append a plain submit button to a form so it can be submitted
    /// without its validation handlers
    pub fn add_submit_button(&mut self, form_name: &str) -> Result<()> {
        let document = self.document()?;
        let form = document
            .form_named(form_name)
            .ok_or_else(|| Error::not_found("Form", form_name))?;
        let button = document.create_element("input");
        button.set_attribute("type", "submit");
        form.append(&button);
        Ok(())
    }

    /// Visible text of the page
    pub fn page_text(&self) -> Result<String> {
        Ok(self.document()?.text_content())
    }

    /// Raw body of the last response
    pub fn page_source(&self) -> Result<&str> {
        Ok(&self.page()?.source)
    }

    pub fn assert_text_present(&self, text: &str) -> Result<()> {
        let page = self.page()?;
        if page.document.text_content().contains(text) {
            Ok(())
        } else {
            Err(Error::assertion(text, page.url.as_str()))
        }
    }

    /// Fail unless the page text matches a regular expression
    pub fn assert_match(&self, pattern: &str) -> Result<()> {
        let regex = Regex::new(pattern)
            .map_err(|e| Error::config(format!("invalid pattern '{}': {}", pattern, e)))?;
        let page = self.page()?;
        if regex.is_match(&page.document.text_content()) {
            Ok(())
        } else {
            Err(Error::assertion(pattern, page.url.as_str()))
        }
    }

    /// Cookies the session sends to the base URL
    pub fn cookies(&self) -> Vec<Cookie> {
        self.client.cookie_jar().get_cookies(&self.base_url)
    }

    /// Forget the session
    pub fn clear_cookies(&self) {
        self.client.cookie_jar().clear();
    }
}

#[async_trait]
impl UiDriver for WebTester {
    async fn navigate(&mut self, path: &str) -> Result<()> {
        self.begin_at(path).await
    }

    async fn fill_field(&mut self, name: &str, value: &str) -> Result<()> {
        self.set_text_field(name, value)
    }

    async fn click(&mut self, label: &str) -> Result<()> {
        if let Some(link) = self.find_link(label, true)? {
            return self.activate_link(link).await;
        }
        let button = self.find_button(|b| b.label() == label || b.name().as_deref() == Some(label))?;
        match button {
            Some(button) => self.activate_button(button).await,
            None => self.click_link_with_text(label).await,
        }
    }

    fn assert_contains(&self, text: &str) -> Result<()> {
        self.assert_text_present(text)
    }

    fn current_cookies(&self) -> Vec<Cookie> {
        self.cookies()
    }
}
