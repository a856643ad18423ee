// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Form extraction and submission

use reqwest::Method;
use url::Url;

use crate::dom::Element;
use crate::error::{Error, Result};
use crate::http::{Request, FORM_URLENCODED};

/// Form controls that take part in submission
const CONTROLS: &str = "input, textarea, select, button";

/// A form on the current page
#[derive(Debug, Clone)]
pub struct Form {
    element: Element,
    /// Form name (falls back to id)
    pub name: Option<String>,
    /// Raw action attribute
    pub action: Option<String>,
    /// HTTP method (GET/POST)
    pub method: String,
    /// Encoding type
    pub enctype: String,
}

/// Snapshot of one form control
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: Option<String>,
    /// Field type (text, password, hidden, textarea, select, ...)
    pub field_type: String,
    pub value: Option<String>,
    pub checked: bool,
    pub disabled: bool,
}

impl Form {
    /// Create a form from a DOM element
    pub fn from_element(element: Element) -> Self {
        Self {
            name: element.name().or_else(|| element.id()),
            action: element.get_attribute("action"),
            method: element
                .get_attribute("method")
                .unwrap_or_else(|| "GET".to_string())
                .trim()
                .to_uppercase(),
            enctype: element
                .get_attribute("enctype")
                .unwrap_or_else(|| FORM_URLENCODED.to_string()),
            element,
        }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| "<unnamed>".to_string())
    }

    /// Controls in document order
    pub fn controls(&self) -> Vec<Element> {
        self.element.query_selector_all(CONTROLS)
    }

    /// Snapshots of all controls
    pub fn fields(&self) -> Vec<FormField> {
        self.controls()
            .into_iter()
            .map(|control| FormField {
                name: control.name(),
                field_type: control.control_type(),
                value: control.value(),
                checked: control.checked(),
                disabled: control.disabled(),
            })
            .collect()
    }

    /// First non-button control with the given name
    pub fn field(&self, name: &str) -> Option<Element> {
        self.controls().into_iter().find(|c| {
            c.name().as_deref() == Some(name)
                && !matches!(
                    c.control_type().as_str(),
                    "submit" | "button" | "reset" | "image"
                )
        })
    }

    /// Current value of a named field
    pub fn field_value(&self, name: &str) -> Option<String> {
        self.field(name).and_then(|f| f.value())
    }

    /// Set a text-like field
    pub fn set_field(&self, name: &str, value: impl Into<String>) -> Result<()> {
        let field = self
            .field(name)
            .filter(|f| !matches!(f.control_type().as_str(), "checkbox" | "radio"))
            .ok_or_else(|| {
                Error::not_found("Text field", format!("{} in form {}", name, self.display_name()))
            })?;
        field.set_value(value);
        Ok(())
    }

    /// Check a checkbox, optionally the one carrying `value`
    pub fn check(&self, name: &str, value: Option<&str>) -> Result<()> {
        let checkbox = self
            .controls()
            .into_iter()
            .filter(|c| c.name().as_deref() == Some(name) && c.control_type() == "checkbox")
            .find(|c| match value {
                Some(v) => c.get_attribute("value").as_deref() == Some(v),
                None => true,
            })
            .ok_or_else(|| {
                let locator = match value {
                    Some(v) => format!("{}={} in form {}", name, v, self.display_name()),
                    None => format!("{} in form {}", name, self.display_name()),
                };
                Error::not_found("Checkbox", locator)
            })?;
        checkbox.set_checked(true);
        Ok(())
    }

    /// Buttons that submit the form when activated
    pub fn submit_buttons(&self) -> Vec<Element> {
        self.controls()
            .into_iter()
            .filter(|c| matches!(c.control_type().as_str(), "submit" | "image"))
            .collect()
    }

    /// Buttons of any type, including `type=button`
    pub fn buttons(&self) -> Vec<Element> {
        self.controls()
            .into_iter()
            .filter(|c| matches!(c.control_type().as_str(), "submit" | "image" | "button"))
            .collect()
    }

    /// Name/value pairs in document order for the form data set
    ///
    /// Only the activating submit button contributes; checkboxes and radios
    /// contribute when checked.
    pub fn submission_data(&self, submitter: Option<&Element>) -> Vec<(String, String)> {
        let mut data = Vec::new();
        for control in self.controls() {
            let Some(name) = control.name().filter(|n| !n.is_empty()) else {
                continue;
            };
            if control.disabled() {
                continue;
            }
            match control.control_type().as_str() {
                "submit" | "image" => {
                    if submitter.map(|s| s == &control).unwrap_or(false) {
                        data.push((name, control.value().unwrap_or_default()));
                    }
                }
                "button" | "reset" | "file" => {}
                "checkbox" | "radio" => {
                    if control.checked() {
                        let value = control.value().unwrap_or_else(|| "on".to_string());
                        data.push((name, value));
                    }
                }
                "select" => {
                    if let Some(value) = control.value() {
                        data.push((name, value));
                    }
                }
                _ => data.push((name, control.value().unwrap_or_default())),
            }
        }
        data
    }

    /// Resolve action URL against the page URL
    pub fn resolve_action(&self, base_url: &Url) -> Result<Url> {
        match self.action.as_deref().map(str::trim) {
            None | Some("") => Ok(base_url.clone()),
            Some(action) => Ok(base_url.join(action)?),
        }
    }

    /// Build the submission request
    pub fn build_request(&self, submitter: Option<&Element>, base_url: &Url) -> Result<Request> {
        let mut target = self.resolve_action(base_url)?;
        let data = self.submission_data(submitter);

        if self.method == "POST" {
            if !self.enctype.eq_ignore_ascii_case(FORM_URLENCODED) {
                tracing::debug!(form = %self.display_name(), enctype = %self.enctype, "Submitting as urlencoded");
            }
            Ok(Request::from_url(Method::POST, target).form(&data))
        } else {
            target.set_query(None);
            if !data.is_empty() {
                target.query_pairs_mut().extend_pairs(data.iter());
            }
            Ok(Request::from_url(Method::GET, target))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    const EDIT_FORM: &str = r#"
        <form name="editstudent" action="./index.php" method="post">
            <input type="text" name="fname" value="name">
            <input type="text" name="mi" value="s">
            <textarea name="notes">hello</textarea>
            <select name="grade"><option value="1">1</option><option value="2" selected>2</option></select>
            <input type="checkbox" name="delete[]" value="1">
            <input type="checkbox" name="delete[]" value="2">
            <input type="text" name="locked" value="x" disabled>
            <input type="hidden" name="logout">
            <input type="submit" name="save" value="Save">
            <input type="button" value="Edit Student" onclick="validate();">
        </form>
    "#;

    fn form() -> Form {
        let doc = parse_html(EDIT_FORM).unwrap();
        Form::from_element(doc.form_named("editstudent").unwrap())
    }

    #[test]
    fn test_form_attributes() {
        let form = form();
        assert_eq!(form.name.as_deref(), Some("editstudent"));
        assert_eq!(form.method, "POST");
        assert_eq!(form.fields().len(), 10);
        assert_eq!(form.buttons().len(), 2);
        assert_eq!(form.submit_buttons().len(), 1);
    }

    #[test]
    fn test_submission_data() {
        let form = form();
        form.set_field("fname", "<script>").unwrap();
        form.check("delete[]", Some("2")).unwrap();

        let data = form.submission_data(None);
        let names: Vec<&str> = data.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec!["fname", "mi", "notes", "grade", "delete[]", "logout"]
        );
        assert_eq!(data[0].1, "<script>");
        assert_eq!(data[3].1, "2");
        assert_eq!(data[4].1, "2");
        assert_eq!(data[5].1, "");

        let submitter = form.submit_buttons().remove(0);
        let with_button = form.submission_data(Some(&submitter));
        assert_eq!(with_button.last().unwrap(), &("save".to_string(), "Save".to_string()));
    }

    #[test]
    fn test_missing_fields() {
        let form = form();
        assert!(form.set_field("nope", "x").is_err());
        assert!(form.set_field("delete[]", "x").is_err());
        assert!(form.check("delete[]", Some("9")).is_err());
    }

    #[test]
    fn test_build_requests() {
        let form = form();
        let base = Url::parse("http://localhost:8000/sub/page.php?x=1").unwrap();

        let post = form.build_request(None, &base).unwrap();
        assert_eq!(post.method, Method::POST);
        assert_eq!(post.url.as_str(), "http://localhost:8000/sub/index.php");
        assert!(post.body_text().starts_with("fname=name&mi=s&notes=hello"));

        let doc = parse_html(r#"<form><input name="q" value="a b"></form>"#).unwrap();
        let get = Form::from_element(doc.forms().remove(0))
            .build_request(None, &base)
            .unwrap();
        assert_eq!(get.url.as_str(), "http://localhost:8000/sub/page.php?q=a+b");
    }
}
