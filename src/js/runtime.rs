// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! JavaScript runtime implementation using boa_engine
//!
//! Every handler runs in a fresh context: dialogs and the form bindings are
//! installed, the page's inline scripts are replayed so the functions they
//! declare exist, then the handler body runs as a function so a top-level
//! `return` behaves the way it does in an attribute handler.

use boa_engine::{js_string, Context, JsValue as BoaJsValue, NativeFunction, Source};

use super::dom_api::DomApiInstaller;
use super::value::JsValue;
use crate::dom::{Document, Element};
use crate::error::{Error, Result};

/// JavaScript runtime configuration
#[derive(Debug, Clone)]
pub struct JsRuntimeConfig {
    /// Loop iterations allowed per evaluation
    pub loop_iteration_limit: u64,
    /// Call depth allowed per evaluation
    pub recursion_limit: usize,
    /// Answer given to `confirm()` dialogs
    pub confirm_dialogs: bool,
}

impl Default for JsRuntimeConfig {
    fn default() -> Self {
        Self {
            loop_iteration_limit: 100_000,
            recursion_limit: 256,
            confirm_dialogs: true,
        }
    }
}

/// Side effects of one handler run
#[derive(Debug, Clone, Default)]
pub struct HandlerOutcome {
    /// Form submitted through `form.submit()`
    pub submitted: Option<Element>,
    /// Target assigned to `location`
    pub navigate: Option<String>,
    /// Value the handler returned
    pub returned: JsValue,
}

impl HandlerOutcome {
    /// `return false` cancels the element's default action
    pub fn cancels_default(&self) -> bool {
        self.returned == JsValue::Boolean(false)
    }
}

/// Strip the `javascript:` scheme from an href
pub fn javascript_source(href: &str) -> Option<&str> {
    let trimmed = href.trim_start();
    let prefix = trimmed.get(..11)?;
    prefix
        .eq_ignore_ascii_case("javascript:")
        .then(|| &trimmed[11..])
}

/// Handler runtime for one loaded page
#[derive(Debug, Clone, Default)]
pub struct JsRuntime {
    config: JsRuntimeConfig,
    /// Inline scripts of the page, in document order
    scripts: Vec<String>,
}

impl JsRuntime {
    pub fn new(config: JsRuntimeConfig) -> Self {
        Self {
            config,
            scripts: Vec::new(),
        }
    }

    /// Runtime carrying the document's inline scripts
    pub fn for_document(document: &Document, config: JsRuntimeConfig) -> Self {
        let scripts = document.scripts();
        tracing::debug!(scripts = scripts.len(), "Collected page scripts");
        Self { config, scripts }
    }

    pub fn script_count(&self) -> usize {
        self.scripts.len()
    }

    /// Run handler source against `document`
    ///
    /// Exceptions thrown by page scripts or the handler are logged and
    /// leave whatever effects happened before them, as in a browser.
    pub fn run_handler(&self, document: &Document, source: &str) -> Result<HandlerOutcome> {
        let mut context = Context::default();
        context
            .runtime_limits_mut()
            .set_loop_iteration_limit(self.config.loop_iteration_limit);
        context
            .runtime_limits_mut()
            .set_recursion_limit(self.config.recursion_limit);

        Self::install_dialogs(&mut context, self.config.confirm_dialogs)?;
        let bindings = DomApiInstaller::new(document.clone()).install(&mut context)?;

        for script in &self.scripts {
            if let Err(e) = context.eval(Source::from_bytes(script.as_str())) {
                tracing::debug!(error = %e, "Page script threw");
            }
        }

        let wrapped = format!("(function () {{\n{}\n}})()", source);
        let returned = match context.eval(Source::from_bytes(wrapped.as_str())) {
            Ok(value) => Self::convert_value(&value, &mut context),
            Err(e) => {
                tracing::debug!(error = %e, "Handler threw");
                JsValue::Undefined
            }
        };

        bindings.write_back(&mut context)?;
        Ok(HandlerOutcome {
            submitted: bindings.submitted(),
            navigate: bindings.navigation(&mut context)?,
            returned,
        })
    }

    /// alert() logs, confirm() answers from the config
    fn install_dialogs(context: &mut Context, confirm_answer: bool) -> Result<()> {
        let alert_fn = NativeFunction::from_copy_closure(|_, args, ctx| {
            let msg = args
                .first()
                .map(|v| v.to_string(ctx))
                .transpose()?
                .map(|s| s.to_std_string_escaped())
                .unwrap_or_default();
            tracing::debug!(message = %msg, "alert()");
            Ok(BoaJsValue::undefined())
        });
        context
            .register_global_builtin_callable(js_string!("alert"), 1, alert_fn)
            .map_err(|e| Error::js(format!("Failed to register alert: {}", e)))?;

        let confirm_fn =
            NativeFunction::from_copy_closure(move |_, _, _| Ok(BoaJsValue::from(confirm_answer)));
        context
            .register_global_builtin_callable(js_string!("confirm"), 1, confirm_fn)
            .map_err(|e| Error::js(format!("Failed to register confirm: {}", e)))?;

        Ok(())
    }

    /// Convert boa JsValue to our JsValue
    fn convert_value(value: &BoaJsValue, context: &mut Context) -> JsValue {
        if value.is_undefined() {
            JsValue::Undefined
        } else if value.is_null() {
            JsValue::Null
        } else if let Some(b) = value.as_boolean() {
            JsValue::Boolean(b)
        } else if let Some(n) = value.as_number() {
            JsValue::Number(n)
        } else if value.is_object() {
            JsValue::Object
        } else if let Ok(s) = value.to_string(context) {
            JsValue::String(s.to_std_string_escaped())
        } else {
            JsValue::Undefined
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{parse_html, parse_html_with_url};

    const PAGE: &str = r#"
        <form name="admin" action="./index.php" method="post">
            <input type="hidden" name="page2" value="0">
            <input type="hidden" name="logout">
        </form>
        <form name="editstudent" action="./index.php" method="post">
            <input type="text" name="fname" value="">
            <input type="checkbox" name="active">
            <input type="hidden" name="editstudent" value="0">
        </form>
        <script>
            // validation before the edit is posted
            function validate() {
                if (document.editstudent.fname.value == "") {
                    alert("First name required");
                    return false;
                } else {
                    document.editstudent.editstudent.value = 1;
                    document.editstudent.submit();
                }
            }
            counter(0);
        </script>
    "#;

    fn runtime(doc: &Document) -> JsRuntime {
        JsRuntime::for_document(doc, JsRuntimeConfig::default())
    }

    #[test]
    fn test_javascript_href_sets_field_and_submits() {
        let doc = parse_html(PAGE).unwrap();
        let source = javascript_source(
            "javascript: document.admin.page2.value=20; document.admin.submit();",
        )
        .unwrap();

        let outcome = runtime(&doc).run_handler(&doc, source).unwrap();

        let form = outcome.submitted.unwrap();
        assert_eq!(form.name().as_deref(), Some("admin"));
        let page2 = doc.query_selector("input[name=page2]").unwrap();
        assert_eq!(page2.value().as_deref(), Some("20"));
        // untouched controls keep their markup
        let logout = doc.query_selector("input[name=logout]").unwrap();
        assert!(logout.value().is_none());
    }

    #[test]
    fn test_script_function_survives_later_error() {
        let doc = parse_html(PAGE).unwrap();
        let runtime = runtime(&doc);
        assert_eq!(runtime.script_count(), 1);

        let blocked = runtime.run_handler(&doc, "return validate();").unwrap();
        assert!(blocked.submitted.is_none());
        assert!(blocked.cancels_default());

        doc.query_selector("input[name=fname]")
            .unwrap()
            .set_value("name");
        let passed = runtime.run_handler(&doc, "validate()").unwrap();
        assert_eq!(
            passed.submitted.and_then(|f| f.name()).as_deref(),
            Some("editstudent")
        );
        assert_eq!(
            doc.query_selector("input[name=editstudent]")
                .unwrap()
                .value()
                .as_deref(),
            Some("1")
        );
    }

    #[test]
    fn test_forms_collection_checked_and_location() {
        let doc = parse_html_with_url(PAGE, Some("http://app.test/index.php".parse().unwrap()))
            .unwrap();

        let outcome = JsRuntime::default()
            .run_handler(
                &doc,
                "document.forms['admin'].page2.value = '2' + 1;
                 document.forms[1].active.checked = true;
                 window.location.href = 'index.php?x=' + 1;",
            )
            .unwrap();

        assert!(outcome.submitted.is_none());
        assert_eq!(outcome.navigate.as_deref(), Some("index.php?x=1"));
        assert_eq!(
            doc.query_selector("input[name=page2]")
                .unwrap()
                .value()
                .as_deref(),
            Some("21")
        );
        assert!(doc.query_selector("input[name=active]").unwrap().checked());
    }

    #[test]
    fn test_throwing_handler_keeps_earlier_effects() {
        let doc = parse_html(PAGE).unwrap();
        let outcome = JsRuntime::default()
            .run_handler(&doc, "document.admin.page2.value = 7; missing(); document.admin.submit();")
            .unwrap();

        assert!(outcome.submitted.is_none());
        assert!(outcome.navigate.is_none());
        assert!(outcome.returned.is_undefined());
        assert_eq!(
            doc.query_selector("input[name=page2]")
                .unwrap()
                .value()
                .as_deref(),
            Some("7")
        );
    }

    #[test]
    fn test_runaway_loop_is_cut_off() {
        let doc = parse_html(PAGE).unwrap();
        let outcome = JsRuntime::default()
            .run_handler(&doc, "while (true) {} document.admin.submit();")
            .unwrap();
        assert!(outcome.submitted.is_none());
    }

    #[test]
    fn test_confirm_answer() {
        let doc = parse_html(PAGE).unwrap();
        let declined = JsRuntime::new(JsRuntimeConfig {
            confirm_dialogs: false,
            ..Default::default()
        })
        .run_handler(&doc, "return confirm('Delete?');")
        .unwrap();
        assert!(declined.cancels_default());

        let accepted = JsRuntime::default()
            .run_handler(&doc, "return confirm('Delete?');")
            .unwrap();
        assert_eq!(accepted.returned, JsValue::Boolean(true));
    }

    #[test]
    fn test_javascript_scheme_detection() {
        assert_eq!(javascript_source("JavaScript:void(0)"), Some("void(0)"));
        assert_eq!(javascript_source("index.php"), None);
        assert_eq!(javascript_source("java"), None);
    }
}
