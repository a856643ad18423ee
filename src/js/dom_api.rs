// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Form-level DOM bindings
//!
//! Exposes `document.<form>.<field>`, `document.forms[...]`, `form.submit()`
//! and `location` to handler code. Field objects are plain JS objects seeded
//! from the parsed page; whatever the handler leaves in their `value` and
//! `checked` properties is written back to the DOM after it returns.

use boa_engine::property::Attribute;
use boa_engine::{js_string, Context, JsError, JsObject, JsString, JsValue, NativeFunction};
use boa_gc::{Finalize, Gc, GcRefCell, Trace};

use crate::dom::{Document, Element};
use crate::error::{Error, Result};

const CONTROLS: &str = "input, textarea, select, button";

/// Shared slot recording the first `submit()` call
#[derive(Clone, Trace, Finalize)]
struct SubmitTarget {
    form: usize,
    submitted: Gc<GcRefCell<Option<usize>>>,
}

/// A form control mirrored into the context
struct BoundControl {
    element: Element,
    object: JsObject,
    value: String,
    checked: bool,
}

/// DOM API installer - adds the form bindings to a JS context
pub struct DomApiInstaller {
    document: Document,
}

/// Live bindings of one context, read back after execution
pub struct DomBindings {
    forms: Vec<Element>,
    controls: Vec<BoundControl>,
    submitted: Gc<GcRefCell<Option<usize>>>,
    document: JsObject,
    href: String,
}

fn js_err(e: JsError) -> Error {
    Error::js(e.to_string())
}

fn js_str(s: &str) -> JsValue {
    JsValue::from(JsString::from(s))
}

impl DomApiInstaller {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// Install `document`, `location` and `window` into the context
    pub fn install(&self, context: &mut Context) -> Result<DomBindings> {
        let href = self
            .document
            .url
            .as_ref()
            .map(|u| u.to_string())
            .unwrap_or_default();

        let document_obj = JsObject::default();
        let forms_obj = JsObject::default();
        let submitted = Gc::new(GcRefCell::new(None));
        let forms = self.document.forms();
        let mut controls = Vec::new();

        for (index, form) in forms.iter().enumerate() {
            let form_obj = JsObject::default();
            let name = form.name();
            if let Some(ref name) = name {
                form_obj
                    .set(js_string!("name"), js_str(name), false, context)
                    .map_err(js_err)?;
            }

            let submit = NativeFunction::from_copy_closure_with_captures(
                |_, _, target: &SubmitTarget, _| {
                    let mut slot = target.submitted.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(target.form);
                    }
                    Ok(JsValue::undefined())
                },
                SubmitTarget {
                    form: index,
                    submitted: submitted.clone(),
                },
            );
            form_obj
                .set(
                    js_string!("submit"),
                    submit.to_js_function(context.realm()),
                    false,
                    context,
                )
                .map_err(js_err)?;

            // named controls shadow form properties, as in browsers
            for control in form.query_selector_all(CONTROLS) {
                let Some(field) = control.name().or_else(|| control.id()) else {
                    continue;
                };
                let value = control.value().unwrap_or_default();
                let checked = control.checked();

                let object = JsObject::default();
                object
                    .set(js_string!("name"), js_str(&field), false, context)
                    .map_err(js_err)?;
                object
                    .set(js_string!("type"), js_str(&control.control_type()), false, context)
                    .map_err(js_err)?;
                object
                    .set(js_string!("value"), js_str(&value), false, context)
                    .map_err(js_err)?;
                object
                    .set(js_string!("checked"), checked, false, context)
                    .map_err(js_err)?;
                object
                    .set(js_string!("form"), form_obj.clone(), false, context)
                    .map_err(js_err)?;
                form_obj
                    .set(JsString::from(field.as_str()), object.clone(), false, context)
                    .map_err(js_err)?;

                controls.push(BoundControl {
                    element: control,
                    object,
                    value,
                    checked,
                });
            }

            forms_obj
                .set(index as u32, form_obj.clone(), false, context)
                .map_err(js_err)?;
            if let Some(ref name) = name {
                let key = JsString::from(name.as_str());
                forms_obj
                    .set(key.clone(), form_obj.clone(), false, context)
                    .map_err(js_err)?;
                document_obj
                    .set(key, form_obj, false, context)
                    .map_err(js_err)?;
            }
        }
        forms_obj
            .set(js_string!("length"), forms.len() as u32, false, context)
            .map_err(js_err)?;
        document_obj
            .set(js_string!("forms"), forms_obj, false, context)
            .map_err(js_err)?;

        let location = JsObject::default();
        location
            .set(js_string!("href"), js_str(&href), false, context)
            .map_err(js_err)?;
        document_obj
            .set(js_string!("location"), location.clone(), false, context)
            .map_err(js_err)?;

        let window = context.global_object().clone();
        context
            .register_global_property(js_string!("document"), document_obj.clone(), Attribute::all())
            .map_err(js_err)?;
        context
            .register_global_property(js_string!("location"), location, Attribute::all())
            .map_err(js_err)?;
        context
            .register_global_property(js_string!("window"), window, Attribute::all())
            .map_err(js_err)?;

        tracing::trace!(forms = forms.len(), controls = controls.len(), "DOM bindings installed");

        Ok(DomBindings {
            forms,
            controls,
            submitted,
            document: document_obj,
            href,
        })
    }
}

impl DomBindings {
    /// Copy changed field values and checked states back to the DOM
    pub fn write_back(&self, context: &mut Context) -> Result<()> {
        for control in &self.controls {
            let value = control
                .object
                .get(js_string!("value"), context)
                .map_err(js_err)?;
            let value = value.to_string(context).map_err(js_err)?.to_std_string_escaped();
            if value != control.value {
                control.element.set_value(value);
            }

            let checked = control
                .object
                .get(js_string!("checked"), context)
                .map_err(js_err)?
                .to_boolean();
            if checked != control.checked {
                control.element.set_checked(checked);
            }
        }
        Ok(())
    }

    /// Form passed to the first `submit()` call
    pub fn submitted(&self) -> Option<Element> {
        let index = (*self.submitted.borrow())?;
        self.forms.get(index).cloned()
    }

    /// Target assigned to `location`, `window.location` or `document.location`
    pub fn navigation(&self, context: &mut Context) -> Result<Option<String>> {
        let global = context.global_object().clone();
        for holder in [&global, &self.document] {
            let value = holder.get(js_string!("location"), context).map_err(js_err)?;
            if value.is_undefined() {
                continue;
            }
            let target = match value.as_object() {
                Some(object) => object.get(js_string!("href"), context).map_err(js_err)?,
                None => value.clone(),
            };
            let target = target.to_string(context).map_err(js_err)?.to_std_string_escaped();
            if target != self.href {
                return Ok(Some(target));
            }
        }
        Ok(None)
    }
}
