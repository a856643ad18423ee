// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! In-process stand-in for the SchoolMate entry script
//!
//! Serves the login page, the admin menu, the manage lists and edit forms
//! of the list-navigated fixtures, and keeps their records in memory.
//! Output is rendered raw unless the app is started in escaping mode.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use wiremock::matchers::path;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use super::entity::{EntityKind, Navigation};
use crate::config::Environment;
use crate::restore::SESSION_COOKIE;

const ADMIN_USERNAME: &str = "test";
const ADMIN_PASSWORD: &str = "test";

/// `page2` value of each admin section
const SECTIONS: [(&str, EntityKind); 6] = [
    ("1", EntityKind::Teacher),
    ("2", EntityKind::Student),
    ("3", EntityKind::Semester),
    ("4", EntityKind::Parent),
    ("5", EntityKind::User),
    ("6", EntityKind::Announcement),
];

#[derive(Debug, Default)]
struct AppState {
    escape_output: bool,
    next_session: u32,
    active: HashSet<String>,
    records: HashMap<EntityKind, Vec<String>>,
    last_selected: Option<String>,
    failing_saves: usize,
    ended: Vec<String>,
    requests: usize,
}

struct Responder(Arc<Mutex<AppState>>);

/// Handle on a running fake application
pub(crate) struct FakeSchoolMate {
    server: MockServer,
    state: Arc<Mutex<AppState>>,
}

impl FakeSchoolMate {
    /// Vulnerable app: stored values are echoed raw
    pub(crate) async fn start() -> Self {
        Self::start_with(false).await
    }

    /// Fixed app: stored values are HTML-escaped on output
    pub(crate) async fn start_escaping() -> Self {
        Self::start_with(true).await
    }

    async fn start_with(escape_output: bool) -> Self {
        let mut records = HashMap::new();
        for (_, kind) in SECTIONS {
            let seeded = match kind.contract().canonical {
                Some(values) => values.iter().map(|v| v.to_string()).collect(),
                None => kind.contract().fields.iter().map(|f| format!("seeded {}", f)).collect(),
            };
            records.insert(kind, seeded);
        }
        let state = Arc::new(Mutex::new(AppState {
            escape_output,
            records,
            ..Default::default()
        }));

        let server = MockServer::start().await;
        Mock::given(path("/index.php"))
            .respond_with(Responder(state.clone()))
            .mount(&server)
            .await;
        Self { server, state }
    }

    pub(crate) fn uri(&self) -> String {
        self.server.uri()
    }

    pub(crate) fn environment(&self) -> Environment {
        Environment::new()
            .base_url(self.uri())
            .expect("mock server uri is a valid base")
    }

    pub(crate) fn record(&self, kind: EntityKind) -> Vec<String> {
        self.state.lock().records.get(&kind).cloned().unwrap_or_default()
    }

    pub(crate) fn is_active(&self, session: &str) -> bool {
        self.state.lock().active.contains(session)
    }

    pub(crate) fn last_selected(&self) -> Option<String> {
        self.state.lock().last_selected.clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.state.lock().requests
    }

    /// Sessions ended through the `logout` field, oldest first
    pub(crate) fn ended_sessions(&self) -> Vec<String> {
        self.state.lock().ended.clone()
    }

    /// Store the next edit but answer it with a 500
    pub(crate) fn fail_next_save(&self) {
        self.fail_saves(1);
    }

    /// Store the next `count` edits, raw restorations included, but answer 500
    pub(crate) fn fail_saves(&self, count: usize) {
        self.state.lock().failing_saves = count;
    }
}

fn field<'a>(form: &'a [(String, String)], name: &str) -> Option<&'a str> {
    form.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
}

fn session_of(request: &Request) -> Option<String> {
    let header = request.headers.get("cookie")?.to_str().ok()?;
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/html")
}

fn page(body: &str) -> String {
    format!(
        "<html><head><title>SchoolMate - Administrator</title></head><body>{}</body></html>",
        body
    )
}

fn login_page(message: &str) -> String {
    format!(
        r#"<html><head><title>SchoolMate</title></head><body>
        <p>{}</p>
        <form name="login" action="./index.php" method="POST">
            <input type="text" name="username">
            <input type="password" name="password">
            <input type="hidden" name="login" value="1">
            <input type="submit" value="Login">
        </form></body></html>"#,
        message
    )
}

fn admin_main() -> String {
    let links: String = SECTIONS
        .iter()
        .map(|(page2, kind)| {
            format!(
                r#"<a href="javascript: document.admin.page2.value={}; document.admin.submit();">{}</a><br>"#,
                page2,
                kind.contract().navigation.menu_link()
            )
        })
        .collect();
    page(&format!(
        r#"<form name="admin" action="./index.php" method="POST">
            <input type="hidden" name="page2" value="0">
            <input type="hidden" name="page" value="1">
        </form>{}"#,
        links
    ))
}

impl AppState {
    fn render(&self, raw: &str) -> String {
        if self.escape_output {
            escape(raw)
        } else {
            raw.to_string()
        }
    }

    fn login(&mut self, form: &[(String, String)]) -> ResponseTemplate {
        let valid = field(form, "username") == Some(ADMIN_USERNAME)
            && field(form, "password") == Some(ADMIN_PASSWORD);
        if !valid {
            return html(login_page("Invalid username or password"));
        }
        self.next_session += 1;
        let session = format!("fake{:08}", self.next_session);
        self.active.insert(session.clone());
        html(admin_main()).insert_header(
            "set-cookie",
            format!("{}={}; path=/", SESSION_COOKIE, session).as_str(),
        )
    }

    fn section(
        &mut self,
        page2: &str,
        kind: EntityKind,
        form: &[(String, String)],
    ) -> ResponseTemplate {
        let contract = kind.contract();
        let Navigation::List {
            list_form,
            checkbox_value,
            edit_button,
            heading,
            ..
        } = contract.navigation
        else {
            return html(admin_main());
        };

        if field(form, contract.edit_form) == Some("1") {
            if let Some(record) = self.records.get_mut(&kind) {
                for (slot, name) in record.iter_mut().zip(contract.fields) {
                    if let Some(value) = field(form, name) {
                        *slot = value.to_string();
                    }
                }
            }
            if self.failing_saves > 0 {
                self.failing_saves -= 1;
                return ResponseTemplate::new(500);
            }
        } else if field(form, "action") == Some(edit_button) {
            self.last_selected = field(form, "delete[]").map(str::to_string);
            if self.last_selected.is_some() {
                return html(self.edit_page(page2, kind));
            }
        }

        let record = self.records.get(&kind).cloned().unwrap_or_default();
        let selected = checkbox_value.unwrap_or("1");
        let rows: String = ["1", "2"]
            .iter()
            .map(|id| {
                let text = if *id == selected {
                    self.render(&record.join(" "))
                } else {
                    "other".to_string()
                };
                format!(
                    r#"<tr><td><input type="checkbox" name="delete[]" value="{}"></td><td>{}</td></tr>"#,
                    id, text
                )
            })
            .collect();

        html(page(&format!(
            r#"<h1>{}</h1>
            <form name="{}" action="./index.php" method="POST">
                <table>{}</table>
                <input type="submit" name="action" value="{}">
                <input type="hidden" name="page2" value="{}">
                <input type="hidden" name="page" value="1">
            </form>"#,
            heading, list_form, rows, edit_button, page2
        )))
    }

    fn edit_page(&self, page2: &str, kind: EntityKind) -> String {
        let contract = kind.contract();
        let record = self.records.get(&kind).cloned().unwrap_or_default();
        let inputs: String = contract
            .fields
            .iter()
            .zip(record.iter())
            .map(|(name, value)| {
                let input_type = if name.starts_with("password") { "password" } else { "text" };
                format!(
                    r#"<input type="{}" name="{}" value="{}">"#,
                    input_type,
                    name,
                    self.render(value)
                )
            })
            .collect();

        page(&format!(
            r#"<h2>Edit record</h2>
            <form name="{form}" action="./index.php" method="POST">
                {inputs}
                <input type="hidden" name="{form}" value="0">
                <input type="hidden" name="page2" value="{page2}">
                <input type="hidden" name="page" value="1">
                <input type="submit" value="{button}" onclick="document.{form}.{form}.value=1;">
            </form>"#,
            form = contract.edit_form,
            inputs = inputs,
            page2 = page2,
            button = contract.submit_button
        ))
    }
}

impl Respond for Responder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut state = self.0.lock();
        state.requests += 1;

        if request.method.as_str() != "POST" {
            return html(login_page(""));
        }

        let form: Vec<(String, String)> = url::form_urlencoded::parse(&request.body)
            .into_owned()
            .collect();
        if field(&form, "login") == Some("1") {
            return state.login(&form);
        }

        // index.php answers a dead session with a 200 login page, so a raw
        // restoration sent on it is reported as a success by status alone
        let Some(session) = session_of(request).filter(|s| state.active.contains(s)) else {
            return html(login_page("Please log in"));
        };

        let response = match SECTIONS
            .iter()
            .find(|(page2, _)| field(&form, "page2") == Some(*page2))
        {
            Some((page2, kind)) => state.section(page2, *kind, &form),
            None => html(admin_main()),
        };

        if field(&form, "logout").is_some() {
            state.active.remove(&session);
            state.ended.push(session);
        }
        response
    }
}
