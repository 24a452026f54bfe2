use crate::app::App;
use crate::auth::{register_staff, BearerTokenIdentity, Role};
use crate::config::Config;
use crate::db::connection::init_db;
use crate::db::staff::StaffMember;
use crate::notify::{EmailSender, Notifier, NotifyError, SmsSender};
use astra::{Body, Request, Response};
use serde_json::Value;
use std::io::Read;
use std::ops::Deref;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub channel: &'static str,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Shared record of every message the app tried to send.
#[derive(Clone, Default)]
pub struct Outbox(Arc<Mutex<Vec<Sent>>>);

impl Outbox {
    pub fn sent(&self) -> Vec<Sent> {
        self.0.lock().unwrap().clone()
    }

    pub fn with_subject(&self, subject: &str) -> Vec<Sent> {
        self.sent().into_iter().filter(|s| s.subject == subject).collect()
    }
}

impl EmailSender for Outbox {
    fn send_email(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        self.0.lock().unwrap().push(Sent {
            channel: "email",
            recipient: recipient.into(),
            subject: subject.into(),
            body: body.into(),
        });
        Ok(())
    }
}

impl SmsSender for Outbox {
    fn send_sms(&self, recipient: &str, body: &str) -> Result<(), NotifyError> {
        self.0.lock().unwrap().push(Sent {
            channel: "sms",
            recipient: recipient.into(),
            subject: String::new(),
            body: body.into(),
        });
        Ok(())
    }
}

/// Always fails, like an unreachable mail provider.
pub struct Unreachable;

impl EmailSender for Unreachable {
    fn send_email(&self, _: &str, _: &str, _: &str) -> Result<(), NotifyError> {
        Err(NotifyError::RequestFailed("connection refused".into()))
    }
}

/// An app whose database lives in a temp directory. The directory and the
/// database file are removed when this is dropped.
pub struct TestApp {
    pub app: App,
    _dir: TempDir,
}

impl Deref for TestApp {
    type Target = App;

    fn deref(&self) -> &App {
        &self.app
    }
}

fn build_app(notifier: Notifier) -> TestApp {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = Config {
        database_path: dir.path().join("complaints.sqlite3").to_string_lossy().into_owned(),
        public_base_url: "http://water.test".into(),
        ..Config::default()
    };
    let app = App::with_parts(config, notifier, Box::new(BearerTokenIdentity));
    init_db(&app.db).unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    TestApp { app, _dir: dir }
}

/// Fresh app on its own temp-file database, with a recording notifier.
pub fn init_test_app() -> (TestApp, Outbox) {
    let outbox = Outbox::default();
    let notifier = Notifier::new(Box::new(outbox.clone()), Some(Box::new(outbox.clone())));
    (build_app(notifier), outbox)
}

pub fn init_test_app_with_failing_mail() -> TestApp {
    build_app(Notifier::new(Box::new(Unreachable), None))
}

pub fn add_staff(app: &App, username: &str, role: Role) -> (StaffMember, String) {
    register_staff(&app.db, username, role, None, 0).expect("Failed to create staff member")
}

pub fn get(uri: &str, token: Option<&str>) -> Request {
    let mut builder = http::Request::builder().method("GET").uri(uri);
    if let Some(t) = token {
        builder = builder.header("Authorization", format!("Bearer {t}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, form: &str, token: Option<&str>) -> Request {
    let mut builder = http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded");
    if let Some(t) = token {
        builder = builder.header("Authorization", format!("Bearer {t}"));
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

pub fn body_bytes(resp: Response) -> Vec<u8> {
    let mut bytes = Vec::new();
    resp.into_body().reader().read_to_end(&mut bytes).unwrap();
    bytes
}

pub fn body_json(resp: Response) -> Value {
    serde_json::from_slice(&body_bytes(resp)).expect("response was not JSON")
}

/// Submit a complaint through the public route and return its id.
pub fn submit(app: &App, form: &str) -> i64 {
    let resp = crate::router::respond(post_form("/complaints", form, None), app);
    assert_eq!(resp.status(), 201);
    body_json(resp)["id"].as_i64().unwrap()
}
