//! Shared fixtures for API integration tests: recording channel doubles, an
//! app builder using them, and request helpers.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use consult_api::config::ServerConfig;
use consult_api::router::build_app_router;
use consult_api::state::AppState;
use consult_api::wizard::{Navigator, WizardSessions};
use consult_notify::delivery::backend::{BackendError, BackendResponse, EmailBackend};
use consult_notify::delivery::emailjs::{EmailProvider, EmailProviderError, SendResult};
use consult_notify::{DispatcherConfig, NotificationDispatcher, RecordingNotifier, TemplateFields};

pub const ADMIN_EMAIL: &str = "admin@consultpro.example";
pub const SUCCESS_PATH: &str = "/booking/success";

/// Ordered record of every channel call and redirect.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

// ---------------------------------------------------------------------------
// Channel doubles
// ---------------------------------------------------------------------------

pub struct MockEmailProvider {
    log: CallLog,
    succeed: AtomicBool,
    sends: Mutex<Vec<(String, TemplateFields)>>,
}

impl MockEmailProvider {
    pub fn set_succeed(&self, succeed: bool) {
        self.succeed.store(succeed, Ordering::SeqCst);
    }

    pub fn sends(&self) -> Vec<(String, TemplateFields)> {
        self.sends.lock().unwrap().clone()
    }

    /// Sends made with the given template.
    pub fn sends_for(&self, template_id: &str) -> Vec<TemplateFields> {
        self.sends()
            .into_iter()
            .filter(|(id, _)| id == template_id)
            .map(|(_, fields)| fields)
            .collect()
    }
}

#[async_trait]
impl EmailProvider for MockEmailProvider {
    async fn send(
        &self,
        template_id: &str,
        fields: &TemplateFields,
    ) -> Result<SendResult, EmailProviderError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("email_provider:{template_id}"));
        self.sends
            .lock()
            .unwrap()
            .push((template_id.to_string(), fields.clone()));

        if self.succeed.load(Ordering::SeqCst) {
            Ok(SendResult {
                status: 200,
                text: "OK".to_string(),
            })
        } else {
            Err(EmailProviderError::Rejected {
                status: 500,
                body: "provider down".to_string(),
            })
        }
    }
}

/// Email provider whose sends never complete.
pub struct StalledEmailProvider;

#[async_trait]
impl EmailProvider for StalledEmailProvider {
    async fn send(
        &self,
        _template_id: &str,
        _fields: &TemplateFields,
    ) -> Result<SendResult, EmailProviderError> {
        std::future::pending().await
    }
}

pub struct MockBackend {
    log: CallLog,
    succeed: AtomicBool,
    confirmations: Mutex<Vec<(String, String)>>,
    subscriptions: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn set_succeed(&self, succeed: bool) {
        self.succeed.store(succeed, Ordering::SeqCst);
    }

    pub fn confirmations(&self) -> Vec<(String, String)> {
        self.confirmations.lock().unwrap().clone()
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.subscriptions.lock().unwrap().clone()
    }

    fn result(&self, message: &str) -> Result<BackendResponse, BackendError> {
        if self.succeed.load(Ordering::SeqCst) {
            Ok(BackendResponse {
                message: message.to_string(),
            })
        } else {
            Err(BackendError::HttpStatus(503))
        }
    }
}

#[async_trait]
impl EmailBackend for MockBackend {
    async fn send_confirmation(
        &self,
        email: &str,
        name: &str,
    ) -> Result<BackendResponse, BackendError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("http_backend:confirmation:{email}"));
        self.confirmations
            .lock()
            .unwrap()
            .push((email.to_string(), name.to_string()));
        self.result("Confirmation email sent")
    }

    async fn subscribe_newsletter(&self, email: &str) -> Result<BackendResponse, BackendError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("http_backend:newsletter:{email}"));
        self.subscriptions.lock().unwrap().push(email.to_string());
        self.result("Successfully subscribed to newsletter")
    }
}

/// Navigator writing redirects into the shared call log.
pub struct LoggingNavigator {
    log: CallLog,
}

impl Navigator for LoggingNavigator {
    fn redirect(&self, path: &str) {
        self.log.lock().unwrap().push(format!("redirect:{path}"));
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub log: CallLog,
    pub email: Arc<MockEmailProvider>,
    pub backend: Arc<MockBackend>,
    pub notifier: Arc<RecordingNotifier>,
    pub dispatcher: NotificationDispatcher,
    pub navigator: LoggingNavigator,
}

pub fn harness(email_ok: bool, backend_ok: bool) -> Harness {
    let log: CallLog = Arc::default();
    let email = Arc::new(MockEmailProvider {
        log: log.clone(),
        succeed: AtomicBool::new(email_ok),
        sends: Mutex::new(Vec::new()),
    });
    let backend = Arc::new(MockBackend {
        log: log.clone(),
        succeed: AtomicBool::new(backend_ok),
        confirmations: Mutex::new(Vec::new()),
        subscriptions: Mutex::new(Vec::new()),
    });
    let notifier = Arc::new(RecordingNotifier::new());
    let dispatcher = NotificationDispatcher::new(
        email.clone(),
        backend.clone(),
        notifier.clone(),
        DispatcherConfig::new(ADMIN_EMAIL),
    );
    Harness {
        navigator: LoggingNavigator { log: log.clone() },
        log,
        email,
        backend,
        notifier,
        dispatcher,
    }
}

/// A dispatcher sharing the harness backend and notifier whose email
/// provider stalls forever.
pub fn stalled_dispatcher(h: &Harness) -> NotificationDispatcher {
    NotificationDispatcher::new(
        Arc::new(StalledEmailProvider),
        h.backend.clone(),
        h.notifier.clone(),
        DispatcherConfig::new(ADMIN_EMAIL),
    )
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        email_timeout_secs: 10,
        shutdown_timeout_secs: 30,
        session_ttl_secs: 7200,
        booking_success_path: SUCCESS_PATH.to_string(),
    }
}

/// Build the full application router over the harness doubles, with the
/// SMTP relay disabled.
pub fn build_test_app(h: &Harness) -> (Router, AppState) {
    let config = test_config();
    let state = AppState {
        config: Arc::new(config.clone()),
        sessions: Arc::new(WizardSessions::new(
            Duration::from_secs(config.session_ttl_secs),
            SUCCESS_PATH,
        )),
        dispatcher: h.dispatcher.clone(),
        backend: h.backend.clone(),
        mailer: None,
    };
    (build_app_router(state.clone(), &config), state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn patch_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Booking data
// ---------------------------------------------------------------------------

pub fn service_json() -> Value {
    json!({
        "id": "web-development",
        "name": "Web Application Development",
        "duration_minutes": 60,
        "price": 500,
        "category": "Development"
    })
}

pub fn consultant_json() -> Value {
    json!({
        "id": "1",
        "name": "Sarah Johnson",
        "role": "Senior Business Consultant",
        "avatar_label": "SJ",
        "rating": 4.9
    })
}

pub fn schedule_json() -> Value {
    json!({
        "date": "2024-01-20",
        "time": "2:00 PM",
        "timezone": "America/New_York"
    })
}

pub fn details_json() -> Value {
    json!({
        "project_description": "redesign",
        "goals": "30% conversion lift",
        "budget": "$1,000-$2,500",
        "urgency": "medium",
        "preferred_format": "video"
    })
}

pub fn contact_json() -> Value {
    json!({
        "name": "John Doe",
        "email": "john@company.com",
        "company": "Tech Solutions Inc."
    })
}
