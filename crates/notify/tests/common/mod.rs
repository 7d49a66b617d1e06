//! Recording channel doubles shared by the dispatcher tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use consult_core::booking::{
    CompletedBooking, ConsultantSelection, ContactInfo, PreferredFormat, ProjectDetails, Schedule,
    ServiceSelection, Urgency,
};
use consult_notify::delivery::backend::{BackendError, BackendResponse, EmailBackend};
use consult_notify::delivery::emailjs::{EmailProvider, EmailProviderError, SendResult};
use consult_notify::{DispatcherConfig, NotificationDispatcher, RecordingNotifier, TemplateFields};

pub const ADMIN_EMAIL: &str = "admin@consultpro.example";

/// Ordered record of every channel call across all doubles.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

// ---------------------------------------------------------------------------
// Email provider double
// ---------------------------------------------------------------------------

pub struct MockEmailProvider {
    log: CallLog,
    succeed: AtomicBool,
    sends: Mutex<Vec<(String, TemplateFields)>>,
}

impl MockEmailProvider {
    pub fn new(log: CallLog, succeed: bool) -> Arc<Self> {
        Arc::new(Self {
            log,
            succeed: AtomicBool::new(succeed),
            sends: Mutex::new(Vec::new()),
        })
    }

    pub fn set_succeed(&self, succeed: bool) {
        self.succeed.store(succeed, Ordering::SeqCst);
    }

    pub fn sends(&self) -> Vec<(String, TemplateFields)> {
        self.sends.lock().unwrap().clone()
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

// ---------------------------------------------------------------------------
// Backend double
// ---------------------------------------------------------------------------

pub struct MockBackend {
    log: CallLog,
    succeed: AtomicBool,
    confirmations: Mutex<Vec<(String, String)>>,
    subscriptions: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new(log: CallLog, succeed: bool) -> Arc<Self> {
        Arc::new(Self {
            log,
            succeed: AtomicBool::new(succeed),
            confirmations: Mutex::new(Vec::new()),
            subscriptions: Mutex::new(Vec::new()),
        })
    }

    pub fn confirmations(&self) -> Vec<(String, String)> {
        self.confirmations.lock().unwrap().clone()
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.subscriptions.lock().unwrap().clone()
    }

    fn result(&self) -> Result<BackendResponse, BackendError> {
        if self.succeed.load(Ordering::SeqCst) {
            Ok(BackendResponse {
                message: "sent".to_string(),
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
            .push("http_backend:confirmation".to_string());
        self.confirmations
            .lock()
            .unwrap()
            .push((email.to_string(), name.to_string()));
        self.result()
    }

    async fn subscribe_newsletter(&self, email: &str) -> Result<BackendResponse, BackendError> {
        self.log
            .lock()
            .unwrap()
            .push("http_backend:newsletter".to_string());
        self.subscriptions.lock().unwrap().push(email.to_string());
        self.result()
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub struct Harness {
    pub log: CallLog,
    pub email: Arc<MockEmailProvider>,
    pub backend: Arc<MockBackend>,
    pub notifier: Arc<RecordingNotifier>,
    pub dispatcher: NotificationDispatcher,
}

pub fn harness(email_ok: bool, backend_ok: bool) -> Harness {
    let log = call_log();
    let email = MockEmailProvider::new(log.clone(), email_ok);
    let backend = MockBackend::new(log.clone(), backend_ok);
    let notifier = Arc::new(RecordingNotifier::new());
    let dispatcher = NotificationDispatcher::new(
        email.clone(),
        backend.clone(),
        notifier.clone(),
        DispatcherConfig::new(ADMIN_EMAIL),
    );
    Harness {
        log,
        email,
        backend,
        notifier,
        dispatcher,
    }
}

pub fn sample_booking() -> CompletedBooking {
    CompletedBooking {
        service: ServiceSelection {
            id: "web-development".to_string(),
            name: "Web Application Development".to_string(),
            duration_minutes: 60,
            price: 500,
            category: "Development".to_string(),
        },
        consultant: ConsultantSelection {
            id: "1".to_string(),
            name: "Sarah Johnson".to_string(),
            role: "Senior Business Consultant".to_string(),
            avatar_label: "SJ".to_string(),
            rating: 4.9,
        },
        schedule: Schedule {
            date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            time: "2:00 PM".to_string(),
            timezone: "America/New_York".to_string(),
        },
        details: ProjectDetails {
            project_description: "redesign".to_string(),
            goals: "30% conversion lift".to_string(),
            budget: "$1,000-$2,500".to_string(),
            urgency: Urgency::Medium,
            preferred_format: PreferredFormat::Video,
        },
        contact_info: ContactInfo {
            name: "John Doe".to_string(),
            email: "john@company.com".to_string(),
            phone: String::new(),
            company: "Tech Solutions Inc.".to_string(),
        },
    }
}
