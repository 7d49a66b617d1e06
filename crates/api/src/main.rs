use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use consult_api::config::ServerConfig;
use consult_api::router::build_app_router;
use consult_api::state::AppState;
use consult_api::wizard::{SessionReaper, WizardSessions};
use consult_notify::{
    BackendConfig, DisabledEmailProvider, DispatcherConfig, EmailBackend, EmailJsClient,
    EmailJsConfig, EmailProvider, HttpEmailBackend, NotificationDispatcher, SmtpConfig,
    SmtpMailer, TracingNotifier,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "consult_api=debug,consult_notify=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Delivery channels ---
    let http = reqwest::Client::builder()
        .timeout(config.email_timeout())
        .build()
        .expect("Failed to build HTTP client");

    let email: Arc<dyn EmailProvider> = match EmailJsConfig::from_env() {
        Some(emailjs) => {
            tracing::info!(service_id = %emailjs.service_id, "Email provider configured");
            Arc::new(EmailJsClient::new(http.clone(), emailjs))
        }
        None => {
            tracing::warn!(
                "EMAILJS_SERVICE_ID / EMAILJS_PUBLIC_KEY not set, booking and contact emails will fail"
            );
            Arc::new(DisabledEmailProvider)
        }
    };

    let backend_config = BackendConfig::from_env();
    tracing::info!(base_url = %backend_config.base_url, "Email backend configured");
    let backend: Arc<dyn EmailBackend> = Arc::new(HttpEmailBackend::new(http, backend_config));

    let mailer = match SmtpConfig::from_env() {
        Some(smtp) => {
            let host = smtp.smtp_host.clone();
            let mailer = SmtpMailer::new(smtp).expect("Failed to build SMTP transport");
            tracing::info!(%host, "SMTP relay enabled");
            Some(Arc::new(mailer))
        }
        None => {
            tracing::info!("SMTP_HOST not set, /email/* relay disabled");
            None
        }
    };

    let dispatcher_config = DispatcherConfig::from_env();
    tracing::info!(admin = %dispatcher_config.admin_email, "Notification dispatcher configured");
    let dispatcher = NotificationDispatcher::new(
        email,
        Arc::clone(&backend),
        Arc::new(TracingNotifier),
        dispatcher_config,
    );

    // --- Wizard sessions ---
    let sessions = Arc::new(WizardSessions::new(
        config.session_ttl(),
        config.booking_success_path.clone(),
    ));

    let reaper_cancel = tokio_util::sync::CancellationToken::new();
    let reaper = SessionReaper::new(Arc::clone(&sessions));
    let reaper_handle = {
        let cancel = reaper_cancel.clone();
        tokio::spawn(async move {
            reaper.run(cancel).await;
        })
    };
    tracing::info!(ttl_secs = config.session_ttl_secs, "Session reaper started");

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        sessions,
        dispatcher: dispatcher.clone(),
        backend,
        mailer,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    reaper_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), reaper_handle).await;
    tracing::info!("Session reaper stopped");

    let in_flight = dispatcher.detached_in_flight();
    if in_flight > 0 {
        tracing::info!(in_flight, "Waiting for detached confirmation emails");
    }
    let drain = tokio::time::timeout(
        Duration::from_secs(config.shutdown_timeout_secs),
        dispatcher.drain_detached(),
    )
    .await;
    if drain.is_err() {
        tracing::warn!(
            remaining = dispatcher.detached_in_flight(),
            "Shutdown timeout reached with confirmation emails still in flight"
        );
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
