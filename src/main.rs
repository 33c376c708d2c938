//! TutorHub booking service.
//!
//! Configuration comes from `TUTORHUB__*` environment variables (and `.env`).
//! With nothing set, the service starts in development mode with mock
//! payments, meetings and auth, JSON-file storage and the built-in directory.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use tutorhub::adapters::auth::{JwtConfig, JwtSessionValidator, MockSessionValidator};
use tutorhub::adapters::events::TracingEventPublisher;
use tutorhub::adapters::http::{app_router, AppState, RouterSettings};
use tutorhub::adapters::meeting::{HttpMeetingConfig, HttpMeetingProvider, MockMeetingProvider};
use tutorhub::adapters::storage::{InMemorySessionRepository, JsonFileSessionRepository};
use tutorhub::adapters::stripe::{MockPaymentProvider, StripeConfig, StripePaymentAdapter};
use tutorhub::application::handlers::{CheckoutUrls, MeetingScheduler};
use tutorhub::config::{
    AppConfig, AuthBackend, MeetingBackend, PaymentBackend, ServerConfig, StorageBackend,
};
use tutorhub::domain::booking::PlanCatalog;
use tutorhub::domain::directory::ProviderDirectory;
use tutorhub::domain::foundation::Role;
use tutorhub::ports::{MeetingProvider, PaymentProvider, SessionRepository, SessionValidator};

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if server.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn repository(config: &AppConfig) -> Arc<dyn SessionRepository> {
    match config.storage.backend {
        StorageBackend::Memory => Arc::new(InMemorySessionRepository::new()),
        StorageBackend::JsonFile => Arc::new(JsonFileSessionRepository::new(&config.storage.path)),
    }
}

fn payment_provider(config: &AppConfig) -> anyhow::Result<Arc<dyn PaymentProvider>> {
    let payment = &config.payment;
    match payment.provider {
        PaymentBackend::Mock => {
            tracing::warn!("Using mock payment provider; no money moves");
            Ok(Arc::new(MockPaymentProvider::new()))
        }
        PaymentBackend::Stripe => {
            let api_key = payment.api_key.clone().context("payment.api_key is required")?;
            let webhook_secret = payment
                .webhook_secret
                .clone()
                .context("payment.webhook_secret is required")?;
            let mut stripe = StripeConfig::new(api_key, webhook_secret)
                .with_currency(payment.currency.clone())
                .with_require_livemode(payment.require_livemode);
            if let Some(url) = &payment.api_base_url {
                stripe = stripe.with_base_url(url.clone());
            }
            Ok(Arc::new(StripePaymentAdapter::new(stripe)))
        }
    }
}

fn meeting_provider(config: &AppConfig) -> anyhow::Result<Arc<dyn MeetingProvider>> {
    let meeting = &config.meeting;
    match meeting.provider {
        MeetingBackend::Mock => Ok(Arc::new(MockMeetingProvider::new())),
        MeetingBackend::Http => {
            let token = meeting.api_token.clone().context("meeting.api_token is required")?;
            let http = HttpMeetingConfig::new(token)
                .with_base_url(meeting.base_url.clone())
                .with_default_host(meeting.default_host.clone())
                .with_timeout(meeting.timeout());
            Ok(Arc::new(HttpMeetingProvider::new(http)?))
        }
    }
}

fn session_validator(config: &AppConfig) -> anyhow::Result<Arc<dyn SessionValidator>> {
    let auth = &config.auth;
    match auth.provider {
        AuthBackend::Mock => {
            tracing::warn!(
                tokens = "dev-student, dev-provider, dev-admin",
                "Using mock auth"
            );
            Ok(Arc::new(
                MockSessionValidator::new()
                    .with_test_user("dev-student", "student-1", Role::Student)
                    .with_test_user("dev-provider", "tutor-math-1", Role::Provider)
                    .with_test_user("dev-admin", "admin-1", Role::Admin),
            ))
        }
        AuthBackend::Jwt => {
            let secret = auth.jwt_secret.clone().context("auth.jwt_secret is required")?;
            let mut jwt = JwtConfig::new(secret).with_leeway(auth.leeway_secs);
            if let Some(issuer) = &auth.issuer {
                jwt = jwt.with_issuer(issuer.clone());
            }
            if let Some(audience) = &auth.audience {
                jwt = jwt.with_audience(audience.clone());
            }
            Ok(Arc::new(JwtSessionValidator::new(jwt)))
        }
    }
}

fn directory(config: &AppConfig) -> anyhow::Result<ProviderDirectory> {
    match &config.directory.path {
        Some(path) => ProviderDirectory::load(path)
            .with_context(|| format!("loading provider directory {}", path.display())),
        None => {
            tracing::info!("No directory file configured; using the built-in directory");
            Ok(ProviderDirectory::seed())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    init_tracing(&config.server);
    config.validate().context("invalid configuration")?;

    let directory = directory(&config)?;
    tracing::info!(providers = directory.len(), "Provider directory ready");

    let meetings = MeetingScheduler::new(meeting_provider(&config)?, config.meeting.max_attempts)
        .with_retry_delay(config.meeting.retry_delay());

    let state = AppState {
        repository: repository(&config),
        payment_provider: payment_provider(&config)?,
        meetings: Arc::new(meetings),
        event_publisher: Arc::new(TracingEventPublisher::new()),
        session_validator: session_validator(&config)?,
        directory: Arc::new(directory),
        plans: Arc::new(PlanCatalog::standard()),
        checkout_urls: CheckoutUrls {
            success_url: config.payment.success_url.clone(),
            cancel_url: config.payment.cancel_url.clone(),
        },
    };

    let app = app_router(state, &RouterSettings::from(&config.server));
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        storage = ?config.storage.backend,
        "TutorHub listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
