use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use learnlabs_api::config::ServerConfig;
use learnlabs_api::router::build_app_router;
use learnlabs_api::state::AppState;
use learnlabs_core::otp::OTP_EXPIRY_MINUTES;
use learnlabs_llm::{ChatCompletionsProvider, GenerationClient, LlmConfig};
use learnlabs_mail::{EmailConfig, LogMailer, OtpMailer, SmtpMailer};
use learnlabs_pipeline::{CourseGenerator, PgContentStore};
use learnlabs_worker::WorkerSettings;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "learnlabs_api=debug,learnlabs_pipeline=info,learnlabs_worker=info,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = learnlabs_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    learnlabs_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    learnlabs_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Generation client ---
    let llm_config = LlmConfig::from_env();
    tracing::info!(model = %llm_config.model, base_url = %llm_config.base_url, "Loaded LLM configuration");
    // One generation may take a provider call plus one repair call.
    let generation_budget = llm_config.request_timeout * 2;
    if Duration::from_secs(config.generation_request_timeout_secs) < generation_budget {
        tracing::warn!(
            generation_request_timeout_secs = config.generation_request_timeout_secs,
            budget_secs = generation_budget.as_secs(),
            "GENERATION_REQUEST_TIMEOUT_SECS is below twice LLM_REQUEST_TIMEOUT_SECS, slow roadmap generations will time out"
        );
    }
    let provider =
        ChatCompletionsProvider::new(llm_config).expect("Failed to build LLM HTTP client");
    let llm = GenerationClient::new(Arc::new(provider));

    // --- Mailer ---
    let mailer: Arc<dyn OtpMailer> = match EmailConfig::from_env(OTP_EXPIRY_MINUTES) {
        Some(email_config) => {
            tracing::info!(smtp_host = %email_config.smtp_host, "SMTP mailer configured");
            Arc::new(SmtpMailer::new(email_config))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, OTP codes will be logged instead of emailed");
            Arc::new(LogMailer)
        }
    };

    // --- Generation workers ---
    let shutdown = CancellationToken::new();
    let generator = CourseGenerator::new(
        llm.clone(),
        Arc::new(PgContentStore::new(pool.clone())),
        config.generation.throttle,
    );
    let (generation, worker_handles) = learnlabs_worker::start(
        generator,
        WorkerSettings {
            workers: config.generation.workers,
            queue_capacity: config.generation.queue_capacity,
        },
        shutdown.clone(),
    );

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        llm,
        generation,
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
    tracing::info!("Server stopped accepting connections, stopping generation workers");

    // Running jobs see the cancellation at their next chapter boundary.
    shutdown.cancel();
    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    for handle in worker_handles {
        if tokio::time::timeout(grace, handle).await.is_err() {
            tracing::warn!("Generation worker did not stop within the shutdown timeout");
        }
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
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
        _ = ctrl_c => tracing::info!("Received Ctrl-C, starting graceful shutdown"),
        _ = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
