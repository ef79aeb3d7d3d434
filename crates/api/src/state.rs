use std::sync::Arc;

use learnlabs_llm::GenerationClient;
use learnlabs_mail::OtpMailer;
use learnlabs_worker::GenerationQueue;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is a pool, an `Arc`, or a handle around one.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: learnlabs_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Structured-output client, used directly for roadmap generation.
    pub llm: GenerationClient,
    /// Course generation queue; also gives access to the job tracker.
    pub generation: GenerationQueue,
    /// OTP delivery (SMTP, or the log fallback in development).
    pub mailer: Arc<dyn OtpMailer>,
}
