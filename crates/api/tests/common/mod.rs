#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use learnlabs_api::auth::jwt::{generate_access_token, JwtConfig};
use learnlabs_api::auth::password::hash_password;
use learnlabs_api::config::{GenerationConfig, ServerConfig};
use learnlabs_api::router::build_app_router;
use learnlabs_api::state::AppState;
use learnlabs_core::roles::role_for;
use learnlabs_db::models::user::{CreateUser, User};
use learnlabs_db::repositories::UserRepo;
use learnlabs_llm::{CompletionProvider, CompletionRequest, GenerationClient, GenerationError};
use learnlabs_mail::{EmailError, OtpMailer};
use learnlabs_pipeline::{CourseGenerator, PgContentStore};
use learnlabs_worker::{GenerationQueue, WorkerSettings};

pub const TEST_PASSWORD: &str = "correct-horse-battery";

// ---------------------------------------------------------------------------
// Canned generator output
// ---------------------------------------------------------------------------

pub const OUTLINE_JSON: &str = r#"{
    "course_title": "Generated Course",
    "course_description": "A generated course",
    "level": "Beginner",
    "total_chapters": 2,
    "duration": 90,
    "chapters": [
        {"chapter_number": 1, "title": "Getting Started", "description": "Setup", "learning_objectives": ["install"], "estimated_duration": 45},
        {"chapter_number": 2, "title": "Next Steps", "description": "More", "learning_objectives": ["build"], "estimated_duration": 45}
    ]
}"#;

pub const CHAPTER_JSON: &str = r#"{
    "title": "Chapter",
    "duration": "45 minutes",
    "sections": [
        {"type": "content", "title": "Overview", "content": "Some prose."},
        {"type": "code", "title": "Example", "content": "fn main() {}", "language": "rust", "explanation": "An empty program."}
    ]
}"#;

pub const ROADMAP_JSON: &str = r#"{
    "name": "Rust Developer",
    "difficulty": "Intermediate",
    "slug": "rust-developer",
    "description": "From basics to async.",
    "steps": [
        {"title": "Ownership", "description": "Borrowing rules", "topic_slug": "ownership", "order_index": 2},
        {"title": "Rust Basics", "description": "Syntax and tooling", "topic_slug": "rust-basics", "order_index": 1}
    ]
}"#;

/// Answers every request with canned JSON chosen by target schema.
#[derive(Default)]
pub struct TestProvider {
    /// Fail every call with a provider error.
    pub failing: bool,
    /// Simulated provider latency per call.
    pub delay: Duration,
}

#[async_trait]
impl CompletionProvider for TestProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing {
            return Err(GenerationError::Api {
                status: 503,
                body: "model overloaded".into(),
            });
        }
        let body = match request.schema_name.as_str() {
            "CourseOutline" => OUTLINE_JSON,
            "RoadmapOutline" => ROADMAP_JSON,
            _ => CHAPTER_JSON,
        };
        Ok(body.to_string())
    }

    fn model_name(&self) -> &str {
        "test-model"
    }
}

/// Records OTP deliveries instead of sending them.
#[derive(Default)]
pub struct CapturingMailer {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl CapturingMailer {
    /// The last code sent to `email`.
    pub fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
    }
}

#[async_trait]
impl OtpMailer for CapturingMailer {
    async fn send_otp(&self, to_email: &str, code: &str) -> Result<(), EmailError> {
        self.sent
            .lock()
            .unwrap()
            .push((to_email.to_string(), code.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults and no generation throttle.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        generation_request_timeout_secs: 300,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "integration-test-secret-with-enough-entropy".to_string(),
            access_token_expiry_mins: 60,
        },
        generation: GenerationConfig {
            throttle: Duration::ZERO,
            workers: 1,
            queue_capacity: 8,
        },
    }
}

/// Everything a test may need to reach behind the router.
pub struct TestApp {
    pub router: Router,
    pub queue: GenerationQueue,
    pub mailer: Arc<CapturingMailer>,
    pub shutdown: CancellationToken,
}

/// Build the full application router, backed by the given pool, a canned
/// generator, and a running worker pool.
pub fn build_test_app(pool: PgPool) -> Router {
    spawn_test_app(pool, TestProvider::default()).router
}

pub fn spawn_test_app(pool: PgPool, provider: TestProvider) -> TestApp {
    let config = test_config();
    let llm = GenerationClient::new(Arc::new(provider));
    let mailer = Arc::new(CapturingMailer::default());
    let shutdown = CancellationToken::new();

    let generator = CourseGenerator::new(
        llm.clone(),
        Arc::new(PgContentStore::new(pool.clone())),
        config.generation.throttle,
    );
    let (queue, _workers) = learnlabs_worker::start(
        generator,
        WorkerSettings {
            workers: config.generation.workers,
            queue_capacity: config.generation.queue_capacity,
        },
        shutdown.clone(),
    );

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        llm,
        generation: queue.clone(),
        mailer: mailer.clone(),
    };

    TestApp {
        router: build_app_router(state, &config),
        queue,
        mailer,
        shutdown,
    }
}

// ---------------------------------------------------------------------------
// Users and tokens
// ---------------------------------------------------------------------------

/// Insert a user directly and return it with a valid bearer token.
pub async fn create_user_with_token(pool: &PgPool, username: &str, is_admin: bool) -> (User, String) {
    let password_hash = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    let mut user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@test.com"),
            password_hash,
            full_name: None,
        },
    )
    .await
    .expect("user creation should succeed");

    if is_admin {
        sqlx::query("UPDATE users SET is_admin = TRUE WHERE id = $1")
            .bind(user.id)
            .execute(pool)
            .await
            .expect("promotion should succeed");
        user.is_admin = true;
    }

    let token = generate_access_token(user.id, role_for(user.is_admin), &test_config().jwt)
        .expect("token generation should succeed");
    (user, token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Poll `GET /course/jobs/{job_id}` until the job reaches a terminal status.
pub async fn wait_for_job(app: &Router, job_id: &str) -> serde_json::Value {
    for _ in 0..300 {
        let response = get(app.clone(), &format!("/course/jobs/{job_id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        if matches!(
            json["status"].as_str(),
            Some("complete" | "failed" | "cancelled")
        ) {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("job {job_id} did not finish");
}
