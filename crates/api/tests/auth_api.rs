//! HTTP-level tests for OTP registration, login, and the current-user endpoint.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_user_with_token, get, get_auth, post_json, TEST_PASSWORD};
use serde_json::json;
use sqlx::PgPool;

const EMAIL: &str = "ada@example.com";

#[sqlx::test(migrations = "../db/migrations")]
async fn otp_registration_then_login(pool: PgPool) {
    let test_app = common::spawn_test_app(pool, Default::default());
    let app = test_app.router.clone();

    let response = post_json(app.clone(), "/auth/send-otp", json!({ "email": "Ada@Example.com" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let code = test_app
        .mailer
        .last_code_for(EMAIL)
        .expect("an OTP should have been sent to the lower-cased address");
    assert_eq!(code.len(), 6);

    let response = post_json(
        app.clone(),
        "/auth/register",
        json!({
            "username": "ada",
            "email": EMAIL,
            "otp": code,
            "password": "analytical-engine",
            "full_name": "Ada Lovelace"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let user = body_json(response).await;
    assert_eq!(user["username"], "ada");
    assert_eq!(user["is_admin"], false);
    assert!(user.get("password_hash").is_none());

    for identifier in ["ada", EMAIL] {
        let response = post_json(
            app.clone(),
            "/auth/login",
            json!({ "identifier": identifier, "password": "analytical-engine" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let login = body_json(response).await;
        assert_eq!(login["token_type"], "bearer");
        assert_eq!(login["expires_in"], 3600);
        assert_eq!(login["user"]["email"], EMAIL);

        let token = login["access_token"].as_str().unwrap();
        let me = get_auth(app.clone(), "/auth/me", token).await;
        assert_eq!(me.status(), StatusCode::OK);
        assert_eq!(body_json(me).await["full_name"], "Ada Lovelace");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn otp_is_consumed_by_registration(pool: PgPool) {
    let test_app = common::spawn_test_app(pool, Default::default());
    let app = test_app.router.clone();

    post_json(app.clone(), "/auth/send-otp", json!({ "email": EMAIL })).await;
    let code = test_app.mailer.last_code_for(EMAIL).unwrap();

    let register = |username: &str| {
        json!({ "username": username, "email": EMAIL, "otp": code, "password": "long-enough-pw" })
    };
    let first = post_json(app.clone(), "/auth/register", register("ada")).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json(app, "/auth/register", register("ada2")).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn wrong_otp_and_weak_password_are_rejected(pool: PgPool) {
    let test_app = common::spawn_test_app(pool, Default::default());
    let app = test_app.router.clone();

    post_json(app.clone(), "/auth/send-otp", json!({ "email": EMAIL })).await;
    let code = test_app.mailer.last_code_for(EMAIL).unwrap();
    let wrong = if code == "111111" { "222222" } else { "111111" };

    let response = post_json(
        app.clone(),
        "/auth/register",
        json!({ "username": "ada", "email": EMAIL, "otp": wrong, "password": "long-enough-pw" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        app,
        "/auth/register",
        json!({ "username": "ada", "email": EMAIL, "otp": code, "password": "short" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn repeated_wrong_otps_lock_the_code_until_reissued(pool: PgPool) {
    let test_app = common::spawn_test_app(pool, Default::default());
    let app = test_app.router.clone();

    post_json(app.clone(), "/auth/send-otp", json!({ "email": EMAIL })).await;
    let code = test_app.mailer.last_code_for(EMAIL).unwrap();
    let wrong = if code == "111111" { "222222" } else { "111111" };
    let register = |otp: &str| {
        json!({ "username": "ada", "email": EMAIL, "otp": otp, "password": "long-enough-pw" })
    };

    for _ in 0..learnlabs_core::otp::MAX_FAILED_ATTEMPTS {
        let response = post_json(app.clone(), "/auth/register", register(wrong)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let locked = post_json(app.clone(), "/auth/register", register(code.as_str())).await;
    assert_eq!(locked.status(), StatusCode::BAD_REQUEST);

    post_json(app.clone(), "/auth/send-otp", json!({ "email": EMAIL })).await;
    let fresh = test_app.mailer.last_code_for(EMAIL).unwrap();
    let response = post_json(app, "/auth/register", register(fresh.as_str())).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn otp_for_registered_email_conflicts(pool: PgPool) {
    create_user_with_token(&pool, "taken", false).await;
    let app = common::build_test_app(pool);

    let response = post_json(app, "/auth/send-otp", json!({ "email": "taken@test.com" })).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn send_otp_rejects_malformed_email(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(app, "/auth/send-otp", json!({ "email": "not-an-email" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_failures(pool: PgPool) {
    let (user, _) = create_user_with_token(&pool, "grace", false).await;
    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();
    let app = common::build_test_app(pool);

    let wrong_password = post_json(
        app.clone(),
        "/auth/login",
        json!({ "identifier": "grace", "password": "not-the-password" }),
    )
    .await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);

    let unknown = post_json(
        app.clone(),
        "/auth/login",
        json!({ "identifier": "nobody", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);

    let inactive = post_json(
        app,
        "/auth/login",
        json!({ "identifier": "grace", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(inactive.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn me_requires_a_valid_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    assert_eq!(get(app.clone(), "/auth/me").await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        get_auth(app, "/auth/me", "not.a.jwt").await.status(),
        StatusCode::UNAUTHORIZED
    );
}
