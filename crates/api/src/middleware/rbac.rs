//! Access levels for LearnLabs routes.
//!
//! Content reads are public. Saving progress needs a signed-in learner, and
//! the generation job endpoints are for admins only.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use learnlabs_core::error::CoreError;
use learnlabs_core::roles::ROLE_ADMIN;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// An admin caller; anyone else gets 403. Guards job listing and
/// cancellation under `/course/jobs`.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role == ROLE_ADMIN {
            Ok(RequireAdmin(user))
        } else {
            Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )))
        }
    }
}

/// Any signed-in learner, regardless of role.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        AuthUser::from_request_parts(parts, state)
            .await
            .map(RequireAuth)
    }
}
