//! One-time passcode rows.

use learnlabs_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `otps` table.
#[derive(Debug, Clone, FromRow)]
pub struct Otp {
    pub id: DbId,
    pub email: String,
    pub code: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    /// Wrong codes submitted for this email while the row was live.
    pub failed_attempts: i32,
}
