//! Repository for the `otps` table.

use learnlabs_core::otp::MAX_FAILED_ATTEMPTS;
use learnlabs_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::otp::Otp;

const COLUMNS: &str = "id, email, code, created_at, expires_at, failed_attempts";

/// Stores and verifies one-time passcodes.
pub struct OtpRepo;

impl OtpRepo {
    /// Store a newly issued passcode for `email`.
    pub async fn create(
        pool: &PgPool,
        email: &str,
        code: &str,
        expires_at: Timestamp,
    ) -> Result<Otp, sqlx::Error> {
        let query = format!(
            "INSERT INTO otps (email, code, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Otp>(&query)
            .bind(email)
            .bind(code)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find an unexpired passcode matching `email` and `code` as of `now`.
    ///
    /// Rows that have absorbed [`MAX_FAILED_ATTEMPTS`] wrong guesses never
    /// match, even with the right code.
    pub async fn find_valid(
        pool: &PgPool,
        email: &str,
        code: &str,
        now: Timestamp,
    ) -> Result<Option<Otp>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM otps \
             WHERE email = $1 AND code = $2 AND expires_at > $3 AND failed_attempts < $4 \
             ORDER BY created_at DESC LIMIT 1"
        );
        sqlx::query_as::<_, Otp>(&query)
            .bind(email)
            .bind(code)
            .bind(now)
            .bind(MAX_FAILED_ATTEMPTS)
            .fetch_optional(pool)
            .await
    }

    /// Count a wrong guess against every live passcode of `email`. Returns
    /// the number of rows charged.
    pub async fn record_failed_attempt(
        pool: &PgPool,
        email: &str,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE otps SET failed_attempts = failed_attempts + 1 \
             WHERE email = $1 AND expires_at > $2",
        )
        .bind(email)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete every passcode issued to `email`. Returns the number removed.
    pub async fn delete_for_email(pool: &PgPool, email: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM otps WHERE email = $1")
            .bind(email)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
