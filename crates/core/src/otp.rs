//! One-time passcodes for email verification during registration.

use rand::Rng;

use crate::types::Timestamp;

/// Number of digits in a passcode.
pub const OTP_LENGTH: usize = 6;

/// How long a passcode stays valid after issue.
pub const OTP_EXPIRY_MINUTES: i64 = 10;

/// Wrong guesses allowed against an email's passcodes before they stop
/// verifying and a new code has to be requested.
pub const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Generate a random six-digit passcode (`100000..=999999`).
pub fn generate_code() -> String {
    let code: u32 = rand::rng().random_range(100_000..=999_999);
    code.to_string()
}

/// Expiry timestamp for a passcode issued at `issued_at`.
pub fn expires_at(issued_at: Timestamp) -> Timestamp {
    issued_at + chrono::Duration::minutes(OTP_EXPIRY_MINUTES)
}

/// Basic shape check on a submitted passcode.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == OTP_LENGTH && code.chars().all(|c| c.is_ascii_digit())
}
