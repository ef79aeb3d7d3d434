//! Well-known role name constants carried in JWT claims.
//!
//! Users with `users.is_admin = true` receive [`ROLE_ADMIN`]; everyone else
//! receives [`ROLE_USER`].

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Resolve the role name for a user row's admin flag.
pub fn role_for(is_admin: bool) -> &'static str {
    if is_admin {
        ROLE_ADMIN
    } else {
        ROLE_USER
    }
}
