pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password, verify_unknown_account, PasswordError};
pub use token::{Claims, IssuedToken, TokenError, TokenService};

lazy_static! {
    // local@domain.tld, no whitespace and a single '@'
    static ref EMAIL_REGEX: regex::Regex =
        regex::Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

/// Represents the payload for a new user registration request.
///
/// Every rule is checked so a rejected request reports all violations at once.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(min = 5, message = "must be at least 5 characters"),
        regex(path = "EMAIL_REGEX", message = "must look like local@domain.tld")
    )]
    pub email: String,
    #[validate(length(min = 5, message = "must be at least 5 characters"))]
    pub password: String,
}

/// Represents the payload for a user login request.
///
/// Not validated beyond deserialization: a malformed email simply fails to
/// match any account and gets the same 401 as a wrong password.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response structure after a successful login.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: i32,
    pub email: String,
    /// The JWT to send back as `Authorization: Bearer <token>`.
    pub token: String,
    /// Unix timestamp after which the token is rejected.
    pub expires_at: i64,
}

/// Payload for `PUT /api/v1/user/password`.
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordUpdateRequest {
    #[validate(length(min = 5, message = "must be at least 5 characters"))]
    pub password: String,
}
