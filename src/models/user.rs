use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered account, as stored in `todo_user`.
///
/// The password hash is loaded with the row so login and the auth middleware
/// can work from a single lookup, but it is never serialized outward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    #[serde(skip)]
    #[sqlx(rename = "encrypted_password")]
    pub password_hash: String,
}
