use sqlx::PgPool;

use crate::error::AppError;
use crate::models::User;

/// Access to the `todo_user` table.
#[derive(Clone)]
pub struct UserStore {
    pool: PgPool,
}

impl UserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, email, encrypted_password FROM todo_user ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, encrypted_password FROM todo_user WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Looks a user up by login email. Absence is not an error here; login and
    /// the auth middleware decide what it means.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, encrypted_password FROM todo_user WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Inserts a new account. A duplicate email surfaces as `AppError::Conflict`.
    pub async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO todo_user (email, encrypted_password) VALUES ($1, $2) \
             RETURNING id, email, encrypted_password",
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict("Email already registered".into()),
            other => other,
        })
    }

    pub async fn update_password_by_id(&self, id: i32, password_hash: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE todo_user SET encrypted_password = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    pub async fn delete_user_by_id(&self, id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM todo_user WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }
}
