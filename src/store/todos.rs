use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::AppError;
use crate::models::{NewTodo, PatchValue, Todo, TodoPatch, UpdateTodoParams};

const RETURNING_TODO: &str =
    " RETURNING id, title, content, created, updated, created_by, updated_by, done";

/// Access to the `todo` table.
#[derive(Clone)]
pub struct TodoStore {
    pool: PgPool,
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Todo {} not found", id))
}

impl TodoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_todos(&self) -> Result<Vec<Todo>, AppError> {
        let todos = sqlx::query_as::<_, Todo>(
            "SELECT id, title, content, created, updated, created_by, updated_by, done \
             FROM todo ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(todos)
    }

    pub async fn get_todo_by_id(&self, id: i32) -> Result<Todo, AppError> {
        sqlx::query_as::<_, Todo>(
            "SELECT id, title, content, created, updated, created_by, updated_by, done \
             FROM todo WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))
    }

    /// Inserts a todo; the database assigns `id` and `created`.
    pub async fn insert_todo(&self, todo: &NewTodo) -> Result<Todo, AppError> {
        let inserted = sqlx::query_as::<_, Todo>(
            "INSERT INTO todo (title, content, created, created_by, done) \
             VALUES ($1, $2, NOW(), $3, $4) \
             RETURNING id, title, content, created, updated, created_by, updated_by, done",
        )
        .bind(&todo.title)
        .bind(&todo.content)
        .bind(todo.created_by)
        .bind(todo.done)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    /// Replaces every mutable field of todo `id` and stamps the update.
    pub async fn update_todo_by_id(
        &self,
        id: i32,
        params: &UpdateTodoParams,
        updated_by: i32,
    ) -> Result<Todo, AppError> {
        sqlx::query_as::<_, Todo>(
            "UPDATE todo \
             SET title = $1, content = $2, created_by = $3, done = $4, \
                 updated = NOW(), updated_by = $5 \
             WHERE id = $6 \
             RETURNING id, title, content, created, updated, created_by, updated_by, done",
        )
        .bind(&params.title)
        .bind(&params.content)
        .bind(params.created_by)
        .bind(params.done)
        .bind(updated_by)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))
    }

    /// Writes only the fields present in `patch`.
    ///
    /// An empty patch is rejected with `AppError::EmptyPatch` before the pool
    /// is touched.
    pub async fn patch_todo_by_id(&self, id: i32, patch: &TodoPatch) -> Result<Todo, AppError> {
        let mut query = patch_query(id, patch)?;

        query
            .build_query_as::<Todo>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn delete_todo_by_id(&self, id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM todo WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

/// Renders `UPDATE todo SET col = $n, ... WHERE id = $m RETURNING ...` with one
/// bound parameter per present field.
fn patch_query(id: i32, patch: &TodoPatch) -> Result<QueryBuilder<'static, Postgres>, AppError> {
    let fields = patch.fields();
    if fields.is_empty() {
        return Err(AppError::EmptyPatch);
    }

    let mut builder: QueryBuilder<'static, Postgres> = QueryBuilder::new("UPDATE todo SET ");
    let mut assignments = builder.separated(", ");
    for (column, value) in fields {
        assignments.push(column);
        assignments.push_unseparated(" = ");
        match value {
            PatchValue::Text(text) => assignments.push_bind_unseparated(text),
            PatchValue::Integer(number) => assignments.push_bind_unseparated(number),
            PatchValue::Boolean(flag) => assignments.push_bind_unseparated(flag),
            PatchValue::Timestamp(at) => assignments.push_bind_unseparated(at),
        };
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(RETURNING_TODO);

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use sqlx::postgres::PgPoolOptions;
    use std::time::Duration;

    #[test]
    fn test_patch_query_binds_only_present_fields() {
        let patch = TodoPatch {
            done: Some(true),
            ..Default::default()
        };
        let query = patch_query(4, &patch).unwrap();
        assert_eq!(
            query.sql(),
            "UPDATE todo SET done = $1 WHERE id = $2 \
             RETURNING id, title, content, created, updated, created_by, updated_by, done"
        );
    }

    #[test]
    fn test_patch_query_never_inlines_values() {
        let patch = TodoPatch {
            title: Some("x'; DROP TABLE todo; --".to_string()),
            created: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
            updated_by: Some(9),
            ..Default::default()
        };
        let query = patch_query(1, &patch).unwrap();
        let sql = query.sql();

        assert!(sql.starts_with(
            "UPDATE todo SET title = $1, created = $2, updated_by = $3 WHERE id = $4"
        ));
        assert!(!sql.contains("DROP"));
        assert!(!sql.contains("2024"));
    }

    #[test]
    fn test_empty_patch_query_is_rejected() {
        assert!(matches!(
            patch_query(1, &TodoPatch::default()),
            Err(AppError::EmptyPatch)
        ));
    }

    #[actix_rt::test]
    async fn test_empty_patch_never_reaches_storage() {
        // Nothing listens here; any query attempt would fail with a database error.
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap();
        let store = TodoStore::new(pool);

        let result = store.patch_todo_by_id(1, &TodoPatch::default()).await;
        assert!(matches!(result, Err(AppError::EmptyPatch)));
    }
}
