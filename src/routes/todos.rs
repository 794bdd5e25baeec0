use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{ApiMessage, InsertTodoParams, TodoPatch, UpdateTodoParams},
    store::TodoStore,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use validator::Validate;

/// Lists every todo, ordered by id.
///
/// Todos are shared between all authenticated users; ownership is recorded in
/// `createdBy`/`updatedBy` but never used to filter.
#[get("/todos")]
pub async fn get_todos(todos: web::Data<TodoStore>) -> Result<HttpResponse, AppError> {
    let todos = todos.get_todos().await?;
    Ok(HttpResponse::Ok().json(todos))
}

#[get("/todos/{id}")]
pub async fn get_todo(
    todos: web::Data<TodoStore>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let todo = todos.get_todo_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(todo))
}

/// Creates a todo.
///
/// ## Responses:
/// - `200 OK`: the stored `Todo`, with `id` and `created` assigned by the database.
/// - `400 Bad Request`: malformed JSON, a title or content outside its length
///   bounds, or a `createdBy` naming no user.
#[post("/todos")]
pub async fn create_todo(
    user: AuthenticatedUser,
    todos: web::Data<TodoStore>,
    params: web::Json<InsertTodoParams>,
) -> Result<HttpResponse, AppError> {
    params.validate()?;
    let new_todo = params.into_inner().into_new_todo(user.id);

    let todo = todos.insert_todo(&new_todo).await?;
    log::info!("User {} created todo {}", user.id, todo.id);

    Ok(HttpResponse::Ok().json(todo))
}

/// Replaces a todo. Every field is required; `updated` and `updatedBy` are
/// stamped with the current time and the caller.
#[put("/todos/{id}")]
pub async fn update_todo(
    user: AuthenticatedUser,
    todos: web::Data<TodoStore>,
    path: web::Path<i32>,
    params: web::Json<UpdateTodoParams>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    params.validate()?;

    let todo = todos.update_todo_by_id(id, &params, user.id).await?;
    log::info!("User {} replaced todo {}", user.id, id);

    Ok(HttpResponse::Ok().json(todo))
}

/// Applies a sparse update: only the fields present in the body are written.
///
/// ## Responses:
/// - `200 OK`: the todo after the update.
/// - `400 Bad Request`: an empty body `{}`, an unknown field, or an invalid value.
/// - `404 Not Found`: no todo with this id.
#[patch("/todos/{id}")]
pub async fn patch_todo(
    user: AuthenticatedUser,
    todos: web::Data<TodoStore>,
    path: web::Path<i32>,
    patch: web::Json<TodoPatch>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    if patch.is_empty() {
        return Err(AppError::EmptyPatch);
    }
    patch.validate()?;

    let todo = todos.patch_todo_by_id(id, &patch).await?;
    log::info!("User {} patched todo {}", user.id, id);

    Ok(HttpResponse::Ok().json(todo))
}

#[delete("/todos/{id}")]
pub async fn delete_todo(
    user: AuthenticatedUser,
    todos: web::Data<TodoStore>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    todos.delete_todo_by_id(id).await?;
    log::info!("User {} deleted todo {}", user.id, id);

    Ok(HttpResponse::Ok().json(ApiMessage::success(format!("todo ID: {}", id))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::routes::{json_config, path_config};
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::{body::MessageBody, test, App, HttpMessage};
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;

    fn unreachable_todo_store() -> TodoStore {
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap();
        TodoStore::new(pool)
    }

    async fn todo_app() -> impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    > {
        test::init_service(
            App::new()
                .app_data(json_config())
                .app_data(path_config())
                .app_data(web::Data::new(unreachable_todo_store()))
                .wrap_fn(|req, srv| {
                    req.extensions_mut().insert(User {
                        id: 1,
                        email: "alice@example.com".to_string(),
                        password_hash: String::new(),
                    });
                    srv.call(req)
                })
                .service(get_todo)
                .service(create_todo)
                .service(update_todo)
                .service(patch_todo),
        )
        .await
    }

    async fn error_message(resp: ServiceResponse<impl MessageBody>) -> String {
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        body["message"].as_str().unwrap_or_default().to_string()
    }

    #[actix_rt::test]
    async fn test_empty_patch_is_a_bad_request() {
        let app = todo_app().await;

        let req = test::TestRequest::patch()
            .uri("/todos/1")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        assert!(error_message(resp).await.contains("at least one field"));
    }

    #[actix_rt::test]
    async fn test_patch_rejects_unknown_fields() {
        let app = todo_app().await;

        let req = test::TestRequest::patch()
            .uri("/todos/1")
            .set_json(json!({ "priority": "high" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_rt::test]
    async fn test_non_integer_id_is_a_bad_request() {
        let app = todo_app().await;

        let req = test::TestRequest::get().uri("/todos/abc").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        assert!(error_message(resp).await.contains("Invalid path"));
    }

    #[actix_rt::test]
    async fn test_create_reports_every_length_violation() {
        let app = todo_app().await;

        let req = test::TestRequest::post()
            .uri("/todos")
            .set_json(json!({ "title": "ab", "content": "", "done": false }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let message = error_message(resp).await;
        assert!(message.contains("title: must be between 3 and 100 characters"));
        assert!(message.contains("content: must be between 3 and 1000 characters"));
    }

    #[actix_rt::test]
    async fn test_update_requires_every_field() {
        let app = todo_app().await;

        let req = test::TestRequest::put()
            .uri("/todos/1")
            .set_json(json!({ "title": "Buy milk", "content": "2% milk" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }
}
