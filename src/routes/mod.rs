pub mod auth;
pub mod health;
pub mod todos;
pub mod users;

use actix_web::web;

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Registers every route under `/api`. Everything below `/api/v1` requires a
/// bearer token.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(
            web::scope("/api")
                .service(health::health)
                .service(auth::register)
                .service(auth::login)
                .service(
                    web::scope("/v1")
                        .wrap(AuthMiddleware)
                        .service(todos::get_todos)
                        .service(todos::create_todo)
                        .service(todos::get_todo)
                        .service(todos::update_todo)
                        .service(todos::patch_todo)
                        .service(todos::delete_todo)
                        .service(users::get_users)
                        .service(users::get_user)
                        .service(users::check)
                        .service(users::update_password)
                        .service(users::delete_account),
                ),
        );
}

/// Malformed JSON bodies are answered with the usual error body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(format!("Invalid JSON body: {}", err)).into())
}

/// Non-integer ids are a 400, not the default 404.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(format!("Invalid path: {}", err)).into())
}

/// Runs CPU-heavy work (bcrypt) off the async worker.
pub(crate) async fn blocking<F, R>(f: F) -> Result<R, AppError>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| AppError::Internal(format!("blocking task failed: {}", e)))
}
