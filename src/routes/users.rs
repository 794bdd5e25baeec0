use crate::{
    auth::{hash_password, AuthenticatedUser, PasswordUpdateRequest},
    error::AppError,
    models::ApiMessage,
    routes::blocking,
    store::UserStore,
};
use actix_web::{delete, get, put, web, HttpResponse};
use validator::Validate;

/// Lists every registered user. Password hashes are never serialized.
#[get("/users")]
pub async fn get_users(users: web::Data<UserStore>) -> Result<HttpResponse, AppError> {
    let users = users.get_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

#[get("/users/{id}")]
pub async fn get_user(
    users: web::Data<UserStore>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let user = users.get_user_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Echoes the caller resolved from the bearer token.
#[get("/check")]
pub async fn check(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(user.into_inner())
}

/// Changes the caller's password. Tokens issued before the change stay valid
/// until they expire.
#[put("/user/password")]
pub async fn update_password(
    user: AuthenticatedUser,
    users: web::Data<UserStore>,
    request: web::Json<PasswordUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let PasswordUpdateRequest { password } = request.into_inner();

    let password_hash = blocking(move || hash_password(&password)).await??;
    users.update_password_by_id(user.id, &password_hash).await?;
    log::info!("User {} changed their password", user.id);

    Ok(HttpResponse::Ok().json(ApiMessage::success("Password updated")))
}

/// Deletes the caller's account along with the todos they created.
#[delete("/user")]
pub async fn delete_account(
    user: AuthenticatedUser,
    users: web::Data<UserStore>,
) -> Result<HttpResponse, AppError> {
    users.delete_user_by_id(user.id).await?;
    log::info!("User {} <{}> deleted their account", user.id, user.email);

    Ok(HttpResponse::Ok().json(ApiMessage::success(format!("user ID: {}", user.id))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::routes::json_config;
    use actix_web::dev::Service;
    use actix_web::{test, App, HttpMessage};
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;

    fn unreachable_user_store() -> UserStore {
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap();
        UserStore::new(pool)
    }

    #[actix_rt::test]
    async fn test_check_returns_caller_without_hash() {
        let app = test::init_service(
            App::new()
                .wrap_fn(|req, srv| {
                    req.extensions_mut().insert(User {
                        id: 7,
                        email: "bob@example.com".to_string(),
                        password_hash: "$2b$12$secret".to_string(),
                    });
                    srv.call(req)
                })
                .service(check),
        )
        .await;

        let req = test::TestRequest::get().uri("/check").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "id": 7, "email": "bob@example.com" }));
    }

    #[actix_rt::test]
    async fn test_short_password_update_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(json_config())
                .app_data(web::Data::new(unreachable_user_store()))
                .wrap_fn(|req, srv| {
                    req.extensions_mut().insert(User {
                        id: 7,
                        email: "bob@example.com".to_string(),
                        password_hash: String::new(),
                    });
                    srv.call(req)
                })
                .service(update_password),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/user/password")
            .set_json(json!({ "password": "abc" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }
}
