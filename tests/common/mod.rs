#![allow(dead_code)]

use actix_cors::Cors;
use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use chrono::Duration;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use todo_api::auth::TokenService;
use todo_api::routes;
use todo_api::store::{self, TodoStore, UserStore};

pub const TEST_SECRET: &str = "integration_test_secret";

pub fn token_service() -> TokenService {
    TokenService::new(TEST_SECRET, Duration::hours(6)).unwrap()
}

/// A pool pointing at a port nothing listens on. Requests that are rejected
/// before touching storage behave normally; anything else fails with a 500.
pub fn unreachable_pool() -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_millis(200))
        .connect_lazy("postgres://nobody@127.0.0.1:1/none")
        .unwrap()
}

pub async fn database_pool() -> PgPool {
    dotenv::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for database tests");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    store::init_schema(&pool)
        .await
        .expect("Failed to create test schema");
    pool
}

pub async fn cleanup_user(pool: &PgPool, email: &str) {
    let _ = sqlx::query("DELETE FROM todo_user WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await;
}

pub async fn init_app(
    pool: PgPool,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(token_service()))
            .app_data(web::Data::new(UserStore::new(pool.clone())))
            .app_data(web::Data::new(TodoStore::new(pool)))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await
}

/// Registers `email` and logs in, returning `(user id, bearer token)`.
pub async fn register_and_login(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    email: &str,
    password: &str,
) -> (i64, String) {
    let credentials = json!({ "email": email, "password": password });

    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(&credentials)
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    assert!(
        status.is_success(),
        "Registration failed. Status: {}. Body: {}",
        status,
        String::from_utf8_lossy(&body)
    );

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(&credentials)
        .to_request();
    let login: Value = test::call_and_read_body_json(app, req).await;

    let id = login["id"].as_i64().expect("login response has an id");
    let token = login["token"]
        .as_str()
        .expect("login response has a token")
        .to_string();
    (id, token)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
