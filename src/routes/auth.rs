use crate::{
    auth::{
        hash_password, verify_password, verify_unknown_account, LoginRequest, LoginResponse,
        RegisterRequest, TokenService,
    },
    error::AppError,
    routes::blocking,
    store::UserStore,
};
use actix_web::{post, web, HttpResponse};
use validator::Validate;

/// Register a new user
///
/// Validates the credentials (every violated rule is reported), hashes the
/// password and creates the account. Responds with `{id, email}`.
#[post("/register")]
pub async fn register(
    users: web::Data<UserStore>,
    register_data: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    register_data.validate()?;
    let RegisterRequest { email, password } = register_data.into_inner();

    let password_hash = blocking(move || hash_password(&password)).await??;
    let user = users.create_user(&email, &password_hash).await?;

    log::info!("Registered user {} <{}>", user.id, user.email);
    Ok(HttpResponse::Ok().json(user))
}

/// Login user
///
/// Unknown emails and wrong passwords get the same 401 after the same amount
/// of bcrypt work, so neither the body nor the timing reveals whether an
/// account exists.
#[post("/login")]
pub async fn login(
    users: web::Data<UserStore>,
    tokens: web::Data<TokenService>,
    login_data: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let LoginRequest { email, password } = login_data.into_inner();

    let Some(user) = users.get_user_by_email(&email).await? else {
        log::debug!("Login for unknown email {}", email);
        let _ = blocking(move || verify_unknown_account(&password)).await?;
        return Err(AppError::Unauthorized);
    };

    let hash = user.password_hash.clone();
    if let Err(e) = blocking(move || verify_password(&password, &hash)).await? {
        log::debug!("Login for user {} failed: {}", user.id, e);
        return Err(e.into());
    }

    let issued = tokens.issue(&user)?;
    log::info!("User {} logged in", user.id);

    Ok(HttpResponse::Ok().json(LoginResponse {
        id: user.id,
        email: user.email,
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}
