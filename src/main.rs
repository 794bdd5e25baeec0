use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use todo_api::{
    auth::TokenService,
    routes,
    store::{self, TodoStore, UserStore},
    Config,
};

fn startup_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;
    log::debug!("Loaded {:?}", config);

    let tokens = TokenService::from_config(&config).map_err(startup_error)?;
    log::info!("Issuing tokens valid for {} hours", tokens.ttl().num_hours());

    let pool = store::connect(&config).await.map_err(startup_error)?;
    store::init_schema(&pool).await.map_err(startup_error)?;

    let tokens = web::Data::new(tokens);
    let users = web::Data::new(UserStore::new(pool.clone()));
    let todos = web::Data::new(TodoStore::new(pool));
    let allowed_origin = config.cors_allowed_origin.clone();

    log::info!("Starting todo server at {}", config.server_url());

    HttpServer::new(move || {
        let cors = match &allowed_origin {
            Some(origin) => Cors::default().allowed_origin(origin),
            None => Cors::default().allow_any_origin(),
        }
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);

        App::new()
            .app_data(tokens.clone())
            .app_data(users.clone())
            .app_data(todos.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind(config.listen_address.as_str())?
    .run()
    .await
}
