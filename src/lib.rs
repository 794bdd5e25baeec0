#![doc = "The `todo_api` library crate."]
#![doc = ""]
#![doc = "Domain models, authentication, storage, routing configuration and error"]
#![doc = "handling for the todo service. The binary (`main.rs`) wires them into an"]
#![doc = "`HttpServer`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

pub use crate::config::Config;
pub use crate::error::AppError;
