#![doc = "The `tasktracker` library crate."]
#![doc = ""]
#![doc = "Database models (users and their tasks), the per-request session helpers that hand"]
#![doc = "database connections to handlers, the user-store adapter used by authentication,"]
#![doc = "and the routes and error handling built on top of them."]
#![doc = "It is used by the main binary (`main.rs`) to construct and run the application."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

pub use db::{DbSession, UserDb};
pub use error::AppError;
