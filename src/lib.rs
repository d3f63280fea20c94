pub mod app;
pub mod audit;
pub mod authz;
pub mod db;
pub mod docs;
pub mod errors;
pub mod identity;
pub mod jwt;
pub mod models;
pub mod notify;
pub mod routes;
pub mod session;
pub mod store;
pub mod utils;

pub use app::{create_app, AppState};
