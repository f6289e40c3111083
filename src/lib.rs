pub mod api;
pub mod auth;
pub mod error;
pub mod models;
pub mod scoring;
pub mod server;
pub mod store;
pub mod subjects;

pub use server::run_server;
pub use store::Db;
