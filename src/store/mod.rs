//! SQLite persistence. Each entity gets its own module of plain functions
//! over a borrowed [`rusqlite::Connection`]; the async [`Db`] handle wraps
//! them for the handlers.

pub mod assignments;
pub mod classes;
pub mod db;
pub mod settings;
pub mod students;
pub mod submissions;
pub mod teachers;

pub use db::Db;
