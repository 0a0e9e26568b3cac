/// Post Service Library
///
/// REST API for the Mural feed: text posts with an optional inline image,
/// served over HTTP/JSON and persisted in PostgreSQL.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and the external JSON projection
/// - `models`: Database row structures
/// - `services`: Business logic layer (transactional write paths)
/// - `db`: Database access layer and repositories
/// - `error`: Error types and HTTP mapping
/// - `config`: Configuration management
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
