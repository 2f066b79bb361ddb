//! Postline Backend Library
//!
//! A small micro-posting service: users register, log in with a cookie-borne
//! access token and publish short posts.

pub mod api;
pub mod auth;
pub mod core;
pub mod db;

// Re-export commonly used types
pub use crate::core::{Config, PostlineError};
pub use api::ApiServer;
pub use db::DatabaseManager;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
