//! Database module
//!
//! This module provides database management functionality including:
//! - Database connection pool management
//! - Repository implementations for users and posts
//! - Database migrations
//! - Data models

pub mod manager;
pub mod migrations;
pub mod models;
pub mod repository;

pub use manager::DatabaseManager;
pub use models::{Post, User};
pub use repository::{PostRepository, PostStore, UserRepository, UserStore};
