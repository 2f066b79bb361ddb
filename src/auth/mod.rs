//! Authentication module
//!
//! This module provides authentication functionality including:
//! - User registration and cookie-based login
//! - Access token issuance and verification
//! - Password hashing and verification
//! - Authentication middleware

pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;

pub use jwt::{Claims, TokenIssuer};
pub use middleware::{authenticate, CurrentUser, RequestContext};
pub use password::PasswordHasher;
pub use service::AuthService;
