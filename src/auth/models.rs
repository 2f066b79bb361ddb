//! Authentication request models

use crate::api::validation::{self, Validate};
use crate::core::error::FieldError;
use serde::Deserialize;

/// Login request
///
/// Fields are optional so that a missing field is reported as a validation
/// failure instead of a parse error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        validation::email("email", self.email.as_deref(), &mut errors);
        validation::not_empty("password", self.password.as_deref(), &mut errors);
        errors
    }
}

/// Registration request
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Shortest password accepted at registration
pub const MIN_PASSWORD_LENGTH: usize = 6;

impl Validate for RegisterRequest {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        validation::email("email", self.email.as_deref(), &mut errors);
        if validation::not_empty("password", self.password.as_deref(), &mut errors) {
            validation::min_length(
                "password",
                self.password.as_deref().unwrap_or_default(),
                MIN_PASSWORD_LENGTH,
                &mut errors,
            );
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(errors: Vec<FieldError>) -> Vec<String> {
        errors.into_iter().map(|e| e.message).collect()
    }

    #[test]
    fn test_empty_login() {
        let errors = messages(LoginRequest::default().validate());

        assert!(errors.contains(&"email should not be empty".to_string()));
        assert!(errors.contains(&"password should not be empty".to_string()));
    }

    #[test]
    fn test_login_bad_email() {
        let request = LoginRequest {
            email: Some("testemail.com".to_string()),
            password: Some("test123".to_string()),
        };

        assert_eq!(messages(request.validate()), vec!["email must be an email"]);
    }

    #[test]
    fn test_login_does_not_check_password_length() {
        let request = LoginRequest {
            email: Some("test@email.com".to_string()),
            password: Some("abc".to_string()),
        };

        assert!(request.validate().is_empty());
    }

    #[test]
    fn test_register_short_password() {
        let request = RegisterRequest {
            email: Some("test@email.com".to_string()),
            password: Some("test".to_string()),
        };

        assert_eq!(
            messages(request.validate()),
            vec!["password must be longer than or equal to 6 characters"]
        );
    }

    #[test]
    fn test_register_valid() {
        let request = RegisterRequest {
            email: Some("test@email.com".to_string()),
            password: Some("test123".to_string()),
        };

        assert!(request.validate().is_empty());
    }
}
