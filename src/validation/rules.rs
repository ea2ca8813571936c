use validator::Validate;

use crate::services::errors::ServiceError;

#[derive(Debug, Clone, Validate)]
pub struct Credentials {
    #[validate(length(min = 1, message = "Username is required."))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

/// Rejects credentials with a missing field, reporting the username before the password.
pub fn validate_credentials(credentials: &Credentials) -> Result<(), ServiceError> {
    let Err(errors) = credentials.validate() else {
        return Ok(());
    };
    let field_errors = errors.field_errors();
    let message = ["username", "password"]
        .iter()
        .filter_map(|field| field_errors.get(field))
        .flat_map(|errors| errors.iter())
        .find_map(|error| error.message.as_ref())
        .map(|message| message.to_string())
        .unwrap_or_else(|| "Invalid credentials.".to_string());
    Err(ServiceError::Validation(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn accepts_present_fields() {
        assert!(validate_credentials(&credentials("alice", "pw1")).is_ok());
    }

    #[test]
    fn reports_missing_username_first() {
        let err = validate_credentials(&credentials("", "")).unwrap_err();
        assert_eq!(err.to_string(), "Username is required.");
    }

    #[test]
    fn reports_missing_password() {
        let err = validate_credentials(&credentials("alice", "")).unwrap_err();
        assert_eq!(err.to_string(), "Password is required.");
    }
}
