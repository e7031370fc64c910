use serde::{Deserialize, Serialize};

use crate::validation::FieldErrors;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Yields `(username, password)` when both are present and non-blank.
    pub fn validate(self) -> Result<(String, String), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_non_blank("username", self.username.as_deref(), "username is required");
        errors.require_non_blank("password", self.password.as_deref(), "password is required");

        errors.into_result((self.username.unwrap_or_default(), self.password.unwrap_or_default()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl LoginResponse {
    pub fn bearer(token: String, expires_in: i64) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_fields_required() {
        let errors = LoginRequest::default().validate().unwrap_err();
        assert_eq!(errors.get("username"), Some("username is required"));
        assert_eq!(errors.get("password"), Some("password is required"));
    }

    #[test]
    fn valid_request_yields_credentials() {
        let request = LoginRequest {
            username: Some("user".to_string()),
            password: Some("password".to_string()),
        };
        assert_eq!(request.validate().unwrap(), ("user".to_string(), "password".to_string()));
    }
}
