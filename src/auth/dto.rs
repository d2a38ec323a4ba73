use serde::{Deserialize, Serialize};

use crate::auth::repo::User;
use crate::error::{ApiError, FieldError};

/// Request body for user registration. Fields are optional at the serde
/// level so absence surfaces as a field-level 422 instead of a parse error.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Form body for the password-grant login flow.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct UserRead {
    pub id: i64,
    pub username: String,
    pub disabled: bool,
}

impl From<User> for UserRead {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            disabled: user.disabled,
        }
    }
}

impl RegisterRequest {
    pub fn into_parts(self) -> Result<(String, String), ApiError> {
        required_credentials(self.username, self.password)
    }
}

impl LoginForm {
    pub fn into_parts(self) -> Result<(String, String), ApiError> {
        required_credentials(self.username, self.password)
    }
}

fn required_credentials(
    username: Option<String>,
    password: Option<String>,
) -> Result<(String, String), ApiError> {
    let mut errors = Vec::new();
    if username.is_none() {
        errors.push(FieldError::body("username", "Field required", "missing"));
    }
    if password.is_none() {
        errors.push(FieldError::body("password", "Field required", "missing"));
    }
    match (username, password) {
        (Some(username), Some(password)) => Ok((username, password)),
        _ => Err(ApiError::validation(errors)),
    }
}
