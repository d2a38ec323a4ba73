use serde::Deserialize;

use crate::error::{ApiError, FieldError};

pub const DESCRIPTION_MIN: usize = 3;
pub const DESCRIPTION_MAX: usize = 255;

#[derive(Debug, Deserialize)]
pub struct CategoryPayload {
    pub description: Option<String>,
}

impl CategoryPayload {
    pub fn validate(self) -> Result<String, ApiError> {
        let mut errors = Vec::new();

        match self.description.as_deref() {
            None => errors.push(FieldError::body("description", "Field required", "missing")),
            Some(description) if description.chars().count() < DESCRIPTION_MIN => {
                errors.push(FieldError::body(
                    "description",
                    "String should have at least 3 characters",
                    "string_too_short",
                ));
            }
            Some(description) if description.chars().count() > DESCRIPTION_MAX => {
                errors.push(FieldError::body(
                    "description",
                    "String should have at most 255 characters",
                    "string_too_long",
                ));
            }
            Some(_) => {}
        }

        match self.description {
            Some(description) if errors.is_empty() => Ok(description),
            _ => Err(ApiError::validation(errors)),
        }
    }
}
