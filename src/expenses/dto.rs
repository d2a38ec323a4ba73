use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{ApiError, FieldError};

pub const DESCRIPTION_MIN: usize = 3;
pub const DESCRIPTION_MAX: usize = 255;

/// Body for both create and update. The same rules apply to each: update
/// replaces the whole record, there is no partial form.
#[derive(Debug, Deserialize)]
pub struct ExpensePayload {
    pub amount: Option<f64>,
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
}

/// Payload that passed validation. `category_id` and `date` stay optional;
/// the handler fills in the server clock when no date was sent.
#[derive(Debug, Clone)]
pub struct ValidExpense {
    pub amount: f64,
    pub description: String,
    pub category_id: Option<i64>,
    pub date: Option<OffsetDateTime>,
}

impl ExpensePayload {
    /// Check every field and report all failures together, so a client
    /// fixing a bad request sees the complete list in one round trip.
    pub fn validate(self) -> Result<ValidExpense, ApiError> {
        let mut errors = Vec::new();

        match self.amount {
            None => errors.push(FieldError::body("amount", "Field required", "missing")),
            Some(amount) if amount <= 0.0 => errors.push(FieldError::body(
                "amount",
                "Input should be greater than 0",
                "greater_than",
            )),
            Some(_) => {}
        }

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

        if let Some(category_id) = self.category_id {
            if category_id <= 0 {
                errors.push(FieldError::body(
                    "category_id",
                    "Input should be greater than 0",
                    "greater_than",
                ));
            }
        }

        match (self.amount, self.description) {
            (Some(amount), Some(description)) if errors.is_empty() => Ok(ValidExpense {
                amount,
                description,
                category_id: self.category_id,
                date: self.date,
            }),
            _ => Err(ApiError::validation(errors)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
