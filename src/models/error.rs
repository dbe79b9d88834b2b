//! Shared error response bodies.
//!
//! Every failure serializes as `{"error": <summary>, "message"?: <detail>}`;
//! the insufficient-budget case additionally carries the amounts the caller
//! needs to react.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    pub fn with_message(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: Some(message.into()),
        }
    }
}

/// 400 body when the budget cannot cover the cart total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsufficientBudgetResponse {
    pub error: String,
    pub required: Decimal,
    pub available: Decimal,
    pub shortfall: Decimal,
}
