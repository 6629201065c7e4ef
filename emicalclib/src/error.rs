//! Единый тип ошибок публичного API.

use crate::application::ValidationErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmiError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("application form is incomplete: {0}")]
    Validation(ValidationErrors),

    #[error("unknown loan product: {0}")]
    UnknownProduct(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl EmiError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        EmiError::InvalidInput { field, reason: reason.into() }
    }

    /// `true` для ошибок валидации входных данных расчёта.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, EmiError::InvalidInput { .. })
    }
}

pub type Result<T> = std::result::Result<T, EmiError>;
