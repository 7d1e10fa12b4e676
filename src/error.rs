// Error types
// Every fallible library operation returns `dataman::Result<T>`

use thiserror::Error;

/// Arithmetic failures raised while evaluating a problem
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("cannot divide {dividend} by zero")]
    DivisionByZero { dividend: i64 },

    #[error("result of {expression} does not fit in a 64-bit integer")]
    Overflow { expression: String },
}

#[derive(Debug, Error)]
pub enum DatamanError {
    /// Malformed input or an unsupported value (operator, name, range)
    #[error("validation error: {0}")]
    Validation(String),

    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("index {index} is out of range for a set of {len} problem(s)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DatamanError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// True for errors caused by the user's input rather than the environment
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Domain(_) | Self::NotFound(_) | Self::IndexOutOfRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DatamanError>;
