//! Error types shared across the core library.

use thiserror::Error;

/// Result alias for fallible core operations.
pub type Result<T> = std::result::Result<T, QbenchError>;

/// Errors raised by numeric comparisons and record loading.
///
/// Undefined correlation, malformed parameters and empty wd grids are not
/// errors: they come back as `None`, a null typed value and `wd = 0`.
#[derive(Error, Debug)]
pub enum QbenchError {
    /// Percentage error against a simulator count of zero.
    #[error("division by zero: simulator count for '{key}' is 0")]
    DivisionByZero { key: String },

    /// Histogram intersection normalized by zero shots.
    #[error("division by zero: shot count is 0")]
    ZeroShots,

    /// Outcome label that cannot be read as an unsigned binary number.
    #[error("invalid bitstring '{key}'")]
    InvalidBitstring { key: String },

    #[error("failed to read records: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed record JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl QbenchError {
    /// True for errors caused by the caller's numeric input rather than the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::DivisionByZero { .. } | Self::ZeroShots | Self::InvalidBitstring { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn division_by_zero_names_key() {
        let err = QbenchError::DivisionByZero {
            key: "0101".to_string(),
        };
        assert!(err.to_string().contains("division by zero"));
        assert!(err.to_string().contains("0101"));
        assert!(err.is_input_error());
    }

    #[test]
    fn io_is_not_input_error() {
        let err: QbenchError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(!err.is_input_error());
    }
}
