//! Error types for record decoding and normalization.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding or normalizing a record.
#[derive(Error, Debug)]
pub enum Error {
    /// A field holds a value that cannot be coerced to its numeric type.
    #[error("invalid field '{field}': cannot coerce {value} to {expected}")]
    Coercion {
        /// The name of the offending field.
        field: &'static str,
        /// The rejected value, rendered as JSON.
        value: String,
        /// The numeric type the field must coerce to.
        expected: &'static str,
    },

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Error Display formatting tests
    // =========================================================================

    #[test]
    fn test_coercion_display() {
        let err = Error::Coercion {
            field: "sentiment",
            value: "\"abc\"".to_string(),
            expected: "float",
        };
        let msg = err.to_string();
        assert!(msg.contains("sentiment"));
        assert!(msg.contains("\"abc\""));
        assert!(msg.contains("float"));
    }

    #[test]
    fn test_coercion_display_null_value() {
        let err = Error::Coercion {
            field: "message_length",
            value: "null".to_string(),
            expected: "integer",
        };
        let msg = err.to_string();
        assert!(msg.contains("message_length"));
        assert!(msg.contains("null"));
        assert!(msg.contains("integer"));
    }

    // =========================================================================
    // Error From conversions
    // =========================================================================

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not valid json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().contains("JSON error"));
    }

    // =========================================================================
    // Error Debug formatting
    // =========================================================================

    #[test]
    fn test_error_debug_format() {
        let err = Error::Coercion {
            field: "sentiment",
            value: "true".to_string(),
            expected: "float",
        };
        let debug = format!("{:?}", err);
        assert!(debug.contains("Coercion"));
        assert!(debug.contains("sentiment"));
        assert!(debug.contains("true"));
    }

    // =========================================================================
    // Result type alias
    // =========================================================================

    #[test]
    fn test_result_type_ok() {
        let result: Result<i32> = Ok(42);
        assert!(result.is_ok());
        assert!(matches!(result, Ok(42)));
    }

    #[test]
    fn test_result_type_err() {
        let result: Result<i32> = Err(Error::Coercion {
            field: "sentiment",
            value: "[]".to_string(),
            expected: "float",
        });
        assert!(result.is_err());
    }
}
