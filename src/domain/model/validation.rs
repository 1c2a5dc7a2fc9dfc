//! Model identifier validation

use thiserror::Error;

/// Maximum length for model IDs
pub const MAX_MODEL_ID_LENGTH: usize = 255;

/// Errors that can occur while validating a model ID
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelIdError {
    #[error("Model ID cannot be empty")]
    Empty,

    #[error("Model ID exceeds maximum length of {0} characters")]
    TooLong(usize),

    #[error("Model ID contains a control character at position {0}")]
    ControlCharacter(usize),
}

/// Validate a model ID
///
/// Identifiers are opaque, so only the shape is checked:
/// - Cannot be empty
/// - Maximum 255 characters
/// - No control characters
pub fn validate_model_id(id: &str) -> Result<(), ModelIdError> {
    if id.is_empty() {
        return Err(ModelIdError::Empty);
    }

    if id.chars().count() > MAX_MODEL_ID_LENGTH {
        return Err(ModelIdError::TooLong(MAX_MODEL_ID_LENGTH));
    }

    if let Some(position) = id.chars().position(char::is_control) {
        return Err(ModelIdError::ControlCharacter(position));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ids() {
        assert!(validate_model_id("id1").is_ok());
        assert!(validate_model_id("3f1c2a9e-0c4b-4b7e-9a55-2f8d1e6b7c10").is_ok());
        assert!(validate_model_id("user:42").is_ok());
    }

    #[test]
    fn test_empty_id() {
        assert_eq!(validate_model_id(""), Err(ModelIdError::Empty));
    }

    #[test]
    fn test_too_long() {
        let id = "a".repeat(MAX_MODEL_ID_LENGTH + 1);
        assert_eq!(
            validate_model_id(&id),
            Err(ModelIdError::TooLong(MAX_MODEL_ID_LENGTH))
        );
    }

    #[test]
    fn test_control_character() {
        assert_eq!(
            validate_model_id("id\n1"),
            Err(ModelIdError::ControlCharacter(2))
        );
    }
}
