//! Centralized input guards.
//!
//! Both inputs are materialized fully in memory, so the size of what we are
//! willing to read is bounded here rather than at each parser.

/// Maximum number of rows accepted from a checklist (DOS protection)
pub const MAX_ROWS: usize = 200_000;

/// Maximum input file size in bytes (64 MiB)
pub const MAX_INPUT_BYTES: u64 = 64 * 1024 * 1024;

/// Input validation error types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Input too large: {size} bytes exceeds maximum of {max} bytes")]
    InputTooLarge { size: u64, max: u64 },
    #[error("Input is empty")]
    EmptyInput,
}

/// Check if reading another row would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new row.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_row_limit(count: usize) -> Option<String> {
    if count >= MAX_ROWS {
        Some(format!(
            "Too many rows: adding another would exceed maximum of {MAX_ROWS}"
        ))
    } else {
        None
    }
}

/// Validate the byte size of an input before it is read into memory.
///
/// # Errors
///
/// Returns `ValidationError::EmptyInput` for a zero-length input or
/// `ValidationError::InputTooLarge` if `size` exceeds [`MAX_INPUT_BYTES`].
pub fn validate_input_size(size: u64) -> Result<(), ValidationError> {
    validate_input_size_with_limit(size, MAX_INPUT_BYTES)
}

/// Validate the byte size of an input against a custom limit.
///
/// # Errors
///
/// See [`validate_input_size`].
pub fn validate_input_size_with_limit(size: u64, max: u64) -> Result<(), ValidationError> {
    if size == 0 {
        return Err(ValidationError::EmptyInput);
    }
    if size > max {
        return Err(ValidationError::InputTooLarge { size, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_row_limit() {
        assert!(check_row_limit(100).is_none());
        assert!(check_row_limit(MAX_ROWS - 1).is_none());
        assert!(check_row_limit(MAX_ROWS).is_some());
        assert!(check_row_limit(MAX_ROWS + 1).is_some());
    }

    #[test]
    fn test_validate_input_size() {
        assert!(validate_input_size(1).is_ok());
        assert!(validate_input_size(MAX_INPUT_BYTES).is_ok());
        assert!(matches!(
            validate_input_size(0),
            Err(ValidationError::EmptyInput)
        ));
        assert!(matches!(
            validate_input_size(MAX_INPUT_BYTES + 1),
            Err(ValidationError::InputTooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_input_size_with_limit() {
        assert!(validate_input_size_with_limit(10, 10).is_ok());
        assert!(validate_input_size_with_limit(11, 10).is_err());
    }
}
