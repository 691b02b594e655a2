//! Rack configuration validation.

use thiserror::Error;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Block size of zero.
    #[error("block size must be at least 1")]
    ZeroBlockSize,

    /// Sample rate that is zero, negative, NaN or infinite.
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    /// Several problems at once.
    #[error("{} validation errors: {}", .0.len(), format_errors(.0))]
    Multiple(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Checks a block size.
pub fn validate_block_size(block_size: usize) -> ValidationResult<()> {
    if block_size == 0 {
        Err(ValidationError::ZeroBlockSize)
    } else {
        Ok(())
    }
}

/// Checks a sample rate.
pub fn validate_sample_rate(sample_rate: f32) -> ValidationResult<()> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidSampleRate(sample_rate))
    }
}

/// Collapses a list of failures: none is `Ok`, one is returned as is, more
/// become [`ValidationError::Multiple`].
pub(crate) fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_size() {
        assert!(validate_block_size(1).is_ok());
        assert!(validate_block_size(4096).is_ok());
        assert_eq!(validate_block_size(0), Err(ValidationError::ZeroBlockSize));
    }

    #[test]
    fn sample_rate() {
        assert!(validate_sample_rate(44100.0).is_ok());
        assert!(validate_sample_rate(0.5).is_ok());
        for bad in [0.0, -48000.0, f32::INFINITY, f32::NAN] {
            assert!(
                matches!(validate_sample_rate(bad), Err(ValidationError::InvalidSampleRate(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn collect_keeps_single_errors_flat() {
        assert_eq!(collect(vec![]), Ok(()));
        assert_eq!(
            collect(vec![ValidationError::ZeroBlockSize]),
            Err(ValidationError::ZeroBlockSize)
        );
        let err = collect(vec![
            ValidationError::ZeroBlockSize,
            ValidationError::InvalidSampleRate(-1.0),
        ])
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "2 validation errors: block size must be at least 1; \
             sample rate must be positive and finite, got -1"
        );
    }
}
