//! Error type for gamma extraction.

use std::fmt;

/// Error returned by single-curve gamma computation.
#[derive(Debug, Clone, PartialEq)]
pub enum GammaError {
    /// Fewer usable density points than the analysis needs
    InsufficientData {
        /// Number of points supplied
        found: usize,
        /// Minimum number of points required
        required: usize,
    },
    /// Exposure step is zero, negative or not finite
    InvalidStepValue(f64),
}

impl fmt::Display for GammaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GammaError::InsufficientData { found, required } => {
                write!(
                    f,
                    "insufficient data: {} density points, at least {} needed",
                    found, required
                )
            }
            GammaError::InvalidStepValue(step) => {
                write!(f, "invalid step value {} (must be finite and > 0)", step)
            }
        }
    }
}

impl std::error::Error for GammaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_message() {
        let err = GammaError::InsufficientData {
            found: 3,
            required: 4,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data: 3 density points, at least 4 needed"
        );
    }

    #[test]
    fn test_invalid_step_message() {
        let err = GammaError::InvalidStepValue(0.0);
        assert_eq!(
            err.to_string(),
            "invalid step value 0 (must be finite and > 0)"
        );
    }
}
