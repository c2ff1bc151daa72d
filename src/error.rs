use std::path::PathBuf;
use thiserror::Error;

/// Errors from Curve Store import and export
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown color mode: {0}")]
    UnknownColorMode(String),

    #[error("Color mode mismatch: reference is {reference}, measurement is {measured}")]
    ColorModeMismatch { reference: String, measured: String },
}

/// Errors from loading a persisted measurement set
#[derive(Debug, Error)]
pub enum MeasurementError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No measurement in {}", .0.display())]
    NoData(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_unknown_color_mode() {
        let error = StoreError::UnknownColorMode("rgb".to_string());
        assert_eq!(error.to_string(), "Unknown color mode: rgb");
    }

    #[test]
    fn test_store_error_mode_mismatch() {
        let error = StoreError::ColorModeMismatch {
            reference: "vcmy".to_string(),
            measured: "vrgb".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Color mode mismatch: reference is vcmy, measurement is vrgb"
        );
    }

    #[test]
    fn test_store_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error: StoreError = io.into();
        assert!(matches!(error, StoreError::Io(_)));
        assert_eq!(error.to_string(), "IO error: gone");
    }

    #[test]
    fn test_measurement_error_no_data() {
        let error = MeasurementError::NoData(PathBuf::from("measures/empty.json"));
        assert_eq!(error.to_string(), "No measurement in measures/empty.json");
    }

    #[test]
    fn test_measurement_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: MeasurementError = json_err.into();
        assert!(matches!(error, MeasurementError::Json(_)));
        assert!(error.to_string().starts_with("JSON error: "));
    }
}
