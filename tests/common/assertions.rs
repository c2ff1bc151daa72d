//! Assertion helpers for tests.

use pretty_assertions::assert_eq;
use sensito_gamma::GammaReading;

/// Assert two floats agree within `tolerance`
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "Expected {expected} +/- {tolerance}, got {actual}"
    );
}

/// Assert two readings agree field by field
pub fn assert_same_reading(actual: &GammaReading, expected: &GammaReading) {
    assert_close(actual.gamma, expected.gamma, 1e-9);
    assert_close(actual.global_gamma, expected.global_gamma, 1e-9);
    assert_close(actual.gamma_delta, expected.gamma_delta, 1e-9);
    assert_close(actual.step_value, expected.step_value, 1e-12);
    assert_close(actual.d_min, expected.d_min, 1e-12);
    assert_close(actual.d_max, expected.d_max, 1e-12);
    assert_eq!(actual.search_range, expected.search_range);
    assert_eq!(actual.gamma_range, expected.gamma_range);
}

/// Assert every present point equals the expected value
pub fn assert_points(actual: &[Option<f64>], expected: &[f64]) {
    let present: Vec<f64> = actual.iter().flatten().copied().collect();
    assert_eq!(present, expected.to_vec());
}
