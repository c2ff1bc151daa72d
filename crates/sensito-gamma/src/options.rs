//! Gamma analysis options.
//!
//! This module provides the [`GammaOptions`] struct for configuring how the
//! search range and the gamma range are located on a density curve.

/// Default log-exposure increment between two steps of a 21-step wedge.
pub const STEP_VALUE: f64 = 0.15;

/// Minimum number of density points a curve needs for gamma extraction.
pub const MIN_POINTS: usize = 4;

/// Strategy used to pick the gamma range inside the search range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GammaMethod {
    /// Density-threshold search range, then the window with the smallest
    /// summed absolute second derivative (most linear stretch).
    #[default]
    Linearity,
    /// Earlier generation: point-count percentages for the search range,
    /// then the 3-step window with the steepest slope.
    ///
    /// Kept so readings can be compared with files analysed by older
    /// versions of the tool.
    MaxSlope,
}

/// Configuration options for gamma extraction.
///
/// # Defaults
///
/// - Step value: 0.15 (log-exposure units per wedge step)
/// - Toe / shoulder exclusion: 20% of the density span on each side
/// - Gamma window: 4 steps
/// - Method: [`GammaMethod::Linearity`]
///
/// # Example
///
/// ```
/// use sensito_gamma::{GammaMethod, GammaOptions};
///
/// let options = GammaOptions::new()
///     .step_value(0.20)
///     .method(GammaMethod::MaxSlope);
/// assert_eq!(options.step_value, 0.20);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GammaOptions {
    /// Exposure increment between consecutive points.
    ///
    /// Default: `0.15`
    pub step_value: f64,

    /// Fraction of the density span excluded above `d_min` (the toe).
    ///
    /// Default: `0.20`
    pub low_pct: f64,

    /// Fraction of the density span excluded below `d_max` (the shoulder).
    ///
    /// Default: `0.20`
    pub high_pct: f64,

    /// Width of the linearity window, in steps.
    ///
    /// Default: `4`
    pub num_steps: usize,

    /// Range selection strategy.
    pub method: GammaMethod,

    /// Minimum rise for a window to count under [`GammaMethod::MaxSlope`].
    ///
    /// Default: `0.03`
    pub min_diff: f64,
}

impl Default for GammaOptions {
    fn default() -> Self {
        Self {
            step_value: STEP_VALUE,
            low_pct: 0.20,
            high_pct: 0.20,
            num_steps: 4,
            method: GammaMethod::Linearity,
            min_diff: 0.03,
        }
    }
}

impl GammaOptions {
    /// Create options with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the exposure increment between steps.
    #[inline]
    pub fn step_value(mut self, step_value: f64) -> Self {
        self.step_value = step_value;
        self
    }

    /// Set the toe and shoulder exclusion fractions.
    #[inline]
    pub fn thresholds(mut self, low_pct: f64, high_pct: f64) -> Self {
        self.low_pct = low_pct;
        self.high_pct = high_pct;
        self
    }

    /// Set the linearity window width. Zero is treated as one step.
    #[inline]
    pub fn num_steps(mut self, num_steps: usize) -> Self {
        self.num_steps = num_steps;
        self
    }

    /// Set the range selection strategy.
    #[inline]
    pub fn method(mut self, method: GammaMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the minimum rise for [`GammaMethod::MaxSlope`] windows.
    #[inline]
    pub fn min_diff(mut self, min_diff: f64) -> Self {
        self.min_diff = min_diff;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let opts = GammaOptions::default();
        assert!((opts.step_value - 0.15).abs() < f64::EPSILON);
        assert!((opts.low_pct - 0.20).abs() < f64::EPSILON);
        assert!((opts.high_pct - 0.20).abs() < f64::EPSILON);
        assert_eq!(opts.num_steps, 4);
        assert_eq!(opts.method, GammaMethod::Linearity);
        assert!((opts.min_diff - 0.03).abs() < f64::EPSILON);
    }

    #[test]
    fn test_new_equals_default() {
        assert_eq!(GammaOptions::new(), GammaOptions::default());
    }

    #[test]
    fn test_builder_chaining() {
        let opts = GammaOptions::new()
            .step_value(0.2)
            .thresholds(0.1, 0.3)
            .num_steps(3)
            .method(GammaMethod::MaxSlope)
            .min_diff(0.05);

        assert!((opts.step_value - 0.2).abs() < f64::EPSILON);
        assert!((opts.low_pct - 0.1).abs() < f64::EPSILON);
        assert!((opts.high_pct - 0.3).abs() < f64::EPSILON);
        assert_eq!(opts.num_steps, 3);
        assert_eq!(opts.method, GammaMethod::MaxSlope);
        assert!((opts.min_diff - 0.05).abs() < f64::EPSILON);
    }
}
