//! Single-curve gamma extraction.
//!
//! A 21-step density curve has a toe (near `d_min`), a straight-line
//! portion and a shoulder (near `d_max`). Gamma is the slope of the
//! straight-line portion against log exposure. Extraction runs in three
//! steps:
//!
//! 1. **Search range**: drop the toe and shoulder by density thresholds.
//! 2. **Gamma range**: inside the search range, pick the `num_steps` window
//!    whose second derivative is smallest in absolute sum.
//! 3. **Slopes**: gamma over the gamma range, global gamma over the whole
//!    search range, and their absolute difference.

use crate::error::GammaError;
use crate::options::{GammaMethod, GammaOptions, MIN_POINTS};
use crate::reading::{GammaReading, Range};

/// Window width used by [`GammaMethod::MaxSlope`].
const MAX_SLOPE_WINDOW: usize = 3;

/// Computes [`GammaReading`]s from density curves.
///
/// The analyzer holds only its options; every call works on caller-owned
/// input and returns a fresh reading, so one analyzer can be shared across
/// threads.
#[derive(Debug, Clone, Default)]
pub struct GammaAnalyzer {
    options: GammaOptions,
}

impl GammaAnalyzer {
    pub fn new(options: GammaOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GammaOptions {
        &self.options
    }

    /// Compute a reading from a dense sequence of densities.
    ///
    /// Absent points must already be filtered out; see
    /// [`GammaAnalyzer::get_gamma_from_points`].
    ///
    /// # Errors
    ///
    /// [`GammaError::InsufficientData`] when fewer than 4 values are given,
    /// [`GammaError::InvalidStepValue`] when the step value is not a positive
    /// finite number.
    pub fn get_gamma_from_values(&self, values: &[f64]) -> Result<GammaReading, GammaError> {
        if values.len() < MIN_POINTS {
            return Err(GammaError::InsufficientData {
                found: values.len(),
                required: MIN_POINTS,
            });
        }
        let step_value = self.options.step_value;
        if !step_value.is_finite() || step_value <= 0.0 {
            return Err(GammaError::InvalidStepValue(step_value));
        }

        let search_range = self.search_range(values);
        let gamma_range = self.gamma_range(values, search_range);

        let gamma = self.slope(values, gamma_range);
        let global_gamma = self.slope(values, search_range);
        let (d_min, d_max) = extrema(values);

        Ok(GammaReading {
            gamma,
            global_gamma,
            gamma_delta: (gamma - global_gamma).abs(),
            step_value,
            d_min,
            d_max,
            search_range: search_range.to_display(),
            gamma_range: gamma_range.to_display(),
        })
    }

    /// Compute a reading from a sparse curve, skipping absent points.
    pub fn get_gamma_from_points(
        &self,
        points: &[Option<f64>],
    ) -> Result<GammaReading, GammaError> {
        let values: Vec<f64> = points.iter().flatten().copied().collect();
        self.get_gamma_from_values(&values)
    }

    /// 0-based search range for `values`.
    ///
    /// The result always satisfies `start >= 1` and `end <= len - 1`, and
    /// `end > start` whenever `values` has at least 3 points.
    pub fn search_range(&self, values: &[f64]) -> Range {
        let (start, end) = match self.options.method {
            GammaMethod::Linearity => self.threshold_bounds(values),
            GammaMethod::MaxSlope => self.count_bounds(values.len()),
        };
        clamp_search(values.len(), start, end)
    }

    fn threshold_bounds(&self, values: &[f64]) -> (usize, usize) {
        let (d_min, d_max) = extrema(values);
        let span = d_max - d_min;
        let min_threshold = d_min + self.options.low_pct * span;
        let max_threshold = d_max - self.options.high_pct * span;

        let start = values.iter().position(|&v| v > min_threshold).unwrap_or(0);
        let end = values
            .iter()
            .position(|&v| v > max_threshold)
            .unwrap_or(values.len())
            .saturating_sub(1);
        (start, end)
    }

    fn count_bounds(&self, count: usize) -> (usize, usize) {
        let start = (count as f64 * self.options.low_pct) as usize;
        let cut = (count as f64 * self.options.high_pct) as usize;
        let end = count.saturating_sub(cut).saturating_sub(1);
        (start, end)
    }

    /// 0-based gamma range inside `search`.
    ///
    /// When the search range is no wider than the window, the whole search
    /// range is returned.
    pub fn gamma_range(&self, values: &[f64], search: Range) -> Range {
        match self.options.method {
            GammaMethod::Linearity => self.most_linear_window(values, search),
            GammaMethod::MaxSlope => self.steepest_window(values, search),
        }
    }

    fn most_linear_window(&self, values: &[f64], search: Range) -> Range {
        let window = self.options.num_steps.max(1);
        if search.steps() <= window || search.end >= values.len() {
            return search;
        }

        let acceleration = centered_derivative(&centered_derivative(values));

        let mut best_start = search.start;
        let mut best_sum = f64::INFINITY;
        for start in search.start..=search.end - window {
            let sum: f64 = acceleration[start..start + window]
                .iter()
                .map(|a| a.abs())
                .sum();
            // strict: ties keep the first window
            if sum < best_sum {
                best_sum = sum;
                best_start = start;
            }
        }
        Range::new(best_start, best_start + window)
    }

    fn steepest_window(&self, values: &[f64], search: Range) -> Range {
        let mut best = Range::new(
            search.start,
            (search.start + MAX_SLOPE_WINDOW).min(search.end),
        );
        let mut max_slope: Option<f64> = None;

        for i in search.start..search.end.saturating_sub(MAX_SLOPE_WINDOW - 1) {
            let diff = values[i + MAX_SLOPE_WINDOW] - values[i];
            if diff.abs() < self.options.min_diff {
                continue;
            }
            let slope = diff / MAX_SLOPE_WINDOW as f64;
            if max_slope.map_or(true, |m| slope.abs() > m.abs()) {
                max_slope = Some(slope);
                best = Range::new(i, i + MAX_SLOPE_WINDOW);
            }
        }
        best
    }

    /// Slope of `values` between the endpoints of `range`, per exposure step.
    ///
    /// An empty range has slope 0.
    pub fn slope(&self, values: &[f64], range: Range) -> f64 {
        let steps = range.steps();
        if steps == 0 || range.end >= values.len() {
            return 0.0;
        }
        let delta_y = values[range.end] - values[range.start];
        let delta_x = steps as f64 * self.options.step_value;
        delta_y / delta_x
    }
}

/// Discrete centered derivative.
///
/// Interior points get `values[i + 1] - values[i - 1]`; the first point is
/// 0 and the last point repeats its neighbour.
pub fn centered_derivative(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut speed = vec![0.0; n];
    if n < 3 {
        return speed;
    }
    for i in 1..n - 1 {
        speed[i] = values[i + 1] - values[i - 1];
    }
    speed[n - 1] = speed[n - 2];
    speed
}

/// Minimum and maximum of `values`. `(0.0, 0.0)` for an empty slice.
pub fn extrema(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

fn clamp_search(len: usize, start: usize, end: usize) -> Range {
    let last = len.saturating_sub(1);
    let mut start = start.max(1);
    let mut end = end.min(last);
    if end <= start {
        end = (start + 1).min(last);
        if end <= start {
            start = end.saturating_sub(1);
        }
    }
    Range::new(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: [f64; 21] = [
        0.05, 0.10, 0.20, 0.35, 0.55, 0.80, 1.05, 1.30, 1.55, 1.80, 2.05, 2.30, 2.55, 2.80, 3.00,
        3.15, 3.25, 3.32, 3.36, 3.38, 3.39,
    ];

    fn linear(from: f64, to: f64) -> Vec<f64> {
        (0..21).map(|i| from + (to - from) * i as f64 / 20.0).collect()
    }

    #[test]
    fn test_too_few_values() {
        let analyzer = GammaAnalyzer::default();
        for n in 0..4 {
            let values = vec![1.0; n];
            assert_eq!(
                analyzer.get_gamma_from_values(&values),
                Err(GammaError::InsufficientData {
                    found: n,
                    required: 4
                })
            );
        }
    }

    #[test]
    fn test_invalid_step_value() {
        let analyzer = GammaAnalyzer::new(GammaOptions::new().step_value(0.0));
        assert_eq!(
            analyzer.get_gamma_from_values(&SCENARIO),
            Err(GammaError::InvalidStepValue(0.0))
        );
    }

    #[test]
    fn test_centered_derivative_boundaries() {
        let speed = centered_derivative(&[0.0, 1.0, 4.0, 9.0, 16.0]);
        assert_eq!(speed, vec![0.0, 4.0, 8.0, 12.0, 12.0]);
    }

    #[test]
    fn test_centered_derivative_short_input() {
        assert_eq!(centered_derivative(&[1.0, 2.0]), vec![0.0, 0.0]);
        assert!(centered_derivative(&[]).is_empty());
    }

    #[test]
    fn test_search_range_scenario() {
        let analyzer = GammaAnalyzer::default();
        // d_min 0.05, d_max 3.39: thresholds 0.718 and 2.722
        assert_eq!(analyzer.search_range(&SCENARIO), Range::new(5, 12));
    }

    #[test]
    fn test_scenario_reading() {
        let reading = GammaAnalyzer::default()
            .get_gamma_from_values(&SCENARIO)
            .unwrap();

        assert!((reading.d_min - 0.05).abs() < 1e-12);
        assert!((reading.d_max - 3.39).abs() < 1e-12);
        assert_eq!(reading.search_range, Range::new(6, 13));
        assert_eq!(reading.gamma_range, Range::new(7, 11));
        assert!((reading.gamma - 1.25 / 0.75).abs() < 1e-9);
        assert!((reading.global_gamma - 1.75 / 1.05).abs() < 1e-9);
        assert!(reading.gamma_delta < 1e-9);
    }

    #[test]
    fn test_flat_curve_has_zero_gamma() {
        let reading = GammaAnalyzer::default()
            .get_gamma_from_values(&[1.2; 21])
            .unwrap();
        assert_eq!(reading.gamma, 0.0);
        assert_eq!(reading.global_gamma, 0.0);
        assert_eq!(reading.gamma_delta, 0.0);
        assert_eq!(reading.search_range, Range::new(2, 21));
    }

    #[test]
    fn test_linear_curve() {
        let values = linear(0.1, 3.9);
        let reading = GammaAnalyzer::default()
            .get_gamma_from_values(&values)
            .unwrap();
        let expected = (3.9 - 0.1) / (20.0 * 0.15);
        assert!((reading.gamma - expected).abs() < 1e-9);
        assert!((reading.global_gamma - expected).abs() < 1e-9);
        assert!(reading.gamma_delta < 1e-9);
    }

    #[test]
    fn test_step_value_scales_gamma() {
        let values = linear(0.1, 3.9);
        let at_015 = GammaAnalyzer::default()
            .get_gamma_from_values(&values)
            .unwrap();
        let at_020 = GammaAnalyzer::new(GammaOptions::new().step_value(0.20))
            .get_gamma_from_values(&values)
            .unwrap();
        assert!((at_015.gamma * 0.15 - at_020.gamma * 0.20).abs() < 1e-9);
        assert!((at_020.step_value - 0.20).abs() < f64::EPSILON);
    }

    #[test]
    fn test_four_points_narrow_search() {
        let reading = GammaAnalyzer::default()
            .get_gamma_from_values(&[0.1, 0.5, 0.9, 1.3])
            .unwrap();
        assert_eq!(reading.search_range, Range::new(2, 3));
        assert_eq!(reading.gamma_range, reading.search_range);
        assert!((reading.gamma - 0.4 / 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_decreasing_curve_keeps_ordered_bounds() {
        let analyzer = GammaAnalyzer::default();
        let values = [3.0, 2.0, 1.0, 0.5, 0.2];
        let search = analyzer.search_range(&values);
        assert!(search.start >= 1);
        assert!(search.end <= values.len() - 1);
        assert!(search.end > search.start);

        let reading = analyzer.get_gamma_from_values(&values).unwrap();
        assert!(reading.gamma < 0.0);
    }

    #[test]
    fn test_linearity_ties_keep_first_window() {
        let analyzer = GammaAnalyzer::default();
        // Binary-exact slope: acceleration is exactly zero on the interior
        let exact: Vec<f64> = (0..21).map(|i| i as f64 * 0.25).collect();
        let search = Range::new(3, 15);
        assert_eq!(analyzer.gamma_range(&exact, search), Range::new(3, 7));
    }

    #[test]
    fn test_linearity_avoids_curved_region() {
        let analyzer = GammaAnalyzer::default();
        // Straight from index 8 on, curved before
        let values: Vec<f64> = (0..21)
            .map(|i| {
                let x = i as f64;
                if i < 8 {
                    0.02 * x * x
                } else {
                    1.28 + 0.32 * (x - 8.0)
                }
            })
            .collect();
        let window = analyzer.gamma_range(&values, Range::new(1, 19));
        assert!(window.start >= 8, "picked curved window {:?}", window);
    }

    #[test]
    fn test_max_slope_search_range_uses_point_count() {
        let analyzer = GammaAnalyzer::new(GammaOptions::new().method(GammaMethod::MaxSlope));
        assert_eq!(analyzer.search_range(&SCENARIO), Range::new(4, 16));
    }

    #[test]
    fn test_max_slope_picks_steepest_window() {
        let analyzer = GammaAnalyzer::new(GammaOptions::new().method(GammaMethod::MaxSlope));
        let mut values = vec![1.0; 21];
        for (i, v) in values.iter_mut().enumerate().skip(9) {
            *v = if i < 12 { 1.0 + 0.5 * (i - 8) as f64 } else { 2.5 };
        }
        let window = analyzer.gamma_range(&values, Range::new(4, 16));
        assert_eq!(window, Range::new(8, 11));
    }

    #[test]
    fn test_max_slope_flat_curve_falls_back_to_first_window() {
        let analyzer = GammaAnalyzer::new(GammaOptions::new().method(GammaMethod::MaxSlope));
        let window = analyzer.gamma_range(&[2.0; 21], Range::new(4, 16));
        assert_eq!(window, Range::new(4, 7));
    }

    #[test]
    fn test_points_skip_absent_values() {
        let analyzer = GammaAnalyzer::default();
        let mut points: Vec<Option<f64>> = SCENARIO.iter().copied().map(Some).collect();
        points.push(None);
        points.insert(0, None);
        let from_points = analyzer.get_gamma_from_points(&points).unwrap();
        let from_values = analyzer.get_gamma_from_values(&SCENARIO).unwrap();
        assert_eq!(from_points, from_values);

        let sparse = [Some(0.1), None, Some(0.4), None, Some(0.9)];
        assert!(matches!(
            analyzer.get_gamma_from_points(&sparse),
            Err(GammaError::InsufficientData { found: 3, .. })
        ));
    }

    #[test]
    fn test_extrema() {
        assert_eq!(extrema(&[0.5, -1.0, 2.0]), (-1.0, 2.0));
        assert_eq!(extrema(&[]), (0.0, 0.0));
    }
}
