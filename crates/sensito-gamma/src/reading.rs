//! Gamma reading value types.

use std::fmt;

/// Inclusive index interval over a density sequence.
///
/// Internally 0-based; readings report ranges 1-based (see
/// [`Range::to_display`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of steps spanned (`end - start`).
    pub const fn steps(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether `other` lies entirely inside this range.
    pub const fn contains(&self, other: &Range) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Shift a 0-based range to the 1-based form used for display.
    pub const fn to_display(self) -> Self {
        Self {
            start: self.start + 1,
            end: self.end + 1,
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]", self.start, self.end)
    }
}

/// Result of a gamma computation over one density curve.
///
/// `search_range` and `gamma_range` are 1-based.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GammaReading {
    /// Slope over the most linear sub-range
    pub gamma: f64,
    /// Slope over the whole search range
    pub global_gamma: f64,
    /// `|gamma - global_gamma|`, a linearity indicator
    pub gamma_delta: f64,
    /// Exposure increment used for the slopes
    pub step_value: f64,
    pub d_min: f64,
    pub d_max: f64,
    pub search_range: Range,
    pub gamma_range: Range,
}

impl GammaReading {
    /// Field-wise arithmetic mean of several readings.
    ///
    /// Range endpoints are averaged independently and rounded half to even.
    /// Returns `None` for an empty slice.
    pub fn mean_of(readings: &[GammaReading]) -> Option<GammaReading> {
        if readings.is_empty() {
            return None;
        }
        let n = readings.len() as f64;
        let mean = |field: fn(&GammaReading) -> f64| readings.iter().map(field).sum::<f64>() / n;
        let mean_index = |field: fn(&GammaReading) -> usize| {
            let avg = readings.iter().map(|r| field(r) as f64).sum::<f64>() / n;
            avg.round_ties_even() as usize
        };

        Some(GammaReading {
            gamma: mean(|r| r.gamma),
            global_gamma: mean(|r| r.global_gamma),
            gamma_delta: mean(|r| r.gamma_delta),
            step_value: mean(|r| r.step_value),
            d_min: mean(|r| r.d_min),
            d_max: mean(|r| r.d_max),
            search_range: Range::new(
                mean_index(|r| r.search_range.start),
                mean_index(|r| r.search_range.end),
            ),
            gamma_range: Range::new(
                mean_index(|r| r.gamma_range.start),
                mean_index(|r| r.gamma_range.end),
            ),
        })
    }
}

impl fmt::Display for GammaReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "gamma         : {:.2}", self.gamma)?;
        writeln!(f, "global_gamma  : {:.2}", self.global_gamma)?;
        writeln!(f, "gamma_delta   : {:.2}", self.gamma_delta)?;
        writeln!(f, "step_value    : {:.2}", self.step_value)?;
        writeln!(f, "d_min         : {:.2}", self.d_min)?;
        writeln!(f, "d_max         : {:.2}", self.d_max)?;
        writeln!(f, "search_range  : {}", self.search_range)?;
        write!(f, "gamma_range   : {}", self.gamma_range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(gamma: f64, search: (usize, usize), window: (usize, usize)) -> GammaReading {
        GammaReading {
            gamma,
            global_gamma: gamma + 0.1,
            gamma_delta: 0.1,
            step_value: 0.15,
            d_min: 0.1,
            d_max: 3.0,
            search_range: Range::new(search.0, search.1),
            gamma_range: Range::new(window.0, window.1),
        }
    }

    #[test]
    fn test_range_display_shift() {
        let r = Range::new(0, 20).to_display();
        assert_eq!(r, Range::new(1, 21));
        assert_eq!(r.to_string(), "[1 - 21]");
    }

    #[test]
    fn test_range_contains() {
        let outer = Range::new(3, 12);
        assert!(outer.contains(&Range::new(3, 7)));
        assert!(outer.contains(&Range::new(8, 12)));
        assert!(!outer.contains(&Range::new(2, 6)));
        assert!(!outer.contains(&Range::new(9, 13)));
        assert_eq!(outer.steps(), 9);
    }

    #[test]
    fn test_mean_of_empty() {
        assert!(GammaReading::mean_of(&[]).is_none());
    }

    #[test]
    fn test_mean_of_single_is_identity() {
        let r = reading(1.2, (5, 14), (7, 11));
        assert_eq!(GammaReading::mean_of(std::slice::from_ref(&r)), Some(r));
    }

    #[test]
    fn test_mean_of_averages_fields() {
        let a = reading(1.0, (5, 14), (6, 10));
        let b = reading(2.0, (7, 15), (9, 13));
        let mean = GammaReading::mean_of(&[a, b]).unwrap();

        assert!((mean.gamma - 1.5).abs() < 1e-12);
        assert!((mean.global_gamma - 1.6).abs() < 1e-12);
        assert!((mean.gamma_delta - 0.1).abs() < 1e-12);
        assert_eq!(mean.search_range, Range::new(6, 14));
        // 7.5 and 11.5 round half to even
        assert_eq!(mean.gamma_range, Range::new(8, 12));
    }

    #[test]
    fn test_display_block() {
        let text = reading(1.666, (6, 13), (7, 11)).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "gamma         : 1.67");
        assert_eq!(lines[6], "search_range  : [6 - 13]");
        assert_eq!(lines[7], "gamma_range   : [7 - 11]");
    }
}
