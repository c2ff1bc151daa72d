//! sensito-gamma: gamma extraction for sensitometric step wedges
//!
//! A step wedge exposes photographic material to 21 calibrated steps of
//! increasing log exposure. Reading the processed wedge with a densitometer
//! gives a characteristic curve: density against exposure step. This crate
//! measures the contrast of that curve.
//!
//! # Quick Start
//!
//! ```
//! use sensito_gamma::{GammaAnalyzer, GammaOptions};
//!
//! let densities = [
//!     0.05, 0.10, 0.20, 0.35, 0.55, 0.80, 1.05, 1.30, 1.55, 1.80, 2.05,
//!     2.30, 2.55, 2.80, 3.00, 3.15, 3.25, 3.32, 3.36, 3.38, 3.39,
//! ];
//!
//! let analyzer = GammaAnalyzer::new(GammaOptions::new().step_value(0.15));
//! let reading = analyzer.get_gamma_from_values(&densities).unwrap();
//!
//! assert_eq!(reading.search_range.start, 6);
//! assert!((reading.gamma - 1.667).abs() < 0.001);
//! ```
//!
//! # Terms
//!
//! | Term | Meaning |
//! |------|---------|
//! | **Search range** | Steps left after excluding the toe (near `d_min`) and the shoulder (near `d_max`) |
//! | **Gamma range** | The `num_steps` window inside the search range with the least curvature |
//! | **Gamma** | Density rise per log-exposure unit over the gamma range |
//! | **Global gamma** | Same slope over the whole search range |
//! | **Gamma delta** | `|gamma - global_gamma|`; small values mean a straight curve |
//!
//! Ranges in a [`GammaReading`] are 1-based so they match the step numbers
//! printed on the wedge.
//!
//! # Multiple Channels
//!
//! Colour densitometers read several channels per step. Any container that
//! implements [`DensityCurves`] can be analysed in one call with
//! [`GammaAnalyzer::get_gamma_from_curve_data`], which also produces the
//! channel means under [`ALL_KEY`] and [`REF_KEY`].

pub mod analyzer;
pub mod curves;
pub mod error;
pub mod options;
pub mod reading;


pub use analyzer::{centered_derivative, extrema, GammaAnalyzer};
pub use curves::{DensityCurves, ALL_KEY, REF_KEY};
pub use error::GammaError;
pub use options::{GammaMethod, GammaOptions, MIN_POINTS, STEP_VALUE};
pub use reading::{GammaReading, Range};
