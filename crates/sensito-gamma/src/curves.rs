//! Cross-channel gamma aggregation.
//!
//! A curve container exposes measured and reference curves per positional
//! slot through [`DensityCurves`]. [`GammaAnalyzer::get_gamma_from_curve_data`]
//! runs the single-curve analysis on every visible slot and adds the
//! combined [`ALL_KEY`] and [`REF_KEY`] readings.

use std::collections::{BTreeMap, HashMap};

use crate::analyzer::GammaAnalyzer;
use crate::options::MIN_POINTS;
use crate::reading::GammaReading;

/// Result key of the mean over all measured channels.
pub const ALL_KEY: &str = "all";

/// Result key of the mean over all reference channels.
pub const REF_KEY: &str = "ref";

/// Read access to measured and reference curves by slot key.
pub trait DensityCurves {
    /// Measured curve stored in `slot`, if the slot exists.
    fn measured(&self, slot: &str) -> Option<&[Option<f64>]>;

    /// Reference curve stored in `slot`, if the slot exists.
    fn reference(&self, slot: &str) -> Option<&[Option<f64>]>;
}

/// Flat maps keyed `meas_{slot}` / `ref_{slot}`.
impl DensityCurves for BTreeMap<String, Vec<Option<f64>>> {
    fn measured(&self, slot: &str) -> Option<&[Option<f64>]> {
        self.get(&format!("meas_{slot}")).map(Vec::as_slice)
    }

    fn reference(&self, slot: &str) -> Option<&[Option<f64>]> {
        self.get(&format!("ref_{slot}")).map(Vec::as_slice)
    }
}

impl DensityCurves for HashMap<String, Vec<Option<f64>>> {
    fn measured(&self, slot: &str) -> Option<&[Option<f64>]> {
        self.get(&format!("meas_{slot}")).map(Vec::as_slice)
    }

    fn reference(&self, slot: &str) -> Option<&[Option<f64>]> {
        self.get(&format!("ref_{slot}")).map(Vec::as_slice)
    }
}

impl GammaAnalyzer {
    /// Readings for every visible slot plus the combined `all` / `ref` entries.
    ///
    /// Per-slot entries hold the measured reading. Slots with fewer than 4
    /// present points are left out rather than zero-filled. `all` is the mean
    /// of the measured readings and `ref` the mean of the reference readings;
    /// each is present only if at least one slot produced a reading of its
    /// kind. No visible slots yields an empty map.
    pub fn get_gamma_from_curve_data<C, S>(
        &self,
        data: &C,
        visible_slots: &[S],
    ) -> BTreeMap<String, GammaReading>
    where
        C: DensityCurves + ?Sized,
        S: AsRef<str>,
    {
        let mut results: BTreeMap<String, GammaReading> = BTreeMap::new();
        let mut reference_results: BTreeMap<String, GammaReading> = BTreeMap::new();

        for slot in visible_slots {
            let slot = slot.as_ref();
            if let Some(reading) = data.measured(slot).and_then(|p| self.dense_reading(p)) {
                results.insert(slot.to_string(), reading);
            }
            if let Some(reading) = data.reference(slot).and_then(|p| self.dense_reading(p)) {
                reference_results.insert(slot.to_string(), reading);
            }
        }

        let measured: Vec<GammaReading> = results.values().cloned().collect();
        let reference: Vec<GammaReading> = reference_results.into_values().collect();

        if let Some(all) = GammaReading::mean_of(&measured) {
            results.insert(ALL_KEY.to_string(), all);
        }
        if let Some(reference) = GammaReading::mean_of(&reference) {
            results.insert(REF_KEY.to_string(), reference);
        }
        results
    }

    fn dense_reading(&self, points: &[Option<f64>]) -> Option<GammaReading> {
        let values: Vec<f64> = points.iter().flatten().copied().collect();
        if values.len() < MIN_POINTS {
            return None;
        }
        self.get_gamma_from_values(&values).ok()
    }
}
