//! History Analyzer: gamma and density drift across measurement sets.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use sensito_gamma::{GammaAnalyzer, GammaOptions};

use crate::models::{MeasurementSet, CURVE_LEN};

/// Per-channel series, one point per measurement set in date order.
/// `None` marks a set lacking the channel or too short for a reading.
pub type Evolution = BTreeMap<String, Vec<Option<f64>>>;

pub struct HistoryAnalyzer {
    reference: MeasurementSet,
    measurements: Vec<MeasurementSet>,
    channels: Vec<String>,
    analyzer: GammaAnalyzer,
}

impl HistoryAnalyzer {
    /// Sort `measurements` by acquisition date. Equal dates keep their
    /// discovery order.
    pub fn new(reference: MeasurementSet, mut measurements: Vec<MeasurementSet>) -> Self {
        measurements.sort_by_key(|m| m.date);
        Self {
            reference,
            measurements,
            channels: vec!["R".to_string(), "G".to_string(), "B".to_string()],
            analyzer: GammaAnalyzer::default(),
        }
    }

    /// Replace the tracked channels (uppercase letters).
    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.channels = channels
            .into_iter()
            .map(|c| c.as_ref().to_uppercase())
            .collect();
        self
    }

    pub fn with_options(mut self, options: GammaOptions) -> Self {
        self.analyzer = GammaAnalyzer::new(options);
        self
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn reference(&self) -> &MeasurementSet {
        &self.reference
    }

    /// Measurement sets in date order.
    pub fn measurements(&self) -> &[MeasurementSet] {
        &self.measurements
    }

    pub fn dates(&self) -> Vec<DateTime<Local>> {
        self.measurements.iter().map(|m| m.date).collect()
    }

    /// Element-wise mean of `channel` over the sets that have it.
    /// `None` when no set does.
    pub fn average_curve(&self, channel: &str) -> Option<Vec<f64>> {
        let curves: Vec<Vec<f64>> = self
            .measurements
            .iter()
            .filter_map(|m| m.curve(channel))
            .map(|c| c.values())
            .collect();
        if curves.is_empty() {
            return None;
        }

        let len = curves.iter().map(Vec::len).min().unwrap_or(0);
        let count = curves.len() as f64;
        Some(
            (0..len)
                .map(|i| curves.iter().map(|c| c[i]).sum::<f64>() / count)
                .collect(),
        )
    }

    /// The reference curve of `channel`, or 21 zeros if the reference lacks it.
    pub fn reference_curve(&self, channel: &str) -> Vec<f64> {
        self.reference
            .curve(channel)
            .map(|c| c.values())
            .unwrap_or_else(|| vec![0.0; CURVE_LEN])
    }

    pub fn gamma_evolution(&self) -> Evolution {
        self.evolution(|set, channel| {
            let curve = set.curve(channel)?;
            self.analyzer
                .get_gamma_from_points(&curve.points)
                .ok()
                .map(|reading| reading.gamma)
        })
    }

    pub fn dmin_evolution(&self) -> Evolution {
        self.evolution(|set, channel| set.curve(channel)?.d_min())
    }

    pub fn dmax_evolution(&self) -> Evolution {
        self.evolution(|set, channel| set.curve(channel)?.d_max())
    }

    /// Gamma of each tracked channel on the reference set.
    pub fn reference_gammas(&self) -> BTreeMap<String, Option<f64>> {
        self.channels
            .iter()
            .map(|channel| {
                let gamma = self
                    .reference
                    .curve(channel)
                    .and_then(|c| self.analyzer.get_gamma_from_points(&c.points).ok())
                    .map(|reading| reading.gamma);
                (channel.clone(), gamma)
            })
            .collect()
    }

    fn evolution<F>(&self, point: F) -> Evolution
    where
        F: Fn(&MeasurementSet, &str) -> Option<f64>,
    {
        self.channels
            .iter()
            .map(|channel| {
                let series = self
                    .measurements
                    .iter()
                    .map(|set| point(set, channel))
                    .collect();
                (channel.clone(), series)
            })
            .collect()
    }
}
