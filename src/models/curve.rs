//! Density curves and the curve store snapshot.

use std::collections::BTreeMap;
use std::fmt;

use sensito_gamma::DensityCurves;
use serde::Serialize;

use super::color_mode::SLOT_KEYS;

/// Number of steps on a sensitometric wedge.
pub const CURVE_LEN: usize = 21;

/// One density reading; `None` means "not measured".
pub type DensityPoint = Option<f64>;

/// Which side of the comparison a curve belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveKind {
    Reference,
    Measured,
}

impl CurveKind {
    pub const ALL: [CurveKind; 2] = [CurveKind::Reference, CurveKind::Measured];

    /// Key prefix used in snapshots (`ref` / `meas`).
    pub fn as_str(&self) -> &'static str {
        match self {
            CurveKind::Reference => "ref",
            CurveKind::Measured => "meas",
        }
    }

    /// Parse a snapshot prefix. Unknown prefixes yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ref" => Some(CurveKind::Reference),
            "meas" => Some(CurveKind::Measured),
            _ => None,
        }
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A complete channel curve from a persisted measurement set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelCurve {
    /// Channel letter, uppercase for loaded sets ("R", "G", ...)
    pub channel: String,
    /// Exactly [`CURVE_LEN`] points in exposure-step order
    pub points: Vec<DensityPoint>,
}

impl ChannelCurve {
    pub fn new(channel: impl Into<String>, points: Vec<DensityPoint>) -> Self {
        Self {
            channel: channel.into(),
            points,
        }
    }

    /// Build from dense values.
    pub fn from_values(channel: impl Into<String>, values: &[f64]) -> Self {
        Self::new(channel, values.iter().copied().map(Some).collect())
    }

    /// Present values, in step order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().flatten().copied().collect()
    }

    pub fn d_min(&self) -> Option<f64> {
        self.points.iter().flatten().copied().reduce(f64::min)
    }

    pub fn d_max(&self) -> Option<f64> {
        self.points.iter().flatten().copied().reduce(f64::max)
    }
}

/// Full content of a curve store: one 21-point curve per `{kind}_{slot}` key.
///
/// All eight keys (`ref_a`..`ref_d`, `meas_a`..`meas_d`) are always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CurveSnapshot {
    curves: BTreeMap<String, Vec<DensityPoint>>,
}

impl CurveSnapshot {
    /// Snapshot with every point absent.
    pub fn new() -> Self {
        let mut curves = BTreeMap::new();
        for kind in CurveKind::ALL {
            for slot in SLOT_KEYS {
                curves.insert(Self::key(kind, slot), vec![None; CURVE_LEN]);
            }
        }
        Self { curves }
    }

    /// Snapshot key for a kind and slot, e.g. `meas_b`.
    pub fn key(kind: CurveKind, slot: &str) -> String {
        format!("{}_{}", kind.as_str(), slot)
    }

    /// Curve stored under a raw key such as `"ref_c"`.
    pub fn get(&self, key: &str) -> Option<&[DensityPoint]> {
        self.curves.get(key).map(Vec::as_slice)
    }

    pub fn curve(&self, kind: CurveKind, slot: &str) -> Option<&[DensityPoint]> {
        self.get(&Self::key(kind, slot))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.curves.keys().map(String::as_str)
    }

    /// Whether the curve holds at least one present point.
    pub fn has_values(&self, kind: CurveKind, slot: &str) -> bool {
        self.curve(kind, slot)
            .is_some_and(|points| points.iter().any(Option::is_some))
    }

    /// `|measured - reference|` for each step where both are present,
    /// as `(1-based step, delta)` pairs.
    pub fn delta_curve(&self, slot: &str) -> Vec<(usize, f64)> {
        let (Some(measured), Some(reference)) = (
            self.curve(CurveKind::Measured, slot),
            self.curve(CurveKind::Reference, slot),
        ) else {
            return Vec::new();
        };
        measured
            .iter()
            .zip(reference)
            .enumerate()
            .filter_map(|(i, (m, r))| Some((i + 1, (m.as_ref()? - r.as_ref()?).abs())))
            .collect()
    }

    /// Write one point. Returns `false`, leaving the snapshot untouched,
    /// for an unknown slot or an index outside `0..21`.
    pub(crate) fn set(
        &mut self,
        kind: CurveKind,
        slot: &str,
        index: usize,
        value: DensityPoint,
    ) -> bool {
        match self.curves.get_mut(&Self::key(kind, slot)) {
            Some(points) if index < CURVE_LEN => {
                points[index] = value;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        for points in self.curves.values_mut() {
            points.fill(None);
        }
    }
}

impl Default for CurveSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl DensityCurves for CurveSnapshot {
    fn measured(&self, slot: &str) -> Option<&[Option<f64>]> {
        self.curve(CurveKind::Measured, slot)
    }

    fn reference(&self, slot: &str) -> Option<&[Option<f64>]> {
        self.curve(CurveKind::Reference, slot)
    }
}
