//! Persisted measurement files and the measurement sets loaded from them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::color_mode::channel_rank;
use super::curve::{ChannelCurve, DensityPoint, CURVE_LEN};
use crate::error::MeasurementError;

/// Display name used when a file carries none.
pub const DEFAULT_NAME: &str = "sensito";

/// Color mode used when a file carries none.
pub const DEFAULT_COLOR: &str = "vrgb";

/// Format of the human-entered `"date"` field.
pub const FILE_DATE_FORMAT: &str = "%Y-%m-%d_%H%M";

/// On-disk JSON measurement file.
///
/// ```json
/// { "name": "...", "color": "vrgb", "date": "2024-05-01_1430",
///   "values": { "r": [21 numbers], ... } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Channel letter to density array. Kept loosely typed so one bad
    /// channel does not reject the whole file.
    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,
}

impl MeasurementFile {
    pub fn name_or_default(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_NAME)
    }

    pub fn color_or_default(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_COLOR)
    }

    /// Density points of every channel whose value is an array.
    /// Non-numeric entries become absent points.
    pub fn channel_points(&self) -> BTreeMap<String, Vec<DensityPoint>> {
        self.values
            .iter()
            .filter_map(|(channel, value)| {
                let points = value
                    .as_array()?
                    .iter()
                    .map(serde_json::Value::as_f64)
                    .collect();
                Some((channel.clone(), points))
            })
            .collect()
    }
}

/// A read-only measurement snapshot loaded from a file.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementSet {
    pub path: PathBuf,
    /// Acquisition time, taken from the file modification time
    pub date: DateTime<Local>,
    pub name: Option<String>,
    pub color: Option<String>,
    /// Human-entered date string, for display only
    pub json_date: Option<String>,
    /// Complete curves keyed by uppercase channel letter
    pub curves: BTreeMap<String, ChannelCurve>,
}

impl MeasurementSet {
    /// Build a set from a parsed file, keeping only channels with exactly
    /// 21 numeric values.
    ///
    /// # Errors
    ///
    /// [`MeasurementError::NoData`] when no channel qualifies.
    pub fn from_file(
        path: impl Into<PathBuf>,
        file: MeasurementFile,
        date: DateTime<Local>,
    ) -> Result<Self, MeasurementError> {
        let path = path.into();
        let curves: BTreeMap<String, ChannelCurve> = file
            .channel_points()
            .into_iter()
            .filter(|(_, points)| points.len() == CURVE_LEN && points.iter().all(Option::is_some))
            .map(|(channel, points)| {
                let channel = channel.to_uppercase();
                (channel.clone(), ChannelCurve::new(channel, points))
            })
            .collect();

        if curves.is_empty() {
            return Err(MeasurementError::NoData(path));
        }

        Ok(Self {
            path,
            date,
            name: file.name,
            color: file.color,
            json_date: file.date,
            curves,
        })
    }

    pub fn curve(&self, channel: &str) -> Option<&ChannelCurve> {
        self.curves.get(channel)
    }

    /// Channel letters in canonical `V R G B C M Y` order.
    pub fn channels(&self) -> Vec<&str> {
        let mut channels: Vec<&str> = self.curves.keys().map(String::as_str).collect();
        channels.sort_by_key(|c| channel_rank(c));
        channels
    }

    /// File name when the set carries no name.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| file_stem(&self.path))
    }

    /// The `"date"` string, or the acquisition day.
    pub fn display_date(&self) -> String {
        self.json_date
            .clone()
            .unwrap_or_else(|| self.date.format("%Y-%m-%d").to_string())
    }

    /// Calendar day used for period filtering: the `YYYY-MM-DD` prefix of the
    /// `"date"` string when it parses, else the acquisition day.
    pub fn day(&self) -> NaiveDate {
        self.json_date
            .as_deref()
            .and_then(|s| s.get(..10))
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
            .unwrap_or_else(|| self.date.date_naive())
    }

    /// Browser label: `"{name} [{channels}] - {date}"`.
    pub fn label(&self) -> String {
        format!(
            "{} [{}] - {}",
            self.display_name(),
            self.channels().join(", "),
            self.display_date()
        )
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn ramp(scale: f64) -> serde_json::Value {
        json!((0..21).map(|i| i as f64 * scale).collect::<Vec<_>>())
    }

    fn file(values: serde_json::Value) -> MeasurementFile {
        serde_json::from_value(json!({ "name": "Test", "values": values })).unwrap()
    }

    fn when() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_defaults_when_fields_missing() {
        let parsed: MeasurementFile = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.name_or_default(), "sensito");
        assert_eq!(parsed.color_or_default(), "vrgb");
        assert!(parsed.values.is_empty());
    }

    #[test]
    fn test_only_complete_numeric_channels_kept() {
        let mut short = ramp(0.1);
        short.as_array_mut().unwrap().pop();
        let mut with_null = ramp(0.1);
        with_null[3] = serde_json::Value::Null;

        let parsed = file(json!({
            "r": ramp(0.1),
            "g": short,
            "b": with_null,
            "v": "not an array",
        }));
        let set = MeasurementSet::from_file("m.json", parsed, when()).unwrap();

        assert_eq!(set.channels(), vec!["R"]);
        assert_eq!(set.curve("R").unwrap().channel, "R");
        assert_eq!(set.curve("R").unwrap().points.len(), 21);
    }

    #[test]
    fn test_no_valid_channel_is_no_data() {
        let parsed = file(json!({ "r": [1.0, 2.0] }));
        let err = MeasurementSet::from_file("empty.json", parsed, when()).unwrap_err();
        assert!(matches!(err, MeasurementError::NoData(p) if p == Path::new("empty.json")));
    }

    #[test]
    fn test_label_and_channel_order() {
        let parsed = file(json!({ "b": ramp(0.1), "r": ramp(0.1), "g": ramp(0.1) }));
        let set = MeasurementSet::from_file("dir/run.json", parsed, when()).unwrap();
        assert_eq!(set.label(), "Test [R, G, B] - 2024-03-09");
    }

    #[test]
    fn test_display_name_falls_back_to_stem() {
        let parsed: MeasurementFile =
            serde_json::from_value(json!({ "date": "2023-12-01_0915", "values": { "r": ramp(0.1) } }))
                .unwrap();
        let set = MeasurementSet::from_file("dir/run_07.json", parsed, when()).unwrap();
        assert_eq!(set.display_name(), "run_07");
        assert_eq!(set.display_date(), "2023-12-01_0915");
        assert_eq!(set.day(), NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
    }

    #[test]
    fn test_day_falls_back_to_mtime() {
        let parsed: MeasurementFile =
            serde_json::from_value(json!({ "date": "?", "values": { "r": ramp(0.1) } })).unwrap();
        let set = MeasurementSet::from_file("x.json", parsed, when()).unwrap();
        assert_eq!(set.day(), NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    }
}
