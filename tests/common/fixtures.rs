//! Test fixtures: density curves and scratch measures directories.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde_json::{json, Value};
use tempfile::TempDir;

/// Characteristic curve with toe and shoulder (gamma 1.667 at step 0.15)
pub const SCENARIO: [f64; 21] = [
    0.05, 0.10, 0.20, 0.35, 0.55, 0.80, 1.05, 1.30, 1.55, 1.80, 2.05, 2.30, 2.55, 2.80, 3.00,
    3.15, 3.25, 3.32, 3.36, 3.38, 3.39,
];

/// 21 evenly spaced densities from `from` to `to`
pub fn ramp(from: f64, to: f64) -> Vec<f64> {
    (0..21)
        .map(|i| from + (to - from) * i as f64 / 20.0)
        .collect()
}

/// Scenario curve lifted by `offset`
pub fn shifted(offset: f64) -> Vec<f64> {
    SCENARIO.iter().map(|v| v + offset).collect()
}

/// Measurement file document
pub fn measurement(name: &str, color: &str, date: &str, values: Value) -> Value {
    json!({ "name": name, "color": color, "date": date, "values": values })
}

/// Scratch measures directory removed on drop
pub struct MeasuresDir {
    dir: TempDir,
}

impl MeasuresDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `doc` to `relative`, creating parent folders
    pub fn write(&self, relative: &str, doc: &Value) -> PathBuf {
        self.write_raw(relative, &serde_json::to_string_pretty(doc).unwrap())
    }

    pub fn write_raw(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    /// Write `doc` and set its modification time to `days` after the epoch
    pub fn write_dated(&self, relative: &str, doc: &Value, days: u64) -> PathBuf {
        let path = self.write(relative, doc);
        set_mtime(&path, days);
        path
    }
}

pub fn set_mtime(path: &Path, days: u64) {
    let when = SystemTime::UNIX_EPOCH + Duration::from_secs(days * 86_400 + 12 * 3_600);
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(when)
        .unwrap();
}
