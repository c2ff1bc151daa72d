//! Measurement Set loader.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, Local};

use crate::error::MeasurementError;
use crate::models::{MeasurementFile, MeasurementSet};

/// Load a persisted measurement file.
///
/// The acquisition date is the file modification time; the `"date"` field
/// is kept for display only.
///
/// # Errors
///
/// `Io` when the file cannot be read, `Json` when it is not a measurement
/// document and `NoData` when no channel holds 21 numeric values.
pub fn load_measurement_file(path: &Path) -> Result<MeasurementSet, MeasurementError> {
    let file = File::open(path)?;
    let modified = file.metadata()?.modified()?;
    let parsed: MeasurementFile = serde_json::from_reader(BufReader::new(file))?;

    MeasurementSet::from_file(path, parsed, DateTime::<Local>::from(modified))
}
