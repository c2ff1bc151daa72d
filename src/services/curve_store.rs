//! Curve Store: the live editing session.
//!
//! Holds one [`CurveSnapshot`] for the active color mode, a cursor row for
//! densitometer readings, and a list of subscribers. Every mutation
//! notifies each subscriber with the full, already updated snapshot.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Local};

use crate::error::StoreError;
use crate::models::color_mode::CHANNEL_ORDER;
use crate::models::measurement::FILE_DATE_FORMAT;
use crate::models::{
    ColorChannelSet, CurveKind, CurveSnapshot, DensityPoint, MeasurementFile, CURVE_LEN, VRGB,
};
use crate::services::densitometer::DensitometerReading;

/// Handle returned by [`CurveStore::subscribe`].
pub type SubscriptionId = usize;

type Listener = Box<dyn Fn(&CurveSnapshot) + Send>;

/// What an import brought in, for the caller to mirror in its own state.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    pub name: String,
    pub color_set: &'static ColorChannelSet,
    /// Raw channel arrays as found in the file, unknown letters included
    pub values: BTreeMap<String, Vec<DensityPoint>>,
}

pub struct CurveStore {
    snapshot: CurveSnapshot,
    color_set: &'static ColorChannelSet,
    cursor: usize,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: SubscriptionId,
}

impl CurveStore {
    pub fn new(color_set: &'static ColorChannelSet) -> Self {
        Self {
            snapshot: CurveSnapshot::new(),
            color_set,
            cursor: 0,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn snapshot(&self) -> &CurveSnapshot {
        &self.snapshot
    }

    pub fn color_set(&self) -> &'static ColorChannelSet {
        self.color_set
    }

    /// Switch the active color mode. Stored curves stay in their slots.
    pub fn set_color_set(&mut self, color_set: &'static ColorChannelSet) {
        self.color_set = color_set;
    }

    /// Row the next densitometer reading is written to.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the reading cursor. Rows past the end are clamped to the last row.
    pub fn select_row(&mut self, row: usize) {
        self.cursor = row.min(CURVE_LEN - 1);
    }

    /// Register a listener called with the snapshot after every mutation.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&CurveSnapshot) + Send + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` for an unknown id.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Write one point into `{kind}_{slot}`.
    ///
    /// Unknown slots and indices outside `0..21` are ignored: nothing changes
    /// and nobody is notified.
    pub fn set(&mut self, kind: CurveKind, slot: &str, index: usize, value: DensityPoint) {
        if self.snapshot.set(kind, slot, index, value) {
            self.notify();
        }
    }

    /// Write one point addressed by channel letter through the active mode.
    /// Letters outside the mode are ignored.
    pub fn set_channel(&mut self, kind: CurveKind, letter: &str, index: usize, value: DensityPoint) {
        let slot = self.color_set.slot_of(letter);
        self.set(kind, slot, index, value);
    }

    /// Reset every point of every curve to absent.
    pub fn clear(&mut self) {
        self.snapshot.clear();
        self.notify();
    }

    /// Reset the curves of one kind.
    pub fn clear_kind(&mut self, kind: CurveKind) {
        for slot in crate::models::SLOT_KEYS {
            for index in 0..CURVE_LEN {
                self.snapshot.set(kind, slot, index, None);
            }
        }
        self.notify();
    }

    /// Write a densitometer reading into the measured curves at the cursor,
    /// then advance the cursor (it stays on the last row once there).
    pub fn record_reading(&mut self, reading: &DensitometerReading) {
        let row = self.cursor;
        for (letter, value) in reading {
            let slot = self.color_set.slot_of(letter);
            self.snapshot.set(CurveKind::Measured, slot, row, Some(*value));
        }
        if self.cursor < CURVE_LEN - 1 {
            self.cursor += 1;
        }
        self.notify();
    }

    /// Load a parsed file into the measured curves.
    pub fn import(&mut self, file: &MeasurementFile) -> Result<ImportSummary, StoreError> {
        self.import_as(file, CurveKind::Measured)
    }

    /// Load a parsed file into the curves of `kind`.
    ///
    /// The file's color mode becomes the active mode. Channels the mode does
    /// not define are skipped; arrays longer than 21 are truncated and
    /// shorter ones leave the remaining points untouched.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnknownColorMode`] when the file names a mode other than
    /// `vrgb` or `vcmy`. The store is left unchanged.
    pub fn import_as(
        &mut self,
        file: &MeasurementFile,
        kind: CurveKind,
    ) -> Result<ImportSummary, StoreError> {
        let mode = file.color_or_default();
        let color_set = ColorChannelSet::get(mode)
            .ok_or_else(|| StoreError::UnknownColorMode(mode.to_string()))?;
        self.color_set = color_set;

        let values = file.channel_points();
        for (letter, points) in &values {
            let slot = color_set.slot_of(letter);
            if slot.is_empty() {
                continue;
            }
            for (index, point) in points.iter().take(CURVE_LEN).enumerate() {
                self.snapshot.set(kind, slot, index, *point);
            }
        }
        self.notify();

        Ok(ImportSummary {
            name: file.name_or_default().to_string(),
            color_set,
            values,
        })
    }

    /// Read and import a file into the curves of `kind`.
    pub fn import_file(&mut self, path: &Path, kind: CurveKind) -> Result<ImportSummary, StoreError> {
        self.import_as(&read_file(path)?, kind)
    }

    /// Import a reference and a measurement for comparison.
    ///
    /// # Errors
    ///
    /// [`StoreError::ColorModeMismatch`] when the two files name different
    /// color modes. Both files are read before the store changes, so on any
    /// error the store is left unchanged.
    pub fn import_comparison(
        &mut self,
        reference: &Path,
        measured: &Path,
    ) -> Result<(ImportSummary, ImportSummary), StoreError> {
        let reference = read_file(reference)?;
        let measured = read_file(measured)?;
        let (reference_mode, measured_mode) =
            (reference.color_or_default(), measured.color_or_default());
        if reference_mode != measured_mode {
            return Err(StoreError::ColorModeMismatch {
                reference: reference_mode.to_string(),
                measured: measured_mode.to_string(),
            });
        }
        let reference = self.import_as(&reference, CurveKind::Reference)?;
        let measured = self.import_as(&measured, CurveKind::Measured)?;
        Ok((reference, measured))
    }

    /// Measured curves as a persistable file, dated `now`.
    ///
    /// Only channels with at least one present value are included; absent
    /// points are written as `0.0`.
    pub fn to_file(&self, name: &str, now: DateTime<Local>) -> MeasurementFile {
        let mut values = BTreeMap::new();
        for (letter, slot) in self.color_set.channels().iter().zip(crate::models::SLOT_KEYS) {
            let Some(points) = self.snapshot.curve(CurveKind::Measured, slot) else {
                continue;
            };
            if points.iter().all(Option::is_none) {
                continue;
            }
            let dense: Vec<f64> = points.iter().map(|p| p.unwrap_or(0.0)).collect();
            values.insert(letter.to_string(), serde_json::Value::from(dense));
        }

        MeasurementFile {
            name: Some(name.to_string()),
            color: Some(self.color_set.name().to_string()),
            date: Some(now.format(FILE_DATE_FORMAT).to_string()),
            values,
        }
    }

    /// Write the measured curves to `path` as pretty-printed JSON.
    pub fn export(&self, path: &Path, name: &str) -> Result<(), StoreError> {
        let file = self.to_file(name, Local::now());
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &file)?;
        writer.flush()?;
        Ok(())
    }

    /// Suggested export file name: `{name}_{CHANNELS}_{YYYY-MM-DD_HHMM}.json`.
    pub fn export_file_name(&self, name: &str, now: DateTime<Local>) -> String {
        let used: String = CHANNEL_ORDER
            .iter()
            .filter(|letter| {
                let slot = self.color_set.slot_of(letter);
                !slot.is_empty() && self.snapshot.has_values(CurveKind::Measured, slot)
            })
            .map(|letter| letter.to_uppercase())
            .collect();
        format!("{}_{}_{}.json", name, used, now.format(FILE_DATE_FORMAT))
    }

    fn notify(&self) {
        for (_, listener) in &self.listeners {
            listener(&self.snapshot);
        }
    }
}

impl Default for CurveStore {
    fn default() -> Self {
        Self::new(&VRGB)
    }
}

impl std::fmt::Debug for CurveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurveStore")
            .field("color_set", &self.color_set.name())
            .field("cursor", &self.cursor)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn read_file(path: &Path) -> Result<MeasurementFile, StoreError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
