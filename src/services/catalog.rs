//! Measurement catalog: the data side of the history browser.
//!
//! Walks a measures directory, loads every `*.json` file it can and groups
//! the resulting sets by folder. Files that do not hold a measurement are
//! skipped with a debug log.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::models::MeasurementSet;
use crate::services::loader::load_measurement_file;

/// Folder name of files directly inside the catalog root.
pub const ROOT_FOLDER: &str = ".";

/// Period filter applied to the entry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePeriod {
    #[default]
    All,
    Today,
    Month,
    Year,
}

impl DatePeriod {
    /// Whether `day` falls in this period relative to `today`.
    pub fn contains(&self, day: NaiveDate, today: NaiveDate) -> bool {
        match self {
            DatePeriod::All => true,
            DatePeriod::Today => day == today,
            DatePeriod::Month => day.year() == today.year() && day.month() == today.month(),
            DatePeriod::Year => day.year() == today.year(),
        }
    }
}

impl FromStr for DatePeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(DatePeriod::All),
            "today" => Ok(DatePeriod::Today),
            "month" => Ok(DatePeriod::Month),
            "year" => Ok(DatePeriod::Year),
            other => Err(format!(
                "unknown period '{other}' (expected all, today, month or year)"
            )),
        }
    }
}

impl fmt::Display for DatePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DatePeriod::All => "all",
            DatePeriod::Today => "today",
            DatePeriod::Month => "month",
            DatePeriod::Year => "year",
        };
        write!(f, "{name}")
    }
}

/// One loaded file of the catalog.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Folder relative to the catalog root, [`ROOT_FOLDER`] for the root itself
    pub folder: String,
    pub relative_path: PathBuf,
    pub set: MeasurementSet,
}

impl CatalogEntry {
    pub fn label(&self) -> String {
        self.set.label()
    }

    /// Case-insensitive match of `text` against the label. Empty text matches.
    pub fn matches(&self, text: &str) -> bool {
        text.is_empty() || self.label().to_lowercase().contains(&text.to_lowercase())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MeasurementCatalog {
    root: PathBuf,
    entries: Vec<CatalogEntry>,
}

impl MeasurementCatalog {
    /// Scan `root` recursively.
    ///
    /// Folders come root first, then by case-insensitive name; files within
    /// a folder are sorted by name. A missing root yields an empty catalog.
    pub fn scan(root: &Path) -> io::Result<Self> {
        let mut catalog = Self {
            root: root.to_path_buf(),
            entries: Vec::new(),
        };
        if !root.is_dir() {
            tracing::debug!(root = %root.display(), "Measures directory missing, catalog empty");
            return Ok(catalog);
        }

        let mut folders = Vec::new();
        collect_folders(root, &mut folders)?;
        folders.sort_by_key(|dir| {
            let folder = folder_name(root, dir);
            (folder != ROOT_FOLDER, folder.to_lowercase())
        });

        for dir in folders {
            let folder = folder_name(root, &dir);
            for path in json_files(&dir)? {
                match load_measurement_file(&path) {
                    Ok(set) => {
                        let relative_path = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
                        catalog.entries.push(CatalogEntry {
                            folder: folder.clone(),
                            relative_path,
                            set,
                        });
                    }
                    Err(e) => {
                        tracing::debug!(path = %path.display(), error = %e, "Skipping file");
                    }
                }
            }
        }

        tracing::debug!(
            root = %root.display(),
            entries = catalog.entries.len(),
            "Scanned measurement catalog"
        );
        Ok(catalog)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Folders holding at least one entry, in catalog order.
    pub fn folders(&self) -> Vec<&str> {
        let mut folders: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if folders.last() != Some(&entry.folder.as_str()) {
                folders.push(&entry.folder);
            }
        }
        folders
    }

    /// Entries matching the label text and falling in `period`.
    pub fn filter(&self, text: &str, period: DatePeriod, today: NaiveDate) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.matches(text))
            .filter(|entry| period.contains(entry.set.day(), today))
            .collect()
    }

    /// Clones of the sets, for history analysis.
    pub fn sets(&self) -> Vec<MeasurementSet> {
        self.entries.iter().map(|e| e.set.clone()).collect()
    }

    /// Clones of the sets that do not live under `dir`.
    ///
    /// Paths are compared after canonicalization, so `dir` may be spelled
    /// differently from the scanned root.
    pub fn sets_outside(&self, dir: &Path) -> Vec<MeasurementSet> {
        let excluded = canonical(dir);
        self.entries
            .iter()
            .filter(|e| !canonical(&e.set.path).starts_with(&excluded))
            .map(|e| e.set.clone())
            .collect()
    }
}

/// `*.json` files directly inside `dir`, sorted by name.
/// A missing directory yields an empty list.
pub fn reference_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    json_files(dir)
}

fn collect_folders(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    out.push(dir.to_path_buf());
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        // symlinked folders are not followed
        if entry.file_type()?.is_dir() {
            collect_folders(&entry.path(), out)?;
        }
    }
    Ok(())
}

fn json_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn folder_name(root: &Path, dir: &Path) -> String {
    match dir.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ROOT_FOLDER.to_string(),
        Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
        Err(_) => dir.to_string_lossy().into_owned(),
    }
}
