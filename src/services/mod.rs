pub mod catalog;
pub mod curve_store;
pub mod densitometer;
pub mod history;
pub mod loader;

pub use catalog::{reference_files, CatalogEntry, DatePeriod, MeasurementCatalog};
pub use curve_store::{CurveStore, ImportSummary, SubscriptionId};
pub use densitometer::{parse_line, record_lines, DensitometerReading};
pub use history::{Evolution, HistoryAnalyzer};
pub use loader::load_measurement_file;
