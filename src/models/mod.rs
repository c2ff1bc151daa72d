pub mod color_mode;
pub mod config;
pub mod curve;
pub mod measurement;

pub use color_mode::{ColorChannelSet, CHANNEL_ORDER, NEUTRAL_CHANNEL, SLOT_KEYS, VCMY, VRGB};
pub use config::AppConfig;
pub use curve::{ChannelCurve, CurveKind, CurveSnapshot, DensityPoint, CURVE_LEN};
pub use measurement::{MeasurementFile, MeasurementSet, DEFAULT_COLOR, DEFAULT_NAME};
