use crate::assets::AssetLoader;
use sensito_gamma::GammaOptions;
use serde::Deserialize;
use std::path::PathBuf;

use super::color_mode::{ColorChannelSet, VRGB};

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Root directory of persisted measurement files
    #[serde(default = "default_measures_dir")]
    pub measures_dir: PathBuf,

    /// Directory holding reference files (defaults to `<measures_dir>/ref`)
    #[serde(default)]
    pub reference_dir: Option<PathBuf>,

    /// Color mode of new curve sessions
    #[serde(default = "default_color_mode")]
    pub color_mode: String,

    /// Gamma extraction parameters
    #[serde(default)]
    pub gamma: GammaOptions,

    /// Channels tracked by history evolution
    #[serde(default = "default_history_channels")]
    pub history_channels: Vec<String>,
}

fn default_measures_dir() -> PathBuf {
    PathBuf::from("measures")
}

fn default_color_mode() -> String {
    "vrgb".to_string()
}

fn default_history_channels() -> Vec<String> {
    vec!["R".to_string(), "G".to_string(), "B".to_string()]
}

impl AppConfig {
    /// Load configuration from AssetLoader (embedded or external)
    pub fn load_from_assets(loader: &AssetLoader) -> Self {
        match loader.read_config_string() {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    let config: Self = config;
                    tracing::info!(
                        measures_dir = %config.measures_dir.display(),
                        color_mode = %config.color_mode,
                        step_value = config.gamma.step_value,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Directory of reference files
    pub fn reference_dir(&self) -> PathBuf {
        self.reference_dir
            .clone()
            .unwrap_or_else(|| self.measures_dir.join("ref"))
    }

    /// Configured color mode, falling back to vrgb for unknown names
    pub fn color_set(&self) -> &'static ColorChannelSet {
        ColorChannelSet::get(&self.color_mode).unwrap_or(&VRGB)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            measures_dir: default_measures_dir(),
            reference_dir: None,
            color_mode: default_color_mode(),
            gamma: GammaOptions::default(),
            history_channels: default_history_channels(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VCMY;
    use sensito_gamma::GammaMethod;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.measures_dir, PathBuf::from("measures"));
        assert_eq!(config.reference_dir(), PathBuf::from("measures/ref"));
        assert_eq!(config.color_set(), &VRGB);
        assert_eq!(config.gamma, GammaOptions::default());
        assert_eq!(config.history_channels, vec!["R", "G", "B"]);
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
measures_dir: /data/sensito
reference_dir: /data/refs
color_mode: vcmy
gamma:
  step_value: 0.2
  method: max_slope
history_channels: [C, M, Y]
"#;

        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.measures_dir, PathBuf::from("/data/sensito"));
        assert_eq!(config.reference_dir(), PathBuf::from("/data/refs"));
        assert_eq!(config.color_set(), &VCMY);
        assert!((config.gamma.step_value - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.gamma.method, GammaMethod::MaxSlope);
        // untouched gamma fields keep their defaults
        assert_eq!(config.gamma.num_steps, 4);
        assert_eq!(config.history_channels, vec!["C", "M", "Y"]);
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_unknown_color_mode_falls_back() {
        let config = AppConfig {
            color_mode: "rgb".to_string(),
            ..Default::default()
        };
        assert_eq!(config.color_set(), &VRGB);
    }

    #[test]
    fn test_embedded_config_parses() {
        let loader = AssetLoader::new(None);
        let content = loader.read_config_string().unwrap();
        let config: AppConfig = serde_yaml::from_str(&content).unwrap();
        assert_eq!(config.color_mode, "vrgb");
    }
}
