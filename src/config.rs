use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::od::{ExtractorConfig, OdExtractor};

/// Environment variable naming a settings file.
pub const SETTINGS_ENV: &str = "KRBCAM_SETTINGS";
/// Settings file picked up from the working directory when present.
pub const SETTINGS_FILE: &str = "krbcam.json";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Acquisition constants and display defaults, fixed for the life of the
/// process. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub kinetic_series_length: usize,
    pub num_sub_images: usize,
    pub od_max: f64,
    /// Prefix of saved frame files, e.g. `iXon_img` for `iXon_img10a.csv`.
    pub filename_base: String,
    /// Display names for the kinetic indices (one per imaged species).
    pub kinetic_labels: Vec<String>,
    /// Initial `[min, max]` colour range for OD frames.
    pub od_limits: [i64; 2],
    /// Initial `[min, max]` colour range for raw count frames.
    pub count_limits: [i64; 2],
}

impl Default for Settings {
    fn default() -> Self {
        let extractor = ExtractorConfig::default();
        Self {
            kinetic_series_length: extractor.kinetic_series_length,
            num_sub_images: extractor.num_sub_images,
            od_max: extractor.od_max,
            filename_base: "iXon_img".to_string(),
            kinetic_labels: vec!["K".to_string(), "Rb".to_string()],
            od_limits: [0, 3],
            count_limits: [500, 2000],
        }
    }
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing settings {}", path.display()))
    }

    /// Load from `$KRBCAM_SETTINGS`, else `./krbcam.json`, else defaults.
    pub fn load() -> Result<Self> {
        match settings_path() {
            Some(path) => {
                let settings = Self::from_file(&path)?;
                log::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            None => {
                log::info!("No settings file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            kinetic_series_length: self.kinetic_series_length,
            num_sub_images: self.num_sub_images,
            od_max: self.od_max,
        }
    }

    /// Validated extractor for these settings.
    pub fn extractor(&self) -> Result<OdExtractor> {
        OdExtractor::new(self.extractor_config()).context("invalid settings")
    }

    /// Label for kinetic index `k`; unnamed indices read `Frame {k}`.
    pub fn kinetic_label(&self, k: usize) -> String {
        self.kinetic_labels
            .get(k)
            .cloned()
            .unwrap_or_else(|| format!("Frame {k}"))
    }
}

fn settings_path() -> Option<PathBuf> {
    if let Some(p) = std::env::var_os(SETTINGS_ENV) {
        return Some(PathBuf::from(p));
    }
    let local = PathBuf::from(SETTINGS_FILE);
    local.is_file().then_some(local)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("krbcam.json");
        std::fs::write(&path, r#"{"od_max": 4.5, "kinetic_labels": ["Li"]}"#).unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.od_max, 4.5);
        assert_eq!(settings.kinetic_series_length, 2);
        assert_eq!(settings.count_limits, [500, 2000]);
        assert_eq!(settings.kinetic_label(0), "Li");
        assert_eq!(settings.kinetic_label(1), "Frame 1");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("krbcam.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Settings::from_file(&path).is_err());
    }

    #[test]
    fn invalid_constants_are_rejected() {
        let settings = Settings {
            num_sub_images: 2,
            ..Settings::default()
        };
        assert!(settings.extractor().is_err());
        assert!(Settings::default().extractor().is_ok());
    }
}
