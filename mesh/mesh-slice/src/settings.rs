//! Print settings record.
//!
//! Only the layer height and infill density influence slicing. Speed and
//! temperatures are carried through to output unchanged.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SliceError, SliceResult};
use crate::params::SliceParams;

/// User-facing print settings, as stored in a JSON settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintSettings {
    /// Layer height in mm.
    pub layer_height: f64,
    /// Infill density (0.0-1.0).
    pub infill_density: f64,
    /// Print speed in mm/s.
    pub print_speed: f64,
    /// Nozzle temperature in °C.
    pub nozzle_temp: f64,
    /// Bed temperature in °C.
    pub bed_temp: f64,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            layer_height: 2.0,
            infill_density: 0.2,
            print_speed: 50.0,
            nozzle_temp: 200.0,
            bed_temp: 60.0,
        }
    }
}

impl PrintSettings {
    /// Parse settings from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SliceError::Settings`] if the text is not a valid settings object.
    pub fn from_json_str(json: &str) -> SliceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`SliceError::IoRead`] if the file cannot be read and
    /// [`SliceError::Settings`] if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> SliceResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SliceError::IoRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SliceError::Settings`] if serialization fails.
    pub fn to_json_string(&self) -> SliceResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Slicing parameters derived from these settings.
    #[must_use]
    pub fn slice_params(&self) -> SliceParams {
        SliceParams::default()
            .with_layer_height(self.layer_height)
            .with_infill(self.infill_density)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = PrintSettings::default();
        assert!((settings.layer_height - 2.0).abs() < f64::EPSILON);
        assert!((settings.nozzle_temp - 200.0).abs() < f64::EPSILON);
        assert!((settings.bed_temp - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = PrintSettings::from_json_str(r#"{"layer_height": 0.3}"#).unwrap();
        assert!((settings.layer_height - 0.3).abs() < f64::EPSILON);
        assert!((settings.print_speed - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            PrintSettings::from_json_str("{ layer_height"),
            Err(SliceError::Settings(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let settings = PrintSettings {
            bed_temp: 75.0,
            ..Default::default()
        };
        let text = settings.to_json_string().unwrap();
        assert_eq!(PrintSettings::from_json_str(&text).unwrap(), settings);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"infill_density": 0.5, "nozzle_temp": 215}"#).unwrap();

        let settings = PrintSettings::load(&path).unwrap();
        assert!((settings.infill_density - 0.5).abs() < f64::EPSILON);
        assert!((settings.nozzle_temp - 215.0).abs() < f64::EPSILON);

        let params = settings.slice_params();
        assert!((params.infill_density - 0.5).abs() < f64::EPSILON);
        assert!((params.layer_height - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            PrintSettings::load(dir.path().join("absent.json")),
            Err(SliceError::IoRead { .. })
        ));
    }
}
