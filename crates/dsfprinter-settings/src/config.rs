//! Printer bridge configuration
//!
//! The host hands the bridge a flat key-value configuration. Recognized keys
//! are typed fields here; every other key is kept in [`PrinterSettings::extra`]
//! so nothing the host sends is dropped. Keys use the host's camelCase names.

use crate::error::{SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Settings recognized by the virtual printer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrinterSettings {
    /// Minimum spacing between machine model patch fetches, in seconds
    pub throttle: f64,
    /// Idle wait of the intercept worker while nothing is subscribed, in seconds
    pub wait_interval: f64,
    /// Receive buffer size advertised to clients (advisory)
    pub rx_buffer: usize,
    /// Number of commands a client may keep in flight (advisory)
    pub command_buffer: usize,
    /// Temperature reported for heaters the model does not provide
    pub ambient_temperature: f64,
    /// Firmware name used in the M115 report
    pub firmware_name: String,
    /// Acknowledgement line format
    pub ok_format_string: String,
    /// M115 firmware report template
    #[serde(rename = "m115FormatString")]
    pub m115_format_string: String,
    /// Whether clients should expect a heated bed
    pub has_bed: bool,
    /// Whether clients should expect a heated chamber
    pub has_chamber: bool,
    /// Number of extruders clients should expect
    pub num_extruders: usize,
    /// Every key not listed above
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Default for PrinterSettings {
    fn default() -> Self {
        Self {
            throttle: 0.01,
            wait_interval: 1.0,
            rx_buffer: 64,
            command_buffer: 4,
            ambient_temperature: 21.3,
            firmware_name: "DSF".to_string(),
            ok_format_string: "ok".to_string(),
            m115_format_string: "FIRMWARE_NAME:{firmware_name} PROTOCOL_VERSION:1.0"
                .to_string(),
            has_bed: true,
            has_chamber: false,
            num_extruders: 1,
            extra: HashMap::new(),
        }
    }
}

impl PrinterSettings {
    /// Create settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Build settings from a flat key-value map
    pub fn from_map(map: HashMap<String, Value>) -> SettingsResult<Self> {
        let object = map.into_iter().collect::<serde_json::Map<_, _>>();
        let settings: Self = serde_json::from_value(Value::Object(object))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from JSON text
    pub fn from_json_str(content: &str) -> SettingsResult<Self> {
        let settings: Self = serde_json::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from TOML text
    pub fn from_toml_str(content: &str) -> SettingsResult<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a `.json` or `.toml` file
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let settings = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content)?,
            Some("toml") => Self::from_toml_str(&content)?,
            other => {
                return Err(SettingsError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                ))
            }
        };

        tracing::debug!("loaded printer settings from {}", path.display());
        Ok(settings)
    }

    /// Validate settings
    pub fn validate(&self) -> SettingsResult<()> {
        if !self.throttle.is_finite() || self.throttle < 0.0 {
            return Err(SettingsError::invalid(
                "throttle",
                "must be a non-negative number of seconds",
            ));
        }

        if !self.wait_interval.is_finite() || self.wait_interval < 0.0 {
            return Err(SettingsError::invalid(
                "waitInterval",
                "must be a non-negative number of seconds",
            ));
        }

        if self.rx_buffer == 0 {
            return Err(SettingsError::invalid("rxBuffer", "must be > 0"));
        }

        if self.command_buffer == 0 {
            return Err(SettingsError::invalid("commandBuffer", "must be > 0"));
        }

        if !self.ambient_temperature.is_finite() {
            return Err(SettingsError::invalid(
                "ambientTemperature",
                "must be a finite temperature",
            ));
        }

        Ok(())
    }

    /// Throttle interval as a duration, zero if the setting is invalid
    pub fn throttle_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.throttle).unwrap_or_default()
    }

    /// Worker idle wait as a duration, zero if the setting is invalid
    pub fn wait_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.wait_interval).unwrap_or_default()
    }

    /// Look up a key the bridge does not interpret itself
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}
