//! Configuration file handling for imu-visualizer.
//!
//! Loads configuration from `<config dir>/imu-visualizer/config.toml` or a
//! custom path. Command-line flags override anything set here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::render::AxisRemap;
use crate::telemetry::Grammar;
use crate::transport::MAX_RECORD_LEN;

/// Configuration file structure for imu-visualizer.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SerialConfig {
    pub baud: u32,
    pub flow_control: bool,
    /// Longest wait for one record before re-checking for shutdown.
    /// 0 waits indefinitely.
    pub poll_interval_ms: u64,
    pub max_record_len: usize,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud: 38_400,
            flow_control: true,
            poll_interval_ms: 100,
            max_record_len: MAX_RECORD_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub grammar: Grammar,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    pub fps: u32,
    pub overlay: bool,
    pub scale: f32,
    /// Renderer axis built from sensor axes, e.g. "x,z,y" or "x,-z,y"
    pub axis_remap: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            overlay: true,
            scale: 1.0,
            axis_remap: "x,z,y".to_string(),
        }
    }
}

/// Presentation rates accepted from config or command line.
pub const FPS_RANGE: std::ops::RangeInclusive<u32> = 1..=240;

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed or holds
    /// out-of-range values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        config.validate()?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !baud_supported(self.serial.baud) {
            return Err(ConfigError::Invalid(format!(
                "serial.baud {} is not a supported rate",
                self.serial.baud
            )));
        }
        if !(16..=65_536).contains(&self.serial.max_record_len) {
            return Err(ConfigError::Invalid(format!(
                "serial.max_record_len must be between 16 and 65536, got {}",
                self.serial.max_record_len
            )));
        }
        if !FPS_RANGE.contains(&self.render.fps) {
            return Err(ConfigError::Invalid(format!(
                "render.fps must be between 1 and 240, got {}",
                self.render.fps
            )));
        }
        if !(self.render.scale.is_finite() && self.render.scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "render.scale must be a positive number, got {}",
                self.render.scale
            )));
        }
        self.axis_remap()?;
        Ok(())
    }

    /// Axis remap named by `render.axis_remap`.
    pub fn axis_remap(&self) -> Result<AxisRemap, ConfigError> {
        AxisRemap::parse(&self.render.axis_remap)
            .map_err(|e| ConfigError::Invalid(format!("render.axis_remap: {}", e)))
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(unix)]
fn baud_supported(baud: u32) -> bool {
    crate::transport::LineMode::SUPPORTED_BAUD.contains(&baud)
}

#[cfg(not(unix))]
fn baud_supported(_baud: u32) -> bool {
    true
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("imu-visualizer").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/imu-visualizer/config.toml")
        })
}

/// Commented config written by `config init`.
pub const DEFAULT_CONFIG: &str = r#"# imu-visualizer configuration

[serial]
# Line speed; must match the sensor firmware
baud = 38400
# RTS/CTS hardware flow control
flow_control = true
# Longest wait for one record before checking for shutdown (0 = wait forever)
poll_interval_ms = 100
# Longest accepted record in bytes
max_record_len = 1024

[decoder]
# Firmware output format: "quaternion" or "euler"
grammar = "quaternion"

[render]
# Frames per second
fps = 30
# Show the raw sample and link status
overlay = true
# Size of the rendered cube
scale = 1.0
# Renderer X,Y,Z taken from sensor axes (prefix with - to flip)
axis_remap = "x,z,y"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("none.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.serial.baud, 38_400);
        assert!(config.serial.flow_control);
        assert_eq!(config.serial.poll_interval_ms, 100);
        assert_eq!(config.serial.max_record_len, 1024);
        assert_eq!(config.decoder.grammar, Grammar::Quaternion);
        assert_eq!(config.render.fps, 30);
        assert!(config.render.overlay);
        assert_eq!(config.render.axis_remap, "x,z,y");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let file = write_config("[decoder]\ngrammar = \"euler\"\n");
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.decoder.grammar, Grammar::Euler);
        assert_eq!(config.serial.baud, 38_400);
        assert_eq!(config.render.fps, 30);
    }

    #[test]
    fn test_default_config_template_parses() {
        let file = write_config(DEFAULT_CONFIG);
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_error_names_path() {
        let file = write_config("[serial\nbaud = ");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(format!("{}", err).contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_unknown_grammar_is_parse_error() {
        let file = write_config("[decoder]\ngrammar = \"binary\"\n");
        assert!(matches!(
            Config::load(Some(file.path())),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_invalid_values() {
        let file = write_config("[render]\nfps = 0\n");
        assert!(matches!(
            Config::load(Some(file.path())),
            Err(ConfigError::Invalid(_))
        ));

        let file = write_config("[serial]\nbaud = 12345\n");
        assert!(matches!(
            Config::load(Some(file.path())),
            Err(ConfigError::Invalid(_))
        ));

        let file = write_config("[render]\naxis_remap = \"x,x,y\"\n");
        assert!(matches!(
            Config::load(Some(file.path())),
            Err(ConfigError::Invalid(_))
        ));

        let file = write_config("[render]\nscale = -1.0\n");
        assert!(matches!(
            Config::load(Some(file.path())),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_default_path_file_name() {
        let path = default_path();
        assert!(path.ends_with("imu-visualizer/config.toml"));
    }
}
