//! Panel configuration file
//!
//! TOML settings for the panel and streaming engine. Every key is optional;
//! missing keys fall back to a 240×320 ILI9341 in portrait behind
//! `/dev/ili9341`.
//!
//! ```toml
//! device_path = "/dev/ili9341"
//! orientation = "landscape"
//! buffer_capacity = 10240
//! pixel_mode = "data16"
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::display::color::Rgb565;
use crate::display::ili9341::{self, Orientation, PixelMode};
use crate::stream::pool::DEFAULT_CAPACITY;
use crate::stream::Geometry;
use crate::transport::chardev::DEFAULT_DEVICE_PATH;

/// Panel and transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelConfig {
    /// Device node written by the character device transport
    pub device_path: PathBuf,
    /// Panel orientation
    pub orientation: Orientation,
    /// Panel width in portrait orientation
    pub native_width: u16,
    /// Panel height in portrait orientation
    pub native_height: u16,
    /// Bytes per staging buffer
    pub buffer_capacity: usize,
    /// Pixel data frame width
    pub pixel_mode: PixelMode,
    /// Delay after reset and sleep-out, in milliseconds
    pub init_delay_ms: u64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            device_path: PathBuf::from(DEFAULT_DEVICE_PATH),
            orientation: Orientation::Portrait,
            native_width: ili9341::WIDTH,
            native_height: ili9341::HEIGHT,
            buffer_capacity: DEFAULT_CAPACITY,
            pixel_mode: PixelMode::Data16,
            init_delay_ms: 120,
        }
    }
}

impl PanelConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Parse and validate TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings the streaming engine relies on
    pub fn validate(&self) -> Result<()> {
        if self.native_width == 0 || self.native_height == 0 {
            bail!(
                "panel dimensions must be non-zero (got {}x{})",
                self.native_width,
                self.native_height
            );
        }

        let bpp = Rgb565::BYTES as usize;
        if self.buffer_capacity < bpp {
            bail!(
                "buffer_capacity {} cannot hold a single {}-byte pixel",
                self.buffer_capacity,
                bpp
            );
        }
        if self.buffer_capacity % bpp != 0 {
            bail!(
                "buffer_capacity {} is not a whole number of {}-byte pixels",
                self.buffer_capacity,
                bpp
            );
        }
        Ok(())
    }

    /// Active geometry for the configured orientation
    pub fn geometry(&self) -> Geometry {
        let (width, height) = self
            .orientation
            .active_size(self.native_width, self.native_height);
        Geometry::new(width, height)
    }

    /// Serialize back to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PanelConfig::parse("").unwrap();
        assert_eq!(config, PanelConfig::default());
        assert_eq!(config.geometry(), Geometry::new(240, 320));
        assert_eq!(config.device_path, PathBuf::from("/dev/ili9341"));
    }

    #[test]
    fn test_landscape_swaps_geometry() {
        let config = PanelConfig::parse("orientation = \"landscape\"\n").unwrap();
        assert_eq!(config.geometry(), Geometry::new(320, 240));
    }

    #[test]
    fn test_parse_all_keys() {
        let content = r#"
device_path = "/tmp/lcd"
orientation = "portrait"
native_width = 128
native_height = 160
buffer_capacity = 512
pixel_mode = "data8"
init_delay_ms = 5
"#;
        let config = PanelConfig::parse(content).unwrap();
        assert_eq!(config.native_width, 128);
        assert_eq!(config.buffer_capacity, 512);
        assert_eq!(config.pixel_mode, PixelMode::Data8);
        assert_eq!(config.init_delay_ms, 5);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(PanelConfig::parse("buffer_capacity = 1").is_err());
        assert!(PanelConfig::parse("buffer_capacity = 1025").is_err());
        assert!(PanelConfig::parse("native_width = 0").is_err());
        assert!(PanelConfig::parse("orientation = \"sideways\"").is_err());
        assert!(PanelConfig::parse("baud = 9600").is_err());
    }

    #[test]
    fn test_round_trip_through_file() {
        let config = PanelConfig {
            orientation: Orientation::Landscape,
            buffer_capacity: 4096,
            ..PanelConfig::default()
        };

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_toml().unwrap().as_bytes()).unwrap();

        assert_eq!(PanelConfig::load(file.path()).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let err = PanelConfig::load(Path::new("/nonexistent/lcd.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
