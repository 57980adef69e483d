//! Canvas configuration.
//!
//! A [`CanvasConfig`] is fixed when the canvas is created. It can be built in
//! code with the `with_*` methods or loaded from TOML:
//!
//! ```
//! use mipview::CanvasConfig;
//! use mipview::render::{KernelPath, Rgb};
//!
//! let config = CanvasConfig::from_toml_str(r##"
//!     background = "#202020"
//!     mip_levels = 6
//!     kernel = "scalar"
//! "##).unwrap();
//!
//! assert_eq!(config.background, Rgb::new(0x20, 0x20, 0x20));
//! assert_eq!(config.mip_levels, 6);
//! assert_eq!(config.kernel, KernelPath::Scalar);
//! assert_eq!(config.max_zoom, 5);
//! ```

use mipview_render::pyramid::DEFAULT_MIP_LEVELS;
use mipview_render::{KernelPath, Rgb};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Wheel delta reported for one detent of a standard mouse wheel.
pub const WHEEL_NOTCH: i32 = 120;

/// Default maximum zoom exponent (32x).
pub const DEFAULT_MAX_ZOOM: i32 = 5;

/// Largest accepted `max_zoom`.
pub const MAX_ZOOM_LIMIT: i32 = 10;

/// Largest accepted `mip_levels`.
pub const MAX_MIP_LEVELS: u32 = 16;

/// Settings for a [`Canvas`](crate::Canvas).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Fill color for uncovered areas, also baked under transparent pixels.
    pub background: Rgb,
    /// Number of minified pyramid levels. The minimum zoom is `-mip_levels`.
    pub mip_levels: u32,
    /// Maximum zoom exponent.
    pub max_zoom: i32,
    /// Wheel delta that makes up one zoom step.
    pub wheel_notch: i32,
    /// Pixel kernel implementation.
    pub kernel: KernelPath,
    /// Status text color while no image path is set.
    pub message_color: Rgb,
    /// Status text color after a failed load.
    pub error_color: Rgb,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            background: Rgb::DARK_GRAY,
            mip_levels: DEFAULT_MIP_LEVELS,
            max_zoom: DEFAULT_MAX_ZOOM,
            wheel_notch: WHEEL_NOTCH,
            kernel: KernelPath::default(),
            message_color: Rgb::WHITE,
            error_color: Rgb::RED,
        }
    }
}

impl CanvasConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a configuration from TOML text.
    ///
    /// Missing fields take their default values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to TOML text.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Check that every field is within its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mip_levels > MAX_MIP_LEVELS {
            return Err(ConfigError::Invalid {
                field: "mip_levels",
                reason: format!("must be at most {MAX_MIP_LEVELS}, got {}", self.mip_levels),
            });
        }
        if !(0..=MAX_ZOOM_LIMIT).contains(&self.max_zoom) {
            return Err(ConfigError::Invalid {
                field: "max_zoom",
                reason: format!("must be in 0..={MAX_ZOOM_LIMIT}, got {}", self.max_zoom),
            });
        }
        if self.wheel_notch <= 0 {
            return Err(ConfigError::Invalid {
                field: "wheel_notch",
                reason: format!("must be positive, got {}", self.wheel_notch),
            });
        }
        Ok(())
    }

    /// The smallest reachable zoom exponent.
    #[inline]
    pub fn min_zoom(&self) -> i32 {
        -(self.mip_levels as i32)
    }

    /// Set the background color (builder pattern).
    pub fn with_background(mut self, color: Rgb) -> Self {
        self.background = color;
        self
    }

    /// Set the number of minified levels (builder pattern).
    pub fn with_mip_levels(mut self, levels: u32) -> Self {
        self.mip_levels = levels;
        self
    }

    /// Set the maximum zoom exponent (builder pattern).
    pub fn with_max_zoom(mut self, zoom: i32) -> Self {
        self.max_zoom = zoom;
        self
    }

    /// Set the wheel delta per zoom step (builder pattern).
    pub fn with_wheel_notch(mut self, notch: i32) -> Self {
        self.wheel_notch = notch;
        self
    }

    /// Set the pixel kernel (builder pattern).
    pub fn with_kernel(mut self, kernel: KernelPath) -> Self {
        self.kernel = kernel;
        self
    }

    /// Set the status text colors (builder pattern).
    pub fn with_status_colors(mut self, message: Rgb, error: Rgb) -> Self {
        self.message_color = message;
        self.error_color = error;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CanvasConfig::default();
        assert_eq!(config.background, Rgb::new(0x40, 0x40, 0x40));
        assert_eq!(config.mip_levels, 5);
        assert_eq!(config.min_zoom(), -5);
        assert_eq!(config.max_zoom, 5);
        assert_eq!(config.wheel_notch, 120);
        assert_eq!(config.kernel, KernelPath::Vectorized);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(CanvasConfig::from_toml_str("").unwrap(), CanvasConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = CanvasConfig::new()
            .with_background(Rgb::new(1, 2, 3))
            .with_kernel(KernelPath::Scalar)
            .with_status_colors(Rgb::BLACK, Rgb::WHITE);
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("background = \"#010203\""));
        assert!(text.contains("kernel = \"scalar\""));
        assert_eq!(CanvasConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_color_rejected() {
        let err = CanvasConfig::from_toml_str("background = \"grey\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = CanvasConfig::from_toml_str("max_zoom = 40").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "max_zoom", .. }));

        let err = CanvasConfig::from_toml_str("wheel_notch = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "wheel_notch", .. }));

        let err = CanvasConfig::new().with_mip_levels(99).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "mip_levels", .. }));
    }
}
