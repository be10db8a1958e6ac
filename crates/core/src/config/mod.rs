use std::{fs, path::Path};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::{
    render::{Bounds, Point, Rgba},
    Result, SunMatrixError,
};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub location: LocationConfig,
    pub display: DisplayConfig,
    pub provider: ProviderConfig,
    pub run: RunConfig,
}

impl AppConfig {
    /// Parses a JSON document; missing sections fall back to their defaults.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.display.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

/// Fixed coordinate the light events are fetched for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: 34.110856,
            longitude: -118.272459,
        }
    }
}

/// Geometry, colours and cadences used by the frame composer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Centre of the circle the sun marker travels on.
    pub center: Point,
    pub radius: f64,
    pub arc_bounds: Bounds,
    pub arc_width: u32,
    pub colors: Palette,
    pub layout: LabelLayout,
    pub refresh_interval_seconds: u64,
    /// Marker visibility flips `blink_rate_hz` times per second.
    pub blink_rate_hz: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            canvas_width: 64,
            canvas_height: 32,
            center: Point::new(16, 16),
            radius: 14.0,
            arc_bounds: Bounds::new(Point::new(1, 1), Point::new(30, 30)),
            arc_width: 2,
            colors: Palette::default(),
            layout: LabelLayout::default(),
            refresh_interval_seconds: 10,
            blink_rate_hz: 1.5,
        }
    }
}

impl DisplayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(SunMatrixError::InvalidInput(
                "canvas dimensions must be non-zero",
            ));
        }
        if !(self.radius > 0.0) {
            return Err(SunMatrixError::InvalidInput("radius must be positive"));
        }
        if !(self.blink_rate_hz > 0.0) {
            return Err(SunMatrixError::InvalidInput(
                "blink rate must be positive",
            ));
        }
        self.refresh_interval()?;
        Ok(())
    }

    /// The refresh interval as a duration; zero and values chrono cannot
    /// represent are rejected.
    pub fn refresh_interval(&self) -> Result<TimeDelta> {
        i64::try_from(self.refresh_interval_seconds)
            .ok()
            .filter(|seconds| *seconds > 0)
            .and_then(TimeDelta::try_seconds)
            .ok_or(SunMatrixError::InvalidInput(
                "refresh interval must be between 1 second and the largest representable duration",
            ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub day: Rgba,
    pub night: Rgba,
    pub twilight: Rgba,
    pub text: Rgba,
    pub sun: Rgba,
    pub sun_halo_alpha: u8,
    pub rainbow: [Rgba; 7],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            day: Rgba::hex(0x57b9fa),
            night: Rgba::hex(0x7a7a7a),
            twilight: Rgba::hex(0xf5a142),
            text: Rgba::WHITE,
            sun: Rgba::hex(0xffe921),
            sun_halo_alpha: 70,
            rainbow: [
                Rgba::hex(0xff0000),
                Rgba::hex(0xff7f00),
                Rgba::hex(0xffff00),
                Rgba::hex(0x00ff00),
                Rgba::hex(0x0000ff),
                Rgba::hex(0x4b0082),
                Rgba::hex(0x9400d3),
            ],
        }
    }
}

/// Where the labels and the decorative strip sit on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelLayout {
    pub center_time: Point,
    pub top_label: Point,
    pub top_time: Point,
    pub bottom_label: Point,
    pub bottom_time: Point,
    /// Upper dot of the first strip column; each column is two pixels tall.
    pub strip_origin: Point,
    pub strip_spacing: i32,
}

impl Default for LabelLayout {
    fn default() -> Self {
        Self {
            center_time: Point::new(6, 13),
            top_label: Point::new(33, 1),
            top_time: Point::new(33, 8),
            bottom_label: Point::new(33, 17),
            bottom_time: Point::new(33, 24),
            strip_origin: Point::new(33, 15),
            strip_spacing: 4,
        }
    }
}

/// Settings for the HTTP light-event provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.sunrisesunset.io/json".to_string(),
            timeout_seconds: 10,
        }
    }
}

/// Pacing of the outer run loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub tick_millis: u64,
    /// Zero disables the limit.
    pub max_runtime_seconds: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tick_millis: 5,
            max_runtime_seconds: 3600,
        }
    }
}
