//! Viewer configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides. Without `--config` the defaults are used as-is.

use std::path::{Path, PathBuf};

use anyhow::{ensure, Context};
use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::camera::{Camera, CameraState, ViewportSize, ZoomRange};
use crate::constants::*;
use crate::renderer::RenderStyle;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: WINDOW_DEFAULT_WIDTH,
            height: WINDOW_DEFAULT_HEIGHT,
            title: WINDOW_TITLE.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Map-space point shown at the window center on startup
    pub center_x: f64,
    pub center_y: f64,
    pub log_zoom: f64,
    pub log_zoom_min: f64,
    pub log_zoom_max: f64,
    pub wheel_sensitivity: f64,
    /// Pixel-equivalent delta of one scrolled line
    pub wheel_line_delta: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            center_x: MAP_CENTER_X,
            center_y: MAP_CENTER_Y,
            log_zoom: CAMERA_DEFAULT_LOG_ZOOM,
            log_zoom_min: CAMERA_MIN_LOG_ZOOM,
            log_zoom_max: CAMERA_MAX_LOG_ZOOM,
            wheel_sensitivity: CAMERA_WHEEL_SENSITIVITY,
            wheel_line_delta: CAMERA_WHEEL_LINE_DELTA,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StyleConfig {
    pub background: [f32; 4],
    pub edge_color: [f32; 4],
}

impl Default for StyleConfig {
    fn default() -> Self {
        let style = RenderStyle::default();
        Self {
            background: style.background,
            edge_color: style.edge_color,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Directory holding the `.dat` files; the command line takes precedence.
    /// Relative paths are resolved against the config file's directory.
    pub data_dir: Option<PathBuf>,
    pub window: WindowConfig,
    pub view: ViewConfig,
    pub style: StyleConfig,
}

impl ViewerConfig {
    /// Loads the config at `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let file = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let mut config =
            Self::from_toml(&file).with_context(|| format!("invalid config file {}", path.display()))?;
        if let (Some(data_dir), Some(base)) = (&config.data_dir, path.parent()) {
            config.data_dir = Some(base.join(data_dir));
        }
        Ok(config)
    }

    pub fn from_toml(source: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let view = &self.view;
        ensure!(
            view.log_zoom.is_finite() && view.log_zoom_min.is_finite() && view.log_zoom_max.is_finite(),
            "view.log_zoom, view.log_zoom_min and view.log_zoom_max must be finite"
        );
        ensure!(
            view.log_zoom_min < view.log_zoom_max,
            "view.log_zoom_min ({}) must be below view.log_zoom_max ({})",
            view.log_zoom_min,
            view.log_zoom_max
        );
        ensure!(
            view.center_x.is_finite() && view.center_y.is_finite(),
            "view center must be finite"
        );
        ensure!(
            view.wheel_sensitivity.is_finite() && view.wheel_sensitivity > 0.0,
            "view.wheel_sensitivity must be positive"
        );
        ensure!(
            view.wheel_line_delta.is_finite() && view.wheel_line_delta > 0.0,
            "view.wheel_line_delta must be positive"
        );
        ensure!(
            self.window.width > 0 && self.window.height > 0,
            "window size must be non-zero"
        );
        Ok(())
    }

    pub fn camera(&self, viewport: ViewportSize) -> Camera {
        let view = &self.view;
        Camera::new(
            CameraState::new(DVec2::new(view.center_x, view.center_y), view.log_zoom),
            ZoomRange {
                min: view.log_zoom_min,
                max: view.log_zoom_max,
            },
            view.wheel_sensitivity,
            viewport,
        )
    }

    pub fn render_style(&self) -> RenderStyle {
        RenderStyle {
            background: self.style.background,
            edge_color: self.style.edge_color,
        }
    }
}
