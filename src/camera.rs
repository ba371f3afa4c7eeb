//! Camera state and the view transforms derived from it.
//!
//! The camera keeps a fixed map-space center, an accumulated pan offset and a
//! logarithmic zoom. From these and the viewport size it derives two
//! matrices: map space → view space (pixels, origin top-left, y down) and
//! view space → clip space.

use crate::constants::*;
use crate::matrix;
use glam::{DMat3, DVec2};
use thiserror::Error;

/// The view transform could not be inverted (zero-sized viewport or a
/// non-finite zoom), so view positions cannot be mapped back to the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("view transform is singular for a {width}x{height} viewport")]
pub struct DegenerateView {
    pub width: u32,
    pub height: u32,
}

/// Allowed range of the log zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl ZoomRange {
    pub fn clamp(&self, log_zoom: f64) -> f64 {
        log_zoom.clamp(self.min, self.max)
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self {
            min: CAMERA_MIN_LOG_ZOOM,
            max: CAMERA_MAX_LOG_ZOOM,
        }
    }
}

/// Mutable camera parameters. Only input handling changes these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub log_zoom: f64,
    pub center: DVec2,
    pub pan_offset: DVec2,
}

impl CameraState {
    pub fn new(center: DVec2, log_zoom: f64) -> Self {
        Self {
            log_zoom,
            center,
            pan_offset: DVec2::ZERO,
        }
    }

    /// Pixels per map unit. Always positive.
    pub fn zoom(&self) -> f64 {
        self.log_zoom.exp()
    }

    /// Map-space point currently shown at the viewport center.
    pub fn focus(&self) -> DVec2 {
        self.center + self.pan_offset
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(
            DVec2::new(MAP_CENTER_X, MAP_CENTER_Y),
            CAMERA_DEFAULT_LOG_ZOOM,
        )
    }
}

/// Size of the drawing surface in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Transforms consumed by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewMatrices {
    pub map_to_view: DMat3,
    pub view_to_clip: DMat3,
}

impl ViewMatrices {
    pub fn build(state: &CameraState, viewport: ViewportSize) -> Self {
        let width = viewport.width as f64;
        let height = viewport.height as f64;
        let zoom = state.zoom();
        let focus = state.focus();

        let map_to_view = matrix::multiply(
            &matrix::translate(
                width / 2.0 - zoom * focus.x,
                height / 2.0 + zoom * focus.y,
            ),
            &matrix::scale(zoom, -zoom),
        );
        let view_to_clip = matrix::multiply(
            &matrix::translate(-1.0, 1.0),
            &matrix::scale(2.0 / width, -2.0 / height),
        );

        Self {
            map_to_view,
            view_to_clip,
        }
    }
}

pub struct Camera {
    pub state: CameraState,
    pub viewport: ViewportSize,
    zoom_range: ZoomRange,
    wheel_sensitivity: f64,
    initial: CameraState,
    matrices: ViewMatrices,
}

impl Camera {
    pub fn new(
        initial: CameraState,
        zoom_range: ZoomRange,
        wheel_sensitivity: f64,
        viewport: ViewportSize,
    ) -> Self {
        let initial = CameraState {
            log_zoom: zoom_range.clamp(initial.log_zoom),
            ..initial
        };
        Self {
            state: initial,
            viewport,
            zoom_range,
            wheel_sensitivity,
            initial,
            matrices: ViewMatrices::build(&initial, viewport),
        }
    }

    pub fn matrices(&self) -> &ViewMatrices {
        &self.matrices
    }

    /// Recomputes the view matrices from the current state and viewport.
    pub fn rebuild_view(&mut self) {
        self.matrices = ViewMatrices::build(&self.state, self.viewport);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = ViewportSize::new(width, height);
        self.rebuild_view();
    }

    /// Returns to the startup zoom and pan.
    pub fn reset(&mut self) {
        self.state = self.initial;
        self.rebuild_view();
    }

    /// Applies a wheel delta (positive = zoom out) and rebuilds the view.
    /// Returns whether the zoom actually changed.
    pub fn zoom_by_wheel(&mut self, delta_y: f64) -> bool {
        let before = self.state.log_zoom;
        self.state.log_zoom = self
            .zoom_range
            .clamp(before - self.wheel_sensitivity * delta_y);
        self.rebuild_view();
        self.state.log_zoom != before
    }

    /// Maps a view-space pixel back to map space.
    ///
    /// Fails for an empty viewport, where pixels carry no map position.
    pub fn view_to_map(&self, view: DVec2) -> Result<DVec2, DegenerateView> {
        let degenerate = DegenerateView {
            width: self.viewport.width,
            height: self.viewport.height,
        };
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(degenerate);
        }
        let inverse = matrix::invert(&self.matrices.map_to_view).ok_or(degenerate)?;
        Ok(matrix::transform_point(&inverse, view))
    }

    pub fn map_to_view(&self, map: DVec2) -> DVec2 {
        matrix::transform_point(&self.matrices.map_to_view, map)
    }

    /// Shifts the pan offset so that `anchor` (map space) ends up under the
    /// view-space pixel `view`, then rebuilds the view.
    pub fn pin(&mut self, anchor: DVec2, view: DVec2) -> Result<(), DegenerateView> {
        let current = self.view_to_map(view)?;
        self.state.pan_offset += anchor - current;
        self.rebuild_view();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(width: u32, height: u32) -> Camera {
        Camera::new(
            CameraState::new(DVec2::new(408328.09, 7202747.0), -7.5),
            ZoomRange::default(),
            CAMERA_WHEEL_SENSITIVITY,
            ViewportSize::new(width, height),
        )
    }

    #[test]
    fn test_map_to_view_translation_terms() {
        let cam = camera(800, 600);
        let zoom = (-7.5f64).exp();
        let m = cam.matrices().map_to_view;

        assert_eq!(m.x_axis.x, zoom);
        assert_eq!(m.y_axis.y, -zoom);
        assert_eq!(m.z_axis.x, 400.0 - zoom * 408328.09);
        assert_eq!(m.z_axis.y, 300.0 + zoom * 7202747.0);
        assert_eq!(m.z_axis.z, 1.0);
        assert!((zoom - 0.000553).abs() < 1e-6);
    }

    #[test]
    fn test_center_lands_in_viewport_middle() {
        let cam = camera(800, 600);
        let v = cam.map_to_view(DVec2::new(408328.09, 7202747.0));
        assert!((v - DVec2::new(400.0, 300.0)).length() < 1e-6);
    }

    #[test]
    fn test_view_to_clip_corners() {
        let cam = camera(800, 600);
        let m = cam.matrices().view_to_clip;
        let top_left = matrix::transform_point(&m, DVec2::new(0.0, 0.0));
        let bottom_right = matrix::transform_point(&m, DVec2::new(800.0, 600.0));
        assert!((top_left - DVec2::new(-1.0, 1.0)).length() < 1e-12);
        assert!((bottom_right - DVec2::new(1.0, -1.0)).length() < 1e-12);
    }

    #[test]
    fn test_north_is_up() {
        let cam = camera(800, 600);
        let south = cam.map_to_view(DVec2::new(408328.09, 7202000.0));
        let north = cam.map_to_view(DVec2::new(408328.09, 7203000.0));
        assert!(north.y < south.y);
    }

    #[test]
    fn test_resize_is_idempotent() {
        let mut cam = camera(800, 600);
        cam.resize(1024, 768);
        let first = *cam.matrices();
        cam.resize(1024, 768);
        assert_eq!(first, *cam.matrices());
    }

    #[test]
    fn test_wheel_clamps_at_floor() {
        let mut cam = camera(800, 600);
        let changed = cam.zoom_by_wheel(100.0);
        assert!(!changed);
        assert_eq!(cam.state.log_zoom, -7.5);
    }

    #[test]
    fn test_wheel_zoom_stays_in_range() {
        let mut cam = camera(800, 600);
        for delta in [-1e9, 3.5, -250.0, 1e12, 0.0, -0.01, f64::MAX] {
            cam.zoom_by_wheel(delta);
            let z = cam.state.log_zoom;
            assert!((-7.5..=-2.0).contains(&z), "log zoom {} escaped range", z);
        }
    }

    #[test]
    fn test_wheel_up_zooms_in() {
        let mut cam = camera(800, 600);
        assert!(cam.zoom_by_wheel(-100.0));
        assert!((cam.state.log_zoom - (-7.3)).abs() < 1e-12);
    }

    #[test]
    fn test_initial_zoom_is_clamped() {
        let cam = Camera::new(
            CameraState::new(DVec2::ZERO, 5.0),
            ZoomRange::default(),
            CAMERA_WHEEL_SENSITIVITY,
            ViewportSize::new(100, 100),
        );
        assert_eq!(cam.state.log_zoom, -2.0);
    }

    #[test]
    fn test_view_to_map_inverts_map_to_view() {
        let mut cam = camera(800, 600);
        cam.zoom_by_wheel(-1500.0);
        let p = DVec2::new(410000.0, 7201000.0);
        let back = cam.view_to_map(cam.map_to_view(p)).unwrap();
        assert!((back - p).length() < 1e-6);
    }

    #[test]
    fn test_pin_keeps_anchor_under_pixel() {
        let mut cam = camera(800, 600);
        let anchor = DVec2::new(500000.0, 7000000.0);
        let pixel = DVec2::new(123.0, 456.0);
        cam.pin(anchor, pixel).unwrap();
        assert!((cam.map_to_view(anchor) - pixel).length() < 1e-6);
    }

    #[test]
    fn test_zero_viewport_is_degenerate() {
        let mut cam = camera(800, 600);
        cam.resize(0, 0);
        let before = cam.state;
        assert_eq!(
            cam.pin(DVec2::ZERO, DVec2::ZERO),
            Err(DegenerateView { width: 0, height: 0 })
        );
        assert_eq!(cam.state, before);
    }

    #[test]
    fn test_reset_restores_initial_view() {
        let mut cam = camera(800, 600);
        let initial = *cam.matrices();
        cam.zoom_by_wheel(-700.0);
        cam.state.pan_offset = DVec2::new(1000.0, -2000.0);
        cam.rebuild_view();
        cam.reset();
        assert_eq!(*cam.matrices(), initial);
    }
}
