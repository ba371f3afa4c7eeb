//! Pointer and wheel handling.
//!
//! Window events are translated into [`InputEvent`]s and folded into the
//! camera by [`handle_event`]. Panning and zooming both keep an anchor point
//! (the map position under the cursor) pinned to the cursor.

use crate::camera::Camera;
use glam::DVec2;

/// Pointer tracking state carried between events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    /// Cursor position in view space (physical pixels), if inside the window
    pub view_position: Option<DVec2>,
    /// Map position under the cursor; while dragging, the grabbed point
    pub map_position: Option<DVec2>,
    /// Whether a primary-button drag is in progress
    pub drag_anchored: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Input relevant to the map view, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMoved { x: f64, y: f64 },
    PointerLeft,
    PrimaryPressed,
    PrimaryReleased,
    /// Positive `delta_y` scrolls down, which zooms out
    Wheel { delta_y: f64 },
    Resized { width: u32, height: u32 },
    ResetView,
}

/// Cursor shape the host should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorAffordance {
    Default,
    Grabbing,
}

/// Result of processing one event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputResult {
    pub redraw: bool,
    pub cursor: Option<CursorAffordance>,
}

impl InputResult {
    fn redraw() -> Self {
        Self {
            redraw: true,
            cursor: None,
        }
    }
}

/// Folds one event into the camera and pointer state.
pub fn handle_event(input: &mut InputState, camera: &mut Camera, event: InputEvent) -> InputResult {
    match event {
        InputEvent::PointerMoved { x, y } => {
            let view = DVec2::new(x, y);
            input.view_position = Some(view);
            match (input.drag_anchored, input.map_position) {
                (true, Some(anchor)) => {
                    if let Err(err) = camera.pin(anchor, view) {
                        tracing::warn!("skipping pan correction: {}", err);
                    }
                }
                _ => {
                    input.map_position = camera.view_to_map(view).ok();
                }
            }
            InputResult::redraw()
        }
        InputEvent::PointerLeft => {
            input.view_position = None;
            if !input.drag_anchored {
                input.map_position = None;
            }
            // Nothing on screen depends on the hover state.
            InputResult::default()
        }
        InputEvent::PrimaryPressed => {
            input.drag_anchored = true;
            InputResult {
                redraw: true,
                cursor: Some(CursorAffordance::Grabbing),
            }
        }
        InputEvent::PrimaryReleased => {
            input.drag_anchored = false;
            InputResult {
                redraw: true,
                cursor: Some(CursorAffordance::Default),
            }
        }
        InputEvent::Wheel { delta_y } => {
            camera.zoom_by_wheel(delta_y);
            if let (Some(anchor), Some(view)) = (input.map_position, input.view_position) {
                if let Err(err) = camera.pin(anchor, view) {
                    tracing::warn!("skipping zoom anchor correction: {}", err);
                }
            }
            InputResult::redraw()
        }
        InputEvent::Resized { width, height } => {
            camera.resize(width, height);
            // The same pixel now shows a different map point.
            if !input.drag_anchored {
                input.map_position = input
                    .view_position
                    .and_then(|view| camera.view_to_map(view).ok());
            }
            InputResult::redraw()
        }
        InputEvent::ResetView => {
            camera.reset();
            input.map_position = input
                .view_position
                .and_then(|view| camera.view_to_map(view).ok());
            InputResult::redraw()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{CameraState, ViewportSize, ZoomRange};
    use crate::constants::CAMERA_WHEEL_SENSITIVITY;

    const TOLERANCE: f64 = 1e-6;

    fn setup() -> (InputState, Camera) {
        let camera = Camera::new(
            CameraState::new(DVec2::new(408328.09, 7202747.0), -6.0),
            ZoomRange::default(),
            CAMERA_WHEEL_SENSITIVITY,
            ViewportSize::new(800, 600),
        );
        (InputState::new(), camera)
    }

    fn move_to(input: &mut InputState, camera: &mut Camera, x: f64, y: f64) {
        handle_event(input, camera, InputEvent::PointerMoved { x, y });
    }

    #[test]
    fn test_hover_tracks_map_position() {
        let (mut input, mut camera) = setup();
        move_to(&mut input, &mut camera, 400.0, 300.0);
        let hover = input.map_position.unwrap();
        assert!((hover - DVec2::new(408328.09, 7202747.0)).length() < TOLERANCE);
    }

    #[test]
    fn test_drag_keeps_grabbed_point_under_cursor() {
        let (mut input, mut camera) = setup();
        move_to(&mut input, &mut camera, 200.0, 150.0);
        let grabbed = input.map_position.unwrap();

        let result = handle_event(&mut input, &mut camera, InputEvent::PrimaryPressed);
        assert_eq!(result.cursor, Some(CursorAffordance::Grabbing));

        for (x, y) in [(210.0, 140.0), (650.0, 20.0), (-30.0, 900.0), (401.5, 299.25)] {
            move_to(&mut input, &mut camera, x, y);
            let under_cursor = camera.view_to_map(DVec2::new(x, y)).unwrap();
            assert!((under_cursor - grabbed).length() < TOLERANCE);
            assert_eq!(input.map_position, Some(grabbed));
        }
    }

    #[test]
    fn test_drag_changes_pan_offset() {
        let (mut input, mut camera) = setup();
        move_to(&mut input, &mut camera, 400.0, 300.0);
        handle_event(&mut input, &mut camera, InputEvent::PrimaryPressed);
        move_to(&mut input, &mut camera, 500.0, 300.0);

        // Dragging right moves the view left over the map.
        let zoom = camera.state.zoom();
        assert!((camera.state.pan_offset.x + 100.0 / zoom).abs() < TOLERANCE);
        assert!(camera.state.pan_offset.y.abs() < TOLERANCE);
    }

    #[test]
    fn test_release_stops_dragging() {
        let (mut input, mut camera) = setup();
        move_to(&mut input, &mut camera, 400.0, 300.0);
        handle_event(&mut input, &mut camera, InputEvent::PrimaryPressed);
        let result = handle_event(&mut input, &mut camera, InputEvent::PrimaryReleased);
        assert_eq!(result.cursor, Some(CursorAffordance::Default));

        let offset = camera.state.pan_offset;
        move_to(&mut input, &mut camera, 10.0, 10.0);
        assert_eq!(camera.state.pan_offset, offset);
    }

    #[test]
    fn test_wheel_keeps_hover_point_fixed() {
        let (mut input, mut camera) = setup();
        move_to(&mut input, &mut camera, 123.0, 456.0);
        let hover = input.map_position.unwrap();
        let before = camera.map_to_view(hover);

        for delta_y in [-120.0, -400.0, 53.0, 1000.0] {
            handle_event(&mut input, &mut camera, InputEvent::Wheel { delta_y });
            let after = camera.map_to_view(hover);
            assert!((after - before).length() < TOLERANCE);
        }
    }

    #[test]
    fn test_wheel_zoom_changes_scale() {
        let (mut input, mut camera) = setup();
        move_to(&mut input, &mut camera, 400.0, 300.0);
        handle_event(&mut input, &mut camera, InputEvent::Wheel { delta_y: -250.0 });
        assert!((camera.state.log_zoom - (-5.5)).abs() < 1e-12);
    }

    #[test]
    fn test_wheel_without_pointer_only_zooms() {
        let (mut input, mut camera) = setup();
        let result = handle_event(&mut input, &mut camera, InputEvent::Wheel { delta_y: -100.0 });
        assert!(result.redraw);
        assert_eq!(camera.state.pan_offset, DVec2::ZERO);
        assert!((camera.state.log_zoom - (-5.8)).abs() < 1e-12);
    }

    #[test]
    fn test_leave_clears_hover() {
        let (mut input, mut camera) = setup();
        move_to(&mut input, &mut camera, 100.0, 100.0);
        let result = handle_event(&mut input, &mut camera, InputEvent::PointerLeft);
        assert_eq!(result, InputResult::default());
        assert!(!result.redraw);
        assert_eq!(input.view_position, None);
        assert_eq!(input.map_position, None);
    }

    #[test]
    fn test_leave_during_drag_keeps_anchor() {
        let (mut input, mut camera) = setup();
        move_to(&mut input, &mut camera, 100.0, 100.0);
        let grabbed = input.map_position;
        handle_event(&mut input, &mut camera, InputEvent::PrimaryPressed);
        handle_event(&mut input, &mut camera, InputEvent::PointerLeft);
        assert_eq!(input.view_position, None);
        assert_eq!(input.map_position, grabbed);

        // Re-entering continues the same drag.
        move_to(&mut input, &mut camera, 300.0, 50.0);
        let under_cursor = camera.view_to_map(DVec2::new(300.0, 50.0)).unwrap();
        assert!((under_cursor - grabbed.unwrap()).length() < TOLERANCE);
    }

    #[test]
    fn test_degenerate_viewport_skips_correction() {
        let (mut input, mut camera) = setup();
        move_to(&mut input, &mut camera, 100.0, 100.0);
        handle_event(&mut input, &mut camera, InputEvent::PrimaryPressed);
        handle_event(&mut input, &mut camera, InputEvent::Resized { width: 0, height: 0 });

        let offset = camera.state.pan_offset;
        let result = handle_event(&mut input, &mut camera, InputEvent::PointerMoved { x: 5.0, y: 5.0 });
        assert!(result.redraw);
        assert_eq!(camera.state.pan_offset, offset);
    }

    #[test]
    fn test_every_event_requests_redraw() {
        let (mut input, mut camera) = setup();
        let events = [
            InputEvent::PointerMoved { x: 1.0, y: 2.0 },
            InputEvent::PrimaryPressed,
            InputEvent::PrimaryReleased,
            InputEvent::Wheel { delta_y: 10.0 },
            InputEvent::Resized { width: 640, height: 480 },
            InputEvent::ResetView,
        ];
        for event in events {
            assert!(handle_event(&mut input, &mut camera, event).redraw);
        }
    }

    #[test]
    fn test_reset_view_restores_zoom_and_pan() {
        let (mut input, mut camera) = setup();
        move_to(&mut input, &mut camera, 100.0, 100.0);
        handle_event(&mut input, &mut camera, InputEvent::Wheel { delta_y: -300.0 });
        handle_event(&mut input, &mut camera, InputEvent::ResetView);
        assert_eq!(camera.state.log_zoom, -6.0);
        assert_eq!(camera.state.pan_offset, DVec2::ZERO);
    }
}
