//! Camera-related constants.

/// Initial zoom level (natural log of pixels per map unit)
pub const CAMERA_DEFAULT_LOG_ZOOM: f64 = -7.5;
/// Lowest zoom level, the whole dataset fits in a typical window
pub const CAMERA_MIN_LOG_ZOOM: f64 = -7.5;
/// Highest zoom level
pub const CAMERA_MAX_LOG_ZOOM: f64 = -2.0;
/// Change in log zoom per unit of wheel delta
pub const CAMERA_WHEEL_SENSITIVITY: f64 = 0.002;
/// Wheel delta reported for one scrolled line, in pixel-equivalent units
pub const CAMERA_WHEEL_LINE_DELTA: f64 = 100.0;

/// Map-space bounding box of the bundled dataset
pub const MAP_BOUNDS_MIN_X: f64 = 83748.4296875;
pub const MAP_BOUNDS_MAX_X: f64 = 732907.75;
pub const MAP_BOUNDS_MIN_Y: f64 = 6629044.0;
pub const MAP_BOUNDS_MAX_Y: f64 = 7776450.0;

/// Map-space point kept at the viewport center before any panning
pub const MAP_CENTER_X: f64 = (MAP_BOUNDS_MIN_X + MAP_BOUNDS_MAX_X) / 2.0;
pub const MAP_CENTER_Y: f64 = (MAP_BOUNDS_MIN_Y + MAP_BOUNDS_MAX_Y) / 2.0;
