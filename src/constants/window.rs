//! Window constants.

pub const WINDOW_DEFAULT_WIDTH: u32 = 1280;
pub const WINDOW_DEFAULT_HEIGHT: u32 = 800;
pub const WINDOW_TITLE: &str = "Postal Map";
