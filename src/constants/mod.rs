//! Viewer constants organized by domain.
//!
//! Centralizing magic numbers makes tuning easier and documents intent.

mod camera;
mod data;
mod render;
mod window;

pub use camera::*;
pub use data::*;
pub use render::*;
pub use window::*;
