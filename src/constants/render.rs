//! Rendering constants shared by the loader and the renderer.

/// Number of RGBA entries the shader's color table block declares
pub const COLOR_TABLE_CAPACITY: usize = 3026;
/// Size in bytes of one color table entry (vec4 under std140)
pub const COLOR_TABLE_ENTRY_SIZE: usize = 16;
/// Uniform block binding point for the color table
pub const COLOR_TABLE_BINDING: u32 = 0;

/// Bytes per interleaved vertex record
pub const VERTEX_STRIDE: i32 = 12;
/// Offset of the position attribute inside a vertex record
pub const VERTEX_POSITION_OFFSET: i32 = 0;
/// Offset of the color index attribute inside a vertex record
pub const VERTEX_COLOR_INDEX_OFFSET: i32 = 8;

/// Clear color behind the map (light sky blue)
pub const BACKGROUND_COLOR: [f32; 4] = [0.8, 0.9, 1.0, 1.0];
/// Flat color used for area borders
pub const EDGE_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
