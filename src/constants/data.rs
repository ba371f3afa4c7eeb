//! Names of the baked map assets inside the data directory.

pub const DEFAULT_DATA_DIR: &str = "data";

pub const VERTEX_POSITION_FILE: &str = "map_vertex_position.dat";
pub const VERTEX_COLOR_INDEX_FILE: &str = "map_vertex_color_index.dat";
pub const FACE_FILE: &str = "map_face.dat";
pub const EDGE_FILE: &str = "map_edge.dat";
pub const COLOR_TABLE_FILE: &str = "map_color_table.dat";
