//! OpenGL map renderer.
//!
//! Geometry is uploaded once into [`GeometryBuffers`]. Each frame draws the
//! filled faces with per-vertex colors fetched from the color table, then the
//! edges in a flat color on top of them.

use crate::camera::{ViewMatrices, ViewportSize};
use crate::constants::{
    BACKGROUND_COLOR, COLOR_TABLE_BINDING, COLOR_TABLE_CAPACITY, COLOR_TABLE_ENTRY_SIZE, EDGE_COLOR,
    VERTEX_COLOR_INDEX_OFFSET, VERTEX_POSITION_OFFSET, VERTEX_STRIDE,
};
use crate::geometry::MapGeometry;
use crate::matrix;
use glow::*;
use std::sync::Arc;
use thiserror::Error;

const VERTEX_SHADER_SRC: &str = r#"#version 330 core
layout (location = 0) in vec2 aPosition;
layout (location = 1) in uint aColorTableIndex;

uniform mat3 uMapToView;
uniform mat3 uViewToClip;
uniform bool uColorFetch;
uniform vec4 uEdgeColor;

layout (std140) uniform uColorTableBlock {
    vec4 uColorTable[3026];
};

out vec4 vColor;

void main() {
    if (uColorFetch) {
        vColor = uColorTable[aColorTableIndex];
    } else {
        vColor = uEdgeColor;
    }
    vec3 clip = uViewToClip * uMapToView * vec3(aPosition, 1.0);
    gl_Position = vec4(clip.xy, 0.0, 1.0);
}
"#;

const FRAGMENT_SHADER_SRC: &str = r#"#version 330 core
in vec4 vColor;
out vec4 FragColor;

void main() {
    FragColor = vColor;
}
"#;

const COLOR_TABLE_BLOCK: &str = "uColorTableBlock";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create {what}: {message}")]
    Create { what: &'static str, message: String },
    #[error("shader compilation failed: {0}")]
    Compile(String),
    #[error("shader program link failed: {0}")]
    Link(String),
    #[error("uniform `{0}` not found in shader program")]
    MissingUniform(&'static str),
    #[error("uniform blocks are limited to {available} bytes, the color table needs {required}")]
    UniformBlockTooSmall { available: i32, required: usize },
}

/// Visual settings fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub background: [f32; 4],
    pub edge_color: [f32; 4],
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background: BACKGROUND_COLOR,
            edge_color: EDGE_COLOR,
        }
    }
}

/// GPU-resident map data. Created once, never modified.
pub struct GeometryBuffers {
    vao: VertexArray,
    #[allow(dead_code)] // Referenced through the VAO
    vertex_buffer: Buffer,
    face_buffer: Buffer,
    face_index_count: i32,
    edge_buffer: Buffer,
    edge_index_count: i32,
    color_table_buffer: Buffer,
}

impl GeometryBuffers {
    pub fn upload(gl: &glow::Context, geometry: &MapGeometry) -> Result<Self, RenderError> {
        puffin::profile_function!();

        unsafe {
            let vao = gl
                .create_vertex_array()
                .map_err(|message| RenderError::Create { what: "VAO", message })?;
            gl.bind_vertex_array(Some(vao));

            let vertex_buffer = create_buffer(gl, "vertex buffer")?;
            gl.bind_buffer(ARRAY_BUFFER, Some(vertex_buffer));
            gl.buffer_data_u8_slice(
                ARRAY_BUFFER,
                bytemuck::cast_slice(&geometry.vertices),
                STATIC_DRAW,
            );

            // Position (2 floats)
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 2, FLOAT, false, VERTEX_STRIDE, VERTEX_POSITION_OFFSET);

            // Color table index (1 unsigned short, integer attribute)
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_i32(
                1,
                1,
                UNSIGNED_SHORT,
                VERTEX_STRIDE,
                VERTEX_COLOR_INDEX_OFFSET,
            );

            gl.bind_vertex_array(None);

            let face_buffer = upload_indices(gl, "face buffer", &geometry.faces)?;
            let edge_buffer = upload_indices(gl, "edge buffer", &geometry.edges)?;

            let color_table_buffer = create_buffer(gl, "color table buffer")?;
            gl.bind_buffer(UNIFORM_BUFFER, Some(color_table_buffer));
            gl.buffer_data_u8_slice(
                UNIFORM_BUFFER,
                bytemuck::cast_slice(&geometry.padded_color_table()),
                DYNAMIC_DRAW,
            );

            gl.bind_buffer(ARRAY_BUFFER, None);
            gl.bind_buffer(UNIFORM_BUFFER, None);

            Ok(Self {
                vao,
                vertex_buffer,
                face_buffer,
                face_index_count: geometry.faces.len() as i32,
                edge_buffer,
                edge_index_count: geometry.edges.len() as i32,
                color_table_buffer,
            })
        }
    }

    pub fn face_index_count(&self) -> i32 {
        self.face_index_count
    }

    pub fn edge_index_count(&self) -> i32 {
        self.edge_index_count
    }
}

pub struct Renderer {
    gl: Arc<glow::Context>,
    program: Program,
    map_to_view_loc: UniformLocation,
    view_to_clip_loc: UniformLocation,
    color_fetch_loc: UniformLocation,
    edge_color_loc: UniformLocation,
    style: RenderStyle,
}

impl Renderer {
    pub fn new(gl: Arc<glow::Context>, style: RenderStyle) -> Result<Self, RenderError> {
        unsafe {
            let required = COLOR_TABLE_CAPACITY * COLOR_TABLE_ENTRY_SIZE;
            let available = gl.get_parameter_i32(MAX_UNIFORM_BLOCK_SIZE);
            if (available as usize) < required {
                return Err(RenderError::UniformBlockTooSmall {
                    available,
                    required,
                });
            }

            let program = compile_program(&gl, VERTEX_SHADER_SRC, FRAGMENT_SHADER_SRC)?;

            let block = gl
                .get_uniform_block_index(program, COLOR_TABLE_BLOCK)
                .ok_or(RenderError::MissingUniform(COLOR_TABLE_BLOCK))?;
            gl.uniform_block_binding(program, block, COLOR_TABLE_BINDING);

            let uniform = |name: &'static str| {
                gl.get_uniform_location(program, name)
                    .ok_or(RenderError::MissingUniform(name))
            };
            let map_to_view_loc = uniform("uMapToView")?;
            let view_to_clip_loc = uniform("uViewToClip")?;
            let color_fetch_loc = uniform("uColorFetch")?;
            let edge_color_loc = uniform("uEdgeColor")?;

            Ok(Self {
                gl,
                program,
                map_to_view_loc,
                view_to_clip_loc,
                color_fetch_loc,
                edge_color_loc,
                style,
            })
        }
    }

    /// Draws one frame: faces first, then edges over them.
    pub fn render(&self, buffers: &GeometryBuffers, matrices: &ViewMatrices, viewport: ViewportSize) {
        puffin::profile_function!();

        let gl = &self.gl;
        let [r, g, b, a] = self.style.background;
        let [er, eg, eb, ea] = self.style.edge_color;

        unsafe {
            gl.viewport(0, 0, viewport.width as i32, viewport.height as i32);
            gl.clear_color(r, g, b, a);
            gl.clear(COLOR_BUFFER_BIT);

            gl.use_program(Some(self.program));
            gl.uniform_matrix_3_f32_slice(
                Some(&self.map_to_view_loc),
                false,
                &matrix::to_gl(&matrices.map_to_view),
            );
            gl.uniform_matrix_3_f32_slice(
                Some(&self.view_to_clip_loc),
                false,
                &matrix::to_gl(&matrices.view_to_clip),
            );
            gl.uniform_4_f32(Some(&self.edge_color_loc), er, eg, eb, ea);
            gl.bind_buffer_base(UNIFORM_BUFFER, COLOR_TABLE_BINDING, Some(buffers.color_table_buffer));

            gl.bind_vertex_array(Some(buffers.vao));

            {
                puffin::profile_scope!("draw_faces");
                gl.uniform_1_i32(Some(&self.color_fetch_loc), 1);
                gl.bind_buffer(ELEMENT_ARRAY_BUFFER, Some(buffers.face_buffer));
                if buffers.face_index_count > 0 {
                    gl.draw_elements(TRIANGLES, buffers.face_index_count, UNSIGNED_INT, 0);
                }
            }
            {
                puffin::profile_scope!("draw_edges");
                gl.uniform_1_i32(Some(&self.color_fetch_loc), 0);
                gl.bind_buffer(ELEMENT_ARRAY_BUFFER, Some(buffers.edge_buffer));
                if buffers.edge_index_count > 0 {
                    gl.draw_elements(LINES, buffers.edge_index_count, UNSIGNED_INT, 0);
                }
            }

            gl.bind_buffer(ELEMENT_ARRAY_BUFFER, None);
            gl.bind_vertex_array(None);
            gl.use_program(None);
            gl.flush();
        }
    }
}

unsafe fn create_buffer(gl: &glow::Context, what: &'static str) -> Result<Buffer, RenderError> {
    gl.create_buffer()
        .map_err(|message| RenderError::Create { what, message })
}

/// Element array bindings are VAO state and core profiles have no default
/// VAO, so index data goes through a target that is not tied to one.
const INDEX_UPLOAD_TARGET: u32 = COPY_WRITE_BUFFER;

unsafe fn upload_indices(gl: &glow::Context, what: &'static str, indices: &[u32]) -> Result<Buffer, RenderError> {
    let buffer = create_buffer(gl, what)?;
    gl.bind_buffer(INDEX_UPLOAD_TARGET, Some(buffer));
    gl.buffer_data_u8_slice(INDEX_UPLOAD_TARGET, bytemuck::cast_slice(indices), STATIC_DRAW);
    gl.bind_buffer(INDEX_UPLOAD_TARGET, None);
    Ok(buffer)
}

unsafe fn compile_shader(gl: &glow::Context, kind: u32, source: &str) -> Result<Shader, RenderError> {
    let shader = gl
        .create_shader(kind)
        .map_err(|message| RenderError::Create { what: "shader", message })?;
    gl.shader_source(shader, source);
    gl.compile_shader(shader);
    if !gl.get_shader_compile_status(shader) {
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        return Err(RenderError::Compile(log));
    }
    Ok(shader)
}

unsafe fn compile_program(
    gl: &glow::Context,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<Program, RenderError> {
    let vertex_shader = compile_shader(gl, VERTEX_SHADER, vertex_src)?;
    let fragment_shader = compile_shader(gl, FRAGMENT_SHADER, fragment_src)?;

    let program = gl
        .create_program()
        .map_err(|message| RenderError::Create { what: "program", message })?;
    gl.attach_shader(program, vertex_shader);
    gl.attach_shader(program, fragment_shader);
    gl.link_program(program);

    gl.delete_shader(vertex_shader);
    gl.delete_shader(fragment_shader);

    if !gl.get_program_link_status(program) {
        return Err(RenderError::Link(gl.get_program_info_log(program)));
    }
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_color_table_matches_capacity() {
        let declaration = format!("vec4 uColorTable[{}];", COLOR_TABLE_CAPACITY);
        assert!(VERTEX_SHADER_SRC.contains(&declaration));
        assert!(VERTEX_SHADER_SRC.contains(COLOR_TABLE_BLOCK));
    }

    #[test]
    fn test_index_upload_target_is_not_vao_state() {
        assert_eq!(INDEX_UPLOAD_TARGET, COPY_WRITE_BUFFER);
        assert_ne!(INDEX_UPLOAD_TARGET, ELEMENT_ARRAY_BUFFER);
    }

    #[test]
    fn test_default_style() {
        let style = RenderStyle::default();
        assert_eq!(style.background, [0.8, 0.9, 1.0, 1.0]);
        assert_eq!(style.edge_color, [0.0, 0.0, 0.0, 1.0]);
    }
}
