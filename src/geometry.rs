//! Decoding and validation of the baked map geometry.
//!
//! All sources are little-endian arrays without headers. Decoding checks every
//! cross-reference up front (face and edge indices against the vertex count,
//! color indices against the color table) so the GPU never reads out of range.

use crate::constants::*;
use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("{name}: {len} bytes is not a whole number of {element_size}-byte elements")]
    Misaligned {
        name: &'static str,
        len: usize,
        element_size: usize,
    },
    #[error("{positions} vertex positions but {color_indices} vertex color indices")]
    VertexCountMismatch {
        positions: usize,
        color_indices: usize,
    },
    #[error("color table has {entries} entries, more than the {capacity} the shader can hold")]
    ColorTableOverflow { entries: usize, capacity: usize },
    #[error("vertex {vertex} uses color {index}, but the color table has {colors} entries")]
    ColorIndexOutOfRange {
        vertex: usize,
        index: u16,
        colors: usize,
    },
    #[error("{name}: element {position} references vertex {index}, but there are {vertices} vertices")]
    VertexIndexOutOfRange {
        name: &'static str,
        position: usize,
        index: u32,
        vertices: usize,
    },
}

/// Raw bytes of the five map sources, in load order.
#[derive(Debug, Clone, Default)]
pub struct RawSources {
    pub vertex_positions: Vec<u8>,
    pub vertex_color_indices: Vec<u8>,
    pub faces: Vec<u8>,
    pub edges: Vec<u8>,
    pub color_table: Vec<u8>,
}

/// Interleaved vertex record as laid out in the GPU vertex buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MapVertex {
    pub position: [f32; 2],
    pub color_index: u16,
    _padding: u16,
}

impl MapVertex {
    pub fn new(x: f32, y: f32, color_index: u16) -> Self {
        Self {
            position: [x, y],
            color_index,
            _padding: 0,
        }
    }
}

/// Axis-aligned extent of the vertex positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl MapBounds {
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }
}

/// Summary logged after loading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapStats {
    pub vertices: usize,
    pub triangles: usize,
    pub edges: usize,
    pub colors: usize,
    pub bounds: Option<MapBounds>,
}

/// Validated CPU-side copy of the map, ready for upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapGeometry {
    pub vertices: Vec<MapVertex>,
    /// Triangle list, three indices per face
    pub faces: Vec<u32>,
    /// Line list, two indices per edge
    pub edges: Vec<u32>,
    pub colors: Vec<[f32; 4]>,
}

impl MapGeometry {
    pub fn decode(raw: &RawSources) -> Result<Self, GeometryError> {
        let positions = decode_f32(VERTEX_POSITION_FILE, &raw.vertex_positions, 2)?;
        let color_indices = decode_u16(VERTEX_COLOR_INDEX_FILE, &raw.vertex_color_indices)?;
        let faces = decode_u32(FACE_FILE, &raw.faces, 3)?;
        let edges = decode_u32(EDGE_FILE, &raw.edges, 2)?;
        let color_components = decode_f32(COLOR_TABLE_FILE, &raw.color_table, 4)?;

        let vertex_count = positions.len() / 2;
        if vertex_count != color_indices.len() {
            return Err(GeometryError::VertexCountMismatch {
                positions: vertex_count,
                color_indices: color_indices.len(),
            });
        }

        let colors: Vec<[f32; 4]> = color_components
            .chunks_exact(4)
            .map(|c| [c[0], c[1], c[2], c[3]])
            .collect();
        if colors.len() > COLOR_TABLE_CAPACITY {
            return Err(GeometryError::ColorTableOverflow {
                entries: colors.len(),
                capacity: COLOR_TABLE_CAPACITY,
            });
        }

        if let Some((vertex, &index)) = color_indices
            .iter()
            .enumerate()
            .find(|&(_, &index)| index as usize >= colors.len())
        {
            return Err(GeometryError::ColorIndexOutOfRange {
                vertex,
                index,
                colors: colors.len(),
            });
        }

        check_vertex_indices(FACE_FILE, &faces, vertex_count)?;
        check_vertex_indices(EDGE_FILE, &edges, vertex_count)?;

        let vertices = positions
            .chunks_exact(2)
            .zip(color_indices)
            .map(|(p, color_index)| MapVertex::new(p[0], p[1], color_index))
            .collect();

        Ok(Self {
            vertices,
            faces,
            edges,
            colors,
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.len() / 3
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    /// Color table padded with transparent black to the full block size the
    /// shader declares.
    pub fn padded_color_table(&self) -> Vec<[f32; 4]> {
        let mut table = vec![[0.0; 4]; COLOR_TABLE_CAPACITY];
        table[..self.colors.len()].copy_from_slice(&self.colors);
        table
    }

    pub fn bounds(&self) -> Option<MapBounds> {
        let mut vertices = self.vertices.iter().map(|v| Vec2::from(v.position));
        let first = vertices.next()?;
        let (min, max) = vertices.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(MapBounds { min, max })
    }

    pub fn stats(&self) -> MapStats {
        MapStats {
            vertices: self.vertices.len(),
            triangles: self.triangle_count(),
            edges: self.edge_count(),
            colors: self.colors.len(),
            bounds: self.bounds(),
        }
    }
}

fn check_alignment(name: &'static str, len: usize, element_size: usize) -> Result<(), GeometryError> {
    if len % element_size != 0 {
        return Err(GeometryError::Misaligned {
            name,
            len,
            element_size,
        });
    }
    Ok(())
}

/// Decodes `f32`s, requiring whole groups of `group` values.
fn decode_f32(name: &'static str, bytes: &[u8], group: usize) -> Result<Vec<f32>, GeometryError> {
    check_alignment(name, bytes.len(), 4 * group)?;
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

fn decode_u16(name: &'static str, bytes: &[u8]) -> Result<Vec<u16>, GeometryError> {
    check_alignment(name, bytes.len(), 2)?;
    Ok(bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect())
}

/// Decodes `u32`s, requiring whole groups of `group` values.
fn decode_u32(name: &'static str, bytes: &[u8], group: usize) -> Result<Vec<u32>, GeometryError> {
    check_alignment(name, bytes.len(), 4 * group)?;
    Ok(bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

fn check_vertex_indices(name: &'static str, indices: &[u32], vertices: usize) -> Result<(), GeometryError> {
    match indices
        .iter()
        .enumerate()
        .find(|&(_, &index)| index as usize >= vertices)
    {
        Some((position, &index)) => Err(GeometryError::VertexIndexOutOfRange {
            name,
            position,
            index,
            vertices,
        }),
        None => Ok(()),
    }
}
