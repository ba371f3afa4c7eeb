//! Startup loading of the baked map assets.
//!
//! The five sources are read concurrently and joined: either every source
//! arrives and is decoded, or the first failure is returned and nothing is
//! uploaded.

use crate::constants::*;
use crate::geometry::{GeometryError, MapGeometry, RawSources};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to start the loader runtime")]
    Runtime(#[source] std::io::Error),
    #[error("invalid map data")]
    Geometry(#[from] GeometryError),
}

/// Locations of the five map sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSources {
    pub vertex_positions: PathBuf,
    pub vertex_color_indices: PathBuf,
    pub faces: PathBuf,
    pub edges: PathBuf,
    pub color_table: PathBuf,
}

impl MapSources {
    /// Standard file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            vertex_positions: dir.join(VERTEX_POSITION_FILE),
            vertex_color_indices: dir.join(VERTEX_COLOR_INDEX_FILE),
            faces: dir.join(FACE_FILE),
            edges: dir.join(EDGE_FILE),
            color_table: dir.join(COLOR_TABLE_FILE),
        }
    }
}

async fn fetch(path: &Path) -> Result<Vec<u8>, LoadError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| LoadError::Read {
        path: path.to_owned(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "fetched map source");
    Ok(bytes)
}

/// Issues all five reads at once and waits for every one of them.
pub async fn fetch_all(sources: &MapSources) -> Result<RawSources, LoadError> {
    let (vertex_positions, vertex_color_indices, faces, edges, color_table) = tokio::try_join!(
        fetch(&sources.vertex_positions),
        fetch(&sources.vertex_color_indices),
        fetch(&sources.faces),
        fetch(&sources.edges),
        fetch(&sources.color_table),
    )?;
    Ok(RawSources {
        vertex_positions,
        vertex_color_indices,
        faces,
        edges,
        color_table,
    })
}

/// Reads and validates the map. Blocks until all sources are in.
pub fn load_map(sources: &MapSources) -> Result<MapGeometry, LoadError> {
    puffin::profile_function!();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(LoadError::Runtime)?;
    let raw = runtime.block_on(fetch_all(sources))?;
    let geometry = MapGeometry::decode(&raw)?;

    let stats = geometry.stats();
    tracing::info!(
        vertices = stats.vertices,
        triangles = stats.triangles,
        edges = stats.edges,
        colors = stats.colors,
        "map loaded"
    );
    if let Some(bounds) = stats.bounds {
        tracing::debug!(
            min = ?bounds.min,
            max = ?bounds.max,
            center = ?bounds.center(),
            "map bounds"
        );
    }
    Ok(geometry)
}
