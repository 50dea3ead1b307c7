//! Asynchronous mesh loading.
//!
//! Transport is behind [`AssetFetcher`] (browser `fetch`, the file system, or
//! memory); parsing and normalization are shared. One attempt, no retry.

use crate::error::LoadError;
use crate::mesh::{HeartMesh, MeshTransform};
use glam::Vec3;
use std::collections::HashMap;
use std::io::BufReader;

/// Retrieves raw asset bytes, reporting transfer progress in `[0, 1]`.
///
/// Progress is best effort and only used for logging/UI.
#[allow(async_fn_in_trait)]
pub trait AssetFetcher {
    async fn fetch(&self, path: &str, progress: &mut dyn FnMut(f32)) -> Result<Vec<u8>, LoadError>;
}

/// In-memory assets keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    assets: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.assets.insert(path.into(), bytes.into());
        self
    }
}

impl AssetFetcher for MemoryFetcher {
    async fn fetch(&self, path: &str, progress: &mut dyn FnMut(f32)) -> Result<Vec<u8>, LoadError> {
        let bytes = self.assets.get(path).cloned().ok_or_else(|| LoadError::Http {
            path: path.to_string(),
            status: 404,
        })?;
        progress(1.0);
        Ok(bytes)
    }
}

/// Fetches, parses and normalizes the heart mesh.
pub async fn load_mesh<F: AssetFetcher>(
    fetcher: &F,
    path: &str,
    transform: &MeshTransform,
) -> Result<HeartMesh, LoadError> {
    log::info!("[loader] fetching {}", path);
    let mut last_logged = -1i32;
    let mut report = |fraction: f32| {
        let pct = (fraction.clamp(0.0, 1.0) * 100.0).round() as i32;
        // log in 10% steps to keep the console readable
        if pct / 10 != last_logged / 10 {
            log::info!("[loader] progress: {}%", pct);
            last_logged = pct;
        }
    };
    let bytes = fetcher.fetch(path, &mut report).await?;
    let mesh = parse_obj(&bytes, transform)?;
    log::info!(
        "[loader] loaded {} vertices / {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Parses Wavefront OBJ bytes; only the first object is used.
pub fn parse_obj(bytes: &[u8], transform: &MeshTransform) -> Result<HeartMesh, LoadError> {
    let mut reader = BufReader::new(bytes);
    let options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    };
    // materials are irrelevant for an occluder + point cloud
    let (models, _materials) =
        tobj::load_obj_buf(&mut reader, &options, |_| Err(tobj::LoadError::OpenFileFailed))
            .map_err(|e| LoadError::Parse(e.to_string()))?;
    let model = models.into_iter().next().ok_or(LoadError::EmptyMesh)?;
    if has_no_faces(&model.mesh) {
        return Err(LoadError::EmptyMesh);
    }
    let positions = model
        .mesh
        .positions
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect::<Vec<_>>();
    HeartMesh::new(positions, model.mesh.indices, transform)
}

#[inline]
fn has_no_faces(mesh: &tobj::Mesh) -> bool {
    mesh.indices.len() < 3 || mesh.positions.len() < 9
}
