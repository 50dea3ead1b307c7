//! Heart mesh with an immutable original snapshot and a per-frame working copy.

use crate::constants::*;
use crate::error::LoadError;
use crate::noise::NoiseField;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Normalization applied once to the loaded geometry, in the order
/// rotate-about-X, uniform scale, translate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MeshTransform {
    pub rotate_x: f32,
    pub scale: f32,
    pub translate: [f32; 3],
}

impl Default for MeshTransform {
    fn default() -> Self {
        Self {
            rotate_x: MESH_ROTATE_X,
            scale: MESH_SCALE,
            translate: MESH_TRANSLATE,
        }
    }
}

impl MeshTransform {
    pub const IDENTITY: Self = Self {
        rotate_x: 0.0,
        scale: 1.0,
        translate: [0.0, 0.0, 0.0],
    };

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::from(self.translate))
            * Mat4::from_scale(Vec3::splat(self.scale))
            * Mat4::from_rotation_x(self.rotate_x)
    }
}

#[derive(Debug, Clone)]
pub struct HeartMesh {
    original: Vec<Vec3>,
    working: Vec<Vec3>,
    indices: Vec<u32>,
}

impl HeartMesh {
    /// Validates the triangle list, applies `transform` and snapshots the result.
    pub fn new(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        transform: &MeshTransform,
    ) -> Result<Self, LoadError> {
        if indices.len() < 3 || positions.is_empty() {
            return Err(LoadError::EmptyMesh);
        }
        if indices.len() % 3 != 0 {
            return Err(LoadError::Parse(format!(
                "index count {} is not a multiple of 3",
                indices.len()
            )));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(LoadError::IndexOutOfRange {
                index,
                vertex_count: positions.len(),
            });
        }
        let m = transform.matrix();
        let original: Vec<Vec3> = positions.into_iter().map(|p| m.transform_point3(p)).collect();
        let working = original.clone();
        Ok(Self {
            original,
            working,
            indices,
        })
    }

    pub fn original(&self) -> &[Vec3] {
        &self.original
    }

    pub fn working(&self) -> &[Vec3] {
        &self.working
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.original.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangle `i` from the undeformed snapshot.
    #[inline]
    pub fn triangle(&self, i: usize) -> [Vec3; 3] {
        let t = &self.indices[i * 3..i * 3 + 3];
        [
            self.original[t[0] as usize],
            self.original[t[1] as usize],
            self.original[t[2] as usize],
        ]
    }

    /// Recomputes every working vertex from the original snapshot.
    ///
    /// `working[i] = v * (noise4(1.5v, frame_time) + 1) * 0.15 * beat`; at
    /// `beat == 0` the whole mesh collapses onto the origin.
    pub fn deform(&mut self, noise: &NoiseField, beat: f32, frame_time: f32) {
        for (w, &v) in self.working.iter_mut().zip(&self.original) {
            let p = v * DEFORM_NOISE_FREQ;
            let n = noise.noise4(p.x, p.y, p.z, frame_time) + 1.0;
            *w = v * (n * DEFORM_GAIN * beat);
        }
    }
}
