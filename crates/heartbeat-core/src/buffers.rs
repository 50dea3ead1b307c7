//! Depth culling and the per-frame render buffers.

use crate::config::Palette;
use crate::constants::{CULL_MAX_Z, CULL_RATE_Z};
use crate::error::RenderError;
use crate::particles::Particle;
use serde::{Deserialize, Serialize};

/// Which derived position of a particle is being tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Near,
    Far,
}

impl Branch {
    /// Multiplier on the particle jitter; the far branch gets twice the slack.
    #[inline]
    pub fn jitter_scale(self) -> f32 {
        match self {
            Branch::Near => 1.0,
            Branch::Far => 2.0,
        }
    }
}

/// Symmetric slab along the view axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CullWindow {
    pub max_z: f32,
    pub rate_z: f32,
}

impl Default for CullWindow {
    fn default() -> Self {
        Self {
            max_z: CULL_MAX_Z,
            rate_z: CULL_RATE_Z,
        }
    }
}

impl CullWindow {
    #[inline]
    pub fn half_width(&self, jitter: f32, branch: Branch) -> f32 {
        self.max_z * self.rate_z + branch.jitter_scale() * jitter
    }

    /// Strict on both sides: `-W < z < W`.
    #[inline]
    pub fn contains(&self, z: f32, jitter: f32, branch: Branch) -> bool {
        let w = self.half_width(jitter, branch);
        -w < z && z < w
    }
}

/// Flattened xyz / rgb triples for the points that survived culling.
#[derive(Debug, Clone, Default)]
pub struct RenderBuffers {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
}

impl RenderBuffers {
    pub fn with_capacity(points: usize) -> Self {
        Self {
            positions: Vec::with_capacity(points * 3),
            colors: Vec::with_capacity(points * 3),
        }
    }

    /// Replaces the previous frame's contents; allocations are reused.
    pub fn rebuild(&mut self, particles: &[Particle], palette: &Palette, window: &CullWindow) {
        self.positions.clear();
        self.colors.clear();
        for p in particles {
            let color = palette.color(p.color_index);
            if window.contains(p.near.z, p.jitter, Branch::Near) {
                self.positions.extend_from_slice(&p.near.to_array());
                self.colors.extend_from_slice(&color);
            }
            if window.contains(p.far.z, p.jitter, Branch::Far) {
                self.positions.extend_from_slice(&p.far.to_array());
                self.colors.extend_from_slice(&color);
            }
        }
    }

    pub fn point_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Bounds check before anything is handed to the GPU.
    pub fn validate(&self, capacity: usize) -> Result<(), RenderError> {
        if self.positions.len() != self.colors.len() || self.positions.len() % 3 != 0 {
            return Err(RenderError::BufferMismatch {
                positions: self.positions.len(),
                colors: self.colors.len(),
            });
        }
        let points = self.point_count();
        if points > capacity {
            return Err(RenderError::CapacityExceeded { points, capacity });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_edges_are_exclusive() {
        let w = CullWindow::default();
        let edge = 0.23 * 0.5;
        assert!(!w.contains(edge, 0.0, Branch::Near));
        assert!(!w.contains(-edge, 0.0, Branch::Near));
        assert!(w.contains(edge - 1e-4, 0.0, Branch::Near));
    }

    #[test]
    fn far_branch_gets_double_jitter() {
        let w = CullWindow::default();
        let jitter = 0.02;
        let z = 0.115 + 0.03;
        assert!(!w.contains(z, jitter, Branch::Near));
        assert!(w.contains(z, jitter, Branch::Far));
    }

    #[test]
    fn validate_catches_mismatch_and_overflow() {
        let mut b = RenderBuffers::default();
        b.positions = vec![0.0; 6];
        b.colors = vec![0.0; 3];
        assert!(matches!(b.validate(10), Err(RenderError::BufferMismatch { .. })));
        b.colors = vec![0.0; 6];
        assert_eq!(
            b.validate(1),
            Err(RenderError::CapacityExceeded {
                points: 2,
                capacity: 1
            })
        );
        assert!(b.validate(2).is_ok());
    }
}
