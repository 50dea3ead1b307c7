//! Area-weighted uniform sampling over a triangle mesh surface.

use crate::error::LoadError;
use crate::mesh::HeartMesh;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::Rng;

pub struct SurfaceSampler {
    triangles: Vec<[Vec3; 3]>,
    // running sum of triangle areas; last entry is the total
    cumulative: Vec<f32>,
    rng: StdRng,
}

impl SurfaceSampler {
    pub fn build(mesh: &HeartMesh, rng: StdRng) -> Result<Self, LoadError> {
        let n = mesh.triangle_count();
        if n == 0 {
            return Err(LoadError::EmptyMesh);
        }
        let mut triangles = Vec::with_capacity(n);
        let mut cumulative = Vec::with_capacity(n);
        let mut acc = 0.0f64;
        for i in 0..n {
            let [a, b, c] = mesh.triangle(i);
            acc += 0.5 * (b - a).cross(c - a).length() as f64;
            triangles.push([a, b, c]);
            cumulative.push(acc as f32);
        }
        if !(acc > 0.0 && acc.is_finite()) {
            return Err(LoadError::DegenerateMesh);
        }
        log::debug!("[sampler] {} triangles, surface area {:.5}", n, acc);
        Ok(Self {
            triangles,
            cumulative,
            rng,
        })
    }

    pub fn total_area(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// A point on the surface; every unit of area is equally likely.
    pub fn sample(&mut self) -> Vec3 {
        let r = self.rng.gen::<f32>() * self.total_area();
        // first triangle whose running total passes r; zero-area ones are skipped
        let idx = self
            .cumulative
            .partition_point(|&c| c <= r)
            .min(self.triangles.len() - 1);
        let [a, b, c] = self.triangles[idx];
        let mut u: f32 = self.rng.gen();
        let mut v: f32 = self.rng.gen();
        if u + v > 1.0 {
            u = 1.0 - u;
            v = 1.0 - v;
        }
        a + (b - a) * u + (c - a) * v
    }
}
