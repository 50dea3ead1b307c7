//! Seeded 4D simplex-class noise.
//!
//! All implementations are deterministic: same seed and inputs, same output.

use ::noise::{NoiseFn, OpenSimplex};

#[derive(Clone, Debug)]
pub struct NoiseField {
    simplex: OpenSimplex,
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        Self {
            simplex: OpenSimplex::new(seed),
        }
    }

    /// Continuous noise in `[-1, 1]`.
    #[inline]
    pub fn noise4(&self, x: f32, y: f32, z: f32, w: f32) -> f32 {
        let v = self.simplex.get([x as f64, y as f64, z as f64, w as f64]);
        (v as f32).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::NoiseField;

    #[test]
    fn same_seed_same_values() {
        let a = NoiseField::new(7);
        let b = NoiseField::new(7);
        for i in 0..64 {
            let p = i as f32 * 0.173;
            assert_eq!(a.noise4(p, -p, p * 0.5, 0.1), b.noise4(p, -p, p * 0.5, 0.1));
        }
    }

    #[test]
    fn values_stay_in_unit_range() {
        let n = NoiseField::new(3);
        for i in 0..2_000 {
            let p = i as f32 * 0.0371;
            let v = n.noise4(p * 500.0, p, -p * 3.0, 1.0);
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn nearby_inputs_give_nearby_outputs() {
        let n = NoiseField::new(11);
        let eps = 1e-3;
        for i in 0..200 {
            let p = i as f32 * 0.05;
            let a = n.noise4(p, p * 0.3, -p, 0.1);
            let b = n.noise4(p + eps, p * 0.3, -p, 0.1);
            assert!((a - b).abs() < 0.05, "jump of {} at {p}", (a - b).abs());
        }
    }
}
