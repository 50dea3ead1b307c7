use crate::constants::*;
use crate::noise::NoiseField;
use crate::sampler::SurfaceSampler;
use glam::Vec3;
use rand::Rng;

/// One sampled surface point and the two positions derived from it each frame.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub base: Vec3,
    pub color_index: usize,
    pub jitter: f32,
    pub near: Vec3,
    pub far: Vec3,
    // noise samples depend on `base` alone, so they are taken once at spawn
    swell: f32,
    sparkle: f32,
}

impl Particle {
    pub fn spawn(base: Vec3, color_index: usize, jitter: f32, noise: &NoiseField) -> Self {
        let swell = noise.noise4(base.x, base.y, base.z, SWELL_NOISE_W) + SWELL_NOISE_OFFSET;
        let hf = base * SPARKLE_NOISE_FREQ;
        let sparkle = noise.noise4(hf.x, hf.y, hf.z, SPARKLE_NOISE_W) + SPARKLE_NOISE_OFFSET;
        Self {
            base,
            color_index,
            jitter,
            near: base,
            far: base,
            swell,
            sparkle,
        }
    }

    #[inline]
    pub fn update(&mut self, beat: f32) {
        self.near = self.base * (NEAR_BASE_SCALE + self.swell * NEAR_SWELL_GAIN * beat);
        self.far =
            self.base * (1.0 + self.sparkle * (beat + FAR_BEAT_BIAS) - beat * FAR_CONTRACTION);
    }
}

/// Fixed population created once; particles are never respawned.
#[derive(Debug, Clone, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn init<R: Rng>(
        count: usize,
        sampler: &mut SurfaceSampler,
        noise: &NoiseField,
        palette_len: usize,
        rng: &mut R,
    ) -> Self {
        let palette_len = palette_len.max(1);
        let particles = (0..count)
            .map(|_| {
                let base = sampler.sample();
                let color_index = rng.gen_range(0..palette_len);
                let jitter = rng.gen::<f32>() * MAX_JITTER;
                Particle::spawn(base, color_index, jitter, noise)
            })
            .collect::<Vec<_>>();
        log::info!("[particles] spawned {} particles", particles.len());
        Self { particles }
    }

    pub fn update(&mut self, beat: f32) {
        for p in &mut self.particles {
            p.update(beat);
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}
