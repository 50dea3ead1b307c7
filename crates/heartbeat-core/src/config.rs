//! Recognized configuration surface.
//!
//! Keys are camelCase so the same JSON document works from JavaScript and from
//! the native `--config` flag. Missing keys fall back to the defaults below.

use crate::beat::BeatTiming;
use crate::buffers::CullWindow;
use crate::constants::*;
use crate::error::ConfigError;
use crate::mesh::MeshTransform;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EffectConfig {
    pub particle_count: usize,
    pub palette_colors: Vec<String>,
    pub duration_ms: u64,
    pub beat_rise_ms: u64,
    pub beat_fall_ms: u64,
    pub beat_hold_ms: u64,
    pub cull_window: CullWindow,
    /// Seeds surface sampling and the noise field. `None` draws from entropy.
    pub seed: Option<u64>,
    pub mesh_transform: MeshTransform,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            palette_colors: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            duration_ms: DEFAULT_DURATION_MS,
            beat_rise_ms: DEFAULT_BEAT_RISE_MS,
            beat_fall_ms: DEFAULT_BEAT_FALL_MS,
            beat_hold_ms: DEFAULT_BEAT_HOLD_MS,
            cull_window: CullWindow::default(),
            seed: None,
            mesh_transform: MeshTransform::default(),
        }
    }
}

impl EffectConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::NoParticles);
        }
        Palette::from_hex(&self.palette_colors)?;
        if self.duration_ms == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if self.beat_rise_ms + self.beat_fall_ms == 0 {
            return Err(ConfigError::FlatBeat);
        }
        let w = self.cull_window;
        if !(w.max_z.is_finite() && w.rate_z.is_finite() && w.max_z > 0.0 && w.rate_z > 0.0) {
            return Err(ConfigError::BadCullWindow);
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn beat_timing(&self) -> BeatTiming {
        BeatTiming {
            rise: Duration::from_millis(self.beat_rise_ms),
            fall: Duration::from_millis(self.beat_fall_ms),
            hold: Duration::from_millis(self.beat_hold_ms),
        }
    }

    /// Two points (near and far) per particle at most.
    pub fn point_capacity(&self) -> usize {
        self.particle_count * 2
    }
}

/// Fixed small palette, stored as linear RGB.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<[f32; 3]>,
}

impl Palette {
    pub fn from_hex<S: AsRef<str>>(hex: &[S]) -> Result<Self, ConfigError> {
        if hex.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        let colors = hex
            .iter()
            .map(|s| parse_hex_color(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Out-of-range indices fall back to the first entry.
    #[inline]
    pub fn color(&self, index: usize) -> [f32; 3] {
        self.colors
            .get(index)
            .or_else(|| self.colors.first())
            .copied()
            .unwrap_or([1.0, 1.0, 1.0])
    }
}

fn parse_hex_color(s: &str) -> Result<[f32; 3], ConfigError> {
    let bad = || ConfigError::BadColor(s.to_string());
    let digits = s.strip_prefix('#').ok_or_else(bad)?;
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(bad());
    }
    let mut rgb = [0.0f32; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        let byte = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16).map_err(|_| bad())?;
        *channel = srgb_to_linear(byte as f32 / 255.0);
    }
    Ok(rgb)
}

#[inline]
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_recognized_options() {
        let c = EffectConfig::default();
        assert_eq!(c.particle_count, 10_000);
        assert_eq!(c.palette_colors.len(), 4);
        assert_eq!(c.duration_ms, 3_000);
        assert_eq!((c.beat_rise_ms, c.beat_fall_ms, c.beat_hold_ms), (600, 600, 300));
        assert_eq!(c.cull_window.max_z, 0.23);
        assert_eq!(c.cull_window.rate_z, 0.5);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_population_and_palette() {
        let mut c = EffectConfig::default();
        c.particle_count = 0;
        assert_eq!(c.validate(), Err(ConfigError::NoParticles));

        let mut c = EffectConfig::default();
        c.palette_colors.clear();
        assert_eq!(c.validate(), Err(ConfigError::EmptyPalette));

        let mut c = EffectConfig::default();
        c.palette_colors = vec!["ff0000".into()];
        assert_eq!(c.validate(), Err(ConfigError::BadColor("ff0000".into())));
    }

    #[test]
    fn validate_rejects_flat_beat_and_zero_duration() {
        let mut c = EffectConfig::default();
        c.beat_rise_ms = 0;
        c.beat_fall_ms = 0;
        assert_eq!(c.validate(), Err(ConfigError::FlatBeat));

        let mut c = EffectConfig::default();
        c.duration_ms = 0;
        assert_eq!(c.validate(), Err(ConfigError::ZeroDuration));
    }

    #[test]
    fn json_uses_camel_case_and_fills_defaults() {
        let c = EffectConfig::from_json(
            r#"{ "particleCount": 500, "durationMs": 1200, "cullWindow": { "maxZ": 0.4 }, "seed": 3 }"#,
        )
        .unwrap();
        assert_eq!(c.particle_count, 500);
        assert_eq!(c.duration_ms, 1200);
        assert_eq!(c.cull_window.max_z, 0.4);
        assert_eq!(c.cull_window.rate_z, 0.5);
        assert_eq!(c.seed, Some(3));
        assert_eq!(c.beat_rise_ms, 600);
        assert_eq!(c.mesh_transform, MeshTransform::default());
    }

    #[test]
    fn json_errors_are_reported_not_panicked() {
        assert!(matches!(
            EffectConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(
            EffectConfig::from_json(r#"{ "paletteColors": [] }"#),
            Err(ConfigError::EmptyPalette)
        );
    }

    #[test]
    fn palette_converts_to_linear() {
        let p = Palette::from_hex(&["#ffffff", "#000000"]).unwrap();
        assert_eq!(p.color(0), [1.0, 1.0, 1.0]);
        assert_eq!(p.color(1), [0.0, 0.0, 0.0]);
        // falls back instead of panicking
        assert_eq!(p.color(9), [1.0, 1.0, 1.0]);
    }
}
