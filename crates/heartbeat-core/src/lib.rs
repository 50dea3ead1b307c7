pub mod beat;
pub mod buffers;
pub mod camera;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod lifecycle;
pub mod loader;
pub mod mesh;
pub mod noise;
pub mod particles;
pub mod sampler;
pub mod sink;

pub static SCENE_WGSL: &str = include_str!("../shaders/heart.wgsl");

pub use beat::{BeatTimeline, BeatTiming};
pub use buffers::{Branch, CullWindow, RenderBuffers};
pub use camera::{Camera, TrackballControls};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{EffectConfig, Palette};
pub use constants::*;
pub use error::{ConfigError, EffectError, LoadError, RenderError};
#[cfg(feature = "gpu")]
pub use gpu::GpuState;
pub use lifecycle::{EffectStats, FrameOutcome, HeartBeat, Phase};
pub use loader::{load_mesh, parse_obj, AssetFetcher, MemoryFetcher};
pub use mesh::{HeartMesh, MeshTransform};
pub use noise::NoiseField;
pub use particles::{Particle, ParticleField};
pub use sampler::SurfaceSampler;
pub use sink::{FrameSink, FrameView, Host, SceneLayout};
