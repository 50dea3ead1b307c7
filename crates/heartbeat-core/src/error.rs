//! Error taxonomy for the effect.
//!
//! Load failures are terminal for one effect instance, render failures cost a
//! single frame, and a disposal race means the host unmounted while the mesh
//! was still in flight. None of these are allowed to escape as panics.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("failed to fetch `{path}`: {reason}")]
    Fetch { path: String, reason: String },
    #[error("`{path}` responded with HTTP {status}")]
    Http { path: String, status: u16 },
    #[error("failed to parse OBJ: {0}")]
    Parse(String),
    #[error("mesh contains no triangles")]
    EmptyMesh,
    #[error("triangle index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("mesh surface area is zero")]
    DegenerateMesh,
    #[error("renderer unavailable: {0}")]
    Renderer(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("{points} points exceed the buffer capacity of {capacity}")]
    CapacityExceeded { points: usize, capacity: usize },
    #[error("position ({positions}) and color ({colors}) buffers disagree")]
    BufferMismatch { positions: usize, colors: usize },
    #[error("mesh has {got} vertices, renderer was prepared for {expected}")]
    MeshSizeMismatch { expected: usize, got: usize },
    #[error("no render surface")]
    NoSurface,
    #[error("surface error: {0}")]
    Surface(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("particleCount must be greater than zero")]
    NoParticles,
    #[error("paletteColors must contain at least one color")]
    EmptyPalette,
    #[error("invalid palette color `{0}`, expected #rrggbb")]
    BadColor(String),
    #[error("durationMs must be greater than zero")]
    ZeroDuration,
    #[error("beatRiseMs + beatFallMs must be greater than zero")]
    FlatBeat,
    #[error("cullWindow maxZ and rateZ must be positive and finite")]
    BadCullWindow,
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EffectError {
    #[error("load failure: {0}")]
    LoadFailure(#[from] LoadError),
    #[error("runtime render failure: {0}")]
    RuntimeRenderFailure(#[from] RenderError),
    #[error("effect was unmounted before initialization finished")]
    DisposalRace,
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}
