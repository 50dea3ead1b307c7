// Shared tuning constants used by both web and native frontends.

// Population and lifetime
pub const DEFAULT_PARTICLE_COUNT: usize = 10_000;
pub const DEFAULT_DURATION_MS: u64 = 3_000; // intro length before completion fires
pub const DEFAULT_MESH_PATH: &str = "/model/heartBeat.obj";

// Palette (sRGB hex, converted to linear on load)
pub const DEFAULT_PALETTE: [&str; 4] = ["#ffd4ee", "#ff77fc", "#ff77ae", "#ff1775"];

// Beat timeline
pub const DEFAULT_BEAT_RISE_MS: u64 = 600;
pub const DEFAULT_BEAT_FALL_MS: u64 = 600;
pub const DEFAULT_BEAT_HOLD_MS: u64 = 300; // rest between contractions
pub const BEAT_PEAK: f32 = 0.5;

// Particle displacement
pub const MAX_JITTER: f32 = 0.03; // per-particle culling slack, exclusive upper bound
pub const NEAR_BASE_SCALE: f32 = 1.01;
pub const NEAR_SWELL_GAIN: f32 = 0.15;
pub const SWELL_NOISE_W: f32 = 0.1;
pub const SWELL_NOISE_OFFSET: f32 = 1.5;
pub const SPARKLE_NOISE_FREQ: f32 = 500.0; // high frequency so neighbours decorrelate
pub const SPARKLE_NOISE_W: f32 = 1.0;
pub const SPARKLE_NOISE_OFFSET: f32 = 1.0;
pub const FAR_BEAT_BIAS: f32 = 0.3;
pub const FAR_CONTRACTION: f32 = 1.2;

// Mesh deformation
pub const DEFORM_NOISE_FREQ: f32 = 1.5;
pub const DEFORM_GAIN: f32 = 0.15;
pub const DEFORM_TIME_RATE: f32 = 0.0005; // noise w advance per elapsed millisecond

// Depth culling window
pub const CULL_MAX_Z: f32 = 0.23;
pub const CULL_RATE_Z: f32 = 0.5;

// Mesh normalization applied once after load
pub const MESH_ROTATE_X: f32 = -std::f32::consts::FRAC_PI_2;
pub const MESH_SCALE: f32 = 0.04;
pub const MESH_TRANSLATE: [f32; 3] = [0.0, -0.4, 0.0];

// Camera
pub const CAMERA_FOV_DEG: f32 = 75.0;
pub const CAMERA_Z: f32 = 1.8;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 1000.0;

// Trackball controls
pub const CONTROLS_MIN_DISTANCE: f32 = 0.7;
pub const CONTROLS_MAX_DISTANCE: f32 = 3.0;
pub const CONTROLS_ROTATE_SPEED: f32 = 1.0;
pub const CONTROLS_ZOOM_SPEED: f32 = 1.2;

// Rendering
pub const POINT_SIZE: f32 = 0.009; // world-space billboard edge
pub const CLEAR_COLOR: [f64; 3] = [0.0, 0.0, 0.0];
