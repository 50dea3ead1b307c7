//! Load → initialize → animate → auto-complete → teardown.
//!
//! [`HeartBeat`] owns all effect state; the scene only exists while the state
//! machine is animating or completing, so a torn-down effect cannot be drawn.
//! Hosts drive it from their async loader, display-refresh callback and
//! one-shot timer, and receive side effects through [`Host`].

use crate::beat::BeatTimeline;
use crate::buffers::RenderBuffers;
use crate::camera::{Camera, TrackballControls};
use crate::clock::Clock;
use crate::config::{EffectConfig, Palette};
use crate::constants::DEFORM_TIME_RATE;
use crate::error::{EffectError, LoadError};
use crate::mesh::HeartMesh;
use crate::noise::NoiseField;
use crate::particles::ParticleField;
use crate::sampler::SurfaceSampler;
use crate::sink::{FrameSink, FrameView, Host, SceneLayout};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Initializing,
    Animating,
    Completing,
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered { points: usize },
    /// Something was off this frame; logged and dropped, the loop carries on.
    Skipped,
    /// Not animating; nothing was computed.
    Inactive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectStats {
    pub particles_spawned: usize,
    pub frames_rendered: u64,
    pub frames_skipped: u64,
    pub completions: u32,
}

struct Scene {
    mesh: HeartMesh,
    noise: NoiseField,
    particles: ParticleField,
    beat: BeatTimeline,
    buffers: RenderBuffers,
    first_frame: Option<Duration>,
    frame_time: f32,
}

enum State {
    Idle,
    Loading,
    Initializing,
    Animating(Box<Scene>),
    Completing(Box<Scene>),
    Disposed,
}

pub struct HeartBeat {
    config: EffectConfig,
    palette: Palette,
    clock: Box<dyn Clock>,
    camera: Camera,
    controls: TrackballControls,
    state: State,
    stats: EffectStats,
    last_error: Option<EffectError>,
}

impl HeartBeat {
    pub fn new(config: EffectConfig, clock: Box<dyn Clock>) -> Result<Self, EffectError> {
        config.validate()?;
        let palette = Palette::from_hex(&config.palette_colors)?;
        Ok(Self {
            config,
            palette,
            clock,
            camera: Camera::default(),
            controls: TrackballControls::default(),
            state: State::Idle,
            stats: EffectStats::default(),
            last_error: None,
        })
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Idle => Phase::Idle,
            State::Loading => Phase::Loading,
            State::Initializing => Phase::Initializing,
            State::Animating(_) => Phase::Animating,
            State::Completing(_) => Phase::Completing,
            State::Disposed => Phase::Disposed,
        }
    }

    /// True between `mount` and teardown; checked after every async resumption.
    pub fn is_mounted(&self) -> bool {
        !matches!(self.state, State::Idle | State::Disposed)
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    pub fn stats(&self) -> EffectStats {
        self.stats
    }

    /// Terminal error of this instance, if any.
    pub fn last_error(&self) -> Option<&EffectError> {
        self.last_error.as_ref()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn particles(&self) -> Option<&ParticleField> {
        self.scene().map(|s| &s.particles)
    }

    pub fn mesh(&self) -> Option<&HeartMesh> {
        self.scene().map(|s| &s.mesh)
    }

    pub fn buffers(&self) -> Option<&RenderBuffers> {
        self.scene().map(|s| &s.buffers)
    }

    /// Current beat value on the timeline's own clock.
    pub fn beat_amplitude(&self) -> f32 {
        self.scene()
            .map(|s| s.beat.amplitude(self.clock.now()))
            .unwrap_or(0.0)
    }

    fn scene(&self) -> Option<&Scene> {
        match &self.state {
            State::Animating(s) | State::Completing(s) => Some(s),
            _ => None,
        }
    }

    /// Idle → Loading. Returns the asset path the host should load.
    pub fn mount(&mut self, mesh_path: &str) -> Option<String> {
        if !matches!(self.state, State::Idle) {
            log::warn!("[lifecycle] mount ignored in phase {:?}", self.phase());
            return None;
        }
        self.state = State::Loading;
        log::info!("[lifecycle] mounted, loading {}", mesh_path);
        Some(mesh_path.to_string())
    }

    /// Resumes after the asynchronous load.
    ///
    /// On success the particle field is populated and the beat started before
    /// the frame loop and completion timer are requested. A load that resolves
    /// after unmount is dropped with [`EffectError::DisposalRace`].
    pub fn on_loaded<H: Host, S: FrameSink>(
        &mut self,
        result: Result<HeartMesh, LoadError>,
        host: &mut H,
        sink: &mut S,
    ) -> Result<(), EffectError> {
        match self.state {
            State::Loading => {}
            State::Idle | State::Disposed => {
                log::info!("[lifecycle] load resolved after unmount, abandoning initialization");
                return Err(EffectError::DisposalRace);
            }
            _ => {
                log::warn!("[lifecycle] duplicate load result ignored in {:?}", self.phase());
                return Ok(());
            }
        }

        let mesh = match result {
            Ok(mesh) => mesh,
            Err(e) => return Err(self.abort(EffectError::LoadFailure(e), host, sink)),
        };

        self.state = State::Initializing;
        let mut scene = match self.build_scene(mesh, sink) {
            Ok(scene) => scene,
            Err(e) => return Err(self.abort(e, host, sink)),
        };
        scene.beat.start(self.clock.now());
        self.stats.particles_spawned += scene.particles.len();
        self.state = State::Animating(Box::new(scene));

        host.start_frame_loop();
        host.start_completion_timer(self.config.duration());
        log::info!(
            "[lifecycle] animating {} particles for {} ms",
            self.stats.particles_spawned,
            self.config.duration_ms
        );
        Ok(())
    }

    fn build_scene<S: FrameSink>(
        &self,
        mesh: HeartMesh,
        sink: &mut S,
    ) -> Result<Scene, EffectError> {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let noise = NoiseField::new(rng.gen());
        let mut sampler = SurfaceSampler::build(&mesh, StdRng::seed_from_u64(rng.gen()))?;
        let particles = ParticleField::init(
            self.config.particle_count,
            &mut sampler,
            &noise,
            self.palette.len(),
            &mut rng,
        );
        let point_capacity = self.config.point_capacity();
        sink.prepare(&SceneLayout {
            mesh_indices: mesh.indices(),
            mesh_vertex_count: mesh.vertex_count(),
            point_capacity,
        })?;
        Ok(Scene {
            mesh,
            noise,
            particles,
            beat: BeatTimeline::new(self.config.beat_timing()),
            buffers: RenderBuffers::with_capacity(point_capacity),
            first_frame: None,
            frame_time: 0.0,
        })
    }

    fn abort<H: Host, S: FrameSink>(
        &mut self,
        error: EffectError,
        host: &mut H,
        sink: &mut S,
    ) -> EffectError {
        log::error!("[lifecycle] {}", error);
        self.last_error = Some(error.clone());
        self.teardown(host, sink);
        error
    }

    /// One display refresh. `timestamp` is the host's frame time.
    pub fn frame<S: FrameSink>(&mut self, timestamp: Duration, sink: &mut S) -> FrameOutcome {
        let State::Animating(scene) = &mut self.state else {
            return FrameOutcome::Inactive;
        };

        let beat = scene.beat.amplitude(self.clock.now());
        let origin = *scene.first_frame.get_or_insert(timestamp);
        let elapsed_ms = timestamp.saturating_sub(origin).as_secs_f32() * 1000.0;
        scene.frame_time = scene.frame_time.max(elapsed_ms * DEFORM_TIME_RATE);

        scene.mesh.deform(&scene.noise, beat, scene.frame_time);
        scene.particles.update(beat);
        scene.buffers.rebuild(
            scene.particles.particles(),
            &self.palette,
            &self.config.cull_window,
        );

        let (camera_right, camera_up) = self.camera.billboard_axes();
        let view = FrameView {
            mesh_vertices: scene.mesh.working(),
            buffers: &scene.buffers,
            view_proj: self.camera.view_proj(),
            camera_right,
            camera_up,
        };
        let drawn = scene
            .buffers
            .validate(self.config.point_capacity())
            .and_then(|_| sink.draw(&view));
        match drawn {
            Ok(()) => {
                self.stats.frames_rendered += 1;
                FrameOutcome::Rendered {
                    points: scene.buffers.point_count(),
                }
            }
            Err(e) => {
                log::warn!("[frame] skipped: {}", EffectError::RuntimeRenderFailure(e));
                self.stats.frames_skipped += 1;
                FrameOutcome::Skipped
            }
        }
    }

    /// Animating → Completing: stop the loop first, then notify exactly once.
    pub fn on_completion_timer<H: Host>(&mut self, host: &mut H) {
        match std::mem::replace(&mut self.state, State::Disposed) {
            State::Animating(scene) => {
                self.state = State::Completing(scene);
                host.stop_frame_loop();
                self.stats.completions += 1;
                log::info!(
                    "[lifecycle] complete after {} frames",
                    self.stats.frames_rendered
                );
                host.notify_complete();
            }
            other => {
                self.state = other;
                log::debug!("[lifecycle] stale completion timer in {:?}", self.phase());
            }
        }
    }

    /// Viewport change: camera and surface only, simulation untouched.
    pub fn resize<S: FrameSink>(&mut self, width: u32, height: u32, sink: &mut S) {
        if width == 0 || height == 0 {
            return;
        }
        self.camera.set_viewport(width, height);
        sink.resize(width, height);
    }

    pub fn rotate_camera(&mut self, dx: f32, dy: f32) {
        self.controls.rotate(&mut self.camera, dx, dy);
    }

    pub fn zoom_camera(&mut self, steps: f32) {
        self.controls.zoom(&mut self.camera, steps);
    }

    /// Teardown from any phase. Safe to call repeatedly.
    pub fn unmount<H: Host, S: FrameSink>(&mut self, host: &mut H, sink: &mut S) {
        if matches!(self.state, State::Disposed) {
            return;
        }
        let was = self.phase();
        self.teardown(host, sink);
        log::info!("[lifecycle] unmounted during {:?}", was);
    }

    // timer, then loop, then beat, and only then GPU and host resources
    fn teardown<H: Host, S: FrameSink>(&mut self, host: &mut H, sink: &mut S) {
        host.cancel_completion_timer();
        host.stop_frame_loop();
        if let State::Animating(scene) | State::Completing(scene) = &mut self.state {
            scene.beat.stop();
        }
        sink.release();
        host.release_resources();
        self.state = State::Disposed;
    }
}
