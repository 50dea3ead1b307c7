// Simulated-host tests for the full mount → animate → complete → unmount cycle.
// Time is driven by a ManualClock stepped at ~60 Hz; the sink records draws.

use heartbeat_core::*;
use std::cell::RefCell;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);

// Octahedron with 10-unit arms so the default normalization lands it near the origin.
const OCTA: &str = "\
o heart
v 10 0 0
v -10 0 0
v 0 10 0
v 0 -10 0
v 0 0 10
v 0 0 -10
f 1 3 5
f 3 2 5
f 2 4 5
f 4 1 5
f 3 1 6
f 2 3 6
f 4 2 6
f 1 4 6
";

thread_local! {
    static LOG_LINES: RefCell<Vec<(log::Level, String)>> = RefCell::new(Vec::new());
}

struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        LOG_LINES.with(|l| l.borrow_mut().push((record.level(), record.args().to_string())));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

fn install_logger() {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(log::LevelFilter::Trace);
    LOG_LINES.with(|l| l.borrow_mut().clear());
}

fn logged(level: log::Level, needle: &str) -> bool {
    LOG_LINES.with(|l| {
        l.borrow()
            .iter()
            .any(|(lvl, msg)| *lvl == level && msg.contains(needle))
    })
}

struct SimHost {
    clock: ManualClock,
    loop_running: bool,
    loop_starts: u32,
    timer_deadline: Option<Duration>,
    completed_at: Vec<Duration>,
    releases: u32,
}

impl SimHost {
    fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            loop_running: false,
            loop_starts: 0,
            timer_deadline: None,
            completed_at: Vec::new(),
            releases: 0,
        }
    }
}

impl Host for SimHost {
    fn start_frame_loop(&mut self) {
        self.loop_running = true;
        self.loop_starts += 1;
    }

    fn stop_frame_loop(&mut self) {
        self.loop_running = false;
    }

    fn start_completion_timer(&mut self, after: Duration) {
        self.timer_deadline = Some(self.clock.now() + after);
    }

    fn cancel_completion_timer(&mut self) {
        self.timer_deadline = None;
    }

    fn release_resources(&mut self) {
        self.releases += 1;
    }

    fn notify_complete(&mut self) {
        self.completed_at.push(self.clock.now());
    }
}

#[derive(Default)]
struct SimSink {
    prepared: Option<(usize, usize)>,
    draws: u32,
    last_points: usize,
    fail_next: bool,
    resized: Option<(u32, u32)>,
    releases: u32,
}

impl FrameSink for SimSink {
    fn prepare(&mut self, layout: &SceneLayout<'_>) -> Result<(), RenderError> {
        self.prepared = Some((layout.mesh_vertex_count, layout.point_capacity));
        Ok(())
    }

    fn draw(&mut self, view: &FrameView<'_>) -> Result<(), RenderError> {
        if std::mem::take(&mut self.fail_next) {
            return Err(RenderError::Surface("lost".into()));
        }
        self.draws += 1;
        self.last_points = view.buffers.point_count();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.resized = Some((width, height));
    }

    fn release(&mut self) {
        self.releases += 1;
    }
}

fn test_config() -> EffectConfig {
    EffectConfig {
        particle_count: 400,
        seed: Some(7),
        ..EffectConfig::default()
    }
}

fn octa_mesh(config: &EffectConfig) -> HeartMesh {
    parse_obj(OCTA.as_bytes(), &config.mesh_transform).unwrap()
}

struct Sim {
    clock: ManualClock,
    host: SimHost,
    sink: SimSink,
    effect: HeartBeat,
}

impl Sim {
    fn new(config: EffectConfig) -> Self {
        let clock = ManualClock::new();
        let effect = HeartBeat::new(config, Box::new(clock.clone())).unwrap();
        Self {
            host: SimHost::new(clock.clone()),
            clock,
            sink: SimSink::default(),
            effect,
        }
    }

    fn mount_and_load(&mut self) {
        assert!(self.effect.mount(DEFAULT_MESH_PATH).is_some());
        let mesh = octa_mesh(self.effect.config());
        self.effect
            .on_loaded(Ok(mesh), &mut self.host, &mut self.sink)
            .unwrap();
    }

    /// Steps one frame interval: fire a due timer first, then draw if looping.
    fn step(&mut self) -> Option<FrameOutcome> {
        self.clock.advance(FRAME);
        if let Some(deadline) = self.host.timer_deadline {
            if self.clock.now() >= deadline {
                self.host.timer_deadline = None;
                self.effect.on_completion_timer(&mut self.host);
            }
        }
        if self.host.loop_running {
            Some(self.effect.frame(self.clock.now(), &mut self.sink))
        } else {
            None
        }
    }

    fn run_until(&mut self, until: Duration) {
        while self.clock.now() < until {
            self.step();
        }
    }
}

#[test]
fn completion_fires_once_near_duration_and_stops_frames() {
    let mut sim = Sim::new(test_config());
    sim.mount_and_load();
    assert_eq!(sim.effect.phase(), Phase::Animating);
    assert_eq!(sim.host.loop_starts, 1);

    sim.run_until(Duration::from_millis(3500));
    assert_eq!(sim.host.completed_at.len(), 1);
    let at = sim.host.completed_at[0];
    assert!(at >= Duration::from_millis(2900) && at <= Duration::from_millis(3300));
    assert_eq!(sim.effect.phase(), Phase::Completing);
    assert!(!sim.host.loop_running);

    let draws = sim.sink.draws;
    assert!(draws > 150);
    sim.run_until(Duration::from_millis(5000));
    assert_eq!(sim.sink.draws, draws);
    assert_eq!(sim.effect.stats().completions, 1);
}

#[test]
fn failed_load_is_silent_and_logged() {
    install_logger();
    let config = test_config();
    let fetcher = MemoryFetcher::new();
    let result = pollster::block_on(load_mesh(&fetcher, "/missing.obj", &config.mesh_transform));

    let mut sim = Sim::new(config);
    sim.effect.mount("/missing.obj");
    let err = sim
        .effect
        .on_loaded(result, &mut sim.host, &mut sim.sink)
        .unwrap_err();
    assert!(matches!(err, EffectError::LoadFailure(LoadError::Http { status: 404, .. })));
    assert_eq!(sim.effect.phase(), Phase::Disposed);
    assert!(sim.effect.particles().is_none());
    assert_eq!(sim.host.loop_starts, 0);
    assert!(sim.host.timer_deadline.is_none());
    assert_eq!(sim.host.releases, 1);
    assert!(logged(log::Level::Error, "load failure"));

    sim.run_until(Duration::from_millis(4000));
    assert!(sim.host.completed_at.is_empty());
    assert_eq!(sim.sink.draws, 0);
}

#[test]
fn unmount_before_load_resolves_abandons_initialization() {
    let mut sim = Sim::new(test_config());
    sim.effect.mount(DEFAULT_MESH_PATH);
    sim.clock.advance(Duration::from_millis(50));
    sim.effect.unmount(&mut sim.host, &mut sim.sink);
    assert_eq!(sim.effect.phase(), Phase::Disposed);

    let mesh = octa_mesh(sim.effect.config());
    let err = sim
        .effect
        .on_loaded(Ok(mesh), &mut sim.host, &mut sim.sink)
        .unwrap_err();
    assert_eq!(err, EffectError::DisposalRace);
    assert!(sim.effect.particles().is_none());
    assert_eq!(sim.host.loop_starts, 0);
    assert!(sim.sink.prepared.is_none());

    sim.run_until(Duration::from_millis(4000));
    assert!(sim.host.completed_at.is_empty());
}

#[test]
fn unmount_is_idempotent_from_any_phase() {
    let mut sim = Sim::new(test_config());
    sim.effect.unmount(&mut sim.host, &mut sim.sink);
    sim.effect.unmount(&mut sim.host, &mut sim.sink);
    assert_eq!(sim.host.releases, 1);
    assert_eq!(sim.sink.releases, 1);

    let mut sim = Sim::new(test_config());
    sim.mount_and_load();
    sim.run_until(Duration::from_millis(500));
    sim.effect.unmount(&mut sim.host, &mut sim.sink);
    sim.effect.unmount(&mut sim.host, &mut sim.sink);
    assert_eq!(sim.host.releases, 1);
    assert_eq!(sim.sink.releases, 1);
    assert!(!sim.host.loop_running);
    assert!(sim.host.timer_deadline.is_none());
}

#[test]
fn unmount_mid_animation_prevents_completion() {
    let mut sim = Sim::new(test_config());
    sim.mount_and_load();
    sim.run_until(Duration::from_millis(1000));
    let draws = sim.sink.draws;
    sim.effect.unmount(&mut sim.host, &mut sim.sink);

    sim.run_until(Duration::from_millis(4000));
    assert!(sim.host.completed_at.is_empty());
    assert_eq!(sim.sink.draws, draws);
    // a timer that slipped through after teardown is ignored
    sim.effect.on_completion_timer(&mut sim.host);
    assert!(sim.host.completed_at.is_empty());
    assert_eq!(sim.effect.frame(sim.clock.now(), &mut sim.sink), FrameOutcome::Inactive);
}

#[test]
fn unmount_after_completion_is_clean() {
    let mut sim = Sim::new(test_config());
    sim.mount_and_load();
    sim.run_until(Duration::from_millis(3200));
    assert_eq!(sim.host.completed_at.len(), 1);
    sim.effect.unmount(&mut sim.host, &mut sim.sink);
    assert_eq!(sim.effect.phase(), Phase::Disposed);
    assert_eq!(sim.host.completed_at.len(), 1);
}

#[test]
fn resize_only_touches_camera_and_surface() {
    let mut sim = Sim::new(test_config());
    sim.mount_and_load();
    sim.run_until(Duration::from_millis(200));
    let bases: Vec<_> = sim
        .effect
        .particles()
        .unwrap()
        .particles()
        .iter()
        .map(|p| p.base)
        .collect();

    sim.effect.resize(1280, 720, &mut sim.sink);
    assert_eq!(sim.sink.resized, Some((1280, 720)));
    assert!((sim.effect.camera().aspect - 1280.0 / 720.0).abs() < 1e-5);

    let after: Vec<_> = sim
        .effect
        .particles()
        .unwrap()
        .particles()
        .iter()
        .map(|p| p.base)
        .collect();
    assert_eq!(bases, after);
    assert_eq!(sim.effect.phase(), Phase::Animating);
}

#[test]
fn frames_preserve_mesh_and_particle_invariants() {
    let config = test_config();
    let count = config.particle_count;
    let mut sim = Sim::new(config);
    sim.mount_and_load();
    assert_eq!(sim.effect.stats().particles_spawned, count);
    let bases: Vec<_> = sim
        .effect
        .particles()
        .unwrap()
        .particles()
        .iter()
        .map(|p| p.base)
        .collect();

    for _ in 0..120 {
        let Some(FrameOutcome::Rendered { points }) = sim.step() else {
            panic!("frame was not rendered");
        };
        assert!(points <= count * 2);
        let mesh = sim.effect.mesh().unwrap();
        assert_eq!(mesh.working().len(), mesh.original().len());
        let field = sim.effect.particles().unwrap();
        assert_eq!(field.len(), count);
        assert!(field.particles().iter().zip(&bases).all(|(p, b)| p.base == *b));
    }
}

#[test]
fn zero_beat_collapses_mesh_to_origin() {
    let mut sim = Sim::new(test_config());
    sim.mount_and_load();
    // beat started at t=0 and the clock has not moved
    assert_eq!(sim.effect.beat_amplitude(), 0.0);
    sim.effect.frame(sim.clock.now(), &mut sim.sink);
    let mesh = sim.effect.mesh().unwrap();
    assert!(mesh.working().iter().all(|v| *v == glam::Vec3::ZERO));
    assert!(mesh.original().iter().any(|v| v.length() > 0.1));
}

#[test]
fn buffers_hold_exactly_the_positions_inside_the_window() {
    let config = test_config();
    let window = config.cull_window;
    let mut sim = Sim::new(config);
    sim.mount_and_load();
    for _ in 0..40 {
        sim.step();
        let field = sim.effect.particles().unwrap();
        let expected: usize = field
            .particles()
            .iter()
            .map(|p| {
                window.contains(p.near.z, p.jitter, Branch::Near) as usize
                    + window.contains(p.far.z, p.jitter, Branch::Far) as usize
            })
            .sum();
        let buffers = sim.effect.buffers().unwrap();
        assert_eq!(buffers.point_count(), expected);
        assert!(buffers
            .positions
            .chunks_exact(3)
            .all(|p| p[2].abs() < window.half_width(MAX_JITTER, Branch::Far)));
    }
}

#[test]
fn render_failure_skips_one_frame_only() {
    let mut sim = Sim::new(test_config());
    sim.mount_and_load();
    sim.step();
    sim.sink.fail_next = true;
    assert_eq!(sim.step(), Some(FrameOutcome::Skipped));
    assert!(matches!(sim.step(), Some(FrameOutcome::Rendered { .. })));
    assert_eq!(sim.effect.stats().frames_skipped, 1);
    assert_eq!(sim.effect.phase(), Phase::Animating);
}

#[test]
fn missing_renderer_fails_initialization() {
    let clock = ManualClock::new();
    let mut host = SimHost::new(clock.clone());
    let mut sink: Option<SimSink> = None;
    let mut effect = HeartBeat::new(test_config(), Box::new(clock)).unwrap();
    effect.mount(DEFAULT_MESH_PATH);
    let mesh = octa_mesh(effect.config());
    let err = effect.on_loaded(Ok(mesh), &mut host, &mut sink).unwrap_err();
    assert_eq!(err, EffectError::RuntimeRenderFailure(RenderError::NoSurface));
    assert_eq!(effect.phase(), Phase::Disposed);
    assert_eq!(effect.last_error(), Some(&err));
    assert_eq!(host.loop_starts, 0);
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let config = EffectConfig {
        particle_count: 0,
        ..EffectConfig::default()
    };
    let err = HeartBeat::new(config, Box::new(ManualClock::new())).err();
    assert_eq!(err, Some(EffectError::InvalidConfig(ConfigError::NoParticles)));
}

#[test]
fn same_seed_gives_same_field() {
    let mut a = Sim::new(test_config());
    let mut b = Sim::new(test_config());
    a.mount_and_load();
    b.mount_and_load();
    let pa = a.effect.particles().unwrap().particles();
    let pb = b.effect.particles().unwrap().particles();
    assert!(pa.iter().zip(pb).all(|(x, y)| x.base == y.base && x.color_index == y.color_index));
}
