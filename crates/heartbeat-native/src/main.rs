use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use heartbeat_core::{
    load_mesh, AssetFetcher, EffectConfig, GpuState, HeartBeat, Host, LoadError, SystemClock,
};
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Window, WindowBuilder},
};

#[derive(Parser, Debug)]
#[command(name = "heartbeat-native")]
#[command(about = "Beating particle heart intro in a desktop window")]
struct Args {
    /// Path to the heart OBJ
    #[arg(default_value = "assets/model/heartBeat.obj")]
    mesh: PathBuf,

    /// JSON file with effect options (same keys as the web `options`)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the time until completion
    #[arg(long)]
    duration_ms: Option<u64>,

    /// Fixed seed for sampling and noise
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn effect_config(&self) -> anyhow::Result<EffectConfig> {
        let mut config = match &self.config {
            Some(path) => EffectConfig::from_json(&std::fs::read_to_string(path)?)?,
            None => EffectConfig::default(),
        };
        if let Some(ms) = self.duration_ms {
            config.duration_ms = ms;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Reads assets from the local file system.
struct FsFetcher;

impl AssetFetcher for FsFetcher {
    async fn fetch(&self, path: &str, progress: &mut dyn FnMut(f32)) -> Result<Vec<u8>, LoadError> {
        let bytes = std::fs::read(path).map_err(|e| LoadError::Fetch {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        progress(1.0);
        Ok(bytes)
    }
}

/// winit side of the lifecycle; timers are polled from `AboutToWait`.
struct NativeHost {
    window: Arc<Window>,
    looping: bool,
    deadline: Option<Instant>,
    completed: bool,
}

impl Host for NativeHost {
    fn start_frame_loop(&mut self) {
        self.looping = true;
        self.window.request_redraw();
    }

    fn stop_frame_loop(&mut self) {
        self.looping = false;
    }

    fn start_completion_timer(&mut self, after: Duration) {
        self.deadline = Some(Instant::now() + after);
    }

    fn cancel_completion_timer(&mut self) {
        self.deadline = None;
    }

    fn release_resources(&mut self) {
        self.window.set_visible(false);
    }

    fn notify_complete(&mut self) {
        log::info!("intro complete");
        self.completed = true;
    }
}

fn wheel_steps(delta: MouseScrollDelta) -> f32 {
    let steps = match delta {
        MouseScrollDelta::LineDelta(_, y) => -y,
        MouseScrollDelta::PixelDelta(p) => -(p.y as f32) / 100.0,
    };
    steps.clamp(-3.0, 3.0)
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    let config = args.effect_config()?;
    let mut effect = HeartBeat::new(config, Box::new(SystemClock::new()))?;

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("heartbeat (native)")
            .build(&event_loop)?,
    );
    let size = window.inner_size();
    let mut host = NativeHost {
        window: Arc::clone(&window),
        looping: false,
        deadline: None,
        completed: false,
    };

    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(Arc::clone(&window))?;
    let gpu = pollster::block_on(GpuState::new(&instance, surface, size.width, size.height));
    let mesh_path = args.mesh.to_string_lossy().into_owned();
    let (mut gpu, result) = match gpu {
        Ok(gpu) => {
            let transform = effect.config().mesh_transform;
            let result = effect
                .mount(&mesh_path)
                .map(|path| pollster::block_on(load_mesh(&FsFetcher, &path, &transform)));
            (Some(gpu), result)
        }
        Err(e) => {
            effect.mount(&mesh_path);
            (None, Some(Err(LoadError::Renderer(e.to_string()))))
        }
    };
    effect.resize(size.width, size.height, &mut gpu);
    if let Some(result) = result {
        effect.on_loaded(result, &mut host, &mut gpu)?;
    }

    let start = Instant::now();
    let mut drag: Option<(f64, f64)> = None;
    let mut cursor = (0.0_f64, 0.0_f64);

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::Resized(size) => effect.resize(size.width, size.height, &mut gpu),
            WindowEvent::CloseRequested => {
                effect.unmount(&mut host, &mut gpu);
                elwt.exit();
            }
            WindowEvent::RedrawRequested => {
                if host.looping {
                    effect.frame(start.elapsed(), &mut gpu);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                drag = (state == ElementState::Pressed).then_some(cursor);
            }
            WindowEvent::CursorMoved { position, .. } => {
                cursor = (position.x, position.y);
                if let Some((px, py)) = drag {
                    let h = host.window.inner_size().height.max(1) as f64;
                    effect.rotate_camera(((cursor.0 - px) / h) as f32, ((cursor.1 - py) / h) as f32);
                    drag = Some(cursor);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => effect.zoom_camera(wheel_steps(delta)),
            _ => {}
        },
        Event::AboutToWait => {
            if let Some(deadline) = host.deadline {
                if Instant::now() >= deadline {
                    host.deadline = None;
                    effect.on_completion_timer(&mut host);
                }
            }
            if host.completed {
                effect.unmount(&mut host, &mut gpu);
                elwt.exit();
                return;
            }
            if host.looping {
                host.window.request_redraw();
            }
            elwt.set_control_flow(match host.deadline {
                Some(deadline) => ControlFlow::WaitUntil(deadline),
                None => ControlFlow::Wait,
            });
        }
        _ => {}
    })?;
    Ok(())
}
