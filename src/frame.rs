use crate::fetch::WebFetcher;
use crate::host::WebHost;
use crate::viewport::DragState;
use heartbeat_core::{load_mesh, FrameOutcome, GpuState, HeartBeat, LoadError, Phase};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsValue;
use web_sys as web;

/// Everything one mounted effect owns; shared by rAF, timer, listeners and the loader.
pub struct WebApp {
    pub effect: HeartBeat,
    pub host: WebHost,
    pub gpu: Option<GpuState<'static>>,
    pub drag: DragState,
}

pub fn make_tick(app: Weak<RefCell<WebApp>>) -> Closure<dyn FnMut(f64)> {
    Closure::wrap(Box::new(move |timestamp_ms: f64| {
        let Some(app) = app.upgrade() else {
            return;
        };
        let Ok(mut guard) = app.try_borrow_mut() else {
            return;
        };
        let WebApp {
            effect, host, gpu, ..
        } = &mut *guard;
        host.frame_fired();
        let timestamp = Duration::from_secs_f64((timestamp_ms / 1000.0).max(0.0));
        if effect.frame(timestamp, gpu) == FrameOutcome::Inactive {
            return;
        }
        if effect.phase() == Phase::Animating {
            host.request_frame();
        }
    }) as Box<dyn FnMut(f64)>)
}

pub fn on_timer(app: &Weak<RefCell<WebApp>>) {
    let Some(app) = app.upgrade() else {
        return;
    };
    let callback = {
        let Ok(mut guard) = app.try_borrow_mut() else {
            log::warn!("[web] completion timer fired while busy");
            return;
        };
        let WebApp { effect, host, .. } = &mut *guard;
        host.timer_fired();
        effect.on_completion_timer(host);
        host.take_completion()
    };
    if let Some(callback) = callback {
        if let Err(e) = callback.call0(&JsValue::NULL) {
            log::warn!("[web] onComplete threw: {:?}", e);
        }
    }
}

pub fn unmount(app: &Rc<RefCell<WebApp>>) {
    let Ok(mut guard) = app.try_borrow_mut() else {
        log::warn!("[web] unmount while busy, ignored");
        return;
    };
    let WebApp {
        effect, host, gpu, ..
    } = &mut *guard;
    effect.unmount(host, gpu);
}

async fn init_gpu(canvas: &web::HtmlCanvasElement) -> anyhow::Result<GpuState<'static>> {
    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
    GpuState::new(&instance, surface, canvas.width(), canvas.height()).await
}

/// GPU setup, then the mesh fetch; the mounted flag is re-checked after each await.
pub async fn boot(app: Weak<RefCell<WebApp>>, canvas: web::HtmlCanvasElement, mesh_url: String) {
    let transform = match app.upgrade() {
        Some(shared) => shared.borrow().effect.config().mesh_transform,
        None => return,
    };

    let result = match init_gpu(&canvas).await {
        Ok(gpu) => {
            {
                let Some(shared) = app.upgrade() else {
                    return;
                };
                let mut guard = shared.borrow_mut();
                if !guard.effect.is_mounted() {
                    log::info!("[web] unmounted during GPU setup");
                    return;
                }
                guard.gpu = Some(gpu);
            }
            load_mesh(&WebFetcher, &mesh_url, &transform).await
        }
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            Err(LoadError::Renderer(e.to_string()))
        }
    };

    let Some(shared) = app.upgrade() else {
        return;
    };
    let mut guard = shared.borrow_mut();
    let WebApp {
        effect, host, gpu, ..
    } = &mut *guard;
    if let Err(e) = effect.on_loaded(result, host, gpu) {
        log::debug!("[web] initialization ended: {}", e);
    }
}
