#![cfg(target_arch = "wasm32")]
use heartbeat_core::{EffectConfig, HeartBeat, SystemClock, DEFAULT_MESH_PATH};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod dom;
mod events;
mod fetch;
mod frame;
mod host;
mod viewport;

use frame::WebApp;
use host::WebHost;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("heartbeat-web ready");
    Ok(())
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// `undefined`/`null` means defaults; anything else goes through the JSON config parser.
fn parse_options(options: &JsValue) -> Result<EffectConfig, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(EffectConfig::default());
    }
    let json: String = js_sys::JSON::stringify(options)?.into();
    EffectConfig::from_json(&json).map_err(to_js)
}

/// Live effect instance returned to JS. Dropping it (`free()`) unmounts too.
#[wasm_bindgen]
pub struct HeartBeatHandle {
    app: Rc<RefCell<WebApp>>,
}

#[wasm_bindgen]
impl HeartBeatHandle {
    /// Stops everything and removes the canvas. Safe to call more than once.
    pub fn unmount(&self) {
        frame::unmount(&self.app);
    }

    #[wasm_bindgen(getter)]
    pub fn phase(&self) -> String {
        match self.app.try_borrow() {
            Ok(app) => format!("{:?}", app.effect.phase()),
            Err(_) => "Busy".to_string(),
        }
    }
}

impl Drop for HeartBeatHandle {
    fn drop(&mut self) {
        frame::unmount(&self.app);
    }
}

/// Creates the canvas inside `#container_id`, loads the heart and starts the
/// intro. `on_complete` is called once, after the configured duration.
#[wasm_bindgen(js_name = mountHeartbeat)]
pub fn mount_heartbeat(
    container_id: &str,
    mesh_url: Option<String>,
    options: JsValue,
    on_complete: Option<js_sys::Function>,
) -> Result<HeartBeatHandle, JsValue> {
    let config = parse_options(&options)?;
    let effect = HeartBeat::new(config, Box::new(SystemClock::new())).map_err(to_js)?;

    let window = web::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas = dom::create_canvas_in(&document, container_id).map_err(to_js)?;
    dom::sync_canvas_backing_size(&canvas);

    let app = Rc::new_cyclic(|weak| {
        RefCell::new(WebApp {
            effect,
            host: WebHost::new(window, canvas.clone(), weak.clone(), on_complete),
            gpu: None,
            drag: Default::default(),
        })
    });
    let listeners = events::wire(&app, &canvas);

    let mesh_path = {
        let mut guard = app.borrow_mut();
        let WebApp {
            effect, host, gpu, ..
        } = &mut *guard;
        host.set_listeners(listeners);
        effect.resize(host.canvas().width(), host.canvas().height(), gpu);
        effect.mount(mesh_url.as_deref().unwrap_or(DEFAULT_MESH_PATH))
    };
    if let Some(path) = mesh_path {
        spawn_local(frame::boot(Rc::downgrade(&app), canvas, path));
    }
    Ok(HeartBeatHandle { app })
}
