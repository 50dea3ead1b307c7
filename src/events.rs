use crate::dom::{self, Listener};
use crate::frame::WebApp;
use crate::viewport;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use web_sys as web;

/// Resize, drag-to-rotate and wheel-to-zoom. Listeners hold only weak refs.
pub fn wire(app: &Rc<RefCell<WebApp>>, canvas: &web::HtmlCanvasElement) -> Vec<Listener> {
    let weak = Rc::downgrade(app);
    let mut listeners = Vec::new();
    if let Some(window) = web::window() {
        listeners.extend(wire_resize(&window, &weak, canvas));
    }
    listeners.extend(wire_pointer(&weak, canvas));
    listeners.extend(wire_wheel(&weak, canvas));
    listeners
}

fn with_app(app: &Weak<RefCell<WebApp>>, f: impl FnOnce(&mut WebApp)) {
    if let Some(app) = app.upgrade() {
        if let Ok(mut guard) = app.try_borrow_mut() {
            f(&mut guard);
        }
    }
}

fn wire_resize(
    window: &web::Window,
    app: &Weak<RefCell<WebApp>>,
    canvas: &web::HtmlCanvasElement,
) -> Option<Listener> {
    let app = app.clone();
    let canvas = canvas.clone();
    Listener::attach(window, "resize", move |_ev: web::Event| {
        dom::sync_canvas_backing_size(&canvas);
        let (w, h) = (canvas.width(), canvas.height());
        with_app(&app, |a| a.effect.resize(w, h, &mut a.gpu));
    })
}

fn wire_pointer(app: &Weak<RefCell<WebApp>>, canvas: &web::HtmlCanvasElement) -> Vec<Listener> {
    let mut out = Vec::new();

    let down_app = app.clone();
    let down_canvas = canvas.clone();
    out.extend(Listener::attach(canvas, "pointerdown", move |ev: web::Event| {
        let Some(pe) = ev.dyn_ref::<web::PointerEvent>() else {
            return;
        };
        _ = down_canvas.set_pointer_capture(pe.pointer_id());
        let (x, y) = (pe.offset_x() as f32, pe.offset_y() as f32);
        with_app(&down_app, |a| a.drag.begin(x, y));
    }));

    let move_app = app.clone();
    let move_canvas = canvas.clone();
    out.extend(Listener::attach(canvas, "pointermove", move |ev: web::Event| {
        let Some(pe) = ev.dyn_ref::<web::PointerEvent>() else {
            return;
        };
        let (x, y) = (pe.offset_x() as f32, pe.offset_y() as f32);
        let height = move_canvas.client_height() as f32;
        with_app(&move_app, |a| {
            if let Some((dx, dy)) = a.drag.move_to(x, y, height) {
                a.effect.rotate_camera(dx, dy);
            }
        });
    }));

    for event in ["pointerup", "pointercancel"] {
        let up_app = app.clone();
        out.extend(Listener::attach(canvas, event, move |_ev: web::Event| {
            with_app(&up_app, |a| a.drag.end());
        }));
    }
    out
}

fn wire_wheel(app: &Weak<RefCell<WebApp>>, canvas: &web::HtmlCanvasElement) -> Option<Listener> {
    let app = app.clone();
    Listener::attach(canvas, "wheel", move |ev: web::Event| {
        let Some(we) = ev.dyn_ref::<web::WheelEvent>() else {
            return;
        };
        ev.prevent_default();
        let steps = viewport::wheel_steps(we.delta_y(), we.delta_mode());
        with_app(&app, |a| a.effect.zoom_camera(steps));
    })
}
