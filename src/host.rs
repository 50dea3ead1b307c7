use crate::dom::Listener;
use crate::frame::{self, WebApp};
use heartbeat_core::Host;
use std::cell::RefCell;
use std::rc::Weak;
use std::time::Duration;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Browser side of the lifecycle: rAF, `setTimeout`, the canvas and its listeners.
pub struct WebHost {
    window: web::Window,
    canvas: web::HtmlCanvasElement,
    app: Weak<RefCell<WebApp>>,
    tick: Closure<dyn FnMut(f64)>,
    raf_id: Option<i32>,
    timer_id: Option<i32>,
    listeners: Vec<Listener>,
    on_complete: Option<js_sys::Function>,
    complete_pending: bool,
}

impl WebHost {
    pub fn new(
        window: web::Window,
        canvas: web::HtmlCanvasElement,
        app: Weak<RefCell<WebApp>>,
        on_complete: Option<js_sys::Function>,
    ) -> Self {
        Self {
            window,
            canvas,
            tick: frame::make_tick(app.clone()),
            app,
            raf_id: None,
            timer_id: None,
            listeners: Vec::new(),
            on_complete,
            complete_pending: false,
        }
    }

    pub fn canvas(&self) -> &web::HtmlCanvasElement {
        &self.canvas
    }

    pub fn set_listeners(&mut self, listeners: Vec<Listener>) {
        self.listeners = listeners;
    }

    pub(crate) fn request_frame(&mut self) {
        match self
            .window
            .request_animation_frame(self.tick.as_ref().unchecked_ref())
        {
            Ok(id) => self.raf_id = Some(id),
            Err(e) => log::warn!("[web] requestAnimationFrame failed: {:?}", e),
        }
    }

    pub(crate) fn frame_fired(&mut self) {
        self.raf_id = None;
    }

    pub(crate) fn timer_fired(&mut self) {
        self.timer_id = None;
    }

    /// The completion callback, if one was requested since the last call.
    ///
    /// Invoked by the caller once the app borrow is released, so JS may
    /// unmount from inside it.
    pub(crate) fn take_completion(&mut self) -> Option<js_sys::Function> {
        if std::mem::take(&mut self.complete_pending) {
            self.on_complete.take()
        } else {
            None
        }
    }
}

impl Host for WebHost {
    fn start_frame_loop(&mut self) {
        if self.raf_id.is_none() {
            self.request_frame();
        }
    }

    fn stop_frame_loop(&mut self) {
        if let Some(id) = self.raf_id.take() {
            _ = self.window.cancel_animation_frame(id);
        }
    }

    fn start_completion_timer(&mut self, after: Duration) {
        self.cancel_completion_timer();
        let app = self.app.clone();
        let callback = Closure::once_into_js(move || frame::on_timer(&app));
        let ms = after.as_millis().min(i32::MAX as u128) as i32;
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), ms)
        {
            Ok(id) => self.timer_id = Some(id),
            Err(e) => log::warn!("[web] setTimeout failed: {:?}", e),
        }
    }

    fn cancel_completion_timer(&mut self) {
        if let Some(id) = self.timer_id.take() {
            self.window.clear_timeout_with_handle(id);
        }
    }

    fn release_resources(&mut self) {
        for listener in self.listeners.drain(..) {
            listener.detach();
        }
        self.on_complete = None;
        self.complete_pending = false;
        self.canvas.remove();
    }

    fn notify_complete(&mut self) {
        self.complete_pending = self.on_complete.is_some();
    }
}
