use crate::viewport;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

/// Creates a full-size canvas as the last child of `#container_id`.
pub fn create_canvas_in(
    document: &web::Document,
    container_id: &str,
) -> anyhow::Result<web::HtmlCanvasElement> {
    let container = document
        .get_element_by_id(container_id)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", container_id))?;
    let canvas: web::HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    let style = canvas.style();
    for (key, value) in [
        ("width", "100%"),
        ("height", "100%"),
        ("display", "block"),
        ("touch-action", "none"),
    ] {
        _ = style.set_property(key, value);
    }
    container
        .append_child(&canvas)
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    Ok(canvas)
}

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let rect = canvas.get_bounding_client_rect();
        let (w_px, h_px) = viewport::backing_size(rect.width(), rect.height(), w.device_pixel_ratio());
        canvas.set_width(w_px);
        canvas.set_height(h_px);
    }
}

/// An attached DOM listener that can be detached again.
pub struct Listener {
    target: web::EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

impl Listener {
    pub fn attach(
        target: &web::EventTarget,
        event: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) -> Option<Self> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        match target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
            Ok(()) => Some(Self {
                target: target.clone(),
                event,
                closure,
            }),
            Err(e) => {
                log::warn!("[dom] failed to attach {} listener: {:?}", event, e);
                None
            }
        }
    }

    pub fn detach(self) {
        _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}
