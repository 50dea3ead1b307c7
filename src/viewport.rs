// Pure viewport/input math; no web-sys so it can be tested on the host.

/// Backing-store size for a canvas laid out at `css_*` CSS pixels.
#[inline]
pub fn backing_size(css_width: f64, css_height: f64, dpr: f64) -> (u32, u32) {
    let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    let w = (css_width.max(0.0) * dpr) as u32;
    let h = (css_height.max(0.0) * dpr) as u32;
    (w.max(1), h.max(1))
}

/// Active pointer drag, in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DragState {
    last: Option<(f32, f32)>,
}

impl DragState {
    pub fn begin(&mut self, x: f32, y: f32) {
        self.last = Some((x, y));
    }

    /// Delta since the previous position, normalized by the viewport height.
    pub fn move_to(&mut self, x: f32, y: f32, viewport_height: f32) -> Option<(f32, f32)> {
        let (px, py) = self.last?;
        self.last = Some((x, y));
        let h = viewport_height.max(1.0);
        Some(((x - px) / h, (y - py) / h))
    }

    pub fn end(&mut self) {
        self.last = None;
    }

    pub fn is_active(&self) -> bool {
        self.last.is_some()
    }
}

const DOM_DELTA_PIXEL: u32 = 0;
const DOM_DELTA_LINE: u32 = 1;

/// Wheel delta to zoom steps; positive zooms out.
pub fn wheel_steps(delta_y: f64, delta_mode: u32) -> f32 {
    let steps = match delta_mode {
        DOM_DELTA_PIXEL => delta_y / 100.0,
        DOM_DELTA_LINE => delta_y / 3.0,
        _ => delta_y,
    };
    (steps as f32).clamp(-3.0, 3.0)
}
