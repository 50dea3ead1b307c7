//! Seams between the lifecycle controller and its environment.

use crate::buffers::RenderBuffers;
use crate::error::RenderError;
use glam::{Mat4, Vec3};
use std::time::Duration;

/// Side effects the controller asks of its host page/window.
///
/// Hosts own the actual timers and display-refresh callbacks; the controller
/// decides when they start and stop.
pub trait Host {
    /// Begin calling [`crate::HeartBeat::frame`] once per display refresh.
    fn start_frame_loop(&mut self);
    fn stop_frame_loop(&mut self);
    /// One-shot; fires [`crate::HeartBeat::on_completion_timer`] after `after`.
    fn start_completion_timer(&mut self, after: Duration);
    fn cancel_completion_timer(&mut self);
    /// Host-side teardown (DOM nodes, listeners, window handles).
    fn release_resources(&mut self);
    /// The external zero-argument completion callback.
    fn notify_complete(&mut self);
}

/// Geometry the renderer must size its buffers for, known once the mesh is in.
#[derive(Debug, Clone, Copy)]
pub struct SceneLayout<'a> {
    pub mesh_indices: &'a [u32],
    pub mesh_vertex_count: usize,
    pub point_capacity: usize,
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub mesh_vertices: &'a [Vec3],
    pub buffers: &'a RenderBuffers,
    pub view_proj: Mat4,
    pub camera_right: Vec3,
    pub camera_up: Vec3,
}

/// Something that can put a frame on screen.
pub trait FrameSink {
    fn prepare(&mut self, layout: &SceneLayout<'_>) -> Result<(), RenderError>;
    fn draw(&mut self, view: &FrameView<'_>) -> Result<(), RenderError>;
    fn resize(&mut self, width: u32, height: u32);
    /// Frees GPU buffers; later draws fail with [`RenderError::NoSurface`].
    fn release(&mut self);
}

/// A renderer that may not exist yet (adapter still pending) or any more.
impl<S: FrameSink> FrameSink for Option<S> {
    fn prepare(&mut self, layout: &SceneLayout<'_>) -> Result<(), RenderError> {
        match self {
            Some(s) => s.prepare(layout),
            None => Err(RenderError::NoSurface),
        }
    }

    fn draw(&mut self, view: &FrameView<'_>) -> Result<(), RenderError> {
        match self {
            Some(s) => s.draw(view),
            None => Err(RenderError::NoSurface),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if let Some(s) = self {
            s.resize(width, height);
        }
    }

    fn release(&mut self) {
        if let Some(mut s) = self.take() {
            s.release();
        }
    }
}
