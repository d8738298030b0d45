//! Renderer — the capability the engine draws through.
//!
//! The engine never rasterizes anything itself. It creates primitives,
//! moves them, and asks for a frame through `RenderAdapter`; an adapter may
//! be a GPU scene graph, a terminal, or an in-memory recorder.

pub mod recording;
pub mod terminal;

use crate::engine::source::Annotation;
use crate::errors::Result;
use crate::types::{AnnotationView, CameraState, PrimitiveHandle, PrimitiveSpec, Transform};

pub use recording::{AdapterCall, RecordingAdapter};
pub use terminal::TerminalAdapter;

pub trait RenderAdapter {
    /// Create a primitive and return the handle the engine will address it by.
    fn create_primitive(&mut self, spec: &PrimitiveSpec) -> Result<PrimitiveHandle>;

    fn set_transform(&mut self, handle: PrimitiveHandle, transform: &Transform) -> Result<()>;

    /// Draw the current state of every primitive and overlay.
    fn render_frame(&mut self) -> Result<()>;

    fn destroy_primitive(&mut self, _handle: PrimitiveHandle) -> Result<()> {
        Ok(())
    }

    fn set_camera(&mut self, _camera: &CameraState) -> Result<()> {
        Ok(())
    }

    /// Register the overlay for annotation `index` (0-based, input order).
    /// Overlays start hidden.
    fn create_annotation(&mut self, _index: usize, _annotation: &Annotation) -> Result<()> {
        Ok(())
    }

    fn update_annotation(&mut self, _index: usize, _view: AnnotationView) -> Result<()> {
        Ok(())
    }
}
