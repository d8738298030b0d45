//! In-memory adapter that records every call it receives.
//!
//! Used for headless runs (`trace`, `check`) and by the test suite.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::engine::source::Annotation;
use crate::errors::{AnimatorError, Result};
use crate::types::{AnnotationView, CameraState, PrimitiveHandle, PrimitiveSpec, Transform};

use super::RenderAdapter;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum AdapterCall {
    CreatePrimitive { handle: PrimitiveHandle, spec: PrimitiveSpec },
    SetTransform { handle: PrimitiveHandle, transform: Transform },
    DestroyPrimitive { handle: PrimitiveHandle },
    SetCamera { camera: CameraState },
    CreateAnnotation { index: usize, text: String },
    UpdateAnnotation { index: usize, view: AnnotationView },
    RenderFrame,
}

#[derive(Debug, Clone)]
pub struct RecordedPrimitive {
    pub spec: PrimitiveSpec,
    pub transform: Transform,
}

#[derive(Debug, Default)]
pub struct RecordingAdapter {
    calls: Vec<AdapterCall>,
    primitives: BTreeMap<PrimitiveHandle, RecordedPrimitive>,
    annotations: BTreeMap<usize, AnnotationView>,
    camera: Option<CameraState>,
    frames_rendered: u64,
    next_handle: u64,
    /// Successful `create_primitive` calls left before every further one fails.
    creates_before_failure: Option<usize>,
    fail_on_annotation: bool,
}

impl RecordingAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// An adapter whose `create_primitive` always fails, standing in for a
    /// backend that could not initialise.
    pub fn failing() -> Self {
        Self::failing_after(0)
    }

    /// An adapter that creates `n` primitives, then fails.
    pub fn failing_after(n: usize) -> Self {
        RecordingAdapter {
            creates_before_failure: Some(n),
            ..Self::default()
        }
    }

    /// An adapter that cannot create annotation overlays.
    pub fn without_overlays() -> Self {
        RecordingAdapter {
            fail_on_annotation: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> &[AdapterCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn primitive(&self, handle: PrimitiveHandle) -> Option<&RecordedPrimitive> {
        self.primitives.get(&handle)
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    pub fn annotation(&self, index: usize) -> Option<AnnotationView> {
        self.annotations.get(&index).copied()
    }

    pub fn camera(&self) -> Option<&CameraState> {
        self.camera.as_ref()
    }
}

impl RenderAdapter for RecordingAdapter {
    fn create_primitive(&mut self, spec: &PrimitiveSpec) -> Result<PrimitiveHandle> {
        match &mut self.creates_before_failure {
            Some(0) => return Err(AnimatorError::Render("no render target available".into())),
            Some(left) => *left -= 1,
            None => {}
        }
        let handle = PrimitiveHandle(self.next_handle);
        self.next_handle += 1;
        self.primitives.insert(
            handle,
            RecordedPrimitive {
                spec: spec.clone(),
                transform: Transform::default(),
            },
        );
        self.calls.push(AdapterCall::CreatePrimitive {
            handle,
            spec: spec.clone(),
        });
        Ok(handle)
    }

    fn set_transform(&mut self, handle: PrimitiveHandle, transform: &Transform) -> Result<()> {
        let primitive = self
            .primitives
            .get_mut(&handle)
            .ok_or(AnimatorError::UnknownPrimitive(handle.0))?;
        primitive.transform = *transform;
        self.calls.push(AdapterCall::SetTransform {
            handle,
            transform: *transform,
        });
        Ok(())
    }

    fn render_frame(&mut self) -> Result<()> {
        self.frames_rendered += 1;
        self.calls.push(AdapterCall::RenderFrame);
        Ok(())
    }

    fn destroy_primitive(&mut self, handle: PrimitiveHandle) -> Result<()> {
        self.primitives
            .remove(&handle)
            .ok_or(AnimatorError::UnknownPrimitive(handle.0))?;
        self.calls.push(AdapterCall::DestroyPrimitive { handle });
        Ok(())
    }

    fn set_camera(&mut self, camera: &CameraState) -> Result<()> {
        self.camera = Some(*camera);
        self.calls.push(AdapterCall::SetCamera { camera: *camera });
        Ok(())
    }

    fn create_annotation(&mut self, index: usize, annotation: &Annotation) -> Result<()> {
        if self.fail_on_annotation {
            return Err(AnimatorError::Render("overlays are not supported".into()));
        }
        self.annotations.insert(index, AnnotationView::HIDDEN);
        self.calls.push(AdapterCall::CreateAnnotation {
            index,
            text: annotation.text.clone(),
        });
        Ok(())
    }

    fn update_annotation(&mut self, index: usize, view: AnnotationView) -> Result<()> {
        self.annotations.insert(index, view);
        self.calls.push(AdapterCall::UpdateAnnotation { index, view });
        Ok(())
    }
}
