//! Annotation visibility: time-windowed overlays with a fixed fade-in.

use crate::types::AnnotationView;

use super::source::Annotation;

/// Seconds from show time to full opacity.
pub const FADE_IN_SECONDS: f32 = 0.5;

impl Annotation {
    /// Inclusive at both ends.
    pub fn is_visible(&self, t: f32) -> bool {
        self.time <= t && t <= self.time + self.duration
    }

    /// Visibility and opacity at clock `t`. Hidden annotations are fully
    /// hidden, not merely transparent.
    pub fn view_at(&self, t: f32) -> AnnotationView {
        if !self.is_visible(t) {
            return AnnotationView::HIDDEN;
        }
        AnnotationView {
            visible: true,
            opacity: ((t - self.time) / FADE_IN_SECONDS).min(1.0),
        }
    }
}

/// Views for every annotation, indexed like the input list.
pub fn annotation_views(annotations: &[Annotation], t: f32) -> Vec<AnnotationView> {
    annotations.iter().map(|a| a.view_at(t)).collect()
}
