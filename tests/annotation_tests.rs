//! Annotation Visibility Tests
//!
//! Tests for:
//! - Time windows (inclusive at both ends)
//! - Fade-in opacity
//! - Adapter notifications for annotation views

mod common;

use common::{approx, load};
use scene_animator::engine::annotations::{annotation_views, FADE_IN_SECONDS};
use scene_animator::engine::source::Annotation;
use scene_animator::renderer::AdapterCall;
use scene_animator::types::AnnotationView;

fn annotation(json: &str) -> Annotation {
    serde_json::from_str(json).expect("annotation should parse")
}

// ============================================================================
// Windows and opacity
// ============================================================================

#[test]
fn hidden_outside_window() {
    let a = annotation(r#"{"text": "Earth", "time": 1, "duration": 2}"#);
    assert_eq!(a.view_at(0.99), AnnotationView::HIDDEN);
    assert_eq!(a.view_at(3.01), AnnotationView::HIDDEN);
    assert!(a.view_at(1.0).visible);
    assert!(a.view_at(3.0).visible, "end of window is inclusive");
}

#[test]
fn opacity_fades_in_then_holds() {
    let a = annotation(r#"{"text": "Earth", "time": 1, "duration": 5}"#);
    assert!(approx(a.view_at(1.0).opacity, 0.0));
    assert!(approx(a.view_at(1.1).opacity, 0.2));
    assert!(approx(a.view_at(1.0 + FADE_IN_SECONDS).opacity, 1.0));
    assert!(approx(a.view_at(1.5).opacity, 1.0));
    assert!(approx(a.view_at(4.0).opacity, 1.0));
}

#[test]
fn annotation_defaults() {
    let a = annotation(r#"{"text": "hello"}"#);
    assert!(approx(a.time, 0.0));
    assert!(approx(a.duration, 3.0));
    assert!(a.position.is_none());
    assert!(a.style.is_empty());
}

#[test]
fn views_are_indexed_like_the_input() {
    let list = vec![
        annotation(r#"{"text": "a", "time": 0, "duration": 1}"#),
        annotation(r#"{"text": "b", "time": 5, "duration": 1}"#),
    ];
    let views = annotation_views(&list, 0.75);
    assert_eq!(views.len(), 2);
    assert!(views[0].visible);
    assert!(!views[1].visible);
}

// ============================================================================
// Engine integration
// ============================================================================

const TWO_NOTES: &str = r#"{
    "annotations": [
        {"text": "first", "time": 0, "duration": 2},
        {"text": "second", "time": 3, "duration": 1, "position": {"x": 40, "y": 16}}
    ]
}"#;

#[test]
fn annotations_are_registered_at_load() {
    let (engine, adapter) = load(TWO_NOTES);
    let created: Vec<_> = adapter
        .calls()
        .iter()
        .filter_map(|c| match c {
            AdapterCall::CreateAnnotation { index, text } => Some((*index, text.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(created, [(0, "first"), (1, "second")]);
    assert!(engine.annotation_views().iter().all(|v| !v.visible));
}

#[test]
fn adapter_sees_current_views() {
    let (mut engine, mut adapter) = load(TWO_NOTES);

    engine.evaluate(1.0, &mut adapter).unwrap();
    assert_eq!(
        adapter.annotation(0),
        Some(AnnotationView {
            visible: true,
            opacity: 1.0
        })
    );

    engine.evaluate(3.25, &mut adapter).unwrap();
    assert_eq!(adapter.annotation(0), Some(AnnotationView::HIDDEN));
    let second = adapter.annotation(1).unwrap();
    assert!(second.visible);
    assert!(approx(second.opacity, 0.5));
    assert_eq!(engine.annotation_views()[1], second);
}

#[test]
fn unchanged_views_are_not_resent() {
    let (mut engine, mut adapter) = load(TWO_NOTES);
    engine.evaluate(1.0, &mut adapter).unwrap();
    adapter.clear_calls();
    engine.evaluate(1.5, &mut adapter).unwrap();
    assert!(
        !adapter
            .calls()
            .iter()
            .any(|c| matches!(c, AdapterCall::UpdateAnnotation { .. }))
    );
}
