#![allow(dead_code)]

use glam::Vec3;

use scene_animator::engine::Engine;
use scene_animator::renderer::RecordingAdapter;

pub const EPSILON: f32 = 1e-4;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

/// Load `json` into a fresh engine backed by a recording adapter.
pub fn load(json: &str) -> (Engine, RecordingAdapter) {
    let mut adapter = RecordingAdapter::new();
    let engine = Engine::from_json(json, &mut adapter).expect("definition should load");
    (engine, adapter)
}

pub fn position_of(engine: &Engine, id: &str) -> Vec3 {
    engine
        .actor(id)
        .unwrap_or_else(|| panic!("actor '{id}' should be registered"))
        .transform
        .position
}
