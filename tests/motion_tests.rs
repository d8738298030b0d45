//! Procedural Motion Tests
//!
//! Tests for:
//! - Continuous orbits from `orbit_radius` / `orbit_speed` metadata
//! - Height preservation
//! - Precedence over timeline writes

mod common;

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec3;

use common::{approx, approx_vec3, load, position_of};

const ORBITER: &str = r#"{
    "actors": [
        {"id": "sun", "type": "sphere", "radius": 2},
        {"id": "earth", "type": "sphere", "position": [0, 0.5, 0],
         "orbit_radius": 3, "orbit_speed": 1}
    ]
}"#;

// ============================================================================
// Orbit placement
// ============================================================================

#[test]
fn orbit_starts_on_positive_x() {
    let (mut engine, mut adapter) = load(ORBITER);
    engine.evaluate(0.0, &mut adapter).unwrap();
    assert!(approx_vec3(position_of(&engine, "earth"), Vec3::new(3.0, 0.5, 0.0)));
}

#[test]
fn orbit_angle_is_time_times_speed() {
    let (mut engine, mut adapter) = load(ORBITER);

    engine.evaluate(FRAC_PI_2, &mut adapter).unwrap();
    assert!(approx_vec3(position_of(&engine, "earth"), Vec3::new(0.0, 0.5, 3.0)));

    engine.evaluate(PI, &mut adapter).unwrap();
    assert!(approx_vec3(position_of(&engine, "earth"), Vec3::new(-3.0, 0.5, 0.0)));
}

#[test]
fn orbit_keeps_height_and_radius() {
    let (mut engine, mut adapter) = load(ORBITER);
    for i in 0..20 {
        engine.evaluate(i as f32 * 0.37, &mut adapter).unwrap();
        let p = position_of(&engine, "earth");
        assert!(approx(p.y, 0.5));
        assert!(approx(p.x.hypot(p.z), 3.0));
    }
}

#[test]
fn partial_orbit_metadata_is_inert() {
    let (mut engine, mut adapter) = load(
        r#"{"actors": [
            {"id": "a", "type": "sphere", "position": [1, 1, 1], "orbit_radius": 3},
            {"id": "b", "type": "sphere", "position": [2, 2, 2], "orbit_speed": 1}
        ]}"#,
    );
    engine.evaluate(1.0, &mut adapter).unwrap();
    assert!(approx_vec3(position_of(&engine, "a"), Vec3::ONE));
    assert!(approx_vec3(position_of(&engine, "b"), Vec3::splat(2.0)));
}

#[test]
fn non_orbiting_actors_are_untouched() {
    let (mut engine, mut adapter) = load(ORBITER);
    engine.evaluate(2.0, &mut adapter).unwrap();
    assert!(approx_vec3(position_of(&engine, "sun"), Vec3::ZERO));
}

// ============================================================================
// Interaction with the timeline
// ============================================================================

#[test]
fn procedural_orbit_overrides_timeline_orbit() {
    let (mut engine, mut adapter) = load(
        r#"{
            "actors": [{"id": "earth", "type": "sphere", "orbit_radius": 3, "orbit_speed": 1}],
            "timeline": [{"time": 0, "duration": 10, "properties": {"earth_orbit": 180}}]
        }"#,
    );
    engine.evaluate(0.0, &mut adapter).unwrap();
    // The timeline alone would leave the actor at (3, 0, 0) too, so check a
    // time where the two disagree.
    engine.evaluate(FRAC_PI_2, &mut adapter).unwrap();
    assert!(approx_vec3(position_of(&engine, "earth"), Vec3::new(0.0, 0.0, 3.0)));
}

#[test]
fn timeline_height_survives_procedural_orbit() {
    let (mut engine, mut adapter) = load(
        r#"{
            "actors": [{"id": "earth", "type": "sphere", "orbit_radius": 2, "orbit_speed": 1}],
            "timeline": [{"time": 0, "duration": 1, "properties": {"earth_position": [0, 4, 0]}}]
        }"#,
    );
    engine.evaluate(1.0, &mut adapter).unwrap();
    let p = position_of(&engine, "earth");
    assert!(approx(p.y, 4.0));
    assert!(approx_vec3(p, Vec3::new(1.0f32.cos() * 2.0, 4.0, 1.0f32.sin() * 2.0)));
}
