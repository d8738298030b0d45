//! Player Tests
//!
//! Tests for:
//! - Fixed-step clock advancement
//! - Looping and end-of-animation handling
//! - Cooperative frame requests across pause/play/stop
//! - Seeking

mod common;

use glam::Vec3;

use common::{approx, approx_vec3, load, position_of};
use scene_animator::player::{Clock, ClockMode, FrameOutcome, PlaybackState, Player};
use scene_animator::renderer::RecordingAdapter;

fn player(json: &str, step: f32) -> (Player, RecordingAdapter) {
    let (engine, adapter) = load(json);
    (Player::new(engine, ClockMode::Fixed(step)), adapter)
}

const LOOPING: &str = r#"{"duration": 10, "loop": true}"#;
const ONE_SHOT: &str = r#"{"duration": 1, "loop": false}"#;

// ============================================================================
// Clock
// ============================================================================

#[test]
fn fixed_clock_advances_by_step() {
    let mut clock = Clock::new(ClockMode::Fixed(0.25));
    assert!(approx(clock.advance(), 0.25));
    assert!(approx(clock.advance(), 0.5));
    clock.reset();
    assert!(approx(clock.time(), 0.0));
}

#[test]
fn realtime_clock_never_jumps_far() {
    let mut clock = Clock::new(ClockMode::RealTime);
    let first = clock.advance();
    assert!(first > 0.0 && first <= 0.25);
}

// ============================================================================
// Looping
// ============================================================================

#[test]
fn reaches_duration_then_loops_to_zero() {
    let (mut player, mut adapter) = player(LOOPING, 0.5);
    player.play();

    for _ in 0..20 {
        assert_eq!(player.on_frame(&mut adapter).unwrap(), FrameOutcome::Rendered);
    }
    assert!(approx(player.time(), 10.0));

    assert_eq!(player.on_frame(&mut adapter).unwrap(), FrameOutcome::Looped);
    assert!(approx(player.time(), 0.0));
    assert!(approx(player.engine().time(), 0.0));
    assert!(player.is_frame_requested());
    assert_eq!(player.state(), PlaybackState::Playing);
}

#[test]
fn looping_restarts_the_timeline() {
    let (mut player, mut adapter) = player(
        r#"{
            "duration": 2,
            "actors": [{"id": "box", "type": "cube"}],
            "timeline": [{"time": 0, "duration": 2, "properties": {"box_position": [4, 0, 0]}}]
        }"#,
        1.0,
    );
    player.play();
    player.on_frame(&mut adapter).unwrap();
    player.on_frame(&mut adapter).unwrap();
    assert!(approx_vec3(position_of(player.engine(), "box"), Vec3::new(4.0, 0.0, 0.0)));

    assert_eq!(player.on_frame(&mut adapter).unwrap(), FrameOutcome::Looped);
    assert!(approx_vec3(position_of(player.engine(), "box"), Vec3::ZERO));
}

// ============================================================================
// Non-looping playback
// ============================================================================

#[test]
fn one_shot_animation_finishes_and_pauses() {
    let (mut player, mut adapter) = player(ONE_SHOT, 0.5);
    player.play();

    assert_eq!(player.run_headless(&mut adapter, 100).unwrap(), 3);
    assert_eq!(player.state(), PlaybackState::Paused);
    assert!(!player.is_frame_requested());
    assert!(approx(player.engine().time(), 1.0), "last rendered frame is the end");
    assert_eq!(adapter.frames_rendered(), 2);

    assert_eq!(player.on_frame(&mut adapter).unwrap(), FrameOutcome::Idle);
    assert_eq!(adapter.frames_rendered(), 2);
}

#[test]
fn run_headless_respects_frame_limit() {
    let (mut player, mut adapter) = player(LOOPING, 0.5);
    player.play();
    assert_eq!(player.run_headless(&mut adapter, 7).unwrap(), 7);
    assert!(approx(player.time(), 3.5));
    assert!(player.is_frame_requested());
}

// ============================================================================
// Pause, stop and seek
// ============================================================================

#[test]
fn pause_is_observed_at_the_next_frame() {
    let (mut player, mut adapter) = player(LOOPING, 0.5);
    player.play();
    player.on_frame(&mut adapter).unwrap();
    let rendered = adapter.frames_rendered();

    player.pause();
    assert_eq!(player.state(), PlaybackState::Paused);
    assert!(player.is_frame_requested(), "the pending frame is not cancelled");

    assert_eq!(player.on_frame(&mut adapter).unwrap(), FrameOutcome::Idle);
    assert_eq!(adapter.frames_rendered(), rendered);
    assert!(!player.is_frame_requested());
    assert!(approx(player.time(), 0.5));
}

#[test]
fn play_after_pause_resumes_where_it_stopped() {
    let (mut player, mut adapter) = player(LOOPING, 0.5);
    player.play();
    player.on_frame(&mut adapter).unwrap();
    player.toggle();
    player.on_frame(&mut adapter).unwrap();
    player.toggle();
    assert_eq!(player.state(), PlaybackState::Playing);
    player.on_frame(&mut adapter).unwrap();
    assert!(approx(player.time(), 1.0));
}

#[test]
fn stop_rewinds() {
    let (mut player, mut adapter) = player(LOOPING, 0.5);
    player.play();
    player.run_headless(&mut adapter, 4).unwrap();

    player.stop();
    assert_eq!(player.state(), PlaybackState::Stopped);
    assert!(approx(player.time(), 0.0));

    player.play();
    player.on_frame(&mut adapter).unwrap();
    assert!(approx(player.time(), 0.5));
}

#[test]
fn seek_renders_without_starting_playback() {
    let (mut player, mut adapter) = player(
        r#"{
            "actors": [{"id": "box", "type": "cube"}],
            "timeline": [{"time": 0, "duration": 4, "properties": {"box_position": [8, 0, 0]}}]
        }"#,
        0.5,
    );
    player.seek(2.0, &mut adapter).unwrap();
    assert_eq!(player.state(), PlaybackState::Stopped);
    assert!(!player.is_frame_requested());
    assert_eq!(adapter.frames_rendered(), 1);
    assert!(approx_vec3(position_of(player.engine(), "box"), Vec3::new(4.0, 0.0, 0.0)));

    player.play();
    player.on_frame(&mut adapter).unwrap();
    assert!(approx(player.time(), 2.5));
}
