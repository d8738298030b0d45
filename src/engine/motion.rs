//! Procedural motion: continuous orbits driven by actor metadata.
//!
//! Runs after the timeline every frame, so an actor that declares both
//! `orbit_radius` and `orbit_speed` ends the frame on its procedural orbit
//! even if a timeline `orbit` event touched it first.

use super::actors::ActorRegistry;
use super::FrameStage;

/// Place every orbiting actor at `angle = t * orbit_speed` on its circle.
/// Height (Y) is left as staged.
pub fn apply_procedural_motion(t: f32, registry: &ActorRegistry, stage: &mut FrameStage) {
    for (index, actor) in registry.iter().enumerate() {
        let Some(orbit) = actor.orbit() else {
            continue;
        };
        if let Some(transform) = stage.get_mut(index) {
            let angle = t * orbit.speed;
            transform.position.x = angle.cos() * orbit.radius;
            transform.position.z = angle.sin() * orbit.radius;
        }
    }
}
