//! Timeline scheduler.
//!
//! Timeline events are not one-shot: every frame, each event whose window
//! contains the clock is re-evaluated from scratch. The mutation an event
//! makes is a pure function of the event and the clock value, so evaluating
//! the same time twice produces the same stage.

use std::fmt;

use glam::Vec3;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;

use crate::types::Transform;

use super::actors::ActorRegistry;
use super::source::{LenientPoint, TimelineEvent};
use super::FrameStage;

/// Separator between actor id and property name in string keys.
pub const KEY_SEPARATOR: char = '_';

/// Orbit radius used when a timeline orbit targets an actor without one.
pub const DEFAULT_ORBIT_RADIUS: f32 = 3.0;

/// Structured property address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyKey {
    pub actor_id: String,
    pub property: String,
}

impl PropertyKey {
    /// Split `"<actorId>_<property>"` at the first separator.
    ///
    /// Actor ids containing the separator cannot be addressed this way; use
    /// the structured `{actor, property, value}` form for those.
    pub fn parse(key: &str) -> Option<PropertyKey> {
        let (actor_id, property) = key.split_once(KEY_SEPARATOR)?;
        if actor_id.is_empty() || property.is_empty() {
            return None;
        }
        Some(PropertyKey {
            actor_id: actor_id.to_string(),
            property: property.to_string(),
        })
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{KEY_SEPARATOR}{}", self.actor_id, self.property)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyChange {
    /// Target orbit angle in degrees around the world Y axis.
    Orbit { degrees: f32 },
    /// Target yaw in degrees.
    Rotation { degrees: f32 },
    /// Target position, reached from the origin.
    Position(Vec3),
    /// Unknown property or malformed value; evaluates to nothing.
    Ignored,
}

impl PropertyChange {
    fn from_value(key: &PropertyKey, value: &Value) -> PropertyChange {
        let change = match key.property.as_str() {
            "orbit" => value.as_f64().map(|v| PropertyChange::Orbit { degrees: v as f32 }),
            "rotation" => value
                .as_f64()
                .map(|v| PropertyChange::Rotation { degrees: v as f32 }),
            "position" => LenientPoint::deserialize(value)
                .ok()
                .map(|p| PropertyChange::Position(p.0)),
            other => {
                log::warn!("Ignoring unsupported property '{other}' in key '{key}'");
                return PropertyChange::Ignored;
            }
        };
        change.unwrap_or_else(|| {
            log::warn!("Ignoring malformed value {value} for '{key}'");
            PropertyChange::Ignored
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAssignment {
    pub key: PropertyKey,
    pub change: PropertyChange,
}

impl PropertyAssignment {
    pub fn new(key: PropertyKey, value: &Value) -> Self {
        let change = PropertyChange::from_value(&key, value);
        PropertyAssignment { key, change }
    }
}

// ---------------------------------------------------------------------------
// Deserialization of `properties`
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct StructuredAssignment {
    actor: String,
    property: String,
    #[serde(default)]
    value: Value,
}

/// Accepts either a `{"<actorId>_<property>": value}` map or a list of
/// `{"actor", "property", "value"}` objects. Declaration order is kept.
struct PropertiesVisitor;

impl<'de> Visitor<'de> for PropertiesVisitor {
    type Value = Vec<PropertyAssignment>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a property map or a list of {actor, property, value} objects")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut out = Vec::new();
        while let Some((raw, value)) = map.next_entry::<String, Value>()? {
            match PropertyKey::parse(&raw) {
                Some(key) => out.push(PropertyAssignment::new(key, &value)),
                None => log::warn!("Ignoring malformed property key '{raw}'"),
            }
        }
        Ok(out)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut out = Vec::new();
        while let Some(entry) = seq.next_element::<StructuredAssignment>()? {
            let key = PropertyKey {
                actor_id: entry.actor,
                property: entry.property,
            };
            out.push(PropertyAssignment::new(key, &entry.value));
        }
        Ok(out)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }
}

pub(crate) fn deserialize_properties<'de, D>(d: D) -> Result<Vec<PropertyAssignment>, D::Error>
where
    D: Deserializer<'de>,
{
    d.deserialize_any(PropertiesVisitor)
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

impl TimelineEvent {
    /// Inclusive at both ends.
    pub fn is_active(&self, t: f32) -> bool {
        self.time <= t && t <= self.time + self.duration
    }

    /// Linear progress through the window; `1` for zero-length events.
    pub fn progress(&self, t: f32) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (t - self.time) / self.duration
    }
}

/// Apply every active event at time `t` onto `stage`, in declaration order.
pub fn apply_timeline(
    events: &[TimelineEvent],
    t: f32,
    registry: &ActorRegistry,
    stage: &mut FrameStage,
) {
    for event in events.iter().filter(|e| e.is_active(t)) {
        let eased = event.easing.apply(event.progress(t));
        for assignment in &event.properties {
            let Some(index) = registry.index_of(&assignment.key.actor_id) else {
                log::debug!("Timeline key '{}' names no actor", assignment.key);
                continue;
            };
            let orbit_radius = registry
                .at(index)
                .and_then(|a| a.orbit_radius())
                .unwrap_or(DEFAULT_ORBIT_RADIUS);
            if let Some(transform) = stage.get_mut(index) {
                apply_change(&assignment.change, eased, orbit_radius, transform);
            }
        }
    }
}

fn apply_change(
    change: &PropertyChange,
    eased: f32,
    orbit_radius: f32,
    transform: &mut Transform,
) {
    match change {
        PropertyChange::Orbit { degrees } => {
            let angle = (degrees * eased).to_radians();
            transform.position.x = angle.cos() * orbit_radius;
            transform.position.z = angle.sin() * orbit_radius;
        }
        PropertyChange::Rotation { degrees } => {
            transform.rotation.y = (degrees * eased).to_radians();
        }
        PropertyChange::Position(target) => {
            transform.position = *target * eased;
        }
        PropertyChange::Ignored => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_splits_at_first_separator() {
        let key = PropertyKey::parse("earth_orbit").unwrap();
        assert_eq!(key.actor_id, "earth");
        assert_eq!(key.property, "orbit");

        let key = PropertyKey::parse("co2_particles_position").unwrap();
        assert_eq!(key.actor_id, "co2");
        assert_eq!(key.property, "particles_position");
    }

    #[test]
    fn key_without_separator_is_rejected() {
        assert!(PropertyKey::parse("earth").is_none());
        assert!(PropertyKey::parse("_orbit").is_none());
        assert!(PropertyKey::parse("earth_").is_none());
    }

    #[test]
    fn malformed_values_are_ignored() {
        let key = PropertyKey::parse("earth_orbit").unwrap();
        let a = PropertyAssignment::new(key, &Value::String("fast".into()));
        assert_eq!(a.change, PropertyChange::Ignored);
    }
}
