//! Source animation types — the declarative input format.
//!
//! These types describe *what exists* and *when it changes*, not how it is
//! drawn. Deserialization is deliberately lenient: definitions are usually
//! machine-generated, so short vectors, integer seconds, color names and
//! unknown fields are all accepted, and `null` or malformed optional values
//! fall back to their defaults.

use std::collections::BTreeMap;
use std::fmt;

use glam::{Vec2, Vec3};
use serde::de::{self, DeserializeOwned, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::Result;
use crate::types::Color;

// Re-export so every input type stays reachable via `engine::source::*`.
pub use super::actors::{ActorDefinition, ActorKind};
pub use super::easing::Easing;
pub use super::timeline::{PropertyAssignment, PropertyChange, PropertyKey};

const DEFAULT_DURATION: f32 = 10.0;
const DEFAULT_FOV: f32 = 75.0;

#[derive(Debug, Clone, Deserialize)]
pub struct AnimationDefinition {
    /// Scene label such as `solar_system`; informational only.
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub scene: Option<String>,
    #[serde(default = "default_duration", deserialize_with = "deserialize_duration")]
    pub duration: f32,
    #[serde(default = "default_loop", rename = "loop", deserialize_with = "deserialize_loop")]
    pub looping: bool,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub actors: Vec<ActorDefinition>,
    #[serde(default)]
    pub camera: Option<CameraDefinition>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub timeline: Vec<TimelineEvent>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub annotations: Vec<Annotation>,
}

fn default_duration() -> f32 {
    DEFAULT_DURATION
}

fn default_loop() -> bool {
    true
}

fn deserialize_duration<'de, D>(d: D) -> std::result::Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_number(d)?.unwrap_or(DEFAULT_DURATION))
}

fn deserialize_loop<'de, D>(d: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_lenient(d)?.unwrap_or(true))
}

impl AnimationDefinition {
    /// Parse a definition document.
    ///
    /// Accepts either a bare definition or the generator's response envelope
    /// `{ "text": …, "animation_instructions": { … } }`.
    pub fn from_json(json: &str) -> Result<AnimationDefinition> {
        let value: Value = serde_json::from_str(json)?;
        let mut definition: AnimationDefinition = match value {
            Value::Object(mut map) if map.contains_key("animation_instructions") => {
                let inner = map.remove("animation_instructions").unwrap_or(Value::Null);
                serde_json::from_value(inner)?
            }
            // Re-parse from text so errors carry line/column positions.
            _ => serde_json::from_str(json)?,
        };
        definition.sanitize();
        Ok(definition)
    }

    fn sanitize(&mut self) {
        if !self.duration.is_finite() || self.duration < 0.0 {
            log::warn!(
                "Invalid animation duration {}, using {DEFAULT_DURATION}s",
                self.duration
            );
            self.duration = DEFAULT_DURATION;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraDefinition {
    #[serde(default = "default_camera_position", deserialize_with = "deserialize_camera_position")]
    pub position: Vec3,
    #[serde(default, deserialize_with = "deserialize_point")]
    pub target: Vec3,
    #[serde(default = "default_fov", deserialize_with = "deserialize_fov")]
    pub fov: f32,
    /// Actor whose position the camera keeps looking at.
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub follow_actor: Option<String>,
}

fn default_camera_position() -> Vec3 {
    Vec3::new(0.0, 0.0, 10.0)
}

fn default_fov() -> f32 {
    DEFAULT_FOV
}

fn deserialize_camera_position<'de, D>(d: D) -> std::result::Result<Vec3, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_lenient::<D, LenientPoint>(d)?.map_or_else(default_camera_position, |p| p.0))
}

fn deserialize_fov<'de, D>(d: D) -> std::result::Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_number(d)?.unwrap_or(DEFAULT_FOV))
}

impl Default for CameraDefinition {
    fn default() -> Self {
        CameraDefinition {
            position: default_camera_position(),
            target: Vec3::ZERO,
            fov: DEFAULT_FOV,
            follow_actor: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimelineEvent {
    #[serde(default, deserialize_with = "deserialize_time")]
    pub time: f32,
    #[serde(default = "default_event_duration", deserialize_with = "deserialize_event_duration")]
    pub duration: f32,
    #[serde(default, deserialize_with = "deserialize_easing")]
    pub easing: Easing,
    #[serde(default, deserialize_with = "super::timeline::deserialize_properties")]
    pub properties: Vec<PropertyAssignment>,
}

fn default_event_duration() -> f32 {
    1.0
}

fn deserialize_event_duration<'de, D>(d: D) -> std::result::Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_number(d)?.unwrap_or_else(default_event_duration))
}

/// Unknown names and non-string values ease linearly.
fn deserialize_easing<'de, D>(d: D) -> std::result::Result<Easing, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_lenient(d)?.unwrap_or_default())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Annotation {
    pub text: String,
    #[serde(default, deserialize_with = "deserialize_time")]
    pub time: f32,
    #[serde(
        default = "default_annotation_duration",
        deserialize_with = "deserialize_annotation_duration"
    )]
    pub duration: f32,
    /// Pixel offset of the overlay from the top-left of the view.
    #[serde(default, deserialize_with = "deserialize_offset")]
    pub position: Option<Vec2>,
    /// Presentation hints passed through to the overlay untouched.
    #[serde(default, deserialize_with = "deserialize_lenient_or_default")]
    pub style: BTreeMap<String, Value>,
}

fn default_annotation_duration() -> f32 {
    3.0
}

fn deserialize_annotation_duration<'de, D>(d: D) -> std::result::Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_number(d)?.unwrap_or_else(default_annotation_duration))
}

fn deserialize_time<'de, D>(d: D) -> std::result::Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_number(d)?.unwrap_or(0.0))
}

// ---------------------------------------------------------------------------
// Null-tolerant field deserializers
// ---------------------------------------------------------------------------

/// Read a field as any JSON value and keep it only if it converts to `T`.
///
/// `null` reads as `None`. Malformed content also reads as `None`, with a
/// warning, so one bad field never rejects the whole definition.
pub fn deserialize_lenient<'de, D, T>(d: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(d)?;
    if value.is_null() {
        return Ok(None);
    }
    match T::deserialize(&value) {
        Ok(v) => Ok(Some(v)),
        Err(e) => {
            log::warn!("Ignoring malformed value {value} ({e}), using the default");
            Ok(None)
        }
    }
}

/// Like [`deserialize_lenient`], resolving to `T::default()`.
pub fn deserialize_lenient_or_default<'de, D, T>(d: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(deserialize_lenient(d)?.unwrap_or_default())
}

/// `null` reads as `T::default()`; anything else must be well formed.
///
/// Used for lists, where one bad element should surface rather than
/// silently empty the list.
pub fn deserialize_nullable<'de, D, T>(d: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Numbers, including numeric strings like `"2.5"`.
pub fn deserialize_number<'de, D>(d: D) -> std::result::Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(d)?;
    let number = match &value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number.map(|n| n as f32).filter(|n| n.is_finite()) {
        Some(n) => Ok(Some(n)),
        None => {
            log::warn!("Ignoring malformed number {value}, using the default");
            Ok(None)
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient vector and color deserializers
// ---------------------------------------------------------------------------

/// Accepts `[x, y, z]` (shorter arrays are filled), a single number
/// (broadcast to all components), or `{"x":…, "y":…, "z":…}`.
struct Vec3Visitor {
    fill: f32,
}

impl<'de> Visitor<'de> for Vec3Visitor {
    type Value = Vec3;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number, an array of up to three numbers, or an {x, y, z} object")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Vec3, E> {
        Ok(Vec3::splat(v as f32))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Vec3, E> {
        Ok(Vec3::splat(v as f32))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Vec3, E> {
        Ok(Vec3::splat(v as f32))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Vec3, A::Error> {
        let mut out = Vec3::splat(self.fill);
        let mut i = 0;
        while let Some(component) = seq.next_element::<f32>()? {
            if i < 3 {
                out[i] = component;
            }
            i += 1;
        }
        Ok(out)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Vec3, A::Error> {
        let mut out = Vec3::splat(self.fill);
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "x" => out.x = map.next_value()?,
                "y" => out.y = map.next_value()?,
                "z" => out.z = map.next_value()?,
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(out)
    }
}

/// Positions, rotations and targets: missing components are zero.
pub fn deserialize_point<'de, D>(d: D) -> std::result::Result<Vec3, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_lenient::<D, LenientPoint>(d)?.map_or(Vec3::ZERO, |p| p.0))
}

/// Scales: missing components are one.
pub fn deserialize_scale<'de, D>(d: D) -> std::result::Result<Vec3, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_lenient::<D, LenientScale>(d)?.map_or(Vec3::ONE, |s| s.0))
}

/// A point in any of the accepted shapes. Missing components are zero;
/// malformed input is an error, not a default.
#[derive(Debug, Clone, Copy)]
pub struct LenientPoint(pub Vec3);

impl<'de> Deserialize<'de> for LenientPoint {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        d.deserialize_any(Vec3Visitor { fill: 0.0 }).map(LenientPoint)
    }
}

struct LenientScale(Vec3);

impl<'de> Deserialize<'de> for LenientScale {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        d.deserialize_any(Vec3Visitor { fill: 1.0 }).map(LenientScale)
    }
}

fn deserialize_offset<'de, D>(d: D) -> std::result::Result<Option<Vec2>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_lenient::<D, LenientPoint>(d)?.map(|p| p.0.truncate()))
}

pub fn deserialize_points<'de, D>(d: D) -> std::result::Result<Vec<Vec3>, D::Error>
where
    D: Deserializer<'de>,
{
    let points: Vec<LenientPoint> = deserialize_lenient_or_default(d)?;
    Ok(points.into_iter().map(|p| p.0).collect())
}

/// Accepts a color string (`#rrggbb`, `#rgb`, a basic name) or an
/// `{r, g, b}` object. Unparseable strings degrade to white.
struct ColorVisitor;

impl<'de> Visitor<'de> for ColorVisitor {
    type Value = Option<Color>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a color string or an {r, g, b} object")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Option<Color>, E> {
        Ok(Some(Color::parse(v).unwrap_or_else(|| {
            log::warn!("Unrecognized color '{v}', using white");
            Color::WHITE
        })))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Option<Color>, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Option<Color>, E> {
        Ok(None)
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> std::result::Result<Option<Color>, A::Error> {
        Color::deserialize(de::value::MapAccessDeserializer::new(map)).map(Some)
    }
}

struct LenientColor(Option<Color>);

impl<'de> Deserialize<'de> for LenientColor {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        d.deserialize_any(ColorVisitor).map(LenientColor)
    }
}

pub fn deserialize_color<'de, D>(d: D) -> std::result::Result<Color, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_optional_color(d)?.unwrap_or_default())
}

pub fn deserialize_optional_color<'de, D>(d: D) -> std::result::Result<Option<Color>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_lenient::<D, LenientColor>(d)?.and_then(|c| c.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "deserialize_point")]
        p: Vec3,
        #[serde(default = "one", deserialize_with = "deserialize_scale")]
        s: Vec3,
    }

    fn one() -> Vec3 {
        Vec3::ONE
    }

    #[test]
    fn short_arrays_are_filled() {
        let probe: Probe = serde_json::from_str(r#"{"p": [1, 2], "s": [2]}"#).unwrap();
        assert_eq!(probe.p, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(probe.s, Vec3::new(2.0, 1.0, 1.0));
    }

    #[test]
    fn object_and_scalar_forms() {
        let probe: Probe = serde_json::from_str(r#"{"p": {"x": 1, "z": 3}, "s": 2}"#).unwrap();
        assert_eq!(probe.p, Vec3::new(1.0, 0.0, 3.0));
        assert_eq!(probe.s, Vec3::splat(2.0));
    }

    #[test]
    fn envelope_is_unwrapped() {
        let json = r#"{
            "text": "Earth orbits the sun",
            "animation_instructions": { "duration": 4, "loop": false }
        }"#;
        let def = AnimationDefinition::from_json(json).unwrap();
        assert_eq!(def.duration, 4.0);
        assert!(!def.looping);
    }

    #[test]
    fn defaults_apply_to_empty_document() {
        let def = AnimationDefinition::from_json("{}").unwrap();
        assert_eq!(def.duration, 10.0);
        assert!(def.looping);
        assert!(def.actors.is_empty());
        assert!(def.camera.is_none());
    }

    #[test]
    fn negative_duration_is_replaced() {
        let def = AnimationDefinition::from_json(r#"{"duration": -2}"#).unwrap();
        assert_eq!(def.duration, 10.0);
    }
}
