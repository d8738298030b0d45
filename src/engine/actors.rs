//! Actor definitions and the actor registry.
//!
//! The registry owns every runtime actor for a session. Each actor wraps the
//! adapter primitive built from its definition, its committed transform, and
//! the definition itself so procedural motion can read metadata later.

use std::collections::HashMap;

use glam::Vec3;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::Result;
use crate::renderer::RenderAdapter;
use crate::types::{Color, Material, PrimitiveHandle, PrimitiveSpec, Shape, Transform};

use super::source::{
    deserialize_color, deserialize_lenient, deserialize_number, deserialize_optional_color,
    deserialize_point, deserialize_points, deserialize_scale,
};

#[derive(Debug, Clone, Deserialize)]
pub struct ActorDefinition {
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "deserialize_kind")]
    pub kind: ActorKind,

    // Geometry; which fields matter depends on `kind`. Malformed values
    // fall back to the kind's default.
    #[serde(default, deserialize_with = "deserialize_number")]
    pub radius: Option<f32>,
    #[serde(default, deserialize_with = "deserialize_number")]
    pub height: Option<f32>,
    #[serde(default, deserialize_with = "deserialize_number")]
    pub width: Option<f32>,
    #[serde(default, deserialize_with = "deserialize_number")]
    pub depth: Option<f32>,
    #[serde(default, deserialize_with = "deserialize_points")]
    pub points: Vec<Vec3>,
    #[serde(default, deserialize_with = "deserialize_number")]
    pub count: Option<f32>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub text_content: Option<String>,
    #[serde(default, deserialize_with = "deserialize_number")]
    pub font_size: Option<f32>,

    // Material
    #[serde(default, deserialize_with = "deserialize_color")]
    pub color: Color,
    #[serde(default, deserialize_with = "deserialize_number")]
    pub opacity: Option<f32>,
    #[serde(default, deserialize_with = "deserialize_optional_color")]
    pub emissive: Option<Color>,

    // Initial transform; rotation is in degrees.
    #[serde(default, deserialize_with = "deserialize_point")]
    pub position: Vec3,
    #[serde(default, deserialize_with = "deserialize_point")]
    pub rotation: Vec3,
    #[serde(default = "unit_scale", deserialize_with = "deserialize_scale")]
    pub scale: Vec3,

    /// Every other field of the actor object (`orbit_radius`, `orbit_speed`,
    /// `tilt`, `mass`, …).
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

impl ActorDefinition {
    /// Numeric metadata value, if present and numeric.
    pub fn metadata_f32(&self, key: &str) -> Option<f32> {
        self.metadata.get(key)?.as_f64().map(|v| v as f32)
    }

    fn material(&self) -> Material {
        Material {
            color: self.color,
            opacity: self.opacity.unwrap_or(1.0).clamp(0.0, 1.0),
            emissive: self.emissive,
        }
    }

    fn initial_transform(&self) -> Transform {
        let mut rotation = self.rotation;
        if let Some(tilt) = self.metadata_f32("tilt") {
            rotation.z = tilt;
        }
        Transform {
            position: self.position,
            rotation: Vec3::new(
                rotation.x.to_radians(),
                rotation.y.to_radians(),
                rotation.z.to_radians(),
            ),
            scale: self.scale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ActorKind {
    Sphere,
    Cube,
    Cylinder,
    Plane,
    Line,
    ParticleSystem,
    Text,
    /// Any type name the interpreter does not know; kept for diagnostics.
    Unknown(String),
}

/// Missing, `null` or non-string types become an unnamed placeholder.
fn deserialize_kind<'de, D>(d: D) -> std::result::Result<ActorKind, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(deserialize_lenient::<D, String>(d)?.map(ActorKind::from).unwrap_or_default())
}

impl Default for ActorKind {
    fn default() -> Self {
        ActorKind::Unknown(String::new())
    }
}

impl From<String> for ActorKind {
    fn from(name: String) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "sphere" => ActorKind::Sphere,
            "cube" | "box" => ActorKind::Cube,
            "cylinder" => ActorKind::Cylinder,
            "plane" => ActorKind::Plane,
            "line" => ActorKind::Line,
            "particle_system" | "particles" => ActorKind::ParticleSystem,
            "text" => ActorKind::Text,
            _ => ActorKind::Unknown(name),
        }
    }
}

impl ActorKind {
    pub fn name(&self) -> &str {
        match self {
            ActorKind::Sphere => "sphere",
            ActorKind::Cube => "cube",
            ActorKind::Cylinder => "cylinder",
            ActorKind::Plane => "plane",
            ActorKind::Line => "line",
            ActorKind::ParticleSystem => "particle_system",
            ActorKind::Text => "text",
            ActorKind::Unknown(name) => name,
        }
    }

    /// Resolve the geometry for `def`, filling per-type defaults.
    /// Unknown kinds have no geometry.
    fn shape(&self, def: &ActorDefinition) -> Option<Shape> {
        let shape = match self {
            ActorKind::Sphere => Shape::Sphere {
                radius: def.radius.unwrap_or(1.0),
            },
            ActorKind::Cube => {
                let width = def.width.unwrap_or(1.0);
                Shape::Cube {
                    width,
                    height: def.height.unwrap_or(width),
                    depth: def.depth.unwrap_or(width),
                }
            }
            ActorKind::Cylinder => Shape::Cylinder {
                radius: def.radius.unwrap_or(0.5),
                height: def.height.unwrap_or(1.0),
            },
            ActorKind::Plane => {
                let width = def.width.unwrap_or(1.0);
                Shape::Plane {
                    width,
                    height: def.height.unwrap_or(width),
                }
            }
            ActorKind::Line => Shape::Line {
                points: def.points.clone(),
            },
            ActorKind::ParticleSystem => Shape::Particles {
                count: def.count.map_or(100, |c| c.max(0.0).round() as u32),
                spread: def.radius.unwrap_or(1.0),
            },
            ActorKind::Text => Shape::Text {
                content: def.text_content.clone().unwrap_or_default(),
                font_size: def.font_size.unwrap_or(1.0),
            },
            ActorKind::Unknown(_) => return None,
        };
        Some(shape)
    }
}

/// Continuous orbit declared through actor metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub radius: f32,
    /// Radians per second.
    pub speed: f32,
}

#[derive(Debug, Clone)]
pub struct RuntimeActor {
    pub id: String,
    pub kind: ActorKind,
    /// `None` for inert placeholders.
    pub handle: Option<PrimitiveHandle>,
    pub transform: Transform,
    pub definition: ActorDefinition,
}

impl RuntimeActor {
    pub fn is_placeholder(&self) -> bool {
        self.handle.is_none()
    }

    pub fn orbit_radius(&self) -> Option<f32> {
        self.definition.metadata_f32("orbit_radius")
    }

    /// Present only when both `orbit_radius` and `orbit_speed` are declared.
    pub fn orbit(&self) -> Option<Orbit> {
        Some(Orbit {
            radius: self.orbit_radius()?,
            speed: self.definition.metadata_f32("orbit_speed")?,
        })
    }
}

/// Index of an actor inside its registry. Stable for the registry's lifetime.
pub type ActorIndex = usize;

#[derive(Debug, Default)]
pub struct ActorRegistry {
    actors: Vec<RuntimeActor>,
    by_id: HashMap<String, ActorIndex>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `defs`, creating one primitive per known actor.
    ///
    /// If the adapter fails, every primitive created so far is destroyed
    /// before the error is returned.
    pub fn build<A>(defs: &[ActorDefinition], adapter: &mut A) -> Result<Self>
    where
        A: RenderAdapter + ?Sized,
    {
        let mut registry = Self::new();
        for def in defs {
            if let Err(e) = registry.create_actor(def, adapter) {
                registry.discard(adapter);
                return Err(e);
            }
        }
        Ok(registry)
    }

    /// Create and register one actor.
    ///
    /// Returns `Ok(None)` when the id is already taken; the first definition
    /// keeps the id. Unknown kinds register as inert placeholders.
    pub fn create_actor<A>(
        &mut self,
        def: &ActorDefinition,
        adapter: &mut A,
    ) -> Result<Option<ActorIndex>>
    where
        A: RenderAdapter + ?Sized,
    {
        if self.by_id.contains_key(&def.id) {
            log::warn!("Duplicate actor id '{}', skipping later definition", def.id);
            return Ok(None);
        }

        let transform = def.initial_transform();
        let handle = match def.kind.shape(def) {
            Some(shape) => {
                let spec = PrimitiveSpec {
                    shape,
                    material: def.material(),
                };
                let handle = adapter.create_primitive(&spec)?;
                if let Err(e) = adapter.set_transform(handle, &transform) {
                    if let Err(cleanup) = adapter.destroy_primitive(handle) {
                        log::warn!("Failed to destroy primitive for '{}': {cleanup}", def.id);
                    }
                    return Err(e);
                }
                Some(handle)
            }
            None => {
                log::warn!(
                    "Unknown actor type '{}' for actor '{}', using an empty placeholder",
                    def.kind.name(),
                    def.id
                );
                None
            }
        };

        let index = self.actors.len();
        self.actors.push(RuntimeActor {
            id: def.id.clone(),
            kind: def.kind.clone(),
            handle,
            transform,
            definition: def.clone(),
        });
        self.by_id.insert(def.id.clone(), index);
        Ok(Some(index))
    }

    pub fn get(&self, id: &str) -> Option<&RuntimeActor> {
        self.index_of(id).map(|i| &self.actors[i])
    }

    pub fn index_of(&self, id: &str) -> Option<ActorIndex> {
        self.by_id.get(id).copied()
    }

    pub fn at(&self, index: ActorIndex) -> Option<&RuntimeActor> {
        self.actors.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuntimeActor> {
        self.actors.iter()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Committed transforms in registry order.
    pub fn transforms(&self) -> Vec<Transform> {
        self.actors.iter().map(|a| a.transform).collect()
    }

    /// Write staged transforms back, pushing changed ones to the adapter.
    pub(crate) fn commit<A>(&mut self, staged: &[Transform], adapter: &mut A) -> Result<()>
    where
        A: RenderAdapter + ?Sized,
    {
        for (actor, next) in self.actors.iter_mut().zip(staged) {
            if actor.transform == *next {
                continue;
            }
            actor.transform = *next;
            if let Some(handle) = actor.handle {
                adapter.set_transform(handle, next)?;
            }
        }
        Ok(())
    }

    /// Teardown on an error path: failures are logged, not returned.
    pub(crate) fn discard<A>(&mut self, adapter: &mut A)
    where
        A: RenderAdapter + ?Sized,
    {
        if let Err(e) = self.teardown(adapter) {
            log::warn!("Failed to release primitives after a load error: {e}");
        }
    }

    /// Destroy every primitive and empty the registry.
    pub fn teardown<A>(&mut self, adapter: &mut A) -> Result<()>
    where
        A: RenderAdapter + ?Sized,
    {
        for actor in self.actors.drain(..) {
            if let Some(handle) = actor.handle {
                adapter.destroy_primitive(handle)?;
            }
        }
        self.by_id.clear();
        Ok(())
    }
}
