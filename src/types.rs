//! Shared boundary types for the scene animator.
//!
//! This module defines the data that crosses the two key seams:
//! - Engine → RenderAdapter: `PrimitiveSpec`, `Transform`, `CameraState`,
//!   `AnnotationView`
//! - Engine → Player / trace output: `FrameSnapshot`

use glam::Vec3;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Shared style primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Named(NamedColor),
    Rgb { r: u8, g: u8, b: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Grey,
}

impl NamedColor {
    fn from_name(name: &str) -> Option<Self> {
        let named = match name.to_ascii_lowercase().as_str() {
            "black" => NamedColor::Black,
            "red" => NamedColor::Red,
            "green" => NamedColor::Green,
            "yellow" => NamedColor::Yellow,
            "blue" => NamedColor::Blue,
            "magenta" => NamedColor::Magenta,
            "cyan" => NamedColor::Cyan,
            "white" => NamedColor::White,
            "grey" | "gray" => NamedColor::Grey,
            _ => return None,
        };
        Some(named)
    }
}

impl Color {
    pub const WHITE: Color = Color::Named(NamedColor::White);

    /// Parse `#rrggbb`, `#rgb`, `0xrrggbb` or a basic color name.
    pub fn parse(s: &str) -> Option<Color> {
        let s = s.trim();
        let hex = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .or_else(|| s.strip_prefix("0X"));
        match hex {
            Some(h) if h.len() == 6 => {
                let v = u32::from_str_radix(h, 16).ok()?;
                Some(Color::Rgb {
                    r: (v >> 16) as u8,
                    g: (v >> 8) as u8,
                    b: v as u8,
                })
            }
            Some(h) if h.len() == 3 => {
                let v = u16::from_str_radix(h, 16).ok()?;
                let expand = |n: u16| ((n & 0xf) * 17) as u8;
                Some(Color::Rgb {
                    r: expand(v >> 8),
                    g: expand(v >> 4),
                    b: expand(v),
                })
            }
            Some(_) => None,
            None => NamedColor::from_name(s).map(Color::Named),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Material {
    pub color: Color,
    pub opacity: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emissive: Option<Color>,
}

// ---------------------------------------------------------------------------
// Engine → RenderAdapter boundary
// ---------------------------------------------------------------------------

/// Opaque id for a primitive owned by a render adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PrimitiveHandle(pub u64);

/// Geometry of a renderable primitive, with every parameter resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Sphere { radius: f32 },
    Cube { width: f32, height: f32, depth: f32 },
    Cylinder { radius: f32, height: f32 },
    Plane { width: f32, height: f32 },
    Line { points: Vec<Vec3> },
    Particles { count: u32, spread: f32 },
    Text { content: String, font_size: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimitiveSpec {
    pub shape: Shape,
    pub material: Material,
}

/// Rotation is stored in radians, XYZ euler order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Transform {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraState {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
}

/// Per-frame state of one annotation overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnnotationView {
    pub visible: bool,
    pub opacity: f32,
}

impl AnnotationView {
    pub const HIDDEN: AnnotationView = AnnotationView {
        visible: false,
        opacity: 0.0,
    };
}

// ---------------------------------------------------------------------------
// Engine → Player / trace boundary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ActorSnapshot {
    pub id: String,
    pub transform: Transform,
}

/// Committed scene state after one frame evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub time: f32,
    pub actors: Vec<ActorSnapshot>,
    pub camera: CameraState,
    pub annotations: Vec<AnnotationView>,
}
