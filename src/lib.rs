//! Interpreter for declarative JSON animations of 3-D scenes.
//!
//! Pipeline: `AnimationDefinition` → `Engine` (timeline interpreter) →
//! `RenderAdapter` (any backend), driven frame by frame by the `Player`.

pub mod engine;
pub mod errors;
pub mod menubar;
pub mod player;
pub mod renderer;
pub mod types;
