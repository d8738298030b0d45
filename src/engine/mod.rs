//! Engine — the timeline interpreter.
//!
//! Loads an `AnimationDefinition` into a session and evaluates it at any
//! clock value. One evaluation runs a fixed pipeline:
//!
//! 1. timeline events write the frame stage
//! 2. procedural motion writes the frame stage
//! 3. the stage is committed to the registry and the adapter
//! 4. the camera follows its target actor, if any
//! 5. annotation visibility is pushed to the adapter
//! 6. the adapter renders the frame
//!
//! Later writers in steps 1–2 win. The engine never deals with clocks or
//! playback; that is the player's job.

pub mod actors;
pub mod annotations;
pub mod easing;
pub mod motion;
pub mod source;
pub mod timeline;

use crate::errors::Result;
use crate::renderer::RenderAdapter;
use crate::types::{ActorSnapshot, AnnotationView, CameraState, FrameSnapshot, Transform};

use actors::{ActorIndex, ActorRegistry, RuntimeActor};
use source::AnimationDefinition;

/// Per-frame scratch copy of every actor transform, in registry order.
#[derive(Debug, Clone, Default)]
pub struct FrameStage {
    transforms: Vec<Transform>,
}

impl FrameStage {
    pub fn new(transforms: Vec<Transform>) -> Self {
        FrameStage { transforms }
    }

    pub fn get(&self, index: ActorIndex) -> Option<&Transform> {
        self.transforms.get(index)
    }

    pub fn get_mut(&mut self, index: ActorIndex) -> Option<&mut Transform> {
        self.transforms.get_mut(index)
    }

    pub fn as_slice(&self) -> &[Transform] {
        &self.transforms
    }
}

pub struct Engine {
    definition: AnimationDefinition,
    registry: ActorRegistry,
    camera: CameraState,
    follow: Option<ActorIndex>,
    annotations: Vec<AnnotationView>,
    time: f32,
}

impl Engine {
    /// Build a session: create every actor, place the camera and register
    /// annotation overlays with the adapter.
    pub fn load<A>(definition: AnimationDefinition, adapter: &mut A) -> Result<Engine>
    where
        A: RenderAdapter + ?Sized,
    {
        let mut registry = ActorRegistry::build(&definition.actors, adapter)?;
        let (camera, follow) = Self::camera_for(&definition, &registry);
        if let Err(e) = Self::register_view(&definition, &camera, adapter) {
            registry.discard(adapter);
            return Err(e);
        }
        let annotations = vec![AnnotationView::HIDDEN; definition.annotations.len()];

        log::info!(
            "Loaded animation: {} actors, {} timeline events, {} annotations, {}s{}",
            registry.len(),
            definition.timeline.len(),
            definition.annotations.len(),
            definition.duration,
            if definition.looping { " (looping)" } else { "" },
        );

        Ok(Engine {
            definition,
            registry,
            camera,
            follow,
            annotations,
            time: 0.0,
        })
    }

    fn camera_for(
        definition: &AnimationDefinition,
        registry: &ActorRegistry,
    ) -> (CameraState, Option<ActorIndex>) {
        let camera_def = definition.camera.clone().unwrap_or_default();
        let camera = CameraState {
            position: camera_def.position,
            target: camera_def.target,
            fov_degrees: camera_def.fov,
        };
        let follow = camera_def.follow_actor.as_deref().and_then(|id| {
            let index = registry.index_of(id);
            if index.is_none() {
                log::warn!("Camera follows unknown actor '{id}', keeping a fixed target");
            }
            index
        });
        (camera, follow)
    }

    /// Place the camera and register annotation overlays with the adapter.
    fn register_view<A>(
        definition: &AnimationDefinition,
        camera: &CameraState,
        adapter: &mut A,
    ) -> Result<()>
    where
        A: RenderAdapter + ?Sized,
    {
        adapter.set_camera(camera)?;
        for (index, annotation) in definition.annotations.iter().enumerate() {
            adapter.create_annotation(index, annotation)?;
        }
        Ok(())
    }

    /// Parse a JSON document and load it.
    pub fn from_json<A>(json: &str, adapter: &mut A) -> Result<Engine>
    where
        A: RenderAdapter + ?Sized,
    {
        let definition = AnimationDefinition::from_json(json)?;
        Self::load(definition, adapter)
    }

    /// Evaluate the whole scene at clock value `t` and render one frame.
    pub fn evaluate<A>(&mut self, t: f32, adapter: &mut A) -> Result<()>
    where
        A: RenderAdapter + ?Sized,
    {
        let mut stage = FrameStage::new(self.registry.transforms());
        timeline::apply_timeline(&self.definition.timeline, t, &self.registry, &mut stage);
        motion::apply_procedural_motion(t, &self.registry, &mut stage);
        self.registry.commit(stage.as_slice(), adapter)?;

        if let Some(target) = self.follow.and_then(|i| self.registry.at(i)) {
            let position = target.transform.position;
            if position != self.camera.target {
                self.camera.target = position;
                adapter.set_camera(&self.camera)?;
            }
        }

        for (index, annotation) in self.definition.annotations.iter().enumerate() {
            let view = annotation.view_at(t);
            if self.annotations[index] != view {
                self.annotations[index] = view;
                adapter.update_annotation(index, view)?;
            }
        }

        self.time = t;
        adapter.render_frame()
    }

    /// Committed scene state after the last evaluation.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            time: self.time,
            actors: self
                .registry
                .iter()
                .map(|a| ActorSnapshot {
                    id: a.id.clone(),
                    transform: a.transform,
                })
                .collect(),
            camera: self.camera,
            annotations: self.annotations.clone(),
        }
    }

    /// Destroy every primitive. The session cannot be evaluated afterwards.
    pub fn teardown<A>(mut self, adapter: &mut A) -> Result<()>
    where
        A: RenderAdapter + ?Sized,
    {
        self.registry.teardown(adapter)
    }

    pub fn definition(&self) -> &AnimationDefinition {
        &self.definition
    }

    pub fn registry(&self) -> &ActorRegistry {
        &self.registry
    }

    pub fn actor(&self, id: &str) -> Option<&RuntimeActor> {
        self.registry.get(id)
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn annotation_views(&self) -> &[AnnotationView] {
        &self.annotations
    }

    /// Clock value of the last evaluation.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn duration(&self) -> f32 {
        self.definition.duration
    }

    pub fn looping(&self) -> bool {
        self.definition.looping
    }
}
