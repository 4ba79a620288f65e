//! Actors and the actor builder
//!
//! An actor is a rigid body in the scene: a set of box collision shapes, a
//! set of colored box visuals and a pose. Actors are assembled with
//! [`ActorBuilder`], which is obtained from [`Scene::create_actor_builder`].

use serde::{Deserialize, Serialize};

use super::{Scene, SceneError};
use crate::foundation::math::{Color, Pose, Vec3};
use crate::physics::{Aabb, BoxShape, CollisionLayers};

slotmap::new_key_type! {
    /// Generational handle to an actor stored in a [`Scene`]
    pub struct ActorId;
}

/// How an actor participates in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Never moves
    Static,
    /// Moved only by explicit pose changes (tables, fixtures)
    Kinematic,
    /// Moved by interaction: grasping, releasing and settling
    Dynamic,
}

impl BodyKind {
    /// Default collision layer for bodies of this kind
    pub fn default_layer(self) -> u32 {
        match self {
            Self::Static | Self::Kinematic => CollisionLayers::ENVIRONMENT,
            Self::Dynamic => CollisionLayers::PROP,
        }
    }
}

/// Visual geometry attached to an actor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualShape {
    /// Box geometry
    pub shape: BoxShape,
    /// RGB color
    pub color: Color,
}

/// A rigid body in the scene
#[derive(Debug, Clone)]
pub struct Actor {
    name: String,
    kind: BodyKind,
    collisions: Vec<BoxShape>,
    visuals: Vec<VisualShape>,
    pose: Pose,
    layer: u32,
    mask: u32,
}

impl Actor {
    /// Unique name of the actor
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Body kind
    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    /// Current world pose
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Collision shapes in the actor's local frame
    pub fn collisions(&self) -> &[BoxShape] {
        &self.collisions
    }

    /// Visual shapes in the actor's local frame
    pub fn visuals(&self) -> &[VisualShape] {
        &self.visuals
    }

    /// Color of the first visual, if any
    pub fn color(&self) -> Option<Color> {
        self.visuals.first().map(|visual| visual.color)
    }

    /// Collision layer
    pub fn layer(&self) -> u32 {
        self.layer
    }

    /// Collision mask
    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// World-space bounds enclosing every collision shape
    pub fn world_aabb(&self) -> Aabb {
        let mut shapes = self.collisions.iter().map(|shape| shape.world_aabb(&self.pose));
        // Builders reject actors without collision geometry
        let first = shapes
            .next()
            .unwrap_or_else(|| Aabb::from_center_extents(self.pose.position, Vec3::zeros()));

        shapes.fold(first, |acc, aabb| Aabb::new(acc.min.inf(&aabb.min), acc.max.sup(&aabb.max)))
    }

    pub(crate) fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }
}

/// Builder collecting geometry before an actor is inserted into the scene
///
/// # Examples
/// ```
/// use motion_engine::scene::{Scene, SceneConfig};
/// use motion_engine::foundation::math::{Pose, Vec3};
///
/// let mut scene = Scene::new(SceneConfig::default()).unwrap();
/// let cube = scene
///     .create_actor_builder()
///     .add_box_collision([0.02, 0.02, 0.06])
///     .add_box_visual([0.02, 0.02, 0.06], [1.0, 0.0, 0.0])
///     .build("red_cube")
///     .unwrap();
/// scene.set_pose(cube, Pose::from_position(Vec3::new(0.4, 0.3, 0.06))).unwrap();
/// ```
pub struct ActorBuilder<'a> {
    scene: &'a mut Scene,
    collisions: Vec<BoxShape>,
    visuals: Vec<VisualShape>,
}

impl<'a> ActorBuilder<'a> {
    pub(crate) fn new(scene: &'a mut Scene) -> Self {
        Self {
            scene,
            collisions: Vec::new(),
            visuals: Vec::new(),
        }
    }

    /// Add a box collision shape with the given half size
    pub fn add_box_collision(mut self, half_size: [f64; 3]) -> Self {
        self.collisions.push(BoxShape::new(half_size));
        self
    }

    /// Add a colored box visual with the given half size
    pub fn add_box_visual(mut self, half_size: [f64; 3], color: Color) -> Self {
        self.visuals.push(VisualShape {
            shape: BoxShape::new(half_size),
            color,
        });
        self
    }

    /// Build a dynamic actor
    pub fn build(self, name: &str) -> Result<ActorId, SceneError> {
        self.finish(name, BodyKind::Dynamic)
    }

    /// Build a kinematic actor
    pub fn build_kinematic(self, name: &str) -> Result<ActorId, SceneError> {
        self.finish(name, BodyKind::Kinematic)
    }

    /// Build a static actor
    pub fn build_static(self, name: &str) -> Result<ActorId, SceneError> {
        self.finish(name, BodyKind::Static)
    }

    fn finish(self, name: &str, kind: BodyKind) -> Result<ActorId, SceneError> {
        if self.collisions.is_empty() {
            return Err(SceneError::MissingCollision(name.to_string()));
        }
        let mut shapes = self.collisions.iter().chain(self.visuals.iter().map(|v| &v.shape));
        if shapes.any(|shape| !shape.is_valid()) {
            return Err(SceneError::InvalidShape(name.to_string()));
        }

        let actor = Actor {
            name: name.to_string(),
            kind,
            collisions: self.collisions,
            visuals: self.visuals,
            pose: Pose::identity(),
            layer: kind.default_layer(),
            mask: CollisionLayers::ALL,
        };

        self.scene.insert_actor(actor)
    }
}
