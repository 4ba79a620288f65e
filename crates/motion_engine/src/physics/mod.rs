//! Physics module: collision geometry and filtering
//!
//! Only the geometry the planner needs for its environment check lives here;
//! rigid-body dynamics are handled by the scene's settle rules.

pub mod collision_layers;
pub mod shape;

pub use collision_layers::CollisionLayers;
pub use shape::{Aabb, BoxShape};
