//! Render-side light state
//!
//! Only the pieces of a light the interaction batcher needs: its bounding
//! volume (for culling and surface collection), the world-to-light texture
//! projection used by the lighting calculation, and the owning entity for
//! light-stage parameter evaluation.

use crate::foundation::math::{Aabb, Mat4};
use crate::render::entity::EntityId;

/// A light as seen by the interaction batcher
#[derive(Debug, Clone)]
pub struct RenderLight {
    /// World-space bounds of the light volume
    pub bounds: Aabb,

    /// World-to-light texture projection
    pub texture_transform: Mat4,

    /// Entity owning the light; the backend reads it to evaluate
    /// light-stage expressions against that entity's shader parameters
    pub entity: Option<EntityId>,
}

impl RenderLight {
    /// Create a light from its volume bounds with an identity projection
    pub fn new(bounds: Aabb) -> Self {
        Self {
            bounds,
            texture_transform: Mat4::identity(),
            entity: None,
        }
    }

    /// Attach the owning entity
    #[must_use]
    pub fn with_entity(mut self, entity: EntityId) -> Self {
        self.entity = Some(entity);
        self
    }
}
