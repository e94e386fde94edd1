//! Render entities and renderable objects
//!
//! A render entity is the render-side face of a map entity: it owns a set
//! of renderable objects (brush surfaces, model surfaces, patches) and the
//! per-entity shader parameters that stage expressions may reference. The
//! scenegraph owns entity lifetimes; this core only holds handles during a
//! frame.

use std::sync::Arc;

use crate::foundation::math::{Aabb, Mat4};
use crate::render::geometry::GeometrySlot;
use crate::render::material::MaterialId;

/// Identity of a render entity, assigned by the owning scenegraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

/// A single drawable object owned by a render entity
pub trait RenderableObject {
    /// False for objects with no geometry this frame
    fn is_visible(&self) -> bool;

    /// True when the object carries its own local-to-world transform;
    /// untransformed (identity) objects are eligible for batched submission
    fn is_oriented(&self) -> bool;

    /// The local-to-world transform
    fn object_transform(&self) -> Mat4;

    /// Where this object's geometry lives in the shared store
    fn storage_location(&self) -> GeometrySlot;

    /// World-space bounds, used for light-volume intersection
    fn bounds(&self) -> Aabb;
}

/// Shared handle to a renderable object
pub type RenderableObjectRef = Arc<dyn RenderableObject>;

/// The render-side interface of a map entity
pub trait RenderEntity {
    /// Stable identity for grouping, assigned by the scenegraph
    fn id(&self) -> EntityId;

    /// Per-entity shader parameter, referenced by stage expressions
    fn shader_parm(&self, index: usize) -> f32;

    /// Visit every (object, material) pair whose bounds touch `bounds`
    fn for_each_renderable_touching_bounds(
        &self,
        bounds: &Aabb,
        visitor: &mut dyn FnMut(&RenderableObjectRef, MaterialId),
    );
}

/// Shared handle to a render entity
pub type RenderEntityRef = Arc<dyn RenderEntity>;
