//! Materials and render passes
//!
//! A material is a named surface-appearance definition. For the lighting
//! pipeline only two of its passes matter: the depth-fill pass (early depth
//! plus alpha-tested coverage) and the interaction pass (per-light
//! bump/diffuse/specular contribution). Either may be absent; materials
//! without an interaction pass never enter a light's batch at all.
//!
//! Pass state is expression-driven: alpha-test thresholds and stage texture
//! transforms may depend on the render time and on per-entity shader
//! parameters. Submission and evaluation are deliberately decoupled, so the
//! interaction batcher evaluates each pass once per (entity, material)
//! group at draw time instead of once per submitted object.

use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};

use crate::foundation::math::{Mat4, Vec3};
use crate::render::entity::RenderEntity;
use crate::render::view::RenderViewType;

new_key_type! {
    /// Handle to a material in the [`MaterialStore`]
    pub struct MaterialId;
}

/// How much of the surface a material covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialCoverage {
    /// Fully opaque
    Opaque,
    /// Alpha-tested cutout
    Perforated,
    /// Blended; never written to the depth pre-pass
    Translucent,
}

/// A scalar shader-stage expression
///
/// The supported forms cover what the editor needs: constants, time-driven
/// animation and per-entity shader parameters (render colour, fade values).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageExpr {
    /// A fixed value
    Constant(f32),
    /// Render time in seconds, scaled
    Time {
        /// Multiplier applied to the time value
        scale: f32,
    },
    /// A per-entity shader parameter
    EntityParm {
        /// Parameter index on the owning entity
        index: usize,
    },
}

impl StageExpr {
    /// Evaluate against the frame time and the owning entity
    ///
    /// Entity parameters evaluate to zero when no entity context was
    /// submitted with the object.
    pub fn evaluate(&self, time: f32, entity: Option<&dyn RenderEntity>) -> f32 {
        match *self {
            Self::Constant(value) => value,
            Self::Time { scale } => time * scale,
            Self::EntityParm { index } => entity.map_or(0.0, |e| e.shader_parm(index)),
        }
    }
}

impl Default for StageExpr {
    fn default() -> Self {
        Self::Constant(0.0)
    }
}

/// Expression-driven texture-coordinate transform of one stage
#[derive(Debug, Clone, PartialEq)]
pub struct TextureTransformExpr {
    /// Texture scale factors
    pub scale: (f32, f32),
    /// Scroll offsets, evaluated per frame
    pub scroll: (StageExpr, StageExpr),
}

impl TextureTransformExpr {
    /// The identity transform
    pub fn identity() -> Self {
        Self {
            scale: (1.0, 1.0),
            scroll: (StageExpr::Constant(0.0), StageExpr::Constant(0.0)),
        }
    }

    /// Evaluate to the texture matrix for this frame
    pub fn evaluate(&self, time: f32, entity: Option<&dyn RenderEntity>) -> Mat4 {
        let scroll = Vec3::new(
            self.scroll.0.evaluate(time, entity),
            self.scroll.1.evaluate(time, entity),
            0.0,
        );

        Mat4::new_translation(&scroll)
            * Mat4::new_nonuniform_scaling(&Vec3::new(self.scale.0, self.scale.1, 1.0))
    }
}

impl Default for TextureTransformExpr {
    fn default() -> Self {
        Self::identity()
    }
}

/// The early depth pass of a material
#[derive(Debug, Clone, Default)]
pub struct DepthFillPass {
    /// Alpha-test threshold expression (0 disables the test)
    pub alpha_test: StageExpr,
    /// Diffuse-stage texture transform, applied during alpha-tested fill
    pub diffuse_transform: TextureTransformExpr,
}

impl DepthFillPass {
    /// Evaluate the time/entity-dependent state of this pass
    pub fn evaluate(&self, time: f32, entity: Option<&dyn RenderEntity>) -> DepthFillState {
        DepthFillState {
            alpha_test: self.alpha_test.evaluate(time, entity),
            diffuse_transform: self.diffuse_transform.evaluate(time, entity),
        }
    }
}

/// Evaluated per-group uniforms of a depth-fill pass
#[derive(Debug, Clone, PartialEq)]
pub struct DepthFillState {
    /// Alpha-test threshold
    pub alpha_test: f32,
    /// Diffuse texture matrix
    pub diffuse_transform: Mat4,
}

/// The per-light interaction pass of a material
#[derive(Debug, Clone)]
pub struct InteractionPass {
    /// Inactive passes are skipped exactly like missing ones
    pub enabled: bool,
    /// Diffuse-stage texture transform
    pub diffuse_transform: TextureTransformExpr,
    /// Bump-stage texture transform
    pub bump_transform: TextureTransformExpr,
    /// Specular-stage texture transform
    pub specular_transform: TextureTransformExpr,
}

impl Default for InteractionPass {
    fn default() -> Self {
        Self {
            enabled: true,
            diffuse_transform: TextureTransformExpr::identity(),
            bump_transform: TextureTransformExpr::identity(),
            specular_transform: TextureTransformExpr::identity(),
        }
    }
}

impl InteractionPass {
    /// Evaluate the time/entity-dependent state of this pass
    pub fn evaluate(&self, time: f32, entity: Option<&dyn RenderEntity>) -> InteractionState {
        InteractionState {
            diffuse_transform: self.diffuse_transform.evaluate(time, entity),
            bump_transform: self.bump_transform.evaluate(time, entity),
            specular_transform: self.specular_transform.evaluate(time, entity),
        }
    }
}

/// Evaluated per-group uniforms of an interaction pass
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionState {
    /// Diffuse texture matrix
    pub diffuse_transform: Mat4,
    /// Bump texture matrix
    pub bump_transform: Mat4,
    /// Specular texture matrix
    pub specular_transform: Mat4,
}

/// A named surface-appearance definition
#[derive(Debug, Clone)]
pub struct Material {
    /// Material name
    pub name: String,

    /// Invisible materials are filtered out during surface collection
    pub visible: bool,

    /// Surface coverage class
    pub coverage: MaterialCoverage,

    /// View types this material renders in
    pub view_types: RenderViewType,

    /// Early depth pass, if the material has one
    pub depth_fill: Option<DepthFillPass>,

    /// Per-light interaction pass, if the material has one
    pub interaction: Option<InteractionPass>,
}

impl Material {
    /// Create an opaque camera-view material with default passes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            coverage: MaterialCoverage::Opaque,
            view_types: RenderViewType::CAMERA | RenderViewType::ORTHO_VIEW,
            depth_fill: Some(DepthFillPass::default()),
            interaction: Some(InteractionPass::default()),
        }
    }

    /// True if this material renders in the given view type
    pub fn is_applicable_to(&self, view_type: RenderViewType) -> bool {
        self.view_types.contains(view_type)
    }

    /// The interaction pass, if present and active
    pub fn active_interaction(&self) -> Option<&InteractionPass> {
        self.interaction.as_ref().filter(|pass| pass.enabled)
    }
}

/// Store of all materials, addressed by [`MaterialId`]
#[derive(Debug, Default)]
pub struct MaterialStore {
    materials: SlotMap<MaterialId, Material>,
    names: HashMap<String, MaterialId>,
}

impl MaterialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            materials: SlotMap::with_key(),
            names: HashMap::new(),
        }
    }

    /// Insert a material, indexing it by name
    pub fn insert(&mut self, material: Material) -> MaterialId {
        let name = material.name.clone();
        let id = self.materials.insert(material);
        self.names.insert(name, id);
        id
    }

    /// Borrow a material by id
    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    /// Mutably borrow a material by id
    pub fn get_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    /// Find a material id by name
    pub fn find(&self, name: &str) -> Option<MaterialId> {
        self.names.get(name).copied()
    }

    /// Number of materials in the store
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// True if the store is empty
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_stage_expr_evaluation() {
        assert_relative_eq!(StageExpr::Constant(0.5).evaluate(3.0, None), 0.5);
        assert_relative_eq!(StageExpr::Time { scale: 2.0 }.evaluate(3.0, None), 6.0);
        // Entity parms without an entity context evaluate to zero
        assert_relative_eq!(StageExpr::EntityParm { index: 4 }.evaluate(3.0, None), 0.0);
    }

    #[test]
    fn test_texture_transform_scroll_over_time() {
        let expr = TextureTransformExpr {
            scale: (2.0, 1.0),
            scroll: (StageExpr::Time { scale: 0.1 }, StageExpr::Constant(0.0)),
        };

        let matrix = expr.evaluate(10.0, None);
        assert_relative_eq!(matrix[(0, 3)], 1.0); // scroll x = 10 * 0.1
        assert_relative_eq!(matrix[(0, 0)], 2.0); // scale x
        assert_relative_eq!(matrix[(1, 1)], 1.0);
    }

    #[test]
    fn test_inactive_interaction_pass_is_filtered() {
        let mut material = Material::new("textures/base_wall/plain");
        assert!(material.active_interaction().is_some());

        material.interaction.as_mut().unwrap().enabled = false;
        assert!(material.active_interaction().is_none());

        material.interaction = None;
        assert!(material.active_interaction().is_none());
    }

    #[test]
    fn test_store_name_lookup() {
        let mut store = MaterialStore::new();
        let id = store.insert(Material::new("textures/base_wall/plain"));

        assert_eq!(store.find("textures/base_wall/plain"), Some(id));
        assert!(store.find("textures/missing").is_none());
        assert_eq!(store.get(id).unwrap().coverage, MaterialCoverage::Opaque);
    }

    #[test]
    fn test_view_type_applicability() {
        let mut material = Material::new("textures/common/caulk");
        material.view_types = RenderViewType::ORTHO_VIEW;

        assert!(!material.is_applicable_to(RenderViewType::CAMERA));
        assert!(material.is_applicable_to(RenderViewType::ORTHO_VIEW));
    }
}
