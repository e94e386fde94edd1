//! Collector implementations
//!
//! Two capability variants of the [`RenderableCollector`] protocol: the
//! full-materials collector feeding the lit camera pipeline, and the
//! wireframe collector feeding the 2D views. Both compose the shared
//! [`MaterialStateStack`] instead of inheriting from each other.

use crate::foundation::math::Mat4;
use crate::render::collector::{
    HighlightFlags, LightList, MaterialStateStack, RenderStyle, RenderableCollector,
};
use crate::render::entity::{EntityId, RenderableObjectRef};
use crate::render::material::MaterialId;

/// One accumulated submission record
///
/// Created transiently per traversal frame and consumed by the backend;
/// never persisted across frames.
#[derive(Clone)]
pub struct Submission {
    /// Material the object was submitted under
    pub material: MaterialId,
    /// Local-to-world transform
    pub world: Mat4,
    /// Owning entity, when submitted with entity context
    pub entity: Option<EntityId>,
    /// Highlight state active at submission time
    pub highlight: HighlightFlags,
    /// The submitted object
    pub drawable: RenderableObjectRef,
}

impl std::fmt::Debug for Submission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submission")
            .field("material", &self.material)
            .field("entity", &self.entity)
            .field("highlight", &self.highlight)
            .finish_non_exhaustive()
    }
}

/// Collector for the lit camera view, accepting both render styles
#[derive(Debug, Default)]
pub struct FullMaterialsCollector {
    state: MaterialStateStack,
    highlight: HighlightFlags,
    lights: LightList,
    submissions: Vec<Submission>,
    dropped: usize,
}

impl FullMaterialsCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// All records accumulated this frame, in submission order
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    /// The lights set for lighting-mode rendering
    pub fn lights(&self) -> &LightList {
        &self.lights
    }

    /// Submissions attempted while no material state was set (diagnostic)
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn record(&mut self, drawable: RenderableObjectRef, world: Mat4, entity: Option<EntityId>) {
        let Some(material) = *self.state.top() else {
            // A node submitted without ever calling set_state
            self.dropped += 1;
            return;
        };

        self.submissions.push(Submission {
            material,
            world,
            entity,
            highlight: self.highlight,
            drawable,
        });
    }
}

impl RenderableCollector for FullMaterialsCollector {
    fn push_state(&mut self) {
        self.state.push();
    }

    fn pop_state(&mut self) {
        self.state.pop();
    }

    fn set_state(&mut self, material: MaterialId, _style: RenderStyle) {
        // Both wireframe and full-materials state end up in the camera view
        self.state.set(material);
    }

    fn add_renderable(&mut self, drawable: RenderableObjectRef, world: Mat4) {
        self.record(drawable, world, None);
    }

    fn add_renderable_with_entity(
        &mut self,
        drawable: RenderableObjectRef,
        world: Mat4,
        entity: EntityId,
    ) {
        self.record(drawable, world, Some(entity));
    }

    fn supports_full_materials(&self) -> bool {
        true
    }

    fn set_highlight_flag(&mut self, flags: HighlightFlags, enabled: bool) {
        self.highlight.set(flags, enabled);
    }

    fn set_lights(&mut self, lights: LightList) {
        self.lights = lights;
    }
}

/// Collector for the orthographic 2D views
///
/// Ignores full-materials state entirely; callers must check
/// [`supports_full_materials`](RenderableCollector::supports_full_materials)
/// and skip full-material-only submissions.
#[derive(Debug, Default)]
pub struct WireframeCollector {
    state: MaterialStateStack,
    highlight: HighlightFlags,
    submissions: Vec<Submission>,
    dropped: usize,
}

impl WireframeCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// All records accumulated this frame, in submission order
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    /// Submissions attempted while no material state was set (diagnostic)
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn record(&mut self, drawable: RenderableObjectRef, world: Mat4, entity: Option<EntityId>) {
        let Some(material) = *self.state.top() else {
            self.dropped += 1;
            return;
        };

        self.submissions.push(Submission {
            material,
            world,
            entity,
            highlight: self.highlight,
            drawable,
        });
    }
}

impl RenderableCollector for WireframeCollector {
    fn push_state(&mut self) {
        self.state.push();
    }

    fn pop_state(&mut self) {
        self.state.pop();
    }

    fn set_state(&mut self, material: MaterialId, style: RenderStyle) {
        // Full-materials state is of no use to a wireframe view
        if style == RenderStyle::WireframeOnly {
            self.state.set(material);
        }
    }

    fn add_renderable(&mut self, drawable: RenderableObjectRef, world: Mat4) {
        self.record(drawable, world, None);
    }

    fn add_renderable_with_entity(
        &mut self,
        drawable: RenderableObjectRef,
        world: Mat4,
        entity: EntityId,
    ) {
        self.record(drawable, world, Some(entity));
    }

    fn supports_full_materials(&self) -> bool {
        false
    }

    fn set_highlight_flag(&mut self, flags: HighlightFlags, enabled: bool) {
        self.highlight.set(flags, enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::foundation::math::{Aabb, Vec3};
    use crate::render::entity::RenderableObject;
    use crate::render::geometry::{GeometrySlot, GeometryStore};
    use crate::render::light::RenderLight;
    use crate::render::material::{Material, MaterialStore};

    struct Dummy {
        slot: GeometrySlot,
    }

    impl RenderableObject for Dummy {
        fn is_visible(&self) -> bool {
            true
        }

        fn is_oriented(&self) -> bool {
            false
        }

        fn object_transform(&self) -> Mat4 {
            Mat4::identity()
        }

        fn storage_location(&self) -> GeometrySlot {
            self.slot
        }

        fn bounds(&self) -> Aabb {
            Aabb::from_center_extents(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))
        }
    }

    fn dummy(store: &mut GeometryStore) -> RenderableObjectRef {
        Arc::new(Dummy {
            slot: store.allocate(Default::default()),
        })
    }

    fn materials() -> (MaterialStore, MaterialId, MaterialId) {
        let mut store = MaterialStore::new();
        let solid = store.insert(Material::new("textures/base_wall/plain"));
        let wire = store.insert(Material::new("<1 0 0>"));
        (store, solid, wire)
    }

    #[test]
    fn test_full_materials_collector_records_state() {
        let (_materials, solid, _wire) = materials();
        let mut geometry = GeometryStore::new();
        let mut collector = FullMaterialsCollector::new();

        collector.set_state(solid, RenderStyle::FullMaterials);
        collector.add_renderable(dummy(&mut geometry), Mat4::identity());
        collector.add_renderable_with_entity(
            dummy(&mut geometry),
            Mat4::new_translation(&Vec3::new(1.0, 0.0, 0.0)),
            EntityId(7),
        );

        assert!(collector.supports_full_materials());
        let submissions = collector.submissions();
        assert_eq!(submissions.len(), 2);
        assert_eq!(submissions[0].material, solid);
        assert_eq!(submissions[0].entity, None);
        assert_eq!(submissions[1].entity, Some(EntityId(7)));
    }

    #[test]
    fn test_push_pop_restores_previous_material() {
        let (_materials, solid, wire) = materials();
        let mut geometry = GeometryStore::new();
        let mut collector = FullMaterialsCollector::new();

        collector.set_state(solid, RenderStyle::FullMaterials);
        collector.push_state();
        collector.set_state(wire, RenderStyle::FullMaterials);
        collector.add_renderable(dummy(&mut geometry), Mat4::identity());
        collector.pop_state();
        collector.add_renderable(dummy(&mut geometry), Mat4::identity());

        let submissions = collector.submissions();
        assert_eq!(submissions[0].material, wire);
        assert_eq!(submissions[1].material, solid);
    }

    #[test]
    fn test_wireframe_collector_ignores_full_materials_state() {
        let (_materials, solid, wire) = materials();
        let mut geometry = GeometryStore::new();
        let mut collector = WireframeCollector::new();

        assert!(!collector.supports_full_materials());

        collector.set_state(wire, RenderStyle::WireframeOnly);
        collector.set_state(solid, RenderStyle::FullMaterials);
        collector.add_renderable(dummy(&mut geometry), Mat4::identity());

        // The full-materials set_state was ignored
        assert_eq!(collector.submissions()[0].material, wire);
    }

    #[test]
    fn test_highlight_flags_apply_to_subsequent_submissions() {
        let (_materials, solid, _wire) = materials();
        let mut geometry = GeometryStore::new();
        let mut collector = FullMaterialsCollector::new();

        collector.set_state(solid, RenderStyle::FullMaterials);
        collector.add_renderable(dummy(&mut geometry), Mat4::identity());

        collector.set_highlight_flag(HighlightFlags::FACES | HighlightFlags::PRIMITIVES, true);
        collector.add_renderable(dummy(&mut geometry), Mat4::identity());

        collector.set_highlight_flag(HighlightFlags::FACES, false);
        collector.add_renderable(dummy(&mut geometry), Mat4::identity());

        let submissions = collector.submissions();
        assert_eq!(submissions[0].highlight, HighlightFlags::empty());
        assert_eq!(
            submissions[1].highlight,
            HighlightFlags::FACES | HighlightFlags::PRIMITIVES
        );
        assert_eq!(submissions[2].highlight, HighlightFlags::PRIMITIVES);
    }

    #[test]
    fn test_submission_without_state_is_dropped() {
        let mut geometry = GeometryStore::new();
        let mut collector = FullMaterialsCollector::new();

        collector.add_renderable(dummy(&mut geometry), Mat4::identity());

        assert!(collector.submissions().is_empty());
        assert_eq!(collector.dropped(), 1);
    }

    #[test]
    fn test_lights_are_stored() {
        let mut collector = FullMaterialsCollector::new();
        collector.set_lights(vec![RenderLight::new(Aabb::from_center_extents(
            Vec3::zeros(),
            Vec3::new(4.0, 4.0, 4.0),
        ))]);

        assert_eq!(collector.lights().len(), 1);
    }

    #[test]
    #[should_panic(expected = "popped below its base entry")]
    fn test_unbalanced_pop_is_a_contract_violation() {
        let mut collector = WireframeCollector::new();
        collector.pop_state();
    }
}
