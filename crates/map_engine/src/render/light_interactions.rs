//! Per-light interaction batching
//!
//! For each visible light, the objects whose bounds intersect the light
//! volume are indexed by entity, then by material. The two backend passes
//! walk that index in insertion order: the depth-fill pass writes early
//! depth for everything opaque, the interaction pass adds the light's
//! bump/diffuse/specular contribution. Within each (entity, material) group
//! the expression-driven pass state is evaluated exactly once, and all
//! identity-transform objects are gathered into a single trailing
//! multi-object draw; only oriented objects pay a transform upload and a
//! draw call of their own.

use std::collections::HashMap;

use crate::foundation::math::Mat4;
use crate::render::backend::{DepthFillProgram, InteractionProgram};
use crate::render::entity::{EntityId, RenderEntityRef, RenderableObjectRef};
use crate::render::geometry::{GeometryRenderer, GeometrySlot, GeometryStore};
use crate::render::light::RenderLight;
use crate::render::material::{MaterialCoverage, MaterialId, MaterialStore};
use crate::render::view::{RenderView, RenderViewType, VolumeIntersection};

// One collected object: the handle plus the state sampled at insertion
// time, so the draw loops never touch the object trait twice for it.
struct ObjectEntry {
    object: RenderableObjectRef,
    slot: GeometrySlot,
    oriented: bool,
}

struct MaterialGroup {
    material: MaterialId,
    objects: Vec<ObjectEntry>,
}

struct EntityGroup {
    entity: RenderEntityRef,
    groups: Vec<MaterialGroup>,
    group_index: HashMap<MaterialId, usize>,
}

/// All surfaces interacting with one light in the current frame
///
/// Built fresh once per frame per visible light: `collect_surfaces`
/// populates the index, then `fill_depth_buffer` and `draw_interactions`
/// emit the draw submissions.
pub struct LightInteractions {
    light: RenderLight,

    entities: Vec<EntityGroup>,
    entity_index: HashMap<EntityId, usize>,

    // Scratch capacity for the identity-transform batch
    batch_reserve: usize,

    object_count: usize,
    draw_calls: usize,
}

impl LightInteractions {
    /// Create an empty interaction list for one light
    ///
    /// `batch_reserve` pre-sizes the untransformed-object scratch list, see
    /// [`RenderSettings::batch_reserve`](crate::config::RenderSettings::batch_reserve).
    pub fn new(light: RenderLight, batch_reserve: usize) -> Self {
        Self {
            light,
            entities: Vec::new(),
            entity_index: HashMap::new(),
            batch_reserve,
            object_count: 0,
            draw_calls: 0,
        }
    }

    /// The light this index belongs to
    pub fn light(&self) -> &RenderLight {
        &self.light
    }

    /// Number of collected objects (diagnostic counter)
    pub fn object_count(&self) -> usize {
        self.object_count
    }

    /// Number of draw calls issued so far (diagnostic counter)
    pub fn draw_calls(&self) -> usize {
        self.draw_calls
    }

    /// True iff the light volume is not entirely outside the view
    ///
    /// Used to cull whole lights before paying for `collect_surfaces`.
    pub fn is_in_view(&self, view: &dyn RenderView) -> bool {
        view.test_aabb(&self.light.bounds) != VolumeIntersection::Outside
    }

    /// Insert one object into the entity/material index
    pub fn add_object(
        &mut self,
        object: RenderableObjectRef,
        entity: RenderEntityRef,
        material: MaterialId,
    ) {
        let entity_slot = match self.entity_index.get(&entity.id()) {
            Some(&index) => index,
            None => {
                let index = self.entities.len();
                self.entity_index.insert(entity.id(), index);
                self.entities.push(EntityGroup {
                    entity,
                    groups: Vec::new(),
                    group_index: HashMap::new(),
                });
                index
            }
        };

        let entity_group = &mut self.entities[entity_slot];
        let group_slot = match entity_group.group_index.get(&material) {
            Some(&index) => index,
            None => {
                let index = entity_group.groups.len();
                entity_group.group_index.insert(material, index);
                entity_group.groups.push(MaterialGroup {
                    material,
                    objects: Vec::new(),
                });
                index
            }
        };

        let slot = object.storage_location();
        let oriented = object.is_oriented();
        entity_group.groups[group_slot].objects.push(ObjectEntry {
            object,
            slot,
            oriented,
        });

        self.object_count += 1;
    }

    /// Collect every surface of the candidate entities that interacts with
    /// this light
    ///
    /// An object enters the index iff its bounds touch the light volume,
    /// it is visible, its material is visible, the material applies to
    /// camera views, and the material has an interaction pass.
    pub fn collect_surfaces(&mut self, entities: &[RenderEntityRef], materials: &MaterialStore) {
        for entity in entities {
            let light_bounds = self.light.bounds;
            let mut collected: Vec<(RenderableObjectRef, MaterialId)> = Vec::new();

            entity.for_each_renderable_touching_bounds(&light_bounds, &mut |object, material_id| {
                // Skip empty objects
                if !object.is_visible() {
                    return;
                }

                let Some(material) = materials.get(material_id) else {
                    return;
                };

                // Don't collect invisible materials
                if !material.visible {
                    return;
                }

                // We only consider materials designated for camera rendering
                if !material.is_applicable_to(RenderViewType::CAMERA) {
                    return;
                }

                if material.interaction.is_none() {
                    return; // This material doesn't interact with lighting
                }

                collected.push((object.clone(), material_id));
            });

            for (object, material_id) in collected {
                self.add_object(object, entity.clone(), material_id);
            }
        }
    }

    /// Emit the depth-only pass for all collected surfaces
    ///
    /// Materials without a depth-fill pass and translucent materials are
    /// skipped; translucent surfaces are drawn later via blending, unsorted
    /// by depth.
    pub fn fill_depth_buffer(
        &mut self,
        program: &mut dyn DepthFillProgram,
        renderer: &mut dyn GeometryRenderer,
        materials: &MaterialStore,
        store: &GeometryStore,
        view: &dyn RenderView,
        render_time: f32,
    ) {
        let mut untransformed: Vec<GeometrySlot> = Vec::with_capacity(self.batch_reserve);

        program.set_modelview_projection(view.view_projection());

        for entity_group in &self.entities {
            for group in &entity_group.groups {
                let Some(material) = materials.get(group.material) else {
                    continue;
                };

                let Some(depth_fill) = &material.depth_fill else {
                    continue;
                };

                // Skip translucent materials
                if material.coverage == MaterialCoverage::Translucent {
                    continue;
                }

                // Evaluate the stage state once for the whole group; the
                // alpha test may be affected by time and entity parms
                let state = depth_fill.evaluate(render_time, Some(entity_group.entity.as_ref()));
                program.set_alpha_test(state.alpha_test);
                program.set_diffuse_texture_transform(state.diffuse_transform);

                for entry in &group.objects {
                    // Untransformed objects share one identity transform and
                    // are submitted as a single multi draw call at the end
                    if !entry.oriented {
                        untransformed.push(entry.slot);
                        continue;
                    }

                    program.set_object_transform(entry.object.object_transform());

                    renderer.submit_geometry(entry.slot, store);
                    self.draw_calls += 1;
                }

                if !untransformed.is_empty() {
                    program.set_object_transform(Mat4::identity());

                    renderer.submit_multi(&untransformed, store);
                    self.draw_calls += 1;

                    untransformed.clear();
                }
            }
        }
    }

    /// Emit the lit interaction pass for all collected surfaces
    ///
    /// The lighting calculation depends on both the light and the object
    /// transform, so it is set up before every draw; the identity batch
    /// saves the object transform upload, not the lighting setup.
    pub fn draw_interactions(
        &mut self,
        program: &mut dyn InteractionProgram,
        renderer: &mut dyn GeometryRenderer,
        materials: &MaterialStore,
        store: &GeometryStore,
        view: &dyn RenderView,
        render_time: f32,
    ) {
        let world_to_light = self.light.texture_transform;

        let mut untransformed: Vec<GeometrySlot> = Vec::with_capacity(self.batch_reserve);

        program.set_modelview_projection(view.view_projection());

        for entity_group in &self.entities {
            for group in &entity_group.groups {
                let Some(material) = materials.get(group.material) else {
                    continue;
                };

                let Some(pass) = material.active_interaction() else {
                    continue;
                };

                // Evaluate the stage state once for the whole group
                let state = pass.evaluate(render_time, Some(entity_group.entity.as_ref()));
                program.set_diffuse_texture_transform(state.diffuse_transform);
                program.set_bump_texture_transform(state.bump_transform);
                program.set_specular_texture_transform(state.specular_transform);

                for entry in &group.objects {
                    if !entry.oriented {
                        untransformed.push(entry.slot);
                        continue;
                    }

                    let transform = entry.object.object_transform();
                    program.setup_lighting(&self.light, world_to_light, view.viewer(), transform);
                    program.set_object_transform(transform);

                    renderer.submit_geometry(entry.slot, store);
                    self.draw_calls += 1;
                }

                if !untransformed.is_empty() {
                    program.setup_lighting(
                        &self.light,
                        world_to_light,
                        view.viewer(),
                        Mat4::identity(),
                    );
                    program.set_object_transform(Mat4::identity());

                    renderer.submit_multi(&untransformed, store);
                    self.draw_calls += 1;

                    untransformed.clear();
                }
            }
        }
    }
}
