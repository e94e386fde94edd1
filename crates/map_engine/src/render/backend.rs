//! Backend program interfaces
//!
//! The draw passes talk to the rasterization layer exclusively through
//! these traits: evaluated uniform values go in, nothing comes back. Real
//! implementations wrap GPU shader programs; tests record the calls.

use crate::foundation::math::{Mat4, Vec3};
use crate::render::light::RenderLight;

/// The depth-fill (early depth / alpha-tested coverage) program
pub trait DepthFillProgram {
    /// Set the combined view-projection matrix for the pass
    fn set_modelview_projection(&mut self, mvp: Mat4);

    /// Set the alpha-test threshold; may vary by time and entity parms
    fn set_alpha_test(&mut self, threshold: f32);

    /// Set the evaluated diffuse-stage texture matrix
    fn set_diffuse_texture_transform(&mut self, transform: Mat4);

    /// Set the object transform for the next draw
    fn set_object_transform(&mut self, transform: Mat4);
}

/// The per-light interaction (bump/diffuse/specular) program
pub trait InteractionProgram {
    /// Set the combined view-projection matrix for the pass
    fn set_modelview_projection(&mut self, mvp: Mat4);

    /// Set the evaluated diffuse-stage texture matrix
    fn set_diffuse_texture_transform(&mut self, transform: Mat4);

    /// Set the evaluated bump-stage texture matrix
    fn set_bump_texture_transform(&mut self, transform: Mat4);

    /// Set the evaluated specular-stage texture matrix
    fn set_specular_texture_transform(&mut self, transform: Mat4);

    /// Set up the per-light lighting calculation for the next draw
    ///
    /// Depends on the light, the viewer and the object transform, so it is
    /// issued before every draw, including once before a batched
    /// identity-transform draw.
    fn setup_lighting(
        &mut self,
        light: &RenderLight,
        world_to_light: Mat4,
        viewer: Vec3,
        object_transform: Mat4,
    );

    /// Set the object transform for the next draw
    fn set_object_transform(&mut self, transform: Mat4);
}
