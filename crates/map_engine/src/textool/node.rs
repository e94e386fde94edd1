//! Texture-space nodes
//!
//! The texture tool edits texture coordinates of brush faces and patches
//! through one polymorphic node interface, so the transform code never
//! cares which geometry kind it is manipulating. Transforms are applied to
//! a working copy; committing freezes the working copy into the real data,
//! and for patches forces a re-tesselation, because the committed control
//! points bypass the normal change detection.

use crate::foundation::math::{Aabb, Mat3, Point2, Vec2, Vec3};

/// A node whose texture coordinates can be transformed
pub trait TextureToolNode {
    /// Start a transform session on the working copy
    fn begin_transformation(&mut self);

    /// Throw the working copy away, restoring the committed state
    fn revert_transformation(&mut self);

    /// Apply a 2D affine transform to all texture coordinates of the
    /// working copy
    fn transform(&mut self, transform: &Mat3);

    /// Freeze the working copy into the committed state
    fn commit_transformation(&mut self);

    /// Bounds of the working texture coordinates (z is always zero)
    fn local_bounds(&self) -> Aabb;
}

fn transform_texcoord(transform: &Mat3, texcoord: Vec2) -> Vec2 {
    let point = transform.transform_point(&Point2::new(texcoord.x, texcoord.y));
    Vec2::new(point.x, point.y)
}

fn texcoord_bounds<'a>(texcoords: impl Iterator<Item = &'a Vec2>) -> Aabb {
    let mut bounds = Aabb::empty();
    for texcoord in texcoords {
        bounds.include_point(Vec3::new(texcoord.x, texcoord.y, 0.0));
    }
    bounds
}

/// Texture state of one brush face: a texcoord per winding vertex
#[derive(Debug, Clone)]
pub struct Face {
    committed: Vec<Vec2>,
    working: Vec<Vec2>,
}

impl Face {
    /// Create a face from its winding texture coordinates
    pub fn new(texcoords: Vec<Vec2>) -> Self {
        Self {
            working: texcoords.clone(),
            committed: texcoords,
        }
    }

    /// The committed texture coordinates
    pub fn texcoords(&self) -> &[Vec2] {
        &self.committed
    }

    /// The working (possibly transformed, uncommitted) texture coordinates
    pub fn working_texcoords(&self) -> &[Vec2] {
        &self.working
    }

    fn revert_transform(&mut self) {
        self.working = self.committed.clone();
    }

    fn freeze_transform(&mut self) {
        self.committed = self.working.clone();
    }
}

/// Texture-tool node over a brush face
pub struct FaceNode<'a> {
    face: &'a mut Face,
}

impl<'a> FaceNode<'a> {
    /// Wrap a face for texture-tool manipulation
    pub fn new(face: &'a mut Face) -> Self {
        Self { face }
    }
}

impl TextureToolNode for FaceNode<'_> {
    fn begin_transformation(&mut self) {
        self.face.revert_transform();
    }

    fn revert_transformation(&mut self) {
        self.face.revert_transform();
    }

    fn transform(&mut self, transform: &Mat3) {
        for texcoord in &mut self.face.working {
            *texcoord = transform_texcoord(transform, *texcoord);
        }
    }

    fn commit_transformation(&mut self) {
        self.face.freeze_transform();
    }

    fn local_bounds(&self) -> Aabb {
        texcoord_bounds(self.face.working.iter())
    }
}

/// One control point of a patch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchControl {
    /// 3D vertex position
    pub vertex: Vec3,
    /// Texture coordinate
    pub texcoord: Vec2,
}

/// Texture state of one patch: a control-point grid plus its tesselation
#[derive(Debug, Clone)]
pub struct Patch {
    width: usize,
    height: usize,
    committed: Vec<PatchControl>,
    working: Vec<PatchControl>,
    tesselation_builds: u64,
    tesselation_dirty: bool,
}

impl Patch {
    /// Create a patch from its control-point grid, row-major
    ///
    /// # Panics
    /// Panics if the control list does not match `width * height`.
    pub fn new(width: usize, height: usize, controls: Vec<PatchControl>) -> Self {
        assert_eq!(
            controls.len(),
            width * height,
            "control grid does not match patch dimensions"
        );
        Self {
            width,
            height,
            working: controls.clone(),
            committed: controls,
            tesselation_builds: 0,
            tesselation_dirty: true,
        }
    }

    /// Grid width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height
    pub fn height(&self) -> usize {
        self.height
    }

    /// The committed control points
    pub fn controls(&self) -> &[PatchControl] {
        &self.committed
    }

    /// The working (possibly transformed, uncommitted) control points
    pub fn working_controls(&self) -> &[PatchControl] {
        &self.working
    }

    /// How many times the mesh has been re-tesselated
    pub fn tesselation_builds(&self) -> u64 {
        self.tesselation_builds
    }

    /// Rebuild the tesselated mesh if needed
    ///
    /// Transforms touch only the working control set, which the normal
    /// change detection does not see, so such callers pass `force`.
    pub fn update_tesselation(&mut self, force: bool) {
        if force || self.tesselation_dirty {
            self.tesselation_builds += 1;
            self.tesselation_dirty = false;
        }
    }

    fn revert_transform(&mut self) {
        self.working = self.committed.clone();
    }

    fn freeze_transform(&mut self) {
        self.committed = self.working.clone();
        self.update_tesselation(true);
    }
}

/// Texture-tool node over a patch
pub struct PatchNode<'a> {
    patch: &'a mut Patch,
}

impl<'a> PatchNode<'a> {
    /// Wrap a patch for texture-tool manipulation
    pub fn new(patch: &'a mut Patch) -> Self {
        Self { patch }
    }
}

impl TextureToolNode for PatchNode<'_> {
    fn begin_transformation(&mut self) {
        self.patch.revert_transform();
    }

    fn revert_transformation(&mut self) {
        self.patch.revert_transform();
        self.patch.update_tesselation(true);
    }

    fn transform(&mut self, transform: &Mat3) {
        for control in &mut self.patch.working {
            control.texcoord = transform_texcoord(transform, control.texcoord);
        }

        // The working control set bypasses change detection, force the
        // tesselation update
        self.patch.update_tesselation(true);
    }

    fn commit_transformation(&mut self) {
        self.patch.freeze_transform();
    }

    fn local_bounds(&self) -> Aabb {
        texcoord_bounds(self.patch.working.iter().map(|control| &control.texcoord))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_face() -> Face {
        Face::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ])
    }

    fn flat_patch() -> Patch {
        let mut controls = Vec::new();
        for row in 0..3 {
            for col in 0..3 {
                controls.push(PatchControl {
                    vertex: Vec3::new(col as f32, row as f32, 0.0),
                    texcoord: Vec2::new(col as f32 * 0.5, row as f32 * 0.5),
                });
            }
        }
        Patch::new(3, 3, controls)
    }

    #[test]
    fn test_face_commit_freezes_working_set() {
        let mut face = quad_face();
        let translation = Mat3::new_translation(&Vec2::new(1.0, 0.0));

        {
            let mut node = FaceNode::new(&mut face);
            node.begin_transformation();
            node.transform(&translation);
            node.commit_transformation();
        }

        assert_eq!(face.texcoords()[0], Vec2::new(1.0, 0.0));
        assert_eq!(face.texcoords()[2], Vec2::new(2.0, 1.0));
    }

    #[test]
    fn test_face_revert_restores_committed_set() {
        let mut face = quad_face();
        let translation = Mat3::new_translation(&Vec2::new(5.0, 5.0));

        let mut node = FaceNode::new(&mut face);
        node.begin_transformation();
        node.transform(&translation);
        node.revert_transformation();

        assert_eq!(node.local_bounds().min, Vec3::zeros());
    }

    #[test]
    fn test_patch_transform_forces_retesselation() {
        let mut patch = flat_patch();
        patch.update_tesselation(false);
        let builds_before = patch.tesselation_builds();

        let mut node = PatchNode::new(&mut patch);
        node.transform(&Mat3::new_translation(&Vec2::new(0.25, 0.0)));

        assert!(patch.tesselation_builds() > builds_before);
    }

    #[test]
    fn test_patch_commit_retesselates_again() {
        let mut patch = flat_patch();

        {
            let mut node = PatchNode::new(&mut patch);
            node.begin_transformation();
            node.transform(&Mat3::new_translation(&Vec2::new(0.25, 0.0)));
        }
        let builds_after_transform = patch.tesselation_builds();

        {
            let mut node = PatchNode::new(&mut patch);
            node.commit_transformation();
        }

        assert!(patch.tesselation_builds() > builds_after_transform);
        assert_eq!(patch.controls()[0].texcoord, Vec2::new(0.25, 0.0));
    }

    #[test]
    fn test_local_bounds_cover_working_texcoords() {
        let mut face = quad_face();
        let node = FaceNode::new(&mut face);

        let bounds = node.local_bounds();
        assert_eq!(bounds.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 1.0, 0.0));
    }
}
