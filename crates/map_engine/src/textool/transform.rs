//! Texture-space flip and rotate
//!
//! Both operations build a 2D affine matrix of the shape
//! `translate(+pivot) * linear * translate(-pivot)` and run it through the
//! uniform begin/transform/commit sequence of a texture-tool node, so faces
//! and patches are handled by the same code.

use nalgebra::Rotation2;

use crate::foundation::math::{Mat3, Vec2};
use crate::textool::node::TextureToolNode;

/// The texture axis a flip mirrors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipAxis {
    /// Mirror the horizontal (s) axis
    Horizontal,
    /// Mirror the vertical (t) axis
    Vertical,
}

fn apply_transform(node: &mut dyn TextureToolNode, transform: &Mat3) {
    node.begin_transformation();
    node.transform(transform);
    node.commit_transformation();
}

fn pivot_transform(pivot: Vec2, linear: Mat3) -> Mat3 {
    Mat3::new_translation(&pivot) * linear * Mat3::new_translation(&-pivot)
}

// The pivot both operations derive when none is given explicitly
fn bounds_center(node: &dyn TextureToolNode) -> Vec2 {
    let center = node.local_bounds().center();
    Vec2::new(center.x, center.y)
}

/// Reflects one texture axis about a pivot
pub struct TextureFlipper {
    transform: Mat3,
}

impl TextureFlipper {
    /// Create a flipper about the given center
    pub fn new(flip_center: Vec2, axis: FlipAxis) -> Self {
        let mut flip = Mat3::identity();
        match axis {
            FlipAxis::Horizontal => flip[(0, 0)] = -1.0,
            FlipAxis::Vertical => flip[(1, 1)] = -1.0,
        }

        Self {
            transform: pivot_transform(flip_center, flip),
        }
    }

    /// Apply the flip to a node
    pub fn process_node(&self, node: &mut dyn TextureToolNode) {
        apply_transform(node, &self.transform);
    }

    /// Flip a node about the center of its own bounds
    pub fn flip_node(node: &mut dyn TextureToolNode, axis: FlipAxis) {
        let flipper = Self::new(bounds_center(node), axis);
        flipper.process_node(node);
    }
}

/// Rotates texture coordinates by an angle about a pivot
pub struct TextureRotator {
    transform: Mat3,
}

impl TextureRotator {
    /// Create a rotator about the given pivot; the angle is in radians
    pub fn new(pivot: Vec2, angle: f32) -> Self {
        Self {
            transform: pivot_transform(pivot, Rotation2::new(angle).to_homogeneous()),
        }
    }

    /// Apply the rotation to a node
    pub fn process_node(&self, node: &mut dyn TextureToolNode) {
        apply_transform(node, &self.transform);
    }

    /// Rotate a node about the center of its own bounds
    pub fn rotate_node(node: &mut dyn TextureToolNode, angle: f32) {
        let rotator = Self::new(bounds_center(node), angle);
        rotator.process_node(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    use crate::foundation::math::Vec3;
    use crate::textool::node::{Face, FaceNode, Patch, PatchControl, PatchNode};

    fn quad_face() -> Face {
        Face::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(0.0, 1.0),
        ])
    }

    fn assert_texcoord_eq(actual: Vec2, expected: Vec2) {
        assert_relative_eq!(actual.x, expected.x, epsilon = 1e-5);
        assert_relative_eq!(actual.y, expected.y, epsilon = 1e-5);
    }

    #[test]
    fn test_flip_about_bounds_center() {
        let mut face = quad_face();

        {
            let mut node = FaceNode::new(&mut face);
            TextureFlipper::flip_node(&mut node, FlipAxis::Horizontal);
        }

        // Flipped about x = 1: 0 <-> 2, y untouched
        assert_texcoord_eq(face.texcoords()[0], Vec2::new(2.0, 0.0));
        assert_texcoord_eq(face.texcoords()[1], Vec2::new(0.0, 0.0));
        assert_texcoord_eq(face.texcoords()[2], Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_flip_is_an_involution() {
        let mut face = quad_face();

        for _ in 0..2 {
            let mut node = FaceNode::new(&mut face);
            TextureFlipper::flip_node(&mut node, FlipAxis::Vertical);
        }

        for (texcoord, original) in face.texcoords().iter().zip(quad_face().texcoords()) {
            assert_texcoord_eq(*texcoord, *original);
        }
    }

    #[test]
    fn test_rotate_quarter_turn_about_pivot() {
        let mut face = Face::new(vec![Vec2::new(2.0, 1.0)]);

        {
            let mut node = FaceNode::new(&mut face);
            let rotator = TextureRotator::new(Vec2::new(1.0, 1.0), FRAC_PI_2);
            rotator.process_node(&mut node);
        }

        // (2,1) rotated 90 degrees counter-clockwise about (1,1) lands on (1,2)
        assert_texcoord_eq(face.texcoords()[0], Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_same_transform_code_drives_patches() {
        let mut patch = Patch::new(
            1,
            2,
            vec![
                PatchControl {
                    vertex: Vec3::zeros(),
                    texcoord: Vec2::new(0.0, 0.0),
                },
                PatchControl {
                    vertex: Vec3::new(0.0, 1.0, 0.0),
                    texcoord: Vec2::new(0.0, 4.0),
                },
            ],
        );

        let builds_before = patch.tesselation_builds();

        {
            let mut node = PatchNode::new(&mut patch);
            TextureFlipper::flip_node(&mut node, FlipAxis::Vertical);
        }

        // Flipped about y = 2
        assert_texcoord_eq(patch.controls()[0].texcoord, Vec2::new(0.0, 4.0));
        assert_texcoord_eq(patch.controls()[1].texcoord, Vec2::new(0.0, 0.0));

        // The commit forced a re-tesselation of the transformed grid
        assert!(patch.tesselation_builds() > builds_before);
    }
}
