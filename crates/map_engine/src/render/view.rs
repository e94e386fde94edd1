//! Views and volume tests
//!
//! A view is whatever the backend renders into: the 3D camera, or one of
//! the orthographic 2D views. Culling decisions in the frontend only ever
//! see the [`VolumeTest`] face of a view.

use bitflags::bitflags;

use crate::foundation::math::{Aabb, Mat4, Vec3};

/// Result of testing a bounding volume against a view volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeIntersection {
    /// Entirely outside the view volume
    Outside,
    /// Straddling the view volume boundary
    PartiallyInside,
    /// Entirely inside the view volume
    Inside,
}

/// Culling interface offered to scene nodes during traversal
pub trait VolumeTest {
    /// Test an AABB against this volume
    fn test_aabb(&self, bounds: &Aabb) -> VolumeIntersection;

    /// True when this is a filled (camera) rendering volume rather than a
    /// wireframe 2D view
    fn fill(&self) -> bool;
}

bitflags! {
    /// The view types a material can be rendered in
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RenderViewType: u32 {
        /// The perspective camera view
        const CAMERA = 1 << 0;
        /// The orthographic 2D views
        const ORTHO_VIEW = 1 << 1;
    }
}

/// Full view interface used by the backend passes
pub trait RenderView: VolumeTest {
    /// Combined view-projection matrix
    fn view_projection(&self) -> Mat4;

    /// World-space viewer position
    fn viewer(&self) -> Vec3;

    /// Which kind of view this is
    fn view_type(&self) -> RenderViewType;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BoxView {
        volume: Aabb,
    }

    impl VolumeTest for BoxView {
        fn test_aabb(&self, bounds: &Aabb) -> VolumeIntersection {
            if !self.volume.intersects(bounds) {
                VolumeIntersection::Outside
            } else if self.volume.contains_point(bounds.min)
                && self.volume.contains_point(bounds.max)
            {
                VolumeIntersection::Inside
            } else {
                VolumeIntersection::PartiallyInside
            }
        }

        fn fill(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_box_view_classification() {
        let view = BoxView {
            volume: Aabb::new(Vec3::zeros(), Vec3::new(10.0, 10.0, 10.0)),
        };

        let inside = Aabb::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(2.0, 2.0, 2.0));
        let straddling = Aabb::new(Vec3::new(9.0, 9.0, 9.0), Vec3::new(11.0, 11.0, 11.0));
        let outside = Aabb::new(Vec3::new(20.0, 20.0, 20.0), Vec3::new(21.0, 21.0, 21.0));

        assert_eq!(view.test_aabb(&inside), VolumeIntersection::Inside);
        assert_eq!(view.test_aabb(&straddling), VolumeIntersection::PartiallyInside);
        assert_eq!(view.test_aabb(&outside), VolumeIntersection::Outside);
    }
}
