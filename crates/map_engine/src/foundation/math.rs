//! Math utilities and types
//!
//! Provides the fundamental math types used throughout the rendering core.

pub use nalgebra::{
    Matrix3, Matrix4,
    Vector2, Vector3, Vector4,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type (homogeneous 2D transforms in texture space)
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type (local-to-world and projection transforms)
pub type Mat4 = Matrix4<f32>;

/// 2D point type
pub type Point2 = nalgebra::Point2<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Axis-Aligned Bounding Box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Create an empty AABB that grows to include points
    ///
    /// The empty box intersects nothing and contains nothing until the
    /// first [`include_point`](Self::include_point) call.
    pub fn empty() -> Self {
        Self {
            min: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Check whether this AABB has been fed at least one point
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Grow the box to include a point
    pub fn include_point(&mut self, point: Vec3) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    /// Grow the box to include another AABB
    pub fn include_aabb(&mut self, other: &Aabb) {
        if other.is_valid() {
            self.include_point(other.min);
            self.include_point(other.max);
        }
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }
}

/// Parse a whitespace-separated `"x y z"` string into a vector
///
/// Entity definition values store vectors as plain strings. Missing or
/// malformed components are treated as absent, so `"1 0"` and `"?"` both
/// return `None`.
pub fn parse_vec3(value: &str) -> Option<Vec3> {
    let mut parts = value.split_whitespace();
    let x = parts.next()?.parse::<f32>().ok()?;
    let y = parts.next()?.parse::<f32>().ok()?;
    let z = parts.next()?.parse::<f32>().ok()?;
    Some(Vec3::new(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_contains_point() {
        let aabb = Aabb::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
        );

        assert!(aabb.contains_point(Vec3::zeros()));
        assert!(aabb.contains_point(Vec3::new(0.5, 0.5, 0.5)));
        assert!(!aabb.contains_point(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_aabb_intersects() {
        let aabb1 = Aabb::new(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));
        let aabb2 = Aabb::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(3.0, 3.0, 3.0));
        let aabb3 = Aabb::new(Vec3::new(5.0, 5.0, 5.0), Vec3::new(7.0, 7.0, 7.0));

        assert!(aabb1.intersects(&aabb2));
        assert!(!aabb1.intersects(&aabb3));
    }

    #[test]
    fn test_aabb_include_point_grows_empty_box() {
        let mut aabb = Aabb::empty();
        assert!(!aabb.is_valid());

        aabb.include_point(Vec3::new(1.0, 2.0, 3.0));
        aabb.include_point(Vec3::new(-1.0, 0.0, 0.0));

        assert!(aabb.is_valid());
        assert_eq!(aabb.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_parse_vec3() {
        assert_eq!(parse_vec3("1 0 0"), Some(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(parse_vec3("0.3 0.3 1"), Some(Vec3::new(0.3, 0.3, 1.0)));
        assert_eq!(parse_vec3("?"), None);
        assert_eq!(parse_vec3("1 2"), None);
        assert_eq!(parse_vec3(""), None);
    }
}
