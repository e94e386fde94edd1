//! Foundation utilities shared by every subsystem
//!
//! Math types, bounding volumes and logging helpers. Nothing in here knows
//! about entities, materials or the render pipeline.

pub mod logging;
pub mod math;

pub use math::{Aabb, Mat3, Mat4, Vec2, Vec3, Vec4};
