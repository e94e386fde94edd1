//! Shared geometry storage and draw submission
//!
//! All drawable geometry of a frame lives in one arena, addressed by slot
//! handles. The arena is populated while the scene is collected and is
//! strictly read-only during the draw phase; the draw passes only ever hand
//! slot handles to a [`GeometryRenderer`]. Batching hinges on this split: a
//! run of identity-transform objects can be submitted as one multi-slot
//! draw because their vertex data already lives in the shared store.

use bytemuck::{Pod, Zeroable};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a geometry allocation in the shared store
    pub struct GeometrySlot;
}

/// Vertex layout of the shared geometry store
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// Object-space position
    pub position: [f32; 3],
    /// Surface normal
    pub normal: [f32; 3],
    /// Texture coordinates
    pub texcoord: [f32; 2],
}

/// One geometry allocation: indexed triangles
#[derive(Debug, Clone, Default)]
pub struct StoredGeometry {
    /// Vertex data
    pub vertices: Vec<MeshVertex>,
    /// Triangle indices into `vertices`
    pub indices: Vec<u32>,
}

/// Arena of all drawable geometry for the current session
///
/// Allocation and deallocation must not happen while a draw pass is
/// running; collection and drawing are separate phases of the frame.
#[derive(Debug, Default)]
pub struct GeometryStore {
    slots: SlotMap<GeometrySlot, StoredGeometry>,
}

impl GeometryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
        }
    }

    /// Allocate a slot for the given geometry
    pub fn allocate(&mut self, geometry: StoredGeometry) -> GeometrySlot {
        self.slots.insert(geometry)
    }

    /// Release a slot
    pub fn deallocate(&mut self, slot: GeometrySlot) {
        self.slots.remove(slot);
    }

    /// Borrow the geometry stored at a slot
    pub fn get(&self, slot: GeometrySlot) -> Option<&StoredGeometry> {
        self.slots.get(slot)
    }

    /// Number of live allocations
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if the store holds no geometry
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Draw submission sink implemented by the rasterization backend
///
/// The rendering core's obligation ends here: it hands over slot handles in
/// draw order, one call per GPU draw.
pub trait GeometryRenderer {
    /// Draw a single object out of the store
    fn submit_geometry(&mut self, slot: GeometrySlot, store: &GeometryStore);

    /// Draw a batch of objects sharing one (identity) transform as a single
    /// multi-object draw call
    fn submit_multi(&mut self, slots: &[GeometrySlot], store: &GeometryStore);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> StoredGeometry {
        StoredGeometry {
            vertices: vec![
                MeshVertex {
                    position: [0.0, 0.0, 0.0],
                    normal: [0.0, 0.0, 1.0],
                    texcoord: [0.0, 0.0],
                },
                MeshVertex {
                    position: [1.0, 0.0, 0.0],
                    normal: [0.0, 0.0, 1.0],
                    texcoord: [1.0, 0.0],
                },
                MeshVertex {
                    position: [0.0, 1.0, 0.0],
                    normal: [0.0, 0.0, 1.0],
                    texcoord: [0.0, 1.0],
                },
            ],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn test_allocate_and_get() {
        let mut store = GeometryStore::new();
        assert!(store.is_empty());

        let slot = store.allocate(triangle());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(slot).unwrap().indices.len(), 3);

        store.deallocate(slot);
        assert!(store.get(slot).is_none());
    }

    #[test]
    fn test_slots_stay_valid_across_other_deallocations() {
        let mut store = GeometryStore::new();
        let first = store.allocate(triangle());
        let second = store.allocate(triangle());

        store.deallocate(first);
        assert!(store.get(second).is_some());
    }
}
