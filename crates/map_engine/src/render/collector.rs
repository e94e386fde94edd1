//! The renderable-collector protocol
//!
//! During the first phase of a frame every scene node is handed a
//! collector, sets the material state it needs and submits its drawable
//! objects. Nothing is drawn here; the collector only accumulates
//! (material, transform, entity) records that the backend passes consume
//! later. The two-phase split lets one scene walk serve several purposes
//! (depth pass, interaction pass, wireframe overlay) without re-traversing
//! the scenegraph.

use bitflags::bitflags;

use crate::foundation::math::Mat4;
use crate::render::entity::{EntityId, RenderableObjectRef};
use crate::render::light::RenderLight;
use crate::render::material::MaterialId;
use crate::render::view::VolumeTest;

/// The two render styles a collector may accept state for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStyle {
    /// Wireframe-only rendering (2D views)
    WireframeOnly,
    /// Full materials rendering (camera view)
    FullMaterials,
}

bitflags! {
    /// Highlight state applied to subsequently submitted objects
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct HighlightFlags: u32 {
        /// Highlight faces of subsequently submitted objects, if supported
        const FACES = 1 << 0;
        /// Highlight primitives of subsequently submitted objects, if supported
        const PRIMITIVES = 1 << 1;
        /// Highlight as member of a group, if supported
        const GROUP_MEMBER = 1 << 2;
    }
}

bitflags! {
    /// Highlight state reported by a scene node
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeHighlight: u32 {
        /// The node is selected
        const SELECTED = 1 << 0;
        /// The node belongs to a selected group
        const SELECTED_GROUP_MEMBER = 1 << 1;
    }
}

/// Shared list of lights handed to collectors that support lit rendering
pub type LightList = Vec<RenderLight>;

/// Accepts drawable objects during the first pass of rendering
///
/// Each renderable in the scenegraph is passed a collector, on which it
/// sets the necessary state and then submits its drawable objects. A single
/// node may submit more than one object with a different state each time,
/// e.g. a model submits each of its material surfaces separately with the
/// respective material set beforehand.
pub trait RenderableCollector {
    /// Push the current material state
    ///
    /// This is an OpenGL-style push: it duplicates the topmost stack value
    /// rather than accepting an argument. The new value should then be
    /// changed with [`set_state`](Self::set_state).
    fn push_state(&mut self);

    /// Pop the topmost material state, discarding it
    ///
    /// # Panics
    /// Panics when the stack is empty; an unbalanced push/pop pair is a bug
    /// in the calling node, not a recoverable condition.
    fn pop_state(&mut self);

    /// Set the material used for subsequently submitted objects
    ///
    /// The style says which rendering mode the state applies to; collectors
    /// not interested in that mode ignore the call.
    fn set_state(&mut self, material: MaterialId, style: RenderStyle);

    /// Submit an object for rendering with the current material state
    fn add_renderable(&mut self, drawable: RenderableObjectRef, world: Mat4);

    /// Like [`add_renderable`](Self::add_renderable), additionally carrying
    /// the owning entity so entity-dependent stage expressions can be
    /// evaluated right before drawing rather than at submission time
    fn add_renderable_with_entity(
        &mut self,
        drawable: RenderableObjectRef,
        world: Mat4,
        entity: EntityId,
    );

    /// Whether this collector accepts full-materials submissions or only
    /// wireframe ones
    fn supports_full_materials(&self) -> bool;

    /// Toggle highlight flags applied to subsequently submitted objects
    fn set_highlight_flag(&mut self, flags: HighlightFlags, enabled: bool);

    /// Set the lights for lighting-mode rendering
    ///
    /// Only meaningful for collectors that support lit rendering; the
    /// default implementation ignores the call.
    fn set_lights(&mut self, lights: LightList) {
        let _ = lights;
    }
}

/// Interface implemented by every object that renders itself into a
/// collector during scene traversal
pub trait Renderable {
    /// Submit geometry for solid (full materials) rendering
    fn render_solid(&self, collector: &mut dyn RenderableCollector, volume: &dyn VolumeTest);

    /// Submit geometry for wireframe rendering
    fn render_wireframe(&self, collector: &mut dyn RenderableCollector, volume: &dyn VolumeTest);

    /// Submit component geometry (vertices, edges); most nodes have none
    fn render_components(&self, collector: &mut dyn RenderableCollector, volume: &dyn VolumeTest) {
        let _ = (collector, volume);
    }

    /// How the traversal should highlight this node
    fn highlight_flags(&self) -> NodeHighlight {
        NodeHighlight::empty()
    }
}

/// The material state stack shared by collector implementations
///
/// Collectors differ in what they record, not in how state is stacked, so
/// the stack is a separate piece they compose.
#[derive(Debug)]
pub struct MaterialStateStack {
    stack: Vec<Option<MaterialId>>,
}

impl MaterialStateStack {
    /// Create a stack with one empty state on it
    pub fn new() -> Self {
        Self { stack: vec![None] }
    }

    /// Duplicate the topmost state
    pub fn push(&mut self) {
        let top = *self.top();
        self.stack.push(top);
    }

    /// Discard the topmost state
    ///
    /// # Panics
    /// Panics when popping would empty the stack.
    pub fn pop(&mut self) {
        assert!(
            self.stack.len() > 1,
            "material state stack popped below its base entry"
        );
        self.stack.pop();
    }

    /// Replace the topmost state
    pub fn set(&mut self, material: MaterialId) {
        *self.stack.last_mut().expect("stack never empty") = Some(material);
    }

    /// The current state
    pub fn top(&self) -> &Option<MaterialId> {
        self.stack.last().expect("stack never empty")
    }
}

impl Default for MaterialStateStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::material::{Material, MaterialStore};

    #[test]
    fn test_push_duplicates_top() {
        let mut store = MaterialStore::new();
        let id = store.insert(Material::new("textures/a"));

        let mut stack = MaterialStateStack::new();
        stack.set(id);
        stack.push();

        assert_eq!(*stack.top(), Some(id));

        stack.pop();
        assert_eq!(*stack.top(), Some(id));
    }

    #[test]
    fn test_set_only_affects_top() {
        let mut store = MaterialStore::new();
        let first = store.insert(Material::new("textures/a"));
        let second = store.insert(Material::new("textures/b"));

        let mut stack = MaterialStateStack::new();
        stack.set(first);
        stack.push();
        stack.set(second);

        assert_eq!(*stack.top(), Some(second));
        stack.pop();
        assert_eq!(*stack.top(), Some(first));
    }

    #[test]
    #[should_panic(expected = "popped below its base entry")]
    fn test_pop_empty_stack_panics() {
        let mut stack = MaterialStateStack::new();
        stack.pop();
    }
}
