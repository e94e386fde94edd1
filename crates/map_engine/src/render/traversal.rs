//! Scene traversal
//!
//! Walks the visible node set once per frame, letting every node submit its
//! drawable state into the collector, then submits the renderables attached
//! directly to the render system (overlays, manipulators) the same way.

use std::sync::Arc;

use crate::foundation::math::Aabb;
use crate::render::collector::{
    HighlightFlags, NodeHighlight, Renderable, RenderableCollector,
};
use crate::render::view::{VolumeIntersection, VolumeTest};

/// A scenegraph node that can be rendered
pub trait SceneNode: Renderable {
    /// World-space bounds for view-volume culling
    fn world_bounds(&self) -> Aabb;

    /// Hidden nodes are skipped without a volume test
    fn is_visible(&self) -> bool {
        true
    }
}

/// Shared handle to a scene node
pub type SceneNodeRef = Arc<dyn SceneNode>;

/// The visible node set walked each frame
///
/// The full scenegraph (layers, filters, groups) lives outside this core;
/// what arrives here is the flat set of nodes that survived filtering.
#[derive(Default)]
pub struct Scene {
    nodes: Vec<SceneNodeRef>,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the visible set
    pub fn add_node(&mut self, node: SceneNodeRef) {
        self.nodes.push(node);
    }

    /// The visible node set
    pub fn nodes(&self) -> &[SceneNodeRef] {
        &self.nodes
    }
}

/// Owner of renderables attached outside the scenegraph
///
/// Manipulator widgets and overlays register here and are submitted after
/// the scene walk each frame.
#[derive(Default)]
pub struct RenderSystem {
    renderables: Vec<Arc<dyn Renderable>>,
}

impl RenderSystem {
    /// Create an empty render system
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a renderable; it is submitted every frame until detached
    pub fn attach_renderable(&mut self, renderable: Arc<dyn Renderable>) {
        self.renderables.push(renderable);
    }

    /// Detach a previously attached renderable
    pub fn detach_renderable(&mut self, renderable: &Arc<dyn Renderable>) {
        self.renderables.retain(|r| !Arc::ptr_eq(r, renderable));
    }

    /// Visit every attached renderable
    pub fn for_each_renderable(&self, mut visitor: impl FnMut(&dyn Renderable)) {
        for renderable in &self.renderables {
            visitor(renderable.as_ref());
        }
    }
}

/// Scene render function
///
/// Traverses the visible node set, submitting every node intersecting the
/// volume to the collector, then submits the renderables attached directly
/// to the render system.
pub fn render_scene(
    collector: &mut dyn RenderableCollector,
    volume: &dyn VolumeTest,
    scene: &Scene,
    render_system: &RenderSystem,
) {
    for node in scene.nodes() {
        if !node.is_visible() {
            continue;
        }

        if volume.test_aabb(&node.world_bounds()) == VolumeIntersection::Outside {
            continue;
        }

        render_highlighted(collector, volume, node.as_ref());
    }

    render_system.for_each_renderable(|renderable| {
        render_highlighted(collector, volume, renderable);
    });
}

// Submit one renderable with its highlight state mapped onto the collector
fn render_highlighted(
    collector: &mut dyn RenderableCollector,
    volume: &dyn VolumeTest,
    renderable: &dyn Renderable,
) {
    let highlight = renderable.highlight_flags();

    let selected = highlight.contains(NodeHighlight::SELECTED);
    let group_member = highlight.contains(NodeHighlight::SELECTED_GROUP_MEMBER);

    if selected {
        collector.set_highlight_flag(HighlightFlags::FACES | HighlightFlags::PRIMITIVES, true);
    }
    if group_member {
        collector.set_highlight_flag(HighlightFlags::GROUP_MEMBER, true);
    }

    if collector.supports_full_materials() {
        renderable.render_solid(collector, volume);
    } else {
        renderable.render_wireframe(collector, volume);
    }

    if selected {
        collector.set_highlight_flag(HighlightFlags::FACES | HighlightFlags::PRIMITIVES, false);
    }
    if group_member {
        collector.set_highlight_flag(HighlightFlags::GROUP_MEMBER, false);
    }
}
