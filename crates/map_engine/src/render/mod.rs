//! # Rendering System
//!
//! The render-collection and light-interaction pipeline of the editor: a
//! two-phase immediate-mode-style renderer. During traversal, scene nodes
//! submit drawable geometry and material state into a collector; the
//! collected records are then consolidated per light, per material and per
//! entity into batched draw submissions.
//!
//! ## Architecture
//!
//! ```text
//! Scene traversal (frontend)
//!      ↓ collector protocol
//! Accumulated (material, transform, entity) records
//!      ↓ light interactions
//! Batched draw submissions → backend programs
//! ```
//!
//! The backend (GPU device, shader programs) lives outside this crate; the
//! pipeline's obligation ends at ordered submissions plus the evaluated
//! per-pass uniform values.

pub mod backend;
pub mod collector;
pub mod collectors;
pub mod entity;
pub mod geometry;
pub mod light;
pub mod light_interactions;
pub mod material;
pub mod traversal;
pub mod view;

pub use backend::{DepthFillProgram, InteractionProgram};
pub use collector::{
    HighlightFlags, LightList, MaterialStateStack, NodeHighlight, Renderable,
    RenderableCollector, RenderStyle,
};
pub use collectors::{FullMaterialsCollector, Submission, WireframeCollector};
pub use entity::{EntityId, RenderEntity, RenderEntityRef, RenderableObject, RenderableObjectRef};
pub use geometry::{GeometryRenderer, GeometrySlot, GeometryStore, MeshVertex, StoredGeometry};
pub use light::RenderLight;
pub use light_interactions::LightInteractions;
pub use material::{
    DepthFillPass, DepthFillState, InteractionPass, InteractionState, Material,
    MaterialCoverage, MaterialId, MaterialStore, StageExpr, TextureTransformExpr,
};
pub use traversal::{render_scene, RenderSystem, Scene, SceneNode, SceneNodeRef};
pub use view::{RenderView, RenderViewType, VolumeIntersection, VolumeTest};
