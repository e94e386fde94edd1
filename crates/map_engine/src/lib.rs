//! # Map Engine
//!
//! The rendering and entity-class core of a Doom 3-style level editor.
//!
//! ## Features
//!
//! - **Renderable Collection**: two-phase frontend where scene nodes submit
//!   drawable state into collectors during one scenegraph walk
//! - **Light Interactions**: per-light batching of surfaces into depth-fill
//!   and lit interaction passes, with multi-draw batching of
//!   identity-transform objects
//! - **Entity Classes**: def-file parsing, single-parent inheritance with
//!   live colour cascades, attachment validation
//! - **Texture Tool**: flip/rotate transforms on face and patch texture
//!   coordinates
//!
//! ## Quick Start
//!
//! ```rust
//! use map_engine::eclass::EntityClassRegistry;
//!
//! let mut registry = EntityClassRegistry::new();
//! registry.begin_parse_pass();
//! registry.parse_def_text(
//!     r#"
//!     light_base { "editor_color" "1 0 0" "editor_light" "1" }
//!     light_torch { "inherit" "light_base" }
//!     "#,
//! );
//! registry.resolve_all();
//!
//! let torch = registry.find("light_torch").unwrap();
//! assert!(registry.class(torch).is_light());
//! ```
//!
//! GUI, VFS and asset import are external collaborators: they push token
//! streams into the registry and walk the collector protocol, but are not
//! part of this crate.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod eclass;
pub mod foundation;
pub mod render;
pub mod textool;

pub use config::{Config, ConfigError, CoreConfig, EclassSettings, RenderSettings};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, CoreConfig, RenderSettings},
        eclass::{ClassId, EntityClass, EntityClassRegistry},
        foundation::math::{Aabb, Mat3, Mat4, Vec2, Vec3, Vec4},
        render::{
            render_scene, FullMaterialsCollector, LightInteractions, Material, MaterialId,
            MaterialStore, RenderLight, RenderStyle, RenderableCollector, Scene,
            WireframeCollector,
        },
        textool::{FlipAxis, TextureFlipper, TextureRotator},
    };
}
