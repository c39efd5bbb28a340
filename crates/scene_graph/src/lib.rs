//! # Scene Graph
//!
//! Non-owning scene graph trees for 2D content, the algorithms that work on
//! them and a renderer that turns them into layer ordered draw batches.
//!
//! ## Features
//!
//! - **Render trees**: trees of node handles into an arena, with pre-order
//!   traversal and JSON persistence
//! - **Tree algorithms**: hit testing, coordinate mapping, bounding boxes,
//!   reparenting, deletion and duplication for every node kind
//! - **Scene content**: entity, animation and scene classes with runtime
//!   instances
//! - **Renderer**: per-node material/drawable cache with mark-and-sweep
//!   frame brackets, layer batching and mask passes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use scene_graph::prelude::*;
//!
//! fn draw_frame(
//!     renderer: &mut Renderer,
//!     scene: &Scene,
//!     painter: &mut dyn Painter,
//! ) {
//!     let mut transform = TransformStack::new();
//!     renderer.begin_frame();
//!     renderer.update_scene(scene, 1.0 / 60.0);
//!     renderer.draw_scene(scene, painter, &mut transform, None, None);
//!     renderer.end_frame();
//! }
//!
//! fn load(library: Arc<dyn ClassLibrary>, class: Arc<SceneClass>) -> Result<(), SceneError> {
//!     let scene = Scene::new(class)?;
//!     let mut renderer = Renderer::new(library);
//!     # let _ = (&scene, &mut renderer);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod render;
pub mod scene;
pub mod tree;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, ConfigFormat, RendererConfig, SceneGraphConfig},
        foundation::{
            collections::{EntityKey, EntityNodeKey, Key, NodeArena, SceneNodeKey},
            math::{FRect, Mat3, Point2, Transform2D, TransformStack, Vec2},
        },
        render::{
            ClassLibrary, Culling, DrawPacket, Drawable, EntityDrawHook, Material, Painter, Renderer,
            SceneDrawHook,
        },
        scene::{
            DrawableFlags, DrawableItem, Entity, EntityClass, EntityContainer, EntityNodeClass,
            NodeGraph, NodePlacement, RenderPass, Scene, SceneClass, SceneError, SceneNode,
            SceneNodeClass, VisualEntity,
        },
        tree::{ops, TreeError, TreeNode, TreeVisitor},
    };
}

#[cfg(test)]
mod tests;
