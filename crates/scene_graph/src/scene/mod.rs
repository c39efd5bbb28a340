//! Scene content
//!
//! Content comes in class (authoring time definition) and instance (runtime
//! copy) flavors. Both flavors of every kind implement [`SceneNode`], so the
//! tree algorithms and the renderer work with any of them.
//!
//! | kind      | class                | instance        |
//! |-----------|----------------------|-----------------|
//! | animation | [`AnimationClass`]   | [`Animation`]   |
//! | entity    | [`EntityClass`]      | [`Entity`]      |
//! | scene     | [`SceneClass`]       | [`Scene`]       |
//!
//! Scenes are containers of entities. Drawing a scene is a two level
//! operation, see [`EntityContainer`].

mod animation;
mod container;
mod entity;
mod graph;
mod node;
mod scene_class;
mod scene_instance;

pub use animation::{Animation, AnimationClass, AnimationNode, AnimationNodeClass};
pub use container::{EntityContainer, EntityObject, EntityPlacement, VisualEntity};
pub use entity::{Entity, EntityClass, EntityFlags, EntityNode, EntityNodeClass};
pub use graph::NodeGraph;
pub use node::{
    DrawableFlags, DrawableItem, DuplicateNode, NodePlacement, RenderPass, RenderStyle, SceneNode,
    SceneNodeMut,
};
pub use scene_class::{SceneClass, SceneNodeClass};
pub use scene_instance::Scene;

use crate::tree::TreeError;

/// Errors produced when building or loading scene content
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// Render tree error
    #[error("render tree error: {0}")]
    Tree(#[from] TreeError),

    /// Malformed JSON content
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required JSON field is missing
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    /// A scene node refers to an entity class that isn't available
    #[error("no entity class with id '{0}'")]
    UnknownEntityClass(String),
}
