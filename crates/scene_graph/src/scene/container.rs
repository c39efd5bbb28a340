//! Containers of entities
//!
//! A scene is a tree of entity placements where each placement refers to an
//! entity that has its own node graph. The renderer first collects all the
//! placements with their transforms, then draws each entity's graph.

use super::{NodeGraph, SceneNode};
use crate::foundation::collections::Key;
use crate::foundation::math::Mat3;

/// Content with a node graph that can be drawn
pub trait VisualEntity {
    /// Key type of the graph
    type Key: Key;
    /// Node type of the graph
    type Node: SceneNode;

    /// Id of the content. Containers update content with the same id once.
    fn id(&self) -> &str;

    /// The node graph to draw
    fn graph(&self) -> &NodeGraph<Self::Key, Self::Node>;
}

/// The per-placement properties the container draw looks at
pub trait EntityObject {
    /// Layer of the whole entity. Entities are drawn in ascending order.
    fn layer(&self) -> i32;

    /// Whether the entity should be drawn at all
    fn is_visible_in_game(&self) -> bool;
}

/// A placement collected from a container
#[derive(Debug)]
pub struct EntityPlacement<'a, O, V> {
    /// Transform from the entity's space to the container's space
    pub node_to_scene: Mat3,
    /// The placement object
    pub object: &'a O,
    /// The content drawn at the placement, if it's available
    pub visual: Option<&'a V>,
}

/// Content made of placed entities
pub trait EntityContainer {
    /// Placement object type
    type Object: EntityObject;
    /// Placed content type
    type Visual: VisualEntity;

    /// Collect all placements in render tree pre-order
    fn collect_nodes(&self) -> Vec<EntityPlacement<'_, Self::Object, Self::Visual>>;
}
