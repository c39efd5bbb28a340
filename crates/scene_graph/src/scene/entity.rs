//! Entity content
//!
//! An [`EntityClass`] is a graph of [`EntityNodeClass`] nodes. An [`Entity`]
//! is created from a shared class and holds its own graph of mutable
//! [`EntityNode`] copies together with the entity's placement in a scene.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::node::impl_placed_node;
use super::{
    DrawableItem, DuplicateNode, EntityObject, NodeGraph, NodePlacement, SceneError, SceneNode,
    VisualEntity,
};
use crate::foundation::collections::{random_id, EntityNodeKey};
use crate::foundation::math::{Mat3, Vec2};

/// Node of an entity class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityNodeClass {
    id: String,
    name: String,
    #[serde(default)]
    placement: NodePlacement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    drawable: Option<DrawableItem>,
}

impl EntityNodeClass {
    /// Create a node with a fresh id and a 1x1 box at the origin
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: random_id(),
            name: name.into(),
            placement: NodePlacement::default(),
            drawable: None,
        }
    }

    /// Set the translation relative to the parent node
    pub fn with_translation(mut self, translation: Vec2) -> Self {
        self.placement.translation = translation;
        self
    }

    /// Set the box size
    pub fn with_size(mut self, size: Vec2) -> Self {
        self.placement.size = size;
        self
    }

    /// Set the placement
    pub fn with_placement(mut self, placement: NodePlacement) -> Self {
        self.placement = placement;
        self
    }

    /// Attach a drawable item
    pub fn with_drawable(mut self, item: DrawableItem) -> Self {
        self.drawable = Some(item);
        self
    }

    /// Placement of the node
    pub fn placement(&self) -> &NodePlacement {
        &self.placement
    }

    /// Mutable placement of the node
    pub fn placement_mut(&mut self) -> &mut NodePlacement {
        &mut self.placement
    }

    /// Mutable drawable item, if any
    pub fn drawable_mut(&mut self) -> Option<&mut DrawableItem> {
        self.drawable.as_mut()
    }

    /// Replace or remove the drawable item
    pub fn set_drawable(&mut self, item: Option<DrawableItem>) {
        self.drawable = item;
    }

    /// Change the node name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

impl_placed_node!(EntityNodeClass);

impl DuplicateNode for EntityNodeClass {
    fn duplicate(&self) -> Self {
        Self {
            id: random_id(),
            name: format!("Copy of {}", self.name),
            ..self.clone()
        }
    }
}

/// Runtime node of an entity
#[derive(Debug, Clone, PartialEq)]
pub struct EntityNode {
    id: String,
    class_id: String,
    name: String,
    placement: NodePlacement,
    drawable: Option<DrawableItem>,
}

impl EntityNode {
    /// Create an instance node from a class node. The instance gets its own
    /// id and copies of the class properties.
    pub fn from_class(klass: &EntityNodeClass) -> Self {
        Self {
            id: random_id(),
            class_id: klass.id.clone(),
            name: klass.name.clone(),
            placement: klass.placement,
            drawable: klass.drawable.clone(),
        }
    }

    /// Id of the class node this node was created from
    pub fn class_id(&self) -> &str {
        &self.class_id
    }

    /// Placement of the node
    pub fn placement(&self) -> &NodePlacement {
        &self.placement
    }

    /// Mutable placement of the node
    pub fn placement_mut(&mut self) -> &mut NodePlacement {
        &mut self.placement
    }

    /// Mutable drawable item, if any
    pub fn drawable_mut(&mut self) -> Option<&mut DrawableItem> {
        self.drawable.as_mut()
    }
}

impl_placed_node!(EntityNode);

impl DuplicateNode for EntityNode {
    fn duplicate(&self) -> Self {
        Self {
            id: random_id(),
            name: format!("Copy of {}", self.name),
            ..self.clone()
        }
    }
}

/// Entity definition
#[derive(Debug, Clone)]
pub struct EntityClass {
    id: String,
    name: String,
    graph: NodeGraph<EntityNodeKey, EntityNodeClass>,
}

impl EntityClass {
    /// Create an empty entity class with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: random_id(),
            name: name.into(),
            graph: NodeGraph::new(),
        }
    }

    /// Class id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node graph
    pub fn graph(&self) -> &NodeGraph<EntityNodeKey, EntityNodeClass> {
        &self.graph
    }

    /// The node graph for editing
    pub fn graph_mut(&mut self) -> &mut NodeGraph<EntityNodeKey, EntityNodeClass> {
        &mut self.graph
    }

    /// Serialize into JSON
    pub fn to_json(&self) -> Result<Value, SceneError> {
        let mut json = self.graph.to_json()?;
        json.insert("id".to_string(), Value::from(self.id.as_str()));
        json.insert("name".to_string(), Value::from(self.name.as_str()));
        Ok(Value::Object(json))
    }

    /// Load a class written by [`to_json`](Self::to_json)
    pub fn from_json(json: &Value) -> Result<Self, SceneError> {
        let id = json
            .get("id")
            .and_then(Value::as_str)
            .ok_or(SceneError::MissingField("id"))?;
        let name = json
            .get("name")
            .and_then(Value::as_str)
            .ok_or(SceneError::MissingField("name"))?;
        Ok(Self {
            id: id.to_string(),
            name: name.to_string(),
            graph: NodeGraph::from_json(json)?,
        })
    }
}

impl VisualEntity for EntityClass {
    type Key = EntityNodeKey;
    type Node = EntityNodeClass;

    fn id(&self) -> &str {
        &self.id
    }

    fn graph(&self) -> &NodeGraph<EntityNodeKey, EntityNodeClass> {
        &self.graph
    }
}

bitflags::bitflags! {
    /// Entity flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct EntityFlags: u32 {
        /// Entity is drawn in the game
        const VISIBLE_IN_GAME = 1 << 0;
    }
}

impl Default for EntityFlags {
    fn default() -> Self {
        Self::VISIBLE_IN_GAME
    }
}

/// Entity instance
#[derive(Debug, Clone)]
pub struct Entity {
    id: String,
    name: String,
    class: Arc<EntityClass>,
    placement: NodePlacement,
    layer: i32,
    flags: EntityFlags,
    parent_node_class_id: String,
    graph: NodeGraph<EntityNodeKey, EntityNode>,
}

impl Entity {
    /// Create an entity from a class. The new entity copies the class
    /// render tree with fresh instance nodes.
    pub fn new(class: Arc<EntityClass>) -> Self {
        let graph = class.graph().map_nodes(EntityNode::from_class);
        Self {
            id: random_id(),
            name: class.name().to_string(),
            class,
            placement: NodePlacement::default(),
            layer: 0,
            flags: EntityFlags::default(),
            parent_node_class_id: String::new(),
            graph,
        }
    }

    /// Set the instance name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the placement in the scene
    pub fn with_placement(mut self, placement: NodePlacement) -> Self {
        self.placement = placement;
        self
    }

    /// Set the entity layer
    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    /// Replace the flags
    pub fn with_flags(mut self, flags: EntityFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Attach under a node of the parent entity, identified by the node's
    /// class id
    pub fn with_parent_node_class_id(mut self, id: impl Into<String>) -> Self {
        self.parent_node_class_id = id.into();
        self
    }

    /// Instance id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Instance name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The class this entity was created from
    pub fn class(&self) -> &Arc<EntityClass> {
        &self.class
    }

    /// Placement in the scene
    pub fn placement(&self) -> &NodePlacement {
        &self.placement
    }

    /// Layer of the entity
    pub fn layer(&self) -> i32 {
        self.layer
    }

    /// Check a flag
    pub fn test_flag(&self, flag: EntityFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Turn a flag on or off
    pub fn set_flag(&mut self, flag: EntityFlags, on: bool) {
        self.flags.set(flag, on);
    }

    /// Class id of the parent entity node this entity is attached to
    pub fn parent_node_class_id(&self) -> &str {
        &self.parent_node_class_id
    }

    /// The instance node graph
    pub fn graph(&self) -> &NodeGraph<EntityNodeKey, EntityNode> {
        &self.graph
    }

    /// The instance node graph for editing
    pub fn graph_mut(&mut self) -> &mut NodeGraph<EntityNodeKey, EntityNode> {
        &mut self.graph
    }

    /// Find the instance node created from the class node `class_id`
    pub fn find_node_by_class_id(&self, class_id: &str) -> Option<EntityNodeKey> {
        self.graph
            .nodes()
            .iter()
            .find_map(|(key, node)| (node.class_id() == class_id).then_some(key))
    }
}

impl SceneNode for Entity {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn node_transform(&self) -> Mat3 {
        self.placement.node_transform()
    }
    fn model_transform(&self) -> Mat3 {
        self.placement.model_transform()
    }
    fn size(&self) -> Vec2 {
        self.placement.size
    }
    fn layer(&self) -> i32 {
        self.layer
    }
}

impl super::SceneNodeMut for Entity {
    fn set_translation(&mut self, translation: Vec2) {
        self.placement.translation = translation;
    }
    fn set_rotation(&mut self, rotation: f32) {
        self.placement.rotation = rotation;
    }
    fn set_scale(&mut self, scale: Vec2) {
        self.placement.scale = scale;
    }
}

impl DuplicateNode for Entity {
    fn duplicate(&self) -> Self {
        // inner nodes keep their names
        Self {
            id: random_id(),
            name: format!("Copy of {}", self.name),
            graph: self.graph.map_nodes(|node| EntityNode {
                id: random_id(),
                ..node.clone()
            }),
            ..self.clone()
        }
    }
}

impl EntityObject for Entity {
    fn layer(&self) -> i32 {
        self.layer
    }

    fn is_visible_in_game(&self) -> bool {
        self.test_flag(EntityFlags::VISIBLE_IN_GAME)
    }
}

impl VisualEntity for Entity {
    type Key = EntityNodeKey;
    type Node = EntityNode;

    fn id(&self) -> &str {
        &self.id
    }

    fn graph(&self) -> &NodeGraph<EntityNodeKey, EntityNode> {
        &self.graph
    }
}
