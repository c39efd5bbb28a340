//! Scene definition
//!
//! A [`SceneClass`] is a render tree of [`SceneNodeClass`] placements. Each
//! placement puts an [`EntityClass`] somewhere in the scene. A placement
//! linked under another placement can be attached to a specific node of the
//! parent's entity.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    DuplicateNode, EntityClass, EntityContainer, EntityFlags, EntityObject, EntityPlacement,
    NodeGraph, NodePlacement, SceneError, SceneNode, SceneNodeMut,
};
use crate::foundation::collections::{random_id, NodeArena, SceneNodeKey};
use crate::foundation::math::{Mat3, TransformStack, Vec2};
use crate::tree::TreeVisitor;

/// Placement of an entity class in a scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneNodeClass {
    id: String,
    name: String,
    entity_id: String,
    #[serde(default)]
    placement: NodePlacement,
    #[serde(default)]
    layer: i32,
    #[serde(default)]
    flags: EntityFlags,
    #[serde(default)]
    parent_node_id: String,
    #[serde(skip)]
    entity: Option<Arc<EntityClass>>,
}

impl SceneNodeClass {
    /// Create a placement of `entity`
    pub fn new(name: impl Into<String>, entity: Arc<EntityClass>) -> Self {
        Self {
            id: random_id(),
            name: name.into(),
            entity_id: entity.id().to_string(),
            placement: NodePlacement::default(),
            layer: 0,
            flags: EntityFlags::default(),
            parent_node_id: String::new(),
            entity: Some(entity),
        }
    }

    /// Set the translation in the scene
    pub fn with_translation(mut self, translation: Vec2) -> Self {
        self.placement.translation = translation;
        self
    }

    /// Set the placement
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

    /// Attach under the node `node_id` of the parent placement's entity
    pub fn with_parent_node_id(mut self, node_id: impl Into<String>) -> Self {
        self.parent_node_id = node_id.into();
        self
    }

    /// Id of the placed entity class
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// The placed entity class, if it has been resolved
    pub fn entity(&self) -> Option<&Arc<EntityClass>> {
        self.entity.as_ref()
    }

    /// Replace the placed entity class
    pub fn set_entity(&mut self, entity: Arc<EntityClass>) {
        self.entity_id = entity.id().to_string();
        self.entity = Some(entity);
    }

    /// Placement in the scene
    pub fn placement(&self) -> &NodePlacement {
        &self.placement
    }

    /// Flags copied to entities created from this placement
    pub fn flags(&self) -> EntityFlags {
        self.flags
    }

    /// Id of the parent entity's node this placement is attached to
    pub fn parent_node_id(&self) -> &str {
        &self.parent_node_id
    }

    /// Check a flag
    pub fn test_flag(&self, flag: EntityFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Turn a flag on or off
    pub fn set_flag(&mut self, flag: EntityFlags, on: bool) {
        self.flags.set(flag, on);
    }
}

impl SceneNode for SceneNodeClass {
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

impl SceneNodeMut for SceneNodeClass {
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

impl DuplicateNode for SceneNodeClass {
    fn duplicate(&self) -> Self {
        Self {
            id: random_id(),
            name: format!("Copy of {}", self.name),
            ..self.clone()
        }
    }
}

impl EntityObject for SceneNodeClass {
    fn layer(&self) -> i32 {
        self.layer
    }

    fn is_visible_in_game(&self) -> bool {
        self.test_flag(EntityFlags::VISIBLE_IN_GAME)
    }
}

/// Scene definition
#[derive(Debug, Clone)]
pub struct SceneClass {
    id: String,
    name: String,
    graph: NodeGraph<SceneNodeKey, SceneNodeClass>,
}

impl SceneClass {
    /// Create an empty scene with a fresh id
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

    /// The placement graph
    pub fn graph(&self) -> &NodeGraph<SceneNodeKey, SceneNodeClass> {
        &self.graph
    }

    /// The placement graph for editing
    pub fn graph_mut(&mut self) -> &mut NodeGraph<SceneNodeKey, SceneNodeClass> {
        &mut self.graph
    }

    /// Serialize into JSON. Entities are referred to by class id.
    pub fn to_json(&self) -> Result<Value, SceneError> {
        let mut json = self.graph.to_json()?;
        json.insert("id".to_string(), Value::from(self.id.as_str()));
        json.insert("name".to_string(), Value::from(self.name.as_str()));
        Ok(Value::Object(json))
    }

    /// Load a scene written by [`to_json`](Self::to_json). Entity classes
    /// are looked up by id with `find_entity`.
    pub fn from_json<F>(json: &Value, mut find_entity: F) -> Result<Self, SceneError>
    where
        F: FnMut(&str) -> Option<Arc<EntityClass>>,
    {
        let id = json
            .get("id")
            .and_then(Value::as_str)
            .ok_or(SceneError::MissingField("id"))?;
        let name = json
            .get("name")
            .and_then(Value::as_str)
            .ok_or(SceneError::MissingField("name"))?;

        let mut graph: NodeGraph<SceneNodeKey, SceneNodeClass> = NodeGraph::from_json(json)?;
        let keys: Vec<_> = graph.nodes().keys().collect();
        for key in keys {
            let Some(node) = graph.node_mut(key) else {
                continue;
            };
            let entity = find_entity(&node.entity_id)
                .ok_or_else(|| SceneError::UnknownEntityClass(node.entity_id.clone()))?;
            node.entity = Some(entity);
        }

        Ok(Self {
            id: id.to_string(),
            name: name.to_string(),
            graph,
        })
    }
}

struct CollectVisitor<'a> {
    nodes: &'a NodeArena<SceneNodeKey, SceneNodeClass>,
    parents: Vec<&'a SceneNodeClass>,
    transform: TransformStack,
    result: Vec<EntityPlacement<'a, SceneNodeClass, EntityClass>>,
}

impl TreeVisitor<SceneNodeKey> for CollectVisitor<'_> {
    fn enter_node(&mut self, value: Option<SceneNodeKey>) {
        let nodes = self.nodes;
        let Some(node) = value.and_then(|key| nodes.get(key)) else {
            return;
        };

        // a child placement is relative to a node of its parent's entity
        let parent_node_transform = self
            .parents
            .last()
            .and_then(|parent| parent.entity())
            .and_then(|entity| {
                let graph = entity.graph();
                graph.find_node_transform(graph.find_node_by_id(node.parent_node_id())?)
            })
            .unwrap_or_else(Mat3::identity);

        self.transform.push(parent_node_transform);
        self.transform.push(node.node_transform());
        self.parents.push(node);
        self.result.push(EntityPlacement {
            node_to_scene: self.transform.matrix(),
            object: node,
            visual: node.entity.as_deref(),
        });
    }

    fn leave_node(&mut self, value: Option<SceneNodeKey>) {
        if value.and_then(|key| self.nodes.get(key)).is_none() {
            return;
        }
        self.transform.pop();
        self.transform.pop();
        self.parents.pop();
    }
}

impl EntityContainer for SceneClass {
    type Object = SceneNodeClass;
    type Visual = EntityClass;

    fn collect_nodes(&self) -> Vec<EntityPlacement<'_, SceneNodeClass, EntityClass>> {
        let mut visitor = CollectVisitor {
            nodes: self.graph.nodes(),
            parents: Vec::new(),
            transform: TransformStack::new(),
            result: Vec::new(),
        };
        self.graph.render_tree().pre_order_traverse(&mut visitor);
        visitor.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point2;
    use crate::scene::EntityNodeClass;
    use approx::assert_relative_eq;

    fn ship() -> Arc<EntityClass> {
        let mut class = EntityClass::new("ship");
        let hull = class
            .graph_mut()
            .add_child(None, EntityNodeClass::new("hull"))
            .unwrap();
        class
            .graph_mut()
            .add_child(
                Some(hull),
                EntityNodeClass::new("mount").with_translation(Vec2::new(0.0, 5.0)),
            )
            .unwrap();
        Arc::new(class)
    }

    #[test]
    fn test_collect_nodes_composes_transforms() {
        let ship = ship();
        let mount_id = {
            let mount = ship.graph().find_node_by_name("mount").unwrap();
            ship.graph().node(mount).unwrap().id().to_string()
        };

        let mut scene = SceneClass::new("level");
        let mothership = scene
            .graph_mut()
            .add_child(
                None,
                SceneNodeClass::new("mothership", Arc::clone(&ship))
                    .with_translation(Vec2::new(100.0, 0.0)),
            )
            .unwrap();
        scene
            .graph_mut()
            .add_child(
                Some(mothership),
                SceneNodeClass::new("fighter", Arc::clone(&ship))
                    .with_translation(Vec2::new(1.0, 0.0))
                    .with_parent_node_id(mount_id),
            )
            .unwrap();

        let placements = scene.collect_nodes();
        assert_eq!(placements.len(), 2);
        let origin = |index: usize| placements[index].node_to_scene.transform_point(&Point2::origin());
        assert_relative_eq!(origin(0), Point2::new(100.0, 0.0));
        assert_relative_eq!(origin(1), Point2::new(101.0, 5.0));
        assert!(placements.iter().all(|placement| placement.visual.is_some()));
    }

    #[test]
    fn test_json_resolves_entity_classes() {
        let ship = ship();
        let mut scene = SceneClass::new("level");
        scene
            .graph_mut()
            .add_child(None, SceneNodeClass::new("player", Arc::clone(&ship)).with_layer(2))
            .unwrap();

        let json = scene.to_json().unwrap();
        let restored = SceneClass::from_json(&json, |id| (id == ship.id()).then(|| Arc::clone(&ship))).unwrap();
        let player = restored.graph().find_node_by_name("player").unwrap();
        let player = restored.graph().node(player).unwrap();
        assert_eq!(EntityObject::layer(player), 2);
        assert!(Arc::ptr_eq(player.entity().unwrap(), &ship));

        let missing = SceneClass::from_json(&json, |_| None);
        assert!(matches!(missing, Err(SceneError::UnknownEntityClass(id)) if id == ship.id()));
    }

    #[test]
    fn test_duplicate_placement() {
        let mut scene = SceneClass::new("level");
        let player = scene
            .graph_mut()
            .add_child(None, SceneNodeClass::new("player", ship()))
            .unwrap();
        let copy = scene.graph_mut().duplicate_node(player).unwrap();
        let (original, copy) = (
            scene.graph().node(player).unwrap(),
            scene.graph().node(copy).unwrap(),
        );
        assert_ne!(SceneNode::id(original), SceneNode::id(copy));
        assert_eq!(SceneNode::name(copy), "Copy of player");
        assert_eq!(original.entity_id(), copy.entity_id());
    }
}
