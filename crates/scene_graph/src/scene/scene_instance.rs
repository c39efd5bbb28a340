//! Scene instance
//!
//! A [`Scene`] is created from a [`SceneClass`]. Every placement in the
//! class becomes an [`Entity`] in the scene's own render tree.

use std::sync::Arc;

use log::info;

use super::{
    Entity, EntityContainer, EntityPlacement, NodeGraph, SceneClass, SceneError, SceneNode,
};
use crate::foundation::collections::{random_id, EntityKey, NodeArena};
use crate::foundation::math::{Mat3, TransformStack};
use crate::tree::{TreeError, TreeVisitor};

/// Runtime scene
#[derive(Debug)]
pub struct Scene {
    id: String,
    class: Arc<SceneClass>,
    graph: NodeGraph<EntityKey, Entity>,
}

impl Scene {
    /// Create the scene and one entity per placement of the class.
    ///
    /// Fails with [`SceneError::UnknownEntityClass`] if a placement has no
    /// resolved entity class.
    pub fn new(class: Arc<SceneClass>) -> Result<Self, SceneError> {
        let graph = class.graph().try_map_nodes(|placement| {
            let entity = placement
                .entity()
                .ok_or_else(|| SceneError::UnknownEntityClass(placement.entity_id().to_string()))?;
            Ok::<Entity, SceneError>(
                Entity::new(Arc::clone(entity))
                    .with_name(placement.name())
                    .with_placement(*placement.placement())
                    .with_layer(SceneNode::layer(placement))
                    .with_flags(placement.flags())
                    .with_parent_node_class_id(placement.parent_node_id()),
            )
        })?;
        info!(
            "Created scene '{}' with {} entities",
            class.name(),
            graph.node_count()
        );
        Ok(Self {
            id: random_id(),
            class,
            graph,
        })
    }

    /// Instance id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The class this scene was created from
    pub fn class(&self) -> &Arc<SceneClass> {
        &self.class
    }

    /// The entity graph
    pub fn graph(&self) -> &NodeGraph<EntityKey, Entity> {
        &self.graph
    }

    /// The entity graph for editing
    pub fn graph_mut(&mut self) -> &mut NodeGraph<EntityKey, Entity> {
        &mut self.graph
    }

    /// Add an entity as the last child of `parent` (`None` is the root)
    pub fn spawn_entity(&mut self, parent: Option<EntityKey>, entity: Entity) -> Result<EntityKey, TreeError> {
        self.graph.add_child(parent, entity)
    }

    /// Remove an entity and every entity linked under it
    pub fn kill_entity(&mut self, entity: EntityKey) -> Result<Vec<Entity>, TreeError> {
        self.graph.delete_node(entity)
    }

    /// Find an entity by instance name
    pub fn find_entity_by_name(&self, name: &str) -> Option<EntityKey> {
        self.graph.find_node_by_name(name)
    }
}

struct CollectVisitor<'a> {
    nodes: &'a NodeArena<EntityKey, Entity>,
    parents: Vec<&'a Entity>,
    transform: TransformStack,
    result: Vec<EntityPlacement<'a, Entity, Entity>>,
}

impl TreeVisitor<EntityKey> for CollectVisitor<'_> {
    fn enter_node(&mut self, value: Option<EntityKey>) {
        let nodes = self.nodes;
        let Some(entity) = value.and_then(|key| nodes.get(key)) else {
            return;
        };

        let parent_node_transform = self
            .parents
            .last()
            .and_then(|parent| {
                let node = parent.find_node_by_class_id(entity.parent_node_class_id())?;
                parent.graph().find_node_transform(node)
            })
            .unwrap_or_else(Mat3::identity);

        self.transform.push(parent_node_transform);
        self.transform.push(entity.node_transform());
        self.parents.push(entity);
        self.result.push(EntityPlacement {
            node_to_scene: self.transform.matrix(),
            object: entity,
            visual: Some(entity),
        });
    }

    fn leave_node(&mut self, value: Option<EntityKey>) {
        if value.and_then(|key| self.nodes.get(key)).is_none() {
            return;
        }
        self.transform.pop();
        self.transform.pop();
        self.parents.pop();
    }
}

impl EntityContainer for Scene {
    type Object = Entity;
    type Visual = Entity;

    fn collect_nodes(&self) -> Vec<EntityPlacement<'_, Entity, Entity>> {
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
