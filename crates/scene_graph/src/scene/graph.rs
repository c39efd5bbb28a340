//! Node arena combined with a render tree
//!
//! Every content kind stores its nodes the same way: the values live in a
//! [`NodeArena`] and the render tree links their keys. [`NodeGraph`] owns
//! both and keeps them consistent, e.g. deleting a node from the tree also
//! frees the values of the deleted subtree.

use std::collections::HashMap;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{DuplicateNode, SceneError, SceneNode, SceneNodeMut};
use crate::foundation::collections::{Key, NodeArena};
use crate::foundation::math::{FRect, Mat3, Vec2};
use crate::tree::ops::{self, NodeHit};
use crate::tree::{IdSerializer, TreeError, TreeNode};

/// Node values together with the render tree linking them
#[derive(Debug, Clone)]
pub struct NodeGraph<K: Key, N> {
    nodes: NodeArena<K, N>,
    render_tree: TreeNode<K>,
}

impl<K: Key, N> Default for NodeGraph<K, N> {
    fn default() -> Self {
        Self {
            nodes: NodeArena::with_key(),
            render_tree: TreeNode::default(),
        }
    }
}

impl<K: Key, N: SceneNode> NodeGraph<K, N> {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// All node values
    pub fn nodes(&self) -> &NodeArena<K, N> {
        &self.nodes
    }

    /// The render tree
    pub fn render_tree(&self) -> &TreeNode<K> {
        &self.render_tree
    }

    /// Get a node value
    pub fn node(&self, key: K) -> Option<&N> {
        self.nodes.get(key)
    }

    /// Get a mutable node value
    pub fn node_mut(&mut self, key: K) -> Option<&mut N> {
        self.nodes.get_mut(key)
    }

    /// Number of node values
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Find a node by its id
    pub fn find_node_by_id(&self, id: &str) -> Option<K> {
        self.nodes
            .iter()
            .find_map(|(key, node)| (node.id() == id).then_some(key))
    }

    /// Find the first node with the given name
    pub fn find_node_by_name(&self, name: &str) -> Option<K> {
        self.nodes
            .iter()
            .find_map(|(key, node)| (node.name() == name).then_some(key))
    }

    /// Store a node value without linking it into the render tree
    pub fn add_node(&mut self, node: N) -> K {
        self.nodes.insert(node)
    }

    /// Store a node value and link it as the last child of `parent`
    /// (`None` is the root)
    pub fn add_child(&mut self, parent: Option<K>, node: N) -> Result<K, TreeError> {
        let key = self.nodes.insert(node);
        if let Err(err) = ops::link_child(&mut self.render_tree, parent, key) {
            self.nodes.remove(key);
            return Err(err);
        }
        Ok(key)
    }

    /// Link an already stored node as the last child of `parent`
    pub fn link_child(&mut self, parent: Option<K>, child: K) -> Result<(), TreeError> {
        if !self.nodes.contains_key(child) {
            return Err(TreeError::NodeNotFound);
        }
        ops::link_child(&mut self.render_tree, parent, child)
    }

    /// Link a detached subtree as the last child of `parent`
    pub fn link_subtree(&mut self, parent: Option<K>, subtree: TreeNode<K>) -> Result<(), TreeError> {
        ops::link_subtree(&mut self.render_tree, parent, subtree)
    }

    /// Detach `child` with its descendants from the render tree. The
    /// values stay stored until the subtree is linked again or freed.
    pub fn break_child(&mut self, child: K) -> Result<TreeNode<K>, TreeError> {
        ops::break_child(&mut self.render_tree, child)
    }

    /// Delete `node` and its subtree from the render tree and free the
    /// node values. Returns the removed values in pre-order.
    pub fn delete_node(&mut self, node: K) -> Result<Vec<N>, TreeError> {
        let removed = ops::delete_node(&mut self.render_tree, node)?;
        Ok(removed
            .into_iter()
            .filter_map(|key| self.nodes.remove(key))
            .collect())
    }

    /// Remove every node value and reset the render tree
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.render_tree.clear();
    }

    /// See [`ops::coarse_hit_test`]
    pub fn coarse_hit_test(&self, x: f32, y: f32) -> Vec<NodeHit<K>> {
        ops::coarse_hit_test(&self.render_tree, &self.nodes, x, y)
    }

    /// See [`ops::map_coords_from_node`]
    pub fn map_coords_from_node(&self, x: f32, y: f32, node: K) -> Vec2 {
        ops::map_coords_from_node(&self.render_tree, &self.nodes, x, y, node)
    }

    /// See [`ops::map_coords_to_node`]
    pub fn map_coords_to_node(&self, x: f32, y: f32, node: K) -> Vec2 {
        ops::map_coords_to_node(&self.render_tree, &self.nodes, x, y, node)
    }

    /// See [`ops::find_node_transform`]
    pub fn find_node_transform(&self, node: K) -> Option<Mat3> {
        ops::find_node_transform(&self.render_tree, &self.nodes, node)
    }

    /// See [`ops::find_node_model_transform`]
    pub fn find_node_model_transform(&self, node: K) -> Option<Mat3> {
        ops::find_node_model_transform(&self.render_tree, &self.nodes, node)
    }

    /// See [`ops::bounding_rect`]
    pub fn bounding_rect(&self, node: K) -> Option<FRect> {
        ops::bounding_rect(&self.render_tree, &self.nodes, node)
    }

    /// See [`ops::bounding_rect_all`]
    pub fn bounding_rect_all(&self) -> FRect {
        ops::bounding_rect_all(&self.render_tree, &self.nodes)
    }

    /// Build a graph with the same render tree shape whose values are
    /// created from the values of this graph
    pub fn map_nodes<K2, N2, F>(&self, mut map: F) -> NodeGraph<K2, N2>
    where
        K2: Key,
        N2: SceneNode,
        F: FnMut(&N) -> N2,
    {
        let mapped: Result<NodeGraph<K2, N2>, std::convert::Infallible> =
            self.try_map_nodes(|node| Ok(map(node)));
        match mapped {
            Ok(graph) => graph,
            Err(never) => match never {},
        }
    }

    /// Fallible variant of [`map_nodes`](Self::map_nodes)
    pub fn try_map_nodes<K2, N2, E, F>(&self, mut map: F) -> Result<NodeGraph<K2, N2>, E>
    where
        K2: Key,
        N2: SceneNode,
        F: FnMut(&N) -> Result<N2, E>,
    {
        let mut nodes = NodeArena::with_capacity_and_key(self.nodes.len());
        let mut keys = HashMap::with_capacity(self.nodes.len());
        for (key, node) in &self.nodes {
            keys.insert(key, nodes.insert(map(node)?));
        }
        // keys that are not stored map to the null key and stay stale
        let render_tree = self
            .render_tree
            .map_values(|key| keys.get(&key).copied().unwrap_or_default());
        Ok(NodeGraph { nodes, render_tree })
    }
}

impl<K: Key, N: SceneNodeMut> NodeGraph<K, N> {
    /// See [`ops::reparent_child`]
    pub fn reparent_child(&mut self, parent: Option<K>, child: K, keep_world: bool) -> Result<(), TreeError> {
        ops::reparent_child(&mut self.render_tree, &mut self.nodes, parent, child, keep_world)
    }
}

impl<K: Key, N: SceneNode + DuplicateNode> NodeGraph<K, N> {
    /// See [`ops::duplicate_node`]
    pub fn duplicate_node(&mut self, node: K) -> Result<K, TreeError> {
        ops::duplicate_node(&mut self.render_tree, &mut self.nodes, node)
    }
}

impl<K: Key, N: SceneNode + Serialize> NodeGraph<K, N> {
    /// Serialize into `{"nodes": [...], "render_tree": {...}}`. The render
    /// tree refers to the nodes by id.
    pub fn to_json(&self) -> Result<Map<String, Value>, SceneError> {
        let nodes = self
            .nodes
            .values()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        let serializer = IdSerializer::new(&self.nodes);

        let mut json = Map::new();
        json.insert("nodes".to_string(), Value::Array(nodes));
        json.insert("render_tree".to_string(), self.render_tree.to_json(&serializer));
        Ok(json)
    }
}

impl<K: Key, N: SceneNode + DeserializeOwned> NodeGraph<K, N> {
    /// Load a graph written by [`to_json`](Self::to_json)
    pub fn from_json(json: &Value) -> Result<Self, SceneError> {
        let values = json
            .get("nodes")
            .and_then(Value::as_array)
            .ok_or(SceneError::MissingField("nodes"))?;
        let mut nodes = NodeArena::with_capacity_and_key(values.len());
        for value in values {
            nodes.insert(N::deserialize(value)?);
        }

        let tree = json
            .get("render_tree")
            .ok_or(SceneError::MissingField("render_tree"))?;
        let mut serializer = IdSerializer::new(&nodes);
        let render_tree = TreeNode::from_json(tree, &mut serializer)?;
        debug!("Loaded node graph with {} node(s)", nodes.len());
        Ok(Self { nodes, render_tree })
    }
}
