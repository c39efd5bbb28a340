//! JSON codecs for tree node payloads

use std::collections::HashMap;

use serde_json::{json, Value};

use super::TreeError;
use crate::foundation::collections::{Key, NodeArena};
use crate::scene::SceneNode;

/// Converts node values to and from the `"node"` payload of tree JSON.
///
/// The serializer owns the value storage: decoding returns a handle to a
/// value that already exists (or that the serializer just created), the
/// tree only stores the returned handle.
pub trait NodeSerializer<K> {
    /// Encode the payload for a node. `None` is the root sentinel.
    fn node_to_json(&self, value: Option<K>) -> Value;

    /// Decode a payload into a node handle. `Ok(None)` is the root sentinel.
    fn node_from_json(&mut self, json: &Value) -> Result<Option<K>, TreeError>;
}

/// Serializer writing `{"id": "<node id>"}` payloads.
///
/// The root sentinel (and any handle that is no longer live) is written as
/// an empty object. Decoding resolves ids against the node arena; an empty
/// object below the top level is rejected by [`TreeNode::from_json`](super::TreeNode::from_json).
pub struct IdSerializer<'a, K: Key, N> {
    nodes: &'a NodeArena<K, N>,
    by_id: HashMap<&'a str, K>,
}

impl<'a, K: Key, N: SceneNode> IdSerializer<'a, K, N> {
    /// Create a serializer for the nodes in `nodes`
    pub fn new(nodes: &'a NodeArena<K, N>) -> Self {
        let by_id = nodes.iter().map(|(key, node)| (node.id(), key)).collect();
        Self { nodes, by_id }
    }
}

impl<K: Key, N: SceneNode> NodeSerializer<K> for IdSerializer<'_, K, N> {
    fn node_to_json(&self, value: Option<K>) -> Value {
        match value.and_then(|key| self.nodes.get(key)) {
            Some(node) => json!({ "id": node.id() }),
            None => json!({}),
        }
    }

    fn node_from_json(&mut self, json: &Value) -> Result<Option<K>, TreeError> {
        let payload = json
            .as_object()
            .ok_or_else(|| TreeError::Decode("node payload is not an object".to_string()))?;
        let Some(id) = payload.get("id") else {
            return Ok(None);
        };
        let id = id
            .as_str()
            .ok_or_else(|| TreeError::Decode("node id is not a string".to_string()))?;
        self.by_id
            .get(id)
            .copied()
            .map(Some)
            .ok_or_else(|| TreeError::UnknownNodeId(id.to_string()))
    }
}
