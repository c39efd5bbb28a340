//! Tree node shape and traversal

use serde_json::{Map, Value};

use super::{ForEachVisitor, NodeSerializer, TreeError, TreeVisitor};

/// Non-owning tree node.
///
/// Holds an optional value handle and an ordered list of children. Cloning
/// a tree copies its shape but the copies refer to the very same values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode<K> {
    // None for the root sentinel
    value: Option<K>,
    children: Vec<TreeNode<K>>,
}

impl<K> Default for TreeNode<K> {
    fn default() -> Self {
        Self {
            value: None,
            children: Vec::new(),
        }
    }
}

impl<K: Copy + Eq> TreeNode<K> {
    /// Create a value-less node, typically the root of a tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node referring to the given value
    pub fn with_value(value: K) -> Self {
        Self {
            value: Some(value),
            children: Vec::new(),
        }
    }

    /// The value this node refers to, if any
    pub fn value(&self) -> Option<K> {
        self.value
    }

    /// Change the value this node refers to
    pub fn set_value(&mut self, value: Option<K>) {
        self.value = value;
    }

    /// Number of direct children
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// Direct children in order
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Get a child node by index
    pub fn child(&self, index: usize) -> Result<&Self, TreeError> {
        let len = self.children.len();
        self.children
            .get(index)
            .ok_or(TreeError::IndexOutOfRange { index, len })
    }

    /// Get a mutable child node by index
    pub fn child_mut(&mut self, index: usize) -> Result<&mut Self, TreeError> {
        let len = self.children.len();
        self.children
            .get_mut(index)
            .ok_or(TreeError::IndexOutOfRange { index, len })
    }

    /// Append a new child node referring to `value`
    pub fn append_child(&mut self, value: K) -> &mut Self {
        self.append_node(Self::with_value(value))
    }

    /// Append an existing node (and its subtree) to the list of children
    pub fn append_node(&mut self, node: Self) -> &mut Self {
        self.children.push(node);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Insert a new child node referring to `value` at `index`.
    ///
    /// Valid indices are `0..=N` where N is the current number of children;
    /// inserting at N appends. For children `A, B, C` inserting `E` at 1
    /// gives `A, E, B, C`.
    pub fn insert_child(&mut self, value: K, index: usize) -> Result<&mut Self, TreeError> {
        self.insert_node(Self::with_value(value), index)
    }

    /// Insert an existing node (and its subtree) at `index`
    pub fn insert_node(&mut self, node: Self, index: usize) -> Result<&mut Self, TreeError> {
        let len = self.children.len();
        if index > len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        self.children.insert(index, node);
        Ok(&mut self.children[index])
    }

    /// Delete the child at `index` together with its subtree
    pub fn delete_child(&mut self, index: usize) -> Result<(), TreeError> {
        self.take_child(index).map(|_| ())
    }

    /// Delete the direct child referring to `value`. Returns false when no
    /// such child exists.
    pub fn delete_child_by_value(&mut self, value: K) -> bool {
        match self.child_index(value) {
            Some(index) => {
                self.children.remove(index);
                true
            }
            None => false,
        }
    }

    /// Detach the child at `index` and return it with its subtree
    pub fn take_child(&mut self, index: usize) -> Result<Self, TreeError> {
        let len = self.children.len();
        if index >= len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        Ok(self.children.remove(index))
    }

    /// Position of the direct child referring to `value`
    pub fn child_index(&self, value: K) -> Option<usize> {
        self.children
            .iter()
            .position(|child| child.value == Some(value))
    }

    /// Find a direct child by value identity
    pub fn find_child(&self, value: K) -> Option<&Self> {
        self.children.iter().find(|child| child.value == Some(value))
    }

    /// Find a direct child by value identity
    pub fn find_child_mut(&mut self, value: K) -> Option<&mut Self> {
        self.children
            .iter_mut()
            .find(|child| child.value == Some(value))
    }

    /// Search this node and its descendants for the node referring to
    /// `value`. The first match in pre-order wins.
    pub fn find_node_by_value(&self, value: K) -> Option<&Self> {
        if self.value == Some(value) {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find_node_by_value(value))
    }

    /// Mutable variant of [`find_node_by_value`](Self::find_node_by_value)
    pub fn find_node_by_value_mut(&mut self, value: K) -> Option<&mut Self> {
        if self.value == Some(value) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_node_by_value_mut(value))
    }

    /// Find the node whose direct child refers to `value`. Returns None if
    /// the value is not in this subtree or is held by this node itself.
    pub fn find_parent(&self, value: K) -> Option<&Self> {
        if self.child_index(value).is_some() {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find_parent(value))
    }

    /// Mutable variant of [`find_parent`](Self::find_parent)
    pub fn find_parent_mut(&mut self, value: K) -> Option<&mut Self> {
        if self.child_index(value).is_some() {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_parent_mut(value))
    }

    /// Check whether this subtree refers to `value`
    pub fn contains(&self, value: K) -> bool {
        self.find_node_by_value(value).is_some()
    }

    /// Number of nodes in this subtree including this node itself
    pub fn num_nodes(&self) -> usize {
        1 + self.children.iter().map(Self::num_nodes).sum::<usize>()
    }

    /// Drop the value and all children
    pub fn clear(&mut self) {
        self.value = None;
        self.children.clear();
    }

    /// Pre-order traversal: enter this node, visit the children left to
    /// right, then leave this node.
    pub fn pre_order_traverse<V>(&self, visitor: &mut V)
    where
        V: TreeVisitor<K> + ?Sized,
    {
        visitor.enter_node(self.value);
        for child in &self.children {
            child.pre_order_traverse(visitor);
            if visitor.is_done() {
                break;
            }
        }
        visitor.leave_node(self.value);
    }

    /// Pre-order traversal calling `callback` on entering every node
    pub fn pre_order_traverse_for_each<F: FnMut(Option<K>)>(&self, callback: F) {
        let mut visitor = ForEachVisitor::new(callback);
        self.pre_order_traverse(&mut visitor);
    }

    /// All values in this subtree in pre-order
    pub fn values(&self) -> Vec<K> {
        let mut values = Vec::with_capacity(self.num_nodes());
        self.pre_order_traverse_for_each(|value| values.extend(value));
        values
    }

    /// Build a topologically identical tree whose values are mapped through
    /// `map`. Value-less nodes stay value-less.
    pub fn map_values<U, F>(&self, mut map: F) -> TreeNode<U>
    where
        F: FnMut(K) -> U,
    {
        let mapped: Result<TreeNode<U>, std::convert::Infallible> =
            self.try_map_values(&mut |value| Ok(map(value)));
        match mapped {
            Ok(tree) => tree,
            Err(never) => match never {},
        }
    }

    /// Fallible variant of [`map_values`](Self::map_values). Stops at the
    /// first error.
    pub fn try_map_values<U, E, F>(&self, map: &mut F) -> Result<TreeNode<U>, E>
    where
        F: FnMut(K) -> Result<U, E>,
    {
        let value = self.value.map(&mut *map).transpose()?;
        let children = self
            .children
            .iter()
            .map(|child| child.try_map_values(map))
            .collect::<Result<Vec<_>, E>>()?;
        Ok(TreeNode { value, children })
    }

    /// Serialize the tree into `{"node": ..., "children": [...]}` form.
    /// Leaf nodes have no `children` key.
    pub fn to_json<S>(&self, serializer: &S) -> Value
    where
        S: NodeSerializer<K> + ?Sized,
    {
        let mut json = Map::new();
        json.insert("node".to_string(), serializer.node_to_json(self.value));
        if !self.children.is_empty() {
            let children = self
                .children
                .iter()
                .map(|child| child.to_json(serializer))
                .collect();
            json.insert("children".to_string(), Value::Array(children));
        }
        Value::Object(json)
    }

    /// Build a tree from JSON produced by [`to_json`](Self::to_json).
    ///
    /// A missing `children` key gives a leaf node. A missing `node` key or a
    /// `children` value that is not an array is a decode error, as is any
    /// error reported by the serializer. Only the top level node may decode
    /// to the root sentinel, a child without a value is a decode error.
    pub fn from_json<S>(json: &Value, serializer: &mut S) -> Result<Self, TreeError>
    where
        S: NodeSerializer<K> + ?Sized,
    {
        let value = serializer.node_from_json(Self::payload(json)?)?;
        Self::decode_children(value, json, serializer)
    }

    fn from_json_child<S>(json: &Value, serializer: &mut S) -> Result<Self, TreeError>
    where
        S: NodeSerializer<K> + ?Sized,
    {
        let value = serializer
            .node_from_json(Self::payload(json)?)?
            .ok_or_else(|| TreeError::Decode("child node has no value".to_string()))?;
        Self::decode_children(Some(value), json, serializer)
    }

    fn payload(json: &Value) -> Result<&Value, TreeError> {
        json.get("node")
            .ok_or_else(|| TreeError::Decode("tree node has no 'node' payload".to_string()))
    }

    fn decode_children<S>(value: Option<K>, json: &Value, serializer: &mut S) -> Result<Self, TreeError>
    where
        S: NodeSerializer<K> + ?Sized,
    {
        let mut node = Self {
            value,
            children: Vec::new(),
        };
        let Some(children) = json.get("children") else {
            return Ok(node);
        };
        let children = children
            .as_array()
            .ok_or_else(|| TreeError::Decode("'children' is not an array".to_string()))?;
        for child in children {
            node.children.push(Self::from_json_child(child, serializer)?);
        }
        Ok(node)
    }
}
