//! Tree algorithms
//!
//! Stateless functions over a [`TreeNode`] and the arena holding the node
//! values. Every function works for any node kind that implements
//! [`SceneNode`]. Keys in the tree that are not live in the arena are
//! skipped the same way as the root sentinel.
//!
//! The structural edits validate their preconditions before touching the
//! tree, a failed edit leaves the tree as it was.

use log::{debug, trace};

use super::{TreeError, TreeNode, TreeVisitor};
use crate::foundation::collections::{Key, NodeArena};
use crate::foundation::math::{FRect, Mat3, Point2, Transform2D, TransformStack, Vec2};
use crate::scene::{DuplicateNode, SceneNode, SceneNodeMut};

/// A node registered by [`coarse_hit_test`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeHit<K> {
    /// The node that was hit
    pub node: K,
    /// Hit position in node local coordinates, from (0, 0) to the node size
    pub position: Vec2,
}

fn lookup<K: Key, N>(nodes: &NodeArena<K, N>, value: Option<K>) -> Option<(K, &N)> {
    let key = value?;
    nodes.get(key).map(|node| (key, node))
}

fn unit_corners(transform: &Mat3) -> FRect {
    let corners = [
        Point2::new(0.0, 0.0),
        Point2::new(1.0, 0.0),
        Point2::new(0.0, 1.0),
        Point2::new(1.0, 1.0),
    ]
    .map(|corner| transform.transform_point(&corner));
    FRect::from_points(&corners)
}

struct HitTestVisitor<'a, K: Key, N> {
    nodes: &'a NodeArena<K, N>,
    point: Point2,
    transform: TransformStack,
    hits: Vec<NodeHit<K>>,
}

impl<K: Key, N: SceneNode> TreeVisitor<K> for HitTestVisitor<'_, K, N> {
    fn enter_node(&mut self, value: Option<K>) {
        let Some((key, node)) = lookup(self.nodes, value) else {
            return;
        };
        self.transform.push(node.node_transform());
        self.transform.push(node.model_transform());

        if let Some(inverse) = self.transform.matrix().try_inverse() {
            let local = inverse.transform_point(&self.point);
            if (0.0..1.0).contains(&local.x) && (0.0..1.0).contains(&local.y) {
                let size = node.size();
                self.hits.push(NodeHit {
                    node: key,
                    position: Vec2::new(local.x * size.x, local.y * size.y),
                });
            }
        }

        // children are placed relative to the node transform only
        self.transform.pop();
    }

    fn leave_node(&mut self, value: Option<K>) {
        if lookup(self.nodes, value).is_some() {
            self.transform.pop();
        }
    }
}

/// Find every node whose box contains the point `(x, y)`.
///
/// Hits are reported in pre-order traversal order. They are not sorted by
/// depth, layer or area, a parent that fully covers its child is reported
/// before the child.
pub fn coarse_hit_test<K, N>(tree: &TreeNode<K>, nodes: &NodeArena<K, N>, x: f32, y: f32) -> Vec<NodeHit<K>>
where
    K: Key,
    N: SceneNode,
{
    let mut visitor = HitTestVisitor {
        nodes,
        point: Point2::new(x, y),
        transform: TransformStack::new(),
        hits: Vec::new(),
    };
    tree.pre_order_traverse(&mut visitor);
    visitor.hits
}

struct PathVisitor<K> {
    target: K,
    path: Vec<K>,
    found: bool,
}

impl<K: Key> TreeVisitor<K> for PathVisitor<K> {
    fn enter_node(&mut self, value: Option<K>) {
        if self.found {
            return;
        }
        if let Some(key) = value {
            self.path.push(key);
            self.found = key == self.target;
        }
    }

    fn leave_node(&mut self, value: Option<K>) {
        if !self.found && value.is_some() {
            self.path.pop();
        }
    }

    fn is_done(&self) -> bool {
        self.found
    }
}

/// Keys from the topmost node down to `node` (inclusive), or None when the
/// node is not in the tree
pub fn find_node_path<K: Key>(tree: &TreeNode<K>, node: K) -> Option<Vec<K>> {
    let mut visitor = PathVisitor {
        target: node,
        path: Vec::new(),
        found: false,
    };
    tree.pre_order_traverse(&mut visitor);
    visitor.found.then_some(visitor.path)
}

/// Composed node transforms from the tree root down to and including `node`
pub fn find_node_transform<K, N>(tree: &TreeNode<K>, nodes: &NodeArena<K, N>, node: K) -> Option<Mat3>
where
    K: Key,
    N: SceneNode,
{
    let path = find_node_path(tree, node)?;
    Some(
        path.into_iter()
            .filter_map(|key| nodes.get(key))
            .fold(Mat3::identity(), |composed, node| composed * node.node_transform()),
    )
}

/// Node transform chain of `node` followed by its model transform. Maps the
/// unit square of the node to tree space.
pub fn find_node_model_transform<K, N>(tree: &TreeNode<K>, nodes: &NodeArena<K, N>, node: K) -> Option<Mat3>
where
    K: Key,
    N: SceneNode,
{
    let model = nodes.get(node)?.model_transform();
    find_node_transform(tree, nodes, node).map(|transform| transform * model)
}

/// Node transform chain of `node` followed by a translation by minus half
/// its size. Maps node local coordinates with the origin at the top left
/// corner to tree space.
pub fn find_unscaled_node_model_transform<K, N>(
    tree: &TreeNode<K>,
    nodes: &NodeArena<K, N>,
    node: K,
) -> Option<Mat3>
where
    K: Key,
    N: SceneNode,
{
    let size = nodes.get(node)?.size();
    find_node_transform(tree, nodes, node)
        .map(|transform| transform * Mat3::new_translation(&(-size * 0.5)))
}

/// Map a point from the local space of `node` to tree space.
/// Returns the zero vector when the node is not in the tree.
pub fn map_coords_from_node<K, N>(tree: &TreeNode<K>, nodes: &NodeArena<K, N>, x: f32, y: f32, node: K) -> Vec2
where
    K: Key,
    N: SceneNode,
{
    find_unscaled_node_model_transform(tree, nodes, node).map_or_else(Vec2::zeros, |transform| {
        transform.transform_point(&Point2::new(x, y)).coords
    })
}

/// Map a point from tree space to the local space of `node`.
/// Returns the zero vector when the node is not in the tree or its
/// transform can't be inverted.
pub fn map_coords_to_node<K, N>(tree: &TreeNode<K>, nodes: &NodeArena<K, N>, x: f32, y: f32, node: K) -> Vec2
where
    K: Key,
    N: SceneNode,
{
    find_unscaled_node_model_transform(tree, nodes, node)
        .and_then(|transform| transform.try_inverse())
        .map_or_else(Vec2::zeros, |inverse| {
            inverse.transform_point(&Point2::new(x, y)).coords
        })
}

/// Axis aligned bounding box of `node` in tree space. Rotated nodes get the
/// box of their rotated corners.
pub fn bounding_rect<K, N>(tree: &TreeNode<K>, nodes: &NodeArena<K, N>, node: K) -> Option<FRect>
where
    K: Key,
    N: SceneNode,
{
    find_node_model_transform(tree, nodes, node).map(|transform| unit_corners(&transform))
}

struct BoundingRectVisitor<'a, K: Key, N> {
    nodes: &'a NodeArena<K, N>,
    transform: TransformStack,
    rect: FRect,
}

impl<K: Key, N: SceneNode> TreeVisitor<K> for BoundingRectVisitor<'_, K, N> {
    fn enter_node(&mut self, value: Option<K>) {
        let Some((_, node)) = lookup(self.nodes, value) else {
            return;
        };
        self.transform.push(node.node_transform());
        let model = self.transform.matrix() * node.model_transform();
        self.rect = self.rect.union(&unit_corners(&model));
    }

    fn leave_node(&mut self, value: Option<K>) {
        if lookup(self.nodes, value).is_some() {
            self.transform.pop();
        }
    }
}

/// Union of the bounding boxes of every node in the tree
pub fn bounding_rect_all<K, N>(tree: &TreeNode<K>, nodes: &NodeArena<K, N>) -> FRect
where
    K: Key,
    N: SceneNode,
{
    let mut visitor = BoundingRectVisitor {
        nodes,
        transform: TransformStack::new(),
        rect: FRect::default(),
    };
    tree.pre_order_traverse(&mut visitor);
    visitor.rect
}

fn parent_node_mut<K: Key>(tree: &mut TreeNode<K>, parent: Option<K>) -> Result<&mut TreeNode<K>, TreeError> {
    match parent {
        None => Ok(tree),
        Some(key) => tree.find_node_by_value_mut(key).ok_or(TreeError::NodeNotFound),
    }
}

/// Link `child` as the last child of `parent` (`None` is the root)
pub fn link_child<K: Key>(tree: &mut TreeNode<K>, parent: Option<K>, child: K) -> Result<(), TreeError> {
    link_subtree(tree, parent, TreeNode::with_value(child))
}

/// Link a detached subtree as the last child of `parent` (`None` is the
/// root). None of the subtree's values may already be in the tree.
pub fn link_subtree<K: Key>(tree: &mut TreeNode<K>, parent: Option<K>, subtree: TreeNode<K>) -> Result<(), TreeError> {
    if subtree.values().into_iter().any(|value| tree.contains(value)) {
        return Err(TreeError::AlreadyLinked);
    }
    parent_node_mut(tree, parent)?.append_node(subtree);
    Ok(())
}

/// Detach `child` from its parent and return it. The returned subtree keeps
/// all of the child's descendants.
pub fn break_child<K: Key>(tree: &mut TreeNode<K>, child: K) -> Result<TreeNode<K>, TreeError> {
    let parent = tree.find_parent_mut(child).ok_or(TreeError::NodeNotFound)?;
    let index = parent.child_index(child).ok_or(TreeError::NodeNotFound)?;
    parent.take_child(index)
}

/// Move `child` (with its subtree) to the end of the children of `parent`.
///
/// With `keep_world` the child's translation, rotation and scale are
/// recomputed so its placement in tree space doesn't change. Otherwise the
/// local placement is kept and the child moves along with the new parent.
pub fn reparent_child<K, N>(
    tree: &mut TreeNode<K>,
    nodes: &mut NodeArena<K, N>,
    parent: Option<K>,
    child: K,
    keep_world: bool,
) -> Result<(), TreeError>
where
    K: Key,
    N: SceneNodeMut,
{
    let subtree = tree.find_node_by_value(child).ok_or(TreeError::NodeNotFound)?;
    if let Some(parent) = parent {
        if subtree.contains(parent) {
            return Err(TreeError::CyclicReparent);
        }
        if !tree.contains(parent) {
            return Err(TreeError::NodeNotFound);
        }
    }
    if tree.find_parent(child).is_none() {
        return Err(TreeError::NodeNotFound);
    }

    if keep_world {
        let child_to_world = find_node_transform(tree, nodes, child).ok_or(TreeError::NodeNotFound)?;
        let parent_to_world = match parent {
            Some(parent) => find_node_transform(tree, nodes, parent).ok_or(TreeError::NodeNotFound)?,
            None => Mat3::identity(),
        };
        let world_to_parent = parent_to_world
            .try_inverse()
            .ok_or(TreeError::SingularTransform)?;
        let local = Transform2D::from_matrix(&(world_to_parent * child_to_world));

        let node = nodes.get_mut(child).ok_or(TreeError::NodeNotFound)?;
        node.set_translation(local.position);
        node.set_rotation(local.rotation);
        node.set_scale(local.scale);
        trace!("Recomputed local placement of '{}'", node.name());
    }

    let subtree = break_child(tree, child)?;
    parent_node_mut(tree, parent)?.append_node(subtree);
    Ok(())
}

/// Remove `node` and its whole subtree from the tree.
///
/// Only the structure changes. The removed keys are returned so the owner
/// of the arena can free the values.
pub fn delete_node<K: Key>(tree: &mut TreeNode<K>, node: K) -> Result<Vec<K>, TreeError> {
    let removed = break_child(tree, node)?.values();
    debug!("Deleted {} node(s) from render tree", removed.len());
    Ok(removed)
}

/// Duplicate `node` and its whole subtree.
///
/// The copies get new ids and are inserted into the arena, the copied
/// subtree is linked as the last child of the original's parent. Returns
/// the key of the copy of `node`.
pub fn duplicate_node<K, N>(tree: &mut TreeNode<K>, nodes: &mut NodeArena<K, N>, node: K) -> Result<K, TreeError>
where
    K: Key,
    N: DuplicateNode,
{
    let source = tree.find_node_by_value(node).ok_or(TreeError::NodeNotFound)?;
    if source.values().into_iter().any(|key| !nodes.contains_key(key)) {
        return Err(TreeError::NodeNotFound);
    }
    let source = source.clone();
    if tree.find_parent(node).is_none() {
        return Err(TreeError::NodeNotFound);
    }

    let copy = source.try_map_values(&mut |key| {
        let value = nodes.get(key).ok_or(TreeError::NodeNotFound)?.duplicate();
        Ok::<K, TreeError>(nodes.insert(value))
    })?;
    let copy_key = copy.value().ok_or(TreeError::NodeNotFound)?;

    tree.find_parent_mut(node)
        .ok_or(TreeError::NodeNotFound)?
        .append_node(copy);
    debug!("Duplicated subtree of {} node(s)", source.num_nodes());
    Ok(copy_key)
}
