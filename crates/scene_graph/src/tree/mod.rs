//! Non-owning render tree
//!
//! The tree records parent/child relationships between node handles. The
//! node values themselves live in an arena owned by the content object
//! (see [`NodeArena`](crate::foundation::collections::NodeArena)); the tree
//! only stores keys into it and never frees or mutates a value.
//!
//! ## Structure
//!
//! ```text
//! TreeNode(None)             <- root sentinel, holds no value
//!  ├── TreeNode(Some(a))
//!  │    └── TreeNode(Some(b))
//!  └── TreeNode(Some(c))
//! ```
//!
//! - [`TreeNode`]: the tree shape and pre-order traversal
//! - [`TreeVisitor`]: enter/leave callbacks with early exit
//! - [`NodeSerializer`]: pluggable JSON codec for node payloads
//! - [`ops`]: hit testing, coordinate mapping, bounding boxes and
//!   structural edits written once for every node kind

mod json;
mod node;
pub mod ops;
mod visitor;

pub use json::{IdSerializer, NodeSerializer};
pub use node::TreeNode;
pub use visitor::{ForEachVisitor, TreeVisitor};

/// Errors produced by tree structure edits and tree decoding
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Child index outside of the valid range
    #[error("child index {index} is out of range (node has {len} children)")]
    IndexOutOfRange {
        /// The offending index
        index: usize,
        /// Number of children at the time of the call
        len: usize,
    },

    /// The node is not part of the tree
    #[error("node not found in the tree")]
    NodeNotFound,

    /// The node is already linked into the tree
    #[error("node is already linked into the tree")]
    AlreadyLinked,

    /// Attempted to move a node under itself or one of its descendants
    #[error("cannot reparent a node under itself or its descendant")]
    CyclicReparent,

    /// A transform in the hierarchy can't be inverted
    #[error("transform hierarchy is not invertible")]
    SingularTransform,

    /// Malformed tree JSON
    #[error("tree decode error: {0}")]
    Decode(String),

    /// Tree JSON refers to a node id that doesn't exist
    #[error("no node with id '{0}'")]
    UnknownNodeId(String),
}
