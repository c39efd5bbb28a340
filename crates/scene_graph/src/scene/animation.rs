//! Animation content
//!
//! Animations are purely visual node graphs with a playback clock.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::node::impl_placed_node;
use super::{DrawableItem, DuplicateNode, NodeGraph, NodePlacement, SceneError, VisualEntity};
use crate::foundation::collections::{random_id, AnimationNodeKey};
use crate::foundation::math::Vec2;

/// Node of an animation class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationNodeClass {
    id: String,
    name: String,
    #[serde(default)]
    placement: NodePlacement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    drawable: Option<DrawableItem>,
}

impl AnimationNodeClass {
    /// Create a node with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: random_id(),
            name: name.into(),
            placement: NodePlacement::default(),
            drawable: None,
        }
    }

    /// Set the placement
    pub fn with_placement(mut self, placement: NodePlacement) -> Self {
        self.placement = placement;
        self
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

    /// Attach a drawable item
    pub fn with_drawable(mut self, item: DrawableItem) -> Self {
        self.drawable = Some(item);
        self
    }

    /// Placement of the node
    pub fn placement(&self) -> &NodePlacement {
        &self.placement
    }

    /// Mutable drawable item, if any
    pub fn drawable_mut(&mut self) -> Option<&mut DrawableItem> {
        self.drawable.as_mut()
    }
}

impl_placed_node!(AnimationNodeClass);

impl DuplicateNode for AnimationNodeClass {
    fn duplicate(&self) -> Self {
        Self {
            id: random_id(),
            name: format!("Copy of {}", self.name),
            ..self.clone()
        }
    }
}

/// Runtime node of an animation
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationNode {
    id: String,
    class_id: String,
    name: String,
    placement: NodePlacement,
    drawable: Option<DrawableItem>,
}

impl AnimationNode {
    /// Create an instance node from a class node
    pub fn from_class(klass: &AnimationNodeClass) -> Self {
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

    /// Mutable placement of the node
    pub fn placement_mut(&mut self) -> &mut NodePlacement {
        &mut self.placement
    }

    /// Mutable drawable item, if any
    pub fn drawable_mut(&mut self) -> Option<&mut DrawableItem> {
        self.drawable.as_mut()
    }
}

impl_placed_node!(AnimationNode);

impl DuplicateNode for AnimationNode {
    fn duplicate(&self) -> Self {
        Self {
            id: random_id(),
            name: format!("Copy of {}", self.name),
            ..self.clone()
        }
    }
}

/// Animation definition
#[derive(Debug, Clone)]
pub struct AnimationClass {
    id: String,
    name: String,
    duration: f32,
    looping: bool,
    graph: NodeGraph<AnimationNodeKey, AnimationNodeClass>,
}

impl AnimationClass {
    /// Create an empty one second animation
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: random_id(),
            name: name.into(),
            duration: 1.0,
            looping: false,
            graph: NodeGraph::new(),
        }
    }

    /// Set the duration in seconds
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    /// Restart from the beginning once the duration has elapsed
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Class id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Whether playback loops
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// The node graph
    pub fn graph(&self) -> &NodeGraph<AnimationNodeKey, AnimationNodeClass> {
        &self.graph
    }

    /// The node graph for editing
    pub fn graph_mut(&mut self) -> &mut NodeGraph<AnimationNodeKey, AnimationNodeClass> {
        &mut self.graph
    }

    /// Serialize into JSON
    pub fn to_json(&self) -> Result<Value, SceneError> {
        let mut json = self.graph.to_json()?;
        json.insert("id".to_string(), Value::from(self.id.as_str()));
        json.insert("name".to_string(), Value::from(self.name.as_str()));
        json.insert("duration".to_string(), Value::from(self.duration));
        json.insert("looping".to_string(), Value::from(self.looping));
        Ok(Value::Object(json))
    }

    /// Load a class written by [`to_json`](Self::to_json)
    pub fn from_json(json: &Value) -> Result<Self, SceneError> {
        let field = |name: &'static str| json.get(name).ok_or(SceneError::MissingField(name));
        let id = field("id")?.as_str().ok_or(SceneError::MissingField("id"))?;
        let name = field("name")?.as_str().ok_or(SceneError::MissingField("name"))?;
        #[allow(clippy::cast_possible_truncation)]
        let duration = field("duration")?
            .as_f64()
            .ok_or(SceneError::MissingField("duration"))? as f32;
        let looping = field("looping")?
            .as_bool()
            .ok_or(SceneError::MissingField("looping"))?;
        Ok(Self {
            id: id.to_string(),
            name: name.to_string(),
            duration,
            looping,
            graph: NodeGraph::from_json(json)?,
        })
    }
}

impl VisualEntity for AnimationClass {
    type Key = AnimationNodeKey;
    type Node = AnimationNodeClass;

    fn id(&self) -> &str {
        &self.id
    }

    fn graph(&self) -> &NodeGraph<AnimationNodeKey, AnimationNodeClass> {
        &self.graph
    }
}

/// Animation instance
#[derive(Debug, Clone)]
pub struct Animation {
    id: String,
    class: Arc<AnimationClass>,
    current_time: f32,
    graph: NodeGraph<AnimationNodeKey, AnimationNode>,
}

impl Animation {
    /// Create a playback instance of an animation class
    pub fn new(class: Arc<AnimationClass>) -> Self {
        let graph = class.graph().map_nodes(AnimationNode::from_class);
        Self {
            id: random_id(),
            class,
            current_time: 0.0,
            graph,
        }
    }

    /// Instance id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The class this animation was created from
    pub fn class(&self) -> &Arc<AnimationClass> {
        &self.class
    }

    /// Playback position in seconds
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    /// Advance the playback clock
    pub fn update(&mut self, dt: f32) {
        self.current_time += dt;
        let duration = self.class.duration();
        if self.class.is_looping() && duration > 0.0 {
            self.current_time %= duration;
        } else {
            self.current_time = self.current_time.min(duration);
        }
    }

    /// A non-looping animation expires once its duration has elapsed
    pub fn is_expired(&self) -> bool {
        !self.class.is_looping() && self.current_time >= self.class.duration()
    }

    /// The instance node graph
    pub fn graph(&self) -> &NodeGraph<AnimationNodeKey, AnimationNode> {
        &self.graph
    }

    /// The instance node graph for editing
    pub fn graph_mut(&mut self) -> &mut NodeGraph<AnimationNodeKey, AnimationNode> {
        &mut self.graph
    }
}

impl VisualEntity for Animation {
    type Key = AnimationNodeKey;
    type Node = AnimationNode;

    fn id(&self) -> &str {
        &self.id
    }

    fn graph(&self) -> &NodeGraph<AnimationNodeKey, AnimationNode> {
        &self.graph
    }
}
