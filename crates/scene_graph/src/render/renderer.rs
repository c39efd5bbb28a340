//! Scene renderer
//!
//! Walks node graphs and turns every visible drawable item into a draw
//! packet for the painter. Material and drawable instances are cached per
//! node id in paint nodes.
//!
//! ## Frame bracket
//!
//! ```text
//! begin_frame()          clear the visited flag of every paint node
//! draw(...)              any number of times, marks the paint nodes it reaches
//! end_frame()            drop the paint nodes that were not visited
//! ```
//!
//! Nodes that stop being drawn lose their paint state at the end of the
//! frame, nodes that appear get it created on their first draw.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{debug, trace, warn};

use super::{ClassLibrary, Culling, DrawPacket, Drawable, EntityDrawHook, Material, Painter, RenderQueue, SceneDrawHook};
use crate::config::{ConfigError, RendererConfig};
use crate::foundation::collections::{Key, NodeArena};
use crate::foundation::math::TransformStack;
use crate::scene::{DrawableFlags, DrawableItem, EntityContainer, EntityObject, RenderPass, SceneNode, VisualEntity};
use crate::tree::{TreeNode, TreeVisitor};

/// Node type of the content placed in a container
pub type PlacedNode<C> = <<C as EntityContainer>::Visual as VisualEntity>::Node;

#[derive(Default)]
struct PaintNode {
    visited: bool,
    material: Option<Arc<dyn Material>>,
    drawable: Option<Arc<dyn Drawable>>,
    material_class_id: String,
    drawable_class_id: String,
}

struct Resolver<'a> {
    library: Option<&'a dyn ClassLibrary>,
    warn_unresolved: bool,
}

/// Sides whose lookup failed for a class id that had not failed before
#[derive(Debug, Default, PartialEq, Eq)]
struct Unresolved {
    material: bool,
    drawable: bool,
}

impl Resolver<'_> {
    // An empty side or a changed class id resolves again. A failed lookup
    // leaves the side empty so the next draw tries again, but only the first
    // failure of a class id is reported.
    fn resolve(&self, paint: &mut PaintNode, item: &DrawableItem, node_name: &str) -> Unresolved {
        let mut unresolved = Unresolved::default();

        if item.render_pass == RenderPass::Draw
            && !item.material_id.is_empty()
            && (paint.material.is_none() || paint.material_class_id != item.material_id)
        {
            let changed = paint.material_class_id != item.material_id;
            paint.material = self
                .library
                .and_then(|library| library.find_material_class_by_id(&item.material_id))
                .map(|class| {
                    trace!("New material instance of '{}' for node '{}'", class.id(), node_name);
                    class.create_instance()
                });
            paint.material_class_id.clone_from(&item.material_id);
            unresolved.material = paint.material.is_none() && changed;
            if unresolved.material && self.warn_unresolved {
                warn!(
                    "No such material class '{}' for node '{}'",
                    item.material_id, node_name
                );
            }
        }

        if !item.drawable_id.is_empty()
            && (paint.drawable.is_none() || paint.drawable_class_id != item.drawable_id)
        {
            let changed = paint.drawable_class_id != item.drawable_id;
            paint.drawable = self
                .library
                .and_then(|library| library.find_drawable_class_by_id(&item.drawable_id))
                .map(|class| {
                    trace!("New drawable instance of '{}' for node '{}'", class.id(), node_name);
                    class.create_instance()
                });
            paint.drawable_class_id.clone_from(&item.drawable_id);
            unresolved.drawable = paint.drawable.is_none() && changed;
            if unresolved.drawable && self.warn_unresolved {
                warn!(
                    "No such drawable class '{}' for node '{}'",
                    item.drawable_id, node_name
                );
            }
        }

        unresolved
    }
}

struct DrawVisitor<'a, 'h, K: Key, N> {
    nodes: &'a NodeArena<K, N>,
    paint_nodes: &'a mut HashMap<String, PaintNode>,
    resolver: Resolver<'a>,
    transform: &'a mut TransformStack,
    hook: Option<&'a mut (dyn EntityDrawHook<N> + 'h)>,
    packets: Vec<DrawPacket>,
}

impl<K: Key, N: SceneNode> TreeVisitor<K> for DrawVisitor<'_, '_, K, N> {
    fn enter_node(&mut self, value: Option<K>) {
        let nodes = self.nodes;
        let Some(node) = value.and_then(|key| nodes.get(key)) else {
            return;
        };

        // children are placed relative to this node even if it draws nothing
        self.transform.push(node.node_transform());

        if let Some(item) = node.drawable() {
            let paint = self.paint_nodes.entry(node.id().to_string()).or_default();
            paint.visited = true;
            self.resolver.resolve(paint, item, node.name());
            let flipped = item.test_flag(DrawableFlags::FLIP_VERTICALLY);

            if let Some(material) = &paint.material {
                if item.test_flag(DrawableFlags::OVERRIDE_ALPHA) {
                    material.set_alpha(item.alpha);
                } else {
                    material.reset_alpha();
                }
            }
            if let Some(drawable) = &paint.drawable {
                drawable.set_style(item.style);
                drawable.set_line_width(item.line_width);
                drawable.set_culling(if flipped { Culling::Front } else { Culling::Back });
            }

            if item.test_flag(DrawableFlags::VISIBLE_IN_GAME) {
                self.transform.push(node.model_transform());
                if flipped {
                    // x -> 1 - x inside the unit model box
                    self.transform.push_identity();
                    self.transform.scale(-1.0, 1.0);
                    self.transform.translate(1.0, 0.0);
                }
                let mut packet = DrawPacket {
                    material: paint.material.clone(),
                    drawable: paint.drawable.clone(),
                    transform: self.transform.matrix(),
                    layer: node.layer(),
                    pass: node.render_pass(),
                };
                let keep = self
                    .hook
                    .as_deref_mut()
                    .map_or(true, |hook| hook.inspect_packet(node, &mut packet));
                if keep {
                    self.packets.push(packet);
                }
                if flipped {
                    self.transform.pop();
                }
                self.transform.pop();
            }
        }

        if let Some(hook) = self.hook.as_deref_mut() {
            hook.append_packets(node, self.transform, &mut self.packets);
        }
    }

    fn leave_node(&mut self, value: Option<K>) {
        if value.and_then(|key| self.nodes.get(key)).is_some() {
            self.transform.pop();
        }
    }
}

/// Renderer with per-node paint state
pub struct Renderer {
    config: RendererConfig,
    library: Option<Arc<dyn ClassLibrary>>,
    paint_nodes: HashMap<String, PaintNode>,
}

impl Renderer {
    /// Create a renderer resolving classes through `library`
    pub fn new(library: Arc<dyn ClassLibrary>) -> Self {
        Self::default().with_class_library(library)
    }

    /// Set the class library
    #[must_use]
    pub fn with_class_library(mut self, library: Arc<dyn ClassLibrary>) -> Self {
        self.library = Some(library);
        self
    }

    /// Apply a configuration after validating it
    pub fn with_config(mut self, config: RendererConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.paint_nodes.reserve(config.initial_cache_capacity);
        self.config = config;
        Ok(self)
    }

    /// Replace the class library. Existing paint state is kept.
    pub fn set_class_library(&mut self, library: Arc<dyn ClassLibrary>) {
        self.library = Some(library);
    }

    /// Current configuration
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Start a new frame
    pub fn begin_frame(&mut self) {
        for paint in self.paint_nodes.values_mut() {
            paint.visited = false;
        }
    }

    /// Finish the frame, dropping the paint state of every node that was
    /// not drawn since [`begin_frame`](Self::begin_frame)
    pub fn end_frame(&mut self) {
        let before = self.paint_nodes.len();
        self.paint_nodes.retain(|_, paint| paint.visited);
        let swept = before - self.paint_nodes.len();
        if swept > 0 {
            debug!("Dropped paint state of {swept} node(s)");
        }
    }

    /// Drop all paint state
    pub fn clear_paint_state(&mut self) {
        self.paint_nodes.clear();
    }

    /// Number of cached paint nodes
    pub fn paint_node_count(&self) -> usize {
        self.paint_nodes.len()
    }

    /// Check whether there is paint state for the node id
    pub fn has_paint_node(&self, node_id: &str) -> bool {
        self.paint_nodes.contains_key(node_id)
    }

    /// Draw a render tree whose nodes live in `nodes`.
    ///
    /// `transform` maps the tree space to view space. It is left as it was
    /// when the call returns.
    pub fn draw_tree<K, N>(
        &mut self,
        tree: &TreeNode<K>,
        nodes: &NodeArena<K, N>,
        painter: &mut dyn Painter,
        transform: &mut TransformStack,
        hook: Option<&mut (dyn EntityDrawHook<N> + '_)>,
    ) where
        K: Key,
        N: SceneNode,
    {
        let mut visitor = DrawVisitor {
            nodes,
            paint_nodes: &mut self.paint_nodes,
            resolver: Resolver {
                library: self.library.as_deref(),
                warn_unresolved: self.config.warn_unresolved,
            },
            transform,
            hook,
            packets: Vec::new(),
        };
        tree.pre_order_traverse(&mut visitor);

        let queue = RenderQueue::from_packets(visitor.packets);
        trace!(
            "Submitting {} packet(s) in {} layer(s), {} dropped",
            queue.packet_count(),
            queue.batches().len(),
            queue.dropped_count()
        );
        queue.submit(painter);
    }

    /// Draw the node graph of `visual`
    pub fn draw<V: VisualEntity>(
        &mut self,
        visual: &V,
        painter: &mut dyn Painter,
        transform: &mut TransformStack,
        hook: Option<&mut (dyn EntityDrawHook<V::Node> + '_)>,
    ) {
        let graph = visual.graph();
        self.draw_tree(graph.render_tree(), graph.nodes(), painter, transform, hook);
    }

    /// Draw a container of entities.
    ///
    /// Placements are drawn in ascending entity layer order, placements on
    /// the same layer in render tree order. Entities that are not visible
    /// in game are skipped but still reported to the scene hook.
    pub fn draw_scene<C: EntityContainer>(
        &mut self,
        scene: &C,
        painter: &mut dyn Painter,
        transform: &mut TransformStack,
        mut scene_hook: Option<&mut (dyn SceneDrawHook<C::Object> + '_)>,
        mut entity_hook: Option<&mut (dyn EntityDrawHook<PlacedNode<C>> + '_)>,
    ) {
        let mut placements = scene.collect_nodes();
        placements.sort_by_key(|placement| placement.object.layer());

        for placement in &placements {
            if let Some(hook) = scene_hook.as_deref_mut() {
                if !hook.filter_entity(placement.object) {
                    continue;
                }
            }

            transform.push(placement.node_to_scene);
            if let Some(hook) = scene_hook.as_deref_mut() {
                hook.begin_draw_entity(placement.object, painter, transform);
            }

            if let Some(visual) = placement.visual {
                if placement.object.is_visible_in_game() {
                    self.draw(visual, painter, transform, entity_hook.as_deref_mut());
                }
            }

            if let Some(hook) = scene_hook.as_deref_mut() {
                hook.end_draw_entity(placement.object, painter, transform);
            }
            transform.pop();
        }
    }

    /// Update the paint state of a single node.
    ///
    /// Only nodes that have been drawn have paint state, nodes without it
    /// are ignored.
    pub fn update_node<N: SceneNode>(&mut self, node: &N, dt: f32) {
        let Some(item) = node.drawable() else {
            return;
        };
        let Some(paint) = self.paint_nodes.get(node.id()) else {
            return;
        };
        let dt = dt * item.time_scale;

        if let Some(material) = &paint.material {
            if item.test_flag(DrawableFlags::UPDATE_MATERIAL) {
                material.update(dt);
            }
        }
        if let Some(drawable) = &paint.drawable {
            if item.test_flag(DrawableFlags::UPDATE_DRAWABLE) {
                drawable.update(dt);
            }
            if item.test_flag(DrawableFlags::RESTART_DRAWABLE) && !drawable.is_alive() {
                drawable.restart();
            }
        }
    }

    /// Update the paint state of every node in `nodes`
    pub fn update_nodes<K: Key, N: SceneNode>(&mut self, nodes: &NodeArena<K, N>, dt: f32) {
        for node in nodes.values() {
            self.update_node(node, dt);
        }
    }

    /// Update the paint state of every node of `visual`
    pub fn update<V: VisualEntity>(&mut self, visual: &V, dt: f32) {
        self.update_nodes(visual.graph().nodes(), dt);
    }

    /// Update the paint state of every entity in a container. Content
    /// placed more than once is updated once.
    pub fn update_scene<C: EntityContainer>(&mut self, scene: &C, dt: f32) {
        let placements = scene.collect_nodes();
        let mut updated = HashSet::new();
        for visual in placements.iter().filter_map(|placement| placement.visual) {
            if updated.insert(visual.id()) {
                self.update(visual, dt);
            }
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        let config = RendererConfig::default();
        Self {
            paint_nodes: HashMap::with_capacity(config.initial_cache_capacity),
            library: None,
            config,
        }
    }
}
