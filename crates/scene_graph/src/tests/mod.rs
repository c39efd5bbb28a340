//! End to end tests across trees, scene content and the renderer

use std::sync::Arc;

use approx::assert_relative_eq;

use crate::foundation::collections::{EntityNodeKey, Key};
use crate::foundation::math::{FRect, Point2, TransformStack, Vec2};
use crate::render::testing::{FakeLibrary, RecordingPainter};
use crate::render::{ClassLibrary, Painter, Renderer, SceneDrawHook};
use crate::scene::{
    DrawableFlags, DrawableItem, Entity, EntityClass, EntityFlags, EntityNodeClass, NodeGraph, NodePlacement, Scene,
    SceneClass, SceneNode, SceneNodeClass,
};
use crate::tree::{TreeNode, TreeVisitor};

type Graph = NodeGraph<EntityNodeKey, EntityNodeClass>;

struct Boxes {
    graph: Graph,
    root: EntityNodeKey,
    child: EntityNodeKey,
    grandchild: EntityNodeKey,
}

// root without area, a 10x10 child at (10,10) and a 2x2 grandchild at
// (10,10) relative to the child
fn boxes() -> Boxes {
    let mut graph = Graph::new();
    let root = graph
        .add_child(None, EntityNodeClass::new("root").with_size(Vec2::zeros()))
        .unwrap();
    let child = graph
        .add_child(
            Some(root),
            EntityNodeClass::new("child").with_placement(NodePlacement::new(Vec2::new(10.0, 10.0), Vec2::new(10.0, 10.0))),
        )
        .unwrap();
    let grandchild = graph
        .add_child(
            Some(child),
            EntityNodeClass::new("grandchild").with_placement(NodePlacement::new(Vec2::new(10.0, 10.0), Vec2::new(2.0, 2.0))),
        )
        .unwrap();
    Boxes {
        graph,
        root,
        child,
        grandchild,
    }
}

fn library() -> Arc<FakeLibrary> {
    Arc::new(FakeLibrary::default().with_material("color").with_drawable("rect"))
}

#[test]
fn test_hit_test_scenario() {
    let boxes = boxes();

    let hits = boxes.graph.coarse_hit_test(6.0, 6.0);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].node, boxes.child);
    assert_relative_eq!(hits[0].position, Vec2::new(1.0, 1.0), epsilon = 1e-4);

    let hits = boxes.graph.coarse_hit_test(20.0, 20.0);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].node, boxes.grandchild);
    assert_relative_eq!(hits[0].position, Vec2::new(1.0, 1.0), epsilon = 1e-4);
}

#[test]
fn test_bounding_rect_scenario() {
    let boxes = boxes();
    let rect = boxes.graph.bounding_rect_all();
    assert_relative_eq!(rect.x, 5.0);
    assert_relative_eq!(rect.y, 5.0);
    assert_relative_eq!(rect.width, 16.0);
    assert_relative_eq!(rect.height, 16.0);
}

#[test]
fn test_coordinate_mapping_round_trip() {
    let boxes = boxes();
    let world = boxes.graph.map_coords_from_node(1.0, 1.0, boxes.grandchild);
    assert_relative_eq!(world, Vec2::new(20.0, 20.0), epsilon = 1e-4);
    let local = boxes.graph.map_coords_to_node(20.0, 20.0, boxes.grandchild);
    assert_relative_eq!(local, Vec2::new(1.0, 1.0), epsilon = 1e-4);
}

#[test]
fn test_find_node_by_value_and_counts() {
    let boxes = boxes();
    let tree = boxes.graph.render_tree();
    for key in [boxes.root, boxes.child, boxes.grandchild] {
        assert_eq!(tree.find_node_by_value(key).unwrap().value(), Some(key));
    }
    assert!(tree.find_node_by_value(EntityNodeKey::null()).is_none());

    fn check_count<K: Key>(node: &TreeNode<K>) {
        let sum: usize = node.children().iter().map(TreeNode::num_nodes).sum();
        assert_eq!(node.num_nodes(), 1 + sum);
        for child in node.children() {
            check_count(child);
        }
    }
    check_count(tree);
    assert_eq!(tree.num_nodes(), 4);
}

#[derive(Default)]
struct EventLog {
    events: Vec<(&'static str, EntityNodeKey)>,
}

impl TreeVisitor<EntityNodeKey> for EventLog {
    fn enter_node(&mut self, value: Option<EntityNodeKey>) {
        if let Some(key) = value {
            self.events.push(("enter", key));
        }
    }

    fn leave_node(&mut self, value: Option<EntityNodeKey>) {
        if let Some(key) = value {
            self.events.push(("leave", key));
        }
    }
}

#[test]
fn test_enter_and_leave_bracket_descendants() {
    let mut boxes = boxes();
    let sibling = boxes
        .graph
        .add_child(Some(boxes.root), EntityNodeClass::new("sibling"))
        .unwrap();
    let mut log = EventLog::default();
    boxes.graph.render_tree().pre_order_traverse(&mut log);

    let position = |event: &str, key| log.events.iter().position(|e| *e == (event, key)).unwrap();
    for (ancestor, descendant) in [
        (boxes.root, boxes.child),
        (boxes.root, boxes.grandchild),
        (boxes.child, boxes.grandchild),
        (boxes.root, sibling),
    ] {
        assert!(position("enter", ancestor) < position("enter", descendant));
        assert!(position("leave", ancestor) > position("leave", descendant));
    }
    assert!(position("leave", boxes.child) < position("enter", sibling));
}

#[test]
fn test_reparent_to_root_is_idempotent() {
    let mut boxes = boxes();
    boxes.graph.reparent_child(None, boxes.grandchild, false).unwrap();
    let first = boxes.graph.render_tree().clone();
    boxes.graph.reparent_child(None, boxes.grandchild, false).unwrap();
    assert_eq!(boxes.graph.render_tree(), &first);
}

#[test]
fn test_reparent_keeps_world_bounds() {
    let mut boxes = boxes();
    let parent = boxes
        .graph
        .add_child(
            None,
            EntityNodeClass::new("parent").with_placement(
                NodePlacement::new(Vec2::new(50.0, -20.0), Vec2::new(4.0, 4.0))
                    .with_scale(Vec2::new(2.0, 2.0))
                    .with_rotation(0.5),
            ),
        )
        .unwrap();
    let before = boxes.graph.bounding_rect(boxes.grandchild).unwrap();

    boxes
        .graph
        .reparent_child(Some(parent), boxes.grandchild, true)
        .unwrap();
    let after = boxes.graph.bounding_rect(boxes.grandchild).unwrap();
    assert_relative_eq!(after.x, before.x, epsilon = 1e-3);
    assert_relative_eq!(after.y, before.y, epsilon = 1e-3);
    assert_relative_eq!(after.width, before.width, epsilon = 1e-3);
    assert_relative_eq!(after.height, before.height, epsilon = 1e-3);
    assert_eq!(
        boxes.graph.render_tree().find_parent(boxes.grandchild).unwrap().value(),
        Some(parent)
    );
}

#[test]
fn test_paint_state_is_swept_after_an_empty_frame() {
    let mut graph = Graph::new();
    let key = graph
        .add_child(None, EntityNodeClass::new("a").with_drawable(DrawableItem::new("color", "rect")))
        .unwrap();
    let id = graph.node(key).unwrap().id().to_string();
    let mut renderer = Renderer::new(library());
    let mut painter = RecordingPainter::default();
    let mut transform = TransformStack::new();

    renderer.begin_frame();
    renderer.draw_tree(graph.render_tree(), graph.nodes(), &mut painter, &mut transform, None);
    renderer.end_frame();
    assert!(renderer.has_paint_node(&id));

    renderer.begin_frame();
    renderer.end_frame();
    assert!(!renderer.has_paint_node(&id));
    assert_eq!(renderer.paint_node_count(), 0);
}

#[test]
fn test_negative_and_positive_layers_make_two_batches() {
    let mut graph = Graph::new();
    graph
        .add_child(
            None,
            EntityNodeClass::new("front")
                .with_translation(Vec2::new(2.0, 0.0))
                .with_drawable(DrawableItem::new("color", "rect").with_layer(2)),
        )
        .unwrap();
    graph
        .add_child(
            None,
            EntityNodeClass::new("back")
                .with_translation(Vec2::new(-3.0, 0.0))
                .with_drawable(DrawableItem::new("color", "rect").with_layer(-3)),
        )
        .unwrap();

    let mut renderer = Renderer::new(library());
    let mut painter = RecordingPainter::default();
    let mut transform = TransformStack::new();
    renderer.draw_tree(graph.render_tree(), graph.nodes(), &mut painter, &mut transform, None);

    assert_eq!(painter.calls.len(), 2);
    let center = |call: usize| painter.calls[call].transforms[0].transform_point(&Point2::new(0.5, 0.5));
    assert_relative_eq!(center(0), Point2::new(-3.0, 0.0));
    assert_relative_eq!(center(1), Point2::new(2.0, 0.0));
}

fn names_in_order<K: Key, N: SceneNode>(graph: &NodeGraph<K, N>) -> Vec<(String, usize)> {
    fn walk<K: Key, N: SceneNode>(graph: &NodeGraph<K, N>, node: &TreeNode<K>, depth: usize, out: &mut Vec<(String, usize)>) {
        if let Some(value) = graph.node(node.value().unwrap_or_default()) {
            out.push((value.name().to_string(), depth));
        }
        for child in node.children() {
            walk(graph, child, depth + 1, out);
        }
    }
    let mut out = Vec::new();
    walk(graph, graph.render_tree(), 0, &mut out);
    out
}

#[test]
fn test_entity_class_json_round_trip() {
    let mut class = EntityClass::new("ship");
    let boxes = boxes();
    *class.graph_mut() = boxes.graph;
    class
        .graph_mut()
        .add_child(
            Some(boxes.child),
            EntityNodeClass::new("flame").with_drawable(DrawableItem::new("color", "rect").with_layer(-1)),
        )
        .unwrap();

    let json = class.to_json().unwrap();
    let text = serde_json::to_string(&json).unwrap();
    let loaded = EntityClass::from_json(&serde_json::from_str(&text).unwrap()).unwrap();

    assert_eq!(loaded.id(), class.id());
    assert_eq!(loaded.name(), "ship");
    assert_eq!(names_in_order(loaded.graph()), names_in_order(class.graph()));

    let flame = loaded.graph().find_node_by_name("flame").unwrap();
    let item = loaded.graph().node(flame).unwrap().drawable().unwrap();
    assert_eq!(item.layer, -1);
    assert_eq!(item.drawable_id, "rect");
    assert_eq!(
        loaded.graph().bounding_rect_all(),
        class.graph().bounding_rect_all()
    );
}

fn animated_ship() -> Arc<EntityClass> {
    let mut ship = EntityClass::new("ship");
    ship.graph_mut()
        .add_child(
            None,
            EntityNodeClass::new("hull")
                .with_drawable(DrawableItem::new("color", "rect").with_flags(DrawableFlags::all())),
        )
        .unwrap();
    Arc::new(ship)
}

fn fleet(ship: &Arc<EntityClass>) -> SceneClass {
    let mut scene = SceneClass::new("fleet");
    for (name, x) in [("leader", 0.0), ("wingman", 10.0)] {
        scene
            .graph_mut()
            .add_child(
                None,
                SceneNodeClass::new(name, Arc::clone(ship)).with_translation(Vec2::new(x, 0.0)),
            )
            .unwrap();
    }
    scene
}

#[test]
fn test_shared_entity_class_is_updated_once() {
    let ship = animated_ship();
    let scene = fleet(&ship);
    let library = library();
    let mut renderer = Renderer::new(Arc::clone(&library) as Arc<dyn ClassLibrary>);
    let mut painter = RecordingPainter::default();
    let mut transform = TransformStack::new();

    renderer.draw_scene(&scene, &mut painter, &mut transform, None, None);
    assert_eq!(transform.depth(), 0);
    // both placements draw, sharing one paint node
    assert_eq!(painter.calls.len(), 2);
    assert_eq!(renderer.paint_node_count(), 1);

    renderer.update_scene(&scene, 0.25);
    let materials = library.material_instances("color");
    assert_eq!(materials.len(), 1);
    assert_eq!(materials[0].updates(), vec![0.25]);
}

struct SkipNamed(&'static str);

impl SceneDrawHook<Entity> for SkipNamed {
    fn filter_entity(&mut self, entity: &Entity) -> bool {
        entity.name() != self.0
    }
}

#[test]
fn test_scene_instances_draw_their_own_nodes() {
    let ship = animated_ship();
    let scene = Scene::new(Arc::new(fleet(&ship))).unwrap();
    let library = library();
    let mut renderer = Renderer::new(Arc::clone(&library) as Arc<dyn ClassLibrary>);
    let mut painter = RecordingPainter::default();
    let mut transform = TransformStack::new();

    renderer.begin_frame();
    renderer.draw_scene(&scene, &mut painter, &mut transform, None, None);
    renderer.end_frame();
    assert_eq!(renderer.paint_node_count(), 2);
    assert_eq!(library.material_instances("color").len(), 2);

    let centers = draw_centers(&painter);
    assert_relative_eq!(centers[0], Point2::new(0.0, 0.0));
    assert_relative_eq!(centers[1], Point2::new(10.0, 0.0));

    // the skipped entity loses its paint state at the end of the frame
    let mut hook = SkipNamed("wingman");
    renderer.begin_frame();
    renderer.draw_scene(&scene, &mut painter, &mut transform, Some(&mut hook), None);
    renderer.end_frame();
    assert_eq!(renderer.paint_node_count(), 1);
}

fn draw_centers(painter: &RecordingPainter) -> Vec<Point2> {
    painter
        .calls
        .iter()
        .map(|call| call.transforms[0].transform_point(&Point2::new(0.5, 0.5)))
        .collect()
}

#[test]
fn test_placements_draw_in_stable_layer_order() {
    let ship = animated_ship();
    let mut scene = SceneClass::new("formation");
    for (name, x, layer) in [("first", 0.0, 2), ("below", 10.0, -1), ("second", 20.0, 2)] {
        scene
            .graph_mut()
            .add_child(
                None,
                SceneNodeClass::new(name, Arc::clone(&ship))
                    .with_translation(Vec2::new(x, 0.0))
                    .with_layer(layer),
            )
            .unwrap();
    }

    let mut renderer = Renderer::new(library());
    let mut painter = RecordingPainter::default();
    let mut transform = TransformStack::new();
    renderer.draw_scene(&scene, &mut painter, &mut transform, None, None);

    let centers = draw_centers(&painter);
    assert_eq!(centers.len(), 3);
    assert_relative_eq!(centers[0], Point2::new(10.0, 0.0));
    assert_relative_eq!(centers[1], Point2::new(0.0, 0.0));
    assert_relative_eq!(centers[2], Point2::new(20.0, 0.0));
}

#[derive(Default)]
struct DrawLog {
    events: Vec<String>,
}

impl SceneDrawHook<SceneNodeClass> for DrawLog {
    fn filter_entity(&mut self, entity: &SceneNodeClass) -> bool {
        self.events.push(format!("filter {}", entity.name()));
        true
    }

    fn begin_draw_entity(&mut self, entity: &SceneNodeClass, _painter: &mut dyn Painter, transform: &mut TransformStack) {
        self.events.push(format!("begin {} {}", entity.name(), transform.depth()));
    }

    fn end_draw_entity(&mut self, entity: &SceneNodeClass, _painter: &mut dyn Painter, transform: &mut TransformStack) {
        self.events.push(format!("end {} {}", entity.name(), transform.depth()));
    }
}

#[test]
fn test_invisible_entity_is_bracketed_but_not_drawn() {
    let ship = animated_ship();
    let mut scene = SceneClass::new("haunted");
    scene
        .graph_mut()
        .add_child(None, SceneNodeClass::new("leader", Arc::clone(&ship)))
        .unwrap();
    scene
        .graph_mut()
        .add_child(
            None,
            SceneNodeClass::new("ghost", Arc::clone(&ship))
                .with_translation(Vec2::new(10.0, 0.0))
                .with_flags(EntityFlags::empty()),
        )
        .unwrap();

    let mut renderer = Renderer::new(library());
    let mut painter = RecordingPainter::default();
    let mut transform = TransformStack::new();
    let mut log = DrawLog::default();
    renderer.draw_scene(&scene, &mut painter, &mut transform, Some(&mut log), None);

    assert_eq!(
        log.events,
        vec![
            "filter leader",
            "begin leader 1",
            "end leader 1",
            "filter ghost",
            "begin ghost 1",
            "end ghost 1",
        ]
    );
    assert_eq!(transform.depth(), 0);
    let centers = draw_centers(&painter);
    assert_eq!(centers.len(), 1);
    assert_relative_eq!(centers[0], Point2::new(0.0, 0.0));
}

#[test]
fn test_spawned_entity_is_drawn() {
    let ship = animated_ship();
    let mut scene = Scene::new(Arc::new(fleet(&ship))).unwrap();
    let leader = scene.find_entity_by_name("leader").unwrap();
    scene
        .spawn_entity(
            Some(leader),
            Entity::new(Arc::clone(&ship))
                .with_name("drone")
                .with_placement(NodePlacement::new(Vec2::new(0.0, 5.0), Vec2::new(1.0, 1.0))),
        )
        .unwrap();

    let mut renderer = Renderer::new(library());
    let mut painter = RecordingPainter::default();
    let mut transform = TransformStack::new();
    renderer.draw_scene(&scene, &mut painter, &mut transform, None, None);
    assert_eq!(painter.calls.len(), 3);
    assert_eq!(renderer.paint_node_count(), 3);

    let bounds = scene.graph().bounding_rect_all();
    assert!(!bounds.is_empty());
    assert_ne!(bounds, FRect::default());
}
